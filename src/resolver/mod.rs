//! Structural data resolver
//!
//! Resolves the "produtos" and "portes" reference lists from the backend's
//! three-level configuration hierarchy (module -> field configuration ->
//! dynamic data), collapsing the intermediate lookups behind one cached
//! terminal result per list. Field metadata is itself configurable on the
//! backend, which is why the hierarchy exists; consumers only ever see the
//! two fixed derived views.

use std::sync::Arc;

use crate::cache::{CacheTtl, TtlCache};
use crate::client::models::{FieldConfig, Module, StructuralValue};
use crate::client::LookupApi;
use crate::error::Result;

/// Cache key for the resolved produto list
const KEY_PRODUTOS: &str = "structural:produtos";
/// Cache key for the resolved porte list
const KEY_PORTES: &str = "structural:portes";
/// Cache key for the module list
const KEY_MODULOS: &str = "structural:modulos";

fn campos_key(modulo_id: &str) -> String {
    format!("structural:campos:{}", modulo_id)
}

fn dados_key(configuracao_id: &str) -> String {
    format!("structural:dados:{}", configuracao_id)
}

/// Module names that identify the policy module, compared lowercased.
const POLICY_MODULE_NAMES: [&str; 2] = ["apolice", "apólice"];

/// Outcome of a structural resolution.
///
/// `Empty` (hierarchy miss or genuinely no data) and `Failed` (network or
/// server fault) render identically at the public boundary; the distinction
/// exists so tests and diagnostics can tell them apart.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Fully resolved, possibly empty after the `ativo` filter
    Values(Vec<StructuralValue>),
    /// Module or field configuration not found by name
    Empty,
    /// A lookup failed; carries the logged reason
    Failed(String),
}

impl Resolution {
    /// Collapse to the consumer-facing list: failures and misses are empty.
    pub fn into_values(self) -> Vec<StructuralValue> {
        match self {
            Resolution::Values(values) => values,
            Resolution::Empty | Resolution::Failed(_) => Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Resolution::Failed(_))
    }
}

/// Resolver over the structural configuration hierarchy.
///
/// Holds the context-owned cache and API handle by reference; construct one
/// per process via [`crate::context::AppContext`].
pub struct StructuralResolver {
    api: Arc<dyn LookupApi>,
    cache: Arc<TtlCache>,
}

impl StructuralResolver {
    pub fn new(api: Arc<dyn LookupApi>, cache: Arc<TtlCache>) -> Self {
        Self { api, cache }
    }

    /// Resolve the produto list. Total: never errors, empty on any miss.
    pub async fn fetch_produtos(&self) -> Vec<StructuralValue> {
        self.resolve_produtos().await.into_values()
    }

    /// Resolve the porte list. Total: never errors, empty on any miss.
    pub async fn fetch_portes(&self) -> Vec<StructuralValue> {
        self.resolve_portes().await.into_values()
    }

    /// Resolve the produto list, keeping the empty/failed distinction.
    pub async fn resolve_produtos(&self) -> Resolution {
        self.resolve_field(KEY_PRODUTOS, "produto").await
    }

    /// Resolve the porte list, keeping the empty/failed distinction.
    pub async fn resolve_portes(&self) -> Resolution {
        self.resolve_field(KEY_PORTES, "porte").await
    }

    /// Explicit invalidation, used after an admin mutates the underlying
    /// dynamic-data records; there is no push channel to learn about it.
    pub fn clear_structural_cache(&self) {
        self.cache.delete(KEY_PRODUTOS);
        self.cache.delete(KEY_PORTES);
        self.cache.delete(KEY_MODULOS);
        self.cache.cleanup();
    }

    async fn resolve_field(&self, cache_key: &str, field_name: &str) -> Resolution {
        if let Some(values) = self.cache.get_json::<Vec<StructuralValue>>(cache_key) {
            log::debug!("Cache hit: {}", cache_key);
            return Resolution::Values(values);
        }

        match self.resolve_field_uncached(cache_key, field_name).await {
            Ok(resolution) => resolution,
            Err(e) => {
                log::warn!("Structural lookup for '{}' failed: {}", field_name, e);
                Resolution::Failed(e.to_string())
            }
        }
    }

    async fn resolve_field_uncached(
        &self,
        cache_key: &str,
        field_name: &str,
    ) -> Result<Resolution> {
        let modules = self.modules().await?;
        let Some(module) = find_policy_module(&modules) else {
            log::warn!("No policy module found among {} modules", modules.len());
            return Ok(Resolution::Empty);
        };

        let configs = self.field_configs(&module.id).await?;
        let Some(config) = find_field_config(&configs, field_name) else {
            log::warn!("Field configuration '{}' not found", field_name);
            return Ok(Resolution::Empty);
        };

        let data = self.dynamic_data(&config.id).await?;
        let values: Vec<StructuralValue> = data
            .into_iter()
            .filter(|datum| datum.is_active())
            .map(StructuralValue::from)
            .collect();

        self.cache
            .set_json(cache_key, &values, Some(CacheTtl::VALUES));
        Ok(Resolution::Values(values))
    }

    /// Module list, cached under a fixed key.
    async fn modules(&self) -> Result<Vec<Module>> {
        if let Some(modules) = self.cache.get_json::<Vec<Module>>(KEY_MODULOS) {
            log::debug!("Cache hit: {}", KEY_MODULOS);
            return Ok(modules);
        }

        let modules = self.api.list_modules().await?;
        self.cache
            .set_json(KEY_MODULOS, &modules, Some(CacheTtl::STRUCTURE));
        Ok(modules)
    }

    /// Field configurations for one module, cached per module id.
    async fn field_configs(&self, modulo_id: &str) -> Result<Vec<FieldConfig>> {
        let key = campos_key(modulo_id);
        if let Some(configs) = self.cache.get_json::<Vec<FieldConfig>>(&key) {
            log::debug!("Cache hit: {}", key);
            return Ok(configs);
        }

        let configs = self.api.list_field_configs(modulo_id).await?;
        self.cache.set_json(&key, &configs, Some(CacheTtl::STRUCTURE));
        Ok(configs)
    }

    /// Dynamic data for one field configuration, cached per configuration id.
    async fn dynamic_data(
        &self,
        configuracao_id: &str,
    ) -> Result<Vec<crate::client::models::DynamicDatum>> {
        let key = dados_key(configuracao_id);
        if let Some(data) = self.cache.get_json(&key) {
            log::debug!("Cache hit: {}", key);
            return Ok(data);
        }

        let data = self.api.list_dynamic_data(configuracao_id).await?;
        self.cache.set_json(&key, &data, Some(CacheTtl::VALUES));
        Ok(data)
    }
}

fn find_policy_module(modules: &[Module]) -> Option<&Module> {
    modules
        .iter()
        .find(|m| POLICY_MODULE_NAMES.contains(&m.nome.to_lowercase().as_str()))
}

fn find_field_config<'a>(configs: &'a [FieldConfig], name: &str) -> Option<&'a FieldConfig> {
    configs.iter().find(|c| c.nome.eq_ignore_ascii_case(name))
}
