//! Apolice REST backend client

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

#[cfg(test)]
pub mod mock;
pub mod models;
pub mod rest;

#[cfg(test)]
pub use mock::MockLookupClient;
pub use models::{DataEnvelope, DynamicDatum, FieldConfig, Module, SearchResponse, StructuralValue};
pub use rest::RestClient;

/// Remote lookup operations against the apolice REST backend.
///
/// Structural listings come back typed; single-entity fetches and free-text
/// searches return opaque JSON because the consuming component decides what
/// the entity is (a company, a broker, a contact) and how to label it.
#[async_trait]
pub trait LookupApi: Send + Sync {
    /// List all modules
    async fn list_modules(&self) -> Result<Vec<Module>>;

    /// List field configurations belonging to a module
    async fn list_field_configs(&self, modulo_id: &str) -> Result<Vec<FieldConfig>>;

    /// List dynamic data belonging to a field configuration
    async fn list_dynamic_data(&self, configuracao_id: &str) -> Result<Vec<DynamicDatum>>;

    /// Fetch a single entity by id from an arbitrary endpoint
    async fn fetch_one(&self, endpoint: &str, id: &str) -> Result<Value>;

    /// Free-text search against an arbitrary endpoint.
    ///
    /// Sends `<search_param>=<term>&limit=<limit>` plus an optional extra
    /// equality filter (e.g. only companies under one economic group).
    async fn search(
        &self,
        endpoint: &str,
        search_param: &str,
        term: &str,
        limit: usize,
        extra_filter: Option<(&str, &str)>,
    ) -> Result<Vec<Value>>;
}
