//! Mock lookup client for testing
//!
//! Configurable in-memory implementation of [`LookupApi`] with per-method
//! call counts and one-shot error injection, so resolver and search tests
//! never touch the network.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::models::{DynamicDatum, FieldConfig, Module};
use super::LookupApi;
use crate::error::{ApiError, Result};

/// Mock API client for testing.
///
/// Configure expected responses via builder methods, then hand an
/// `Arc<MockLookupClient>` to the component under test.
pub struct MockLookupClient {
    /// Modules returned by list_modules
    modules: Arc<Mutex<Vec<Module>>>,
    /// Field configs keyed by module id
    field_configs: Arc<Mutex<HashMap<String, Vec<FieldConfig>>>>,
    /// Dynamic data keyed by field-configuration id
    dynamic_data: Arc<Mutex<HashMap<String, Vec<DynamicDatum>>>>,
    /// Entities keyed by "{endpoint}/{id}" for fetch_one
    entities: Arc<Mutex<HashMap<String, Value>>>,
    /// Search results returned by search, regardless of term
    search_results: Arc<Mutex<Vec<Value>>>,
    /// Error to return (if any) - consumed on first use
    error: Arc<Mutex<Option<ApiError>>>,
    /// Track number of calls for verification
    call_count: Arc<Mutex<CallCounts>>,
    /// Captured search invocations for test assertions
    captured_searches: Arc<Mutex<Vec<CapturedSearch>>>,
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub list_modules: usize,
    pub list_field_configs: usize,
    pub list_dynamic_data: usize,
    pub fetch_one: usize,
    pub search: usize,
}

impl CallCounts {
    /// Get total number of API calls made.
    pub fn total(&self) -> usize {
        self.list_modules
            + self.list_field_configs
            + self.list_dynamic_data
            + self.fetch_one
            + self.search
    }
}

/// A captured search invocation for test assertions.
#[derive(Debug, Clone)]
pub struct CapturedSearch {
    pub endpoint: String,
    pub search_param: String,
    pub term: String,
    pub limit: usize,
    pub extra_filter: Option<(String, String)>,
}

impl Default for MockLookupClient {
    fn default() -> Self {
        Self {
            modules: Arc::new(Mutex::new(Vec::new())),
            field_configs: Arc::new(Mutex::new(HashMap::new())),
            dynamic_data: Arc::new(Mutex::new(HashMap::new())),
            entities: Arc::new(Mutex::new(HashMap::new())),
            search_results: Arc::new(Mutex::new(Vec::new())),
            error: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(CallCounts::default())),
            captured_searches: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockLookupClient {
    /// Create a new mock client with default (empty) responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure modules to return from list_modules.
    pub async fn with_modules(self, modules: Vec<Module>) -> Self {
        *self.modules.lock().await = modules;
        self
    }

    /// Configure field configs for one module.
    pub async fn with_field_configs(self, modulo_id: &str, configs: Vec<FieldConfig>) -> Self {
        self.field_configs
            .lock()
            .await
            .insert(modulo_id.to_string(), configs);
        self
    }

    /// Configure dynamic data for one field configuration.
    pub async fn with_dynamic_data(self, configuracao_id: &str, data: Vec<DynamicDatum>) -> Self {
        self.dynamic_data
            .lock()
            .await
            .insert(configuracao_id.to_string(), data);
        self
    }

    /// Configure an entity for fetch_one.
    pub async fn with_entity(self, endpoint: &str, id: &str, entity: Value) -> Self {
        self.entities
            .lock()
            .await
            .insert(format!("{}/{}", endpoint, id), entity);
        self
    }

    /// Configure results to return from search.
    pub async fn with_search_results(self, results: Vec<Value>) -> Self {
        *self.search_results.lock().await = results;
        self
    }

    /// Configure an error to return on the next API call.
    /// The error is consumed after one use.
    pub async fn with_error(self, error: ApiError) -> Self {
        *self.error.lock().await = Some(error);
        self
    }

    /// Get the call counts for verification in tests.
    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    /// Get all captured search invocations for test assertions.
    pub async fn captured_searches(&self) -> Vec<CapturedSearch> {
        self.captured_searches.lock().await.clone()
    }

    /// Check if there's a pending error and consume it.
    async fn check_error(&self) -> Result<()> {
        let mut error = self.error.lock().await;
        if let Some(e) = error.take() {
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl LookupApi for MockLookupClient {
    async fn list_modules(&self) -> Result<Vec<Module>> {
        self.check_error().await?;

        let mut counts = self.call_count.lock().await;
        counts.list_modules += 1;

        Ok(self.modules.lock().await.clone())
    }

    async fn list_field_configs(&self, modulo_id: &str) -> Result<Vec<FieldConfig>> {
        self.check_error().await?;

        let mut counts = self.call_count.lock().await;
        counts.list_field_configs += 1;
        drop(counts);

        let configs = self.field_configs.lock().await;
        Ok(configs.get(modulo_id).cloned().unwrap_or_default())
    }

    async fn list_dynamic_data(&self, configuracao_id: &str) -> Result<Vec<DynamicDatum>> {
        self.check_error().await?;

        let mut counts = self.call_count.lock().await;
        counts.list_dynamic_data += 1;
        drop(counts);

        let data = self.dynamic_data.lock().await;
        Ok(data.get(configuracao_id).cloned().unwrap_or_default())
    }

    async fn fetch_one(&self, endpoint: &str, id: &str) -> Result<Value> {
        self.check_error().await?;

        let mut counts = self.call_count.lock().await;
        counts.fetch_one += 1;
        drop(counts);

        let entities = self.entities.lock().await;
        entities
            .get(&format!("{}/{}", endpoint, id))
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("{}/{}", endpoint, id)).into())
    }

    async fn search(
        &self,
        endpoint: &str,
        search_param: &str,
        term: &str,
        limit: usize,
        extra_filter: Option<(&str, &str)>,
    ) -> Result<Vec<Value>> {
        self.captured_searches.lock().await.push(CapturedSearch {
            endpoint: endpoint.to_string(),
            search_param: search_param.to_string(),
            term: term.to_string(),
            limit,
            extra_filter: extra_filter.map(|(k, v)| (k.to_string(), v.to_string())),
        });
        self.check_error().await?;

        let mut counts = self.call_count.lock().await;
        counts.search += 1;
        drop(counts);

        Ok(self.search_results.lock().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_client_default_empty() {
        let mock = MockLookupClient::new();

        let modules = mock.list_modules().await.unwrap();
        assert!(modules.is_empty());

        let configs = mock.list_field_configs("m1").await.unwrap();
        assert!(configs.is_empty());
    }

    #[tokio::test]
    async fn test_mock_client_with_modules() {
        let mock = MockLookupClient::new()
            .with_modules(vec![Module {
                id: "m1".to_string(),
                nome: "APOLICE".to_string(),
            }])
            .await;

        let modules = mock.list_modules().await.unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].nome, "APOLICE");
    }

    #[tokio::test]
    async fn test_mock_client_with_error() {
        let mock = MockLookupClient::new()
            .with_error(ApiError::Unauthorized)
            .await;

        let result = mock.list_modules().await;
        assert!(result.is_err());

        // Error is consumed, next call succeeds
        let result = mock.list_modules().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_mock_client_call_counts() {
        let mock = MockLookupClient::new();

        mock.list_modules().await.unwrap();
        mock.list_modules().await.unwrap();
        mock.list_field_configs("m1").await.unwrap();

        let counts = mock.call_counts().await;
        assert_eq!(counts.list_modules, 2);
        assert_eq!(counts.list_field_configs, 1);
        assert_eq!(counts.total(), 3);
    }

    #[tokio::test]
    async fn test_mock_client_fetch_one_not_found() {
        let mock = MockLookupClient::new();

        let result = mock.fetch_one("/empresas", "missing").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mock_client_captured_searches() {
        let mock = MockLookupClient::new()
            .with_search_results(vec![json!({"id": "e1"})])
            .await;

        mock.search("/empresas", "nome", "acme", 20, Some(("grupoId", "g1")))
            .await
            .unwrap();

        let captured = mock.captured_searches().await;
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].endpoint, "/empresas");
        assert_eq!(captured[0].term, "acme");
        assert_eq!(captured[0].limit, 20);
        assert_eq!(
            captured[0].extra_filter,
            Some(("grupoId".to_string(), "g1".to_string()))
        );
    }
}
