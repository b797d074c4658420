//! Reqwest implementation of the lookup API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::models::{DataEnvelope, DynamicDatum, FieldConfig, Module, SearchResponse};
use super::LookupApi;
use crate::config::Config;
use crate::error::{ApiError, Result};

/// REST client for the apolice backend
pub struct RestClient {
    http: HttpClient,
    base_url: String,
    api_token: Option<String>,
}

impl RestClient {
    /// Create a client from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    /// Create a client against an explicit base URL (used by tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Self::new(&Config::new(base_url))
    }

    /// Issue a GET and deserialize the body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.get(&url).query(query);

        if let Some(ref token) = self.api_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(ApiError::from)?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                let data = response.json::<T>().await.map_err(|e| {
                    ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
                })?;
                Ok(data)
            }
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized.into()),
            StatusCode::FORBIDDEN => Err(ApiError::Forbidden.into()),
            StatusCode::NOT_FOUND => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Resource not found".to_string());
                Err(ApiError::NotFound(error_msg).into())
            }
            StatusCode::TOO_MANY_REQUESTS => Err(ApiError::RateLimited.into()),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Bad request".to_string());
                Err(ApiError::BadRequest(error_msg).into())
            }
            status if status.is_server_error() => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("Server error: {}", status));
                Err(ApiError::ServerError(error_msg).into())
            }
            _ => Err(ApiError::InvalidResponse(format!("Unexpected status code: {}", status)).into()),
        }
    }
}

#[async_trait]
impl LookupApi for RestClient {
    async fn list_modules(&self) -> Result<Vec<Module>> {
        let response: DataEnvelope<Module> = self.get_json("/modulos", &[]).await?;
        Ok(response.data)
    }

    async fn list_field_configs(&self, modulo_id: &str) -> Result<Vec<FieldConfig>> {
        let response: DataEnvelope<FieldConfig> = self
            .get_json("/configuracoes-campos", &[("moduloId", modulo_id)])
            .await?;
        Ok(response.data)
    }

    async fn list_dynamic_data(&self, configuracao_id: &str) -> Result<Vec<DynamicDatum>> {
        let response: DataEnvelope<DynamicDatum> = self
            .get_json("/dados-dinamicos", &[("configuracaoCampoId", configuracao_id)])
            .await?;
        Ok(response.data)
    }

    async fn fetch_one(&self, endpoint: &str, id: &str) -> Result<Value> {
        let path = format!("{}/{}", endpoint, id);
        self.get_json(&path, &[]).await
    }

    async fn search(
        &self,
        endpoint: &str,
        search_param: &str,
        term: &str,
        limit: usize,
        extra_filter: Option<(&str, &str)>,
    ) -> Result<Vec<Value>> {
        let limit = limit.to_string();
        let mut query: Vec<(&str, &str)> = vec![(search_param, term), ("limit", &limit)];
        if let Some((key, value)) = extra_filter {
            query.push((key, value));
        }

        let response: SearchResponse = self.get_json(endpoint, &query).await?;
        Ok(response.into_items())
    }
}
