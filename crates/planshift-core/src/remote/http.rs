//! HTTP implementation of the remote store client

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, error};

use crate::config::RemoteConfig;
use crate::constants;
use crate::model::{PlantPayload, ProductPayload};

use super::types::{OptimizeConfig, OptimizeResult, SeedSummary, StoredPlant, StoredProduct};
use super::{DeleteOutcome, RemoteError, RemoteStore};

/// Remote store client backed by reqwest
pub struct HttpRemoteStore {
    http: Client,
    base_url: String,
}

impl HttpRemoteStore {
    /// Create a client against the configured base URL
    pub fn new(config: &RemoteConfig) -> Self {
        let http = Client::builder()
            .user_agent("Planshift/0.1")
            .connect_timeout(constants::http::CONNECT_TIMEOUT)
            .timeout(constants::http::REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                error!("Failed to build HTTP client: {}. Using default client.", e);
                Client::new()
            });

        Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Turn a non-2xx response into a [`RemoteError::Status`], pulling
    /// the `detail` field out of the body when the store provides one
    async fn check(response: Response) -> Result<Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
            .unwrap_or(body);

        Err(RemoteError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn delete(&self, path: &str) -> Result<DeleteOutcome, RemoteError> {
        let response = self.http.delete(self.url(path)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(path, "delete target already gone");
            return Ok(DeleteOutcome::NotFound);
        }
        Self::check(response).await?;
        Ok(DeleteOutcome::Deleted)
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn list_products(&self) -> Result<Vec<StoredProduct>, RemoteError> {
        let response = self.http.get(self.url("products")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn create_product(&self, payload: &ProductPayload) -> Result<StoredProduct, RemoteError> {
        let response = self
            .http
            .post(self.url("products"))
            .json(payload)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete_product(&self, id: i64) -> Result<DeleteOutcome, RemoteError> {
        self.delete(&format!("products/{id}")).await
    }

    async fn list_plants(&self) -> Result<Vec<StoredPlant>, RemoteError> {
        let response = self.http.get(self.url("plants")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn create_plant(&self, payload: &PlantPayload) -> Result<StoredPlant, RemoteError> {
        let response = self
            .http
            .post(self.url("plants"))
            .json(payload)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete_plant(&self, id: i64) -> Result<DeleteOutcome, RemoteError> {
        self.delete(&format!("plants/{id}")).await
    }

    async fn generate_plan(&self, config: &OptimizeConfig) -> Result<OptimizeResult, RemoteError> {
        let response = self
            .http
            .post(self.url("transfer-plan/generate"))
            .json(config)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn load_example_data(&self) -> Result<SeedSummary, RemoteError> {
        let response = self
            .http
            .post(self.url("transfer-plan/load-example-data"))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}
