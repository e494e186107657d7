//! HTTP client helpers for tests.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// The response envelope, with `data` left as raw JSON.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub success: bool,
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub data: Value,
    pub request_id: String,
    pub timestamp: i64,
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TestClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

impl TestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url, path)
    }

    async fn envelope(resp: reqwest::Response) -> Result<(u16, Envelope), TestClientError> {
        let status = resp.status().as_u16();
        Ok((status, resp.json().await?))
    }

    pub async fn health(&self) -> Result<HealthResponse, TestClientError> {
        Ok(self.client.get(self.url("/healthz")).send().await?.json().await?)
    }

    pub async fn search(&self, body: Value) -> Result<(u16, Envelope), TestClientError> {
        let resp = self
            .client
            .post(self.url("/v1/cache/search"))
            .json(&body)
            .send()
            .await?;
        Self::envelope(resp).await
    }

    pub async fn store(&self, body: Value) -> Result<(u16, Envelope), TestClientError> {
        let resp = self
            .client
            .post(self.url("/v1/cache/store"))
            .json(&body)
            .send()
            .await?;
        Self::envelope(resp).await
    }

    pub async fn get(&self, id: &str, user_type: &str) -> Result<(u16, Envelope), TestClientError> {
        let resp = self
            .client
            .get(self.url(&format!("/v1/cache/{}", id)))
            .query(&[("user_type", user_type)])
            .send()
            .await?;
        Self::envelope(resp).await
    }

    pub async fn delete(&self, id: &str, user_type: &str) -> Result<(u16, Envelope), TestClientError> {
        let resp = self
            .client
            .delete(self.url(&format!("/v1/cache/{}", id)))
            .query(&[("user_type", user_type)])
            .send()
            .await?;
        Self::envelope(resp).await
    }

    pub async fn batch_delete(&self, body: Value) -> Result<(u16, Envelope), TestClientError> {
        let resp = self
            .client
            .delete(self.url("/v1/cache/batch"))
            .json(&body)
            .send()
            .await?;
        Self::envelope(resp).await
    }
}
