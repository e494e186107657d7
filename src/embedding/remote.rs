//! OpenAI-compatible remote embedder.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{Embedder, EmbeddingError, EmbeddingResult, l2_normalize};

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBEDDING_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
/// Configuration for [`RemoteEmbedder`].
pub struct RemoteEmbedderConfig {
    /// Base URL; `/embeddings` is appended. Example: `https://api.openai.com/v1`.
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Expected output dimension.
    pub dimension: usize,
    /// Scale returned vectors to unit length.
    pub normalize: bool,
    pub timeout: Duration,
}

impl Default for RemoteEmbedderConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            api_key: None,
            dimension: crate::constants::DEFAULT_EMBEDDING_DIM,
            normalize: true,
            timeout: DEFAULT_EMBEDDING_TIMEOUT,
        }
    }
}

impl RemoteEmbedderConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    pub fn model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.is_empty());
        self
    }

    pub fn dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> EmbeddingResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(EmbeddingError::NotConfigured {
                reason: "embedding base URL is empty".to_string(),
            });
        }
        if self.model.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model must not be empty".to_string(),
            });
        }
        if self.dimension == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "dimension must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

#[derive(Clone)]
/// Embedder backed by an OpenAI-compatible HTTP API.
pub struct RemoteEmbedder {
    http: HttpClient,
    endpoint: String,
    config: RemoteEmbedderConfig,
}

impl std::fmt::Debug for RemoteEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteEmbedder")
            .field("endpoint", &self.endpoint)
            .field("model", &self.config.model)
            .field("dimension", &self.config.dimension)
            .finish()
    }
}

impl RemoteEmbedder {
    pub fn new(config: RemoteEmbedderConfig) -> EmbeddingResult<Self> {
        config.validate()?;

        let http = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbeddingError::InvalidConfig {
                reason: e.to_string(),
            })?;

        let endpoint = format!("{}/embeddings", config.base_url.trim_end_matches('/'));

        Ok(Self {
            http,
            endpoint,
            config,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Embedder for RemoteEmbedder {
    #[instrument(skip(self, texts), fields(model = %self.config.model, inputs = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut request = self.http.post(&self.endpoint).json(&EmbeddingRequest {
            model: &self.config.model,
            input: texts,
        });
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let mut parsed: EmbeddingResponse = response.json().await?;
        if parsed.data.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: parsed.data.len(),
            });
        }

        parsed.data.sort_by_key(|d| d.index);
        let vectors: Vec<Vec<f32>> = parsed
            .data
            .into_iter()
            .map(|d| {
                let mut v = d.embedding;
                if self.config.normalize {
                    l2_normalize(&mut v);
                }
                v
            })
            .collect();

        debug!(
            vectors = vectors.len(),
            dim = vectors.first().map(|v| v.len()).unwrap_or(0),
            "embedding batch complete"
        );
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}
