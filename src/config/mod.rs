//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `RECALL_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::fmt::Display;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_COLLECTION_NAME, DEFAULT_SCORE_THRESHOLD, DEFAULT_TOP_K, DEFAULT_VECTOR_SIZE_U64,
    MAX_TOP_K,
};
use crate::embedding::{DEFAULT_EMBEDDING_MODEL, RemoteEmbedderConfig};
use crate::normalize::NormalizeMode;
use crate::pipeline::{DEFAULT_EMBEDDING_TIMEOUT, DEFAULT_RETRIEVE_TIMEOUT, QueryConfig};
use crate::quality::QualityConfig;
use crate::selector::{
    DEFAULT_SOFTMAX_TOP_K, DEFAULT_TEMPERATURE, ResultSelector, SelectionStrategy,
};
use crate::vectordb::{
    DEFAULT_QDRANT_URL, DEFAULT_REDIS_URL, QdrantConfig, RedisConfig, VectorBackend,
    VectorStoreConfig,
};

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `RECALL_*` overrides on top of defaults,
/// then [`Config::validate`] before building anything from it.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Which vector store adapter to build. Default: `qdrant`.
    pub vector_backend: VectorBackend,

    pub qdrant_url: String,
    pub qdrant_api_key: Option<String>,

    /// Qdrant collection name. Default: `llm_cache`.
    pub collection: String,

    /// Embedding dimension of the collection. Default: `1536`.
    pub vector_size: u64,

    pub redis_url: String,

    /// Redis key prefix. Default: `llm_cache`.
    pub redis_prefix: String,

    /// Base URL of the embeddings API. Required by the server binary.
    pub embedding_url: Option<String>,
    pub embedding_model: String,
    pub embedding_api_key: Option<String>,
    pub embedding_normalize: bool,

    pub top_k: usize,
    pub score_threshold: f32,

    /// `first`, `highest_score` or `temperature_softmax`.
    pub selection_strategy: String,
    pub temperature: f32,
    pub softmax_top_k: usize,

    pub preprocess: NormalizeMode,

    pub embedding_timeout: Duration,
    pub retrieve_timeout: Duration,

    pub quality: QualityConfig,

    /// Parsed and reported; eviction is left to the backend.
    pub cache_ttl: Duration,

    /// Parsed and reported; eviction is left to the backend.
    pub max_cache_size: u64,
}

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(86_400);
pub const DEFAULT_MAX_CACHE_SIZE: u64 = 100_000;

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            vector_backend: VectorBackend::default(),
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            qdrant_api_key: None,
            collection: DEFAULT_COLLECTION_NAME.to_string(),
            vector_size: DEFAULT_VECTOR_SIZE_U64,
            redis_url: DEFAULT_REDIS_URL.to_string(),
            redis_prefix: DEFAULT_COLLECTION_NAME.to_string(),
            embedding_url: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_api_key: None,
            embedding_normalize: true,
            top_k: DEFAULT_TOP_K,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            selection_strategy: SelectionStrategy::HighestScore.name().to_string(),
            temperature: DEFAULT_TEMPERATURE,
            softmax_top_k: DEFAULT_SOFTMAX_TOP_K,
            preprocess: NormalizeMode::default(),
            embedding_timeout: DEFAULT_EMBEDDING_TIMEOUT,
            retrieve_timeout: DEFAULT_RETRIEVE_TIMEOUT,
            quality: QualityConfig::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
            max_cache_size: DEFAULT_MAX_CACHE_SIZE,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "RECALL_PORT";
    const ENV_BIND_ADDR: &'static str = "RECALL_BIND_ADDR";
    const ENV_VECTOR_BACKEND: &'static str = "RECALL_VECTOR_BACKEND";
    const ENV_QDRANT_URL: &'static str = "RECALL_QDRANT_URL";
    const ENV_QDRANT_API_KEY: &'static str = "RECALL_QDRANT_API_KEY";
    const ENV_COLLECTION: &'static str = "RECALL_COLLECTION";
    const ENV_VECTOR_SIZE: &'static str = "RECALL_VECTOR_SIZE";
    const ENV_REDIS_URL: &'static str = "RECALL_REDIS_URL";
    const ENV_REDIS_PREFIX: &'static str = "RECALL_REDIS_PREFIX";
    const ENV_EMBEDDING_URL: &'static str = "RECALL_EMBEDDING_URL";
    const ENV_EMBEDDING_MODEL: &'static str = "RECALL_EMBEDDING_MODEL";
    const ENV_EMBEDDING_API_KEY: &'static str = "RECALL_EMBEDDING_API_KEY";
    const ENV_EMBEDDING_NORMALIZE: &'static str = "RECALL_EMBEDDING_NORMALIZE";
    const ENV_TOP_K: &'static str = "RECALL_TOP_K";
    const ENV_SCORE_THRESHOLD: &'static str = "RECALL_SCORE_THRESHOLD";
    const ENV_SELECTION_STRATEGY: &'static str = "RECALL_SELECTION_STRATEGY";
    const ENV_TEMPERATURE: &'static str = "RECALL_TEMPERATURE";
    const ENV_SOFTMAX_TOP_K: &'static str = "RECALL_SOFTMAX_TOP_K";
    const ENV_PREPROCESS: &'static str = "RECALL_PREPROCESS";
    const ENV_EMBEDDING_TIMEOUT: &'static str = "RECALL_EMBEDDING_TIMEOUT_SECS";
    const ENV_RETRIEVE_TIMEOUT: &'static str = "RECALL_RETRIEVE_TIMEOUT_SECS";
    const ENV_QUALITY_ENABLED: &'static str = "RECALL_QUALITY_ENABLED";
    const ENV_QUALITY_MIN_QUESTION: &'static str = "RECALL_QUALITY_MIN_QUESTION";
    const ENV_QUALITY_MIN_ANSWER: &'static str = "RECALL_QUALITY_MIN_ANSWER";
    const ENV_QUALITY_MAX_QUESTION: &'static str = "RECALL_QUALITY_MAX_QUESTION";
    const ENV_QUALITY_MAX_ANSWER: &'static str = "RECALL_QUALITY_MAX_ANSWER";
    const ENV_QUALITY_THRESHOLD: &'static str = "RECALL_QUALITY_THRESHOLD";
    const ENV_QUALITY_BLACKLIST: &'static str = "RECALL_QUALITY_BLACKLIST";
    const ENV_CACHE_TTL: &'static str = "RECALL_CACHE_TTL_SECS";
    const ENV_MAX_CACHE_SIZE: &'static str = "RECALL_MAX_CACHE_SIZE";

    /// Loads configuration from environment variables (falling back to defaults).
    ///
    /// A variable that is set but unparsable is an error, never silently ignored.
    pub fn from_env() -> Result<Self, ConfigError> {
        let d = Self::default();

        let quality = QualityConfig {
            enabled: Self::parse_bool_from_env(Self::ENV_QUALITY_ENABLED, d.quality.enabled)?,
            min_question_len: Self::parse_from_env(
                Self::ENV_QUALITY_MIN_QUESTION,
                d.quality.min_question_len,
            )?,
            max_question_len: Self::parse_from_env(
                Self::ENV_QUALITY_MAX_QUESTION,
                d.quality.max_question_len,
            )?,
            min_answer_len: Self::parse_from_env(
                Self::ENV_QUALITY_MIN_ANSWER,
                d.quality.min_answer_len,
            )?,
            max_answer_len: Self::parse_from_env(
                Self::ENV_QUALITY_MAX_ANSWER,
                d.quality.max_answer_len,
            )?,
            score_threshold: Self::parse_from_env(
                Self::ENV_QUALITY_THRESHOLD,
                d.quality.score_threshold,
            )?,
            blacklist: Self::parse_list_from_env(Self::ENV_QUALITY_BLACKLIST)
                .unwrap_or(d.quality.blacklist),
        };

        Ok(Self {
            port: Self::parse_port_from_env(d.port)?,
            bind_addr: Self::parse_bind_addr_from_env(d.bind_addr)?,
            vector_backend: Self::parse_from_env(Self::ENV_VECTOR_BACKEND, d.vector_backend)?,
            qdrant_url: Self::parse_string_from_env(Self::ENV_QDRANT_URL, d.qdrant_url),
            qdrant_api_key: Self::parse_optional_string_from_env(Self::ENV_QDRANT_API_KEY),
            collection: Self::parse_string_from_env(Self::ENV_COLLECTION, d.collection),
            vector_size: Self::parse_from_env(Self::ENV_VECTOR_SIZE, d.vector_size)?,
            redis_url: Self::parse_string_from_env(Self::ENV_REDIS_URL, d.redis_url),
            redis_prefix: Self::parse_string_from_env(Self::ENV_REDIS_PREFIX, d.redis_prefix),
            embedding_url: Self::parse_optional_string_from_env(Self::ENV_EMBEDDING_URL),
            embedding_model: Self::parse_string_from_env(
                Self::ENV_EMBEDDING_MODEL,
                d.embedding_model,
            ),
            embedding_api_key: Self::parse_optional_string_from_env(Self::ENV_EMBEDDING_API_KEY),
            embedding_normalize: Self::parse_bool_from_env(
                Self::ENV_EMBEDDING_NORMALIZE,
                d.embedding_normalize,
            )?,
            top_k: Self::parse_from_env(Self::ENV_TOP_K, d.top_k)?,
            score_threshold: Self::parse_from_env(Self::ENV_SCORE_THRESHOLD, d.score_threshold)?,
            selection_strategy: Self::parse_string_from_env(
                Self::ENV_SELECTION_STRATEGY,
                d.selection_strategy,
            ),
            temperature: Self::parse_from_env(Self::ENV_TEMPERATURE, d.temperature)?,
            softmax_top_k: Self::parse_from_env(Self::ENV_SOFTMAX_TOP_K, d.softmax_top_k)?,
            preprocess: Self::parse_from_env(Self::ENV_PREPROCESS, d.preprocess)?,
            embedding_timeout: Self::parse_secs_from_env(
                Self::ENV_EMBEDDING_TIMEOUT,
                d.embedding_timeout,
            )?,
            retrieve_timeout: Self::parse_secs_from_env(
                Self::ENV_RETRIEVE_TIMEOUT,
                d.retrieve_timeout,
            )?,
            quality,
            cache_ttl: Self::parse_secs_from_env(Self::ENV_CACHE_TTL, d.cache_ttl)?,
            max_cache_size: Self::parse_from_env(Self::ENV_MAX_CACHE_SIZE, d.max_cache_size)?,
        })
    }

    /// Checks ranges. Does not touch the network.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_TOP_K).contains(&self.top_k) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_TOP_K,
                reason: format!("must be between 1 and {}, got {}", MAX_TOP_K, self.top_k),
            });
        }
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_SCORE_THRESHOLD,
                reason: format!("must be between 0 and 1, got {}", self.score_threshold),
            });
        }
        if self.vector_size == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_VECTOR_SIZE,
                reason: "must be > 0".to_string(),
            });
        }
        if !(self.temperature > 0.0) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_TEMPERATURE,
                reason: format!("must be > 0, got {}", self.temperature),
            });
        }
        if self.softmax_top_k == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_SOFTMAX_TOP_K,
                reason: "must be > 0".to_string(),
            });
        }
        if self.embedding_timeout.is_zero() {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_EMBEDDING_TIMEOUT,
                reason: "must be > 0".to_string(),
            });
        }
        if self.retrieve_timeout.is_zero() {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_RETRIEVE_TIMEOUT,
                reason: "must be > 0".to_string(),
            });
        }
        self.quality.validate()?;
        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn selection_strategy(&self) -> SelectionStrategy {
        SelectionStrategy::from_name(
            &self.selection_strategy,
            self.temperature,
            self.softmax_top_k,
        )
    }

    pub fn query_config(&self) -> Result<QueryConfig, ConfigError> {
        let selector = ResultSelector::new(self.selection_strategy())?;
        Ok(QueryConfig::default()
            .top_k(self.top_k)
            .score_threshold(self.score_threshold)
            .selector(selector)
            .normalize_mode(self.preprocess)
            .timeouts(self.embedding_timeout, self.retrieve_timeout))
    }

    pub fn quality_config(&self) -> QualityConfig {
        self.quality.clone()
    }

    pub fn qdrant_config(&self) -> QdrantConfig {
        QdrantConfig {
            url: self.qdrant_url.clone(),
            api_key: self.qdrant_api_key.clone(),
            collection: self.collection.clone(),
            vector_size: self.vector_size,
            ..Default::default()
        }
    }

    pub fn redis_config(&self) -> RedisConfig {
        RedisConfig {
            url: self.redis_url.clone(),
            prefix: self.redis_prefix.clone(),
            vector_size: self.vector_size,
        }
    }

    pub fn vector_store_config(&self) -> VectorStoreConfig {
        VectorStoreConfig {
            backend: self.vector_backend,
            qdrant: self.qdrant_config(),
            redis: self.redis_config(),
        }
    }

    /// Fails with [`ConfigError::MissingEnvVar`] when no embeddings URL is set.
    pub fn embedder_config(&self) -> Result<RemoteEmbedderConfig, ConfigError> {
        let base_url = self
            .embedding_url
            .as_deref()
            .ok_or(ConfigError::MissingEnvVar {
                name: Self::ENV_EMBEDDING_URL,
            })?;

        Ok(RemoteEmbedderConfig::new(base_url)
            .model(&self.embedding_model)
            .api_key(self.embedding_api_key.clone())
            .dimension(self.vector_size as usize)
            .normalize(self.embedding_normalize)
            .timeout(self.embedding_timeout))
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match env::var(var_name) {
            Ok(value) if !value.trim().is_empty() => {
                value
                    .trim()
                    .parse()
                    .map_err(|e: T::Err| ConfigError::InvalidValue {
                        name: var_name,
                        reason: e.to_string(),
                        value,
                    })
            }
            _ => Ok(default),
        }
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match env::var(var_name) {
            Ok(value) => match value.trim().to_lowercase().as_str() {
                "" => Ok(default),
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidValue {
                    name: var_name,
                    value,
                    reason: "expected a boolean".to_string(),
                }),
            },
            Err(_) => Ok(default),
        }
    }

    fn parse_secs_from_env(var_name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
        Self::parse_from_env(var_name, default.as_secs()).map(Duration::from_secs)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_list_from_env(var_name: &str) -> Option<Vec<String>> {
        env::var(var_name).ok().map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
    }
}
