//! Redis adapter for [`VectorStore`].
//!
//! Each entry is a JSON string at `{prefix}:entry:{id}`. A set at
//! `{prefix}:user_type:{user_type}` indexes the ids of one tenant; search loads
//! that tenant's entries and ranks them by cosine similarity. Redis offers no
//! atomic multi-entry delete here, so the façade deletes ids one at a time.

use std::fmt;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::{debug, instrument, warn};

use super::config::RedisConfig;
use super::error::{VectorDbError, VectorDbResult};
use super::model::{CacheEntry, Payload, SearchFilter, SearchMatch, rank_entries};
use super::VectorStore;
use crate::constants::validate_embedding_dim;

#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
    config: RedisConfig,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

/// Entries and tenant indexes live under distinct segments so no id can address an index.
pub(super) fn entry_key(prefix: &str, id: &str) -> String {
    format!("{}:entry:{}", prefix, id)
}

pub(super) fn tenant_index_key(prefix: &str, user_type: &str) -> String {
    format!("{}:user_type:{}", prefix, user_type)
}

impl RedisStore {
    pub async fn connect(config: RedisConfig) -> VectorDbResult<Self> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| VectorDbError::ConnectionFailed {
                url: config.url.clone(),
                message: e.to_string(),
            })?;

        let connection =
            ConnectionManager::new(client)
                .await
                .map_err(|e| VectorDbError::ConnectionFailed {
                    url: config.url.clone(),
                    message: e.to_string(),
                })?;

        Ok(Self { connection, config })
    }

    async fn load_entry(&self, id: &str) -> VectorDbResult<Option<CacheEntry>> {
        let mut conn = self.connection.clone();
        let raw: Option<String> =
            conn.get(entry_key(&self.config.prefix, id))
                .await
                .map_err(|e| VectorDbError::GetFailed {
                    collection: self.config.prefix.clone(),
                    id: id.to_string(),
                    message: e.to_string(),
                })?;

        raw.map(|json| decode_entry(id, &json)).transpose()
    }
}

pub(super) fn decode_entry(id: &str, json: &str) -> VectorDbResult<CacheEntry> {
    serde_json::from_str(json).map_err(|e| VectorDbError::Serialization {
        id: id.to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl VectorStore for RedisStore {
    fn backend_name(&self) -> &'static str {
        "redis"
    }

    #[instrument(skip(self, entry), fields(id = %entry.id, user_type = %entry.user_type))]
    async fn upsert(&self, entry: CacheEntry) -> VectorDbResult<()> {
        validate_embedding_dim(entry.vector.len(), self.config.vector_size as usize)?;

        let json = serde_json::to_string(&entry).map_err(|e| VectorDbError::Serialization {
            id: entry.id.clone(),
            message: e.to_string(),
        })?;

        let mut conn = self.connection.clone();
        let _: () = redis::pipe()
            .atomic()
            .set(entry_key(&self.config.prefix, &entry.id), json)
            .ignore()
            .sadd(
                tenant_index_key(&self.config.prefix, &entry.user_type),
                &entry.id,
            )
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| VectorDbError::UpsertFailed {
                collection: self.config.prefix.clone(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    #[instrument(skip(self, vector, filter), fields(user_type = %filter.user_type))]
    async fn search(
        &self,
        vector: &[f32],
        top_k: usize,
        score_threshold: f32,
        filter: &SearchFilter,
    ) -> VectorDbResult<Vec<SearchMatch>> {
        let search_failed = |message: String| VectorDbError::SearchFailed {
            collection: self.config.prefix.clone(),
            message,
        };

        let mut conn = self.connection.clone();
        let ids: Vec<String> = conn
            .smembers(tenant_index_key(&self.config.prefix, &filter.user_type))
            .await
            .map_err(|e| search_failed(e.to_string()))?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for id in &ids {
            pipe.get(entry_key(&self.config.prefix, id));
        }
        let raw: Vec<Option<String>> = pipe
            .query_async(&mut conn)
            .await
            .map_err(|e| search_failed(e.to_string()))?;

        let mut entries = Vec::with_capacity(raw.len());
        for (id, json) in ids.iter().zip(raw) {
            // Index members can outlive their entry; a corrupt entry fails the search.
            let Some(json) = json else { continue };
            entries.push(decode_entry(id, &json)?);
        }

        debug!(scanned = entries.len(), "redis scan complete");
        Ok(rank_entries(
            entries.iter(),
            vector,
            top_k,
            score_threshold,
            filter,
        ))
    }

    async fn delete(&self, ids: &[String]) -> VectorDbResult<()> {
        for id in ids {
            self.delete_one(id).await?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_one(&self, id: &str) -> VectorDbResult<()> {
        let user_type = match self.load_entry(id).await {
            Ok(entry) => entry.map(|e| e.user_type),
            Err(e) => {
                warn!(id = %id, error = %e, "could not read entry before delete");
                None
            }
        };

        let mut conn = self.connection.clone();
        let deleted: i32 = conn
            .del(entry_key(&self.config.prefix, id))
            .await
            .map_err(|e| VectorDbError::DeleteFailed {
                collection: self.config.prefix.clone(),
                message: format!("failed to delete key '{}': {}", id, e),
            })?;

        if deleted == 0 {
            return Err(VectorDbError::NotFound { id: id.to_string() });
        }

        if let Some(user_type) = user_type {
            let removed: Result<i32, _> = conn
                .srem(tenant_index_key(&self.config.prefix, &user_type), id)
                .await;
            if let Err(e) = removed {
                warn!(id = %id, error = %e, "entry deleted but index cleanup failed");
            }
        }

        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> VectorDbResult<Payload> {
        self.load_entry(id)
            .await?
            .map(|entry| entry.to_payload())
            .ok_or_else(|| VectorDbError::NotFound { id: id.to_string() })
    }

    fn supports_batch_delete(&self) -> bool {
        false
    }

    async fn health_check(&self) -> VectorDbResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: self.config.url.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}
