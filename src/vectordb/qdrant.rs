//! Qdrant adapter for [`VectorStore`].

use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter, GetPointsBuilder,
    PointId, PointStruct, PointsIdsList, ScoredPoint, SearchPointsBuilder, UpsertPointsBuilder,
    VectorParamsBuilder,
};
use qdrant_client::{Payload as QdrantPayload, Qdrant};
use std::collections::HashMap;
use tracing::{debug, instrument};

use super::config::QdrantConfig;
use super::error::{VectorDbError, VectorDbResult};
use super::model::{CacheEntry, Payload, SearchFilter, SearchMatch};
use super::VectorStore;
use crate::constants::{PAYLOAD_USER_TYPE, validate_embedding_dim};

#[derive(Clone)]
/// Qdrant-backed store. Point ids are UUID strings; tenant isolation uses a
/// `user_type` payload match.
pub struct QdrantStore {
    client: Qdrant,
    config: QdrantConfig,
}

impl QdrantStore {
    /// Builds a client for `config.url`. Does not touch the network.
    pub fn new(config: QdrantConfig) -> VectorDbResult<Self> {
        let mut builder = Qdrant::from_url(&config.url);
        if let Some(key) = &config.api_key {
            builder = builder.api_key(key.clone());
        }

        let client = builder
            .build()
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: config.url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self { client, config })
    }

    pub fn collection(&self) -> &str {
        &self.config.collection
    }

    /// Creates the collection (cosine distance) if it does not exist.
    pub async fn ensure_collection(&self) -> VectorDbResult<()> {
        let name = &self.config.collection;
        let exists = self.client.collection_exists(name.as_str()).await.map_err(|e| {
            VectorDbError::CreateCollectionFailed {
                collection: name.clone(),
                message: e.to_string(),
            }
        })?;

        if exists {
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name.as_str())
                    .vectors_config(VectorParamsBuilder::new(
                        self.config.vector_size,
                        Distance::Cosine,
                    ))
                    .on_disk_payload(true),
            )
            .await
            .map_err(|e| VectorDbError::CreateCollectionFailed {
                collection: name.clone(),
                message: e.to_string(),
            })?;

        debug!(collection = %name, size = self.config.vector_size, "created collection");
        Ok(())
    }

    fn search_failed(&self, message: impl ToString) -> VectorDbError {
        VectorDbError::SearchFailed {
            collection: self.config.collection.clone(),
            message: message.to_string(),
        }
    }
}

/// Qdrant accepts UUIDs and unsigned integers as point ids.
pub(super) fn parse_point_id(id: &str) -> Option<PointId> {
    if uuid::Uuid::parse_str(id).is_ok() {
        return Some(PointId::from(id.to_string()));
    }
    id.parse::<u64>().ok().map(PointId::from)
}

pub(super) fn point_id_to_string(id: Option<PointId>) -> Option<String> {
    match id.and_then(|pid| pid.point_id_options) {
        Some(PointIdOptions::Uuid(s)) => Some(s),
        Some(PointIdOptions::Num(n)) => Some(n.to_string()),
        None => None,
    }
}

fn payload_from_qdrant(raw: HashMap<String, qdrant_client::qdrant::Value>) -> Payload {
    raw.into_iter().map(|(k, v)| (k, v.into_json())).collect()
}

fn match_from_scored_point(point: ScoredPoint) -> Option<SearchMatch> {
    let id = point_id_to_string(point.id)?;
    Some(SearchMatch::new(
        id,
        point.score,
        payload_from_qdrant(point.payload),
    ))
}

#[async_trait]
impl VectorStore for QdrantStore {
    fn backend_name(&self) -> &'static str {
        "qdrant"
    }

    #[instrument(skip(self, entry), fields(id = %entry.id, user_type = %entry.user_type))]
    async fn upsert(&self, entry: CacheEntry) -> VectorDbResult<()> {
        validate_embedding_dim(entry.vector.len(), self.config.vector_size as usize)?;

        let id = parse_point_id(&entry.id).ok_or_else(|| VectorDbError::UpsertFailed {
            collection: self.config.collection.clone(),
            message: format!("point id '{}' is not a UUID or integer", entry.id),
        })?;
        let payload = QdrantPayload::from(entry.to_payload());
        let point = PointStruct::new(id, entry.vector, payload);

        self.client
            .upsert_points(
                UpsertPointsBuilder::new(self.config.collection.as_str(), vec![point])
                    .wait(self.config.wait),
            )
            .await
            .map_err(|e| VectorDbError::UpsertFailed {
                collection: self.config.collection.clone(),
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
        let mut builder =
            SearchPointsBuilder::new(self.config.collection.as_str(), vector.to_vec(), top_k as u64)
                .with_payload(true)
                .filter(Filter::must([Condition::matches(
                    PAYLOAD_USER_TYPE,
                    filter.user_type.clone(),
                )]));

        if score_threshold > 0.0 {
            builder = builder.score_threshold(score_threshold);
        }

        let response = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| self.search_failed(e))?;

        Ok(response
            .result
            .into_iter()
            .filter_map(match_from_scored_point)
            .collect())
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn delete(&self, ids: &[String]) -> VectorDbResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut point_ids = Vec::with_capacity(ids.len());
        for id in ids {
            let pid = parse_point_id(id).ok_or_else(|| VectorDbError::DeleteFailed {
                collection: self.config.collection.clone(),
                message: format!("point id '{}' is not a UUID or integer", id),
            })?;
            point_ids.push(pid);
        }

        self.client
            .delete_points(
                DeletePointsBuilder::new(self.config.collection.as_str())
                    .points(PointsIdsList { ids: point_ids })
                    .wait(true),
            )
            .await
            .map_err(|e| VectorDbError::DeleteFailed {
                collection: self.config.collection.clone(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> VectorDbResult<Payload> {
        let Some(point_id) = parse_point_id(id) else {
            return Err(VectorDbError::NotFound { id: id.to_string() });
        };

        let response = self
            .client
            .get_points(
                GetPointsBuilder::new(self.config.collection.as_str(), vec![point_id])
                    .with_payload(true),
            )
            .await
            .map_err(|e| VectorDbError::GetFailed {
                collection: self.config.collection.clone(),
                id: id.to_string(),
                message: e.to_string(),
            })?;

        response
            .result
            .into_iter()
            .next()
            .map(|point| payload_from_qdrant(point.payload))
            .ok_or_else(|| VectorDbError::NotFound { id: id.to_string() })
    }

    async fn health_check(&self) -> VectorDbResult<()> {
        self.client
            .health_check()
            .await
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: self.config.url.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}
