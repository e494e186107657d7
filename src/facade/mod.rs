//! Delete and lookup by cache id.
//!
//! Deletes never return an error: partial failure is reported through
//! [`DeleteResult::failed_ids`]. Backends with native batch delete get one call;
//! per-key backends are walked id by id and a failure does not stop the loop.
//! Every backend call runs under the deleter's port timeout; a timed-out id
//! counts as failed.

pub mod error;
pub mod types;


pub use error::{FacadeError, FacadeResult};
pub use types::{DeleteRequest, DeleteResult};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::pipeline::DEFAULT_RETRIEVE_TIMEOUT;
use crate::vectordb::{Payload, VectorDbResult, VectorStore};

pub struct CacheDeleter {
    store: Arc<dyn VectorStore>,
    port_timeout: Duration,
}

impl std::fmt::Debug for CacheDeleter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheDeleter")
            .field("backend", &self.store.backend_name())
            .field("port_timeout", &self.port_timeout)
            .finish()
    }
}

impl CacheDeleter {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self {
            store,
            port_timeout: DEFAULT_RETRIEVE_TIMEOUT,
        }
    }

    /// Deadline applied to each backend call.
    pub fn port_timeout(mut self, timeout: Duration) -> Self {
        self.port_timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.port_timeout
    }

    async fn within<T, F>(&self, operation: &'static str, call: F) -> FacadeResult<T>
    where
        F: Future<Output = VectorDbResult<T>>,
    {
        match tokio::time::timeout(self.port_timeout, call).await {
            Ok(result) => result.map_err(FacadeError::from),
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.port_timeout.as_millis() as u64,
                    "vector store call timed out"
                );
                Err(FacadeError::Timeout {
                    operation,
                    after: self.port_timeout,
                })
            }
        }
    }

    #[instrument(
        skip(self, request),
        fields(user_type = %request.user_type, count = request.ids.len(), force = request.force)
    )]
    pub async fn delete(&self, request: &DeleteRequest) -> DeleteResult {
        if request.ids.is_empty() {
            debug!("nothing to delete");
            return DeleteResult::empty();
        }

        let result = if self.store.supports_batch_delete() {
            match self.within("delete", self.store.delete(&request.ids)).await {
                Ok(()) => DeleteResult::from_parts(request.ids.len(), Vec::new(), None),
                Err(e) => {
                    warn!(error = %e, "batch delete failed");
                    DeleteResult::all_failed(&request.ids, e.to_string())
                }
            }
        } else {
            self.delete_each(&request.ids).await
        };

        info!(
            deleted = result.deleted_count,
            failed = result.failed_ids.len(),
            "delete complete"
        );
        result
    }

    async fn delete_each(&self, ids: &[String]) -> DeleteResult {
        let mut deleted = 0;
        let mut failed = Vec::new();
        let mut first_error = None;

        for id in ids {
            match self.within("delete_one", self.store.delete_one(id)).await {
                Ok(()) => deleted += 1,
                Err(e) => {
                    warn!(cache_id = %id, error = %e, "delete failed");
                    first_error.get_or_insert_with(|| e.to_string());
                    failed.push(id.clone());
                }
            }
        }

        DeleteResult::from_parts(deleted, failed, first_error)
    }

    /// Deletes one id, turning an unsuccessful result into an error.
    #[instrument(skip(self), fields(backend = self.store.backend_name()))]
    pub async fn delete_single(&self, id: &str, user_type: &str, force: bool) -> FacadeResult<()> {
        let ids = [id.to_string()];
        let outcome = if self.store.supports_batch_delete() {
            self.within("delete", self.store.delete(&ids)).await
        } else {
            self.within("delete_one", self.store.delete_one(id)).await
        };

        match outcome {
            Ok(()) => {
                info!("entry deleted");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "delete failed");
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &str) -> FacadeResult<Payload> {
        self.within("get_by_id", self.store.get_by_id(id)).await
    }

    pub async fn health_check(&self) -> FacadeResult<()> {
        self.within("health_check", self.store.health_check()).await
    }
}
