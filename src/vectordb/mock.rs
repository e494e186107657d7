use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::{VectorDbError, VectorDbResult};
use super::memory::MemoryStore;
use super::model::{CacheEntry, Payload, SearchFilter, SearchMatch};
use super::VectorStore;

const MOCK_COLLECTION: &str = "mock";

#[derive(Debug, Clone, PartialEq)]
/// Arguments of the most recent `search` call.
pub struct RecordedSearch {
    pub top_k: usize,
    pub score_threshold: f32,
    pub user_type: String,
    pub vector_len: usize,
}

/// In-memory [`VectorStore`] test double with failure injection and call counters.
#[derive(Debug)]
pub struct MockVectorStore {
    inner: MemoryStore,
    batch_delete: bool,
    canned: RwLock<Option<Vec<SearchMatch>>>,
    fail_search: AtomicBool,
    fail_upsert: AtomicBool,
    fail_delete: AtomicBool,
    unhealthy: AtomicBool,
    failing_ids: RwLock<HashSet<String>>,
    search_delay: Option<Duration>,
    upsert_delay: Option<Duration>,
    stalled_ids: RwLock<HashSet<String>>,
    last_search: RwLock<Option<RecordedSearch>>,
    search_calls: AtomicUsize,
    upsert_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    delete_one_calls: AtomicUsize,
    get_calls: AtomicUsize,
}

impl MockVectorStore {
    /// A store that advertises native batch delete.
    pub fn new(vector_size: usize) -> Self {
        Self {
            inner: MemoryStore::new(vector_size),
            batch_delete: true,
            canned: RwLock::new(None),
            fail_search: AtomicBool::new(false),
            fail_upsert: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            unhealthy: AtomicBool::new(false),
            failing_ids: RwLock::new(HashSet::new()),
            search_delay: None,
            upsert_delay: None,
            stalled_ids: RwLock::new(HashSet::new()),
            last_search: RwLock::new(None),
            search_calls: AtomicUsize::new(0),
            upsert_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            delete_one_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
        }
    }

    /// A store that only deletes one key at a time.
    pub fn per_key(vector_size: usize) -> Self {
        Self {
            batch_delete: false,
            ..Self::new(vector_size)
        }
    }

    pub fn with_search_delay(mut self, delay: Duration) -> Self {
        self.search_delay = Some(delay);
        self
    }

    pub fn with_upsert_delay(mut self, delay: Duration) -> Self {
        self.upsert_delay = Some(delay);
        self
    }

    /// Makes every delete or lookup touching `id` hang forever.
    pub fn stall_id(&self, id: &str) {
        self.stalled_ids.write().insert(id.to_string());
    }

    async fn stall_if_listed(&self, ids: &[String]) {
        let stalled = {
            let listed = self.stalled_ids.read();
            ids.iter().any(|id| listed.contains(id))
        };
        if stalled {
            std::future::pending::<()>().await;
        }
    }

    /// Makes `search` return exactly `matches`, ignoring stored entries.
    pub fn set_search_results(&self, matches: Vec<SearchMatch>) {
        *self.canned.write() = Some(matches);
    }

    pub fn set_fail_search(&self, fail: bool) {
        self.fail_search.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_upsert(&self, fail: bool) {
        self.fail_upsert.store(fail, Ordering::SeqCst);
    }

    /// Makes batch `delete` fail as a whole.
    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn set_unhealthy(&self, unhealthy: bool) {
        self.unhealthy.store(unhealthy, Ordering::SeqCst);
    }

    /// Makes `delete_one` (and any batch containing it) fail for this id.
    pub fn fail_delete_for(&self, id: &str) {
        self.failing_ids.write().insert(id.to_string());
    }

    pub fn store(&self) -> &MemoryStore {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn last_search(&self) -> Option<RecordedSearch> {
        self.last_search.read().clone()
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn delete_one_calls(&self) -> usize {
        self.delete_one_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    /// Total backend calls of any kind.
    pub fn total_calls(&self) -> usize {
        self.search_calls()
            + self.upsert_calls()
            + self.delete_calls()
            + self.delete_one_calls()
            + self.get_calls()
    }

    fn injected_delete_failure(&self, message: String) -> VectorDbError {
        VectorDbError::DeleteFailed {
            collection: MOCK_COLLECTION.to_string(),
            message,
        }
    }
}

#[async_trait]
impl VectorStore for MockVectorStore {
    fn backend_name(&self) -> &'static str {
        "mock"
    }

    async fn upsert(&self, entry: CacheEntry) -> VectorDbResult<()> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.upsert_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_upsert.load(Ordering::SeqCst) {
            return Err(VectorDbError::UpsertFailed {
                collection: MOCK_COLLECTION.to_string(),
                message: "injected upsert failure".to_string(),
            });
        }
        self.inner.upsert(entry).await
    }

    async fn search(
        &self,
        vector: &[f32],
        top_k: usize,
        score_threshold: f32,
        filter: &SearchFilter,
    ) -> VectorDbResult<Vec<SearchMatch>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_search.write() = Some(RecordedSearch {
            top_k,
            score_threshold,
            user_type: filter.user_type.clone(),
            vector_len: vector.len(),
        });

        if let Some(delay) = self.search_delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_search.load(Ordering::SeqCst) {
            return Err(VectorDbError::SearchFailed {
                collection: MOCK_COLLECTION.to_string(),
                message: "injected search failure".to_string(),
            });
        }

        let canned = self.canned.read().clone();
        match canned {
            Some(matches) => Ok(matches),
            None => {
                self.inner
                    .search(vector, top_k, score_threshold, filter)
                    .await
            }
        }
    }

    async fn delete(&self, ids: &[String]) -> VectorDbResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.stall_if_listed(ids).await;
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(self.injected_delete_failure("injected batch failure".to_string()));
        }
        let poisoned = {
            let failing = self.failing_ids.read();
            ids.iter().find(|id| failing.contains(*id)).cloned()
        };
        if let Some(id) = poisoned {
            return Err(self.injected_delete_failure(format!("injected failure for '{}'", id)));
        }
        self.inner.delete(ids).await
    }

    async fn delete_one(&self, id: &str) -> VectorDbResult<()> {
        self.delete_one_calls.fetch_add(1, Ordering::SeqCst);
        self.stall_if_listed(&[id.to_string()]).await;
        if self.failing_ids.read().contains(id) {
            return Err(self.injected_delete_failure(format!("injected failure for '{}'", id)));
        }
        self.inner.delete_one(id).await
    }

    async fn get_by_id(&self, id: &str) -> VectorDbResult<Payload> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.stall_if_listed(&[id.to_string()]).await;
        self.inner.get_by_id(id).await
    }

    fn supports_batch_delete(&self) -> bool {
        self.batch_delete
    }

    async fn health_check(&self) -> VectorDbResult<()> {
        if self.unhealthy.load(Ordering::SeqCst) {
            return Err(VectorDbError::ConnectionFailed {
                url: MOCK_COLLECTION.to_string(),
                message: "injected health failure".to_string(),
            });
        }
        Ok(())
    }
}
