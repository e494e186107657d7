//! Query and store pipelines.
//!
//! Both hold their ports as trait objects and keep no mutable state, so one
//! instance serves any number of concurrent requests. Every port call runs under
//! a deadline; dropping the returned future cancels the remaining stages.

pub mod config;
pub mod error;
pub mod query;
pub mod store;
pub mod types;


pub use config::{DEFAULT_EMBEDDING_TIMEOUT, DEFAULT_RETRIEVE_TIMEOUT, QueryConfig};
pub use error::{PipelineError, PipelineResult};
pub use query::QueryPipeline;
pub use store::StorePipeline;
pub use types::{QueryHit, QueryOutcome, QueryRequest, StoreOutcome, WriteRequest};

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Runs a port call under `after`, mapping both its error and an elapsed deadline
/// into [`PipelineError`].
pub(crate) async fn with_deadline<T, E, F>(
    stage: &'static str,
    after: Duration,
    call: F,
) -> PipelineResult<T>
where
    F: Future<Output = Result<T, E>>,
    PipelineError: From<E>,
{
    match tokio::time::timeout(after, call).await {
        Ok(result) => result.map_err(PipelineError::from),
        Err(_) => {
            warn!(stage, timeout_ms = after.as_millis() as u64, "port call timed out");
            Err(PipelineError::Timeout { stage, after })
        }
    }
}
