//! Test server harness.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use recall::embedding::MockEmbedder;
use recall::gateway::{AppState, create_router};
use recall::pipeline::{QueryConfig, QueryPipeline, StorePipeline};
use recall::quality::{QualityConfig, QualityGate};
use recall::vectordb::MockVectorStore;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;
pub const TEST_DIM: usize = 64;

#[derive(Debug, Clone)]
pub struct TestServerConfig {
    pub query: QueryConfig,
    pub quality: QualityConfig,
    /// Build the store without native batch delete.
    pub per_key_delete: bool,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            query: QueryConfig::default(),
            quality: QualityConfig::default(),
            per_key_delete: false,
        }
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<MockVectorStore>,
    pub embedder: Arc<MockEmbedder>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

/// Spawns the full router on an ephemeral port with the mock embedder and
/// mock vector store. The store handle is returned so tests can inspect it.
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let local_addr = listener.local_addr()?;

    let embedder = Arc::new(MockEmbedder::new(TEST_DIM));
    let store = Arc::new(if config.per_key_delete {
        MockVectorStore::per_key(TEST_DIM)
    } else {
        MockVectorStore::new(TEST_DIM)
    });

    let query = QueryPipeline::new(embedder.clone(), store.clone(), config.query)
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    let writer = StorePipeline::new(
        QualityGate::new(config.quality),
        embedder.clone(),
        store.clone(),
    );
    let app = create_router(AppState::new(query, writer, store.clone()));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        store,
        embedder,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}
