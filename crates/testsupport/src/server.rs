use account_api::{build_app, serve, AppState};
use account_metrics::MetricsService;
use account_models::Config;
use account_store::{AccountRegistry, MemoryAccountStore};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Config for tests: in-memory store, everything else default.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.database.url = "memory://".to_string();
    config.server.bind = "127.0.0.1".to_string();
    config.server.port = 0;
    config
}

/// Application state over a fresh in-memory store.
pub fn test_state(config: Config) -> Result<AppState> {
    let registry = AccountRegistry::new(Arc::new(MemoryAccountStore::new()));
    let metrics = Arc::new(MetricsService::new()?);
    Ok(AppState::new(config, registry, metrics))
}

/// An in-process server on an ephemeral port. Shut down on drop.
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    pub async fn stop(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await?;
        }
        Ok(())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

pub async fn spawn_server(config: Option<Config>) -> Result<TestServer> {
    let config = config.unwrap_or_else(test_config);
    let state = test_state(config)?;
    let app = build_app(state.clone())?;

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}", listener.local_addr()?);

    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        let shutdown = async {
            let _ = rx.await;
        };
        if let Err(e) = serve(listener, app, shutdown, Duration::from_secs(2)).await {
            eprintln!("test server error: {e}");
        }
    });

    Ok(TestServer {
        base_url,
        state,
        shutdown: Some(tx),
        handle: Some(handle),
    })
}
