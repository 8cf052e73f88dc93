pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use handlers::*;
pub use middleware::*;
pub use routes::*;
pub use state::*;

use account_models::AccountError;
use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// The router with every middleware the service runs behind.
pub fn build_app(state: AppState) -> Result<Router, AccountError> {
    let security = SecurityHeadersLayer::new(&state.config.security)?;
    let cors = cors_layer(&state.config.security)?;
    let body_size_limit = state
        .config
        .server
        .max_request_body_bytes()
        .ok_or_else(|| AccountError::ConfigError {
            reason: "server.max_request_body_size_kb is too large".to_string(),
        })?;

    // CORS sits outside the JSON rewrite so rewritten 405/413s keep its headers
    Ok(Router::new().merge(build_router(state)).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(security)
            .layer(cors)
            .layer(axum::middleware::map_response(json_error_bodies))
            .layer(DefaultBodyLimit::max(body_size_limit)),
    ))
}

/// Serves `app` on `listener` until `shutdown` resolves, then gives in-flight
/// requests `grace` to finish.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    shutdown: F,
    grace: Duration,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown.await;
        let _ = signalled_tx.send(());
    });
    let mut handle = tokio::spawn(async move { server.await });

    tokio::select! {
        result = &mut handle => result??,
        _ = signalled_rx => {
            info!("Draining in-flight requests (up to {:?})", grace);
            match tokio::time::timeout(grace, &mut handle).await {
                Ok(result) => result??,
                Err(_) => {
                    warn!("Graceful shutdown timed out; dropping remaining connections");
                    handle.abort();
                }
            }
        }
    }
    Ok(())
}

pub async fn start_server(state: AppState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let address = state.config.listen_address();
    let grace = Duration::from_secs(state.config.server.shutdown_timeout_secs);
    let app = build_app(state)?;

    let listener = TcpListener::bind(&address).await?;
    info!("Account API server listening on {}", address);

    serve(listener, app, shutdown_signal(), grace).await
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Unable to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Unable to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
