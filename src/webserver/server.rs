/// Axum webserver implementation
///
/// HTTP API lifecycle: bind, serve, graceful shutdown
use axum::Router;
use once_cell::sync::Lazy;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower_http::cors::CorsLayer;

use crate::{
    errors::ServerError,
    logger::{self, LogTag},
    webserver::{routes, state::AppState},
};

/// Global shutdown notifier
static SHUTDOWN_NOTIFY: Lazy<Arc<Notify>> = Lazy::new(|| Arc::new(Notify::new()));

/// Start the HTTP API
///
/// This function blocks until the server is shut down
pub async fn start_server(state: Arc<AppState>) -> Result<(), ServerError> {
    let bind_address = state.config.bind_address();
    logger::debug(
        LogTag::Webserver,
        &format!("🌐 Starting webserver on {}", bind_address),
    );

    let app = build_app(state);
    let (listener, addr) = bind_listener(&bind_address).await?;

    logger::info(
        LogTag::Webserver,
        &format!("✅ API listening on http://{}/api", addr),
    );

    // Run the server with graceful shutdown
    let shutdown_signal = async {
        SHUTDOWN_NOTIFY.notified().await;
        logger::debug(
            LogTag::Webserver,
            "Received shutdown signal, stopping webserver...",
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(ServerError::Serve)?;

    logger::info(LogTag::Webserver, "✅ Webserver stopped gracefully");

    Ok(())
}

/// Trigger webserver shutdown
pub fn shutdown() {
    logger::debug(LogTag::Webserver, "Triggering webserver shutdown...");
    SHUTDOWN_NOTIFY.notify_one();
}

/// Build the Axum application with all routes and middleware
pub fn build_app(state: Arc<AppState>) -> Router {
    let cors_permissive = state.config.cors_permissive;
    let app = routes::create_router(state);

    if cors_permissive {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Bind a TCP listener and report the actual address (port 0 resolves here)
pub async fn bind_listener(bind_address: &str) -> Result<(TcpListener, SocketAddr), ServerError> {
    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(|source| ServerError::Bind {
            addr: bind_address.to_string(),
            source,
        })?;
    let addr = listener.local_addr().map_err(ServerError::LocalAddr)?;
    Ok((listener, addr))
}
