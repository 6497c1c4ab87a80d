/// Shared application state for the webserver
///
/// Contains references to the order store and the live updates service that
/// route handlers need.
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::{
    config::WebserverConfig,
    orders::{OrderError, OrderStore},
    webserver::ws::{LiveEvent, LiveUpdates},
};

/// Shared application state passed to all route handlers
#[derive(Clone)]
pub struct AppState {
    /// Webserver configuration
    pub config: Arc<WebserverConfig>,

    /// Order persistence
    pub orders: Arc<OrderStore>,

    /// Live order updates (publish after each committed mutation)
    pub live: Arc<LiveUpdates>,

    /// Server startup time
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: WebserverConfig, orders: Arc<OrderStore>, live: Arc<LiveUpdates>) -> Self {
        Self {
            config: Arc::new(config),
            orders,
            live,
            startup_time: Utc::now(),
        }
    }

    /// Run a store operation on the blocking pool
    ///
    /// SQLite calls hold the connection lock and may wait on the busy
    /// timeout, so they never run on an async worker thread.
    pub async fn with_store<T, F>(&self, op: F) -> Result<T, OrderError>
    where
        F: FnOnce(&OrderStore) -> Result<T, OrderError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.orders);
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| OrderError::Task(e.to_string()))?
    }

    /// Notify connected dashboards. Delivery problems never reach the caller.
    ///
    /// See `LiveUpdates::publish` for when this can wait.
    pub async fn notify(&self, event: LiveEvent) {
        self.live.publish(&event).await;
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.startup_time).num_seconds().max(0) as u64
    }
}
