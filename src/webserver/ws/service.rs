//! Live updates service
//!
//! Owns the live update endpoint and its hub. Constructed once at startup and
//! handed to every producer by `Arc`. The endpoint is bound the first time
//! anyone acquires the hub; concurrent first callers share that single bind.
//! A failed bind is permanent for the life of the process: live updates are
//! then disabled while the rest of the application keeps running.

use parking_lot::Mutex;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, OnceCell};
use tokio::task::JoinHandle;

use crate::{
    config::LiveConfig,
    errors::ServerError,
    logger::{self, LogTag},
    webserver::bind_listener,
};

use super::{
    connection::{live_router, LiveEndpointState},
    health::HealthConfig,
    hub::{PublishReport, WsHub},
    metrics::{HubMetrics, HubMetricsSnapshot},
};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// A bound, serving live update endpoint
struct LiveEndpoint {
    hub: Arc<WsHub>,
    addr: SocketAddr,
}

/// Availability summary for status reporting
#[derive(Debug, Clone, Serialize)]
pub struct LiveStatus {
    /// "uninitialized", "available" or "unavailable"
    pub state: &'static str,
    pub endpoint: Option<String>,
    pub open_connections: usize,
    pub metrics: HubMetricsSnapshot,
}

pub struct LiveUpdates {
    config: LiveConfig,
    endpoint: OnceCell<Option<LiveEndpoint>>,
    metrics: Arc<HubMetrics>,
    shutdown: Arc<Notify>,
    server_task: Mutex<Option<JoinHandle<()>>>,
}

impl LiveUpdates {
    /// Create the service. Nothing is bound until the first `acquire()`.
    pub fn new(config: LiveConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            endpoint: OnceCell::new(),
            metrics: HubMetrics::new(),
            shutdown: Arc::new(Notify::new()),
            server_task: Mutex::new(None),
        })
    }

    /// Get the hub, binding the endpoint on first use
    ///
    /// Returns `None` when the endpoint could not be bound. That outcome is
    /// cached: later calls never retry.
    pub async fn acquire(&self) -> Option<Arc<WsHub>> {
        self.endpoint
            .get_or_init(|| self.start_endpoint())
            .await
            .as_ref()
            .map(|endpoint| Arc::clone(&endpoint.hub))
    }

    /// Publish an event to every connected client
    ///
    /// Fire-and-forget: never fails and never reports delivery problems to
    /// the caller. When live updates are unavailable the event is dropped.
    ///
    /// The first call on a service nobody has acquired yet waits for the
    /// one-time bind. Once the bind outcome is known, publish completes on
    /// its first poll: it only serializes and enqueues. `main` acquires at
    /// startup so request handlers never pay for the bind.
    pub async fn publish<E: Serialize + ?Sized>(&self, event: &E) -> PublishReport {
        match self.acquire().await {
            Some(hub) => hub.publish(event),
            None => {
                self.metrics.publish_unavailable();
                logger::debug(
                    LogTag::Live,
                    "Live updates unavailable, event not delivered",
                );
                PublishReport::default()
            }
        }
    }

    /// Bound address, once the endpoint is up
    pub fn endpoint_addr(&self) -> Option<SocketAddr> {
        self.endpoint
            .get()
            .and_then(|endpoint| endpoint.as_ref())
            .map(|endpoint| endpoint.addr)
    }

    /// True once a bind was attempted and failed
    pub fn is_unavailable(&self) -> bool {
        matches!(self.endpoint.get(), Some(None))
    }

    pub fn metrics(&self) -> Arc<HubMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn status(&self) -> LiveStatus {
        let (state, endpoint, open_connections) = match self.endpoint.get() {
            None => ("uninitialized", None, 0),
            Some(None) => ("unavailable", None, 0),
            Some(Some(endpoint)) => (
                "available",
                Some(format!("ws://{}/ws", endpoint.addr)),
                endpoint.hub.open_connections(),
            ),
        };

        LiveStatus {
            state,
            endpoint,
            open_connections,
            metrics: self.metrics.snapshot(),
        }
    }

    /// Stop accepting connections and close the open ones
    pub async fn shutdown(&self) {
        let Some(Some(endpoint)) = self.endpoint.get() else {
            return;
        };

        logger::debug(LogTag::Live, "Stopping live update endpoint...");
        self.shutdown.notify_one();
        let closed = endpoint.hub.close_all();

        let task = self.server_task.lock().take();
        if let Some(task) = task {
            if tokio::time::timeout(SHUTDOWN_GRACE, task).await.is_err() {
                logger::warning(
                    LogTag::Live,
                    "Live update endpoint did not stop within the grace period",
                );
            }
        }

        logger::info(
            LogTag::Live,
            &format!("Live update endpoint stopped ({} connections closed)", closed),
        );
    }

    /// Bind and start serving. Runs at most once per service.
    async fn start_endpoint(&self) -> Option<LiveEndpoint> {
        let bind_address = self.config.bind_address();

        let (listener, addr) = match bind_listener(&bind_address).await {
            Ok(bound) => bound,
            Err(e) => {
                logger::error(
                    LogTag::Live,
                    &format!("Live order updates disabled: {}", e),
                );
                return None;
            }
        };

        let hub = WsHub::with_metrics(Arc::clone(&self.metrics));
        let app = live_router(LiveEndpointState {
            hub: Arc::clone(&hub),
            health: HealthConfig::from_live_config(&self.config),
        });

        let shutdown = Arc::clone(&self.shutdown);
        let task = tokio::spawn(async move {
            let shutdown_signal = async move {
                shutdown.notified().await;
            };

            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal)
                .await
            {
                logger::error(
                    LogTag::Live,
                    &format!("{}", ServerError::Serve(e)),
                );
            }
        });
        *self.server_task.lock() = Some(task);

        logger::info(
            LogTag::Live,
            &format!("Live order updates listening on ws://{}/ws", addr),
        );

        Some(LiveEndpoint { hub, addr })
    }
}
