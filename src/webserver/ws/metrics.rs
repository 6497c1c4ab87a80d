/// Live update metrics
///
/// Counters that make silent notification outages visible: publish never
/// reports failures to its caller, so operators watch these instead
/// (exposed at GET /api/live/status).
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;

// ============================================================================
// CONNECTION METRICS
// ============================================================================

/// Per-connection metrics (thread-safe)
#[derive(Debug, Default)]
pub struct ConnectionMetrics {
    /// Frames written to the socket
    messages_sent: AtomicU64,

    /// Bytes written to the socket (frame payloads only)
    bytes_sent: AtomicU64,
}

impl ConnectionMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_sent(&self, bytes: usize) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ConnectionMetricsSnapshot {
        ConnectionMetricsSnapshot {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionMetricsSnapshot {
    pub messages_sent: u64,
    pub bytes_sent: u64,
}

// ============================================================================
// HUB METRICS
// ============================================================================

/// Hub-level metrics (aggregate across all connections)
#[derive(Debug, Default)]
pub struct HubMetrics {
    /// Total connections (lifetime)
    total_connections: AtomicU64,

    /// Current members of the hub
    active_connections: AtomicUsize,

    /// publish() calls that reached the hub
    publishes: AtomicU64,

    /// Frames enqueued for delivery (one per recipient)
    messages_sent: AtomicU64,

    /// Deliveries that failed (closed queue or socket write error)
    delivery_failures: AtomicU64,

    /// Events that could not be serialized
    serialization_failures: AtomicU64,

    /// publish() calls dropped because the endpoint is unavailable
    unavailable_publishes: AtomicU64,
}

impl HubMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn connection_opened(&self) {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        // Saturate at zero
        let _ = self
            .active_connections
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    pub fn publish_requested(&self) {
        self.publishes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn message_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn delivery_failed(&self) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn serialization_failed(&self) {
        self.serialization_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn publish_unavailable(&self) {
        self.unavailable_publishes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> HubMetricsSnapshot {
        HubMetricsSnapshot {
            total_connections: self.total_connections.load(Ordering::Relaxed),
            active_connections: self.active_connections.load(Ordering::Relaxed),
            publishes: self.publishes.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
            serialization_failures: self.serialization_failures.load(Ordering::Relaxed),
            unavailable_publishes: self.unavailable_publishes.load(Ordering::Relaxed),
        }
    }
}

/// Hub metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HubMetricsSnapshot {
    pub total_connections: u64,
    pub active_connections: usize,
    pub publishes: u64,
    pub messages_sent: u64,
    pub delivery_failures: u64,
    pub serialization_failures: u64,
    pub unavailable_publishes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_metrics() {
        let metrics = ConnectionMetrics::new();

        metrics.record_sent(10);
        metrics.record_sent(5);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.messages_sent, 2);
        assert_eq!(snapshot.bytes_sent, 15);
    }

    #[test]
    fn test_hub_metrics() {
        let metrics = HubMetrics::new();

        metrics.connection_opened();
        metrics.connection_opened();
        metrics.publish_requested();
        metrics.message_sent();
        metrics.message_sent();
        metrics.delivery_failed();
        metrics.publish_unavailable();
        metrics.connection_closed();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_connections, 2);
        assert_eq!(snapshot.active_connections, 1);
        assert_eq!(snapshot.publishes, 1);
        assert_eq!(snapshot.messages_sent, 2);
        assert_eq!(snapshot.delivery_failures, 1);
        assert_eq!(snapshot.unavailable_publishes, 1);
    }

    #[test]
    fn test_active_connections_saturate() {
        let metrics = HubMetrics::new();
        metrics.connection_closed();
        assert_eq!(metrics.snapshot().active_connections, 0);
    }
}
