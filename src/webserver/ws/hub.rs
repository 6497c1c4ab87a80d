/// Live update hub - membership set and broadcaster
///
/// The WsHub tracks every live dashboard connection and fans out each
/// published event to all of them:
/// - Monotonic connection ids, never reused
/// - Per-connection unbounded FIFO queue (one writer task per connection)
/// - Connection state machine Connecting -> Open -> Closing -> Closed
/// - Snapshot-then-send publish (lock released before delivery)
/// - Hub-level metrics
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::{
    arguments::is_debug_live_enabled,
    logger::{self, LogTag},
};

use super::metrics::HubMetrics;

// ============================================================================
// HUB TYPES
// ============================================================================

/// Connection ID (unique per WebSocket connection)
pub type ConnectionId = u64;

/// Pre-serialized frame shared by every recipient of one publish
pub type Frame = Arc<str>;

/// Per-connection sender (unbounded channel)
pub type ConnectionSender = mpsc::UnboundedSender<Frame>;

pub type ConnectionReceiver = mpsc::UnboundedReceiver<Frame>;

/// Connection lifecycle. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Handshake in progress, not yet eligible for delivery
    Connecting,
    /// Receives published events
    Open,
    /// Shutting down, no further delivery
    Closing,
    /// Removed from the hub
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closing => "closing",
            ConnectionState::Closed => "closed",
        };
        write!(f, "{}", s)
    }
}

struct Member {
    sender: ConnectionSender,
    state: ConnectionState,
}

/// Outcome of a single publish
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Frames enqueued
    pub delivered: usize,
    /// Recipients whose queue was closed (removed from the hub)
    pub failed: usize,
    /// False when the event could not be serialized and nothing was sent
    pub serialized: bool,
}

// ============================================================================
// WS HUB
// ============================================================================

/// Central live update hub
pub struct WsHub {
    /// Active connections (connection_id -> member)
    members: RwLock<HashMap<ConnectionId, Member>>,

    /// Next connection ID
    next_conn_id: AtomicU64,

    /// Hub metrics
    metrics: Arc<HubMetrics>,
}

impl WsHub {
    /// Create new hub
    pub fn new() -> Arc<Self> {
        Self::with_metrics(HubMetrics::new())
    }

    /// Create a hub that records into existing metrics
    pub fn with_metrics(metrics: Arc<HubMetrics>) -> Arc<Self> {
        Arc::new(Self {
            members: RwLock::new(HashMap::new()),
            next_conn_id: AtomicU64::new(1),
            metrics,
        })
    }

    /// Register a new connection in state `Connecting`
    ///
    /// The returned guard removes the connection when dropped, so every exit
    /// path of the connection task (close, error, failed upgrade) unregisters.
    pub fn register_connection(self: &Arc<Self>) -> (MembershipGuard, ConnectionReceiver) {
        let conn_id = self.next_conn_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();

        let active = {
            let mut members = self.members.write();
            members.insert(
                conn_id,
                Member {
                    sender: tx,
                    state: ConnectionState::Connecting,
                },
            );
            members.len()
        };
        self.metrics.connection_opened();

        logger::debug(
            LogTag::Live,
            &format!("Connection {} registered (active={})", conn_id, active),
        );

        let guard = MembershipGuard {
            hub: Arc::clone(self),
            conn_id,
        };
        (guard, rx)
    }

    /// Connecting -> Open. Returns false if the connection is gone or past Connecting.
    pub fn mark_open(&self, conn_id: ConnectionId) -> bool {
        self.advance(conn_id, ConnectionState::Open)
    }

    /// Stop delivering to a connection that is shutting down
    pub fn mark_closing(&self, conn_id: ConnectionId) -> bool {
        self.advance(conn_id, ConnectionState::Closing)
    }

    fn advance(&self, conn_id: ConnectionId, next: ConnectionState) -> bool {
        let mut members = self.members.write();
        match members.get_mut(&conn_id) {
            Some(member) if member.state < next => {
                member.state = next;
                true
            }
            _ => false,
        }
    }

    /// Remove a connection. Returns false if it was already removed.
    pub fn unregister(&self, conn_id: ConnectionId) -> bool {
        let (removed, active) = {
            let mut members = self.members.write();
            let removed = members.remove(&conn_id).is_some();
            (removed, members.len())
        };

        if removed {
            self.metrics.connection_closed();
            logger::debug(
                LogTag::Live,
                &format!("Connection {} unregistered (active={})", conn_id, active),
            );
        }
        removed
    }

    /// Current state; ids not tracked by the hub report `Closed`
    pub fn connection_state(&self, conn_id: ConnectionId) -> ConnectionState {
        self.members
            .read()
            .get(&conn_id)
            .map(|member| member.state)
            .unwrap_or(ConnectionState::Closed)
    }

    /// Broadcast an event to every open connection
    ///
    /// Serializes once, snapshots the open members, releases the lock and
    /// then enqueues. Never blocks, never fails: a closed queue only removes
    /// that one member. Unserializable events are logged and dropped.
    pub fn publish<E: Serialize + ?Sized>(&self, event: &E) -> PublishReport {
        self.metrics.publish_requested();

        let frame: Frame = match serde_json::to_string(event) {
            Ok(json) => Arc::from(json),
            Err(e) => {
                self.metrics.serialization_failed();
                logger::error(
                    LogTag::Live,
                    &format!("Dropping live event that failed to serialize: {}", e),
                );
                return PublishReport::default();
            }
        };

        let targets: Vec<(ConnectionId, ConnectionSender)> = {
            let members = self.members.read();
            members
                .iter()
                .filter(|(_, member)| member.state == ConnectionState::Open)
                .map(|(conn_id, member)| (*conn_id, member.sender.clone()))
                .collect()
        };

        let mut report = PublishReport {
            serialized: true,
            ..PublishReport::default()
        };
        if targets.is_empty() {
            return report;
        }

        let mut dead = Vec::new();
        for (conn_id, sender) in targets {
            match sender.send(Arc::clone(&frame)) {
                Ok(()) => {
                    report.delivered += 1;
                    self.metrics.message_sent();
                }
                Err(_) => {
                    report.failed += 1;
                    self.metrics.delivery_failed();
                    dead.push(conn_id);
                }
            }
        }

        for conn_id in dead {
            if self.unregister(conn_id) {
                logger::warning(
                    LogTag::Live,
                    &format!("Connection {} dropped: delivery queue closed", conn_id),
                );
            }
        }

        if is_debug_live_enabled() {
            logger::debug(
                LogTag::Live,
                &format!(
                    "Published {} bytes (delivered={}, failed={})",
                    frame.len(),
                    report.delivered,
                    report.failed
                ),
            );
        }

        report
    }

    /// Remove every connection, ending their writer tasks
    pub fn close_all(&self) -> usize {
        let drained: Vec<ConnectionId> = self.members.write().drain().map(|(id, _)| id).collect();
        for _ in &drained {
            self.metrics.connection_closed();
        }
        drained.len()
    }

    /// Get hub metrics
    pub fn metrics(&self) -> Arc<HubMetrics> {
        self.metrics.clone()
    }

    /// Connections currently tracked (any state before Closed)
    pub fn active_connections(&self) -> usize {
        self.members.read().len()
    }

    /// Connections currently eligible for delivery
    pub fn open_connections(&self) -> usize {
        self.members
            .read()
            .values()
            .filter(|member| member.state == ConnectionState::Open)
            .count()
    }
}

// ============================================================================
// MEMBERSHIP GUARD
// ============================================================================

/// Ties a connection's hub membership to the lifetime of its task
pub struct MembershipGuard {
    hub: Arc<WsHub>,
    conn_id: ConnectionId,
}

impl MembershipGuard {
    pub fn id(&self) -> ConnectionId {
        self.conn_id
    }

    pub fn hub(&self) -> &Arc<WsHub> {
        &self.hub
    }

    pub fn mark_open(&self) -> bool {
        self.hub.mark_open(self.conn_id)
    }

    pub fn mark_closing(&self) -> bool {
        self.hub.mark_closing(self.conn_id)
    }
}

impl Drop for MembershipGuard {
    fn drop(&mut self) {
        self.hub.unregister(self.conn_id);
    }
}

impl fmt::Debug for MembershipGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MembershipGuard")
            .field("conn_id", &self.conn_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde_json::json;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("not representable"))
        }
    }

    #[test]
    fn test_hub_registration() {
        let hub = WsHub::new();

        let (guard1, _rx1) = hub.register_connection();
        let (guard2, _rx2) = hub.register_connection();

        assert_eq!(hub.active_connections(), 2);
        assert_ne!(guard1.id(), guard2.id());
        assert_eq!(hub.connection_state(guard1.id()), ConnectionState::Connecting);

        let id1 = guard1.id();
        drop(guard1);
        assert_eq!(hub.active_connections(), 1);
        assert_eq!(hub.connection_state(id1), ConnectionState::Closed);
        assert_eq!(hub.metrics().snapshot().active_connections, 1);
    }

    #[test]
    fn test_ids_never_reused() {
        let hub = WsHub::new();

        let (first, _rx) = hub.register_connection();
        let first_id = first.id();
        drop(first);

        let (second, _rx) = hub.register_connection();
        assert!(second.id() > first_id);
        assert!(!hub.mark_open(first_id));
    }

    #[test]
    fn test_state_transitions_are_monotonic() {
        let hub = WsHub::new();
        let (guard, _rx) = hub.register_connection();

        assert!(guard.mark_open());
        assert!(!guard.mark_open());
        assert!(guard.mark_closing());
        assert!(!hub.mark_open(guard.id()));
        assert_eq!(hub.connection_state(guard.id()), ConnectionState::Closing);
    }

    #[tokio::test]
    async fn test_publish_only_reaches_open_connections() {
        let hub = WsHub::new();

        let (open, mut open_rx) = hub.register_connection();
        let (_connecting, mut connecting_rx) = hub.register_connection();
        let (closing, mut closing_rx) = hub.register_connection();
        open.mark_open();
        closing.mark_open();
        closing.mark_closing();

        let report = hub.publish(&json!({"kind": "new_order", "order": {"id": 1}}));

        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 0);
        let frame = open_rx.recv().await.unwrap();
        assert_eq!(&*frame, r#"{"kind":"new_order","order":{"id":1}}"#);
        assert!(connecting_rx.try_recv().is_err());
        assert!(closing_rx.try_recv().is_err());
    }

    #[test]
    fn test_publish_with_no_connections() {
        let hub = WsHub::new();

        let report = hub.publish(&json!({"kind": "new_order"}));

        assert!(report.serialized);
        assert_eq!(report.delivered, 0);
        assert_eq!(hub.metrics().snapshot().messages_sent, 0);
    }

    #[tokio::test]
    async fn test_closed_queue_is_removed_without_affecting_others() {
        let hub = WsHub::new();

        let (healthy, mut healthy_rx) = hub.register_connection();
        let (broken, broken_rx) = hub.register_connection();
        healthy.mark_open();
        broken.mark_open();
        drop(broken_rx);

        let report = hub.publish(&json!({"n": 1}));

        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(hub.connection_state(broken.id()), ConnectionState::Closed);
        assert_eq!(hub.active_connections(), 1);
        assert_eq!(&*healthy_rx.recv().await.unwrap(), r#"{"n":1}"#);

        // Guard drop after removal must not double count
        drop(broken);
        assert_eq!(hub.metrics().snapshot().active_connections, 1);
        assert_eq!(hub.metrics().snapshot().delivery_failures, 1);
    }

    #[tokio::test]
    async fn test_per_connection_order() {
        let hub = WsHub::new();
        let (guard, mut rx) = hub.register_connection();
        guard.mark_open();

        for n in 0..50 {
            hub.publish(&json!({ "n": n }));
        }

        for n in 0..50 {
            let frame = rx.recv().await.unwrap();
            let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
            assert_eq!(value["n"], n);
        }
    }

    #[tokio::test]
    async fn test_unserializable_event_is_dropped() {
        let hub = WsHub::new();
        let (guard, mut rx) = hub.register_connection();
        guard.mark_open();

        let report = hub.publish(&Unserializable);

        assert!(!report.serialized);
        assert_eq!(report.delivered, 0);
        assert!(rx.try_recv().is_err());
        assert_eq!(hub.metrics().snapshot().serialization_failures, 1);

        // Hub keeps working afterwards
        assert_eq!(hub.publish(&json!({"ok": true})).delivered, 1);
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_churn_during_publish_keeps_tracked_connections() {
        const TRACKED: usize = 20;
        const CHURNED: usize = 5000;
        const EVENTS: u64 = 2000;

        let hub = WsHub::new();
        let mut tracked = Vec::new();
        for _ in 0..TRACKED {
            let (guard, rx) = hub.register_connection();
            guard.mark_open();
            tracked.push((guard, rx));
        }

        let churn = {
            let hub = Arc::clone(&hub);
            tokio::spawn(async move {
                for i in 0..CHURNED {
                    let (guard, rx) = hub.register_connection();
                    guard.mark_open();
                    drop(guard);
                    drop(rx);
                    if i % 64 == 0 {
                        tokio::task::yield_now().await;
                    }
                }
            })
        };

        let publisher = {
            let hub = Arc::clone(&hub);
            tokio::spawn(async move {
                for n in 0..EVENTS {
                    hub.publish(&json!({ "n": n }));
                    if n % 64 == 0 {
                        tokio::task::yield_now().await;
                    }
                }
            })
        };

        churn.await.unwrap();
        publisher.await.unwrap();

        for (_guard, rx) in tracked.iter_mut() {
            for n in 0..EVENTS {
                let frame = rx.try_recv().unwrap();
                let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
                assert_eq!(value["n"], n);
            }
            assert!(rx.try_recv().is_err());
        }
        assert_eq!(hub.active_connections(), TRACKED);
        assert_eq!(hub.open_connections(), TRACKED);
    }

    #[tokio::test]
    async fn test_close_all_ends_receivers() {
        let hub = WsHub::new();
        let (guard, mut rx) = hub.register_connection();
        guard.mark_open();

        assert_eq!(hub.close_all(), 1);
        assert!(rx.recv().await.is_none());
        assert_eq!(hub.active_connections(), 0);

        drop(guard);
        assert_eq!(hub.metrics().snapshot().active_connections, 0);
    }
}
