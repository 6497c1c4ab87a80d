/// Live order updates over WebSocket
///
/// One endpoint, separate from the HTTP API, that pushes order events to
/// every connected dashboard as soon as the request layer commits them.
///
/// ## Architecture
/// - `LiveUpdates` is created once at startup and injected into producers
/// - The endpoint binds lazily on first use; a failed bind disables live
///   updates for the process lifetime without affecting anything else
/// - Publish is fire-and-forget and never suspends the caller
/// - Per-connection unbounded FIFO queues, one writer task per connection
///
/// ## Key Components
/// - `service`: One-time endpoint bind and availability tracking
/// - `hub`: Membership set, connection state machine and broadcast
/// - `connection`: WebSocket upgrade and lifecycle management
/// - `message`: Event schema sent to clients
/// - `health`: Heartbeat and idle detection
/// - `metrics`: Delivery counters for monitoring
pub mod connection;
pub mod health;
pub mod hub;
pub mod message;
pub mod metrics;
pub mod service;

#[cfg(test)]
mod tests;

pub use hub::{ConnectionId, ConnectionState, MembershipGuard, PublishReport, WsHub};
pub use message::LiveEvent;
pub use metrics::HubMetricsSnapshot;
pub use service::{LiveStatus, LiveUpdates};
