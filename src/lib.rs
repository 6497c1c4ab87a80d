//! orderdesk - order management backend with live order updates
//!
//! The HTTP API persists orders in SQLite and, after every committed
//! mutation, publishes an event that the live updates service fans out to
//! all connected dashboards over WebSocket.

pub mod arguments;
pub mod config;
pub mod errors;
pub mod logger;
pub mod orders;
pub mod webserver;
