//! HTTP API and live order updates
//!
//! Two listeners: the JSON API under `/api` (`server`, `routes`) and the
//! WebSocket endpoint that pushes order events to dashboards (`ws`).

mod server;

pub mod models;
pub mod routes;
pub mod state;
pub mod utils;
pub mod ws;

// Public API for starting/stopping the webserver
pub use server::{bind_listener, build_app, shutdown, start_server};
