//! Orders - the producer side of live updates
//!
//! SQLite persistence for orders and the configurable list of order
//! statuses. Route handlers publish a live event after each successful
//! mutation returned from here.

mod db;
mod types;

pub use db::OrderStore;
pub use types::{
    validate_status, NewOrder, NewOrderStatus, Order, OrderStatus, StatusUpdate, DEFAULT_STATUS,
    DEFAULT_STATUSES,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store task failed: {0}")]
    Task(String),
}
