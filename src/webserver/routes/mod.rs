use axum::Router;
use std::sync::Arc;

use crate::webserver::state::AppState;

pub mod order_statuses;
pub mod orders;
pub mod status;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new().nest("/api", api_routes()).with_state(state)
}

/// Build API routes
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(status::routes())
        .merge(orders::routes())
        .merge(order_statuses::routes())
}
