use axum::{
    extract::{rejection::JsonRejection, State},
    response::Response,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::{
    logger::{self, LogTag},
    orders::NewOrderStatus,
    webserver::{
        state::AppState,
        utils::{created_response, invalid_body_response, order_error_response, success_response},
    },
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/order-statuses", get(list_statuses).post(create_status))
}

/// GET /api/order-statuses
async fn list_statuses(State(state): State<Arc<AppState>>) -> Response {
    match state.with_store(|store| store.list_statuses()).await {
        Ok(statuses) => success_response(statuses),
        Err(e) => order_error_response(e),
    }
}

/// POST /api/order-statuses
async fn create_status(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewOrderStatus>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_body_response(rejection),
    };

    match state
        .with_store(move |store| store.create_status(payload))
        .await
    {
        Ok(status) => {
            logger::info(
                LogTag::Orders,
                &format!("Order status '{}' added", status.name),
            );
            created_response(status)
        }
        Err(e) => order_error_response(e),
    }
}
