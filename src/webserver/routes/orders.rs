/// Order routes - the producers of live order events
///
/// Every successful mutation publishes to the live updates service after the
/// store has committed. The HTTP result never depends on delivery.
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Response,
    routing::{get, patch},
    Json, Router,
};
use std::sync::Arc;

use crate::{
    arguments::is_debug_orders_enabled,
    logger::{self, LogTag},
    orders::{NewOrder, StatusUpdate},
    webserver::{
        state::AppState,
        utils::{
            created_response, invalid_body_response, not_found_response, order_error_response,
            success_response,
        },
        ws::LiveEvent,
    },
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status", patch(update_order_status))
}

/// GET /api/orders - newest first
async fn list_orders(State(state): State<Arc<AppState>>) -> Response {
    match state.with_store(|store| store.list_orders()).await {
        Ok(orders) => success_response(orders),
        Err(e) => order_error_response(e),
    }
}

/// GET /api/orders/:id
async fn get_order(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    match state.with_store(move |store| store.get_order(id)).await {
        Ok(Some(order)) => success_response(order),
        Ok(None) => not_found_response("Order"),
        Err(e) => order_error_response(e),
    }
}

/// POST /api/orders - create and broadcast `new_order`
async fn create_order(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewOrder>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_body_response(rejection),
    };

    let order = match state
        .with_store(move |store| store.create_order(payload))
        .await
    {
        Ok(order) => order,
        Err(e) => return order_error_response(e),
    };

    logger::info(
        LogTag::Orders,
        &format!(
            "Order {} created for {} ({:.2})",
            order.id, order.customer_name, order.total
        ),
    );

    state
        .notify(LiveEvent::NewOrder {
            order: order.clone(),
        })
        .await;

    created_response(order)
}

/// PATCH /api/orders/:id/status - update and broadcast `order_status_updated`
async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> Response {
    let StatusUpdate { status } = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => return invalid_body_response(rejection),
    };

    let order = match state
        .with_store(move |store| store.update_status(id, &status))
        .await
    {
        Ok(Some(order)) => order,
        Ok(None) => {
            if is_debug_orders_enabled() {
                logger::debug(
                    LogTag::Orders,
                    &format!("Status update for unknown order {}", id),
                );
            }
            return not_found_response("Order");
        }
        Err(e) => return order_error_response(e),
    };

    logger::info(
        LogTag::Orders,
        &format!("Order {} status -> {}", order.id, order.status),
    );

    state
        .notify(LiveEvent::OrderStatusUpdated {
            order: order.clone(),
        })
        .await;

    success_response(order)
}
