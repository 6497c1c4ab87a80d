/// Response helpers shared by all route handlers
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;

use crate::{
    arguments::is_debug_webserver_enabled,
    logger::{self, LogTag},
    orders::OrderError,
    webserver::models::{ErrorDetails, ErrorResponse},
};

/// 200 with a JSON body
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// 201 with a JSON body
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// JSON error envelope: `{ "error": { code, message, details, timestamp } }`
pub fn error_response(
    status: StatusCode,
    code: &str,
    message: &str,
    details: Option<&str>,
) -> Response {
    let body = ErrorResponse {
        error: ErrorDetails {
            code: code.to_string(),
            message: message.to_string(),
            details: details.map(str::to_string),
            timestamp: Utc::now(),
        },
    };
    (status, Json(body)).into_response()
}

/// Map an order store failure to an HTTP error
pub fn order_error_response(err: OrderError) -> Response {
    match err {
        OrderError::Validation(message) => {
            error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", &message, None)
        }
        other => {
            logger::error(LogTag::Orders, &format!("Order store failure: {}", other));
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "Order store unavailable",
                Some(&other.to_string()),
            )
        }
    }
}

/// 400 for a request body that is not JSON or does not match the payload type
pub fn invalid_body_response(rejection: JsonRejection) -> Response {
    let details = rejection.body_text();
    if is_debug_webserver_enabled() {
        logger::debug(
            LogTag::Webserver,
            &format!("Rejected request body: {}", details),
        );
    }
    error_response(
        StatusCode::BAD_REQUEST,
        "INVALID_BODY",
        "Request body is not valid JSON for this endpoint",
        Some(&details),
    )
}

pub fn not_found_response(what: &str) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        "NOT_FOUND",
        &format!("{} not found", what),
        None,
    )
}
