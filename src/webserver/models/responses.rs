/// API response type definitions
///
/// Standard response structures for REST API endpoints
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::webserver::ws::LiveStatus;

/// Simple health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Live update endpoint status (GET /api/live/status)
#[derive(Debug, Clone, Serialize)]
pub struct LiveStatusResponse {
    #[serde(flatten)]
    pub live: LiveStatus,
    pub timestamp: DateTime<Utc>,
}

/// Generic error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}
