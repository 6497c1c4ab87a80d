/// Configuration schemas - all config structures defined once with defaults
///
/// Each struct is defined using the config_struct! macro which provides:
/// - Single-source definition (no repetition)
/// - Embedded defaults
/// - Environment overrides for deployment-specific values
/// - Serde support
use crate::config_struct;

// ============================================================================
// LIVE UPDATE ENDPOINT
// ============================================================================

config_struct! {
    /// Live order update endpoint (WebSocket fan-out)
    pub struct LiveConfig {
        /// Host/IP to bind the live update endpoint
        host: String = "127.0.0.1".to_string() => env "ORDERDESK_LIVE_HOST",

        /// Port to bind the live update endpoint (0 = ephemeral)
        port: u16 = 3001 => env "ORDERDESK_LIVE_PORT",

        /// Server ping after this many idle seconds (0 disables heartbeat)
        heartbeat_secs: u64 = 30,

        /// Disconnect clients silent for this long
        client_idle_timeout_secs: u64 = 90,

        /// Disconnect when a ping gets no answer within this window
        pong_timeout_secs: u64 = 10,
    }
}

impl LiveConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ============================================================================
// WEBSERVER
// ============================================================================

config_struct! {
    /// HTTP API server
    pub struct WebserverConfig {
        host: String = "127.0.0.1".to_string() => env "ORDERDESK_HTTP_HOST",
        port: u16 = 8080 => env "ORDERDESK_HTTP_PORT",

        /// Allow cross-origin requests (dashboard served from another origin)
        cors_permissive: bool = true,
    }
}

impl WebserverConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ============================================================================
// DATABASE
// ============================================================================

config_struct! {
    pub struct DatabaseConfig {
        /// SQLite file holding orders and order statuses
        path: String = "data/orderdesk.db".to_string() => env "ORDERDESK_DB_PATH",
    }
}

// ============================================================================
// ROOT
// ============================================================================

config_struct! {
    /// Root configuration (data/config.toml)
    pub struct Config {
        live: LiveConfig = LiveConfig::default(),
        webserver: WebserverConfig = WebserverConfig::default(),
        database: DatabaseConfig = DatabaseConfig::default(),
    }
}
