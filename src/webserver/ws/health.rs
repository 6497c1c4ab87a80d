/// WebSocket health monitoring
///
/// Tracks connection liveness with server pings and idle timeouts. Only
/// decides when a connection should be dropped; it never touches delivery.
use std::time::{Duration, Instant};

use crate::config::LiveConfig;

// ============================================================================
// HEALTH CONFIG
// ============================================================================

/// Health monitoring configuration
#[derive(Debug, Clone)]
pub struct HealthConfig {
    /// Heartbeat interval (server sends ping)
    pub heartbeat_interval: Duration,

    /// Client idle timeout (no activity)
    pub idle_timeout: Duration,

    /// Pong timeout (after ping sent)
    pub pong_timeout: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(90),
            pong_timeout: Duration::from_secs(10),
        }
    }
}

impl HealthConfig {
    /// Build from the live endpoint config; `None` when heartbeat is disabled
    pub fn from_live_config(config: &LiveConfig) -> Option<Self> {
        if config.heartbeat_secs == 0 {
            return None;
        }
        Some(Self {
            heartbeat_interval: Duration::from_secs(config.heartbeat_secs),
            idle_timeout: Duration::from_secs(config.client_idle_timeout_secs),
            pong_timeout: Duration::from_secs(config.pong_timeout_secs),
        })
    }
}

// ============================================================================
// CONNECTION HEALTH TRACKER
// ============================================================================

/// Outcome of a periodic health check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthAction {
    Healthy,
    SendPing,
    Disconnect(DisconnectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    IdleTimeout,
    PongTimeout,
}

/// Connection health state
#[derive(Debug)]
pub struct ConnectionHealth {
    /// Last client activity (any message received)
    last_activity: Instant,

    /// Last ping sent to client
    last_ping: Option<Instant>,

    config: HealthConfig,
}

impl ConnectionHealth {
    pub fn new(config: HealthConfig) -> Self {
        Self {
            last_activity: Instant::now(),
            last_ping: None,
            config,
        }
    }

    /// Record client activity (clears a pending ping)
    pub fn record_activity(&mut self) {
        self.last_activity = Instant::now();
        self.last_ping = None;
    }

    pub fn record_ping(&mut self) {
        self.last_ping = Some(Instant::now());
    }

    /// No activity beyond the idle timeout
    pub fn is_idle(&self) -> bool {
        self.last_activity.elapsed() > self.config.idle_timeout
    }

    /// Ping sent but no response within the pong timeout
    pub fn is_pong_overdue(&self) -> bool {
        self.last_ping
            .map(|ping_time| ping_time.elapsed() > self.config.pong_timeout)
            .unwrap_or(false)
    }

    pub fn needs_ping(&self) -> bool {
        self.last_activity.elapsed() > self.config.heartbeat_interval && self.last_ping.is_none()
    }

    pub fn seconds_since_activity(&self) -> u64 {
        self.last_activity.elapsed().as_secs()
    }

    /// Decide what the connection loop should do on this tick
    pub fn check(&self) -> HealthAction {
        if self.is_idle() {
            HealthAction::Disconnect(DisconnectReason::IdleTimeout)
        } else if self.is_pong_overdue() {
            HealthAction::Disconnect(DisconnectReason::PongTimeout)
        } else if self.needs_ping() {
            HealthAction::SendPing
        } else {
            HealthAction::Healthy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_connection_health() {
        let config = HealthConfig {
            heartbeat_interval: Duration::from_millis(50),
            idle_timeout: Duration::from_millis(300),
            pong_timeout: Duration::from_millis(30),
        };

        let mut health = ConnectionHealth::new(config);
        assert_eq!(health.check(), HealthAction::Healthy);

        sleep(Duration::from_millis(80));
        assert_eq!(health.check(), HealthAction::SendPing);

        health.record_ping();
        assert_eq!(health.check(), HealthAction::Healthy);

        sleep(Duration::from_millis(50));
        assert_eq!(
            health.check(),
            HealthAction::Disconnect(DisconnectReason::PongTimeout)
        );

        // Activity clears the pending ping
        health.record_activity();
        assert!(!health.is_pong_overdue());
        assert_eq!(health.check(), HealthAction::Healthy);

        sleep(Duration::from_millis(320));
        assert_eq!(
            health.check(),
            HealthAction::Disconnect(DisconnectReason::IdleTimeout)
        );
    }

    #[test]
    fn test_heartbeat_disabled() {
        let config = LiveConfig {
            heartbeat_secs: 0,
            ..LiveConfig::default()
        };
        assert!(HealthConfig::from_live_config(&config).is_none());

        let health = HealthConfig::from_live_config(&LiveConfig::default()).unwrap();
        assert_eq!(health.heartbeat_interval, Duration::from_secs(30));
        assert_eq!(health.pong_timeout, Duration::from_secs(10));
    }
}
