/// WebSocket connection handler
///
/// Manages individual live update connections with:
/// - Registration before the upgrade completes
/// - Frame forwarding from the hub queue to the client (FIFO)
/// - Optional heartbeat and idle detection
/// - Cleanup on every exit path through the membership guard
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use crate::{
    arguments::is_debug_live_enabled,
    logger::{self, LogTag},
};

use super::{
    health::{ConnectionHealth, DisconnectReason, HealthAction, HealthConfig},
    hub::{ConnectionReceiver, Frame, MembershipGuard, WsHub},
    metrics::ConnectionMetrics,
};

/// State shared by the live endpoint handlers
#[derive(Clone)]
pub struct LiveEndpointState {
    pub hub: Arc<WsHub>,
    /// `None` disables the heartbeat
    pub health: Option<HealthConfig>,
}

/// Router served on the live update endpoint (`/` and `/ws`)
pub fn live_router(state: LiveEndpointState) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

/// WebSocket upgrade handler
///
/// The connection joins the hub as `Connecting` right here; if the upgrade
/// never completes the guard is dropped with the callback and it leaves again.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<LiveEndpointState>) -> Response {
    let (guard, hub_rx) = state.hub.register_connection();
    let conn_id = guard.id();
    let health = state.health.clone();

    ws.on_failed_upgrade(move |e| {
        logger::warning(
            LogTag::Live,
            &format!("Connection {}: upgrade failed: {}", conn_id, e),
        );
    })
    .on_upgrade(move |socket| handle_connection(socket, guard, hub_rx, health))
}

/// Why a connection loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseReason {
    ClientClosed,
    ReadError,
    WriteFailed,
    RemovedByHub,
    Unhealthy(DisconnectReason),
}

/// Handle a WebSocket connection
pub async fn handle_connection(
    socket: WebSocket,
    guard: MembershipGuard,
    mut hub_rx: ConnectionReceiver,
    health_config: Option<HealthConfig>,
) {
    let conn_id = guard.id();
    guard.mark_open();

    let (mut ws_tx, mut ws_rx) = socket.split();
    let metrics = ConnectionMetrics::new();
    let mut health = health_config.map(ConnectionHealth::new);

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    logger::debug(LogTag::Live, &format!("Connection {} open", conn_id));

    let reason = loop {
        tokio::select! {
            biased;

            // Frames from hub (broadcast to client)
            frame = hub_rx.recv() => {
                let Some(frame) = frame else {
                    break CloseReason::RemovedByHub;
                };
                if let Err(e) = forward_to_client(&mut ws_tx, &frame, &metrics).await {
                    guard.hub().metrics().delivery_failed();
                    logger::warning(
                        LogTag::Live,
                        &format!("Connection {}: failed to send message: {}", conn_id, e),
                    );
                    break CloseReason::WriteFailed;
                }
            }

            // Client traffic only counts as activity
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break CloseReason::ClientClosed,
                    Some(Ok(_)) => {
                        if let Some(health) = health.as_mut() {
                            health.record_activity();
                        }
                    }
                    Some(Err(e)) => {
                        logger::debug(
                            LogTag::Live,
                            &format!("Connection {}: websocket error: {}", conn_id, e),
                        );
                        break CloseReason::ReadError;
                    }
                }
            }

            // Health checks
            _ = ticker.tick(), if health.is_some() => {
                if let Some(tracker) = health.as_mut() {
                    match tracker.check() {
                        HealthAction::Healthy => {}
                        HealthAction::SendPing => {
                            if ws_tx.send(Message::Ping(Vec::new())).await.is_err() {
                                break CloseReason::WriteFailed;
                            }
                            tracker.record_ping();
                        }
                        HealthAction::Disconnect(why) => {
                            logger::info(
                                LogTag::Live,
                                &format!(
                                    "Connection {}: {:?} after {}s without activity",
                                    conn_id,
                                    why,
                                    tracker.seconds_since_activity()
                                ),
                            );
                            break CloseReason::Unhealthy(why);
                        }
                    }
                }
            }
        }
    };

    guard.mark_closing();

    if matches!(reason, CloseReason::RemovedByHub | CloseReason::Unhealthy(_)) {
        let _ = ws_tx.send(Message::Close(None)).await;
    }

    if is_debug_live_enabled() {
        let snapshot = metrics.snapshot();
        logger::debug(
            LogTag::Live,
            &format!(
                "Connection {} closed ({:?}, sent={}, bytes={})",
                conn_id, reason, snapshot.messages_sent, snapshot.bytes_sent
            ),
        );
    }

    drop(guard);
}

/// Write one frame to the client
async fn forward_to_client(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    frame: &Frame,
    metrics: &ConnectionMetrics,
) -> Result<(), axum::Error> {
    ws_tx.send(Message::Text(frame.to_string())).await?;
    metrics.record_sent(frame.len());
    Ok(())
}
