//! End-to-end tests against a real live update endpoint bound on 127.0.0.1:0

use chrono::Utc;
use futures::{future::join_all, FutureExt, SinkExt, StreamExt};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};

use super::{LiveEvent, LiveUpdates, WsHub};
use crate::{config::LiveConfig, orders::Order};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(3);
const SILENCE: Duration = Duration::from_millis(200);

fn test_config() -> LiveConfig {
    LiveConfig {
        port: 0,
        heartbeat_secs: 0,
        ..LiveConfig::default()
    }
}

async fn start() -> (Arc<LiveUpdates>, Arc<WsHub>, SocketAddr) {
    let live = LiveUpdates::new(test_config());
    let hub = live.acquire().await.expect("endpoint should bind");
    let addr = live.endpoint_addr().expect("bound address");
    (live, hub, addr)
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
        .await
        .expect("client connects");
    client
}

/// Wait until the hub sees exactly `n` open connections
async fn wait_for_open(hub: &WsHub, n: usize) {
    let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
    while hub.open_connections() != n {
        assert!(
            tokio::time::Instant::now() < deadline,
            "expected {} open connections, have {}",
            n,
            hub.open_connections()
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

async fn wait_for_members(hub: &WsHub, n: usize) {
    let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
    while hub.active_connections() != n {
        assert!(tokio::time::Instant::now() < deadline);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

async fn recv_json(client: &mut Client) -> serde_json::Value {
    loop {
        let msg = tokio::time::timeout(RECV_TIMEOUT, client.next())
            .await
            .expect("message within timeout")
            .expect("stream open")
            .expect("valid frame");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).expect("json frame");
        }
    }
}

async fn assert_silent(client: &mut Client) {
    assert!(
        tokio::time::timeout(SILENCE, client.next()).await.is_err(),
        "client received an unexpected frame"
    );
}

fn order(id: i64, status: &str) -> Order {
    Order {
        id,
        customer_name: "Ada".to_string(),
        product_id: Some(2),
        total: 30.0,
        status: status.to_string(),
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_single_client_receives_event_once() {
    let (live, hub, addr) = start().await;
    let mut c1 = connect(addr).await;
    wait_for_open(&hub, 1).await;

    let event = json!({"kind": "new_order", "order": {"id": 1, "status": "Pending"}});
    let report = live.publish(&event).await;

    assert_eq!(report.delivered, 1);
    assert_eq!(recv_json(&mut c1).await, event);
    assert_silent(&mut c1).await;
}

#[tokio::test]
async fn test_every_open_client_receives_the_same_event() {
    let (live, hub, addr) = start().await;
    let mut clients = Vec::new();
    for _ in 0..3 {
        clients.push(connect(addr).await);
    }
    wait_for_open(&hub, 3).await;

    let event = LiveEvent::NewOrder {
        order: order(7, "Pending"),
    };
    live.publish(&event).await;

    for client in clients.iter_mut() {
        let received: LiveEvent = serde_json::from_value(recv_json(client).await).unwrap();
        assert_eq!(received, event);
    }
}

#[tokio::test]
async fn test_closed_client_is_skipped() {
    let (live, hub, addr) = start().await;
    let mut c1 = connect(addr).await;
    let mut c2 = connect(addr).await;
    wait_for_open(&hub, 2).await;

    c1.close(None).await.unwrap();
    wait_for_members(&hub, 1).await;

    let event = json!({"kind": "order_status_updated", "order": {"id": 3, "status": "Completed"}});
    let report = live.publish(&event).await;

    assert_eq!(report.delivered, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(recv_json(&mut c2).await, event);
}

#[tokio::test]
async fn test_publish_with_zero_connections() {
    let (live, hub, _addr) = start().await;

    let report = live.publish(&json!({"kind": "new_order", "order": {"id": 1}})).await;

    assert!(report.serialized);
    assert_eq!(report.delivered, 0);
    assert_eq!(hub.active_connections(), 0);
    let metrics = live.metrics().snapshot();
    assert_eq!(metrics.messages_sent, 0);
    assert_eq!(metrics.delivery_failures, 0);
}

#[tokio::test]
async fn test_events_arrive_in_publish_order() {
    let (live, hub, addr) = start().await;
    let mut c1 = connect(addr).await;
    wait_for_open(&hub, 1).await;

    let e1 = LiveEvent::NewOrder {
        order: order(1, "Pending"),
    };
    let e2 = LiveEvent::OrderStatusUpdated {
        order: order(1, "Completed"),
    };
    live.publish(&e1).await;
    live.publish(&e2).await;

    let first: LiveEvent = serde_json::from_value(recv_json(&mut c1).await).unwrap();
    let second: LiveEvent = serde_json::from_value(recv_json(&mut c1).await).unwrap();
    assert_eq!(first, e1);
    assert_eq!(second, e2);
}

#[tokio::test]
async fn test_publish_completes_without_waiting_once_bound() {
    let (live, hub, addr) = start().await;
    let mut c1 = connect(addr).await;
    wait_for_open(&hub, 1).await;

    let report = live
        .publish(&json!({"n": 1}))
        .now_or_never()
        .expect("publish should not wait after the bind");

    assert_eq!(report.delivered, 1);
    assert_eq!(recv_json(&mut c1).await, json!({"n": 1}));
}

#[tokio::test]
async fn test_first_publish_binds_the_endpoint() {
    let live = LiveUpdates::new(test_config());
    assert_eq!(live.status().state, "uninitialized");

    let report = live.publish(&json!({"n": 1})).await;

    assert!(report.serialized);
    assert_eq!(report.delivered, 0);
    assert!(live.endpoint_addr().is_some());
    assert_eq!(live.status().state, "available");
}

#[tokio::test]
async fn test_late_joiner_misses_earlier_event() {
    let (live, hub, addr) = start().await;

    live.publish(&json!({"n": 1})).await;

    let mut late = connect(addr).await;
    wait_for_open(&hub, 1).await;
    live.publish(&json!({"n": 2})).await;

    assert_eq!(recv_json(&mut late).await, json!({"n": 2}));
}

#[tokio::test]
async fn test_concurrent_acquire_shares_one_endpoint() {
    let live = LiveUpdates::new(test_config());

    let hubs = join_all((0..8).map(|_| live.acquire())).await;

    let first = hubs[0].clone().expect("endpoint should bind");
    for hub in &hubs {
        assert!(Arc::ptr_eq(&first, hub.as_ref().unwrap()));
    }
    let addr = live.endpoint_addr().unwrap();
    assert!(Arc::ptr_eq(&first, &live.acquire().await.unwrap()));
    assert_eq!(live.endpoint_addr(), Some(addr));
}

#[tokio::test]
async fn test_bind_failure_is_permanent() {
    let (held, addr) = crate::webserver::bind_listener("127.0.0.1:0").await.unwrap();
    let live = LiveUpdates::new(LiveConfig {
        port: addr.port(),
        ..test_config()
    });

    assert!(live.acquire().await.is_none());
    assert!(live.is_unavailable());

    // Port frees up, but there is no automatic rebind
    drop(held);
    assert!(live.acquire().await.is_none());

    let report = live
        .publish(&json!({"kind": "new_order"}))
        .now_or_never()
        .expect("publish should not wait once unavailable");
    assert_eq!(report.delivered, 0);
    assert_eq!(live.metrics().snapshot().unavailable_publishes, 1);
    assert_eq!(live.status().state, "unavailable");
}

#[tokio::test]
async fn test_client_traffic_is_ignored() {
    let (live, hub, addr) = start().await;
    let mut c1 = connect(addr).await;
    wait_for_open(&hub, 1).await;

    c1.send(Message::Text("hello".to_string())).await.unwrap();
    live.publish(&json!({"n": 1})).await;

    assert_eq!(recv_json(&mut c1).await, json!({"n": 1}));
    assert_eq!(hub.open_connections(), 1);
}

#[tokio::test]
async fn test_shutdown_closes_clients() {
    let (live, hub, addr) = start().await;
    let mut c1 = connect(addr).await;
    wait_for_open(&hub, 1).await;

    live.shutdown().await;

    let ended = tokio::time::timeout(RECV_TIMEOUT, async {
        loop {
            match c1.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(ended.is_ok());
    assert_eq!(hub.active_connections(), 0);
}

#[tokio::test]
async fn test_order_api_notifies_connected_dashboard() {
    use crate::{
        config::WebserverConfig,
        orders::OrderStore,
        webserver::{build_app, state::AppState},
    };
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    let (live, hub, addr) = start().await;
    let state = Arc::new(AppState::new(
        WebserverConfig::default(),
        Arc::new(OrderStore::open_in_memory().unwrap()),
        live,
    ));
    let mut dashboard = connect(addr).await;
    wait_for_open(&hub, 1).await;

    let response = build_app(state)
        .oneshot(
            Request::post("/api/orders")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"customer_name":"Ada","total":12.0}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);

    let value = recv_json(&mut dashboard).await;
    assert_eq!(value["kind"], "new_order");
    assert_eq!(value["order"]["customer_name"], "Ada");
    assert_eq!(value["order"]["status"], "Pending");
}
