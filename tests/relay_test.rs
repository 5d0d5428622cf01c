//! End-to-end tests: real router on an ephemeral port, driven by
//! WebSocket clients.

#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use hive_relay::api::build_app;
use hive_relay::app_state::AppState;
use hive_relay::config::RelayConfig;
use hive_relay::domain::{ClientId, ConnectionRegistry};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

async fn spawn_server() -> (SocketAddr, Arc<ConnectionRegistry>) {
    let state = AppState::from_config(&RelayConfig::default());
    let registry = Arc::clone(&state.registry);
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind ephemeral port");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, build_app(state)).await;
    });
    (addr, registry)
}

async fn connect(addr: SocketAddr, client_id: &str) -> Client {
    let url = format!("ws://{addr}/ws/{client_id}");
    let Ok((ws, _)) = tokio_tungstenite::connect_async(url).await else {
        panic!("websocket handshake for {client_id}");
    };
    ws
}

/// Next JSON text frame, skipping control frames.
async fn recv_json(ws: &mut Client) -> Value {
    loop {
        let Ok(next) = tokio::time::timeout(RECV_TIMEOUT, ws.next()).await else {
            panic!("timed out waiting for a frame");
        };
        let Some(Ok(msg)) = next else {
            panic!("stream ended before a frame arrived");
        };
        if let Message::Text(text) = msg {
            let Ok(value) = serde_json::from_str(text.as_str()) else {
                panic!("frame is not JSON: {text}");
            };
            return value;
        }
    }
}

async fn send_text(ws: &mut Client, text: &str) {
    if ws.send(Message::text(text)).await.is_err() {
        panic!("send failed");
    }
}

#[tokio::test]
async fn two_client_scenario() {
    let (addr, registry) = spawn_server().await;

    let mut c1 = connect(addr, "1").await;
    assert_eq!(
        recv_json(&mut c1).await,
        json!({"type": "system", "content": "Client #1 joined"})
    );

    let mut c2 = connect(addr, "2").await;
    let joined = json!({"type": "system", "content": "Client #2 joined"});
    assert_eq!(recv_json(&mut c1).await, joined);
    assert_eq!(recv_json(&mut c2).await, joined);

    send_text(&mut c2, "hi").await;
    let chat = json!({"type": "chat", "sender": 2, "content": "hi"});
    assert_eq!(recv_json(&mut c1).await, chat);
    // The sender gets its own message back.
    assert_eq!(recv_json(&mut c2).await, chat);

    let _ = c1.close(None).await;
    assert_eq!(
        recv_json(&mut c2).await,
        json!({"type": "system", "content": "Client #1 left"})
    );
    assert_eq!(registry.client_ids().await, vec![ClientId::from(2)]);
}

#[tokio::test]
async fn per_sender_order_and_text_ids() {
    let (addr, _registry) = spawn_server().await;

    let mut watcher = connect(addr, "watcher").await;
    let _ = recv_json(&mut watcher).await;

    let mut bee = connect(addr, "bee").await;
    assert_eq!(
        recv_json(&mut watcher).await,
        json!({"type": "system", "content": "Client #bee joined"})
    );

    for text in ["m1", "m2", "m3"] {
        send_text(&mut bee, text).await;
    }
    for text in ["m1", "m2", "m3"] {
        assert_eq!(
            recv_json(&mut watcher).await,
            json!({"type": "chat", "sender": "bee", "content": text})
        );
    }

    drop(bee);
    assert_eq!(
        recv_json(&mut watcher).await,
        json!({"type": "system", "content": "Client #bee left"})
    );
}

#[tokio::test]
async fn binary_frames_are_not_relayed() {
    let (addr, _registry) = spawn_server().await;

    let mut a = connect(addr, "1").await;
    let _ = recv_json(&mut a).await;

    if a.send(Message::binary(vec![1_u8, 2, 3])).await.is_err() {
        panic!("send failed");
    }
    send_text(&mut a, "after").await;
    assert_eq!(
        recv_json(&mut a).await,
        json!({"type": "chat", "sender": 1, "content": "after"})
    );
}

#[tokio::test]
async fn health_counts_connections() {
    let (addr, registry) = spawn_server().await;

    let mut a = connect(addr, "1").await;
    let _ = recv_json(&mut a).await;
    assert_eq!(registry.len().await, 1);

    let Ok(response) = reqwest::get(format!("http://{addr}/health")).await else {
        panic!("health request");
    };
    let Ok(body) = response.json::<Value>().await else {
        panic!("health body");
    };
    assert_eq!(body.get("status"), Some(&json!("healthy")));
    assert_eq!(body.get("connections"), Some(&json!(1)));
}
