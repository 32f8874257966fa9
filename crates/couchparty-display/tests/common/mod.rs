use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use couchparty_core::net::messages::{ClientMessage, JoinMsg, ServerMessage};
use couchparty_core::net::protocol::{decode_server_message, encode_client_message};
use couchparty_core::player::Player;

use couchparty_server::build_app;
use couchparty_server::config::ServerConfig;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct TestServer {
    pub addr: SocketAddr,
    _handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn with_round_secs(round_duration_secs: u32) -> Self {
        let mut config = ServerConfig::default();
        config.session.round_duration_secs = round_duration_secs;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (app, _state) = build_app(config);
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            _handle: handle,
        }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Poll `/health` until `n` displays are registered.
    pub async fn wait_for_displays(&self, n: u64) {
        let url = format!("http://{}/health", self.addr);
        for _ in 0..250 {
            let body: serde_json::Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
            if body["session"]["displays"] == n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("Timed out waiting for {n} displays");
    }
}

pub async fn ws_connect(url: &str) -> WsStream {
    let (stream, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    stream
}

pub async fn ws_send(stream: &mut WsStream, msg: &ClientMessage) {
    let encoded = encode_client_message(msg).unwrap();
    stream.send(Message::Binary(encoded.into())).await.unwrap();
}

/// Next ServerMessage, or None after `timeout_ms` of silence.
pub async fn ws_try_read(stream: &mut WsStream, timeout_ms: u64) -> Option<ServerMessage> {
    tokio::time::timeout(Duration::from_millis(timeout_ms), async {
        loop {
            match stream.next().await {
                Some(Ok(Message::Binary(data))) => return decode_server_message(&data).unwrap(),
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                    panic!("WebSocket error or closed")
                },
                _ => continue,
            }
        }
    })
    .await
    .ok()
}

/// Read until `pred` matches, returning the match and everything skipped.
pub async fn ws_read_until(
    stream: &mut WsStream,
    timeout_ms: u64,
    pred: impl Fn(&ServerMessage) -> bool,
) -> (ServerMessage, Vec<ServerMessage>) {
    let mut skipped = Vec::new();
    loop {
        let msg = ws_try_read(stream, timeout_ms)
            .await
            .unwrap_or_else(|| panic!("Timed out; saw {skipped:?}"));
        if pred(&msg) {
            return (msg, skipped);
        }
        skipped.push(msg);
    }
}

pub async fn join_player(url: &str, name: &str) -> (WsStream, Player) {
    let mut ws = ws_connect(url).await;
    ws_send(
        &mut ws,
        &ClientMessage::Join(JoinMsg {
            name: Some(name.to_string()),
        }),
    )
    .await;
    match ws_try_read(&mut ws, 5000).await {
        Some(ServerMessage::Joined(player)) => (ws, player),
        other => panic!("Expected Joined, got: {other:?}"),
    }
}
