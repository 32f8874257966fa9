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
    _shutdown: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn new() -> Self {
        Self::from_config(ServerConfig::default()).await
    }

    pub async fn from_config(config: ServerConfig) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (app, _state) = build_app(config);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            _shutdown: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
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

/// Read raw binary data from a WebSocket stream (5s timeout).
pub async fn ws_read_raw(stream: &mut WsStream) -> Vec<u8> {
    let deadline = Duration::from_secs(5);
    tokio::time::timeout(deadline, async {
        loop {
            match stream.next().await {
                Some(Ok(Message::Binary(data))) => return data.to_vec(),
                Some(Ok(Message::Close(_))) => panic!("WebSocket closed unexpectedly"),
                Some(Err(e)) => panic!("WebSocket error: {e}"),
                None => panic!("WebSocket stream ended"),
                _ => continue,
            }
        }
    })
    .await
    .expect("Timed out waiting for WebSocket message")
}

/// Try to read raw binary data, returning None on timeout.
pub async fn ws_try_read_raw(stream: &mut WsStream, timeout_ms: u64) -> Option<Vec<u8>> {
    let deadline = Duration::from_millis(timeout_ms);
    tokio::time::timeout(deadline, async {
        loop {
            match stream.next().await {
                Some(Ok(Message::Binary(data))) => return data.to_vec(),
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

/// Read the next ServerMessage (5s timeout).
pub async fn ws_read(stream: &mut WsStream) -> ServerMessage {
    let data = ws_read_raw(stream).await;
    decode_server_message(&data).unwrap()
}

/// Read until a message matching `pred` arrives, skipping others.
pub async fn ws_read_until(
    stream: &mut WsStream,
    pred: impl Fn(&ServerMessage) -> bool,
) -> ServerMessage {
    loop {
        let msg = ws_read(stream).await;
        if pred(&msg) {
            return msg;
        }
    }
}

/// Collect every message that arrives within `timeout_ms` of the previous one.
pub async fn ws_drain(stream: &mut WsStream, timeout_ms: u64) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Some(data) = ws_try_read_raw(stream, timeout_ms).await {
        out.push(decode_server_message(&data).unwrap());
    }
    out
}

/// Connect a phone and join with `name`; returns the acknowledged record.
pub async fn join_player(server: &TestServer, name: &str) -> (WsStream, Player) {
    let mut ws = ws_connect(&server.ws_url()).await;
    ws_send(
        &mut ws,
        &ClientMessage::Join(JoinMsg {
            name: Some(name.to_string()),
        }),
    )
    .await;
    match ws_read(&mut ws).await {
        ServerMessage::Joined(player) => (ws, player),
        other => panic!("Expected Joined, got: {other:?}"),
    }
}

/// Connect a display and consume its SessionState + Roster greeting.
pub async fn join_display(server: &TestServer) -> WsStream {
    let mut ws = ws_connect(&server.ws_url()).await;
    ws_send(&mut ws, &ClientMessage::DisplayJoin).await;
    assert!(matches!(ws_read(&mut ws).await, ServerMessage::SessionState(_)));
    assert!(matches!(ws_read(&mut ws).await, ServerMessage::Roster(_)));
    ws
}
