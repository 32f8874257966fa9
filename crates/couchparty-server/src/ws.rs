use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Instant;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use couchparty_core::net::protocol::{MAX_MESSAGE_SIZE, decode_client_message};

use crate::error::AppError;
use crate::rate_limit::FrameBudget;
use crate::relay::ConnectionId;
use crate::state::{AppState, ConnectionGuard};

pub async fn ws_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    let max_ws = state.config.limits.max_ws_connections;
    let current = state.ws_connection_count.load(Ordering::Relaxed);
    if current >= max_ws {
        tracing::warn!(current, max = max_ws, "WS connection limit reached");
        return Err(AppError::ServiceUnavailable(
            "too many connections".to_string(),
        ));
    }

    Ok(ws
        .max_message_size(MAX_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_socket(socket, state))
        .into_response())
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let _guard = ConnectionGuard::new(Arc::clone(&state.ws_connection_count));
    let (ws_sender, mut ws_receiver) = socket.split();

    let (tx, rx) = mpsc::channel::<Bytes>(state.config.limits.outbound_buffer);
    let connection_id = state.party.write().await.connect(tx);
    tracing::info!(connection_id, "Connection opened");

    spawn_writer(ws_sender, rx);

    read_loop(&mut ws_receiver, &state, connection_id).await;

    // Unregistering drops the sender, which ends the writer task.
    state.party.write().await.disconnect(connection_id);
    tracing::info!(connection_id, "Connection closed");
}

fn spawn_writer(
    mut ws_sender: futures::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<Bytes>,
) {
    tokio::spawn(async move {
        while let Some(data) = rx.recv().await {
            if ws_sender.send(Message::Binary(data)).await.is_err() {
                break;
            }
        }
        let _ = ws_sender.close().await;
    });
}

async fn read_loop(
    ws_receiver: &mut futures::stream::SplitStream<WebSocket>,
    state: &AppState,
    connection_id: ConnectionId,
) {
    let mut budget =
        FrameBudget::per_second(state.config.limits.ws_rate_limit_per_sec, Instant::now());

    while let Some(Ok(msg)) = ws_receiver.next().await {
        let data = match msg {
            Message::Binary(d) => d,
            Message::Close(_) => break,
            _ => continue,
        };

        if !budget.try_spend(Instant::now()) {
            if budget.refused() == 1 {
                tracing::warn!(connection_id, "Rate limited, dropping frames");
            }
            continue;
        }

        if data.is_empty() || data.len() > MAX_MESSAGE_SIZE {
            continue;
        }

        let msg = match decode_client_message(&data) {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!(connection_id, error = %e, "Dropping undecodable frame");
                continue;
            },
        };

        state.party.write().await.handle(connection_id, msg);
    }
}
