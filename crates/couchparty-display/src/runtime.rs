use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Message;

use couchparty_core::net::messages::ClientMessage;
use couchparty_core::net::protocol::{decode_server_message, encode_client_message};
use couchparty_core::render::Frame;

use crate::config::DisplayConfig;
use crate::display::Display;
use crate::error::DisplayError;
use crate::registry::create_registry;
use crate::render::FrameSink;

const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

/// Connect to the server and run the display until the connection ends.
pub async fn run(config: DisplayConfig, mut sink: impl FrameSink) -> Result<(), DisplayError> {
    config.validate().map_err(DisplayError::Config)?;

    let (ws, _) = tokio_tungstenite::connect_async(config.server_url.as_str())
        .await
        .map_err(DisplayError::Connect)?;
    tracing::info!(url = %config.server_url, role = ?config.role, "Connected to server");
    let (mut ws_tx, mut ws_rx) = ws.split();

    let mut display = Display::new(&config, create_registry());
    let mut frame = Frame::default();

    send_all(&mut ws_tx, vec![ClientMessage::DisplayJoin]).await?;

    let mut sim = tokio::time::interval(Duration::from_secs_f32(1.0 / config.tick_rate_hz));
    sim.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut countdown = tokio::time::interval(COUNTDOWN_PERIOD);
    countdown.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let playing = display.is_playing();
        let results_deadline = display.results_deadline().map(Instant::from_std);

        tokio::select! {
            frame_in = ws_rx.next() => {
                let data = match frame_in {
                    Some(Ok(Message::Binary(data))) => data,
                    Some(Ok(Message::Close(_))) | None => return Err(DisplayError::Closed),
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(DisplayError::Socket(e)),
                };
                let msg = match decode_server_message(&data) {
                    Ok(msg) => msg,
                    Err(e) => {
                        tracing::debug!(error = %e, "Dropping undecodable frame");
                        continue;
                    },
                };

                let round_before = display.round_id();
                let out = display.handle(msg, std::time::Instant::now());
                if let Some(round_id) = display.round_id()
                    && round_before != Some(round_id)
                {
                    // Count whole seconds from the moment the round began
                    countdown.reset();
                    tracing::debug!(%round_id, "Countdown started");
                }
                send_all(&mut ws_tx, out).await?;
                display.render(&mut frame);
                sink.present(&frame);
            },
            _ = sim.tick(), if playing => {
                let out = display.tick(std::time::Instant::now());
                send_all(&mut ws_tx, out).await?;
                display.render(&mut frame);
                sink.present(&frame);
            },
            _ = countdown.tick(), if playing => {
                let out = display.countdown_tick(std::time::Instant::now());
                send_all(&mut ws_tx, out).await?;
                if !display.is_playing() {
                    display.render(&mut frame);
                    sink.present(&frame);
                }
            },
            _ = sleep_until_deadline(results_deadline), if results_deadline.is_some() => {
                let out = display.results_hold_elapsed();
                send_all(&mut ws_tx, out).await?;
            },
        }
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

async fn send_all<S>(ws_tx: &mut S, messages: Vec<ClientMessage>) -> Result<(), DisplayError>
where
    S: futures::Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    for msg in messages {
        let data = encode_client_message(&msg)?;
        ws_tx
            .send(Message::Binary(data.into()))
            .await
            .map_err(DisplayError::Socket)?;
    }
    Ok(())
}
