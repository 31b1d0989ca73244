//! Websocket listener for server-initiated change notifications.

use anyhow::{anyhow, Context, Result};
use futures::StreamExt;
use shared::protocol::PushMessage;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{info, warn};

/// Derives the websocket endpoint from the HTTP server url.
pub fn push_url(server_url: &str) -> Result<String> {
    let trimmed = server_url.trim_end_matches('/');
    let ws_url = if trimmed.starts_with("https://") {
        trimmed.replacen("https://", "wss://", 1)
    } else if trimmed.starts_with("http://") {
        trimmed.replacen("http://", "ws://", 1)
    } else {
        return Err(anyhow!("server_url must start with http:// or https://"));
    };
    Ok(format!("{ws_url}/ws"))
}

pub fn decode_push(text: &str) -> serde_json::Result<PushMessage> {
    serde_json::from_str(text)
}

/// Connects to the push endpoint and forwards every decoded message to `tx`
/// until the socket closes or the receiver is dropped.
pub async fn spawn_push_events(
    server_url: &str,
    tx: mpsc::UnboundedSender<PushMessage>,
) -> Result<JoinHandle<()>> {
    let ws_url = push_url(server_url)?;
    let (ws_stream, _) = connect_async(&ws_url)
        .await
        .with_context(|| format!("failed to connect websocket: {ws_url}"))?;
    info!(url = %ws_url, "push: connected");
    let (_, mut ws_reader) = ws_stream.split();

    Ok(tokio::spawn(async move {
        while let Some(msg) = ws_reader.next().await {
            match msg {
                Ok(Message::Text(text)) => match decode_push(&text) {
                    Ok(message) => {
                        if tx.send(message).is_err() {
                            break;
                        }
                    }
                    Err(err) => warn!("push: invalid message: {err}"),
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(err) => {
                    warn!("push: websocket receive failed: {err}");
                    break;
                }
            }
        }
        info!("push: listener stopped");
    }))
}
