use super::error::RelayError;
use super::registry::{Connection, Outbound};
use super::router::MessageRouter;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Per-connection transport limits
#[derive(Debug, Clone, Copy)]
pub struct ConnectionSettings {
    /// Frames a connection may have queued before deliveries to it are dropped
    pub outbound_queue: usize,
    /// Longest a single socket write may take before the peer is dropped
    pub send_timeout: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            outbound_queue: 64,
            send_timeout: Duration::from_secs(5),
        }
    }
}

/// Run a WebSocket connection for one match.
/// Splits the socket, drains the outbound queue into it, feeds inbound frames to
/// the router, and removes the connection from its match once either side ends.
pub async fn run_connection(
    socket: WebSocket,
    match_id: String,
    router: Arc<MessageRouter>,
    settings: ConnectionSettings,
) {
    let (connection, rx) = Connection::new(settings.outbound_queue);
    let connection_id = connection.id();
    info!(match_id, connection = %connection_id, "Relay connection opened");

    let (sender, receiver) = socket.split();

    let mut send_task = tokio::spawn(send_loop(sender, rx, settings.send_timeout));
    let mut recv_task = tokio::spawn(receive_loop(
        receiver,
        match_id.clone(),
        connection,
        router.clone(),
    ));

    // Wait for either task to complete, then stop the other
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    router.disconnect(&match_id, connection_id);
    info!(match_id, connection = %connection_id, "Relay connection closed");
}

async fn send_loop(
    mut sender: SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<Outbound>,
    send_timeout: Duration,
) {
    while let Some(payload) = rx.recv().await {
        let frame = Message::Text(payload.to_string());
        match tokio::time::timeout(send_timeout, sender.send(frame)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                debug!(%err, "Socket write failed");
                break;
            }
            Err(_) => {
                warn!(?send_timeout, "Socket write timed out, dropping peer");
                break;
            }
        }
    }
}

async fn receive_loop(
    mut receiver: SplitStream<WebSocket>,
    match_id: String,
    connection: Connection,
    router: Arc<MessageRouter>,
) {
    while let Some(Ok(msg)) = receiver.next().await {
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => {
                debug!("Received non-text message, ignoring");
                continue;
            }
        };

        debug!(match_id, raw = %text, "Received message");

        match router.handle(&match_id, &connection, &text) {
            Ok(()) => {}
            Err(err @ RelayError::EmptyMatchTurnAdvance) => {
                debug!(match_id, %err, "Turn not advanced");
            }
            Err(err) => {
                warn!(match_id, connection = %connection.id(), %err, "Dropped client message");
            }
        }
    }
}
