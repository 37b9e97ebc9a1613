use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{
    sync::{broadcast::error::RecvError, mpsc},
    task::JoinHandle,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::wire::{WireUpdate, decode_frame},
    state::{HubEvent, PeerConnection, SharedState},
};

/// Failure while pushing frames to a peer.
#[derive(Debug, Error)]
enum PeerError {
    /// Writer channel closed - connection should be terminated immediately.
    #[error("connection closed")]
    ConnectionClosed,
}

/// Handle the full lifecycle of one synchronised WebSocket peer.
///
/// The peer first receives every field of the current record, then each update applied by
/// anyone else. Frames it sends are applied to the shared record and fanned out to the others.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let peer_id = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    // Subscribe before reading the record so nothing applied in between is missed.
    let mut updates = state.subscribe();
    state.peers().insert(
        peer_id,
        PeerConnection {
            id: peer_id,
            tx: outbound_tx.clone(),
        },
    );
    info!(peer = %peer_id, "peer connected");

    if send_full_state(&state, &outbound_tx).await.is_err() {
        info!(peer = %peer_id, "connection closed during initial sync, terminating");
        state.peers().remove(&peer_id);
        finalize(writer_task, outbound_tx).await;
        return;
    }

    loop {
        tokio::select! {
            hub_event = updates.recv() => match hub_event {
                Ok(HubEvent { origin, update }) => {
                    if origin == Some(peer_id) {
                        continue;
                    }
                    if send_update(&outbound_tx, &update).is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(peer = %peer_id, skipped, "peer lagged behind; resending full state");
                    if send_full_state(&state, &outbound_tx).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            },
            inbound = receiver.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    handle_frame(&state, peer_id, text.as_str()).await;
                }
                Some(Ok(Message::Ping(payload))) => {
                    let _ = outbound_tx.send(Message::Pong(payload));
                }
                Some(Ok(Message::Close(frame))) => {
                    info!(peer = %peer_id, "peer closed");
                    let _ = outbound_tx.send(Message::Close(frame));
                    break;
                }
                Some(Ok(Message::Binary(_))) | Some(Ok(Message::Pong(_))) => {}
                Some(Err(err)) => {
                    warn!(peer = %peer_id, error = %err, "websocket error");
                    break;
                }
                None => break,
            },
        }
    }

    state.peers().remove(&peer_id);
    info!(peer = %peer_id, "peer disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Decode an inbound frame and apply each of its updates on behalf of `peer_id`.
async fn handle_frame(state: &SharedState, peer_id: Uuid, text: &str) {
    debug!(peer = %peer_id, payload = %text, "received frame");
    match decode_frame(text) {
        Ok(updates) => {
            for update in updates {
                state.apply_update(update, Some(peer_id)).await;
            }
        }
        Err(err) => {
            warn!(peer = %peer_id, error = %err, "ignoring invalid frame");
        }
    }
}

/// Push every field of the current record, one frame each.
async fn send_full_state(
    state: &SharedState,
    tx: &mpsc::UnboundedSender<Message>,
) -> Result<(), PeerError> {
    let game = state.snapshot().await;
    WireUpdate::full_state(&game)
        .iter()
        .try_for_each(|update| send_update(tx, update))
}

/// Serialize an update and push it onto the peer's writer channel.
///
/// Serialization failures are logged and swallowed; only a closed writer is an error.
fn send_update(tx: &mpsc::UnboundedSender<Message>, update: &WireUpdate) -> Result<(), PeerError> {
    let payload = match update.to_frame() {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, "failed to serialize update `{update:?}`");
            return Ok(());
        }
    };

    tx.send(Message::Text(payload.into()))
        .map_err(|_| PeerError::ConnectionClosed)
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
