//! Reconnecting synchronization channel used by scoreboard clients.
//!
//! A [`SyncChannel`] keeps one duplex connection to the server open, reopening it after a
//! fixed delay whenever it drops. Updates are fire-and-forget: anything sent while the
//! connection is down is dropped, never queued or replayed.

mod transport;

use std::{
    fmt,
    sync::{Arc, RwLock},
    time::Duration,
};

use thiserror::Error;
use tokio::{
    sync::{Mutex, mpsc, oneshot, watch},
    task::JoinHandle,
    time::sleep,
};
use tokio_tungstenite::tungstenite;
use tracing::{debug, info, warn};

use crate::dto::wire::{WireUpdate, decode_frame};

pub use self::transport::{Connector, Transport, TungsteniteConnector, TungsteniteTransport};

/// Failures surfaced by the sync channel and its transports.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// An update was sent while the connection was not open.
    #[error("channel unavailable")]
    ChannelUnavailable,
    /// The connection dropped; the channel reconnects on its own.
    #[error("transport closed")]
    TransportClosed,
    /// Underlying WebSocket failure.
    #[error("websocket error: {0}")]
    Transport(Box<tungstenite::Error>),
}

impl From<tungstenite::Error> for ChannelError {
    fn from(err: tungstenite::Error) -> Self {
        ChannelError::Transport(Box::new(err))
    }
}

/// Connectivity of a [`SyncChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// A connection attempt is in flight.
    Connecting,
    /// Frames flow both ways.
    Open,
    /// Not connected; waiting for the next attempt or closed for good.
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
        })
    }
}

type MessageHandler = Arc<dyn Fn(WireUpdate) + Send + Sync>;

/// State shared between the channel handle and its supervisor task.
struct Shared {
    connectivity: watch::Sender<ConnectionState>,
    handler: RwLock<Option<MessageHandler>>,
}

impl Shared {
    fn set_state(&self, next: ConnectionState) {
        let previous = self.connectivity.send_replace(next);
        if previous != next {
            debug!(from = %previous, to = %next, "sync channel state changed");
        }
    }

    /// Decode a frame and hand each update to the registered handler.
    fn dispatch(&self, text: &str) {
        let updates = match decode_frame(text) {
            Ok(updates) => updates,
            Err(err) => {
                warn!(error = %err, payload = %text, "ignoring invalid frame");
                return;
            }
        };

        let handler = match self.handler.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        let Some(handler) = handler else {
            debug!(count = updates.len(), "no message handler registered; dropping updates");
            return;
        };
        for update in updates {
            handler(update);
        }
    }
}

struct Supervisor {
    cancel: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Handle on a persistent, self-healing connection to a scoreboard server.
pub struct SyncChannel {
    shared: Arc<Shared>,
    outbound: mpsc::UnboundedSender<String>,
    supervisor: Mutex<Option<Supervisor>>,
}

impl SyncChannel {
    /// Start connecting to `endpoint` in the background.
    ///
    /// Completion is observable through [`SyncChannel::is_connected`] and
    /// [`SyncChannel::connectivity`]. Whenever the connection drops, a new attempt is made
    /// after `reconnect_delay`, forever, until [`SyncChannel::close`].
    pub fn connect<C: Connector>(
        connector: C,
        endpoint: impl Into<String>,
        reconnect_delay: Duration,
    ) -> Self {
        let (connectivity, _) = watch::channel(ConnectionState::Connecting);
        let shared = Arc::new(Shared {
            connectivity,
            handler: RwLock::new(None),
        });
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let (cancel, cancel_rx) = oneshot::channel();

        let task = tokio::spawn(supervise(
            connector,
            endpoint.into(),
            reconnect_delay,
            shared.clone(),
            outbound_rx,
            cancel_rx,
        ));

        Self {
            shared,
            outbound,
            supervisor: Mutex::new(Some(Supervisor { cancel, task })),
        }
    }

    /// Transmit an update as a single-key frame.
    ///
    /// Dropped with a debug log when the connection is not open.
    pub fn send(&self, update: &WireUpdate) {
        if let Err(err) = self.try_send(update) {
            debug!(error = %err, update = ?update, "dropping outbound update");
        }
    }

    fn try_send(&self, update: &WireUpdate) -> Result<(), ChannelError> {
        if !self.is_connected() {
            return Err(ChannelError::ChannelUnavailable);
        }
        let frame = match update.to_frame() {
            Ok(frame) => frame,
            Err(err) => {
                warn!(error = %err, "failed to serialize update `{update:?}`");
                return Ok(());
            }
        };
        self.outbound
            .send(frame)
            .map_err(|_| ChannelError::TransportClosed)
    }

    /// Register the handler invoked once per decoded inbound update, replacing any previous one.
    pub fn on_message<F>(&self, handler: F)
    where
        F: Fn(WireUpdate) + Send + Sync + 'static,
    {
        let handler: MessageHandler = Arc::new(handler);
        match self.shared.handler.write() {
            Ok(mut guard) => *guard = Some(handler),
            Err(poisoned) => *poisoned.into_inner() = Some(handler),
        }
    }

    /// Whether the connection is currently open.
    pub fn is_connected(&self) -> bool {
        *self.shared.connectivity.borrow() == ConnectionState::Open
    }

    /// Receiver observing every connectivity change.
    pub fn connectivity(&self) -> watch::Receiver<ConnectionState> {
        self.shared.connectivity.subscribe()
    }

    /// Cancel any pending reconnection and release the transport. Idempotent.
    pub async fn close(&self) {
        let supervisor = self.supervisor.lock().await.take();
        if let Some(Supervisor { cancel, task }) = supervisor {
            let _ = cancel.send(());
            if let Err(err) = task.await {
                warn!(error = %err, "sync channel task ended abnormally");
            }
        }
        self.shared.set_state(ConnectionState::Closed);
    }
}

/// Why a connected session ended.
enum SessionEnd {
    /// Connection lost; try again after the delay.
    Dropped,
    /// The handle asked us to stop.
    Cancelled,
}

async fn supervise<C: Connector>(
    connector: C,
    endpoint: String,
    reconnect_delay: Duration,
    shared: Arc<Shared>,
    mut outbound: mpsc::UnboundedReceiver<String>,
    mut cancel: oneshot::Receiver<()>,
) {
    loop {
        shared.set_state(ConnectionState::Connecting);
        let attempt = tokio::select! {
            biased;
            _ = &mut cancel => break,
            attempt = connector.connect(&endpoint) => attempt,
        };

        match attempt {
            Ok(transport) => {
                // Frames queued for a previous connection are never replayed.
                while outbound.try_recv().is_ok() {}
                info!(%endpoint, "sync channel connected");
                shared.set_state(ConnectionState::Open);

                let end = run_session(transport, &shared, &mut outbound, &mut cancel).await;
                shared.set_state(ConnectionState::Closed);
                if let SessionEnd::Cancelled = end {
                    break;
                }
                info!(%endpoint, delay_ms = reconnect_delay.as_millis() as u64, "sync channel lost; reconnecting");
            }
            Err(err) => {
                shared.set_state(ConnectionState::Closed);
                warn!(%endpoint, error = %err, "sync channel connection attempt failed");
            }
        }

        tokio::select! {
            biased;
            _ = &mut cancel => break,
            _ = sleep(reconnect_delay) => {}
        }
    }

    debug!(%endpoint, "sync channel supervisor stopped");
}

async fn run_session<T: Transport>(
    mut transport: T,
    shared: &Shared,
    outbound: &mut mpsc::UnboundedReceiver<String>,
    cancel: &mut oneshot::Receiver<()>,
) -> SessionEnd {
    loop {
        tokio::select! {
            biased;
            _ = &mut *cancel => {
                if let Err(err) = transport.close().await {
                    debug!(error = %err, "error while closing transport");
                }
                return SessionEnd::Cancelled;
            }
            frame = outbound.recv() => match frame {
                Some(frame) => {
                    if let Err(err) = transport.send(frame).await {
                        warn!(error = %err, "failed to send frame");
                        return SessionEnd::Dropped;
                    }
                }
                // Every handle is gone; nobody can send or close any more.
                None => {
                    let _ = transport.close().await;
                    return SessionEnd::Cancelled;
                }
            },
            inbound = transport.recv() => match inbound {
                Some(Ok(text)) => shared.dispatch(&text),
                Some(Err(err)) => {
                    warn!(error = %err, "transport error");
                    return SessionEnd::Dropped;
                }
                None => {
                    debug!(error = %ChannelError::TransportClosed, "remote end closed the connection");
                    return SessionEnd::Dropped;
                }
            },
        }
    }
}
