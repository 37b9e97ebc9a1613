//! Duplex text transports the sync channel runs over.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, Message},
};
use tracing::debug;

use super::ChannelError;

/// An open, message-oriented connection carrying UTF-8 text frames.
#[async_trait]
pub trait Transport: Send {
    /// Transmit one text frame.
    async fn send(&mut self, frame: String) -> Result<(), ChannelError>;

    /// Next inbound text frame; `None` once the remote end has closed.
    async fn recv(&mut self) -> Option<Result<String, ChannelError>>;

    /// Close the connection and release its resources.
    async fn close(&mut self) -> Result<(), ChannelError>;
}

/// Opens [`Transport`]s towards an endpoint; called again on every reconnection attempt.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Transport produced by a successful connection.
    type Transport: Transport + 'static;

    /// Open a new connection to `endpoint`.
    async fn connect(&self, endpoint: &str) -> Result<Self::Transport, ChannelError>;
}

/// [`Connector`] opening WebSocket connections (`ws://` or `wss://`).
#[derive(Debug, Default, Clone, Copy)]
pub struct TungsteniteConnector;

#[async_trait]
impl Connector for TungsteniteConnector {
    type Transport = TungsteniteTransport;

    async fn connect(&self, endpoint: &str) -> Result<Self::Transport, ChannelError> {
        let (stream, response) = connect_async(endpoint).await?;
        debug!(endpoint, status = %response.status(), "websocket handshake completed");
        Ok(TungsteniteTransport { stream })
    }
}

/// WebSocket connection opened by [`TungsteniteConnector`].
pub struct TungsteniteTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for TungsteniteTransport {
    async fn send(&mut self, frame: String) -> Result<(), ChannelError> {
        self.stream.send(Message::Text(frame.into())).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, ChannelError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Close(_)) => return None,
                // Pings are answered by tungstenite itself.
                Ok(Message::Binary(_) | Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    return None;
                }
                Err(err) => return Some(Err(err.into())),
            }
        }
    }

    async fn close(&mut self) -> Result<(), ChannelError> {
        match self.stream.close(None).await {
            Ok(()) | Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}
