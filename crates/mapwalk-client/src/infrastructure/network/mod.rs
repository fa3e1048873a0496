//! Network infrastructure for the client.
//!
//! Owns the single WebSocket connection to the relay server.
//!
//! Architecture:
//! - [`ServerConnection::start`] spawns one task that connects, then reads
//!   and writes the socket from a `tokio::select!` loop.
//! - Inbound text frames are forwarded as [`NetworkEvent`]s on an `mpsc`
//!   channel, strictly in arrival order.
//! - Outbound frames go through [`ChannelOutbound`], which queues them on an
//!   unbounded channel so the application never waits on the socket.
//! - The connection is opened once.  When it ends, for any reason, exactly
//!   one [`NetworkEvent::Closed`] is delivered and the task exits.  There is
//!   no reconnect.

pub mod mock;

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message as WsMessage},
};
use tracing::{debug, error, info, warn};

use crate::application::session_client::{Outbound, SendError};

/// Errors that can occur in the client network layer.
#[derive(Debug, Error)]
pub enum ClientNetworkError {
    /// The WebSocket handshake with the server failed.
    #[error("failed to connect to {url}: {source}")]
    ConnectFailed {
        url: String,
        #[source]
        source: WsError,
    },
    /// The established connection failed.
    #[error("WebSocket error: {0}")]
    Transport(#[from] WsError),
}

/// Events emitted by the network layer to the host loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    /// The WebSocket handshake completed.
    Opened,
    /// A text frame arrived from the server.
    Message(String),
    /// The connection is gone (or never came up).  Always the last event.
    Closed,
}

/// Capacity of the inbound event channel.
const EVENT_CHANNEL_CAPACITY: usize = 128;

/// Handle to the spawned connection task.
pub struct ServerConnection;

impl ServerConnection {
    /// Connects to `url` in the background.
    ///
    /// Returns immediately with the event receiver and the outbound sender;
    /// the first event is either [`NetworkEvent::Opened`] or, if the
    /// handshake fails, [`NetworkEvent::Closed`].
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(url: impl Into<String>) -> (mpsc::Receiver<NetworkEvent>, ChannelOutbound) {
        let url = url.into();
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (out_tx, out_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            match run_connection(&url, &event_tx, out_rx).await {
                Ok(()) => info!("connection to {url} closed"),
                Err(e) => warn!("connection to {url} ended: {e}"),
            }
            let _ = event_tx.send(NetworkEvent::Closed).await;
        });

        (event_rx, ChannelOutbound { tx: out_tx })
    }
}

/// Runs one connection from handshake to close.
async fn run_connection(
    url: &str,
    events: &mpsc::Sender<NetworkEvent>,
    mut outbound: mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientNetworkError> {
    let (ws_stream, _response) =
        connect_async(url)
            .await
            .map_err(|source| ClientNetworkError::ConnectFailed {
                url: url.to_string(),
                source,
            })?;
    info!("connected to {url}");

    if events.send(NetworkEvent::Opened).await.is_err() {
        debug!("event receiver dropped before open");
        return Ok(());
    }

    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    loop {
        tokio::select! {
            frame = ws_rx.next() => {
                let msg = match frame {
                    Some(Ok(msg)) => msg,
                    Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) | None => {
                        debug!("server stream ended");
                        return Ok(());
                    }
                    Some(Err(e)) => {
                        error!("WebSocket read error: {e}");
                        return Err(e.into());
                    }
                };

                match msg {
                    WsMessage::Text(text) => {
                        if events.send(NetworkEvent::Message(text)).await.is_err() {
                            debug!("event receiver dropped; closing connection");
                            let _ = ws_tx.close().await;
                            return Ok(());
                        }
                    }
                    WsMessage::Close(frame) => {
                        debug!(?frame, "server sent close");
                        return Ok(());
                    }
                    WsMessage::Binary(bytes) => {
                        debug!(len = bytes.len(), "ignoring binary frame");
                    }
                    WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => {}
                }
            }

            queued = outbound.recv() => {
                match queued {
                    Some(text) => {
                        ws_tx.send(WsMessage::Text(text)).await?;
                    }
                    None => {
                        debug!("all outbound senders dropped; closing connection");
                        let _ = ws_tx.close().await;
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// [`Outbound`] implementation that queues frames for the connection task.
#[derive(Debug, Clone)]
pub struct ChannelOutbound {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelOutbound {
    /// Wraps an existing sender.
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx }
    }
}

impl Outbound for ChannelOutbound {
    fn send_text(&mut self, text: String) -> Result<(), SendError> {
        self.tx.send(text).map_err(|_| SendError::Closed)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[test]
    fn test_channel_outbound_queues_text() {
        // Arrange
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut out = ChannelOutbound::new(tx);

        // Act
        out.send_text("{\"lat\":1,\"lng\":2}".to_string()).unwrap();

        // Assert
        assert_eq!(rx.try_recv().unwrap(), "{\"lat\":1,\"lng\":2}");
    }

    #[test]
    fn test_channel_outbound_reports_closed_after_receiver_drop() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut out = ChannelOutbound::new(tx);
        drop(rx);

        let result = out.send_text("x".to_string());

        assert_eq!(result, Err(SendError::Closed));
    }

    #[tokio::test]
    async fn test_unreachable_server_yields_single_closed_event() {
        // Arrange: port 1 refuses connections on any sane host.
        let (mut events, _out) = ServerConnection::start("ws://127.0.0.1:1/ws");

        // Act
        let first = timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("connect attempt must finish");
        let second = timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("channel must close");

        // Assert
        assert_eq!(first, Some(NetworkEvent::Closed));
        assert_eq!(second, None);
    }

    #[tokio::test]
    async fn test_invalid_url_yields_closed_event() {
        let (mut events, _out) = ServerConnection::start("not a url");

        let first = timeout(Duration::from_secs(5), events.recv()).await.unwrap();

        assert_eq!(first, Some(NetworkEvent::Closed));
    }
}
