//! WebSocket transport — accept loop plus one sequential task per connection.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::WebSocketStream;
use tracing::Instrument;

use crate::config::ServerConfig;
use crate::protocol::EventHandler;
use crate::types::{ServerError, ServerResult};

use super::framing::{self, Inbound};

/// How long a fatally closed connection waits for the peer's close reply.
const CLOSE_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// WebSocket server for the mock backend.
pub struct WebSocketServer {
    listener: TcpListener,
    handler: Arc<EventHandler>,
}

impl WebSocketServer {
    /// Bind the listener described by `config`.
    pub async fn bind(config: &ServerConfig) -> ServerResult<Self> {
        let listener = TcpListener::bind((config.address.as_str(), config.port)).await?;
        Ok(Self::with_listener(listener, EventHandler::from_config(config)))
    }

    pub fn with_listener(listener: TcpListener, handler: EventHandler) -> Self {
        Self {
            listener,
            handler: Arc::new(handler),
        }
    }

    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the process is killed.
    pub async fn run(self) -> ServerResult<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve until `shutdown` resolves. Connections already accepted keep running.
    pub async fn run_until<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()>,
    {
        let addr = self.local_addr()?;
        tracing::info!("WebSocket transport listening on ws://{addr}");
        tracing::info!(
            "Processing delay: {} ms, wire format: {}",
            self.handler.processor().delay().as_millis(),
            self.handler.wire_format()
        );

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, no longer accepting connections");
                    break;
                }
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(pair) => pair,
                        Err(e) => {
                            tracing::warn!("Failed to accept connection: {e}");
                            continue;
                        }
                    };

                    let handler = self.handler.clone();
                    let span = tracing::info_span!("connection", %peer);
                    tokio::spawn(accept_connection(stream, handler).instrument(span));
                }
            }
        }

        Ok(())
    }
}

async fn accept_connection(stream: TcpStream, handler: Arc<EventHandler>) {
    let ws = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            tracing::warn!("WebSocket handshake failed: {e}");
            return;
        }
    };

    tracing::info!("Client connected");

    match serve_connection(ws, &handler).await {
        Ok(()) => tracing::info!("Client disconnected"),
        Err(e) if e.is_disconnect() => tracing::info!("Client went away: {e}"),
        Err(e) => tracing::error!("Connection failed: {e}"),
    }
}

/// Per-connection loop: one reply per message, sent before the next message is read.
///
/// A request the handler cannot answer closes the connection with code 1011.
pub async fn serve_connection<S>(
    mut ws: WebSocketStream<S>,
    handler: &EventHandler,
) -> ServerResult<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    while let Some(message) = ws.next().await {
        let message = message?;
        let raw = match framing::inbound(&message) {
            Inbound::Text(raw) => raw,
            Inbound::Control => continue,
            // the next poll flushes our close reply and ends the stream
            Inbound::Close => continue,
        };

        tracing::debug!("Received: {raw}");

        match handler.handle_text(&raw).await {
            Ok(reply) => {
                tracing::debug!("Sending: {reply}");
                ws.send(framing::reply_frame(reply)).await?;
            }
            Err(ServerError::Event(e)) => {
                tracing::warn!("Closing connection, unusable request {raw}: {e}");
                ws.close(Some(framing::fatal_close_frame(e.to_string())))
                    .await?;
                drain_until_closed(&mut ws).await;
                return Ok(());
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

/// Read until the peer acknowledges our close frame, or give up after a while.
async fn drain_until_closed<S>(ws: &mut WebSocketStream<S>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let drain = async {
        while let Some(Ok(_)) = ws.next().await {}
    };
    if tokio::time::timeout(CLOSE_HANDSHAKE_TIMEOUT, drain)
        .await
        .is_err()
    {
        tracing::debug!("Peer never completed the closing handshake");
    }
}
