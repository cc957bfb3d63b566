//! WebSocket client for poking at a running mock, used by sessions, the REPL and tests.

use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use graxpert_mock::{OutboundEvent, PROCESS_IMAGE_REQUEST};

use crate::types::ServerResult;

type ClientStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One thing the server sent back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Binary(Vec<u8>),
    /// The server closed the connection. `code` is `None` when no close frame arrived.
    Closed { code: Option<u16>, reason: String },
}

impl Reply {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Decode a JSON reply. Legacy-format replies and non-text replies yield `None`.
    pub fn event(&self) -> Option<OutboundEvent> {
        self.as_text()
            .and_then(|text| serde_json::from_str(text).ok())
    }
}

/// A connected client.
pub struct MockClient {
    ws: ClientStream,
    url: String,
}

impl MockClient {
    pub async fn connect(url: &str) -> ServerResult<Self> {
        let (ws, _response) = connect_async(url).await?;
        tracing::debug!("Connected to {url}");
        Ok(Self {
            ws,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send raw text exactly as given.
    pub async fn send_text(&mut self, text: &str) -> ServerResult<()> {
        self.ws.send(Message::Text(text.to_string())).await?;
        Ok(())
    }

    pub async fn send_binary(&mut self, bytes: Vec<u8>) -> ServerResult<()> {
        self.ws.send(Message::Binary(bytes)).await?;
        Ok(())
    }

    /// Send a `PROCESS_IMAGE_REQUEST` for `filename`.
    pub async fn request_processing(&mut self, filename: &str) -> ServerResult<()> {
        let request = json!({
            "event_type": PROCESS_IMAGE_REQUEST,
            "filename": filename,
        });
        self.send_text(&request.to_string()).await
    }

    /// Wait for the next data frame or the end of the connection.
    pub async fn next_reply(&mut self) -> ServerResult<Reply> {
        while let Some(message) = self.ws.next().await {
            match message? {
                Message::Text(text) => return Ok(Reply::Text(text)),
                Message::Binary(bytes) => return Ok(Reply::Binary(bytes)),
                Message::Close(frame) => {
                    return Ok(match frame {
                        Some(frame) => Reply::Closed {
                            code: Some(u16::from(frame.code)),
                            reason: frame.reason.into_owned(),
                        },
                        None => Reply::Closed {
                            code: None,
                            reason: String::new(),
                        },
                    })
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }

        Ok(Reply::Closed {
            code: None,
            reason: String::new(),
        })
    }

    /// Send raw text and wait for its reply.
    pub async fn roundtrip(&mut self, text: &str) -> ServerResult<Reply> {
        self.send_text(text).await?;
        self.next_reply().await
    }

    pub async fn close(mut self) -> ServerResult<()> {
        self.ws.close(None).await?;
        Ok(())
    }
}

/// One-line human summary of a reply.
pub fn describe_reply(reply: &Reply) -> String {
    match reply {
        Reply::Text(text) => match serde_json::from_str::<OutboundEvent>(text) {
            Ok(OutboundEvent::ProcessImageResponse {
                processing_status,
                message,
            }) => format!(
                "Received PROCESS_IMAGE_RESPONSE. Processing status: {}. Response message: {message}.",
                processing_status.as_str()
            ),
            Ok(event) => format!(
                "Received {} event. Response message: {}.",
                event.event_type(),
                event.message()
            ),
            Err(_) => format!("Received text data: {text}"),
        },
        Reply::Binary(_) => "Received binary data (not shown)".to_string(),
        Reply::Closed { code: Some(code), reason } if !reason.is_empty() => {
            format!("Connection closed by server (code {code}: {reason})")
        }
        Reply::Closed { code: Some(code), .. } => {
            format!("Connection closed by server (code {code})")
        }
        Reply::Closed { code: None, .. } => "Connection closed".to_string(),
    }
}
