//! Error types for the mock server and its client.

use graxpert_mock::EventError;
use tokio_tungstenite::tungstenite;

/// All errors that can occur in the mock server.
#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("{0}")]
    Event(#[from] EventError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ServerError {
    /// True when the peer went away, which is routine for a connection task.
    pub fn is_disconnect(&self) -> bool {
        use tungstenite::error::ProtocolError;
        matches!(
            self,
            ServerError::WebSocket(
                tungstenite::Error::ConnectionClosed
                    | tungstenite::Error::AlreadyClosed
                    | tungstenite::Error::Protocol(ProtocolError::ResetWithoutClosingHandshake)
            )
        )
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
