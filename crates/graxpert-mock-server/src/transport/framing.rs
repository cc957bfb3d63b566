//! Mapping between WebSocket frames and event text.

use std::borrow::Cow;

use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

/// What an inbound frame means to the connection loop.
#[derive(Debug, PartialEq, Eq)]
pub enum Inbound<'a> {
    /// Event text to hand to the handler.
    Text(Cow<'a, str>),
    /// Ping/pong and raw frames; tungstenite answers pings itself.
    Control,
    /// The peer started the closing handshake.
    Close,
}

/// Classify one inbound frame. Binary frames are read as (lossy) UTF-8 text.
pub fn inbound(message: &Message) -> Inbound<'_> {
    match message {
        Message::Text(text) => Inbound::Text(Cow::Borrowed(text.as_str())),
        Message::Binary(bytes) => Inbound::Text(String::from_utf8_lossy(bytes)),
        Message::Close(_) => Inbound::Close,
        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => Inbound::Control,
    }
}

/// Wrap a rendered reply in a text frame.
pub fn reply_frame(text: String) -> Message {
    Message::Text(text)
}

/// Close frame sent when a message cannot be handled at all (code 1011).
pub fn fatal_close_frame(reason: impl Into<String>) -> CloseFrame<'static> {
    let mut reason = reason.into();
    // control frame payloads are capped at 125 bytes, two of which hold the code
    if reason.len() > 123 {
        let mut end = 123;
        while !reason.is_char_boundary(end) {
            end -= 1;
        }
        reason.truncate(end);
    }
    CloseFrame {
        code: CloseCode::Error,
        reason: Cow::Owned(reason),
    }
}
