//! Core data types for the events exchanged with the mock backend.

use serde::{Deserialize, Serialize};

/// Outcome of a simulated processing run. The mock only ever finishes successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProcessingStatus {
    Done,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Done => "DONE",
        }
    }
}

/// A reply sent back to the client. Exactly one is produced per inbound message.
///
/// Field order matters on the wire: `event_type` first, then the fields in
/// declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboundEvent {
    /// The inbound text was not valid JSON.
    ParseError { message: String, error: String },
    /// The simulated processing of a file finished.
    ProcessImageResponse {
        processing_status: ProcessingStatus,
        message: String,
    },
    /// Valid JSON, but not an event the mock knows.
    UnknownEventError { message: String },
}

impl OutboundEvent {
    pub fn parse_error(raw: &str, error: impl std::fmt::Display) -> Self {
        OutboundEvent::ParseError {
            message: format!("Parsing of '{raw}' failed."),
            error: error.to_string(),
        }
    }

    pub fn processed(filename: &str) -> Self {
        OutboundEvent::ProcessImageResponse {
            processing_status: ProcessingStatus::Done,
            message: format!("finished processing of {filename}"),
        }
    }

    pub fn unknown_event(raw: &str) -> Self {
        OutboundEvent::UnknownEventError {
            message: format!("Unknown event in: '{raw}'."),
        }
    }

    /// The `event_type` literal this event carries on the wire.
    pub fn event_type(&self) -> &'static str {
        match self {
            OutboundEvent::ParseError { .. } => "PARSE_ERROR",
            OutboundEvent::ProcessImageResponse { .. } => "PROCESS_IMAGE_RESPONSE",
            OutboundEvent::UnknownEventError { .. } => "UNKNOWN_EVENT_ERROR",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            OutboundEvent::ParseError { message, .. }
            | OutboundEvent::ProcessImageResponse { message, .. }
            | OutboundEvent::UnknownEventError { message } => message,
        }
    }

    /// Key/value pairs in wire order, `event_type` included.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        let mut entries: Vec<(&'static str, &str)> = vec![("event_type", self.event_type())];
        match self {
            OutboundEvent::ParseError { message, error } => {
                entries.push(("message", message.as_str()));
                entries.push(("error", error.as_str()));
            }
            OutboundEvent::ProcessImageResponse {
                processing_status,
                message,
            } => {
                entries.push(("processing_status", processing_status.as_str()));
                entries.push(("message", message.as_str()));
            }
            OutboundEvent::UnknownEventError { message } => {
                entries.push(("message", message.as_str()));
            }
        }
        entries
    }
}

/// Errors that can occur while decoding or encoding events.
#[derive(thiserror::Error, Debug)]
pub enum EventError {
    #[error("{0}")]
    Decode(serde_json::Error),

    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("Encode error: {0}")]
    Encode(serde_json::Error),
}

/// Convenience result type.
pub type EventResult<T> = Result<T, EventError>;
