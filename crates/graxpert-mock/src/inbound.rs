//! Classification of inbound text messages.

use serde_json::Value;

use crate::types::{EventError, EventResult};

/// The only `event_type` the mock acts on.
pub const PROCESS_IMAGE_REQUEST: &str = "PROCESS_IMAGE_REQUEST";

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// `event_type` is `PROCESS_IMAGE_REQUEST`. The filename is checked later so the
    /// caller decides what a missing one means.
    ProcessImage { filename: Option<String> },
    /// Anything else, including a missing or non-string `event_type` and JSON values
    /// that are not objects.
    Unrecognized { event_type: Option<String> },
}

/// A validated request to (pretend to) process one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessImageRequest {
    pub filename: String,
}

impl InboundEvent {
    /// Decode raw message text. Fails only when the text is not valid JSON.
    pub fn parse(raw: &str) -> EventResult<Self> {
        let value: Value = serde_json::from_str(raw).map_err(EventError::Decode)?;
        Ok(Self::from_value(&value))
    }

    pub fn from_value(value: &Value) -> Self {
        let event_type = value.get("event_type").and_then(Value::as_str);

        let event = match event_type {
            Some(PROCESS_IMAGE_REQUEST) => InboundEvent::ProcessImage {
                filename: value
                    .get("filename")
                    .and_then(Value::as_str)
                    .map(str::to_owned),
            },
            other => InboundEvent::Unrecognized {
                event_type: other.map(str::to_owned),
            },
        };

        tracing::trace!(?event, "classified inbound event");
        event
    }

    /// Turn a recognized event into a request.
    ///
    /// Returns `Ok(None)` for unrecognized events and `MissingField` when a
    /// `PROCESS_IMAGE_REQUEST` carries no usable filename.
    pub fn into_request(self) -> EventResult<Option<ProcessImageRequest>> {
        match self {
            InboundEvent::ProcessImage {
                filename: Some(filename),
            } => Ok(Some(ProcessImageRequest { filename })),
            InboundEvent::ProcessImage { filename: None } => {
                Err(EventError::MissingField("filename"))
            }
            InboundEvent::Unrecognized { .. } => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_request() {
        let event =
            InboundEvent::parse(r#"{"event_type":"PROCESS_IMAGE_REQUEST","filename":"foo.fits"}"#)
                .unwrap();
        assert_eq!(
            event,
            InboundEvent::ProcessImage {
                filename: Some("foo.fits".to_string())
            }
        );
        let request = event.into_request().unwrap().unwrap();
        assert_eq!(request.filename, "foo.fits");
    }

    #[test]
    fn test_malformed_json() {
        let err = InboundEvent::parse("not json").unwrap_err();
        assert!(matches!(err, EventError::Decode(_)));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_unknown_event_type() {
        let event = InboundEvent::parse(r#"{"event_type":"SOMETHING_ELSE"}"#).unwrap();
        assert_eq!(
            event,
            InboundEvent::Unrecognized {
                event_type: Some("SOMETHING_ELSE".to_string())
            }
        );
        assert!(event.into_request().unwrap().is_none());
    }

    #[test]
    fn test_missing_event_type_is_unrecognized() {
        let event = InboundEvent::parse(r#"{"filename":"foo.fits"}"#).unwrap();
        assert_eq!(event, InboundEvent::Unrecognized { event_type: None });
    }

    #[test]
    fn test_non_string_event_type_is_unrecognized() {
        let event = InboundEvent::parse(r#"{"event_type":42}"#).unwrap();
        assert_eq!(event, InboundEvent::Unrecognized { event_type: None });
    }

    #[test]
    fn test_non_object_json_is_unrecognized() {
        for raw in ["[1, 2, 3]", "\"PROCESS_IMAGE_REQUEST\"", "7", "null"] {
            let event = InboundEvent::parse(raw).unwrap();
            assert_eq!(event, InboundEvent::Unrecognized { event_type: None }, "{raw}");
        }
    }

    #[test]
    fn test_event_type_is_case_sensitive() {
        let event = InboundEvent::parse(r#"{"event_type":"process_image_request"}"#).unwrap();
        assert!(matches!(event, InboundEvent::Unrecognized { .. }));
    }

    #[test]
    fn test_missing_filename() {
        let event = InboundEvent::parse(r#"{"event_type":"PROCESS_IMAGE_REQUEST"}"#).unwrap();
        let err = event.into_request().unwrap_err();
        assert!(matches!(err, EventError::MissingField("filename")));
        assert_eq!(err.to_string(), "missing field 'filename'");
    }

    #[test]
    fn test_non_string_filename_counts_as_missing() {
        let event =
            InboundEvent::parse(r#"{"event_type":"PROCESS_IMAGE_REQUEST","filename":3}"#).unwrap();
        assert!(event.into_request().is_err());
    }
}
