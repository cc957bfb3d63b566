//! Main message handler — turns one inbound text message into one reply.

use graxpert_mock::{EventError, InboundEvent, OutboundEvent, WireFormat};

use crate::config::ServerConfig;
use crate::types::ServerResult;

use super::processor::SimulatedProcessor;

/// Stateless per-message handler, shared read-only by every connection.
#[derive(Debug, Clone)]
pub struct EventHandler {
    processor: SimulatedProcessor,
    wire_format: WireFormat,
}

impl EventHandler {
    pub fn new(processor: SimulatedProcessor, wire_format: WireFormat) -> Self {
        Self {
            processor,
            wire_format,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            SimulatedProcessor::new(config.processing_delay),
            config.wire_format,
        )
    }

    pub fn wire_format(&self) -> WireFormat {
        self.wire_format
    }

    pub fn processor(&self) -> &SimulatedProcessor {
        &self.processor
    }

    /// Produce the reply event for one raw message.
    ///
    /// Malformed JSON and unknown events are answered. A `PROCESS_IMAGE_REQUEST`
    /// without a filename is returned as an error; the caller owns that policy.
    pub async fn handle_event(&self, raw: &str) -> ServerResult<OutboundEvent> {
        let event = match InboundEvent::parse(raw) {
            Ok(event) => event,
            Err(EventError::Decode(e)) => {
                tracing::warn!("Parse error: {e}");
                return Ok(OutboundEvent::parse_error(raw, e));
            }
            Err(e) => return Err(e.into()),
        };

        match event.into_request()? {
            Some(request) => Ok(self.processor.process(&request).await),
            None => {
                tracing::warn!("Unknown event: {raw}");
                Ok(OutboundEvent::unknown_event(raw))
            }
        }
    }

    /// Produce the rendered reply for one raw message.
    pub async fn handle_text(&self, raw: &str) -> ServerResult<String> {
        let reply = self.handle_event(raw).await?;
        Ok(self.wire_format.render(&reply)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ServerError;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tokio::time::Instant;

    fn handler(format: WireFormat) -> EventHandler {
        EventHandler::new(SimulatedProcessor::new(Duration::from_secs(2)), format)
    }

    #[test]
    fn test_from_config() {
        let config = ServerConfig {
            processing_delay: Duration::from_millis(250),
            wire_format: WireFormat::Legacy,
            ..ServerConfig::default()
        };
        let handler = EventHandler::from_config(&config);
        assert_eq!(handler.wire_format(), WireFormat::Legacy);
        assert_eq!(handler.processor().delay(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_parse_error_is_immediate() {
        let handler = handler(WireFormat::Json);
        let start = Instant::now();
        let text = handler.handle_text("{not json").await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);

        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["event_type"], "PARSE_ERROR");
        assert_eq!(value["message"], "Parsing of '{not json' failed.");
        assert!(!value["error"].as_str().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_process_request() {
        let handler = handler(WireFormat::Json);
        let start = Instant::now();
        let text = handler
            .handle_text(r#"{"event_type":"PROCESS_IMAGE_REQUEST","filename":"foo.fits"}"#)
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_secs(2));

        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value,
            json!({
                "event_type": "PROCESS_IMAGE_RESPONSE",
                "processing_status": "DONE",
                "message": "finished processing of foo.fits"
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_event_embeds_raw_text() {
        let handler = handler(WireFormat::Json);
        let raw = r#"{"event_type":"SOMETHING_ELSE"}"#;
        let reply = handler.handle_event(raw).await.unwrap();
        assert_eq!(reply, OutboundEvent::unknown_event(raw));
        assert_eq!(
            reply.message(),
            r#"Unknown event in: '{"event_type":"SOMETHING_ELSE"}'."#
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_event_type_is_unknown() {
        let handler = handler(WireFormat::Json);
        let reply = handler.handle_event(r#"{"filename":"x"}"#).await.unwrap();
        assert_eq!(reply.event_type(), "UNKNOWN_EVENT_ERROR");
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_filename_is_an_error() {
        let handler = handler(WireFormat::Json);
        let err = handler
            .handle_event(r#"{"event_type":"PROCESS_IMAGE_REQUEST"}"#)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServerError::Event(EventError::MissingField("filename"))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_legacy_format() {
        let handler = handler(WireFormat::Legacy);
        let text = handler
            .handle_text(r#"{"event_type":"PROCESS_IMAGE_REQUEST","filename":"m42.fits"}"#)
            .await
            .unwrap();
        assert_eq!(
            text,
            "{'event_type': 'PROCESS_IMAGE_RESPONSE', 'processing_status': 'DONE', 'message': 'finished processing of m42.fits'}"
        );

        let text = handler.handle_text("oops").await.unwrap();
        assert!(serde_json::from_str::<Value>(&text).is_ok());
    }
}
