//! Static description of the server, printed by `graxpert-mock-server info`.

use serde::Serialize;

use graxpert_mock::PROCESS_IMAGE_REQUEST;

use crate::config::ServerConfig;

pub const SERVER_NAME: &str = "graxpert-mock-server";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Events the server can emit, in no particular order.
pub const EMITTED_EVENTS: &[&str] = &[
    "PARSE_ERROR",
    "PROCESS_IMAGE_RESPONSE",
    "UNKNOWN_EVENT_ERROR",
];

#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub endpoint: String,
    pub processing_delay_ms: u64,
    pub wire_format: String,
    pub accepts: Vec<&'static str>,
    pub emits: Vec<&'static str>,
}

impl ServerInfo {
    pub fn for_config(config: &ServerConfig) -> Self {
        Self {
            name: SERVER_NAME,
            version: SERVER_VERSION,
            endpoint: config.url(),
            processing_delay_ms: config.processing_delay.as_millis() as u64,
            wire_format: config.wire_format.to_string(),
            accepts: vec![PROCESS_IMAGE_REQUEST],
            emits: EMITTED_EVENTS.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_info() {
        let info = ServerInfo::for_config(&ServerConfig::default());
        assert_eq!(info.endpoint, "ws://localhost:8080");
        assert_eq!(info.processing_delay_ms, 2000);
        assert_eq!(info.wire_format, "json");
        assert_eq!(info.accepts, vec!["PROCESS_IMAGE_REQUEST"]);
        assert_eq!(info.emits.len(), 3);
    }
}
