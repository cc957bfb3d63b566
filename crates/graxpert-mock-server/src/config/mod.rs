//! Configuration loading and resolution.
//!
//! Every setting resolves in the same order: explicit CLI value, then
//! environment variable, then the compiled-in default.

use std::time::Duration;

use graxpert_mock::WireFormat;

use crate::types::{ServerError, ServerResult};

pub const DEFAULT_ADDRESS: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_secs(2);

pub const ADDRESS_ENV: &str = "GRAXPERT_MOCK_ADDRESS";
pub const PORT_ENV: &str = "GRAXPERT_MOCK_PORT";

/// Everything the server needs to start listening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub processing_delay: Duration,
    pub wire_format: WireFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            processing_delay: DEFAULT_PROCESSING_DELAY,
            wire_format: WireFormat::default(),
        }
    }
}

impl ServerConfig {
    /// WebSocket URL a client would use to reach this server.
    pub fn url(&self) -> String {
        endpoint_url(&self.address, self.port)
    }
}

/// Resolve the listen/connect address.
pub fn resolve_address(explicit: Option<&str>) -> String {
    resolve_address_with(explicit, std::env::var(ADDRESS_ENV).ok().as_deref())
}

pub fn resolve_address_with(explicit: Option<&str>, env_value: Option<&str>) -> String {
    if let Some(address) = explicit {
        return address.to_string();
    }

    match env_value.map(str::trim) {
        Some(address) if !address.is_empty() => address.to_string(),
        _ => DEFAULT_ADDRESS.to_string(),
    }
}

/// Resolve the listen/connect port. An unparsable environment value is an error.
pub fn resolve_port(explicit: Option<u16>) -> ServerResult<u16> {
    resolve_port_with(explicit, std::env::var(PORT_ENV).ok().as_deref())
}

pub fn resolve_port_with(explicit: Option<u16>, env_value: Option<&str>) -> ServerResult<u16> {
    if let Some(port) = explicit {
        return Ok(port);
    }

    match env_value.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw.parse().map_err(|e| {
            ServerError::Config(format!("{PORT_ENV}='{raw}' is not a valid port: {e}"))
        }),
        _ => Ok(DEFAULT_PORT),
    }
}

/// Resolve the URL a client connects to.
pub fn resolve_url(explicit: Option<&str>) -> ServerResult<String> {
    if let Some(url) = explicit {
        return Ok(url.to_string());
    }
    Ok(endpoint_url(&resolve_address(None), resolve_port(None)?))
}

fn endpoint_url(address: &str, port: u16) -> String {
    if address.contains(':') {
        format!("ws://[{address}]:{port}")
    } else {
        format!("ws://{address}:{port}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.address, "localhost");
        assert_eq!(config.port, 8080);
        assert_eq!(config.processing_delay, Duration::from_secs(2));
        assert_eq!(config.wire_format, WireFormat::Json);
        assert_eq!(config.url(), "ws://localhost:8080");
    }

    #[test]
    fn test_address_precedence() {
        assert_eq!(resolve_address_with(Some("0.0.0.0"), Some("10.0.0.1")), "0.0.0.0");
        assert_eq!(resolve_address_with(None, Some("10.0.0.1")), "10.0.0.1");
        assert_eq!(resolve_address_with(None, Some("  ")), "localhost");
        assert_eq!(resolve_address_with(None, None), "localhost");
    }

    #[test]
    fn test_port_precedence() {
        assert_eq!(resolve_port_with(Some(9000), Some("9100")).unwrap(), 9000);
        assert_eq!(resolve_port_with(None, Some("9100")).unwrap(), 9100);
        assert_eq!(resolve_port_with(None, None).unwrap(), 8080);
    }

    #[test]
    fn test_invalid_port_env() {
        let err = resolve_port_with(None, Some("eighty")).unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
        assert!(err.to_string().contains(PORT_ENV));

        assert!(resolve_port_with(None, Some("70000")).is_err());
    }

    #[test]
    fn test_ipv6_url() {
        let config = ServerConfig {
            address: "::1".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(config.url(), "ws://[::1]:8080");
    }

    #[test]
    fn test_explicit_url_wins() {
        assert_eq!(
            resolve_url(Some("ws://example:1234")).unwrap(),
            "ws://example:1234"
        );
    }
}
