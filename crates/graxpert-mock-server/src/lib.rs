//! GraXpert mock server — a WebSocket stand-in for the background-extraction backend.

pub mod client;
pub mod config;
pub mod protocol;
pub mod repl;
pub mod session;
pub mod transport;
pub mod types;

pub use client::MockClient;
pub use config::ServerConfig;
pub use protocol::EventHandler;
pub use transport::WebSocketServer;
