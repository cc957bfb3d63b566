//! Transport layer — WebSocket server and frame mapping.

pub mod framing;
pub mod websocket;

pub use websocket::{serve_connection, WebSocketServer};
