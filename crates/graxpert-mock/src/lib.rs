//! GraXpert mock — event model for a simulated background-extraction backend.
//!
//! Classifies inbound text messages and renders the replies the mock sends back.
//! The crate is runtime-agnostic; transport and timing live in `graxpert-mock-server`.

pub mod inbound;
pub mod render;
pub mod types;

pub use inbound::{InboundEvent, ProcessImageRequest, PROCESS_IMAGE_REQUEST};
pub use render::{py_str_repr, WireFormat};
pub use types::*;
