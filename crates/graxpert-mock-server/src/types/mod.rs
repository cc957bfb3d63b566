//! Server-side types: errors and self-description.

pub mod error;
pub mod info;

pub use error::*;
pub use info::*;
