//! Event handling — decode, dispatch, simulate, reply.

pub mod handler;
pub mod processor;

pub use handler::EventHandler;
pub use processor::SimulatedProcessor;
