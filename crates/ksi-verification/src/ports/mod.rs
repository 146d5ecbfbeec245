//! # Ports Layer
//!
//! Outbound ports consumed by the verification engine.

pub mod outbound;

pub use outbound::*;
