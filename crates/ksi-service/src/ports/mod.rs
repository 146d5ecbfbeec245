//! # Ports
//!
//! The transport the service drives.

pub mod outbound;

pub use outbound::*;
