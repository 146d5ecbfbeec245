//! # Integration Flows
//!
//! Signing, verification and extension exercised across crate boundaries.

pub mod service_flows;
pub mod signature_flows;
pub mod verification_flows;
