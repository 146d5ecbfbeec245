//! # KSI Client Test Suite
//!
//! Cross-crate tests run against a real aggregation response captured
//! from a KSI gateway (`fixtures/aggregation_response.hex`).
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Vector loading, trust anchors, canned PDUs
//! │
//! ├── integration/      # End-to-end flows across crates
//! │   ├── signature_flows.rs
//! │   ├── verification_flows.rs
//! │   └── service_flows.rs
//! │
//! └── exploits/         # Tampered signatures and responses
//!     └── tampering.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ksi-tests
//!
//! # By category
//! cargo test -p ksi-tests integration::
//! cargo test -p ksi-tests exploits::
//!
//! # Benchmarks
//! cargo bench -p ksi-tests
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod exploits;
pub mod fixtures;
pub mod integration;
