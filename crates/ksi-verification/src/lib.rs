//! # KSI Verification
//!
//! Rule-based verification of KSI signatures and the factory that
//! verifies signatures as they are created.
//!
//! ## Architecture
//!
//! This crate follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): results, context, rules and policies
//! - **Ports Layer** (`ports/`): trust store, calendar extender, signature verifier
//! - **Factory** (`factory.rs`): parse, then verify with a pluggable policy
//!
//! ## Module Structure
//!
//! ```text
//! ksi-verification/
//! ├── domain/
//! │   ├── entities.rs      # Outcome, error codes, VerificationResult
//! │   ├── context.rs       # VerificationContext and its builder
//! │   ├── rules/           # Internal, key, publication and calendar rules
//! │   ├── policies.rs      # Rule trees and the standard policies
//! │   └── errors.rs
//! ├── ports/
//! │   └── outbound.rs      # TrustStore, CalendarExtender, SignatureVerifier
//! └── factory.rs           # SignatureFactory
//! ```
//!
//! ## Policies
//!
//! | Policy | Trust anchor |
//! |--------|--------------|
//! | `internal` | none, consistency only |
//! | `key_based` | certificate in the trust store |
//! | `calendar_based` | extender |
//! | `publications_file_based` | publications file (+ extender) |
//! | `user_publication_based` | caller's publication (+ extender) |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod factory;
pub mod ports;

#[cfg(test)]
mod test_support;

// Re-exports
pub use domain::{
    FactoryError, Policy, Result, Rule, RuleNode, VerificationContext, VerificationContextBuilder,
    VerificationError, VerificationErrorCode, VerificationOutcome, VerificationResult,
};
pub use factory::SignatureFactory;
pub use ports::outbound::{
    CalendarExtender, ExtenderError, MockExtender, MockSignatureVerifier, SignatureVerifier,
    TrustStore,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
