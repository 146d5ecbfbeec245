//! # Domain Layer
//!
//! Verification results, the context rules read from, the rules and the
//! policies that chain them.

pub mod context;
pub mod entities;
pub mod errors;
pub mod policies;
pub mod rules;

pub use context::{VerificationContext, VerificationContextBuilder};
pub use entities::{VerificationErrorCode, VerificationOutcome, VerificationResult};
pub use errors::{FactoryError, Result, VerificationError};
pub use policies::{Policy, RuleNode};
pub use rules::Rule;
