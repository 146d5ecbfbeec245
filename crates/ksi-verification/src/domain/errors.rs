//! # Verification Errors
//!
//! Errors raised when a rule cannot be evaluated at all. A signature that
//! fails a check is not an error: it yields a `Fail` result.

use ksi_signature::{Signature, SignatureError};
use thiserror::Error;

use super::entities::VerificationResult;
use crate::ports::outbound::ExtenderError;

/// Verification could not run.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// Context lacks something the rule needs.
    #[error("Invalid verification context: missing {0}")]
    MissingContext(&'static str),

    /// Signature data could not be evaluated (hashing, chain folding).
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// Extender collaborator failed.
    #[error(transparent)]
    Extender(#[from] ExtenderError),
}

/// Result alias for verification.
pub type Result<T> = std::result::Result<T, VerificationError>;

/// Signature factory failure.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Bytes or parts do not form a signature.
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// Post-construction verification could not run.
    #[error(transparent)]
    Verification(#[from] VerificationError),

    /// Signature parsed but failed post-construction verification.
    #[error("Invalid KSI signature content: {result}")]
    InvalidContent {
        /// The parsed signature
        signature: Box<Signature>,
        /// Why it was rejected
        result: Box<VerificationResult>,
    },
}
