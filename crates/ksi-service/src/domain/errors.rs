//! # Service Errors
//!
//! Protocol failures are kept apart so a caller can tell a gateway
//! refusal from a tampered or mismatched response.

use ksi_crypto::CryptoError;
use ksi_signature::SignatureError;
use ksi_tlv::TlvError;
use ksi_verification::FactoryError;
use thiserror::Error;

/// KSI service errors.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Response bytes are not a well-formed PDU.
    #[error(transparent)]
    Tlv(#[from] TlvError),

    /// Signature or calendar chain in the response is malformed.
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// MAC computation failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Signature from the response did not pass verification.
    #[error(transparent)]
    Factory(#[from] FactoryError),

    /// Gateway reported an error status.
    #[error("Server error 0x{status:x}: {message}")]
    Server {
        /// Status code
        status: u64,
        /// Error message sent with the status
        message: String,
    },

    /// Response MAC does not match the shared key.
    #[error("Invalid MAC in response PDU")]
    MacMismatch,

    /// Response PDU belongs to the other protocol generation.
    #[error("PDU version mismatch: expected type 0x{expected:x}, got 0x{actual:x}")]
    VersionMismatch {
        /// PDU type for the configured version
        expected: u32,
        /// PDU type received
        actual: u32,
    },

    /// Response answers a different request.
    #[error("Request id mismatch: sent {expected}, got {actual}")]
    RequestIdMismatch {
        /// Id sent
        expected: u64,
        /// Id received
        actual: u64,
    },

    /// PDU is well formed but lacks a required part.
    #[error("Invalid PDU: {0}")]
    InvalidPdu(String),

    /// Transport could not deliver the request.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result alias for the service layer.
pub type Result<T> = std::result::Result<T, ServiceError>;
