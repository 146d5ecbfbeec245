//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Algorithm id not present in the registry.
    #[error("Unknown hash algorithm id: 0x{0:02x}")]
    UnknownAlgorithm(u8),

    /// Algorithm is recognised but has no implementation in this provider.
    #[error("Hash algorithm not supported: {0}")]
    UnsupportedAlgorithm(&'static str),

    /// Digest length does not match the algorithm.
    #[error("Invalid digest length for {algorithm}: expected {expected}, got {actual}")]
    InvalidDigestLength {
        /// Algorithm name
        algorithm: &'static str,
        /// Expected digest length in bytes
        expected: usize,
        /// Actual digest length in bytes
        actual: usize,
    },

    /// Imprint without an algorithm byte.
    #[error("Empty imprint")]
    EmptyImprint,

    /// HMAC key rejected by the primitive.
    #[error("Invalid HMAC key")]
    InvalidKey,

    /// Signature scheme OID not understood.
    #[error("Unsupported signature type: {0}")]
    UnsupportedSignatureType(String),

    /// Signature verification is not available in this provider.
    #[error("Signature verification not supported: {0}")]
    VerificationUnsupported(&'static str),

    /// Signature verification failed
    #[error("Signature verification failed: {0}")]
    SignatureVerificationFailed(String),
}
