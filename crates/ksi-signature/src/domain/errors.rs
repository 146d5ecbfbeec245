//! # Domain Errors
//!
//! Error types for the hash chain and signature model.

use ksi_crypto::{CryptoError, DataHash};
use ksi_tlv::TlvError;
use thiserror::Error;

/// Signature model errors.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// Malformed or structurally invalid TLV.
    #[error(transparent)]
    Tlv(#[from] TlvError),

    /// Hashing failed (unknown or unimplemented algorithm).
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Aggregation link must carry exactly one sibling form.
    #[error("Aggregation link must contain exactly one of sibling hash, legacy id or metadata, found {0}")]
    InvalidLinkSibling(usize),

    /// Hash chain level exceeded 255.
    #[error("Hash chain level overflow: {0}")]
    LevelOverflow(u64),

    /// Calendar chain shape does not fit its publication time.
    #[error("Calendar hash chain shape inconsistent with publication time {publication_time}: {reason}")]
    InvalidCalendarShape {
        /// Publication time of the chain
        publication_time: u64,
        /// What went wrong
        reason: &'static str,
    },

    /// Signature composition rule violated.
    #[error("Invalid KSI signature: {0}")]
    InvalidSignature(String),

    /// Spliced chain does not lead to the signature's input hash.
    #[error("Aggregation hash chain output hash {actual} does not match signature input hash {expected}")]
    ChainOutputMismatch {
        /// Signature input hash
        expected: DataHash,
        /// Output of the new chain
        actual: DataHash,
    },

    /// Spliced chain is taller than the first link's level correction allows.
    #[error("Aggregation hash chain with output level {output_level} cannot be added as lowest level chain (level correction {level_correction})")]
    CannotAddLowestLevelChain {
        /// Output level of the new chain
        output_level: u64,
        /// Level correction available on the base chain
        level_correction: u64,
    },

    /// Publications file could not be read.
    #[error("Invalid publications file: {0}")]
    InvalidPublicationsFile(String),
}

/// Result alias for the signature model.
pub type Result<T> = std::result::Result<T, SignatureError>;
