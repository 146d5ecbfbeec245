//! # TLV Errors
//!
//! Structural and format errors raised while reading, writing or
//! interpreting tags.

use ksi_crypto::CryptoError;
use thiserror::Error;

/// TLV codec and tag model errors.
#[derive(Debug, Error)]
pub enum TlvError {
    /// Stream ended inside a tag.
    #[error("Truncated TLV: stream ended while reading {context}")]
    Truncated {
        /// Part of the tag being read
        context: &'static str,
    },

    /// Bytes left after the expected single tag.
    #[error("Trailing data after TLV: {0} bytes")]
    TrailingBytes(usize),

    /// Type outside the 13-bit range.
    #[error("TLV type out of range: 0x{0:x}")]
    TypeOutOfRange(u32),

    /// Value longer than the length field can carry.
    #[error("TLV value too long: {len} bytes (max {max})")]
    ValueTooLong {
        /// Value length
        len: usize,
        /// Ceiling for the chosen length form
        max: usize,
    },

    /// String value without terminating NUL.
    #[error("String TLV 0x{0:x} must end with a NUL byte")]
    MissingNul(u32),

    /// String value is not UTF-8.
    #[error("String TLV 0x{0:x} is not valid UTF-8")]
    InvalidUtf8(u32),

    /// Integer value wider than 64 bits.
    #[error("Integer TLV 0x{tag_type:x} too long: {len} bytes")]
    IntegerTooLong {
        /// Tag type
        tag_type: u32,
        /// Value length
        len: usize,
    },

    /// Integer encoded with a leading zero byte.
    #[error("Integer TLV 0x{0:x} has a superfluous leading zero byte")]
    NonMinimalInteger(u32),

    /// Imprint value rejected.
    #[error("Invalid imprint in TLV 0x{tag_type:x}: {source}")]
    InvalidImprint {
        /// Tag type
        tag_type: u32,
        /// Underlying imprint error
        #[source]
        source: CryptoError,
    },

    /// Tag type is not the one the caller expected.
    #[error("Invalid TLV type: expected 0x{expected:x}, got 0x{actual:x}")]
    TypeMismatch {
        /// Expected type
        expected: u32,
        /// Actual type
        actual: u32,
    },

    /// Value kind cannot be read as requested.
    #[error("TLV 0x{tag_type:x} cannot be read as {expected}")]
    WrongKind {
        /// Tag type
        tag_type: u32,
        /// Requested kind
        expected: &'static str,
    },

    /// Unknown child with the non-critical flag cleared.
    #[error("Unknown critical tag 0x{tag_type:x} in TLV 0x{parent:x}")]
    UnknownCriticalTag {
        /// Enclosing composite type
        parent: u32,
        /// Offending child type
        tag_type: u32,
    },

    /// Child count violates the composite's cardinality rule.
    #[error("Invalid child count in TLV 0x{parent:x}: 0x{child:x} must appear {rule}, found {count}")]
    Cardinality {
        /// Enclosing composite type
        parent: u32,
        /// Child type
        child: u32,
        /// Human readable rule ("exactly once", ...)
        rule: &'static str,
        /// Observed count
        count: usize,
    },

    /// Structural rule specific to one composite.
    #[error("Invalid TLV 0x{tag_type:x}: {reason}")]
    InvalidStructure {
        /// Composite type
        tag_type: u32,
        /// Description
        reason: String,
    },

    /// Child index out of bounds.
    #[error("Child index {index} out of bounds ({len} children)")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Child count
        len: usize,
    },

    /// Underlying stream failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for TLV operations.
pub type Result<T> = std::result::Result<T, TlvError>;
