//! # KSI Signature
//!
//! The keyless signature data model: aggregation and calendar hash chains,
//! authentication and publication records, and the publications file used
//! as a trust anchor.
//!
//! ## Module Structure
//!
//! ```text
//! ksi-signature/
//! ├── domain/
//! │   ├── aggregation_chain.rs # Links, metadata, output hash folding
//! │   ├── calendar_chain.rs    # Calendar links, registration time
//! │   ├── publication.rs       # Publication data and records
//! │   ├── auth_records.rs      # PKI authentication records
//! │   ├── rfc3161.rs           # Legacy timestamp record
//! │   ├── signature.rs         # Signature composition, extend, splice
//! │   ├── publications_file.rs # KSIPUBLF trust anchor
//! │   ├── constants.rs         # TLV type numbers
//! │   └── errors.rs
//! └── algorithms/
//!     └── chain_math.rs        # Step hashes, levels, registration time
//! ```
//!
//! ## Hash chain folding
//!
//! ```text
//! document hash ──► chain[0] ──► chain[1] ──► ... ──► aggregation root
//!                                                        │
//!                                   calendar chain ◄─────┘
//!                                        │
//!                                        ▼
//!                               publication / calendar root
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod domain;

// Re-exports
pub use domain::{
    AggregationAuthenticationRecord, AggregationHashChain, AggregationLink,
    CalendarAuthenticationRecord, CalendarHashChain, CalendarLink, CertificateRecord, ChainResult,
    LinkDirection, Metadata, PublicationData, PublicationRecord, PublicationsFile,
    PublicationsFileHeader, Result, Rfc3161Record, SiblingData, Signature, SignatureData,
    SignatureError,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
