//! # KSI Crypto
//!
//! Hash primitives shared by every KSI crate.
//!
//! ## Components
//!
//! | Module | Contents |
//! |--------|----------|
//! | `algorithm` | Imprint algorithm registry (ids, digest lengths) |
//! | `data_hash` | `DataHash` imprint value object |
//! | `hashing` | SHA-2 / SHA-3 streaming hasher |
//! | `mac` | HMAC and constant-time MAC comparison |
//! | `provider` | `CryptoProvider` port, default and mock providers |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithm;
pub mod data_hash;
pub mod errors;
pub mod hashing;
pub mod mac;
pub mod provider;

// Re-exports
pub use algorithm::HashAlgorithm;
pub use data_hash::DataHash;
pub use errors::CryptoError;
pub use hashing::{hash, hash_many, DataHasher};
pub use mac::{hmac, mac_equals};
pub use provider::{
    CryptoProvider, DefaultCryptoProvider, MockCryptoProvider, SignatureScheme,
    OID_PKCS7_SIGNED_DATA, OID_SHA256_WITH_RSA,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
