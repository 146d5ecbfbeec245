//! # Hash Algorithm Registry
//!
//! Wire ids and digest lengths of every algorithm a KSI imprint may carry.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::CryptoError;

/// Hash algorithms known to the KSI imprint format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// SHA-1 (legacy, recognised only)
    Sha1,
    /// SHA2-256
    Sha2_256,
    /// RIPEMD-160 (recognised only)
    Ripemd160,
    /// SHA2-384
    Sha2_384,
    /// SHA2-512
    Sha2_512,
    /// SHA3-224
    Sha3_224,
    /// SHA3-256
    Sha3_256,
    /// SHA3-384
    Sha3_384,
    /// SHA3-512
    Sha3_512,
    /// SM3 (recognised only)
    Sm3,
}

impl HashAlgorithm {
    /// All registered algorithms in id order.
    pub const ALL: [HashAlgorithm; 10] = [
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha2_256,
        HashAlgorithm::Ripemd160,
        HashAlgorithm::Sha2_384,
        HashAlgorithm::Sha2_512,
        HashAlgorithm::Sha3_224,
        HashAlgorithm::Sha3_256,
        HashAlgorithm::Sha3_384,
        HashAlgorithm::Sha3_512,
        HashAlgorithm::Sm3,
    ];

    /// Look up an algorithm by its imprint id byte.
    pub fn from_id(id: u8) -> Result<Self, CryptoError> {
        Self::ALL
            .iter()
            .copied()
            .find(|alg| alg.id() == id)
            .ok_or(CryptoError::UnknownAlgorithm(id))
    }

    /// Imprint id byte.
    pub fn id(self) -> u8 {
        match self {
            HashAlgorithm::Sha1 => 0x00,
            HashAlgorithm::Sha2_256 => 0x01,
            HashAlgorithm::Ripemd160 => 0x02,
            HashAlgorithm::Sha2_384 => 0x04,
            HashAlgorithm::Sha2_512 => 0x05,
            HashAlgorithm::Sha3_224 => 0x07,
            HashAlgorithm::Sha3_256 => 0x08,
            HashAlgorithm::Sha3_384 => 0x09,
            HashAlgorithm::Sha3_512 => 0x0A,
            HashAlgorithm::Sm3 => 0x0B,
        }
    }

    /// Digest length in bytes.
    pub fn digest_len(self) -> usize {
        match self {
            HashAlgorithm::Sha1 | HashAlgorithm::Ripemd160 => 20,
            HashAlgorithm::Sha3_224 => 28,
            HashAlgorithm::Sha2_256 | HashAlgorithm::Sha3_256 | HashAlgorithm::Sm3 => 32,
            HashAlgorithm::Sha2_384 | HashAlgorithm::Sha3_384 => 48,
            HashAlgorithm::Sha2_512 | HashAlgorithm::Sha3_512 => 64,
        }
    }

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "SHA1",
            HashAlgorithm::Sha2_256 => "SHA-256",
            HashAlgorithm::Ripemd160 => "RIPEMD160",
            HashAlgorithm::Sha2_384 => "SHA-384",
            HashAlgorithm::Sha2_512 => "SHA-512",
            HashAlgorithm::Sha3_224 => "SHA3-224",
            HashAlgorithm::Sha3_256 => "SHA3-256",
            HashAlgorithm::Sha3_384 => "SHA3-384",
            HashAlgorithm::Sha3_512 => "SHA3-512",
            HashAlgorithm::Sm3 => "SM3",
        }
    }

    /// Whether the built-in hasher can compute this algorithm.
    pub fn is_implemented(self) -> bool {
        !matches!(
            self,
            HashAlgorithm::Sha1 | HashAlgorithm::Ripemd160 | HashAlgorithm::Sm3
        )
    }
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        HashAlgorithm::Sha2_256
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_lookup_roundtrip() {
        for alg in HashAlgorithm::ALL {
            assert_eq!(HashAlgorithm::from_id(alg.id()).unwrap(), alg);
        }
    }

    #[test]
    fn test_unassigned_ids_rejected() {
        assert_eq!(
            HashAlgorithm::from_id(0x03),
            Err(CryptoError::UnknownAlgorithm(0x03))
        );
        assert!(HashAlgorithm::from_id(0x06).is_err());
        assert!(HashAlgorithm::from_id(0xFF).is_err());
    }

    #[test]
    fn test_digest_lengths() {
        assert_eq!(HashAlgorithm::Sha2_256.digest_len(), 32);
        assert_eq!(HashAlgorithm::Sha3_224.digest_len(), 28);
        assert_eq!(HashAlgorithm::Sha2_512.digest_len(), 64);
        assert_eq!(HashAlgorithm::Ripemd160.digest_len(), 20);
    }

    #[test]
    fn test_default_is_sha256() {
        assert_eq!(HashAlgorithm::default(), HashAlgorithm::Sha2_256);
    }
}
