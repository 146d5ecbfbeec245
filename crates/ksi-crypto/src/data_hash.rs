//! Data hash (imprint) value object.

use std::fmt;

use crate::algorithm::HashAlgorithm;
use crate::errors::CryptoError;

/// A digest tagged with the algorithm that produced it.
///
/// The imprint form is the algorithm id byte followed by the digest.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DataHash {
    algorithm: HashAlgorithm,
    digest: Vec<u8>,
}

impl DataHash {
    /// Create from algorithm and digest, validating the digest length.
    pub fn new(algorithm: HashAlgorithm, digest: Vec<u8>) -> Result<Self, CryptoError> {
        if digest.len() != algorithm.digest_len() {
            return Err(CryptoError::InvalidDigestLength {
                algorithm: algorithm.name(),
                expected: algorithm.digest_len(),
                actual: digest.len(),
            });
        }
        Ok(Self { algorithm, digest })
    }

    // Digest length is guaranteed by the hasher.
    pub(crate) fn from_parts(algorithm: HashAlgorithm, digest: Vec<u8>) -> Self {
        debug_assert_eq!(digest.len(), algorithm.digest_len());
        Self { algorithm, digest }
    }

    /// Parse an imprint (`[id] || digest`).
    pub fn from_imprint(imprint: &[u8]) -> Result<Self, CryptoError> {
        let (&id, digest) = imprint.split_first().ok_or(CryptoError::EmptyImprint)?;
        Self::new(HashAlgorithm::from_id(id)?, digest.to_vec())
    }

    /// Algorithm.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Raw digest bytes.
    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    /// Imprint bytes.
    pub fn imprint(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.digest.len());
        out.push(self.algorithm.id());
        out.extend_from_slice(&self.digest);
        out
    }
}

impl fmt::Display for DataHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.imprint()))
    }
}

impl fmt::Debug for DataHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataHash({}:{})", self.algorithm, hex::encode(&self.digest))
    }
}
