//! # Hashing
//!
//! Streaming hasher over the SHA-2 and SHA-3 families producing [`DataHash`] values.

use sha2::{Digest, Sha256, Sha384, Sha512};
use sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512};

use crate::algorithm::HashAlgorithm;
use crate::data_hash::DataHash;
use crate::errors::CryptoError;

enum Inner {
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
    Sha3_224(Sha3_224),
    Sha3_256(Sha3_256),
    Sha3_384(Sha3_384),
    Sha3_512(Sha3_512),
}

/// Stateful hasher for one algorithm.
pub struct DataHasher {
    algorithm: HashAlgorithm,
    inner: Inner,
}

impl DataHasher {
    /// Create new hasher; fails for algorithms without an implementation.
    pub fn new(algorithm: HashAlgorithm) -> Result<Self, CryptoError> {
        let inner = match algorithm {
            HashAlgorithm::Sha2_256 => Inner::Sha256(Sha256::new()),
            HashAlgorithm::Sha2_384 => Inner::Sha384(Sha384::new()),
            HashAlgorithm::Sha2_512 => Inner::Sha512(Sha512::new()),
            HashAlgorithm::Sha3_224 => Inner::Sha3_224(Sha3_224::new()),
            HashAlgorithm::Sha3_256 => Inner::Sha3_256(Sha3_256::new()),
            HashAlgorithm::Sha3_384 => Inner::Sha3_384(Sha3_384::new()),
            HashAlgorithm::Sha3_512 => Inner::Sha3_512(Sha3_512::new()),
            HashAlgorithm::Sha1 | HashAlgorithm::Ripemd160 | HashAlgorithm::Sm3 => {
                return Err(CryptoError::UnsupportedAlgorithm(algorithm.name()))
            }
        };
        Ok(Self { algorithm, inner })
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        match &mut self.inner {
            Inner::Sha256(h) => h.update(data),
            Inner::Sha384(h) => h.update(data),
            Inner::Sha512(h) => h.update(data),
            Inner::Sha3_224(h) => h.update(data),
            Inner::Sha3_256(h) => h.update(data),
            Inner::Sha3_384(h) => h.update(data),
            Inner::Sha3_512(h) => h.update(data),
        }
        self
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> DataHash {
        let digest = match self.inner {
            Inner::Sha256(h) => h.finalize().to_vec(),
            Inner::Sha384(h) => h.finalize().to_vec(),
            Inner::Sha512(h) => h.finalize().to_vec(),
            Inner::Sha3_224(h) => h.finalize().to_vec(),
            Inner::Sha3_256(h) => h.finalize().to_vec(),
            Inner::Sha3_384(h) => h.finalize().to_vec(),
            Inner::Sha3_512(h) => h.finalize().to_vec(),
        };
        DataHash::from_parts(self.algorithm, digest)
    }
}

/// Hash data (one-shot).
pub fn hash(algorithm: HashAlgorithm, data: &[u8]) -> Result<DataHash, CryptoError> {
    let mut hasher = DataHasher::new(algorithm)?;
    hasher.update(data);
    Ok(hasher.finalize())
}

/// Hash multiple inputs.
pub fn hash_many(algorithm: HashAlgorithm, inputs: &[&[u8]]) -> Result<DataHash, CryptoError> {
    let mut hasher = DataHasher::new(algorithm)?;
    for input in inputs {
        hasher.update(input);
    }
    Ok(hasher.finalize())
}
