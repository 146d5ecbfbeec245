//! HMAC over the SHA-2 family, returned as imprint-shaped [`DataHash`] values.

use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;

use crate::algorithm::HashAlgorithm;
use crate::data_hash::DataHash;
use crate::errors::CryptoError;

fn compute<M: Mac + hmac::digest::KeyInit>(key: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut mac = <M as Mac>::new_from_slice(key).map_err(|_| CryptoError::InvalidKey)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Compute HMAC of `data` under `key`.
pub fn hmac(algorithm: HashAlgorithm, key: &[u8], data: &[u8]) -> Result<DataHash, CryptoError> {
    let digest = match algorithm {
        HashAlgorithm::Sha2_256 => compute::<Hmac<Sha256>>(key, data)?,
        HashAlgorithm::Sha2_384 => compute::<Hmac<Sha384>>(key, data)?,
        HashAlgorithm::Sha2_512 => compute::<Hmac<Sha512>>(key, data)?,
        other => return Err(CryptoError::UnsupportedAlgorithm(other.name())),
    };
    DataHash::new(algorithm, digest)
}

/// Constant-time comparison of two MAC values.
pub fn mac_equals(expected: &DataHash, actual: &DataHash) -> bool {
    expected.algorithm() == actual.algorithm()
        && bool::from(expected.digest().ct_eq(actual.digest()))
}
