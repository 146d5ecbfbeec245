//! # Crypto Provider Port
//!
//! The capability interface the rest of the library consumes for hashing,
//! HMAC and delegated PKI signature checks. A provider is handed to
//! factories and verification contexts explicitly; there is no process-wide
//! registration.

use crate::algorithm::HashAlgorithm;
use crate::data_hash::DataHash;
use crate::errors::CryptoError;
use crate::{hashing, mac};

/// OID of sha256WithRSAEncryption.
pub const OID_SHA256_WITH_RSA: &str = "1.2.840.113549.1.1.11";
/// OID of PKCS#7 signed data.
pub const OID_PKCS7_SIGNED_DATA: &str = "1.2.840.113549.1.7.2";

/// Signature scheme named by a signature-data OID.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureScheme {
    /// Raw RSA signature with the given digest.
    Rsa(HashAlgorithm),
    /// Detached PKCS#7 / CMS signature.
    Pkcs7,
}

impl SignatureScheme {
    /// Resolve a scheme from its OID string.
    pub fn from_oid(oid: &str) -> Result<Self, CryptoError> {
        match oid {
            OID_SHA256_WITH_RSA => Ok(SignatureScheme::Rsa(HashAlgorithm::Sha2_256)),
            OID_PKCS7_SIGNED_DATA => Ok(SignatureScheme::Pkcs7),
            other => Err(CryptoError::UnsupportedSignatureType(other.to_string())),
        }
    }
}

/// Crypto capabilities required by the KSI library.
pub trait CryptoProvider: Send + Sync {
    /// Hash `data` with `algorithm`.
    fn hash(&self, algorithm: HashAlgorithm, data: &[u8]) -> Result<DataHash, CryptoError>;

    /// Keyed hash of `data`.
    fn hmac(&self, algorithm: HashAlgorithm, key: &[u8], data: &[u8])
        -> Result<DataHash, CryptoError>;

    /// Verify a detached PKCS#7 signature over `signed_bytes`.
    ///
    /// `certificate` is the DER certificate expected to have produced it, or
    /// empty when the CMS structure carries its own signer certificate.
    fn verify_pkcs_signature(
        &self,
        signed_bytes: &[u8],
        signature: &[u8],
        certificate: &[u8],
    ) -> Result<(), CryptoError>;

    /// Verify a raw RSA signature over `signed_bytes` with the DER certificate's key.
    fn verify_rsa_signature(
        &self,
        signed_bytes: &[u8],
        signature: &[u8],
        certificate: &[u8],
        digest: HashAlgorithm,
    ) -> Result<(), CryptoError>;

    /// Dispatch on a signature-data OID.
    fn verify_signature(
        &self,
        oid: &str,
        signed_bytes: &[u8],
        signature: &[u8],
        certificate: &[u8],
    ) -> Result<(), CryptoError> {
        match SignatureScheme::from_oid(oid)? {
            SignatureScheme::Rsa(digest) => {
                self.verify_rsa_signature(signed_bytes, signature, certificate, digest)
            }
            SignatureScheme::Pkcs7 => self.verify_pkcs_signature(signed_bytes, signature, certificate),
        }
    }
}

/// RustCrypto-backed provider.
///
/// Hashing and HMAC are built in. Certificate-based checks are not, and
/// report [`CryptoError::VerificationUnsupported`]; plug in a platform
/// provider for key-based verification.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultCryptoProvider;

impl CryptoProvider for DefaultCryptoProvider {
    fn hash(&self, algorithm: HashAlgorithm, data: &[u8]) -> Result<DataHash, CryptoError> {
        hashing::hash(algorithm, data)
    }

    fn hmac(
        &self,
        algorithm: HashAlgorithm,
        key: &[u8],
        data: &[u8],
    ) -> Result<DataHash, CryptoError> {
        mac::hmac(algorithm, key, data)
    }

    fn verify_pkcs_signature(
        &self,
        _signed_bytes: &[u8],
        _signature: &[u8],
        _certificate: &[u8],
    ) -> Result<(), CryptoError> {
        Err(CryptoError::VerificationUnsupported("PKCS#7"))
    }

    fn verify_rsa_signature(
        &self,
        _signed_bytes: &[u8],
        _signature: &[u8],
        _certificate: &[u8],
        _digest: HashAlgorithm,
    ) -> Result<(), CryptoError> {
        Err(CryptoError::VerificationUnsupported("RSA"))
    }
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Provider that hashes for real and answers signature checks with a fixed verdict.
#[derive(Clone, Debug, Default)]
pub struct MockCryptoProvider {
    /// When true every signature check fails.
    pub reject_signatures: bool,
}

impl MockCryptoProvider {
    /// Provider accepting every signature.
    pub fn accepting() -> Self {
        Self { reject_signatures: false }
    }

    /// Provider rejecting every signature.
    pub fn rejecting() -> Self {
        Self { reject_signatures: true }
    }

    fn verdict(&self) -> Result<(), CryptoError> {
        if self.reject_signatures {
            Err(CryptoError::SignatureVerificationFailed("mock rejection".into()))
        } else {
            Ok(())
        }
    }
}

impl CryptoProvider for MockCryptoProvider {
    fn hash(&self, algorithm: HashAlgorithm, data: &[u8]) -> Result<DataHash, CryptoError> {
        hashing::hash(algorithm, data)
    }

    fn hmac(
        &self,
        algorithm: HashAlgorithm,
        key: &[u8],
        data: &[u8],
    ) -> Result<DataHash, CryptoError> {
        mac::hmac(algorithm, key, data)
    }

    fn verify_pkcs_signature(&self, _: &[u8], _: &[u8], _: &[u8]) -> Result<(), CryptoError> {
        self.verdict()
    }

    fn verify_rsa_signature(
        &self,
        _: &[u8],
        _: &[u8],
        _: &[u8],
        _: HashAlgorithm,
    ) -> Result<(), CryptoError> {
        self.verdict()
    }
}
