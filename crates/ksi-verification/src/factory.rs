//! # Signature Factory
//!
//! Builds signatures from bytes, streams and aggregation responses, and
//! runs a verifier on each one before handing it out. A signature that
//! parses but fails verification is returned inside
//! [`FactoryError::InvalidContent`] together with the result.
//!
//! ## Architecture
//!
//! ```text
//! bytes ──► Signature::from_* ──► SignatureVerifier ──► Ok(signature)
//!                                        │
//!                                        └── not Ok ──► InvalidContent
//! ```

use std::io::Read;

use ksi_crypto::CryptoProvider;
use ksi_signature::{
    AggregationAuthenticationRecord, AggregationHashChain, CalendarAuthenticationRecord,
    CalendarHashChain, PublicationRecord, Rfc3161Record, Signature,
};
use ksi_tlv::Tag;
use tracing::error;

use crate::domain::context::VerificationContext;
use crate::domain::errors::FactoryError;
use crate::domain::policies::Policy;
use crate::ports::outbound::SignatureVerifier;

/// Creates verified signatures.
pub struct SignatureFactory {
    verifier: Option<Box<dyn SignatureVerifier>>,
    crypto_provider: Option<Box<dyn CryptoProvider>>,
}

impl SignatureFactory {
    /// Factory running the internal verification policy.
    pub fn new() -> Self {
        Self::with_verifier(Policy::internal())
    }

    /// Factory running `verifier` after construction.
    pub fn with_verifier(verifier: impl SignatureVerifier + 'static) -> Self {
        Self {
            verifier: Some(Box::new(verifier)),
            crypto_provider: None,
        }
    }

    /// Factory that only checks structure.
    pub fn without_verification() -> Self {
        Self {
            verifier: None,
            crypto_provider: None,
        }
    }

    /// Provider handed to the verifier for PKI checks.
    pub fn with_crypto_provider(mut self, provider: impl CryptoProvider + 'static) -> Self {
        self.crypto_provider = Some(Box::new(provider));
        self
    }

    /// Parse and verify one encoded signature.
    pub fn from_bytes(&self, bytes: &[u8]) -> Result<Signature, FactoryError> {
        self.verified(Signature::from_bytes(bytes)?)
    }

    /// Read and verify a signature; the stream must hold exactly one element.
    pub fn from_reader<R: Read>(&self, reader: R) -> Result<Signature, FactoryError> {
        self.verified(Signature::from_reader(reader)?)
    }

    /// Assemble and verify a signature from aggregation response children.
    pub fn from_aggregation_response<'a, I>(&self, children: I) -> Result<Signature, FactoryError>
    where
        I: IntoIterator<Item = &'a Tag>,
    {
        self.verified(Signature::from_response_children(children)?)
    }

    /// Assemble a signature from parts; only structural checks run.
    pub fn from_parts(
        &self,
        aggregation_chains: Vec<AggregationHashChain>,
        calendar_chain: Option<CalendarHashChain>,
        calendar_authentication_record: Option<CalendarAuthenticationRecord>,
        publication_record: Option<PublicationRecord>,
        aggregation_authentication_record: Option<AggregationAuthenticationRecord>,
        rfc3161_record: Option<Rfc3161Record>,
    ) -> Result<Signature, FactoryError> {
        Ok(Signature::from_parts(
            aggregation_chains,
            calendar_chain,
            calendar_authentication_record,
            publication_record,
            aggregation_authentication_record,
            rfc3161_record,
        )?)
    }

    fn verified(&self, signature: Signature) -> Result<Signature, FactoryError> {
        let Some(verifier) = &self.verifier else {
            return Ok(signature);
        };

        let result = {
            let mut builder = VerificationContext::builder().signature(&signature);
            if let Some(provider) = &self.crypto_provider {
                builder = builder.crypto_provider(provider.as_ref());
            }
            verifier.verify(&builder.build()?)?
        };

        if result.is_ok() {
            return Ok(signature);
        }
        error!(%result, "Signature failed post-construction verification");
        Err(FactoryError::InvalidContent {
            signature: Box::new(signature),
            result: Box::new(result),
        })
    }
}

impl Default for SignatureFactory {
    fn default() -> Self {
        Self::new()
    }
}
