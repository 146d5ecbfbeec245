//! # Verification Context
//!
//! Everything a rule may look at: the signature, optional document hash
//! and user publication, and the collaborators that supply trust. Extended
//! calendar chains are fetched once per publication time and reused for
//! the life of the context.

use std::collections::HashMap;

use ksi_crypto::{CryptoProvider, DataHash};
use ksi_signature::{CalendarHashChain, PublicationData, Signature};
use parking_lot::Mutex;
use tracing::debug;

use super::errors::{Result, VerificationError};
use crate::ports::outbound::{CalendarExtender, TrustStore};

/// Inputs for one verification run.
pub struct VerificationContext<'a> {
    signature: &'a Signature,
    document_hash: Option<DataHash>,
    user_publication: Option<PublicationData>,
    trust_store: Option<&'a dyn TrustStore>,
    extender: Option<&'a dyn CalendarExtender>,
    extending_allowed: bool,
    crypto_provider: Option<&'a dyn CryptoProvider>,
    extended_chains: Mutex<HashMap<Option<u64>, CalendarHashChain>>,
}

impl<'a> VerificationContext<'a> {
    /// Start building a context.
    pub fn builder() -> VerificationContextBuilder<'a> {
        VerificationContextBuilder::default()
    }

    /// Context holding only a signature.
    pub fn for_signature(signature: &'a Signature) -> Self {
        Self {
            signature,
            document_hash: None,
            user_publication: None,
            trust_store: None,
            extender: None,
            extending_allowed: false,
            crypto_provider: None,
            extended_chains: Mutex::new(HashMap::new()),
        }
    }

    /// Signature under verification.
    pub fn signature(&self) -> &'a Signature {
        self.signature
    }

    /// Hash of the signed document, if known.
    pub fn document_hash(&self) -> Option<&DataHash> {
        self.document_hash.as_ref()
    }

    /// Publication supplied by the caller.
    pub fn user_publication(&self) -> Option<&PublicationData> {
        self.user_publication.as_ref()
    }

    /// Trust store, required by publications-file and key-based rules.
    pub fn trust_store(&self) -> Result<&'a dyn TrustStore> {
        self.trust_store
            .ok_or(VerificationError::MissingContext("publications file"))
    }

    /// Whether rules may contact the extender.
    pub fn is_extending_allowed(&self) -> bool {
        self.extending_allowed
    }

    /// Crypto provider for PKI checks.
    pub fn crypto_provider(&self) -> Result<&'a dyn CryptoProvider> {
        self.crypto_provider
            .ok_or(VerificationError::MissingContext("crypto provider"))
    }

    /// Signature's calendar chain extended to `publication_time` (head when `None`).
    pub fn extended_calendar_chain(&self, publication_time: Option<u64>) -> Result<CalendarHashChain> {
        if let Some(chain) = self.extended_chains.lock().get(&publication_time) {
            return Ok(chain.clone());
        }

        let extender = self
            .extender
            .ok_or(VerificationError::MissingContext("extender"))?;
        let aggregation_time = self.signature.aggregation_time();
        debug!(aggregation_time, ?publication_time, "Requesting extended calendar chain");
        let chain = extender.extend(aggregation_time, publication_time)?;

        self.extended_chains
            .lock()
            .insert(publication_time, chain.clone());
        Ok(chain)
    }
}

/// Builder for [`VerificationContext`].
#[derive(Default)]
pub struct VerificationContextBuilder<'a> {
    signature: Option<&'a Signature>,
    document_hash: Option<DataHash>,
    user_publication: Option<PublicationData>,
    trust_store: Option<&'a dyn TrustStore>,
    extender: Option<&'a dyn CalendarExtender>,
    extending_allowed: bool,
    crypto_provider: Option<&'a dyn CryptoProvider>,
}

impl<'a> VerificationContextBuilder<'a> {
    /// Signature to verify.
    pub fn signature(mut self, signature: &'a Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Document hash to match against the signature.
    pub fn document_hash(mut self, hash: DataHash) -> Self {
        self.document_hash = Some(hash);
        self
    }

    /// Publication the caller trusts.
    pub fn user_publication(mut self, publication: PublicationData) -> Self {
        self.user_publication = Some(publication);
        self
    }

    /// Trust store (normally a publications file).
    pub fn trust_store(mut self, store: &'a dyn TrustStore) -> Self {
        self.trust_store = Some(store);
        self
    }

    /// Extender for calendar-based and publication-based checks.
    pub fn extender(mut self, extender: &'a dyn CalendarExtender) -> Self {
        self.extender = Some(extender);
        self
    }

    /// Allow rules to contact the extender.
    pub fn extending_allowed(mut self, allowed: bool) -> Self {
        self.extending_allowed = allowed;
        self
    }

    /// Crypto provider for PKI checks.
    pub fn crypto_provider(mut self, provider: &'a dyn CryptoProvider) -> Self {
        self.crypto_provider = Some(provider);
        self
    }

    /// Finish; fails without a signature.
    pub fn build(self) -> Result<VerificationContext<'a>> {
        let signature = self
            .signature
            .ok_or(VerificationError::MissingContext("signature"))?;
        Ok(VerificationContext {
            signature,
            document_hash: self.document_hash,
            user_publication: self.user_publication,
            trust_store: self.trust_store,
            extender: self.extender,
            extending_allowed: self.extending_allowed,
            crypto_provider: self.crypto_provider,
            extended_chains: Mutex::new(HashMap::new()),
        })
    }
}
