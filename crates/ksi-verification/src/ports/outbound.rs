//! # Outbound Ports (Driven Ports / SPI)
//!
//! Collaborators the verification engine consumes: the trust store, the
//! calendar extender and the verifier the factory runs after parsing.

use std::collections::HashMap;

use ksi_signature::{
    CalendarHashChain, CertificateRecord, PublicationRecord, PublicationsFile,
};
use parking_lot::Mutex;
use thiserror::Error;

use crate::domain::context::VerificationContext;
use crate::domain::entities::VerificationResult;
use crate::domain::errors::Result;

// =============================================================================
// Trust store
// =============================================================================

/// Published calendar roots and trusted certificates.
pub trait TrustStore: Send + Sync {
    /// True when the store lists the same publication.
    fn contains(&self, record: &PublicationRecord) -> bool;

    /// Earliest publication at or after `time`.
    fn nearest_publication_after(&self, time: u64) -> Option<&PublicationRecord>;

    /// Certificate with the given id.
    fn find_certificate_by_id(&self, certificate_id: &[u8]) -> Option<&CertificateRecord>;
}

impl TrustStore for PublicationsFile {
    fn contains(&self, record: &PublicationRecord) -> bool {
        PublicationsFile::contains(self, record)
    }

    fn nearest_publication_after(&self, time: u64) -> Option<&PublicationRecord> {
        PublicationsFile::nearest_publication_after(self, time)
    }

    fn find_certificate_by_id(&self, certificate_id: &[u8]) -> Option<&CertificateRecord> {
        PublicationsFile::find_certificate_by_id(self, certificate_id)
    }
}

// =============================================================================
// Calendar extender
// =============================================================================

/// Error from the extending collaborator.
#[derive(Debug, Error)]
pub enum ExtenderError {
    /// No extender available for this request.
    #[error("Extender unavailable: {0}")]
    Unavailable(String),

    /// The extender answered with an error.
    #[error("Extending failed: {0}")]
    Failed(String),
}

/// Source of calendar hash chains extended to a publication.
pub trait CalendarExtender: Send + Sync {
    /// Calendar chain from `aggregation_time` up to `publication_time`,
    /// or to the calendar head when `None`.
    fn extend(
        &self,
        aggregation_time: u64,
        publication_time: Option<u64>,
    ) -> std::result::Result<CalendarHashChain, ExtenderError>;
}

// =============================================================================
// Post-construction verifier
// =============================================================================

/// Check run by the signature factory on a freshly parsed signature.
pub trait SignatureVerifier: Send + Sync {
    /// Verify the context's signature.
    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Extender answering from a fixed table keyed by publication time.
#[derive(Default)]
pub struct MockExtender {
    /// Chains keyed by requested publication time (`None` = head).
    pub responses: HashMap<Option<u64>, CalendarHashChain>,
    /// Requests received, in order.
    pub requests: Mutex<Vec<(u64, Option<u64>)>>,
}

impl MockExtender {
    /// Extender that answers `publication_time` with `chain`.
    pub fn with_response(publication_time: Option<u64>, chain: CalendarHashChain) -> Self {
        let mut responses = HashMap::new();
        responses.insert(publication_time, chain);
        Self {
            responses,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of extend calls received.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl CalendarExtender for MockExtender {
    fn extend(
        &self,
        aggregation_time: u64,
        publication_time: Option<u64>,
    ) -> std::result::Result<CalendarHashChain, ExtenderError> {
        self.requests.lock().push((aggregation_time, publication_time));
        self.responses
            .get(&publication_time)
            .cloned()
            .ok_or_else(|| ExtenderError::Failed(format!("no response for {:?}", publication_time)))
    }
}

/// Verifier returning a fixed result.
#[derive(Clone, Debug)]
pub struct MockSignatureVerifier {
    /// Result returned for every signature.
    pub result: VerificationResult,
}

impl MockSignatureVerifier {
    /// Verifier that always passes.
    pub fn passing() -> Self {
        Self {
            result: VerificationResult::ok("MockSignatureVerifier"),
        }
    }

    /// Verifier that always returns `result`.
    pub fn returning(result: VerificationResult) -> Self {
        Self { result }
    }
}

impl SignatureVerifier for MockSignatureVerifier {
    fn verify(&self, _context: &VerificationContext<'_>) -> Result<VerificationResult> {
        Ok(self.result.clone())
    }
}
