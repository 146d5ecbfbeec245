//! # KSI Service
//!
//! Signing, extending and publications file retrieval over a
//! [`KsiTransport`].
//!
//! ## Request Flow
//!
//! ```text
//! sign(hash) ──► AggregationRequest ──► Pdu + MAC ──► transport
//!                                                        │
//! Signature ◄── SignatureFactory ◄── checks ◄── Pdu::from_bytes
//! ```
//!
//! Every response is checked in the same order: error payload, MAC,
//! status, request id. Only then is its content used.

use std::sync::atomic::{AtomicU64, Ordering};

use ksi_crypto::DataHash;
use ksi_signature::{CalendarHashChain, PublicationsFile, Signature, SignatureError};
use ksi_verification::{CalendarExtender, ExtenderError, SignatureFactory};
use rand::Rng;
use tracing::{debug, error, warn};

use crate::config::ServiceConfig;
use crate::domain::errors::{Result, ServiceError};
use crate::domain::payloads::{AggregationRequestPayload, ExtendRequestPayload, PduHeader};
use crate::domain::pdu::{Payload, Pdu, PduKind};
use crate::ports::outbound::KsiTransport;

/// Highest aggregation tree level a client may claim for its hash.
pub const MAX_REQUEST_LEVEL: u64 = 0xFF;

fn random_request_id() -> u64 {
    rand::thread_rng().gen_range(1..=i64::MAX as u64)
}

fn check_response(status: u64, message: Option<&str>, expected_id: u64, actual_id: u64) -> Result<()> {
    if status != 0 {
        warn!(status, message, "KSI gateway returned an error status");
        return Err(ServiceError::Server {
            status,
            message: message.unwrap_or_default().to_string(),
        });
    }
    if expected_id != actual_id {
        return Err(ServiceError::RequestIdMismatch {
            expected: expected_id,
            actual: actual_id,
        });
    }
    Ok(())
}

/// Client for the KSI aggregator, extender and publications file.
pub struct KsiService {
    config: ServiceConfig,
    transport: Box<dyn KsiTransport>,
    factory: SignatureFactory,
    request_ids: Box<dyn Fn() -> u64 + Send + Sync>,
    message_id: AtomicU64,
}

impl KsiService {
    /// Service speaking `config` over `transport`, verifying new signatures
    /// with the internal policy.
    pub fn new(config: ServiceConfig, transport: impl KsiTransport + 'static) -> Self {
        Self {
            config,
            transport: Box::new(transport),
            factory: SignatureFactory::new(),
            request_ids: Box::new(random_request_id),
            message_id: AtomicU64::new(0),
        }
    }

    /// Use `factory` to build signatures from aggregation responses.
    pub fn with_factory(mut self, factory: SignatureFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Replace the random request id source.
    pub fn with_request_ids(mut self, source: impl Fn() -> u64 + Send + Sync + 'static) -> Self {
        self.request_ids = Box::new(source);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Sign a document hash.
    pub fn sign(&self, hash: &DataHash) -> Result<Signature> {
        self.sign_with_level(hash, 0)
    }

    /// Sign a hash that sits at `level` of the caller's own aggregation tree.
    pub fn sign_with_level(&self, hash: &DataHash, level: u64) -> Result<Signature> {
        if level > MAX_REQUEST_LEVEL {
            return Err(SignatureError::LevelOverflow(level).into());
        }

        let request_id = (self.request_ids)();
        let types = PduKind::Aggregation.types(self.config.pdu_version);
        let payload = AggregationRequestPayload::new(
            types.request_payload,
            request_id,
            hash.clone(),
            Some(level),
        );
        debug!(request_id, level, "Sending aggregation request");

        let response = self.exchange(PduKind::Aggregation, Payload::AggregationRequest(payload))?;
        let payload = response.aggregation_response().ok_or_else(|| {
            ServiceError::InvalidPdu("aggregation response carries no response payload".to_string())
        })?;
        check_response(
            payload.status(),
            payload.error_message(),
            request_id,
            payload.request_id(),
        )?;

        let signature = self.factory.from_aggregation_response(&payload.children()?)?;
        if signature.input_hash() != hash {
            return Err(ServiceError::InvalidPdu(format!(
                "signature input hash {} does not match requested hash {}",
                signature.input_hash(),
                hash
            )));
        }
        Ok(signature)
    }

    /// Calendar chain from `aggregation_time` up to `publication_time`, or
    /// up to the calendar head when `None`.
    pub fn extend(&self, aggregation_time: u64, publication_time: Option<u64>) -> Result<CalendarHashChain> {
        let request_id = (self.request_ids)();
        let types = PduKind::Extension.types(self.config.pdu_version);
        let payload = ExtendRequestPayload::new(
            types.request_payload,
            request_id,
            aggregation_time,
            publication_time,
        );
        debug!(request_id, aggregation_time, ?publication_time, "Sending extend request");

        let response = self.exchange(PduKind::Extension, Payload::ExtendRequest(payload))?;
        let payload = response.extend_response().ok_or_else(|| {
            ServiceError::InvalidPdu("extend response carries no response payload".to_string())
        })?;
        check_response(
            payload.status(),
            payload.error_message(),
            request_id,
            payload.request_id(),
        )?;

        payload
            .calendar_chain()
            .cloned()
            .ok_or_else(|| ServiceError::InvalidPdu("no calendar hash chain in extend response".to_string()))
    }

    /// Download and parse the publications file. Its CMS signature is
    /// not checked here; see [`PublicationsFile::verify`].
    pub fn get_publications_file(&self) -> Result<PublicationsFile> {
        let bytes = self.transport.get_publications_file()?;
        Ok(PublicationsFile::parse(&bytes)?)
    }

    // -------------------------------------------------------------------------
    // Exchange
    // -------------------------------------------------------------------------

    fn exchange(&self, kind: PduKind, payload: Payload) -> Result<Pdu> {
        let version = self.config.pdu_version;
        let header = PduHeader::new(
            self.config.login_id.clone(),
            self.config.instance_id,
            Some(self.message_id.fetch_add(1, Ordering::Relaxed) + 1),
        );
        let request = Pdu::request(
            kind,
            version,
            header,
            payload,
            self.config.mac_algorithm,
            &self.config.login_key,
        )?;

        let bytes = request.encode()?;
        let response_bytes = match kind {
            PduKind::Aggregation => self.transport.send_aggregation(&bytes)?,
            PduKind::Extension => self.transport.send_extension(&bytes)?,
        };
        let response = Pdu::from_bytes(&response_bytes, kind, version)?;

        if let Some(error_payload) = response.error_payload() {
            warn!(
                status = error_payload.status(),
                message = error_payload.error_message(),
                "KSI gateway returned an error payload"
            );
            return Err(ServiceError::Server {
                status: error_payload.status(),
                message: error_payload.error_message().unwrap_or_default().to_string(),
            });
        }
        if !response.verify_mac(&self.config.login_key)? {
            error!(?kind, "Response MAC does not match the login key");
            return Err(ServiceError::MacMismatch);
        }
        Ok(response)
    }
}

impl CalendarExtender for KsiService {
    fn extend(
        &self,
        aggregation_time: u64,
        publication_time: Option<u64>,
    ) -> std::result::Result<CalendarHashChain, ExtenderError> {
        KsiService::extend(self, aggregation_time, publication_time).map_err(|e| match e {
            ServiceError::Transport(reason) => ExtenderError::Unavailable(reason),
            other => ExtenderError::Failed(other.to_string()),
        })
    }
}
