//! # Protocol Data Units
//!
//! A PDU wraps a header, one or more payloads and an HMAC over both.
//!
//! ## Wire Layout
//!
//! ```text
//! PDU (0x220 / 0x221 / 0x320 / 0x321, legacy 0x200 / 0x300)
//! ├── header   0x1   login id, instance id, message id
//! ├── payload  0x2.. request, response, error, config, ack
//! └── mac      0x1F  HMAC(encode(header) || encode(payloads))
//! ```
//!
//! The two generations differ only in type numbers: current PDUs use a
//! distinct container type per direction, legacy PDUs a distinct payload
//! type per direction. An error payload may arrive without header or MAC.

use ksi_crypto::{hmac, mac_equals, DataHash, HashAlgorithm};
use ksi_tlv::{unknown_child, ChildCounter, Tag, TlvError};
use serde::{Deserialize, Serialize};

use super::constants::{header as hdr, pdu as types, MAC};
use super::errors::{Result, ServiceError};
use super::payloads::{
    AggregationRequestPayload, AggregationResponsePayload, ErrorPayload, ExtendRequestPayload,
    ExtendResponsePayload, PduHeader,
};

/// Protocol generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PduVersion {
    /// Legacy PDUs (0x200 / 0x300)
    V1,
    /// Current PDUs (0x220 / 0x320 family)
    V2,
}

impl PduVersion {
    fn other(self) -> Self {
        match self {
            PduVersion::V1 => PduVersion::V2,
            PduVersion::V2 => PduVersion::V1,
        }
    }
}

/// Service a PDU is addressed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PduKind {
    /// Signing (aggregator)
    Aggregation,
    /// Extending (extender)
    Extension,
}

/// Tag types used by one kind of PDU in one protocol generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PduTypes {
    /// Container of a request
    pub request_pdu: u32,
    /// Container of a response
    pub response_pdu: u32,
    /// Request payload
    pub request_payload: u32,
    /// Response payload
    pub response_payload: u32,
    /// Error payload
    pub error_payload: u32,
}

impl PduKind {
    /// Type numbers for `version`.
    pub fn types(self, version: PduVersion) -> PduTypes {
        match (self, version) {
            (PduKind::Aggregation, PduVersion::V2) => PduTypes {
                request_pdu: types::AGGREGATION_REQUEST,
                response_pdu: types::AGGREGATION_RESPONSE,
                request_payload: types::REQUEST_PAYLOAD,
                response_payload: types::RESPONSE_PAYLOAD,
                error_payload: types::ERROR_PAYLOAD,
            },
            (PduKind::Extension, PduVersion::V2) => PduTypes {
                request_pdu: types::EXTEND_REQUEST,
                response_pdu: types::EXTEND_RESPONSE,
                request_payload: types::REQUEST_PAYLOAD,
                response_payload: types::RESPONSE_PAYLOAD,
                error_payload: types::ERROR_PAYLOAD,
            },
            (PduKind::Aggregation, PduVersion::V1) => PduTypes {
                request_pdu: types::LEGACY_AGGREGATION,
                response_pdu: types::LEGACY_AGGREGATION,
                request_payload: types::LEGACY_AGGREGATION_REQUEST_PAYLOAD,
                response_payload: types::LEGACY_AGGREGATION_RESPONSE_PAYLOAD,
                error_payload: types::LEGACY_AGGREGATION_ERROR_PAYLOAD,
            },
            (PduKind::Extension, PduVersion::V1) => PduTypes {
                request_pdu: types::LEGACY_EXTEND,
                response_pdu: types::LEGACY_EXTEND,
                request_payload: types::LEGACY_EXTEND_REQUEST_PAYLOAD,
                response_payload: types::LEGACY_EXTEND_RESPONSE_PAYLOAD,
                error_payload: types::LEGACY_EXTEND_ERROR_PAYLOAD,
            },
        }
    }
}

// =============================================================================
// Payloads
// =============================================================================

/// One payload of a PDU.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    /// Hash to sign
    AggregationRequest(AggregationRequestPayload),
    /// Signature parts
    AggregationResponse(AggregationResponsePayload),
    /// Chain to extend
    ExtendRequest(ExtendRequestPayload),
    /// Extended calendar chain
    ExtendResponse(ExtendResponsePayload),
    /// Gateway refusal
    Error(ErrorPayload),
    /// Aggregator configuration (current PDUs only)
    Config(Tag),
    /// Request acknowledgement (current PDUs only)
    Acknowledgement(Tag),
}

impl Payload {
    /// Underlying tag.
    pub fn tag(&self) -> &Tag {
        match self {
            Payload::AggregationRequest(p) => p.tag(),
            Payload::AggregationResponse(p) => p.tag(),
            Payload::ExtendRequest(p) => p.tag(),
            Payload::ExtendResponse(p) => p.tag(),
            Payload::Error(p) => p.tag(),
            Payload::Config(tag) | Payload::Acknowledgement(tag) => tag,
        }
    }
}

fn compute_mac<'a>(
    algorithm: HashAlgorithm,
    key: &[u8],
    header: &Tag,
    payloads: impl IntoIterator<Item = &'a Tag>,
) -> Result<DataHash> {
    let mut data = header.encode()?;
    for payload in payloads {
        data.extend(payload.encode()?);
    }
    Ok(hmac(algorithm, key, &data)?)
}

// =============================================================================
// PDU
// =============================================================================

/// A protocol data unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pdu {
    kind: PduKind,
    version: PduVersion,
    header: Option<PduHeader>,
    payloads: Vec<Payload>,
    mac: Option<DataHash>,
    tag: Tag,
}

impl Pdu {
    /// Build an authenticated request PDU.
    pub fn request(
        kind: PduKind,
        version: PduVersion,
        header: PduHeader,
        payload: Payload,
        mac_algorithm: HashAlgorithm,
        key: &[u8],
    ) -> Result<Self> {
        let tag_type = kind.types(version).request_pdu;
        Self::build(kind, version, tag_type, header, vec![payload], mac_algorithm, key)
    }

    /// Build an authenticated response PDU.
    pub fn response(
        kind: PduKind,
        version: PduVersion,
        header: PduHeader,
        payloads: Vec<Payload>,
        mac_algorithm: HashAlgorithm,
        key: &[u8],
    ) -> Result<Self> {
        let tag_type = kind.types(version).response_pdu;
        Self::build(kind, version, tag_type, header, payloads, mac_algorithm, key)
    }

    fn build(
        kind: PduKind,
        version: PduVersion,
        tag_type: u32,
        header: PduHeader,
        payloads: Vec<Payload>,
        mac_algorithm: HashAlgorithm,
        key: &[u8],
    ) -> Result<Self> {
        let mac = compute_mac(mac_algorithm, key, header.tag(), payloads.iter().map(Payload::tag))?;

        let mut children = vec![header.tag().clone()];
        children.extend(payloads.iter().map(|p| p.tag().clone()));
        children.push(Tag::imprint(MAC, false, false, mac.clone()));

        Ok(Self {
            kind,
            version,
            header: Some(header),
            payloads,
            mac: Some(mac),
            tag: Tag::composite(tag_type, false, false, children),
        })
    }

    /// Decode a PDU of `kind` spoken in `version`.
    pub fn from_bytes(bytes: &[u8], kind: PduKind, version: PduVersion) -> Result<Self> {
        Self::from_tag(&Tag::decode(bytes)?, kind, version)
    }

    /// Parse a PDU tag of `kind` spoken in `version`.
    pub fn from_tag(tag: &Tag, kind: PduKind, version: PduVersion) -> Result<Self> {
        let expected = kind.types(version);
        let pdu_type = tag.tag_type();
        if pdu_type != expected.request_pdu && pdu_type != expected.response_pdu {
            let other = kind.types(version.other());
            if pdu_type == other.request_pdu || pdu_type == other.response_pdu {
                return Err(ServiceError::VersionMismatch {
                    expected: expected.response_pdu,
                    actual: pdu_type,
                });
            }
            return Err(TlvError::TypeMismatch {
                expected: expected.response_pdu,
                actual: pdu_type,
            }
            .into());
        }

        let mut counter = ChildCounter::new(pdu_type);
        let mut children = Vec::new();
        let (mut header, mut mac) = (None, None);
        let mut payloads = Vec::new();

        for child in tag.children()? {
            counter.add(child.tag_type());
            let typed = match child.tag_type() {
                hdr::TAG_TYPE => {
                    let parsed = PduHeader::from_tag(&child)?;
                    let typed = parsed.tag().clone();
                    header = Some(parsed);
                    typed
                }
                MAC => {
                    let typed = child.to_imprint()?;
                    mac = Some(typed.as_imprint()?);
                    typed
                }
                _ => match Self::payload(kind, version, &expected, pdu_type, &child)? {
                    Some(payload) => {
                        let typed = payload.tag().clone();
                        payloads.push(payload);
                        typed
                    }
                    None => {
                        unknown_child(pdu_type, &child)?;
                        child
                    }
                },
            };
            children.push(typed);
        }

        if payloads.is_empty() {
            return Err(TlvError::InvalidStructure {
                tag_type: pdu_type,
                reason: "PDU carries no payload".to_string(),
            }
            .into());
        }
        if version == PduVersion::V1 && payloads.len() > 1 {
            return Err(TlvError::InvalidStructure {
                tag_type: pdu_type,
                reason: format!("legacy PDU must carry exactly one payload, found {}", payloads.len()),
            }
            .into());
        }

        let has_error = payloads.iter().any(|p| matches!(p, Payload::Error(_)));
        let (header, mac) = if has_error {
            (
                counter.optional(hdr::TAG_TYPE, header)?,
                counter.optional(MAC, mac)?,
            )
        } else {
            (
                Some(counter.required(hdr::TAG_TYPE, header)?),
                Some(counter.required(MAC, mac)?),
            )
        };

        Ok(Self {
            kind,
            version,
            header,
            payloads,
            mac,
            tag: tag.to_composite(children),
        })
    }

    fn payload(
        kind: PduKind,
        version: PduVersion,
        expected: &PduTypes,
        pdu_type: u32,
        child: &Tag,
    ) -> Result<Option<Payload>> {
        let child_type = child.tag_type();
        // current PDUs reuse one payload type for both directions
        let is_response_pdu = version == PduVersion::V1 || pdu_type == expected.response_pdu;

        let payload = if child_type == expected.error_payload {
            Payload::Error(ErrorPayload::from_tag(child)?)
        } else if child_type == expected.response_payload && is_response_pdu {
            match kind {
                PduKind::Aggregation => {
                    Payload::AggregationResponse(AggregationResponsePayload::from_tag(child)?)
                }
                PduKind::Extension => Payload::ExtendResponse(ExtendResponsePayload::from_tag(child)?),
            }
        } else if child_type == expected.request_payload {
            match kind {
                PduKind::Aggregation => {
                    Payload::AggregationRequest(AggregationRequestPayload::from_tag(child)?)
                }
                PduKind::Extension => Payload::ExtendRequest(ExtendRequestPayload::from_tag(child)?),
            }
        } else if version == PduVersion::V2 && child_type == types::CONFIG_PAYLOAD {
            Payload::Config(child.clone())
        } else if version == PduVersion::V2 && child_type == types::ACKNOWLEDGEMENT_PAYLOAD {
            Payload::Acknowledgement(child.clone())
        } else {
            return Ok(None);
        };
        Ok(Some(payload))
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Service the PDU belongs to.
    pub fn kind(&self) -> PduKind {
        self.kind
    }

    /// Protocol generation.
    pub fn version(&self) -> PduVersion {
        self.version
    }

    /// Header, absent only on bare error PDUs.
    pub fn header(&self) -> Option<&PduHeader> {
        self.header.as_ref()
    }

    /// Payloads in wire order.
    pub fn payloads(&self) -> &[Payload] {
        &self.payloads
    }

    /// MAC imprint.
    pub fn mac(&self) -> Option<&DataHash> {
        self.mac.as_ref()
    }

    /// First error payload.
    pub fn error_payload(&self) -> Option<&ErrorPayload> {
        self.payloads.iter().find_map(|p| match p {
            Payload::Error(e) => Some(e),
            _ => None,
        })
    }

    /// First aggregation request payload.
    pub fn aggregation_request(&self) -> Option<&AggregationRequestPayload> {
        self.payloads.iter().find_map(|p| match p {
            Payload::AggregationRequest(r) => Some(r),
            _ => None,
        })
    }

    /// First aggregation response payload.
    pub fn aggregation_response(&self) -> Option<&AggregationResponsePayload> {
        self.payloads.iter().find_map(|p| match p {
            Payload::AggregationResponse(r) => Some(r),
            _ => None,
        })
    }

    /// First extend request payload.
    pub fn extend_request(&self) -> Option<&ExtendRequestPayload> {
        self.payloads.iter().find_map(|p| match p {
            Payload::ExtendRequest(r) => Some(r),
            _ => None,
        })
    }

    /// First extend response payload.
    pub fn extend_response(&self) -> Option<&ExtendResponsePayload> {
        self.payloads.iter().find_map(|p| match p {
            Payload::ExtendResponse(r) => Some(r),
            _ => None,
        })
    }

    /// True when the MAC matches `key`. The MAC's own algorithm is used.
    pub fn verify_mac(&self, key: &[u8]) -> Result<bool> {
        let (Some(header), Some(mac)) = (&self.header, &self.mac) else {
            return Ok(false);
        };
        let expected = compute_mac(
            mac.algorithm(),
            key,
            header.tag(),
            self.payloads.iter().map(Payload::tag),
        )?;
        Ok(mac_equals(&expected, mac))
    }

    /// Underlying tag.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Wire bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(self.tag.encode()?)
    }
}
