//! # PDU Header and Payloads
//!
//! Each structure keeps the promoted tag it was built from, so a parsed
//! payload re-encodes to the bytes the MAC was computed over.

use ksi_crypto::DataHash;
use ksi_signature::domain::constants::{calendar_chain as cal, signature as sig};
use ksi_signature::CalendarHashChain;
use ksi_tlv::{unknown_child, ChildCounter, Tag};

use super::constants::{
    aggregation_request as areq, aggregation_response as aresp, extend_request as ereq,
    extend_response as eresp, header as hdr, payload as pl,
};
use super::errors::Result;

fn read_integer(child: &Tag, slot: &mut Option<u64>) -> Result<Tag> {
    let typed = child.to_integer()?;
    *slot = Some(typed.as_u64()?);
    Ok(typed)
}

fn read_string(child: &Tag, slot: &mut Option<String>) -> Result<Tag> {
    let typed = child.to_string_tag()?;
    *slot = Some(typed.as_string()?);
    Ok(typed)
}

// =============================================================================
// Header
// =============================================================================

/// PDU header: who is talking (TLV 0x1).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PduHeader {
    login_id: String,
    instance_id: Option<u64>,
    message_id: Option<u64>,
    tag: Tag,
}

impl PduHeader {
    /// Create a header.
    pub fn new(login_id: impl Into<String>, instance_id: Option<u64>, message_id: Option<u64>) -> Self {
        let login_id = login_id.into();
        let mut children = vec![Tag::string(hdr::LOGIN_ID, false, false, login_id.clone())];
        if let Some(id) = instance_id {
            children.push(Tag::integer(hdr::INSTANCE_ID, false, false, id));
        }
        if let Some(id) = message_id {
            children.push(Tag::integer(hdr::MESSAGE_ID, false, false, id));
        }
        Self {
            login_id,
            instance_id,
            message_id,
            tag: Tag::composite(hdr::TAG_TYPE, false, false, children),
        }
    }

    /// Parse a header tag.
    pub fn from_tag(tag: &Tag) -> Result<Self> {
        tag.expect_type(hdr::TAG_TYPE)?;

        let mut counter = ChildCounter::new(hdr::TAG_TYPE);
        let mut children = Vec::new();
        let (mut login_id, mut instance_id, mut message_id) = (None, None, None);

        for child in tag.children()? {
            counter.add(child.tag_type());
            let typed = match child.tag_type() {
                hdr::LOGIN_ID => read_string(&child, &mut login_id)?,
                hdr::INSTANCE_ID => read_integer(&child, &mut instance_id)?,
                hdr::MESSAGE_ID => read_integer(&child, &mut message_id)?,
                _ => {
                    unknown_child(hdr::TAG_TYPE, &child)?;
                    child
                }
            };
            children.push(typed);
        }

        Ok(Self {
            login_id: counter.required(hdr::LOGIN_ID, login_id)?,
            instance_id: counter.optional(hdr::INSTANCE_ID, instance_id)?,
            message_id: counter.optional(hdr::MESSAGE_ID, message_id)?,
            tag: tag.to_composite(children),
        })
    }

    /// Login id.
    pub fn login_id(&self) -> &str {
        &self.login_id
    }

    /// Client instance id.
    pub fn instance_id(&self) -> Option<u64> {
        self.instance_id
    }

    /// Message id within the instance.
    pub fn message_id(&self) -> Option<u64> {
        self.message_id
    }

    /// Underlying tag.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Request to aggregate one hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregationRequestPayload {
    request_id: u64,
    request_hash: DataHash,
    request_level: Option<u64>,
    tag: Tag,
}

impl AggregationRequestPayload {
    /// Create a request payload of the given tag type.
    pub fn new(tag_type: u32, request_id: u64, request_hash: DataHash, request_level: Option<u64>) -> Self {
        let request_level = request_level.filter(|&l| l > 0);
        let mut children = vec![
            Tag::integer(pl::REQUEST_ID, false, false, request_id),
            Tag::imprint(areq::REQUEST_HASH, false, false, request_hash.clone()),
        ];
        if let Some(level) = request_level {
            children.push(Tag::integer(areq::REQUEST_LEVEL, false, false, level));
        }
        Self {
            request_id,
            request_hash,
            request_level,
            tag: Tag::composite(tag_type, false, false, children),
        }
    }

    /// Parse a request payload.
    pub fn from_tag(tag: &Tag) -> Result<Self> {
        let tag_type = tag.tag_type();
        let mut counter = ChildCounter::new(tag_type);
        let mut children = Vec::new();
        let (mut request_id, mut hash, mut level) = (None, None, None);

        for child in tag.children()? {
            counter.add(child.tag_type());
            let typed = match child.tag_type() {
                pl::REQUEST_ID => read_integer(&child, &mut request_id)?,
                areq::REQUEST_HASH => {
                    let t = child.to_imprint()?;
                    hash = Some(t.as_imprint()?);
                    t
                }
                areq::REQUEST_LEVEL => read_integer(&child, &mut level)?,
                _ => {
                    unknown_child(tag_type, &child)?;
                    child
                }
            };
            children.push(typed);
        }

        Ok(Self {
            request_id: counter.required(pl::REQUEST_ID, request_id)?,
            request_hash: counter.required(areq::REQUEST_HASH, hash)?,
            request_level: counter.optional(areq::REQUEST_LEVEL, level)?,
            tag: tag.to_composite(children),
        })
    }

    /// Request id.
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// Hash to be signed.
    pub fn request_hash(&self) -> &DataHash {
        &self.request_hash
    }

    /// Level of the hash in the client's own aggregation tree.
    pub fn request_level(&self) -> Option<u64> {
        self.request_level
    }

    /// Underlying tag.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }
}

/// Request to extend a calendar chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendRequestPayload {
    request_id: u64,
    aggregation_time: u64,
    publication_time: Option<u64>,
    tag: Tag,
}

impl ExtendRequestPayload {
    /// Create a request payload of the given tag type.
    pub fn new(tag_type: u32, request_id: u64, aggregation_time: u64, publication_time: Option<u64>) -> Self {
        let mut children = vec![
            Tag::integer(pl::REQUEST_ID, false, false, request_id),
            Tag::integer(ereq::AGGREGATION_TIME, false, false, aggregation_time),
        ];
        if let Some(time) = publication_time {
            children.push(Tag::integer(ereq::PUBLICATION_TIME, false, false, time));
        }
        Self {
            request_id,
            aggregation_time,
            publication_time,
            tag: Tag::composite(tag_type, false, false, children),
        }
    }

    /// Parse a request payload.
    pub fn from_tag(tag: &Tag) -> Result<Self> {
        let tag_type = tag.tag_type();
        let mut counter = ChildCounter::new(tag_type);
        let mut children = Vec::new();
        let (mut request_id, mut aggregation_time, mut publication_time) = (None, None, None);

        for child in tag.children()? {
            counter.add(child.tag_type());
            let typed = match child.tag_type() {
                pl::REQUEST_ID => read_integer(&child, &mut request_id)?,
                ereq::AGGREGATION_TIME => read_integer(&child, &mut aggregation_time)?,
                ereq::PUBLICATION_TIME => read_integer(&child, &mut publication_time)?,
                _ => {
                    unknown_child(tag_type, &child)?;
                    child
                }
            };
            children.push(typed);
        }

        Ok(Self {
            request_id: counter.required(pl::REQUEST_ID, request_id)?,
            aggregation_time: counter.required(ereq::AGGREGATION_TIME, aggregation_time)?,
            publication_time: counter.optional(ereq::PUBLICATION_TIME, publication_time)?,
            tag: tag.to_composite(children),
        })
    }

    /// Request id.
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// Aggregation time of the signature being extended.
    pub fn aggregation_time(&self) -> u64 {
        self.aggregation_time
    }

    /// Target publication; the calendar head when absent.
    pub fn publication_time(&self) -> Option<u64> {
        self.publication_time
    }

    /// Underlying tag.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }
}

// =============================================================================
// Responses
// =============================================================================

/// Aggregation response carrying the parts of a new signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregationResponsePayload {
    request_id: u64,
    status: u64,
    error_message: Option<String>,
    tag: Tag,
}

impl AggregationResponsePayload {
    /// Parse a response payload. Signature parts are kept unparsed.
    pub fn from_tag(tag: &Tag) -> Result<Self> {
        let tag_type = tag.tag_type();
        let mut counter = ChildCounter::new(tag_type);
        let mut children = Vec::new();
        let (mut request_id, mut status, mut message) = (None, None, None);

        for child in tag.children()? {
            counter.add(child.tag_type());
            let typed = match child.tag_type() {
                pl::REQUEST_ID => read_integer(&child, &mut request_id)?,
                pl::STATUS => read_integer(&child, &mut status)?,
                pl::ERROR_MESSAGE => read_string(&child, &mut message)?,
                aresp::CONFIG | aresp::REQUEST_ACKNOWLEDGMENT => child,
                t if sig::CHILD_RANGE.contains(&t) => child,
                _ => {
                    unknown_child(tag_type, &child)?;
                    child
                }
            };
            children.push(typed);
        }

        Ok(Self {
            request_id: counter.required(pl::REQUEST_ID, request_id)?,
            status: counter.optional(pl::STATUS, status)?.unwrap_or(0),
            error_message: counter.optional(pl::ERROR_MESSAGE, message)?,
            tag: tag.to_composite(children),
        })
    }

    /// Request id being answered.
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// Status; zero means success.
    pub fn status(&self) -> u64 {
        self.status
    }

    /// Error message sent with a non-zero status.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Children of the payload, including the signature parts.
    pub fn children(&self) -> Result<Vec<Tag>> {
        Ok(self.tag.children()?)
    }

    /// Underlying tag.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }
}

/// Extension response carrying a calendar hash chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendResponsePayload {
    request_id: u64,
    status: u64,
    error_message: Option<String>,
    last_time: Option<u64>,
    calendar_chain: Option<CalendarHashChain>,
    tag: Tag,
}

impl ExtendResponsePayload {
    /// Parse a response payload.
    pub fn from_tag(tag: &Tag) -> Result<Self> {
        let tag_type = tag.tag_type();
        let mut counter = ChildCounter::new(tag_type);
        let mut children = Vec::new();
        let (mut request_id, mut status, mut message, mut last_time) = (None, None, None, None);
        let mut calendar_chain = None;

        for child in tag.children()? {
            counter.add(child.tag_type());
            let typed = match child.tag_type() {
                pl::REQUEST_ID => read_integer(&child, &mut request_id)?,
                pl::STATUS => read_integer(&child, &mut status)?,
                pl::ERROR_MESSAGE => read_string(&child, &mut message)?,
                eresp::LAST_TIME | eresp::LEGACY_LAST_TIME => read_integer(&child, &mut last_time)?,
                cal::TAG_TYPE => {
                    let chain = CalendarHashChain::from_tag(&child)?;
                    let typed = chain.tag().clone();
                    calendar_chain = Some(chain);
                    typed
                }
                _ => {
                    unknown_child(tag_type, &child)?;
                    child
                }
            };
            children.push(typed);
        }

        counter.at_most_one(eresp::LAST_TIME)?;
        counter.at_most_one(eresp::LEGACY_LAST_TIME)?;
        Ok(Self {
            request_id: counter.required(pl::REQUEST_ID, request_id)?,
            status: counter.optional(pl::STATUS, status)?.unwrap_or(0),
            error_message: counter.optional(pl::ERROR_MESSAGE, message)?,
            last_time,
            calendar_chain: counter.optional(cal::TAG_TYPE, calendar_chain)?,
            tag: tag.to_composite(children),
        })
    }

    /// Request id being answered.
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// Status; zero means success.
    pub fn status(&self) -> u64 {
        self.status
    }

    /// Error message sent with a non-zero status.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Latest time the extender can extend to.
    pub fn last_time(&self) -> Option<u64> {
        self.last_time
    }

    /// Extended calendar chain.
    pub fn calendar_chain(&self) -> Option<&CalendarHashChain> {
        self.calendar_chain.as_ref()
    }

    /// Underlying tag.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }
}

/// Error payload: the gateway refused the request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorPayload {
    status: u64,
    error_message: Option<String>,
    tag: Tag,
}

impl ErrorPayload {
    /// Create an error payload of the given tag type.
    pub fn new(tag_type: u32, status: u64, error_message: Option<String>) -> Self {
        let mut children = vec![Tag::integer(pl::STATUS, false, false, status)];
        if let Some(message) = &error_message {
            children.push(Tag::string(pl::ERROR_MESSAGE, false, false, message.clone()));
        }
        Self {
            status,
            error_message,
            tag: Tag::composite(tag_type, false, false, children),
        }
    }

    /// Parse an error payload.
    pub fn from_tag(tag: &Tag) -> Result<Self> {
        let tag_type = tag.tag_type();
        let mut counter = ChildCounter::new(tag_type);
        let mut children = Vec::new();
        let (mut status, mut message) = (None, None);

        for child in tag.children()? {
            counter.add(child.tag_type());
            let typed = match child.tag_type() {
                pl::STATUS => read_integer(&child, &mut status)?,
                pl::ERROR_MESSAGE => read_string(&child, &mut message)?,
                _ => {
                    unknown_child(tag_type, &child)?;
                    child
                }
            };
            children.push(typed);
        }

        Ok(Self {
            status: counter.required(pl::STATUS, status)?,
            error_message: counter.optional(pl::ERROR_MESSAGE, message)?,
            tag: tag.to_composite(children),
        })
    }

    /// Status code.
    pub fn status(&self) -> u64 {
        self.status
    }

    /// Error message.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Underlying tag.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ksi_crypto::{hash, HashAlgorithm};

    #[test]
    fn test_header_roundtrip() {
        let header = PduHeader::new("anon", Some(1), Some(42));
        let parsed = PduHeader::from_tag(&Tag::decode(&header.tag().encode().unwrap()).unwrap()).unwrap();
        assert_eq!(parsed.login_id(), "anon");
        assert_eq!(parsed.instance_id(), Some(1));
        assert_eq!(parsed.message_id(), Some(42));
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_header_requires_login_id() {
        let tag = Tag::composite(
            hdr::TAG_TYPE,
            false,
            false,
            vec![Tag::integer(hdr::INSTANCE_ID, false, false, 1)],
        );
        assert!(PduHeader::from_tag(&tag).is_err());
    }

    #[test]
    fn test_zero_level_not_encoded() {
        let request_hash = hash(HashAlgorithm::Sha2_256, b"doc").unwrap();
        let payload = AggregationRequestPayload::new(0x2, 7, request_hash.clone(), Some(0));
        assert_eq!(payload.tag().children().unwrap().len(), 2);

        let with_level = AggregationRequestPayload::new(0x2, 7, request_hash, Some(3));
        let parsed = AggregationRequestPayload::from_tag(&Tag::decode(&with_level.tag().encode().unwrap()).unwrap())
            .unwrap();
        assert_eq!(parsed.request_level(), Some(3));
        assert_eq!(parsed.request_id(), 7);
    }

    #[test]
    fn test_extend_request_fields() {
        let payload = ExtendRequestPayload::new(0x2, 9, 1_000, Some(2_000));
        let parsed = ExtendRequestPayload::from_tag(&Tag::decode(&payload.tag().encode().unwrap()).unwrap()).unwrap();
        assert_eq!(parsed.aggregation_time(), 1_000);
        assert_eq!(parsed.publication_time(), Some(2_000));
    }

    #[test]
    fn test_aggregation_response_keeps_signature_parts() {
        let tag = Tag::composite(
            0x2,
            false,
            false,
            vec![
                Tag::integer(pl::REQUEST_ID, false, false, 5),
                Tag::raw(0x801, false, false, vec![0x02, 0x01, 0x01]),
            ],
        );
        let payload = AggregationResponsePayload::from_tag(&tag).unwrap();
        assert_eq!(payload.status(), 0);
        assert_eq!(payload.children().unwrap()[1].tag_type(), 0x801);
    }

    #[test]
    fn test_aggregation_response_rejects_unknown_critical() {
        let tag = Tag::composite(
            0x2,
            false,
            false,
            vec![
                Tag::integer(pl::REQUEST_ID, false, false, 5),
                Tag::raw(0x1A, false, false, vec![]),
            ],
        );
        assert!(AggregationResponsePayload::from_tag(&tag).is_err());
    }

    #[test]
    fn test_error_payload() {
        let payload = ErrorPayload::new(0x3, 0x101, Some("bad request".to_string()));
        let parsed = ErrorPayload::from_tag(&Tag::decode(&payload.tag().encode().unwrap()).unwrap()).unwrap();
        assert_eq!(parsed.status(), 0x101);
        assert_eq!(parsed.error_message(), Some("bad request"));
    }
}
