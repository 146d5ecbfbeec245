//! PKI authentication records and their signature data.

use ksi_crypto::DataHash;
use ksi_tlv::{unknown_child, ChildCounter, Tag};

use super::constants::{
    aggregation_auth_record as aar, calendar_auth_record as car, publication_data as pd,
    signature_data as sd,
};
use super::errors::Result;
use super::publication::PublicationData;

// =============================================================================
// SIGNATURE DATA
// =============================================================================

/// PKI signature over some record (TLV 0xB).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureData {
    signature_type: String,
    signature_value: Vec<u8>,
    certificate_id: Vec<u8>,
    certificate_repository_uri: Option<String>,
    tag: Tag,
}

impl SignatureData {
    /// Create signature data.
    pub fn new(
        signature_type: impl Into<String>,
        signature_value: Vec<u8>,
        certificate_id: Vec<u8>,
        certificate_repository_uri: Option<String>,
    ) -> Self {
        let signature_type = signature_type.into();
        let mut children = vec![
            Tag::string(sd::SIGNATURE_TYPE, false, false, signature_type.clone()),
            Tag::raw(sd::SIGNATURE_VALUE, false, false, signature_value.clone()),
            Tag::raw(sd::CERTIFICATE_ID, false, false, certificate_id.clone()),
        ];
        if let Some(uri) = &certificate_repository_uri {
            children.push(Tag::string(sd::CERTIFICATE_REPOSITORY_URI, false, false, uri.clone()));
        }
        Self {
            signature_type,
            signature_value,
            certificate_id,
            certificate_repository_uri,
            tag: Tag::composite(sd::TAG_TYPE, false, false, children),
        }
    }

    /// Parse a signature data tag.
    pub fn from_tag(tag: &Tag) -> Result<Self> {
        tag.expect_type(sd::TAG_TYPE)?;

        let mut counter = ChildCounter::new(sd::TAG_TYPE);
        let mut children = Vec::new();
        let (mut signature_type, mut signature_value, mut certificate_id, mut uri) =
            (None, None, None, None);

        for child in tag.children()? {
            counter.add(child.tag_type());
            let typed = match child.tag_type() {
                sd::SIGNATURE_TYPE => {
                    let t = child.to_string_tag()?;
                    signature_type = Some(t.as_string()?);
                    t
                }
                sd::SIGNATURE_VALUE => {
                    signature_value = Some(child.as_bytes()?);
                    child
                }
                sd::CERTIFICATE_ID => {
                    certificate_id = Some(child.as_bytes()?);
                    child
                }
                sd::CERTIFICATE_REPOSITORY_URI => {
                    let t = child.to_string_tag()?;
                    uri = Some(t.as_string()?);
                    t
                }
                _ => {
                    unknown_child(sd::TAG_TYPE, &child)?;
                    child
                }
            };
            children.push(typed);
        }

        Ok(Self {
            signature_type: counter.required(sd::SIGNATURE_TYPE, signature_type)?,
            signature_value: counter.required(sd::SIGNATURE_VALUE, signature_value)?,
            certificate_id: counter.required(sd::CERTIFICATE_ID, certificate_id)?,
            certificate_repository_uri: counter.optional(sd::CERTIFICATE_REPOSITORY_URI, uri)?,
            tag: tag.to_composite(children),
        })
    }

    /// Signature algorithm OID.
    pub fn signature_type(&self) -> &str {
        &self.signature_type
    }

    /// Signature bytes.
    pub fn signature_value(&self) -> &[u8] {
        &self.signature_value
    }

    /// Id of the signing certificate.
    pub fn certificate_id(&self) -> &[u8] {
        &self.certificate_id
    }

    /// Where the certificate can be fetched.
    pub fn certificate_repository_uri(&self) -> Option<&str> {
        self.certificate_repository_uri.as_deref()
    }

    /// Underlying tag.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }
}

// =============================================================================
// CALENDAR AUTHENTICATION RECORD
// =============================================================================

/// Calendar root signed by the gateway key (TLV 0x805).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarAuthenticationRecord {
    publication_data: PublicationData,
    signature_data: SignatureData,
    tag: Tag,
}

impl CalendarAuthenticationRecord {
    /// Create a record.
    pub fn new(publication_data: PublicationData, signature_data: SignatureData) -> Self {
        let tag = Tag::composite(
            car::TAG_TYPE,
            false,
            false,
            vec![publication_data.tag().clone(), signature_data.tag().clone()],
        );
        Self {
            publication_data,
            signature_data,
            tag,
        }
    }

    /// Parse a calendar authentication record tag.
    pub fn from_tag(tag: &Tag) -> Result<Self> {
        tag.expect_type(car::TAG_TYPE)?;

        let mut counter = ChildCounter::new(car::TAG_TYPE);
        let mut children = Vec::new();
        let (mut publication_data, mut signature_data) = (None, None);

        for child in tag.children()? {
            counter.add(child.tag_type());
            let typed = match child.tag_type() {
                pd::TAG_TYPE => {
                    let data = PublicationData::from_tag(&child)?;
                    let t = data.tag().clone();
                    publication_data = Some(data);
                    t
                }
                sd::TAG_TYPE => {
                    let data = SignatureData::from_tag(&child)?;
                    let t = data.tag().clone();
                    signature_data = Some(data);
                    t
                }
                _ => {
                    unknown_child(car::TAG_TYPE, &child)?;
                    child
                }
            };
            children.push(typed);
        }

        Ok(Self {
            publication_data: counter.required(pd::TAG_TYPE, publication_data)?,
            signature_data: counter.required(sd::TAG_TYPE, signature_data)?,
            tag: tag.to_composite(children),
        })
    }

    /// Signed publication data.
    pub fn publication_data(&self) -> &PublicationData {
        &self.publication_data
    }

    /// PKI signature over the encoded publication data.
    pub fn signature_data(&self) -> &SignatureData {
        &self.signature_data
    }

    /// Bytes covered by the PKI signature.
    pub fn signed_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.publication_data.tag().encode()?)
    }

    /// Underlying tag.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }
}

// =============================================================================
// AGGREGATION AUTHENTICATION RECORD
// =============================================================================

/// Aggregation root signed by an aggregator key (TLV 0x804).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregationAuthenticationRecord {
    aggregation_time: u64,
    chain_index: Vec<u64>,
    input_hash: DataHash,
    signature_data: SignatureData,
    tag: Tag,
}

impl AggregationAuthenticationRecord {
    /// Parse an aggregation authentication record tag.
    pub fn from_tag(tag: &Tag) -> Result<Self> {
        tag.expect_type(aar::TAG_TYPE)?;

        let mut counter = ChildCounter::new(aar::TAG_TYPE);
        let mut children = Vec::new();
        let (mut aggregation_time, mut input_hash, mut signature_data) = (None, None, None);
        let mut chain_index = Vec::new();

        for child in tag.children()? {
            counter.add(child.tag_type());
            let typed = match child.tag_type() {
                aar::AGGREGATION_TIME => {
                    let t = child.to_integer()?;
                    aggregation_time = Some(t.as_u64()?);
                    t
                }
                aar::CHAIN_INDEX => {
                    let t = child.to_integer()?;
                    chain_index.push(t.as_u64()?);
                    t
                }
                aar::INPUT_HASH => {
                    let t = child.to_imprint()?;
                    input_hash = Some(t.as_imprint()?);
                    t
                }
                sd::TAG_TYPE => {
                    let data = SignatureData::from_tag(&child)?;
                    let t = data.tag().clone();
                    signature_data = Some(data);
                    t
                }
                _ => {
                    unknown_child(aar::TAG_TYPE, &child)?;
                    child
                }
            };
            children.push(typed);
        }

        counter.at_least_one(aar::CHAIN_INDEX)?;
        Ok(Self {
            aggregation_time: counter.required(aar::AGGREGATION_TIME, aggregation_time)?,
            chain_index,
            input_hash: counter.required(aar::INPUT_HASH, input_hash)?,
            signature_data: counter.required(sd::TAG_TYPE, signature_data)?,
            tag: tag.to_composite(children),
        })
    }

    /// Aggregation time.
    pub fn aggregation_time(&self) -> u64 {
        self.aggregation_time
    }

    /// Chain index.
    pub fn chain_index(&self) -> &[u64] {
        &self.chain_index
    }

    /// Signed input hash.
    pub fn input_hash(&self) -> &DataHash {
        &self.input_hash
    }

    /// PKI signature.
    pub fn signature_data(&self) -> &SignatureData {
        &self.signature_data
    }

    /// Underlying tag.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }
}
