//! Legacy RFC 3161 timestamp record (TLV 0x806).
//!
//! Wraps a document hash in the TSTInfo and signed-attributes structures
//! of a legacy timestamp so that the first aggregation chain can pick up
//! where the RFC 3161 token left off.

use ksi_crypto::{hash_many, DataHash, HashAlgorithm};
use ksi_tlv::{unknown_child, ChildCounter, Tag, TlvError};

use super::constants::rfc3161 as rfc;
use super::errors::Result;

/// RFC 3161 compatibility record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rfc3161Record {
    aggregation_time: u64,
    chain_index: Vec<u64>,
    input_hash: DataHash,
    tst_info_prefix: Vec<u8>,
    tst_info_suffix: Vec<u8>,
    tst_info_algorithm: HashAlgorithm,
    signed_attributes_prefix: Vec<u8>,
    signed_attributes_suffix: Vec<u8>,
    signed_attributes_algorithm: HashAlgorithm,
    tag: Tag,
}

fn algorithm_child(child: &Tag) -> Result<(Tag, HashAlgorithm)> {
    let t = child.to_integer()?;
    let id = u8::try_from(t.as_u64()?).map_err(|_| TlvError::InvalidStructure {
        tag_type: rfc::TAG_TYPE,
        reason: "hash algorithm id out of range".into(),
    })?;
    let algorithm = HashAlgorithm::from_id(id)?;
    Ok((t, algorithm))
}

impl Rfc3161Record {
    /// Parse an RFC 3161 record tag.
    pub fn from_tag(tag: &Tag) -> Result<Self> {
        tag.expect_type(rfc::TAG_TYPE)?;

        let mut counter = ChildCounter::new(rfc::TAG_TYPE);
        let mut children = Vec::new();
        let mut aggregation_time = None;
        let mut chain_index = Vec::new();
        let mut input_hash = None;
        let (mut tst_prefix, mut tst_suffix, mut tst_algorithm) = (None, None, None);
        let (mut attr_prefix, mut attr_suffix, mut attr_algorithm) = (None, None, None);

        for child in tag.children()? {
            counter.add(child.tag_type());
            let typed = match child.tag_type() {
                rfc::AGGREGATION_TIME => {
                    let t = child.to_integer()?;
                    aggregation_time = Some(t.as_u64()?);
                    t
                }
                rfc::CHAIN_INDEX => {
                    let t = child.to_integer()?;
                    chain_index.push(t.as_u64()?);
                    t
                }
                rfc::INPUT_HASH => {
                    let t = child.to_imprint()?;
                    input_hash = Some(t.as_imprint()?);
                    t
                }
                rfc::TST_INFO_PREFIX => {
                    tst_prefix = Some(child.as_bytes()?);
                    child
                }
                rfc::TST_INFO_SUFFIX => {
                    tst_suffix = Some(child.as_bytes()?);
                    child
                }
                rfc::TST_INFO_ALGORITHM => {
                    let (t, algorithm) = algorithm_child(&child)?;
                    tst_algorithm = Some(algorithm);
                    t
                }
                rfc::SIGNED_ATTR_PREFIX => {
                    attr_prefix = Some(child.as_bytes()?);
                    child
                }
                rfc::SIGNED_ATTR_SUFFIX => {
                    attr_suffix = Some(child.as_bytes()?);
                    child
                }
                rfc::SIGNED_ATTR_ALGORITHM => {
                    let (t, algorithm) = algorithm_child(&child)?;
                    attr_algorithm = Some(algorithm);
                    t
                }
                _ => {
                    unknown_child(rfc::TAG_TYPE, &child)?;
                    child
                }
            };
            children.push(typed);
        }

        counter.at_least_one(rfc::CHAIN_INDEX)?;
        Ok(Self {
            aggregation_time: counter.required(rfc::AGGREGATION_TIME, aggregation_time)?,
            chain_index,
            input_hash: counter.required(rfc::INPUT_HASH, input_hash)?,
            tst_info_prefix: counter.required(rfc::TST_INFO_PREFIX, tst_prefix)?,
            tst_info_suffix: counter.required(rfc::TST_INFO_SUFFIX, tst_suffix)?,
            tst_info_algorithm: counter.required(rfc::TST_INFO_ALGORITHM, tst_algorithm)?,
            signed_attributes_prefix: counter.required(rfc::SIGNED_ATTR_PREFIX, attr_prefix)?,
            signed_attributes_suffix: counter.required(rfc::SIGNED_ATTR_SUFFIX, attr_suffix)?,
            signed_attributes_algorithm: counter
                .required(rfc::SIGNED_ATTR_ALGORITHM, attr_algorithm)?,
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

    /// Timestamped document hash.
    pub fn input_hash(&self) -> &DataHash {
        &self.input_hash
    }

    /// Underlying tag.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Hash of the signed attributes that embed `document_hash`.
    pub fn output_hash(&self, document_hash: &DataHash) -> Result<DataHash> {
        let tst_info = hash_many(
            self.tst_info_algorithm,
            &[
                self.tst_info_prefix.as_slice(),
                document_hash.digest(),
                self.tst_info_suffix.as_slice(),
            ],
        )?;
        Ok(hash_many(
            self.signed_attributes_algorithm,
            &[
                self.signed_attributes_prefix.as_slice(),
                tst_info.digest(),
                self.signed_attributes_suffix.as_slice(),
            ],
        )?)
    }
}
