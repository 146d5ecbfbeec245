//! # Aggregation Hash Chain
//!
//! A path from a signed document hash up through an aggregator tree. Each
//! link contributes one sibling value: an explicit sibling hash, a legacy
//! client id, or a metadata leaf.

use ksi_crypto::{DataHash, HashAlgorithm};
use ksi_tlv::{unknown_child, ChildCounter, Tag, TlvError};

use super::constants::{aggregation_chain as chain, link, metadata as meta};
use super::errors::{Result, SignatureError};
use super::value_objects::{ChainResult, LinkDirection};
use crate::algorithms::chain_math::{aggregation_step, next_level, MAX_LEVEL};

// =============================================================================
// METADATA
// =============================================================================

/// Client metadata leaf embedded in a link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metadata {
    client_id: String,
    machine_id: Option<String>,
    sequence_number: Option<u64>,
    request_time: Option<u64>,
    tag: Tag,
}

impl Metadata {
    /// Build a metadata leaf.
    pub fn new(
        client_id: impl Into<String>,
        machine_id: Option<String>,
        sequence_number: Option<u64>,
        request_time: Option<u64>,
    ) -> Self {
        let client_id = client_id.into();
        let mut children = vec![Tag::string(meta::CLIENT_ID, false, false, client_id.clone())];
        if let Some(id) = &machine_id {
            children.push(Tag::string(meta::MACHINE_ID, false, false, id.clone()));
        }
        if let Some(seq) = sequence_number {
            children.push(Tag::integer(meta::SEQUENCE_NUMBER, false, false, seq));
        }
        if let Some(time) = request_time {
            children.push(Tag::integer(meta::REQUEST_TIME, false, false, time));
        }
        Self {
            client_id,
            machine_id,
            sequence_number,
            request_time,
            tag: Tag::composite(link::METADATA, false, false, children),
        }
    }

    /// Parse a metadata tag.
    pub fn from_tag(tag: &Tag) -> Result<Self> {
        tag.expect_type(link::METADATA)?;

        let mut counter = ChildCounter::new(link::METADATA);
        let mut children = Vec::new();
        let (mut client_id, mut machine_id, mut sequence_number, mut request_time) =
            (None, None, None, None);

        for child in tag.children()? {
            counter.add(child.tag_type());
            let typed = match child.tag_type() {
                meta::CLIENT_ID => {
                    let t = child.to_string_tag()?;
                    client_id = Some(t.as_string()?);
                    t
                }
                meta::MACHINE_ID => {
                    let t = child.to_string_tag()?;
                    machine_id = Some(t.as_string()?);
                    t
                }
                meta::SEQUENCE_NUMBER => {
                    let t = child.to_integer()?;
                    sequence_number = Some(t.as_u64()?);
                    t
                }
                meta::REQUEST_TIME => {
                    let t = child.to_integer()?;
                    request_time = Some(t.as_u64()?);
                    t
                }
                meta::PADDING => child,
                _ => {
                    unknown_child(link::METADATA, &child)?;
                    child
                }
            };
            children.push(typed);
        }

        counter.at_most_one(meta::PADDING)?;
        Ok(Self {
            client_id: counter.required(meta::CLIENT_ID, client_id)?,
            machine_id: counter.optional(meta::MACHINE_ID, machine_id)?,
            sequence_number: counter.optional(meta::SEQUENCE_NUMBER, sequence_number)?,
            request_time: counter.optional(meta::REQUEST_TIME, request_time)?,
            tag: tag.to_composite(children),
        })
    }

    /// Client id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Machine id.
    pub fn machine_id(&self) -> Option<&str> {
        self.machine_id.as_deref()
    }

    /// Sequence number.
    pub fn sequence_number(&self) -> Option<u64> {
        self.sequence_number
    }

    /// Request time in milliseconds.
    pub fn request_time(&self) -> Option<u64> {
        self.request_time
    }

    /// Underlying tag.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }
}

// =============================================================================
// LINK
// =============================================================================

/// Sibling contribution of one aggregation link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SiblingData {
    /// Explicit sibling hash.
    Hash(DataHash),
    /// Legacy client identifier, hashed as its raw value bytes.
    LegacyId(Vec<u8>),
    /// Metadata leaf, hashed as its encoded children.
    Metadata(Metadata),
}

/// One step of an aggregation hash chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregationLink {
    direction: LinkDirection,
    level_correction: u64,
    sibling: SiblingData,
    tag: Tag,
}

impl AggregationLink {
    /// Build a link; a zero level correction is omitted from the encoding.
    pub fn new(direction: LinkDirection, level_correction: u64, sibling: SiblingData) -> Self {
        let mut children = Vec::with_capacity(2);
        if level_correction > 0 {
            children.push(Tag::integer(link::LEVEL_CORRECTION, false, false, level_correction));
        }
        children.push(match &sibling {
            SiblingData::Hash(hash) => Tag::imprint(link::SIBLING_HASH, false, false, hash.clone()),
            SiblingData::LegacyId(bytes) => Tag::raw(link::LEGACY_ID, false, false, bytes.clone()),
            SiblingData::Metadata(metadata) => metadata.tag().clone(),
        });
        Self {
            direction,
            level_correction,
            sibling,
            tag: Tag::composite(direction.tag_type(), false, false, children),
        }
    }

    /// Parse a left (0x7) or right (0x8) link tag.
    pub fn from_tag(tag: &Tag) -> Result<Self> {
        let direction = LinkDirection::from_tag_type(tag.tag_type()).ok_or(
            TlvError::TypeMismatch {
                expected: chain::LEFT_LINK,
                actual: tag.tag_type(),
            },
        )?;

        let mut counter = ChildCounter::new(tag.tag_type());
        let mut children = Vec::new();
        let mut level_correction = None;
        let mut siblings = Vec::new();

        for child in tag.children()? {
            counter.add(child.tag_type());
            let typed = match child.tag_type() {
                link::LEVEL_CORRECTION => {
                    let t = child.to_integer()?;
                    level_correction = Some(t.as_u64()?);
                    t
                }
                link::SIBLING_HASH => {
                    let t = child.to_imprint()?;
                    siblings.push(SiblingData::Hash(t.as_imprint()?));
                    t
                }
                link::LEGACY_ID => {
                    siblings.push(SiblingData::LegacyId(child.as_bytes()?));
                    child
                }
                link::METADATA => {
                    let metadata = Metadata::from_tag(&child)?;
                    let t = metadata.tag().clone();
                    siblings.push(SiblingData::Metadata(metadata));
                    t
                }
                _ => {
                    unknown_child(tag.tag_type(), &child)?;
                    child
                }
            };
            children.push(typed);
        }

        let level_correction = counter
            .optional(link::LEVEL_CORRECTION, level_correction)?
            .unwrap_or(0);
        check_level_correction(tag.tag_type(), level_correction)?;
        if siblings.len() != 1 {
            return Err(SignatureError::InvalidLinkSibling(siblings.len()));
        }
        let sibling = siblings.remove(0);

        Ok(Self {
            direction,
            level_correction,
            sibling,
            tag: tag.to_composite(children),
        })
    }

    /// Direction.
    pub fn direction(&self) -> LinkDirection {
        self.direction
    }

    /// Level correction (0 when absent).
    pub fn level_correction(&self) -> u64 {
        self.level_correction
    }

    /// Sibling contribution.
    pub fn sibling(&self) -> &SiblingData {
        &self.sibling
    }

    /// Bytes fed into the step hash for this link's sibling.
    pub fn sibling_bytes(&self) -> Result<Vec<u8>> {
        Ok(match &self.sibling {
            SiblingData::Hash(hash) => hash.imprint(),
            SiblingData::LegacyId(bytes) => bytes.clone(),
            SiblingData::Metadata(metadata) => metadata.tag().encode_value()?,
        })
    }

    /// Client identity carried by this link, if any.
    pub fn identity(&self) -> Option<String> {
        match &self.sibling {
            SiblingData::Metadata(metadata) => Some(metadata.client_id().to_string()),
            SiblingData::LegacyId(bytes) => legacy_id_name(bytes),
            SiblingData::Hash(_) => None,
        }
    }

    /// Underlying tag.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }
}

fn check_level_correction(tag_type: u32, level_correction: u64) -> Result<()> {
    if level_correction > MAX_LEVEL {
        return Err(TlvError::InvalidStructure {
            tag_type,
            reason: format!("level correction {} above {}", level_correction, MAX_LEVEL),
        }
        .into());
    }
    Ok(())
}

// Legacy id layout: 0x03 0x00 <len> <name bytes> <zero padding>
fn legacy_id_name(bytes: &[u8]) -> Option<String> {
    match bytes {
        [0x03, 0x00, len, rest @ ..] if usize::from(*len) <= rest.len() => {
            String::from_utf8(rest[..usize::from(*len)].to_vec()).ok()
        }
        _ => None,
    }
}

// =============================================================================
// CHAIN
// =============================================================================

/// Aggregation hash chain (TLV 0x801).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregationHashChain {
    aggregation_time: u64,
    chain_index: Vec<u64>,
    input_data: Option<Vec<u8>>,
    input_hash: DataHash,
    algorithm: HashAlgorithm,
    links: Vec<AggregationLink>,
    tag: Tag,
}

impl AggregationHashChain {
    /// Build a chain from parts.
    pub fn new(
        aggregation_time: u64,
        chain_index: Vec<u64>,
        input_hash: DataHash,
        algorithm: HashAlgorithm,
        links: Vec<AggregationLink>,
    ) -> Result<Self> {
        if chain_index.is_empty() || links.is_empty() {
            return Err(SignatureError::InvalidSignature(
                "aggregation hash chain needs a chain index and at least one link".into(),
            ));
        }
        for link in &links {
            check_level_correction(link.direction().tag_type(), link.level_correction())?;
        }
        let mut children = vec![Tag::integer(chain::AGGREGATION_TIME, false, false, aggregation_time)];
        children.extend(
            chain_index
                .iter()
                .map(|&i| Tag::integer(chain::CHAIN_INDEX, false, false, i)),
        );
        children.push(Tag::imprint(chain::INPUT_HASH, false, false, input_hash.clone()));
        children.push(Tag::integer(chain::ALGORITHM, false, false, u64::from(algorithm.id())));
        children.extend(links.iter().map(|l| l.tag().clone()));

        Ok(Self {
            aggregation_time,
            chain_index,
            input_data: None,
            input_hash,
            algorithm,
            links,
            tag: Tag::composite(chain::TAG_TYPE, false, false, children),
        })
    }

    /// Parse an aggregation hash chain tag.
    pub fn from_tag(tag: &Tag) -> Result<Self> {
        tag.expect_type(chain::TAG_TYPE)?;

        let mut counter = ChildCounter::new(chain::TAG_TYPE);
        let mut children = Vec::new();
        let mut aggregation_time = None;
        let mut chain_index = Vec::new();
        let mut input_data = None;
        let mut input_hash = None;
        let mut algorithm = None;
        let mut links = Vec::new();

        for child in tag.children()? {
            counter.add(child.tag_type());
            let typed = match child.tag_type() {
                chain::AGGREGATION_TIME => {
                    let t = child.to_integer()?;
                    aggregation_time = Some(t.as_u64()?);
                    t
                }
                chain::CHAIN_INDEX => {
                    let t = child.to_integer()?;
                    chain_index.push(t.as_u64()?);
                    t
                }
                chain::INPUT_DATA => {
                    input_data = Some(child.as_bytes()?);
                    child
                }
                chain::INPUT_HASH => {
                    let t = child.to_imprint()?;
                    input_hash = Some(t.as_imprint()?);
                    t
                }
                chain::ALGORITHM => {
                    let t = child.to_integer()?;
                    let id = u8::try_from(t.as_u64()?).map_err(|_| TlvError::InvalidStructure {
                        tag_type: chain::TAG_TYPE,
                        reason: "aggregation algorithm id out of range".into(),
                    })?;
                    algorithm = Some(HashAlgorithm::from_id(id)?);
                    t
                }
                chain::LEFT_LINK | chain::RIGHT_LINK => {
                    let l = AggregationLink::from_tag(&child)?;
                    let t = l.tag().clone();
                    links.push(l);
                    t
                }
                _ => {
                    unknown_child(chain::TAG_TYPE, &child)?;
                    child
                }
            };
            children.push(typed);
        }

        counter.at_least_one(chain::CHAIN_INDEX)?;
        if links.is_empty() {
            return Err(TlvError::Cardinality {
                parent: chain::TAG_TYPE,
                child: chain::LEFT_LINK,
                rule: "at least once (left or right)",
                count: 0,
            }
            .into());
        }

        Ok(Self {
            aggregation_time: counter.required(chain::AGGREGATION_TIME, aggregation_time)?,
            chain_index,
            input_data: counter.optional(chain::INPUT_DATA, input_data)?,
            input_hash: counter.required(chain::INPUT_HASH, input_hash)?,
            algorithm: counter.required(chain::ALGORITHM, algorithm)?,
            links,
            tag: tag.to_composite(children),
        })
    }

    /// Aggregation time.
    pub fn aggregation_time(&self) -> u64 {
        self.aggregation_time
    }

    /// Chain index (path identifiers, outermost first).
    pub fn chain_index(&self) -> &[u64] {
        &self.chain_index
    }

    /// Optional input data.
    pub fn input_data(&self) -> Option<&[u8]> {
        self.input_data.as_deref()
    }

    /// Declared input hash.
    pub fn input_hash(&self) -> &DataHash {
        &self.input_hash
    }

    /// Step hash algorithm.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Links, leaf first.
    pub fn links(&self) -> &[AggregationLink] {
        &self.links
    }

    /// Underlying tag.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Fold this chain's links onto `input`.
    pub fn output_hash(&self, input: &ChainResult) -> Result<ChainResult> {
        let mut level = input.level;
        let mut hash = input.hash.clone();
        for link in &self.links {
            level = next_level(level, link.level_correction())?;
            hash = aggregation_step(
                self.algorithm,
                link.direction(),
                &hash,
                &link.sibling_bytes()?,
                level,
            )?;
        }
        Ok(ChainResult::new(level, hash))
    }

    /// Output when this chain is the lowest one (starts at level 0 from its input hash).
    pub fn own_output_hash(&self) -> Result<ChainResult> {
        self.output_hash(&ChainResult::new(0, self.input_hash.clone()))
    }

    /// Chain index element implied by the link directions: a leading 1 bit,
    /// then one bit per link from the top down, 1 for left.
    ///
    /// `None` when the chain is too long to fit in 64 bits.
    pub fn shape(&self) -> Option<u64> {
        self.links.iter().rev().try_fold(1u64, |shape, link| {
            let bit = u64::from(link.direction() == LinkDirection::Left);
            shape.checked_mul(2).map(|s| s | bit)
        })
    }

    /// Copy of this chain with the first link's level correction replaced.
    ///
    /// Every other child, flag and unknown element is carried over as parsed.
    pub fn with_first_level_correction(&self, level_correction: u64) -> Result<Self> {
        let Some(first) = self.links.first() else {
            return Ok(self.clone());
        };
        check_level_correction(first.tag().tag_type(), level_correction)?;

        let mut link_children: Vec<Tag> = first
            .tag()
            .children()?
            .into_iter()
            .filter(|c| c.tag_type() != link::LEVEL_CORRECTION)
            .collect();
        if level_correction > 0 {
            link_children.insert(0, Tag::integer(link::LEVEL_CORRECTION, false, false, level_correction));
        }

        let position = self
            .tag
            .children()?
            .iter()
            .position(|c| matches!(c.tag_type(), chain::LEFT_LINK | chain::RIGHT_LINK))
            .ok_or(TlvError::InvalidStructure {
                tag_type: chain::TAG_TYPE,
                reason: "aggregation hash chain without links".into(),
            })?;
        let mut tag = self.tag.to_composite(self.tag.children()?);
        tag.replace_child(position, first.tag().to_composite(link_children))?;
        Self::from_tag(&tag)
    }
}
