//! # Calendar Hash Chain
//!
//! Links an aggregation root to a publication. The output hash and the
//! registration time are derived once, when the chain is built.

use ksi_crypto::DataHash;
use ksi_tlv::{unknown_child, ChildCounter, Tag, TlvError};

use super::constants::calendar_chain as cal;
use super::errors::Result;
use super::publication::PublicationData;
use super::value_objects::LinkDirection;
use crate::algorithms::chain_math::{calendar_step, registration_time};

/// One calendar link; the direction is the tag type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarLink {
    /// Sibling side.
    pub direction: LinkDirection,
    /// Sibling hash.
    pub sibling: DataHash,
}

impl CalendarLink {
    /// Create a link.
    pub fn new(direction: LinkDirection, sibling: DataHash) -> Self {
        Self { direction, sibling }
    }

    fn to_tag(&self) -> Tag {
        Tag::imprint(self.direction.tag_type(), false, false, self.sibling.clone())
    }
}

/// Calendar hash chain (TLV 0x802).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarHashChain {
    publication_time: u64,
    aggregation_time: u64,
    input_hash: DataHash,
    links: Vec<CalendarLink>,
    output_hash: DataHash,
    registration_time: u64,
    tag: Tag,
}

impl CalendarHashChain {
    /// Build a chain; `aggregation_time` defaults to the publication time.
    pub fn new(
        publication_time: u64,
        aggregation_time: Option<u64>,
        input_hash: DataHash,
        links: Vec<CalendarLink>,
    ) -> Result<Self> {
        let mut children = vec![Tag::integer(cal::PUBLICATION_TIME, false, false, publication_time)];
        if let Some(time) = aggregation_time {
            children.push(Tag::integer(cal::AGGREGATION_TIME, false, false, time));
        }
        children.push(Tag::imprint(cal::INPUT_HASH, false, false, input_hash.clone()));
        children.extend(links.iter().map(CalendarLink::to_tag));

        Self::derive(
            publication_time,
            aggregation_time,
            input_hash,
            links,
            Tag::composite(cal::TAG_TYPE, false, false, children),
        )
    }

    /// Parse a calendar hash chain tag.
    pub fn from_tag(tag: &Tag) -> Result<Self> {
        tag.expect_type(cal::TAG_TYPE)?;

        let mut counter = ChildCounter::new(cal::TAG_TYPE);
        let mut children = Vec::new();
        let (mut publication_time, mut aggregation_time, mut input_hash) = (None, None, None);
        let mut links = Vec::new();

        for child in tag.children()? {
            counter.add(child.tag_type());
            let typed = match child.tag_type() {
                cal::PUBLICATION_TIME => {
                    let t = child.to_integer()?;
                    publication_time = Some(t.as_u64()?);
                    t
                }
                cal::AGGREGATION_TIME => {
                    let t = child.to_integer()?;
                    aggregation_time = Some(t.as_u64()?);
                    t
                }
                cal::INPUT_HASH => {
                    let t = child.to_imprint()?;
                    input_hash = Some(t.as_imprint()?);
                    t
                }
                cal::LEFT_LINK | cal::RIGHT_LINK => {
                    let t = child.to_imprint()?;
                    let direction = LinkDirection::from_tag_type(t.tag_type()).ok_or(
                        TlvError::TypeMismatch {
                            expected: cal::LEFT_LINK,
                            actual: t.tag_type(),
                        },
                    )?;
                    links.push(CalendarLink::new(direction, t.as_imprint()?));
                    t
                }
                _ => {
                    unknown_child(cal::TAG_TYPE, &child)?;
                    child
                }
            };
            children.push(typed);
        }

        if links.is_empty() {
            return Err(TlvError::Cardinality {
                parent: cal::TAG_TYPE,
                child: cal::LEFT_LINK,
                rule: "at least once (left or right)",
                count: 0,
            }
            .into());
        }

        Self::derive(
            counter.required(cal::PUBLICATION_TIME, publication_time)?,
            counter.optional(cal::AGGREGATION_TIME, aggregation_time)?,
            counter.required(cal::INPUT_HASH, input_hash)?,
            links,
            tag.to_composite(children),
        )
    }

    fn derive(
        publication_time: u64,
        aggregation_time: Option<u64>,
        input_hash: DataHash,
        links: Vec<CalendarLink>,
        tag: Tag,
    ) -> Result<Self> {
        let mut output_hash = input_hash.clone();
        for link in &links {
            output_hash = calendar_step(link.direction, &output_hash, &link.sibling)?;
        }
        let registration_time =
            registration_time(publication_time, links.iter().map(|l| l.direction))?;

        Ok(Self {
            publication_time,
            aggregation_time: aggregation_time.unwrap_or(publication_time),
            input_hash,
            links,
            output_hash,
            registration_time,
            tag,
        })
    }

    /// Publication time.
    pub fn publication_time(&self) -> u64 {
        self.publication_time
    }

    /// Aggregation time.
    pub fn aggregation_time(&self) -> u64 {
        self.aggregation_time
    }

    /// Input hash (the aggregation root).
    pub fn input_hash(&self) -> &DataHash {
        &self.input_hash
    }

    /// Links, input side first.
    pub fn links(&self) -> &[CalendarLink] {
        &self.links
    }

    /// Calendar root hash at the publication time.
    pub fn output_hash(&self) -> &DataHash {
        &self.output_hash
    }

    /// Registration time implied by the chain's shape.
    pub fn registration_time(&self) -> u64 {
        self.registration_time
    }

    /// Publication this chain leads to.
    pub fn publication_data(&self) -> PublicationData {
        PublicationData::new(self.publication_time, self.output_hash.clone())
    }

    /// True when both chains have the same length and agree on every
    /// position where `other` has a right link.
    ///
    /// Right links are fixed at registration time; a chain re-extended to
    /// the same publication may only differ in its left links.
    pub fn right_links_match(&self, other: &CalendarHashChain) -> bool {
        self.links.len() == other.links.len()
            && self
                .links
                .iter()
                .zip(&other.links)
                .filter(|(_, theirs)| theirs.direction == LinkDirection::Right)
                .all(|(ours, theirs)| ours == theirs)
    }

    /// Underlying tag.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }
}
