//! # KSI Signature
//!
//! Aggregation chains, an optional calendar chain and the records that
//! anchor it. A signature is immutable: extending or splicing produces a
//! new value.

use std::cmp::Reverse;
use std::io::Read;

use ksi_crypto::DataHash;
use ksi_tlv::{unknown_child, ChildCounter, Tag, TlvError, TlvReader};
use tracing::debug;

use super::aggregation_chain::AggregationHashChain;
use super::auth_records::{AggregationAuthenticationRecord, CalendarAuthenticationRecord};
use super::calendar_chain::CalendarHashChain;
use super::constants::{
    aggregation_auth_record as aar, aggregation_chain as chain, calendar_auth_record as car,
    calendar_chain as cal, publication_record as pr, rfc3161 as rfc, signature as sig,
};
use super::errors::{Result, SignatureError};
use super::publication::PublicationRecord;
use super::rfc3161::Rfc3161Record;
use super::value_objects::ChainResult;

/// KSI signature (TLV 0x800).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    aggregation_chains: Vec<AggregationHashChain>,
    calendar_chain: Option<CalendarHashChain>,
    publication_record: Option<PublicationRecord>,
    calendar_authentication_record: Option<CalendarAuthenticationRecord>,
    aggregation_authentication_record: Option<AggregationAuthenticationRecord>,
    rfc3161_record: Option<Rfc3161Record>,
    tag: Tag,
}

impl Signature {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Parse a signature tag and check its composition rules.
    pub fn from_tag(tag: &Tag) -> Result<Self> {
        tag.expect_type(sig::TAG_TYPE)?;

        let mut counter = ChildCounter::new(sig::TAG_TYPE);
        let mut children = Vec::new();
        let mut aggregation_chains = Vec::new();
        let (mut calendar_chain, mut publication_record) = (None, None);
        let (mut calendar_auth, mut aggregation_auth, mut rfc3161_record) = (None, None, None);

        for child in tag.children()? {
            counter.add(child.tag_type());
            let typed = match child.tag_type() {
                chain::TAG_TYPE => {
                    let parsed = AggregationHashChain::from_tag(&child)?;
                    let t = parsed.tag().clone();
                    aggregation_chains.push(parsed);
                    t
                }
                cal::TAG_TYPE => {
                    let parsed = CalendarHashChain::from_tag(&child)?;
                    let t = parsed.tag().clone();
                    calendar_chain = Some(parsed);
                    t
                }
                pr::SIGNATURE_TAG_TYPE => {
                    let parsed = PublicationRecord::from_tag(&child)?;
                    let t = parsed.tag().clone();
                    publication_record = Some(parsed);
                    t
                }
                aar::TAG_TYPE => {
                    let parsed = AggregationAuthenticationRecord::from_tag(&child)?;
                    let t = parsed.tag().clone();
                    aggregation_auth = Some(parsed);
                    t
                }
                car::TAG_TYPE => {
                    let parsed = CalendarAuthenticationRecord::from_tag(&child)?;
                    let t = parsed.tag().clone();
                    calendar_auth = Some(parsed);
                    t
                }
                rfc::TAG_TYPE => {
                    let parsed = Rfc3161Record::from_tag(&child)?;
                    let t = parsed.tag().clone();
                    rfc3161_record = Some(parsed);
                    t
                }
                _ => {
                    unknown_child(sig::TAG_TYPE, &child)?;
                    child
                }
            };
            children.push(typed);
        }

        counter.at_least_one(chain::TAG_TYPE)?;
        let calendar_chain = counter.optional(cal::TAG_TYPE, calendar_chain)?;
        let publication_record = counter.optional(pr::SIGNATURE_TAG_TYPE, publication_record)?;
        let calendar_authentication_record = counter.optional(car::TAG_TYPE, calendar_auth)?;
        let aggregation_authentication_record = counter.optional(aar::TAG_TYPE, aggregation_auth)?;
        let rfc3161_record = counter.optional(rfc::TAG_TYPE, rfc3161_record)?;

        if publication_record.is_some() && calendar_authentication_record.is_some() {
            return Err(SignatureError::InvalidSignature(
                "only one of publication record and calendar authentication record is allowed"
                    .into(),
            ));
        }
        if calendar_chain.is_none()
            && (publication_record.is_some() || calendar_authentication_record.is_some())
        {
            return Err(SignatureError::InvalidSignature(
                "publication record or calendar authentication record requires a calendar hash chain"
                    .into(),
            ));
        }

        // Lowest chain (longest index) first; stable for equal lengths.
        aggregation_chains.sort_by_key(|c| Reverse(c.chain_index().len()));

        Ok(Self {
            aggregation_chains,
            calendar_chain,
            publication_record,
            calendar_authentication_record,
            aggregation_authentication_record,
            rfc3161_record,
            tag: tag.to_composite(children),
        })
    }

    /// Parse a signature from exactly one encoded TLV.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_tag(&Tag::decode(bytes)?)
    }

    /// Read a signature from a stream; the stream must hold exactly one element.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = TlvReader::new(reader);
        let tag = reader.read_tag()?.ok_or(TlvError::Truncated {
            context: "signature",
        })?;
        if let Some(extra) = reader.read_tag()? {
            return Err(TlvError::TrailingBytes(extra.encode()?.len()).into());
        }
        Self::from_tag(&tag)
    }

    /// Assemble a signature from the children of an aggregation response,
    /// keeping only the types that belong to a signature.
    pub fn from_response_children<'a, I>(children: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Tag>,
    {
        let kept = children
            .into_iter()
            .filter(|t| sig::CHILD_RANGE.contains(&t.tag_type()))
            .cloned()
            .collect();
        Self::from_tag(&Tag::composite(sig::TAG_TYPE, false, false, kept))
    }

    /// Assemble a signature from its parts.
    pub fn from_parts(
        aggregation_chains: Vec<AggregationHashChain>,
        calendar_chain: Option<CalendarHashChain>,
        calendar_authentication_record: Option<CalendarAuthenticationRecord>,
        publication_record: Option<PublicationRecord>,
        aggregation_authentication_record: Option<AggregationAuthenticationRecord>,
        rfc3161_record: Option<Rfc3161Record>,
    ) -> Result<Self> {
        let mut children: Vec<Tag> = aggregation_chains.iter().map(|c| c.tag().clone()).collect();
        children.extend(calendar_chain.iter().map(|c| c.tag().clone()));
        children.extend(publication_record.iter().map(|r| r.to_signature_record().tag().clone()));
        children.extend(aggregation_authentication_record.iter().map(|r| r.tag().clone()));
        children.extend(calendar_authentication_record.iter().map(|r| r.tag().clone()));
        children.extend(rfc3161_record.iter().map(|r| r.tag().clone()));
        Self::from_tag(&Tag::composite(sig::TAG_TYPE, false, false, children))
    }

    // =========================================================================
    // Derivation
    // =========================================================================

    /// New signature anchored to `calendar_chain` and a publication.
    ///
    /// The calendar authentication record is dropped. Without an explicit
    /// `publication_record`, one is built from the chain's own publication.
    pub fn extend(
        &self,
        calendar_chain: CalendarHashChain,
        publication_record: Option<PublicationRecord>,
    ) -> Result<Signature> {
        let record = match publication_record {
            Some(record) => record.to_signature_record(),
            None => PublicationRecord::new(
                pr::SIGNATURE_TAG_TYPE,
                calendar_chain.publication_data(),
                Vec::new(),
                Vec::new(),
            ),
        };
        debug!(
            publication_time = calendar_chain.publication_time(),
            "Extending signature"
        );
        Self::from_parts(
            self.aggregation_chains.clone(),
            Some(calendar_chain),
            None,
            Some(record),
            self.aggregation_authentication_record.clone(),
            self.rfc3161_record.clone(),
        )
    }

    /// New signature with `lowest` spliced in below the current first chain.
    ///
    /// `lowest` must lead to this signature's input hash and its output
    /// level must fit in the first link's level correction, which is
    /// reduced by that level so the aggregation root stays the same.
    pub fn with_lowest_chain(&self, lowest: AggregationHashChain) -> Result<Signature> {
        let output = lowest.own_output_hash()?;
        let expected = self.input_hash();
        if &output.hash != expected {
            return Err(SignatureError::ChainOutputMismatch {
                expected: expected.clone(),
                actual: output.hash,
            });
        }

        let (first, rest) = self.split_chains()?;
        let level_correction = first
            .links()
            .first()
            .map(|l| l.level_correction())
            .unwrap_or(0);
        if output.level > level_correction {
            return Err(SignatureError::CannotAddLowestLevelChain {
                output_level: output.level,
                level_correction,
            });
        }

        let mut chains = Vec::with_capacity(self.aggregation_chains.len() + 1);
        chains.push(lowest);
        chains.push(first.with_first_level_correction(level_correction - output.level)?);
        chains.extend(rest.iter().cloned());

        Self::from_parts(
            chains,
            self.calendar_chain.clone(),
            self.calendar_authentication_record.clone(),
            self.publication_record.clone(),
            self.aggregation_authentication_record.clone(),
            self.rfc3161_record.clone(),
        )
    }

    fn split_chains(&self) -> Result<(&AggregationHashChain, &[AggregationHashChain])> {
        self.aggregation_chains
            .split_first()
            .ok_or_else(|| SignatureError::InvalidSignature("no aggregation hash chains".into()))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Aggregation chains, lowest first.
    pub fn aggregation_chains(&self) -> &[AggregationHashChain] {
        &self.aggregation_chains
    }

    /// Calendar hash chain.
    pub fn calendar_chain(&self) -> Option<&CalendarHashChain> {
        self.calendar_chain.as_ref()
    }

    /// Publication record.
    pub fn publication_record(&self) -> Option<&PublicationRecord> {
        self.publication_record.as_ref()
    }

    /// Calendar authentication record.
    pub fn calendar_authentication_record(&self) -> Option<&CalendarAuthenticationRecord> {
        self.calendar_authentication_record.as_ref()
    }

    /// Aggregation authentication record.
    pub fn aggregation_authentication_record(&self) -> Option<&AggregationAuthenticationRecord> {
        self.aggregation_authentication_record.as_ref()
    }

    /// RFC 3161 record.
    pub fn rfc3161_record(&self) -> Option<&Rfc3161Record> {
        self.rfc3161_record.as_ref()
    }

    /// Input hash of the lowest aggregation chain.
    pub fn input_hash(&self) -> &DataHash {
        // at least one chain is guaranteed by construction
        self.aggregation_chains[0].input_hash()
    }

    /// Aggregation time of the lowest aggregation chain.
    pub fn aggregation_time(&self) -> u64 {
        self.aggregation_chains[0].aggregation_time()
    }

    /// Fold every aggregation chain starting from the input hash at level 0.
    pub fn aggregation_root(&self) -> Result<ChainResult> {
        let mut result = ChainResult::new(0, self.input_hash().clone());
        for chain in &self.aggregation_chains {
            result = chain.output_hash(&result)?;
        }
        Ok(result)
    }

    /// Client identities along the chains, outermost first.
    pub fn identity(&self) -> Vec<String> {
        self.aggregation_chains
            .iter()
            .rev()
            .flat_map(|c| c.links().iter().rev())
            .filter_map(|l| l.identity())
            .collect()
    }

    /// True once a publication record anchors the signature.
    pub fn is_extended(&self) -> bool {
        self.publication_record.is_some()
    }

    /// Underlying tag.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// TLV encoding.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(self.tag.encode()?)
    }
}
