//! Publication data and publication records.

use ksi_crypto::DataHash;
use ksi_tlv::{unknown_child, ChildCounter, Tag, TlvError};

use super::constants::{publication_data as pd, publication_record as pr};
use super::errors::Result;

/// A published calendar root: time plus hash (TLV 0x10).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicationData {
    publication_time: u64,
    publication_hash: DataHash,
    tag: Tag,
}

impl PublicationData {
    /// Create publication data.
    pub fn new(publication_time: u64, publication_hash: DataHash) -> Self {
        let tag = Tag::composite(
            pd::TAG_TYPE,
            false,
            false,
            vec![
                Tag::integer(pd::PUBLICATION_TIME, false, false, publication_time),
                Tag::imprint(pd::PUBLICATION_HASH, false, false, publication_hash.clone()),
            ],
        );
        Self {
            publication_time,
            publication_hash,
            tag,
        }
    }

    /// Parse a publication data tag.
    pub fn from_tag(tag: &Tag) -> Result<Self> {
        tag.expect_type(pd::TAG_TYPE)?;

        let mut counter = ChildCounter::new(pd::TAG_TYPE);
        let mut children = Vec::new();
        let (mut time, mut hash) = (None, None);

        for child in tag.children()? {
            counter.add(child.tag_type());
            let typed = match child.tag_type() {
                pd::PUBLICATION_TIME => {
                    let t = child.to_integer()?;
                    time = Some(t.as_u64()?);
                    t
                }
                pd::PUBLICATION_HASH => {
                    let t = child.to_imprint()?;
                    hash = Some(t.as_imprint()?);
                    t
                }
                _ => {
                    unknown_child(pd::TAG_TYPE, &child)?;
                    child
                }
            };
            children.push(typed);
        }

        Ok(Self {
            publication_time: counter.required(pd::PUBLICATION_TIME, time)?,
            publication_hash: counter.required(pd::PUBLICATION_HASH, hash)?,
            tag: tag.to_composite(children),
        })
    }

    /// Publication time.
    pub fn publication_time(&self) -> u64 {
        self.publication_time
    }

    /// Published calendar root hash.
    pub fn publication_hash(&self) -> &DataHash {
        &self.publication_hash
    }

    /// Underlying tag.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Time and hash equal, ignoring encoding details.
    pub fn same_publication(&self, other: &PublicationData) -> bool {
        self.publication_time == other.publication_time
            && self.publication_hash == other.publication_hash
    }
}

/// Publication record: 0x803 inside a signature, 0x703 inside a
/// publications file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicationRecord {
    publication_data: PublicationData,
    references: Vec<String>,
    repository_uris: Vec<String>,
    tag: Tag,
}

impl PublicationRecord {
    /// Create a record of the given tag type.
    pub fn new(
        tag_type: u32,
        publication_data: PublicationData,
        references: Vec<String>,
        repository_uris: Vec<String>,
    ) -> Self {
        let mut children = vec![publication_data.tag().clone()];
        children.extend(
            references
                .iter()
                .map(|r| Tag::string(pr::PUBLICATION_REFERENCE, false, false, r.clone())),
        );
        children.extend(
            repository_uris
                .iter()
                .map(|u| Tag::string(pr::REPOSITORY_URI, false, false, u.clone())),
        );
        Self {
            publication_data,
            references,
            repository_uris,
            tag: Tag::composite(tag_type, false, false, children),
        }
    }

    /// Parse a record of either tag type.
    pub fn from_tag(tag: &Tag) -> Result<Self> {
        let tag_type = tag.tag_type();
        if tag_type != pr::SIGNATURE_TAG_TYPE && tag_type != pr::PUBLICATIONS_FILE_TAG_TYPE {
            return Err(TlvError::TypeMismatch {
                expected: pr::SIGNATURE_TAG_TYPE,
                actual: tag_type,
            }
            .into());
        }

        let mut counter = ChildCounter::new(tag_type);
        let mut children = Vec::new();
        let mut publication_data = None;
        let mut references = Vec::new();
        let mut repository_uris = Vec::new();

        for child in tag.children()? {
            counter.add(child.tag_type());
            let typed = match child.tag_type() {
                pd::TAG_TYPE => {
                    let data = PublicationData::from_tag(&child)?;
                    let t = data.tag().clone();
                    publication_data = Some(data);
                    t
                }
                pr::PUBLICATION_REFERENCE => {
                    let t = child.to_string_tag()?;
                    references.push(t.as_string()?);
                    t
                }
                pr::REPOSITORY_URI => {
                    let t = child.to_string_tag()?;
                    repository_uris.push(t.as_string()?);
                    t
                }
                _ => {
                    unknown_child(tag_type, &child)?;
                    child
                }
            };
            children.push(typed);
        }

        Ok(Self {
            publication_data: counter.required(pd::TAG_TYPE, publication_data)?,
            references,
            repository_uris,
            tag: tag.to_composite(children),
        })
    }

    /// Published data.
    pub fn publication_data(&self) -> &PublicationData {
        &self.publication_data
    }

    /// Publication references (e.g. newspaper citations).
    pub fn references(&self) -> &[String] {
        &self.references
    }

    /// Repository URIs.
    pub fn repository_uris(&self) -> &[String] {
        &self.repository_uris
    }

    /// Underlying tag.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Same record retyped for embedding in a signature (0x803).
    pub fn to_signature_record(&self) -> Self {
        self.retyped(pr::SIGNATURE_TAG_TYPE)
    }

    fn retyped(&self, tag_type: u32) -> Self {
        Self::new(
            tag_type,
            self.publication_data.clone(),
            self.references.clone(),
            self.repository_uris.clone(),
        )
    }
}
