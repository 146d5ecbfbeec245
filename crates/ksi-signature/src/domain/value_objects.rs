//! Small value types shared by both chain kinds.

use ksi_crypto::DataHash;

use super::constants::aggregation_chain::{LEFT_LINK, RIGHT_LINK};

/// Which side of the running hash a link's sibling sits on.
///
/// The direction is carried by the link's own TLV type (0x7 left, 0x8
/// right) in both aggregation and calendar chains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkDirection {
    /// Running hash is the left operand.
    Left,
    /// Running hash is the right operand.
    Right,
}

impl LinkDirection {
    /// Direction encoded by a link tag type.
    pub fn from_tag_type(tag_type: u32) -> Option<Self> {
        match tag_type {
            LEFT_LINK => Some(LinkDirection::Left),
            RIGHT_LINK => Some(LinkDirection::Right),
            _ => None,
        }
    }

    /// Link tag type for this direction.
    pub fn tag_type(self) -> u32 {
        match self {
            LinkDirection::Left => LEFT_LINK,
            LinkDirection::Right => RIGHT_LINK,
        }
    }
}

/// Running (level, hash) state while folding aggregation chains.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainResult {
    /// Tree level reached.
    pub level: u64,
    /// Hash at that level.
    pub hash: DataHash,
}

impl ChainResult {
    /// Create a chain result.
    pub fn new(level: u64, hash: DataHash) -> Self {
        Self { level, hash }
    }
}
