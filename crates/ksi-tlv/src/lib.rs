//! # KSI TLV
//!
//! The type-length-value encoding underlying every KSI structure:
//! signatures, PDUs and publications files.
//!
//! ## Module Structure
//!
//! ```text
//! ksi-tlv/
//! ├── codec.rs      # Wire reader/writer (8-bit and 16-bit forms)
//! ├── tag.rs        # Tag + TagValue sum type, typed reads, promotion
//! ├── composite.rs  # Cardinality checks, unknown-child policy
//! └── errors.rs     # TlvError
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod composite;
pub mod errors;
pub mod tag;

// Re-exports
pub use codec::{decode, decode_all, TlvReader, TlvWriter, MAX_TYPE};
pub use composite::{unknown_child, ChildCounter};
pub use errors::{Result, TlvError};
pub use tag::{Tag, TagValue};
