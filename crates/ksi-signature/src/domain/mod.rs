//! # Domain Module
//!
//! Hash chains, signature records, the signature itself and the
//! publications file.

pub mod aggregation_chain;
pub mod auth_records;
pub mod calendar_chain;
pub mod constants;
pub mod errors;
pub mod publication;
pub mod publications_file;
pub mod rfc3161;
pub mod signature;
pub mod value_objects;

pub use aggregation_chain::{AggregationHashChain, AggregationLink, Metadata, SiblingData};
pub use auth_records::{AggregationAuthenticationRecord, CalendarAuthenticationRecord, SignatureData};
pub use calendar_chain::{CalendarHashChain, CalendarLink};
pub use errors::*;
pub use publication::{PublicationData, PublicationRecord};
pub use publications_file::{CertificateRecord, PublicationsFile, PublicationsFileHeader};
pub use rfc3161::Rfc3161Record;
pub use signature::Signature;
pub use value_objects::*;
