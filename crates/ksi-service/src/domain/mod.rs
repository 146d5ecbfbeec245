//! # Domain Module
//!
//! PDU structures, their type numbers and the service error type.

pub mod constants;
pub mod errors;
pub mod payloads;
pub mod pdu;

pub use errors::*;
pub use payloads::{
    AggregationRequestPayload, AggregationResponsePayload, ErrorPayload, ExtendRequestPayload,
    ExtendResponsePayload, PduHeader,
};
pub use pdu::{Payload, Pdu, PduKind, PduTypes, PduVersion};
