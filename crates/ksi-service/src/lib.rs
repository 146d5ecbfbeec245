//! # KSI Service
//!
//! Client side of the KSI gateway protocol: request and response PDUs in
//! both protocol generations, HMAC authentication, and a synchronous
//! service that signs hashes, extends calendar chains and fetches the
//! publications file.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): PDU header, payloads, containers, errors
//! - **Ports Layer** (`ports/`): `KsiTransport` and its mock
//! - **Service** (`service.rs`): `KsiService`, also a `CalendarExtender`
//! - **Config** (`config.rs`): `ServiceConfig` with environment overrides
//!
//! ## Module Structure
//!
//! ```text
//! ksi-service/
//! ├── domain/
//! │   ├── constants.rs  # PDU and payload type numbers
//! │   ├── payloads.rs   # Header, request/response/error payloads
//! │   ├── pdu.rs        # Pdu, versions, MAC computation
//! │   └── errors.rs     # ServiceError
//! ├── ports/
//! │   └── outbound.rs   # KsiTransport, MockTransport
//! ├── config.rs
//! └── service.rs
//! ```
//!
//! ## PDU Types
//!
//! | Kind | Version | Request | Response | Payloads (req / resp / error) |
//! |------|---------|---------|----------|-------------------------------|
//! | aggregation | V2 | 0x220 | 0x221 | 0x2 / 0x2 / 0x3 |
//! | extension | V2 | 0x320 | 0x321 | 0x2 / 0x2 / 0x3 |
//! | aggregation | V1 | 0x200 | 0x200 | 0x201 / 0x202 / 0x203 |
//! | extension | V1 | 0x300 | 0x300 | 0x301 / 0x302 / 0x303 |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use config::ServiceConfig;
pub use domain::{
    AggregationRequestPayload, AggregationResponsePayload, ErrorPayload, ExtendRequestPayload,
    ExtendResponsePayload, Payload, Pdu, PduHeader, PduKind, PduTypes, PduVersion, Result,
    ServiceError,
};
pub use ports::outbound::{KsiTransport, MockTransport};
pub use service::{KsiService, MAX_REQUEST_LEVEL};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
