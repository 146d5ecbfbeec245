//! TLV type numbers of protocol data units and their payloads.

#![allow(missing_docs)]

/// PDU header.
pub mod header {
    pub const TAG_TYPE: u32 = 0x1;
    pub const LOGIN_ID: u32 = 0x1;
    pub const INSTANCE_ID: u32 = 0x2;
    pub const MESSAGE_ID: u32 = 0x3;
}

/// MAC imprint closing every authenticated PDU.
pub const MAC: u32 = 0x1F;

/// PDU containers and payload types per protocol generation.
pub mod pdu {
    pub const AGGREGATION_REQUEST: u32 = 0x220;
    pub const AGGREGATION_RESPONSE: u32 = 0x221;
    pub const EXTEND_REQUEST: u32 = 0x320;
    pub const EXTEND_RESPONSE: u32 = 0x321;

    pub const REQUEST_PAYLOAD: u32 = 0x2;
    pub const RESPONSE_PAYLOAD: u32 = 0x2;
    pub const ERROR_PAYLOAD: u32 = 0x3;
    pub const CONFIG_PAYLOAD: u32 = 0x4;
    pub const ACKNOWLEDGEMENT_PAYLOAD: u32 = 0x5;

    pub const LEGACY_AGGREGATION: u32 = 0x200;
    pub const LEGACY_AGGREGATION_REQUEST_PAYLOAD: u32 = 0x201;
    pub const LEGACY_AGGREGATION_RESPONSE_PAYLOAD: u32 = 0x202;
    pub const LEGACY_AGGREGATION_ERROR_PAYLOAD: u32 = 0x203;

    pub const LEGACY_EXTEND: u32 = 0x300;
    pub const LEGACY_EXTEND_REQUEST_PAYLOAD: u32 = 0x301;
    pub const LEGACY_EXTEND_RESPONSE_PAYLOAD: u32 = 0x302;
    pub const LEGACY_EXTEND_ERROR_PAYLOAD: u32 = 0x303;
}

/// Fields shared by response and error payloads.
pub mod payload {
    pub const REQUEST_ID: u32 = 0x1;
    pub const STATUS: u32 = 0x4;
    pub const ERROR_MESSAGE: u32 = 0x5;
}

/// Aggregation request payload.
pub mod aggregation_request {
    pub const REQUEST_HASH: u32 = 0x2;
    pub const REQUEST_LEVEL: u32 = 0x3;
}

/// Aggregation response payload.
pub mod aggregation_response {
    pub const CONFIG: u32 = 0x10;
    pub const REQUEST_ACKNOWLEDGMENT: u32 = 0x11;
}

/// Extend request payload.
pub mod extend_request {
    pub const AGGREGATION_TIME: u32 = 0x2;
    pub const PUBLICATION_TIME: u32 = 0x3;
}

/// Extend response payload.
pub mod extend_response {
    pub const LEGACY_LAST_TIME: u32 = 0x10;
    pub const LAST_TIME: u32 = 0x12;
}
