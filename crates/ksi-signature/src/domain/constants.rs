//! TLV type numbers of signature and publications file structures.

#![allow(missing_docs)]

/// KSI signature.
pub mod signature {
    pub const TAG_TYPE: u32 = 0x800;
    /// Children of these types belong to a signature.
    pub const CHILD_RANGE: std::ops::Range<u32> = 0x801..0x900;
}

/// Aggregation hash chain.
pub mod aggregation_chain {
    pub const TAG_TYPE: u32 = 0x801;
    pub const AGGREGATION_TIME: u32 = 0x2;
    pub const CHAIN_INDEX: u32 = 0x3;
    pub const INPUT_DATA: u32 = 0x4;
    pub const INPUT_HASH: u32 = 0x5;
    pub const ALGORITHM: u32 = 0x6;
    pub const LEFT_LINK: u32 = 0x7;
    pub const RIGHT_LINK: u32 = 0x8;
}

/// Aggregation hash chain link.
pub mod link {
    pub const LEVEL_CORRECTION: u32 = 0x1;
    pub const SIBLING_HASH: u32 = 0x2;
    pub const LEGACY_ID: u32 = 0x3;
    pub const METADATA: u32 = 0x4;
}

/// Metadata leaf.
pub mod metadata {
    pub const CLIENT_ID: u32 = 0x1;
    pub const MACHINE_ID: u32 = 0x2;
    pub const SEQUENCE_NUMBER: u32 = 0x3;
    pub const REQUEST_TIME: u32 = 0x4;
    pub const PADDING: u32 = 0x1E;
}

/// Calendar hash chain.
pub mod calendar_chain {
    pub const TAG_TYPE: u32 = 0x802;
    pub const PUBLICATION_TIME: u32 = 0x1;
    pub const AGGREGATION_TIME: u32 = 0x2;
    pub const INPUT_HASH: u32 = 0x5;
    pub const LEFT_LINK: u32 = 0x7;
    pub const RIGHT_LINK: u32 = 0x8;
}

/// Publication data.
pub mod publication_data {
    pub const TAG_TYPE: u32 = 0x10;
    pub const PUBLICATION_TIME: u32 = 0x2;
    pub const PUBLICATION_HASH: u32 = 0x4;
}

/// Publication record.
pub mod publication_record {
    pub const SIGNATURE_TAG_TYPE: u32 = 0x803;
    pub const PUBLICATIONS_FILE_TAG_TYPE: u32 = 0x703;
    pub const PUBLICATION_REFERENCE: u32 = 0x9;
    pub const REPOSITORY_URI: u32 = 0xA;
}

/// Aggregation authentication record.
pub mod aggregation_auth_record {
    pub const TAG_TYPE: u32 = 0x804;
    pub const AGGREGATION_TIME: u32 = 0x2;
    pub const CHAIN_INDEX: u32 = 0x3;
    pub const INPUT_HASH: u32 = 0x5;
}

/// Calendar authentication record.
pub mod calendar_auth_record {
    pub const TAG_TYPE: u32 = 0x805;
}

/// PKI signature data.
pub mod signature_data {
    pub const TAG_TYPE: u32 = 0xB;
    pub const SIGNATURE_TYPE: u32 = 0x1;
    pub const SIGNATURE_VALUE: u32 = 0x2;
    pub const CERTIFICATE_ID: u32 = 0x3;
    pub const CERTIFICATE_REPOSITORY_URI: u32 = 0x4;
}

/// RFC 3161 legacy record.
pub mod rfc3161 {
    pub const TAG_TYPE: u32 = 0x806;
    pub const AGGREGATION_TIME: u32 = 0x2;
    pub const CHAIN_INDEX: u32 = 0x3;
    pub const INPUT_HASH: u32 = 0x5;
    pub const TST_INFO_PREFIX: u32 = 0x10;
    pub const TST_INFO_SUFFIX: u32 = 0x11;
    pub const TST_INFO_ALGORITHM: u32 = 0x12;
    pub const SIGNED_ATTR_PREFIX: u32 = 0x13;
    pub const SIGNED_ATTR_SUFFIX: u32 = 0x14;
    pub const SIGNED_ATTR_ALGORITHM: u32 = 0x15;
}

/// Publications file.
pub mod publications_file {
    pub const MAGIC: &[u8; 8] = b"KSIPUBLF";
    pub const HEADER: u32 = 0x701;
    pub const CERTIFICATE_RECORD: u32 = 0x702;
    pub const CMS_SIGNATURE: u32 = 0x704;

    pub const HEADER_VERSION: u32 = 0x1;
    pub const HEADER_CREATION_TIME: u32 = 0x2;
    pub const HEADER_REPOSITORY_URI: u32 = 0x3;

    pub const CERTIFICATE_ID: u32 = 0x1;
    pub const X509_CERTIFICATE: u32 = 0x2;
}
