//! # Shared Fixtures
//!
//! Everything here derives from one aggregation response returned by a
//! KSI gateway in April 2015: three aggregation chains, a calendar chain
//! and a calendar authentication record, without a status field.

use ksi_crypto::{hash, DataHash, HashAlgorithm};
use ksi_service::domain::constants::payload as pl;
use ksi_service::{
    AggregationResponsePayload, ExtendResponsePayload, Payload, Pdu, PduHeader, PduKind,
    ServiceConfig,
};
use ksi_signature::{
    CalendarHashChain, CertificateRecord, PublicationData, PublicationRecord, PublicationsFile,
    PublicationsFileHeader, Signature,
};
use ksi_tlv::{decode_all, Tag};
use ksi_verification::MockExtender;
use tracing_subscriber::EnvFilter;

/// Value of the 0x202 response payload, hex encoded.
pub const AGGREGATION_RESPONSE_HEX: &str = include_str!("../fixtures/aggregation_response.hex");

/// Hash the gateway was asked to sign.
pub const DOCUMENT_HASH_HEX: &str =
    "0111a700b0c8066c47ecba05ed37bc14dcadb238552d86c659342d1d7e87b8772d";

/// Root of the three aggregation chains, input of the calendar chain.
pub const AGGREGATION_ROOT_HEX: &str =
    "01ad56fc341dfb5779335a3412c0abee8a67a5035325ff01f8d393559286f77872";

/// Calendar chain output, also the hash in the authentication record.
pub const CALENDAR_OUTPUT_HEX: &str =
    "0100423db0da0737c5ab475549ca0446493cca7e6cb2ce71d6f92756f697f41b6d";

/// 2015-04-02 08:43:05 UTC.
pub const AGGREGATION_TIME: u64 = 1_427_965_385;

/// 2015-04-03 00:00:00 UTC.
pub const PUBLICATION_TIME: u64 = 1_428_019_200;

/// Request id the gateway echoed back.
pub const RESPONSE_REQUEST_ID: u64 = 0x96_314a_aea3_651e;

/// Route tracing output through the test writer; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Parse an imprint given in hex.
pub fn imprint(hex_imprint: &str) -> DataHash {
    DataHash::from_imprint(&hex::decode(hex_imprint).expect("fixture hex")).expect("fixture imprint")
}

/// SHA-256 of `data`, for hashes that must differ from every fixture value.
pub fn other_hash(data: &[u8]) -> DataHash {
    hash(HashAlgorithm::Sha2_256, data).expect("sha-256 is available")
}

/// All children of the response payload, request id included.
pub fn response_children() -> Vec<Tag> {
    let bytes = hex::decode(AGGREGATION_RESPONSE_HEX.trim()).expect("fixture hex");
    decode_all(&bytes).expect("fixture TLV")
}

/// Signature assembled from the response.
pub fn signature() -> Signature {
    Signature::from_response_children(&response_children()).expect("fixture signature")
}

/// The signed document hash.
pub fn document_hash() -> DataHash {
    imprint(DOCUMENT_HASH_HEX)
}

/// Calendar chain carried by the signature.
pub fn calendar_chain() -> CalendarHashChain {
    signature()
        .calendar_chain()
        .cloned()
        .expect("fixture has a calendar chain")
}

/// Publication the calendar chain leads to.
pub fn publication() -> PublicationData {
    PublicationData::new(PUBLICATION_TIME, imprint(CALENDAR_OUTPUT_HEX))
}

/// Publications file listing `publications` and the certificate that
/// signed the authentication record. The CMS signature is a placeholder.
pub fn publications_file(publications: Vec<PublicationData>) -> PublicationsFile {
    let certificate_id = signature()
        .calendar_authentication_record()
        .expect("fixture has an authentication record")
        .signature_data()
        .certificate_id()
        .to_vec();
    publications_file_with_certificates(
        publications,
        vec![CertificateRecord::new(certificate_id, vec![0x30, 0x82, 0x01, 0x0A])],
    )
}

/// Publications file with explicit certificate records.
pub fn publications_file_with_certificates(
    publications: Vec<PublicationData>,
    certificates: Vec<CertificateRecord>,
) -> PublicationsFile {
    let bytes = publications_file_bytes(publications, certificates);
    PublicationsFile::parse(&bytes).expect("publications file parses")
}

/// Encoded publications file, `KSIPUBLF` magic included.
pub fn publications_file_bytes(
    publications: Vec<PublicationData>,
    certificates: Vec<CertificateRecord>,
) -> Vec<u8> {
    PublicationsFile::build(
        PublicationsFileHeader {
            version: 2,
            creation_time: PUBLICATION_TIME + 86_400,
            repository_uri: Some("http://verify.guardtime.com/ksi-publications.bin".to_string()),
        },
        certificates,
        publications
            .into_iter()
            .map(|p| PublicationRecord::new(0x703, p, vec![], vec![]))
            .collect(),
        vec![0xAA; 16],
    )
    .expect("publications file encodes")
}

/// Extender answering requests for `PUBLICATION_TIME` with the fixture's
/// own calendar chain.
pub fn extender() -> MockExtender {
    MockExtender::with_response(Some(PUBLICATION_TIME), calendar_chain())
}

// =============================================================================
// Gateway responses
// =============================================================================

/// Encoded aggregation response PDU carrying the fixture's signature parts.
pub fn aggregation_response_pdu(config: &ServiceConfig, request_id: u64) -> Vec<u8> {
    let types = PduKind::Aggregation.types(config.pdu_version);
    let mut children = vec![Tag::integer(pl::REQUEST_ID, false, false, request_id)];
    children.extend(
        response_children()
            .into_iter()
            .filter(|t| t.tag_type() != pl::REQUEST_ID),
    );
    let tag = Tag::composite(types.response_payload, false, false, children);
    let payload = AggregationResponsePayload::from_tag(&tag).expect("response payload");
    response_pdu(config, PduKind::Aggregation, Payload::AggregationResponse(payload))
}

/// Encoded extend response PDU carrying `chain`.
pub fn extend_response_pdu(
    config: &ServiceConfig,
    request_id: u64,
    chain: &CalendarHashChain,
) -> Vec<u8> {
    let types = PduKind::Extension.types(config.pdu_version);
    let tag = Tag::composite(
        types.response_payload,
        false,
        false,
        vec![
            Tag::integer(pl::REQUEST_ID, false, false, request_id),
            Tag::integer(pl::STATUS, false, false, 0),
            chain.tag().clone(),
        ],
    );
    let payload = ExtendResponsePayload::from_tag(&tag).expect("extend payload");
    response_pdu(config, PduKind::Extension, Payload::ExtendResponse(payload))
}

fn response_pdu(config: &ServiceConfig, kind: PduKind, payload: Payload) -> Vec<u8> {
    Pdu::response(
        kind,
        config.pdu_version,
        PduHeader::new(config.login_id.clone(), config.instance_id, None),
        vec![payload],
        config.mac_algorithm,
        &config.login_key,
    )
    .and_then(|pdu| pdu.encode())
    .expect("response PDU encodes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_parses() {
        let signature = signature();
        assert_eq!(signature.input_hash(), &document_hash());
        assert_eq!(signature.aggregation_time(), AGGREGATION_TIME);
        assert_eq!(calendar_chain().publication_time(), PUBLICATION_TIME);
    }

    #[test]
    fn test_response_request_id() {
        let id = response_children()
            .iter()
            .find(|t| t.tag_type() == pl::REQUEST_ID)
            .map(|t| t.as_u64().unwrap());
        assert_eq!(id, Some(RESPONSE_REQUEST_ID));
    }
}
