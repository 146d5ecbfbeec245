//! Fixtures shared by the unit tests.

use ksi_crypto::{DataHash, HashAlgorithm, OID_SHA256_WITH_RSA};
use ksi_signature::{
    AggregationHashChain, AggregationLink, CalendarAuthenticationRecord, CalendarHashChain,
    CalendarLink, CertificateRecord, LinkDirection, Metadata, PublicationData, PublicationRecord,
    PublicationsFile, PublicationsFileHeader, SiblingData, Signature, SignatureData,
};

pub const AGGREGATION_TIME: u64 = 100;
pub const CERTIFICATE_ID: [u8; 2] = [7, 7];

pub fn make_hash(byte: u8) -> DataHash {
    DataHash::new(HashAlgorithm::Sha2_256, vec![byte; 32]).unwrap()
}

/// Index [3, 5]: shape of [Left, Right] is 0b101.
pub fn lower_chain(input: DataHash) -> AggregationHashChain {
    AggregationHashChain::new(
        AGGREGATION_TIME,
        vec![3, 5],
        input,
        HashAlgorithm::Sha2_256,
        vec![
            AggregationLink::new(
                LinkDirection::Left,
                0,
                SiblingData::Metadata(Metadata::new("user", None, None, None)),
            ),
            AggregationLink::new(LinkDirection::Right, 0, SiblingData::Hash(make_hash(3))),
        ],
    )
    .unwrap()
}

/// Index [3]: shape of [Left] is 0b11.
pub fn upper_chain(input: DataHash) -> AggregationHashChain {
    AggregationHashChain::new(
        AGGREGATION_TIME,
        vec![3],
        input,
        HashAlgorithm::Sha2_256,
        vec![AggregationLink::new(LinkDirection::Left, 0, SiblingData::Hash(make_hash(4)))],
    )
    .unwrap()
}

pub fn sample_chains() -> Vec<AggregationHashChain> {
    let lower = lower_chain(make_hash(1));
    let upper = upper_chain(lower.own_output_hash().unwrap().hash);
    vec![lower, upper]
}

/// Two aggregation chains over `make_hash(1)`, no calendar chain.
pub fn sample_signature() -> Signature {
    Signature::from_parts(sample_chains(), None, None, None, None, None).unwrap()
}

/// Link directions, leaf first, of a calendar chain registering
/// `aggregation_time` in a calendar published at `publication_time`.
pub fn calendar_directions(aggregation_time: u64, publication_time: u64) -> Vec<LinkDirection> {
    let mut directions = Vec::new();
    let (mut r, mut t) = (publication_time, 0u64);
    while r > 0 {
        let high = 1u64 << (63 - r.leading_zeros());
        if aggregation_time >= t + high {
            directions.push(LinkDirection::Right);
            t += high;
            r -= high;
        } else {
            directions.push(LinkDirection::Left);
            r = high - 1;
        }
    }
    directions.reverse();
    directions
}

pub fn calendar_for(signature: &Signature, publication_time: u64) -> CalendarHashChain {
    let links = calendar_directions(signature.aggregation_time(), publication_time)
        .into_iter()
        .enumerate()
        .map(|(i, d)| CalendarLink::new(d, make_hash(0x20 + i as u8)))
        .collect();
    CalendarHashChain::new(
        publication_time,
        Some(signature.aggregation_time()),
        signature.aggregation_root().unwrap().hash,
        links,
    )
    .unwrap()
}

pub fn with_calendar(signature: &Signature, publication_time: u64) -> Signature {
    Signature::from_parts(
        signature.aggregation_chains().to_vec(),
        Some(calendar_for(signature, publication_time)),
        None,
        None,
        None,
        None,
    )
    .unwrap()
}

pub fn auth_record_for(calendar: &CalendarHashChain) -> CalendarAuthenticationRecord {
    CalendarAuthenticationRecord::new(
        calendar.publication_data(),
        SignatureData::new(OID_SHA256_WITH_RSA, vec![0xAB; 16], CERTIFICATE_ID.to_vec(), None),
    )
}

/// Calendar chain at `AGGREGATION_TIME` plus a calendar authentication record.
pub fn with_auth_record(signature: &Signature) -> Signature {
    let calendar = calendar_for(signature, AGGREGATION_TIME);
    let record = auth_record_for(&calendar);
    Signature::from_parts(
        signature.aggregation_chains().to_vec(),
        Some(calendar),
        Some(record),
        None,
        None,
        None,
    )
    .unwrap()
}

pub fn extended(signature: &Signature, publication_time: u64) -> Signature {
    signature
        .extend(calendar_for(signature, publication_time), None)
        .unwrap()
}

pub fn file_record(publication: PublicationData) -> PublicationRecord {
    PublicationRecord::new(0x703, publication, vec![], vec![])
}

pub fn publications_file(publications: Vec<PublicationData>) -> PublicationsFile {
    let bytes = PublicationsFile::build(
        PublicationsFileHeader {
            version: 2,
            creation_time: 1_000,
            repository_uri: None,
        },
        vec![CertificateRecord::new(CERTIFICATE_ID.to_vec(), vec![0x30, 0x82])],
        publications.into_iter().map(file_record).collect(),
        vec![0xAA; 8],
    )
    .unwrap();
    PublicationsFile::parse(&bytes).unwrap()
}

#[test]
fn test_calendar_directions_register_aggregation_time() {
    let signature = sample_signature();
    for publication_time in [100, 101, 200, 4096, 1_000_000] {
        let calendar = calendar_for(&signature, publication_time);
        assert_eq!(calendar.registration_time(), AGGREGATION_TIME);
    }
}
