//! # KSI Client Benchmarks
//!
//! Hot paths of a verifying client, measured on the captured signature:
//!
//! | Group | Operation |
//! |-------|-----------|
//! | tlv | decode and re-encode the response payload |
//! | signature | parse, aggregation root |
//! | verification | internal policy |
//! | pdu | HMAC over a response, full response parse |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use ksi_crypto::{hmac, HashAlgorithm};
use ksi_service::{Pdu, PduKind, PduVersion, ServiceConfig};
use ksi_signature::Signature;
use ksi_tlv::decode_all;
use ksi_tests::fixtures::{aggregation_response_pdu, document_hash, response_children, signature};
use ksi_verification::{Policy, VerificationContext};

// ============================================================================
// TLV
// ============================================================================

fn bench_tlv(c: &mut Criterion) {
    let mut group = c.benchmark_group("tlv");
    let bytes: Vec<u8> = response_children()
        .iter()
        .flat_map(|t| t.encode().unwrap())
        .collect();
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("decode_response_payload", |b| {
        b.iter(|| black_box(decode_all(black_box(&bytes)).unwrap()))
    });

    let tags = decode_all(&bytes).unwrap();
    group.bench_function("encode_response_payload", |b| {
        b.iter(|| {
            for tag in &tags {
                black_box(tag.encode().unwrap());
            }
        })
    });

    group.finish();
}

// ============================================================================
// Signature
// ============================================================================

fn bench_signature(c: &mut Criterion) {
    let mut group = c.benchmark_group("signature");
    let encoded = signature().encode().unwrap();

    group.bench_function("parse", |b| {
        b.iter(|| black_box(Signature::from_bytes(black_box(&encoded)).unwrap()))
    });

    let parsed = signature();
    group.bench_function("aggregation_root", |b| {
        b.iter(|| black_box(parsed.aggregation_root().unwrap()))
    });

    group.finish();
}

// ============================================================================
// Verification
// ============================================================================

fn bench_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("verification");
    group.measurement_time(Duration::from_secs(10));

    let signature = signature();
    let policy = Policy::internal();
    group.bench_function("internal_policy", |b| {
        b.iter(|| {
            let context = VerificationContext::builder()
                .signature(&signature)
                .document_hash(document_hash())
                .build()
                .unwrap();
            black_box(policy.evaluate(&context).unwrap())
        })
    });

    group.finish();
}

// ============================================================================
// PDU
// ============================================================================

fn bench_pdu(c: &mut Criterion) {
    let mut group = c.benchmark_group("pdu");

    for size in [64usize, 1024, 4096] {
        let data = vec![0x5Au8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("hmac_sha256", size), &data, |b, data| {
            b.iter(|| black_box(hmac(HashAlgorithm::Sha2_256, b"test-key", data).unwrap()))
        });
    }

    for version in [PduVersion::V1, PduVersion::V2] {
        let config = ServiceConfig {
            pdu_version: version,
            ..ServiceConfig::for_testing()
        };
        let bytes = aggregation_response_pdu(&config, 1);
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("parse_and_authenticate", format!("{:?}", version)),
            &bytes,
            |b, bytes| {
                b.iter(|| {
                    let pdu = Pdu::from_bytes(bytes, PduKind::Aggregation, version).unwrap();
                    black_box(pdu.verify_mac(&config.login_key).unwrap())
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_tlv,
    bench_signature,
    bench_verification,
    bench_pdu,
);

criterion_main!(benches);
