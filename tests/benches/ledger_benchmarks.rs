//! # CT Ledger Benchmarks
//!
//! | Path | Operation |
//! |------|-----------|
//! | Submission | Alert evaluation, five encryptions |
//! | Callback | Attestation verification, batch reduction |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ct_crypto::AttestationKeyPair;
use ct_ledger::{
    evaluate, floor_average, reduce_batch, AlertThresholds, AttestationVerifier, CipherBackend,
    DecryptionProof, Ed25519AttestationVerifier, InMemoryFheRuntime,
};
use std::time::Duration;

// ============================================================================
// Submission path
// ============================================================================

fn bench_submission_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("submission");
    let thresholds = AlertThresholds::default();
    let runtime = InMemoryFheRuntime::new();

    group.bench_function("evaluate_alerts", |b| {
        b.iter(|| black_box(evaluate(black_box(&[130, 150, 0, 150, 0]), &thresholds)))
    });

    group.bench_function("encrypt_reading", |b| {
        b.iter(|| {
            for value in [75u64, 120, 36, 90, 97] {
                black_box(runtime.encrypt(value).ok());
            }
        })
    });

    group.finish();
}

// ============================================================================
// Callback path
// ============================================================================

fn bench_callback_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("callback");
    group.measurement_time(Duration::from_secs(5));

    let oracle = AttestationKeyPair::from_seed([9u8; 32]);
    let verifier = Ed25519AttestationVerifier::new(oracle.public_key());
    let request_id = uuid::Uuid::new_v4();

    for reporters in [10usize, 100, 1_000] {
        let batch: Vec<u64> = (0..reporters * 3).map(|i| 60 + (i as u64 % 80)).collect();
        let proof = DecryptionProof(
            oracle
                .attest_batch(request_id.as_bytes(), &batch)
                .as_bytes()
                .to_vec(),
        );

        group.throughput(Throughput::Elements(reporters as u64));
        group.bench_with_input(
            BenchmarkId::new("verify_attestation", reporters),
            &batch,
            |b, batch| b.iter(|| black_box(verifier.verify(&request_id, batch, &proof))),
        );
        group.bench_with_input(
            BenchmarkId::new("reduce_batch", reporters),
            &batch,
            |b, batch| {
                b.iter(|| {
                    let sums = reduce_batch(black_box(batch), reporters, 3).ok();
                    sums.map(|s| {
                        s.iter()
                            .map(|sum| floor_average(*sum, reporters))
                            .collect::<Vec<_>>()
                    })
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_submission_path, bench_callback_path);
criterion_main!(benches);
