//! Benchmarks for canonical ids, signing and the gift wrap pipeline.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use veil_core::{EventKind, Keypair, Tag, UnsignedEvent};
use veil_seal::{unwrap, wrap};

// =============================================================================
// Test Data Generation
// =============================================================================

fn sample_event(keypair: &Keypair, content_len: usize) -> UnsignedEvent {
    UnsignedEvent::new(
        keypair.public_key(),
        1_700_000_000,
        EventKind::LocationMessage,
        vec![Tag::geohash("u4pruydq"), Tag::nickname("bench")],
        "é\"x\n".repeat(content_len / 4),
    )
}

// =============================================================================
// Canonical Id Benchmarks
// =============================================================================

fn bench_event_id(c: &mut Criterion) {
    let keypair = Keypair::generate();
    let mut group = c.benchmark_group("event_id");

    for size in [0usize, 256, 4096] {
        let event = sample_event(&keypair, size);
        group.throughput(Throughput::Bytes(event.content.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &event, |b, event| {
            b.iter(|| black_box(event.id()));
        });
    }

    group.finish();
}

fn bench_sign(c: &mut Criterion) {
    let keypair = Keypair::generate();
    let event = sample_event(&keypair, 256);

    c.bench_function("sign_event", |b| {
        b.iter(|| black_box(event.clone().sign(&keypair)));
    });
}

// =============================================================================
// Gift Wrap Benchmarks
// =============================================================================

fn bench_gift_wrap(c: &mut Criterion) {
    let alice = Keypair::generate();
    let bob = Keypair::generate();
    let mut group = c.benchmark_group("gift_wrap");

    group.bench_function("wrap", |b| {
        b.iter(|| black_box(wrap("benchmark message", &alice, &bob.public_key())));
    });

    let gift = wrap("benchmark message", &alice, &bob.public_key()).expect("wrap");
    group.bench_function("unwrap", |b| {
        b.iter(|| black_box(unwrap(&gift, &bob)));
    });

    group.finish();
}

criterion_group!(benches, bench_event_id, bench_sign, bench_gift_wrap);
criterion_main!(benches);
