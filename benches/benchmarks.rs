//! Performance benchmarks for ferro-myvariant
//!
//! Run with: cargo bench
//! Run specific benchmark: cargo bench -- codec

use std::io::Cursor;
use std::num::NonZeroUsize;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ferro_myvariant::batch::{
    chunk, BatchConfig, BatchMode, BatchResponse, BatchRunner, QueryInput,
};
use ferro_myvariant::vcf::HgvsIds;
use ferro_myvariant::format_hgvs;

// =============================================================================
// Codec benchmarks
// =============================================================================

/// Benchmark id generation for each edit class
fn bench_codec(c: &mut Criterion) {
    let variants = vec![
        ("sub", ("1", 35366, "C", "T")),
        ("del", ("1", 10019, "TA", "T")),
        ("del_range", ("MT", 8270, "CACCCCCTCT", "C")),
        ("ins", ("chr2", 17142, "G", "GA")),
        ("delins", ("X", 107930849, "GGA", "C")),
        ("overlap", ("20", 1234567, "GTC", "GTCT")),
        ("overlap_long", ("7", 1000, "ACGTACGTACGTA", "ACGTACGTACGTAGG")),
    ];

    let mut group = c.benchmark_group("codec");

    for (name, variant) in &variants {
        group.bench_with_input(BenchmarkId::new("type", name), variant, |b, v| {
            b.iter(|| format_hgvs(black_box(v.0), black_box(v.1), black_box(v.2), black_box(v.3)))
        });
    }

    group.finish();
}

/// Benchmark decoding a VCF body into ids
fn bench_vcf_decode(c: &mut Criterion) {
    let mut body = String::from("#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n");
    for i in 0..1000u64 {
        body.push_str(&format!("1\t{}\t.\tGTC\tGTCT,G\t.\tPASS\t.\n", 10_000 + i * 7));
    }

    let mut group = c.benchmark_group("vcf");
    group.throughput(Throughput::Elements(2000));
    group.bench_function("decode_1000_lines", |b| {
        b.iter(|| HgvsIds::new(Cursor::new(black_box(body.as_bytes()))).count())
    });
    group.finish();
}

// =============================================================================
// Batching benchmarks
// =============================================================================

/// Benchmark chunking a lazy sequence
fn bench_chunking(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk");

    for size in [10usize, 100, 1000] {
        let step = NonZeroUsize::new(size).unwrap_or(NonZeroUsize::MIN);
        group.throughput(Throughput::Elements(100_000));
        group.bench_with_input(BenchmarkId::new("step", size), &step, |b, step| {
            b.iter(|| chunk(black_box(0..100_000u32), *step).count())
        });
    }

    group.finish();
}

/// Benchmark a full batch run against an in-memory responder
fn bench_batch_run(c: &mut Criterion) {
    let terms: Vec<String> = (0..5000).map(|i| format!("rs{}", i)).collect();

    let mut group = c.benchmark_group("batch");
    group.throughput(Throughput::Elements(terms.len() as u64));
    group.bench_function("querymany_5000", |b| {
        b.iter(|| {
            let config = BatchConfig::new()
                .step(1000)
                .delay(Duration::ZERO)
                .verbose(false)
                .return_all(true);
            BatchRunner::new(config).run(
                BatchMode::Terms,
                QueryInput::from(terms.clone()),
                |batch| {
                    let hits: Vec<String> = batch
                        .iter()
                        .map(|t| format!(r#"{{"query":"{}","_id":"{}"}}"#, t, t))
                        .collect();
                    Ok(BatchResponse {
                        from_cache: false,
                        body: format!("[{}]", hits.join(",")),
                    })
                },
            )
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_codec,
    bench_vcf_decode,
    bench_chunking,
    bench_batch_run,
);

criterion_main!(benches);
