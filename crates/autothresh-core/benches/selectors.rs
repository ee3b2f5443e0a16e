use autothresh_core::{compute_bin, Histogram, ThresholdMethod};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Two broad modes spread over most of the 16-bit range.
fn sixteen_bit_counts() -> Vec<u64> {
    (0..65536usize)
        .map(|i| {
            let x = i as f64;
            let a = (-(x - 12_000.0).powi(2) / (2.0 * 3000.0f64.powi(2))).exp();
            let b = (-(x - 41_000.0).powi(2) / (2.0 * 6000.0f64.powi(2))).exp();
            (400.0 * a + 150.0 * b).round() as u64
        })
        .collect()
}

fn bench_selectors(c: &mut Criterion) {
    let Some(hist) = Histogram::from_counts(sixteen_bit_counts()).bracket() else {
        return;
    };
    let mut group = c.benchmark_group("select_16bit");
    group.sample_size(10);
    for method in ThresholdMethod::ALL {
        // Huang is quadratic in the bin count; Huang2 covers the 16-bit case.
        if method.is_manual() || method == ThresholdMethod::Huang {
            continue;
        }
        group.bench_with_input(BenchmarkId::from_parameter(method), &hist, |b, h| {
            b.iter(|| compute_bin(method, black_box(h.counts())))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_selectors);
criterion_main!(benches);
