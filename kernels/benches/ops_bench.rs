use criterion::{criterion_group, criterion_main, Criterion};
use encoder_rs_kernels::{cpu_matmul, cpu_softmax_rows, cpu_transpose};
use std::hint::black_box;

fn benchmark_matmul(c: &mut Criterion) {
    let mut group = c.benchmark_group("matmul");
    let sizes = [64, 128, 256];

    for &size in &sizes {
        let lhs_shape = [size, size];
        let rhs_shape = [size, size];
        let lhs_data = vec![1.0f32; size * size];
        let rhs_data = vec![1.0f32; size * size];

        group.bench_function(format!("{}x{}", size, size), |b| {
            b.iter(|| {
                cpu_matmul(
                    black_box(&lhs_data),
                    black_box(&rhs_data),
                    black_box(&lhs_shape),
                    black_box(&rhs_shape),
                )
                .unwrap()
            })
        });
    }
    group.finish();
}

fn benchmark_transpose(c: &mut Criterion) {
    let mut group = c.benchmark_group("transpose");
    let sizes = [128, 512, 1024];

    for &size in &sizes {
        let shape = [size, size];
        let data = vec![1.0f32; size * size];

        group.bench_function(format!("{}x{}", size, size), |b| {
            b.iter(|| cpu_transpose(black_box(&data), black_box(&shape)).unwrap())
        });
    }
    group.finish();
}

fn benchmark_softmax(c: &mut Criterion) {
    let mut group = c.benchmark_group("softmax_rows");
    // Square score matrices, one row per query position.
    let seq_lens = [16, 128, 512];

    for &s in &seq_lens {
        let shape = [s, s];
        let data: Vec<f32> = (0..s * s).map(|i| (i % 13) as f32 * 0.1).collect();

        group.bench_function(format!("{}x{}", s, s), |b| {
            b.iter(|| cpu_softmax_rows(black_box(&data), black_box(&shape)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_matmul, benchmark_transpose, benchmark_softmax);
criterion_main!(benches);
