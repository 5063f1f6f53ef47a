use criterion::{criterion_group, criterion_main, Criterion};
use encoder_rs::config::EncoderConfig;
use encoder_rs::init::{seeded_rng, uniform};
use encoder_rs::models::Encoder;
use encoder_rs::nn::{scaled_dot_product, MultiHeadAttention};
use encoder_rs::tensor::Matrix;
use std::hint::black_box;

fn benchmark_attention(c: &mut Criterion) {
    let seq_len = 64;
    let num_heads = 4;
    let model_dim = 128;
    let head_dim = model_dim / num_heads;

    // Use unwrap() freely as this is a benchmark setup
    let mut rng = seeded_rng(0);
    let x: Matrix = uniform([seq_len, model_dim], 1.0, &mut rng).unwrap();
    let q: Matrix = uniform([seq_len, head_dim], 1.0, &mut rng).unwrap();
    let k: Matrix = uniform([seq_len, head_dim], 1.0, &mut rng).unwrap();
    let v: Matrix = uniform([seq_len, head_dim], 1.0, &mut rng).unwrap();
    let mha = MultiHeadAttention::<f32>::random(model_dim, num_heads, true, &mut rng).unwrap();

    let mut group = c.benchmark_group("attention");

    group.bench_function("single_head", |b| {
        b.iter(|| scaled_dot_product(black_box(&q), black_box(&k), black_box(&v), false).unwrap())
    });

    group.bench_function("single_head_causal", |b| {
        b.iter(|| scaled_dot_product(black_box(&q), black_box(&k), black_box(&v), true).unwrap())
    });

    group.bench_function("multi_head", |b| {
        b.iter(|| mha.forward_projected(black_box(&x), false).unwrap())
    });

    group.finish();
}

fn benchmark_encoder(c: &mut Criterion) {
    let config = EncoderConfig::reference();
    let tokens: Vec<usize> = (0..config.seq_len).map(|i| i * 37 % config.vocab_size).collect();
    let encoder = Encoder::<f32>::random(config, &mut seeded_rng(0)).unwrap();

    c.bench_function("encoder_reference_forward", |b| {
        b.iter(|| encoder.forward(black_box(&tokens), false).unwrap())
    });
}

criterion_group!(benches, benchmark_attention, benchmark_encoder);
criterion_main!(benches);
