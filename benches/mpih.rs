// SPDX-License-Identifier: Apache-2.0

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mpih::{ct_mul, ct_mul_1, ct_sqr, LimbType};
use std::hint::black_box;

const SIZES: [usize; 4] = [4, 16, 32, 64];

// Deterministic, dense limb patterns. The kernel's timing doesn't depend on the values anyway.
fn test_limbs(nlimbs: usize, seed: LimbType) -> Vec<LimbType> {
    (0..nlimbs as LimbType)
        .map(|i| (i ^ seed).wrapping_mul(0x9e3779b9).rotate_left(7) | 1)
        .collect()
}

fn bench_mul_1(c: &mut Criterion) {
    let mut group = c.benchmark_group("mul_1");
    for nlimbs in SIZES {
        group.throughput(Throughput::Elements(nlimbs as u64));
        let op0 = test_limbs(nlimbs, 1);
        let mut result = vec![0; nlimbs];
        group.bench_with_input(BenchmarkId::from_parameter(nlimbs), &op0, |b, op0| {
            b.iter(|| ct_mul_1(&mut result, black_box(op0), black_box(!0)))
        });
    }
    group.finish();
}

fn bench_mul_sqr(c: &mut Criterion) {
    let mut group = c.benchmark_group("mul_vs_sqr");
    for nlimbs in SIZES {
        let op0 = test_limbs(nlimbs, 3);
        let op1 = test_limbs(nlimbs, 5);
        let mut result = vec![0; 2 * nlimbs];
        group.bench_with_input(BenchmarkId::new("mul", nlimbs), &nlimbs, |b, _| {
            b.iter(|| ct_mul(&mut result, black_box(&op0), black_box(&op1)))
        });
        group.bench_with_input(BenchmarkId::new("sqr", nlimbs), &nlimbs, |b, _| {
            b.iter(|| ct_sqr(&mut result, black_box(&op0)))
        });
    }
    group.finish();
}

criterion_group!(mpih_bench, bench_mul_1, bench_mul_sqr);
criterion_main!(mpih_bench);
