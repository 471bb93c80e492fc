// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use classgroup_vdf::class_group::discriminant::Discriminant;
use classgroup_vdf::class_group::QuadraticForm;
use classgroup_vdf::vdf::wesolowski::WesolowskisVDF;
use classgroup_vdf::{Parameter, ParameterizedGroupElement};
use criterion::{criterion_group, criterion_main, Criterion};

fn prove_and_verify(c: &mut Criterion) {
    let iterations = 1000u64;
    let discriminant = Discriminant::from_seed(b"vdf benchmark", 512).unwrap();
    let input = QuadraticForm::generator(&discriminant);

    let mut output = input.clone();
    for _ in 0..iterations {
        output = output.double();
    }

    let vdf = WesolowskisVDF::new(discriminant, iterations);
    let proof = vdf.prove(&input, &output).unwrap();

    let mut group = c.benchmark_group("Wesolowski");
    group.bench_function("Prove/512", |b| b.iter(|| vdf.prove(&input, &output)));
    group.bench_function("Verify/512", |b| {
        b.iter(|| vdf.verify(&input, &output, &proof))
    });
    group.finish();
}

criterion_group! {
name = vdf_benchmarks;
config = Criterion::default().sample_size(10);
targets = prove_and_verify,
}

criterion_main!(vdf_benchmarks);
