//! Criterion benchmarks for tree induction, naive credal classification
//! and the pairwise dominance test.
extern crate credal;
#[macro_use]
extern crate criterion;
extern crate ndarray;
extern crate pcg_rand;
extern crate rand;

use criterion::{black_box, Criterion};
use ndarray::prelude::*;
use pcg_rand::Pcg32;
use rand::{Rng, SeedableRng};

use credal::classify::*;
use credal::data::Dataset;
use credal::dominance::{CirTest, FeatureCounts, MarginalCounts, PairCounts};
use credal::imprecise::{self, EntropyEvaluator};
use credal::tree::TreeBuilder;

fn generate_data(n: usize, d: usize, n_values: usize, n_classes: usize, seed: u64) -> Dataset {
    let mut rng = Pcg32::seed_from_u64(seed);

    let labels = Array::from_iter((0..n).map(|_| rng.gen_range(0..n_classes)));
    // The first feature agrees with the label most of the time.
    let features = Array::from_shape_fn((n, d), |(i, j)| {
        if j == 0 && rng.gen_bool(0.8) {
            labels[i] % n_values
        } else {
            rng.gen_range(0..n_values)
        }
    });
    Dataset::new(features, labels, vec![n_values; d], n_classes).unwrap()
}

fn bench_tree_fit(c: &mut Criterion) {
    let data = generate_data(1000, 8, 4, 3, 0);

    for &(name, ref criterion) in &[("idm", imprecise::Criterion::Idm),
                                    ("a-npi-m", imprecise::Criterion::ANpiM)] {
        let builder = TreeBuilder::new(EntropyEvaluator::new(criterion.clone(), 1.).unwrap());
        c.bench_function(&format!("tree_fit_{}", name), |b| {
            b.iter(|| black_box(builder.fit(&data).unwrap()))
        });
    }
}

fn bench_ncc_classify(c: &mut Criterion) {
    let data = generate_data(1000, 8, 4, 3, 1);
    let mut ncc = NaiveCredalClassifier::new(1.).unwrap();
    ncc.train(&data).unwrap();
    let record = data.record(0);

    c.bench_function("ncc_classify", |b| {
        b.iter(|| black_box(ncc.classify(&record).unwrap()))
    });
}

fn bench_cir_infimum(c: &mut Criterion) {
    let test = CirTest::new(2.).unwrap();
    let counts = PairCounts {
        alpha: 40.,
        beta: 35.,
        complete: (0..10).map(|f| FeatureCounts { gamma: 10. + f as f64, delta: 12. })
                         .collect(),
        partial: vec![MarginalCounts { gamma: 9., delta: 8., gamma_tilde: 38., delta_tilde: 30. }],
    };

    c.bench_function("cir_infimum", |b| {
        b.iter(|| black_box(test.infimum(&counts)))
    });
}

criterion_group!(benches, bench_tree_fit, bench_ncc_classify, bench_cir_infimum);
criterion_main!(benches);
