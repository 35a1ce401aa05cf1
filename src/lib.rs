//! The credal crate.
//!
//! A crate implementing credal (imprecise-probability) classifiers.
//! Rather than a single posterior distribution, a credal classifier keeps
//! a set of distributions compatible with a small-sample uncertainty
//! model (the Imprecise Dirichlet Model, or Nonparametric Predictive
//! Inference), and answers each query with the set of classes that no
//! other class dominates over that whole set.
//!
//! # Components
//! * `imprecise`: probability intervals and imprecise entropy.
//! * `tree`: credal decision trees, split on imprecise information gain.
//! * `dominance`: interval, risk, graded and pairwise (CIR) dominance.
//! * `classify`: tree, naive and lazy local credal classifiers.
//! * `stats`: accuracy measures for set-valued predictions.
//!
//! # Examples
//!
//! Train a credal decision tree with IDM entropy, `s=1`, and classify two
//! records. A leaf with plenty of evidence gives a single class, a leaf
//! where the classes are balanced gives both.
//!
//! ```
//! #[macro_use(array)]
//! extern crate ndarray;
//! extern crate credal;
//!
//! # fn main() {
//! use credal::classify::*;
//! use credal::config::TreeConfig;
//! use credal::data::Dataset;
//!
//! let mut tree = TreeConfig::default().build()
//!                                     .expect("Invalid configuration");
//! let data = Dataset::new(array![[0], [0], [0], [0], [0], [0], [0], [0], [0], [0],
//!                                [1], [1], [1], [1], [1], [1], [1], [1], [1], [1]],
//!                         array![0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
//!                                0, 1, 0, 1, 0, 1, 0, 1, 0, 1],
//!                         vec![2], 2)
//!                    .expect("Invalid dataset");
//!
//! tree.train(&data)
//!     .expect("Failed to train model");
//! let determinate = tree.classify(&array![0].view())
//!                       .expect("Failed to predict");
//! let indeterminate = tree.classify(&array![1].view())
//!                         .expect("Failed to predict");
//! assert!(determinate.classes() == &[0]);
//! assert!(indeterminate.classes() == &[0, 1]);
//! # }
//! ```

extern crate rand;
extern crate pcg_rand;
extern crate itertools;
extern crate ordered_float;
extern crate csv;
extern crate serde;
extern crate serde_json;
extern crate thiserror;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate tracing;
#[macro_use]
extern crate ndarray;
#[cfg(test)]
#[macro_use]
extern crate approx;

pub mod error;
pub mod numeric;
pub mod data;
pub mod imprecise;
pub mod tree;
pub mod dominance;
pub mod classify;
pub mod stats;
pub mod config;
pub mod utils;

pub use error::{Error, ErrorKind, LearningResult};
