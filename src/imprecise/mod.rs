//! Module defining imprecise probability models.
//!
//! An `IntervalModel` turns a vector of class frequencies into one
//! `CredalInterval` per class; an `EntropyEvaluator` scores a frequency
//! vector by the entropy of the least informative distribution in that
//! credal set, and is the split criterion of credal decision trees.
pub mod interval;
pub mod entropy;

pub use self::interval::{CredalInterval, IntervalModel, ModelKind};
pub use self::entropy::{Criterion, EntropyEvaluator};
