//! Categorical datasets and the counts built from them.
//!
//! A `Dataset` holds one row of small non-negative feature values per
//! record, plus its class label. Missing values are stored as `MISSING`.
use std::ops::Index;

use ndarray::prelude::*;
use ndarray::Axis;

use error::{Error, LearningResult};


/// Sentinel for a missing feature value.
pub const MISSING: usize = usize::MAX;

/// A categorical training or test set.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Array2<usize>,
    labels: Array1<usize>,
    weights: Option<Array1<f64>>,
    n_values: Vec<usize>,
    n_classes: usize,
}

impl Dataset {
    /// Constructs a dataset, checking that every value is in range.
    ///
    /// # Arguments
    ///
    /// * `features` - Matrix with one record per row; each value is either
    ///                `MISSING` or in `[0, n_values[f])`.
    /// * `labels` - Class label of each record, in `[0, n_classes)`.
    /// * `n_values` - Number of values of each feature.
    /// * `n_classes` - Number of classes.
    ///
    /// # Examples
    ///
    /// ```
    /// #[macro_use(array)]
    /// extern crate ndarray;
    /// extern crate credal;
    ///
    /// # fn main() {
    /// use credal::data::Dataset;
    ///
    /// let data = Dataset::new(array![[0, 1], [1, 1]], array![0, 1],
    ///                         vec![2, 2], 2).expect("valid dataset");
    /// assert!(data.n_records() == 2);
    /// # }
    /// ```
    pub fn new(features: Array2<usize>, labels: Array1<usize>,
               n_values: Vec<usize>, n_classes: usize) -> LearningResult<Dataset> {
        if n_classes == 0 {
            return Err(Error::NoClasses);
        }
        if features.nrows() != labels.len() {
            return Err(Error::ShapeMismatch {
                expected: format!("{} labels", features.nrows()),
                got: format!("{} labels", labels.len()),
            });
        }
        if features.ncols() != n_values.len() {
            return Err(Error::ShapeMismatch {
                expected: format!("{} value counts", features.ncols()),
                got: format!("{} value counts", n_values.len()),
            });
        }

        for (i, (row, &y)) in features.outer_iter().zip(labels.iter()).enumerate() {
            for (f, &v) in row.iter().enumerate() {
                if v != MISSING && v >= n_values[f] {
                    return Err(Error::TrainingValueOutOfRange {
                        record: i,
                        feature: f,
                        value: v,
                        n_values: n_values[f],
                    });
                }
            }
            if y >= n_classes {
                return Err(Error::LabelOutOfRange { record: i, label: y, n_classes });
            }
        }

        Ok(Dataset { features, labels, weights: None, n_values, n_classes })
    }

    /// Constructs a dataset inferring the number of values of each feature
    /// and the number of classes from the largest observed ones.
    pub fn from_observed(features: Array2<usize>, labels: Array1<usize>)
            -> LearningResult<Dataset> {
        let n_values = features.axis_iter(Axis(1))
                               .map(|column| column.iter()
                                                   .filter(|&&v| v != MISSING)
                                                   .max()
                                                   .map_or(0, |&v| v + 1))
                               .collect::<Vec<_>>();
        let n_classes = labels.iter()
                              .max()
                              .map_or(0, |&y| y + 1);

        Dataset::new(features, labels, n_values, n_classes)
    }

    /// Attaches per-record weights; frequency tables then sum weights
    /// rather than records.
    pub fn with_weights(mut self, weights: Array1<f64>) -> LearningResult<Dataset> {
        if weights.len() != self.n_records() {
            return Err(Error::ShapeMismatch {
                expected: format!("{} weights", self.n_records()),
                got: format!("{} weights", weights.len()),
            });
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.) {
            return Err(Error::ShapeMismatch {
                expected: "finite non-negative weights".into(),
                got: "a negative or non-finite weight".into(),
            });
        }
        self.weights = Some(weights);
        Ok(self)
    }

    /// Returns the sub-dataset made of the given records, in order.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: self.features.select(Axis(0), indices),
            labels: self.labels.select(Axis(0), indices),
            weights: self.weights.as_ref().map(|w| w.select(Axis(0), indices)),
            n_values: self.n_values.clone(),
            n_classes: self.n_classes,
        }
    }

    pub fn n_records(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_values(&self) -> &[usize] {
        &self.n_values
    }

    pub fn features(&self) -> ArrayView2<usize> {
        self.features.view()
    }

    pub fn labels(&self) -> ArrayView1<usize> {
        self.labels.view()
    }

    pub fn record(&self, i: usize) -> ArrayView1<usize> {
        self.features.row(i)
    }

    pub fn label(&self, i: usize) -> usize {
        self.labels[i]
    }

    /// Weight of the `i`-th record (1 unless weights were attached).
    pub fn weight(&self, i: usize) -> f64 {
        self.weights.as_ref().map_or(1., |w| w[i])
    }

    /// True if any record has a missing value.
    pub fn has_missing(&self) -> bool {
        self.features.iter().any(|&v| v == MISSING)
    }

    /// Class histogram of the given records.
    pub fn frequencies(&self, indices: &[usize]) -> FrequencyTable {
        let mut table = FrequencyTable::zeros(self.n_classes);
        for &i in indices {
            table.counts[self.labels[i]] += self.weight(i);
        }
        table
    }
}


/// Per-class (possibly weighted) occurrence counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyTable {
    counts: Vec<f64>,
}

impl FrequencyTable {
    /// An all-zero table over `n_classes` classes.
    pub fn zeros(n_classes: usize) -> FrequencyTable {
        FrequencyTable { counts: vec![0.; n_classes] }
    }

    pub fn from_counts(counts: Vec<f64>) -> FrequencyTable {
        FrequencyTable { counts }
    }

    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    pub fn n_classes(&self) -> usize {
        self.counts.len()
    }

    /// Sum of all counts.
    pub fn total(&self) -> f64 {
        self.counts.iter().sum()
    }

    /// True if no (positively weighted) record was counted.
    pub fn is_empty(&self) -> bool {
        self.total() <= 0.
    }
}

impl Index<usize> for FrequencyTable {
    type Output = f64;

    fn index(&self, y: usize) -> &f64 {
        &self.counts[y]
    }
}


/// Misclassification costs: `cost[[i, j]]` is the cost of predicting
/// class `i` when the truth is `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    costs: Array2<f64>,
}

impl CostMatrix {
    /// Validates a square matrix of finite non-negative costs.
    pub fn new(costs: Array2<f64>) -> LearningResult<CostMatrix> {
        if costs.nrows() == 0 {
            return Err(Error::NoClasses);
        }
        if costs.nrows() != costs.ncols() {
            return Err(Error::InvalidCostMatrix {
                reason: format!("expected a square matrix, got {}x{}",
                                costs.nrows(), costs.ncols()),
            });
        }
        if costs.iter().any(|c| !c.is_finite() || *c < 0.) {
            return Err(Error::InvalidCostMatrix {
                reason: "costs must be finite and non-negative".into(),
            });
        }
        Ok(CostMatrix { costs })
    }

    /// The 0-1 loss over `n_classes` classes.
    pub fn zero_one(n_classes: usize) -> CostMatrix {
        let costs = Array2::from_shape_fn((n_classes, n_classes),
                                          |(i, j)| if i == j { 0. } else { 1. });
        CostMatrix { costs }
    }

    pub fn n_classes(&self) -> usize {
        self.costs.nrows()
    }

    /// Costs of predicting class `i`, one per true class.
    pub fn row(&self, i: usize) -> ArrayView1<f64> {
        self.costs.row(i)
    }

    pub fn cost(&self, predicted: usize, truth: usize) -> f64 {
        self.costs[[predicted, truth]]
    }

    /// Mean cost of misclassifying each true class, normalised to
    /// sum to the number of classes. All-zero matrices give unit weights.
    pub fn class_weights(&self) -> Vec<f64> {
        let k = self.n_classes();
        let raw = (0..k).map(|j| (0..k).filter(|&i| i != j)
                                       .map(|i| self.costs[[i, j]])
                                       .sum::<f64>())
                        .collect::<Vec<_>>();
        let total = raw.iter().sum::<f64>();
        if total <= 0. || raw.iter().any(|&w| w <= 0.) {
            return vec![1.; k];
        }
        raw.iter()
           .map(|w| w * k as f64 / total)
           .collect()
    }
}
