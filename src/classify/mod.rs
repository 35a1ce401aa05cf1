//! Module defining credal classifiers.
//!
//! A `CredalClassifier` is trained on a `Dataset` and answers each query
//! record with a `NonDominatedSet`: one class when the data single it out,
//! several when the credal model cannot tell them apart. It never returns
//! point probabilities.
pub mod tree;
pub mod naive;
pub mod local;

use ndarray::prelude::*;

use data::Dataset;
use dominance::NonDominatedSet;
use error::LearningResult;
use stats::StatisticsSink;

pub use self::tree::CredalTreeClassifier;
pub use self::naive::{FeatureTreatment, NaiveCredalClassifier};
pub use self::local::{LazyNaiveCredal, LocalContext};


/// A classifier returning sets of non-dominated classes.
pub trait CredalClassifier {
    /// Trains the classifier, replacing any previous model.
    fn train(&mut self, data: &Dataset) -> LearningResult<()>;

    /// Returns the non-dominated classes for a query record.
    ///
    /// Failures are per call: the trained model is never modified.
    fn classify(&self, record: &ArrayView1<usize>) -> LearningResult<NonDominatedSet>;

    /// Number of classes of the trained model (0 if untrained).
    fn n_classes(&self) -> usize;

    /// The precise prediction for a record, for classifiers that have one.
    fn precise_class(&self, _record: &ArrayView1<usize>) -> Option<LearningResult<usize>> {
        None
    }

    /// Classifies every record of `data`.
    fn classify_all(&self, data: &Dataset) -> LearningResult<Vec<NonDominatedSet>> {
        data.features()
            .outer_iter()
            .map(|record| self.classify(&record))
            .collect()
    }

    /// Feeds every record's prediction and true class to `sink`.
    ///
    /// Recoverable failures are reported to the sink and skipped; any
    /// other error aborts the evaluation. Returns the number of skipped
    /// records.
    fn evaluate(&self, data: &Dataset, sink: &mut dyn StatisticsSink) -> LearningResult<usize> {
        let mut skipped = 0;
        for (i, record) in data.features().outer_iter().enumerate() {
            let truth = data.label(i);
            match self.classify(&record) {
                Ok(set) => {
                    sink.record(&set, truth);
                    if let Some(predicted) = self.precise_class(&record) {
                        sink.record_precise(&set, predicted?, truth);
                    }
                },
                Err(e) => {
                    if !e.is_recoverable() {
                        return Err(e);
                    }
                    debug!(record = i, error = %e, "skipping record");
                    sink.record_failure(&e);
                    skipped += 1;
                },
            }
        }
        Ok(skipped)
    }
}
