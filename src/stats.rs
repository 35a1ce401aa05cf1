//! Accuracy measures for set-valued predictions.
use dominance::NonDominatedSet;
use error::Error;


/// Receives every prediction made during an evaluation.
pub trait StatisticsSink {
    /// A non-dominated set and the true class of the record.
    fn record(&mut self, set: &NonDominatedSet, truth: usize);

    /// The precise prediction of a classifier that also has one, next
    /// to its set-valued prediction for the same record.
    fn record_precise(&mut self, _set: &NonDominatedSet, _predicted: usize, _truth: usize) {}

    /// A prediction that failed with a recoverable error.
    fn record_failure(&mut self, _error: &Error) {}
}


/// Accumulates the usual credal classification statistics.
///
/// With `d = 1 / |set|` if the set contains the truth and `d = 0`
/// otherwise, the discounted accuracy is the mean of `d`, and the
/// utility-discounted accuracies are the means of
/// `u65(d) = -0.6 d^2 + 1.6 d` and `u80(d) = -1.2 d^2 + 2.2 d`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetAccuracy {
    n_instances: usize,
    n_determinate: usize,
    n_single_correct: usize,
    n_set_correct: usize,
    indeterminate_size: usize,
    discounted: f64,
    u65: f64,
    u80: f64,
    n_precise: usize,
    n_precise_correct: usize,
    n_precise_on_indeterminate: usize,
    n_precise_correct_on_indeterminate: usize,
    n_failed: usize,
}

/// Serialisable snapshot of a `SetAccuracy`.
///
/// Ratios over an empty population are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracySummary {
    pub instances: usize,
    pub failed: usize,
    pub determinacy: Option<f64>,
    pub single_accuracy: Option<f64>,
    pub set_accuracy: Option<f64>,
    pub indeterminate_size: Option<f64>,
    pub discounted_accuracy: Option<f64>,
    pub u65: Option<f64>,
    pub u80: Option<f64>,
    pub precise_accuracy: Option<f64>,
    pub precise_accuracy_on_indeterminate: Option<f64>,
}

impl SetAccuracy {
    pub fn new() -> SetAccuracy {
        SetAccuracy::default()
    }

    pub fn n_instances(&self) -> usize {
        self.n_instances
    }

    pub fn n_failed(&self) -> usize {
        self.n_failed
    }

    /// Fraction of determinate predictions.
    pub fn determinacy(&self) -> Option<f64> {
        ratio(self.n_determinate as f64, self.n_instances)
    }

    /// Accuracy over the determinate predictions.
    pub fn single_accuracy(&self) -> Option<f64> {
        ratio(self.n_single_correct as f64, self.n_determinate)
    }

    /// Fraction of indeterminate predictions containing the truth.
    pub fn set_accuracy(&self) -> Option<f64> {
        ratio(self.n_set_correct as f64, self.n_instances - self.n_determinate)
    }

    /// Mean size of the indeterminate predictions.
    pub fn indeterminate_size(&self) -> Option<f64> {
        ratio(self.indeterminate_size as f64, self.n_instances - self.n_determinate)
    }

    pub fn discounted_accuracy(&self) -> Option<f64> {
        ratio(self.discounted, self.n_instances)
    }

    pub fn u65(&self) -> Option<f64> {
        ratio(self.u65, self.n_instances)
    }

    pub fn u80(&self) -> Option<f64> {
        ratio(self.u80, self.n_instances)
    }

    pub fn precise_accuracy(&self) -> Option<f64> {
        ratio(self.n_precise_correct as f64, self.n_precise)
    }

    /// Precise accuracy restricted to records where the set-valued
    /// prediction was indeterminate.
    pub fn precise_accuracy_on_indeterminate(&self) -> Option<f64> {
        ratio(self.n_precise_correct_on_indeterminate as f64, self.n_precise_on_indeterminate)
    }

    pub fn summary(&self) -> AccuracySummary {
        AccuracySummary {
            instances: self.n_instances,
            failed: self.n_failed,
            determinacy: self.determinacy(),
            single_accuracy: self.single_accuracy(),
            set_accuracy: self.set_accuracy(),
            indeterminate_size: self.indeterminate_size(),
            discounted_accuracy: self.discounted_accuracy(),
            u65: self.u65(),
            u80: self.u80(),
            precise_accuracy: self.precise_accuracy(),
            precise_accuracy_on_indeterminate: self.precise_accuracy_on_indeterminate(),
        }
    }
}

impl StatisticsSink for SetAccuracy {
    fn record(&mut self, set: &NonDominatedSet, truth: usize) {
        self.n_instances += 1;
        let correct = set.contains(truth);
        if set.is_determinate() {
            self.n_determinate += 1;
            if correct {
                self.n_single_correct += 1;
            }
        } else {
            self.indeterminate_size += set.len();
            if correct {
                self.n_set_correct += 1;
            }
        }

        let d = if correct { 1. / set.len() as f64 } else { 0. };
        self.discounted += d;
        self.u65 += -0.6 * d * d + 1.6 * d;
        self.u80 += -1.2 * d * d + 2.2 * d;
    }

    fn record_precise(&mut self, set: &NonDominatedSet, predicted: usize, truth: usize) {
        self.n_precise += 1;
        if predicted == truth {
            self.n_precise_correct += 1;
        }
        if !set.is_determinate() {
            self.n_precise_on_indeterminate += 1;
            if predicted == truth {
                self.n_precise_correct_on_indeterminate += 1;
            }
        }
    }

    fn record_failure(&mut self, _error: &Error) {
        self.n_failed += 1;
    }
}

fn ratio(num: f64, den: usize) -> Option<f64> {
    if den == 0 { None } else { Some(num / den as f64) }
}
