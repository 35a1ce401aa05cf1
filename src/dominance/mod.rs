//! Module defining dominance between classes.
//!
//! Given what a credal model knows about each class, a dominance rule
//! discards the classes that are provably worse than some other one.
//! The classes that survive form a `NonDominatedSet`, which is never
//! empty: whenever a rule would discard every class (which consistent
//! bounds cannot cause, but rounding can) all classes are kept.
pub mod interval;
pub mod matrix;
pub mod cir;

use std::fmt;

use data::CostMatrix;
use error::{Error, LearningResult};
use imprecise::CredalInterval;

pub use self::interval::{interval_dominance, risk_dominance, risk_intervals, RiskInterval};
pub use self::matrix::DominanceMatrix;
pub use self::cir::{CirOutcome, CirTest, FeatureCounts, MarginalCounts, PairCounts};


/// The classes that no other class dominates, in increasing order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonDominatedSet {
    classes: Vec<usize>,
}

impl NonDominatedSet {
    /// Builds the set from one flag per class, keeping every class if
    /// no flag is set.
    pub fn from_flags(non_dominated: &[bool]) -> NonDominatedSet {
        let mut classes = non_dominated.iter()
                                       .enumerate()
                                       .filter(|&(_, &keep)| keep)
                                       .map(|(y, _)| y)
                                       .collect::<Vec<_>>();
        if classes.is_empty() {
            classes = (0..non_dominated.len()).collect();
        }
        NonDominatedSet { classes }
    }

    /// A determinate prediction.
    pub fn single(class: usize) -> NonDominatedSet {
        NonDominatedSet { classes: vec![class] }
    }

    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// True if exactly one class survived.
    pub fn is_determinate(&self) -> bool {
        self.classes.len() == 1
    }

    /// The predicted class of a determinate prediction.
    pub fn determinate(&self) -> Option<usize> {
        if self.is_determinate() { Some(self.classes[0]) } else { None }
    }

    pub fn contains(&self, class: usize) -> bool {
        self.classes.binary_search(&class).is_ok()
    }
}

impl fmt::Display for NonDominatedSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let classes = self.classes.iter()
                                  .map(|y| y.to_string())
                                  .collect::<Vec<_>>();
        write!(f, "{}", classes.join(" "))
    }
}


/// Dominance rule applied to per-class probability intervals, selected
/// once when a classifier is configured.
#[derive(Debug, Clone, PartialEq)]
pub enum IntervalDominance {
    /// Class `i` survives iff `upper_i > max_{j != i} lower_j`.
    IntervalOverlap,
    /// Class `i` is discarded iff some class is preferred to it with a
    /// degree of at least `threshold`.
    Graded { threshold: f64 },
    /// Dominance on expected-cost intervals: class `i` survives iff
    /// `lower_risk_i < min_{j != i} upper_risk_j`.
    MinimumRisk(CostMatrix),
}

impl IntervalDominance {
    /// Checks the rule against a number of classes.
    pub fn validate(&self, n_classes: usize) -> LearningResult<()> {
        match *self {
            IntervalDominance::IntervalOverlap => Ok(()),
            IntervalDominance::Graded { threshold } => {
                if threshold > 0.5 && threshold <= 1. {
                    Ok(())
                } else {
                    Err(Error::InvalidThreshold(threshold))
                }
            },
            IntervalDominance::MinimumRisk(ref costs) => {
                if costs.n_classes() == n_classes {
                    Ok(())
                } else {
                    Err(Error::InvalidCostMatrix {
                        reason: format!("expected {} classes, got {}",
                                        n_classes, costs.n_classes()),
                    })
                }
            },
        }
    }

    /// Returns the non-dominated classes for the given intervals.
    pub fn resolve(&self, bounds: &[CredalInterval]) -> NonDominatedSet {
        match *self {
            IntervalDominance::IntervalOverlap => interval_dominance(bounds),
            IntervalDominance::Graded { threshold } => {
                DominanceMatrix::from_intervals(bounds).non_dominated(threshold)
            },
            IntervalDominance::MinimumRisk(ref costs) => {
                risk_dominance(&risk_intervals(bounds, costs))
            },
        }
    }
}
