//! Dominance on probability and expected-cost intervals.
use std::f64;

use itertools::Itertools;
use ordered_float::OrderedFloat;
use ndarray::prelude::*;

use data::CostMatrix;
use dominance::NonDominatedSet;
use imprecise::CredalInterval;


/// Bounds on the expected cost of predicting one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskInterval {
    pub lower: f64,
    pub upper: f64,
}

/// Non-dominated classes under interval dominance.
///
/// Class `i` is dominated iff some other class `j` has
/// `lower_j >= upper_i`.
///
/// # Examples
///
/// ```
/// use credal::imprecise::CredalInterval;
/// use credal::dominance::interval_dominance;
///
/// let bounds = vec![CredalInterval::new(10. / 11., 1.),
///                   CredalInterval::new(0., 1. / 11.)];
/// assert!(interval_dominance(&bounds).classes() == &[0]);
/// ```
pub fn interval_dominance(bounds: &[CredalInterval]) -> NonDominatedSet {
    let flags = (0..bounds.len()).map(|i| {
                                     let best_other = bounds.iter()
                                                            .enumerate()
                                                            .filter(|&(j, _)| j != i)
                                                            .map(|(_, b)| b.lower)
                                                            .fold(f64::NEG_INFINITY, f64::max);
                                     bounds[i].upper > best_other
                                 })
                                 .collect::<Vec<_>>();
    NonDominatedSet::from_flags(&flags)
}

/// Computes, for each class, the range of its expected cost over every
/// distribution compatible with `bounds`.
///
/// Each extreme is reached greedily: start from the lower bounds and
/// hand the remaining mass to the true classes with the smallest (for
/// the lower risk) or largest (for the upper risk) cost first.
pub fn risk_intervals(bounds: &[CredalInterval], costs: &CostMatrix) -> Vec<RiskInterval> {
    (0..costs.n_classes()).map(|i| {
                              let row = costs.row(i);
                              RiskInterval {
                                  lower: extreme_expected_cost(bounds, &row, false),
                                  upper: extreme_expected_cost(bounds, &row, true),
                              }
                          })
                          .collect()
}

/// Non-dominated classes on risk intervals: class `i` survives iff
/// `lower_risk_i < min_{j != i} upper_risk_j`.
pub fn risk_dominance(risks: &[RiskInterval]) -> NonDominatedSet {
    let flags = (0..risks.len()).map(|i| {
                                    let best_other = risks.iter()
                                                          .enumerate()
                                                          .filter(|&(j, _)| j != i)
                                                          .map(|(_, r)| r.upper)
                                                          .fold(f64::INFINITY, f64::min);
                                    risks[i].lower < best_other
                                })
                                .collect::<Vec<_>>();
    NonDominatedSet::from_flags(&flags)
}

fn extreme_expected_cost(bounds: &[CredalInterval], row: &ArrayView1<f64>, maximise: bool) -> f64 {
    let mut p = bounds.iter()
                      .map(|b| b.lower)
                      .collect::<Vec<_>>();
    let mut rest = 1. - p.iter().sum::<f64>();

    let order = (0..bounds.len()).sorted_by_key(|&j| {
                                     let c = OrderedFloat(row[j]);
                                     if maximise { -c } else { c }
                                 })
                                 .collect::<Vec<_>>();
    for j in order {
        if rest <= 0. {
            break;
        }
        let extra = (bounds[j].upper - bounds[j].lower).min(rest);
        p[j] += extra;
        rest -= extra;
    }

    p.iter()
     .zip(row.iter())
     .map(|(p, c)| p * c)
     .sum()
}


#[cfg(test)]
mod tests {
    use super::*;
    use approx::*;

    #[test]
    fn overlap_keeps_overlapping_classes() {
        let bounds = vec![CredalInterval::new(0.4, 0.6),
                          CredalInterval::new(0.3, 0.5),
                          CredalInterval::new(0.0, 0.25)];
        assert!(interval_dominance(&bounds).classes() == &[0, 1]);
    }

    /// Two identical intervals never dominate each other.
    #[test]
    fn overlap_symmetric_tie() {
        let bounds = vec![CredalInterval::new(5. / 11., 6. / 11.),
                          CredalInterval::new(5. / 11., 6. / 11.)];
        assert!(interval_dominance(&bounds).classes() == &[0, 1]);
    }

    /// Touching intervals: the lower one is dominated.
    #[test]
    fn overlap_touching() {
        let bounds = vec![CredalInterval::new(0.5, 0.7),
                          CredalInterval::new(0.3, 0.5)];
        assert!(interval_dominance(&bounds).classes() == &[0]);
    }

    #[test]
    fn single_class() {
        let bounds = vec![CredalInterval::new(1., 1.)];
        assert!(interval_dominance(&bounds).classes() == &[0]);
    }

    #[test]
    fn risk_bounds() {
        let bounds = vec![CredalInterval::new(0.2, 0.5),
                          CredalInterval::new(0.5, 0.8)];
        let risks = risk_intervals(&bounds, &CostMatrix::zero_one(2));
        // Risk of predicting 0 is P(1), of predicting 1 is P(0).
        assert_relative_eq!(risks[0].lower, 0.5, epsilon = 1e-12);
        assert_relative_eq!(risks[0].upper, 0.8, epsilon = 1e-12);
        assert_relative_eq!(risks[1].lower, 0.2, epsilon = 1e-12);
        assert_relative_eq!(risks[1].upper, 0.5, epsilon = 1e-12);
        // Touching risks: predicting 1 is not worse than predicting 0.
        assert!(risk_dominance(&risks).classes() == &[1]);
    }

    /// An expensive mistake can keep an otherwise dominated class.
    #[test]
    fn asymmetric_costs() {
        let bounds = vec![CredalInterval::new(0.6, 0.7),
                          CredalInterval::new(0.3, 0.4)];
        let plain = risk_dominance(&risk_intervals(&bounds, &CostMatrix::zero_one(2)));
        assert!(plain.classes() == &[0]);

        // Missing class 1 costs ten times more.
        let costs = CostMatrix::new(array![[0., 10.], [1., 0.]]).unwrap();
        let risks = risk_intervals(&bounds, &costs);
        assert_relative_eq!(risks[0].lower, 3., epsilon = 1e-12);
        assert_relative_eq!(risks[1].upper, 0.7, epsilon = 1e-12);
        assert!(risk_dominance(&risks).classes() == &[1]);
    }

    #[test]
    fn lower_risk_never_exceeds_upper() {
        let bounds = vec![CredalInterval::new(0.1, 0.5),
                          CredalInterval::new(0.2, 0.4),
                          CredalInterval::new(0.1, 0.6)];
        let costs = CostMatrix::new(array![[0., 2., 3.], [1., 0., 1.], [5., 1., 0.]]).unwrap();
        for r in risk_intervals(&bounds, &costs) {
            assert!(r.lower <= r.upper + 1e-12);
        }
    }
}
