//! Graded pairwise preference between classes.
use std::f64;

use ndarray::prelude::*;

use dominance::NonDominatedSet;
use imprecise::CredalInterval;
use numeric::log_add_exp;


/// Square matrix whose entry `[i, j]` is the degree to which class `i`
/// is preferred to class `j`. Degrees are in `[0, 1]`, the diagonal is
/// 0.5 and `degree(i, j) + degree(j, i) == 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct DominanceMatrix {
    degrees: Array2<f64>,
}

impl DominanceMatrix {
    /// Preference degrees between probability intervals.
    ///
    /// The degree of `a` over `b` is `(upper_a - lower_b) / (width_a +
    /// width_b)` clamped to `[0, 1]`; two point intervals compare
    /// directly.
    pub fn from_intervals(bounds: &[CredalInterval]) -> DominanceMatrix {
        let k = bounds.len();
        let degrees = Array2::from_shape_fn((k, k), |(i, j)| {
            if i == j {
                0.5
            } else {
                interval_degree(&bounds[i], &bounds[j])
            }
        });
        DominanceMatrix { degrees }
    }

    /// Preference degrees between log-scores (e.g., log-posteriors):
    /// `exp(a) / (exp(a) + exp(b))`, computed without leaving log space.
    pub fn from_log_scores(scores: &[f64]) -> DominanceMatrix {
        let k = scores.len();
        let degrees = Array2::from_shape_fn((k, k), |(i, j)| {
            let (a, b) = (scores[i], scores[j]);
            if i == j || (a == f64::NEG_INFINITY && b == f64::NEG_INFINITY) {
                0.5
            } else {
                (a - log_add_exp(a, b)).exp()
            }
        });
        DominanceMatrix { degrees }
    }

    pub fn n_classes(&self) -> usize {
        self.degrees.nrows()
    }

    /// Degree to which class `i` is preferred to class `j`.
    pub fn degree(&self, i: usize, j: usize) -> f64 {
        self.degrees[[i, j]]
    }

    pub fn degrees(&self) -> ArrayView2<f64> {
        self.degrees.view()
    }

    /// Classes that no other class is preferred to with a degree of at
    /// least `threshold`.
    pub fn non_dominated(&self, threshold: f64) -> NonDominatedSet {
        let k = self.n_classes();
        let flags = (0..k).map(|i| !(0..k).any(|j| j != i && self.degrees[[j, i]] >= threshold))
                          .collect::<Vec<_>>();
        NonDominatedSet::from_flags(&flags)
    }
}

fn interval_degree(a: &CredalInterval, b: &CredalInterval) -> f64 {
    let width = a.width() + b.width();
    if width <= 0. {
        return if a.upper > b.upper {
            1.
        } else if a.upper < b.upper {
            0.
        } else {
            0.5
        };
    }
    ((a.upper - b.lower) / width).max(0.).min(1.)
}


#[cfg(test)]
mod tests {
    use super::*;
    use approx::*;

    #[test]
    fn interval_degrees() {
        let bounds = vec![CredalInterval::new(0.4, 0.6),
                          CredalInterval::new(0.3, 0.5),
                          CredalInterval::new(0.0, 0.2)];
        let m = DominanceMatrix::from_intervals(&bounds);
        assert_relative_eq!(m.degree(0, 1), 0.75, epsilon = 1e-12);
        assert_relative_eq!(m.degree(1, 0), 0.25, epsilon = 1e-12);
        assert!(m.degree(0, 2) == 1.);
        assert!(m.degree(2, 0) == 0.);
        assert!(m.degree(1, 1) == 0.5);

        assert!(m.non_dominated(1.).classes() == &[0, 1]);
        assert!(m.non_dominated(0.7).classes() == &[0]);
    }

    #[test]
    fn point_intervals() {
        let bounds = vec![CredalInterval::new(0.5, 0.5),
                          CredalInterval::new(0.5, 0.5)];
        let m = DominanceMatrix::from_intervals(&bounds);
        assert!(m.degree(0, 1) == 0.5);
        assert!(m.non_dominated(0.9).classes() == &[0, 1]);
    }

    #[test]
    fn log_scores() {
        let m = DominanceMatrix::from_log_scores(&[3f64.ln(), 1f64.ln(), f64::NEG_INFINITY]);
        assert_relative_eq!(m.degree(0, 1), 0.75, epsilon = 1e-12);
        assert_relative_eq!(m.degree(1, 0), 0.25, epsilon = 1e-12);
        assert_relative_eq!(m.degree(0, 2), 1., epsilon = 1e-12);
        assert!(m.degree(2, 2) == 0.5);
        assert!(m.non_dominated(0.7).classes() == &[0]);
    }

    /// Complementary degrees, even for scores that would underflow.
    #[test]
    fn complementary() {
        let m = DominanceMatrix::from_log_scores(&[-2000., -2001., -1999.5]);
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(m.degree(i, j) + m.degree(j, i), 1., epsilon = 1e-12);
            }
        }
    }
}
