//! Credal dominance test of the naive credal classifier.
//!
//! Class `c1` dominates `c2` when, for every distribution in the IDM
//! credal set, the posterior of `c1` exceeds that of `c2`. After the
//! inner optimisation has been solved analytically, this reduces to
//! checking that a one-dimensional function `h(x)` stays above 1 on
//! `[0, s]`. `ln h` is convex there, so its minimum is found with a
//! safeguarded Newton iteration on the derivative.
use std::f64;

use error::{Error, LearningResult};


/// Counts of one always-observed feature: `gamma = n(v, c1)` and
/// `delta = n(v, c2)` for the queried value `v`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureCounts {
    pub gamma: f64,
    pub delta: f64,
}

/// Counts of a feature that has missing values in training and is
/// treated as missing-at-random: the records with a known value only
/// are used, so `gamma_tilde` and `delta_tilde` are the number of
/// records of `c1` and `c2` where the feature is observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginalCounts {
    pub gamma: f64,
    pub delta: f64,
    pub gamma_tilde: f64,
    pub delta_tilde: f64,
}

/// Everything one pairwise test needs.
///
/// Counts must be consistent: `delta <= beta` for `complete` features,
/// `gamma <= gamma_tilde <= alpha` and `delta <= delta_tilde <= beta`
/// for `partial` ones.
#[derive(Debug, Clone, PartialEq)]
pub struct PairCounts {
    /// Training count of `c1`.
    pub alpha: f64,
    /// Training count of `c2`.
    pub beta: f64,
    pub complete: Vec<FeatureCounts>,
    pub partial: Vec<MarginalCounts>,
}

impl PairCounts {
    /// True if some count of `c1` is zero, in which case `h` vanishes at
    /// some point of the credal set and `c1` cannot dominate.
    fn has_zero_support(&self) -> bool {
        self.alpha <= 0.
        || self.complete.iter().any(|f| f.gamma <= 0.)
        || self.partial.iter().any(|f| f.gamma <= 0.)
    }
}


/// Result of minimising `h` over `[0, s]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CirOutcome {
    /// `ln min h`; may be `+inf`.
    pub log_infimum: f64,
    /// Where the minimum is reached.
    pub argmin: f64,
    pub iterations: usize,
    /// False if the iteration cap was hit; `argmin` is then the last
    /// estimate.
    pub converged: bool,
}

impl CirOutcome {
    pub fn infimum(&self) -> f64 {
        self.log_infimum.exp()
    }

    /// True if `c1` dominates `c2`, i.e. `min h > 1`.
    pub fn dominates(&self) -> bool {
        self.log_infimum > 0.
    }
}


/// Pairwise credal dominance test.
///
/// # Examples
///
/// ```
/// use credal::dominance::*;
///
/// let test = CirTest::new(1.).unwrap();
/// let counts = PairCounts {
///     alpha: 10.,
///     beta: 10.,
///     complete: vec![FeatureCounts { gamma: 10., delta: 0. }],
///     partial: vec![],
/// };
/// // c2 never showed the observed value.
/// assert!(test.infimum(&counts).dominates());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CirTest {
    s: f64,
    tolerance: f64,
    max_iterations: usize,
}

impl CirTest {
    /// Constructs a test with prior strength `s`.
    pub fn new(s: f64) -> LearningResult<CirTest> {
        CirTest::with_limits(s, 1e-7, 200)
    }

    /// Constructs a test with explicit stopping rules for the optimiser.
    ///
    /// # Arguments
    ///
    /// * `s` - IDM prior strength.
    /// * `tolerance` - The optimiser stops once a step is shorter.
    /// * `max_iterations` - Hard cap on optimiser iterations.
    pub fn with_limits(s: f64, tolerance: f64, max_iterations: usize) -> LearningResult<CirTest> {
        if !s.is_finite() || s < 0. {
            return Err(Error::InvalidS(s));
        }
        Ok(CirTest { s, tolerance, max_iterations })
    }

    pub fn s(&self) -> f64 {
        self.s
    }

    /// Minimises `h` over `[0, s]`.
    pub fn infimum(&self, counts: &PairCounts) -> CirOutcome {
        if counts.has_zero_support() {
            return CirOutcome {
                log_infimum: f64::NEG_INFINITY,
                argmin: 0.,
                iterations: 0,
                converged: true,
            };
        }

        let (argmin, iterations, converged) = if self.s <= 0. || self.slope(counts, 0.) >= 0. {
            (0., 0, true)
        } else if self.slope(counts, self.s) <= 0. {
            (self.s, 0, true)
        } else {
            self.newton(counts)
        };

        CirOutcome {
            log_infimum: self.log_h(counts, argmin),
            argmin,
            iterations,
            converged,
        }
    }

    /// Convenience for `infimum(counts).dominates()`.
    pub fn dominates(&self, counts: &PairCounts) -> bool {
        self.infimum(counts).dominates()
    }

    /// `ln h(x)`.
    ///
    /// Every `ln((b + x) / (d + x))` pair is grouped so that equal
    /// arguments cancel exactly; the result is finite or `+inf`.
    pub fn log_h(&self, counts: &PairCounts, x: f64) -> f64 {
        let s = self.s;
        let k = counts.complete.len() as f64;
        let beta = counts.beta;

        let mut value = -(beta + x).ln() - (k - 1.) * (counts.alpha + s - x).ln();
        for f in &counts.complete {
            value += log_ratio(beta, f.delta, x) + f.gamma.ln();
        }
        for f in &counts.partial {
            value += log_ratio(f.delta_tilde, f.delta, x)
                     - (f.gamma_tilde + s - x).ln()
                     + f.gamma.ln();
        }
        value
    }

    /// Derivative of `ln h`.
    fn slope(&self, counts: &PairCounts, x: f64) -> f64 {
        let s = self.s;
        let k = counts.complete.len() as f64;
        let beta = counts.beta;

        let mut value = -1. / (beta + x) + (k - 1.) / (counts.alpha + s - x);
        for f in &counts.complete {
            value += ratio_slope(beta, f.delta, x);
        }
        for f in &counts.partial {
            value += ratio_slope(f.delta_tilde, f.delta, x) + 1. / (f.gamma_tilde + s - x);
        }
        value
    }

    /// Second derivative of `ln h`; positive on `(0, s)`.
    fn curvature(&self, counts: &PairCounts, x: f64) -> f64 {
        let s = self.s;
        let k = counts.complete.len() as f64;
        let beta = counts.beta;

        let mut value = (beta + x).powi(-2) + (k - 1.) * (counts.alpha + s - x).powi(-2);
        for f in &counts.complete {
            value += ratio_curvature(beta, f.delta, x);
        }
        for f in &counts.partial {
            value += ratio_curvature(f.delta_tilde, f.delta, x)
                     + (f.gamma_tilde + s - x).powi(-2);
        }
        value
    }

    /// Root of the derivative, known to change sign on `(0, s)`.
    ///
    /// Newton steps that would leave the bracket, or that do not shrink
    /// fast enough, are replaced by bisection.
    fn newton(&self, counts: &PairCounts) -> (f64, usize, bool) {
        let (mut lo, mut hi) = (0., self.s);
        let mut x = 0.5 * (lo + hi);
        let mut step_old = hi - lo;
        let mut step = step_old;
        let mut f = self.slope(counts, x);
        let mut df = self.curvature(counts, x);

        for iteration in 1..self.max_iterations + 1 {
            if f == 0. {
                return (x, iteration - 1, true);
            }
            if f < 0. {
                lo = x;
            } else {
                hi = x;
            }

            let leaves_bracket = ((x - hi) * df - f) * ((x - lo) * df - f) > 0.;
            let too_slow = (2. * f).abs() > (step_old * df).abs();
            step_old = step;
            if leaves_bracket || too_slow || !(df > 0.) {
                step = 0.5 * (hi - lo);
                x = lo + step;
            } else {
                step = f / df;
                x -= step;
            }
            if step.abs() < self.tolerance {
                return (x, iteration, true);
            }

            f = self.slope(counts, x);
            df = self.curvature(counts, x);
        }

        warn!(iterations = self.max_iterations, argmin = x,
              "dominance optimiser did not converge; using last estimate");
        (x, self.max_iterations, false)
    }
}

/// `ln((a + x) / (b + x))`, exactly 0 when `a == b`.
fn log_ratio(a: f64, b: f64, x: f64) -> f64 {
    if a == b { 0. } else { (a + x).ln() - (b + x).ln() }
}

fn ratio_slope(a: f64, b: f64, x: f64) -> f64 {
    if a == b { 0. } else { 1. / (a + x) - 1. / (b + x) }
}

fn ratio_curvature(a: f64, b: f64, x: f64) -> f64 {
    if a == b { 0. } else { (b + x).powi(-2) - (a + x).powi(-2) }
}


#[cfg(test)]
mod tests {
    use super::*;
    use approx::*;

    fn complete(pairs: &[(f64, f64)]) -> Vec<FeatureCounts> {
        pairs.iter()
             .map(|&(gamma, delta)| FeatureCounts { gamma, delta })
             .collect()
    }

    fn grid_minimum(test: &CirTest, counts: &PairCounts, points: usize) -> f64 {
        (0..points + 1).map(|i| test.log_h(counts, test.s() * i as f64 / points as f64))
                       .fold(f64::INFINITY, f64::min)
    }

    #[test]
    fn rejects_bad_s() {
        assert!(CirTest::new(-1.).is_err());
        assert!(CirTest::new(f64::NAN).is_err());
        assert!(CirTest::new(0.).is_ok());
    }

    /// A class never seen with the queried value cannot dominate.
    #[test]
    fn zero_count_never_dominates() {
        let test = CirTest::new(1.).unwrap();
        let counts = PairCounts {
            alpha: 10.,
            beta: 5.,
            complete: complete(&[(0., 3.)]),
            partial: vec![],
        };
        let outcome = test.infimum(&counts);
        assert!(outcome.infimum() == 0.);
        assert!(outcome.iterations == 0);
        assert!(!outcome.dominates());
    }

    /// With s = 0 the test compares the precise naive posteriors:
    /// h = (beta / alpha)^(k-1) * prod(gamma / delta).
    #[test]
    fn precise_limit() {
        let test = CirTest::new(0.).unwrap();
        let counts = PairCounts {
            alpha: 10.,
            beta: 5.,
            complete: complete(&[(8., 1.), (6., 3.)]),
            partial: vec![],
        };
        let expected = 0.5 * 8. * 2.;
        assert_relative_eq!(test.infimum(&counts).infimum(), expected, epsilon = 1e-9);
    }

    /// Derivative non-negative at 0: minimum at the left end.
    #[test]
    fn minimum_at_zero() {
        let test = CirTest::new(1.).unwrap();
        let counts = PairCounts {
            alpha: 2.,
            beta: 10.,
            complete: complete(&[(2., 10.), (2., 10.)]),
            partial: vec![],
        };
        let outcome = test.infimum(&counts);
        assert!(outcome.argmin == 0.);
        assert_relative_eq!(outcome.infimum(), 10. / 3. * 0.04, epsilon = 1e-9);
        assert!(!outcome.dominates());
    }

    /// Derivative non-positive at s: minimum at the right end.
    #[test]
    fn minimum_at_s() {
        let test = CirTest::new(1.).unwrap();
        let counts = PairCounts {
            alpha: 10.,
            beta: 10.,
            complete: complete(&[(9., 1.), (9., 1.)]),
            partial: vec![],
        };
        let outcome = test.infimum(&counts);
        assert!(outcome.argmin == 1.);
        assert!(outcome.log_infimum <= grid_minimum(&test, &counts, 1000) + 1e-12);
        assert!(outcome.dominates());
    }

    #[test]
    fn interior_minimum() {
        let test = CirTest::new(2.).unwrap();
        let counts = PairCounts {
            alpha: 1.,
            beta: 4.,
            complete: complete(&[(1., 2.), (1., 2.)]),
            partial: vec![],
        };
        let outcome = test.infimum(&counts);
        assert!(outcome.converged);
        assert!(outcome.iterations > 0);
        assert!(outcome.argmin > 0. && outcome.argmin < 2.);
        let grid = grid_minimum(&test, &counts, 200_000);
        assert!(outcome.log_infimum <= grid + 1e-12);
        assert!((outcome.log_infimum - grid).abs() < 1e-8);
    }

    #[test]
    fn partial_features() {
        let test = CirTest::new(1.).unwrap();
        let counts = PairCounts {
            alpha: 6.,
            beta: 6.,
            complete: complete(&[(5., 1.)]),
            partial: vec![MarginalCounts {
                gamma: 3.,
                delta: 1.,
                gamma_tilde: 4.,
                delta_tilde: 5.,
            }],
        };
        let outcome = test.infimum(&counts);
        let grid = grid_minimum(&test, &counts, 100_000);
        assert!(outcome.log_infimum <= grid + 1e-12);
        assert!((outcome.log_infimum - grid).abs() < 1e-7);
    }

    /// c2 has no training records: h is infinite at x = 0, but c1 is
    /// only guaranteed to dominate if h stays above 1 everywhere.
    #[test]
    fn unseen_second_class() {
        let test = CirTest::new(1.).unwrap();
        let counts = PairCounts {
            alpha: 10.,
            beta: 0.,
            complete: complete(&[(10., 0.)]),
            partial: vec![],
        };
        let outcome = test.infimum(&counts);
        assert!(outcome.log_infimum.is_finite());
        assert!(outcome.dominates());
    }

    /// Hitting the iteration cap still yields an estimate.
    #[test]
    fn iteration_cap() {
        let test = CirTest::with_limits(2., 1e-15, 1).unwrap();
        let counts = PairCounts {
            alpha: 1.,
            beta: 4.,
            complete: complete(&[(1., 2.), (1., 2.)]),
            partial: vec![],
        };
        let outcome = test.infimum(&counts);
        assert!(!outcome.converged);
        assert!(outcome.iterations == 1);
        assert!(outcome.log_infimum.is_finite());
    }
}
