//! Per-class probability intervals under IDM and NPI-based models.
use ordered_float::OrderedFloat;
use itertools::Itertools;

use error::{Error, LearningResult};


/// Which small-sample uncertainty model derives the intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    /// Imprecise Dirichlet Model with `s` virtual observations.
    Idm,
    /// Nonparametric Predictive Inference model.
    NpiM,
    /// Approximate NPI-M; point estimates are maximum-entropy transformed.
    ANpiM,
    /// NPI-M where unobserved classes jointly share at most one virtual
    /// observation.
    CompleteAdmissible,
}

/// Lower and upper probability of one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CredalInterval {
    pub lower: f64,
    pub upper: f64,
}

impl CredalInterval {
    pub fn new(lower: f64, upper: f64) -> CredalInterval {
        CredalInterval { lower, upper }
    }

    /// The interval `[0, 1]`: nothing is known.
    pub fn vacuous() -> CredalInterval {
        CredalInterval { lower: 0., upper: 1. }
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}


/// Maps class frequencies to credal intervals.
///
/// The parameter `s` is only used by the IDM; it is validated at
/// construction for every kind so a model never fails per call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalModel {
    kind: ModelKind,
    s: f64,
}

impl IntervalModel {
    /// Constructs a new interval model.
    ///
    /// # Arguments
    ///
    /// * `kind` - Uncertainty model.
    /// * `s` - IDM prior strength; must be finite and non-negative.
    ///
    /// # Examples
    ///
    /// ```
    /// use credal::imprecise::*;
    ///
    /// let idm = IntervalModel::new(ModelKind::Idm, 1.).expect("valid s");
    /// let bounds = idm.bounds(&[10., 0.]);
    /// assert!(bounds[1].upper == 1. / 11.);
    /// assert!(IntervalModel::new(ModelKind::Idm, -1.).is_err());
    /// ```
    pub fn new(kind: ModelKind, s: f64) -> LearningResult<IntervalModel> {
        if !s.is_finite() || s < 0. {
            return Err(Error::InvalidS(s));
        }
        Ok(IntervalModel { kind, s })
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn s(&self) -> f64 {
        self.s
    }

    /// Returns one interval per class.
    ///
    /// Without any observation (and, for the IDM, `s = 0`) every interval
    /// is vacuous.
    pub fn bounds(&self, freqs: &[f64]) -> Vec<CredalInterval> {
        let n = freqs.iter().sum::<f64>();

        match self.kind {
            ModelKind::Idm => {
                let denom = n + self.s;
                if !(denom > 0.) {
                    return vec![CredalInterval::vacuous(); freqs.len()];
                }
                freqs.iter()
                     .map(|&c| CredalInterval::new(c / denom,
                                                   ((c + self.s) / denom).min(1.)))
                     .collect()
            },
            ModelKind::NpiM | ModelKind::ANpiM => npi_bounds(freqs, n),
            ModelKind::CompleteAdmissible => reachable(npi_bounds(freqs, n)),
        }
    }

    /// Returns the maximum-entropy point of the credal set, in count
    /// units (it sums to `N + s` for the IDM, to `N` otherwise).
    ///
    /// Classes with equal frequencies always receive equal counts, and
    /// the ordering of the frequencies is preserved.
    pub fn max_entropy_counts(&self, freqs: &[f64]) -> Vec<f64> {
        let n = freqs.iter().sum::<f64>();

        match self.kind {
            ModelKind::Idm => {
                if !(n + self.s > 0.) {
                    return vec![0.; freqs.len()];
                }
                let upper = freqs.iter().map(|&c| c + self.s).collect::<Vec<_>>();
                level_fill(freqs, &upper, n + self.s)
            },
            ModelKind::NpiM | ModelKind::ANpiM => npi_transform(freqs, n),
            ModelKind::CompleteAdmissible => complete_transform(freqs, n),
        }
    }

    /// Returns the point distribution used downstream: relative
    /// frequencies for IDM and NPI-M, the maximum-entropy (NPI
    /// transformed) distribution for the other models. Uniform if
    /// nothing was observed.
    pub fn point_estimate(&self, freqs: &[f64]) -> Vec<f64> {
        let k = freqs.len();
        let counts = match self.kind {
            ModelKind::Idm | ModelKind::NpiM => freqs.to_vec(),
            ModelKind::ANpiM | ModelKind::CompleteAdmissible => self.max_entropy_counts(freqs),
        };
        let total = counts.iter().sum::<f64>();
        if !(total > 0.) {
            return vec![1. / k as f64; k];
        }
        counts.iter()
              .map(|c| c / total)
              .collect()
    }
}

/// NPI-M envelope: `[max(0, (n_k - 1)/N), min(1, (n_k + 1)/N)]`.
fn npi_bounds(freqs: &[f64], n: f64) -> Vec<CredalInterval> {
    if !(n > 0.) {
        return vec![CredalInterval::vacuous(); freqs.len()];
    }
    freqs.iter()
         .map(|&c| CredalInterval::new(((c - 1.) / n).max(0.),
                                       ((c + 1.) / n).min(1.)))
         .collect()
}

/// Tightens intervals so each bound is attained by some distribution
/// in the set.
fn reachable(bounds: Vec<CredalInterval>) -> Vec<CredalInterval> {
    let sum_lower = bounds.iter().map(|b| b.lower).sum::<f64>();
    let sum_upper = bounds.iter().map(|b| b.upper).sum::<f64>();

    bounds.iter()
          .map(|b| {
              let lower = b.lower.max(1. - (sum_upper - b.upper)).max(0.);
              let upper = b.upper.min(1. - (sum_lower - b.lower)).min(1.);
              CredalInterval::new(lower.min(upper), upper.max(lower))
          })
          .collect()
}

/// Maximum-entropy point of the A-NPI-M credal set, in count units.
fn npi_transform(freqs: &[f64], n: f64) -> Vec<f64> {
    if !(n > 0.) {
        return vec![0.; freqs.len()];
    }
    let lower = freqs.iter().map(|&c| (c - 1.).max(0.)).collect::<Vec<_>>();
    let upper = freqs.iter().map(|&c| (c + 1.).min(n)).collect::<Vec<_>>();
    level_fill(&lower, &upper, n)
}

/// Like `npi_transform`, but unobserved classes together receive at most
/// one count, shared equally.
fn complete_transform(freqs: &[f64], n: f64) -> Vec<f64> {
    let transformed = npi_transform(freqs, n);
    let unobserved = freqs.iter()
                          .positions(|&c| c <= 0.)
                          .collect::<Vec<_>>();
    let mass = unobserved.iter().map(|&i| transformed[i]).sum::<f64>();

    if mass <= 1. || unobserved.len() == freqs.len() {
        return transformed;
    }

    // The joint cap binds: by symmetry the unobserved classes split one
    // count, and the observed ones are levelled over the rest.
    let share = 1. / unobserved.len() as f64;
    let observed = (0..freqs.len()).filter(|i| freqs[*i] > 0.)
                                   .collect::<Vec<_>>();
    let lower = observed.iter().map(|&i| (freqs[i] - 1.).max(0.)).collect::<Vec<_>>();
    let upper = observed.iter().map(|&i| (freqs[i] + 1.).min(n)).collect::<Vec<_>>();
    let levelled = level_fill(&lower, &upper, n - 1.);

    let mut out = vec![share; freqs.len()];
    for (&i, v) in observed.iter().zip(levelled) {
        out[i] = v;
    }
    out
}

/// Returns `clamp(λ, lower_k, upper_k)` for the level `λ` at which the
/// values sum to `total`.
///
/// This is the maximum-entropy point under per-class box constraints.
/// The sum is piecewise linear in `λ` between consecutive bounds, so
/// the level is found exactly by interpolation on the right piece.
pub(crate) fn level_fill(lower: &[f64], upper: &[f64], total: f64) -> Vec<f64> {
    let fill = |level: f64| -> f64 {
        lower.iter()
             .zip(upper)
             .map(|(&l, &u)| level.max(l).min(u))
             .sum()
    };

    let breakpoints = lower.iter()
                           .chain(upper.iter())
                           .map(|&b| OrderedFloat(b))
                           .sorted()
                           .dedup()
                           .map(|b| b.into_inner())
                           .collect::<Vec<_>>();

    let level = match breakpoints.iter().position(|&b| fill(b) >= total) {
        None => return upper.to_vec(),
        Some(0) => return lower.to_vec(),
        Some(i) => {
            let (a, b) = (breakpoints[i - 1], breakpoints[i]);
            let (fill_a, fill_b) = (fill(a), fill(b));
            a + (b - a) * (total - fill_a) / (fill_b - fill_a)
        },
    };

    lower.iter()
         .zip(upper)
         .map(|(&l, &u)| level.max(l).min(u))
         .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-12)
    }

    #[test]
    fn rejects_bad_s() {
        assert!(matches!(IntervalModel::new(ModelKind::Idm, -0.1), Err(Error::InvalidS(_))));
        assert!(IntervalModel::new(ModelKind::NpiM, f64::NAN).is_err());
        assert!(IntervalModel::new(ModelKind::Idm, f64::INFINITY).is_err());
        assert!(IntervalModel::new(ModelKind::Idm, 0.).is_ok());
    }

    /// Counts (10, 0) with s = 1.
    #[test]
    fn idm_bounds() {
        let idm = IntervalModel::new(ModelKind::Idm, 1.).unwrap();
        let b = idm.bounds(&[10., 0.]);
        assert!(b[0] == CredalInterval::new(10. / 11., 1.));
        assert!(b[1] == CredalInterval::new(0., 1. / 11.));
    }

    #[test]
    fn idm_without_data() {
        let idm = IntervalModel::new(ModelKind::Idm, 0.).unwrap();
        assert!(idm.bounds(&[0., 0.]) == vec![CredalInterval::vacuous(); 2]);
        let idm = IntervalModel::new(ModelKind::Idm, 2.).unwrap();
        assert!(idm.bounds(&[0., 0.]) == vec![CredalInterval::vacuous(); 2]);
    }

    #[test]
    fn npi_bounds() {
        let npi = IntervalModel::new(ModelKind::NpiM, 1.).unwrap();
        let b = npi.bounds(&[10., 0.]);
        assert!(close(&[b[0].lower, b[0].upper, b[1].lower, b[1].upper],
                      &[0.9, 1., 0., 0.1]));
        assert!(npi.bounds(&[0., 0., 0.]) == vec![CredalInterval::vacuous(); 3]);
    }

    #[test]
    fn reachable_tightens_only_unreachable_bounds() {
        let tight = reachable(vec![CredalInterval::new(0.2, 0.9),
                                   CredalInterval::new(0.3, 0.5)]);
        assert!(close(&[tight[0].lower, tight[0].upper], &[0.5, 0.7]));
        assert!(close(&[tight[1].lower, tight[1].upper], &[0.3, 0.5]));
    }

    #[test]
    fn idm_max_entropy() {
        let idm = IntervalModel::new(ModelKind::Idm, 1.).unwrap();
        assert!(close(&idm.max_entropy_counts(&[10., 0.]), &[10., 1.]));
        assert!(close(&idm.max_entropy_counts(&[5., 5.]), &[5.5, 5.5]));
        // The virtual observation is spread over the two least frequent
        // classes only.
        assert!(close(&idm.max_entropy_counts(&[4., 1., 1.]), &[4., 1.5, 1.5]));
        // Large s levels everything.
        let idm = IntervalModel::new(ModelKind::Idm, 10.).unwrap();
        assert!(close(&idm.max_entropy_counts(&[4., 1., 1.]), &[16. / 3.; 3]));
    }

    #[test]
    fn npi_transform_examples() {
        let npi = IntervalModel::new(ModelKind::ANpiM, 1.).unwrap();
        assert!(close(&npi.max_entropy_counts(&[10., 0.]), &[9., 1.]));
        assert!(close(&npi.max_entropy_counts(&[10., 0., 0.]), &[9., 0.5, 0.5]));
        assert!(close(&npi.max_entropy_counts(&[3., 3.]), &[3., 3.]));
        assert!(close(&npi.max_entropy_counts(&[5., 3., 2.]), &[4., 3., 3.]));
    }

    /// Tied frequencies stay tied, and total mass and rank order are kept.
    #[test]
    fn npi_transform_ties() {
        let npi = IntervalModel::new(ModelKind::ANpiM, 1.).unwrap();
        let freqs = [6., 2., 2., 0., 0.];
        let t = npi.max_entropy_counts(&freqs);
        assert!((t.iter().sum::<f64>() - 10.).abs() < 1e-12);
        assert!(t[1] == t[2] && t[3] == t[4]);
        assert!(t[0] >= t[1] && t[1] >= t[3]);
    }

    /// Unobserved classes share a single count under the complete model.
    #[test]
    fn complete_transform_caps_unobserved_mass() {
        let freqs = [5., 5., 0., 0., 0.];
        let approx = IntervalModel::new(ModelKind::ANpiM, 1.).unwrap()
                                   .max_entropy_counts(&freqs);
        let complete = IntervalModel::new(ModelKind::CompleteAdmissible, 1.).unwrap()
                                     .max_entropy_counts(&freqs);
        assert!(close(&approx, &[4., 4., 2. / 3., 2. / 3., 2. / 3.]));
        assert!(close(&complete, &[4.5, 4.5, 1. / 3., 1. / 3., 1. / 3.]));

        // No effect when the cap does not bind.
        let freqs = [10., 0., 0.];
        let complete = IntervalModel::new(ModelKind::CompleteAdmissible, 1.).unwrap()
                                     .max_entropy_counts(&freqs);
        assert!(close(&complete, &[9., 0.5, 0.5]));
    }

    #[test]
    fn point_estimates() {
        let idm = IntervalModel::new(ModelKind::Idm, 1.).unwrap();
        assert!(close(&idm.point_estimate(&[3., 1.]), &[0.75, 0.25]));
        assert!(close(&idm.point_estimate(&[0., 0.]), &[0.5, 0.5]));

        let npi = IntervalModel::new(ModelKind::ANpiM, 1.).unwrap();
        assert!(close(&npi.point_estimate(&[10., 0.]), &[0.9, 0.1]));
    }

    #[test]
    fn level_fill_saturates() {
        // Total below the lower bounds, and above the upper bounds.
        assert!(level_fill(&[1., 2.], &[3., 4.], 2.) == vec![1., 2.]);
        assert!(level_fill(&[1., 2.], &[3., 4.], 9.) == vec![3., 4.]);
        assert!(close(&level_fill(&[0., 0.], &[1., 1.], 1.), &[0.5, 0.5]));
    }
}
