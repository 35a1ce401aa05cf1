//! Imprecise entropy: the split criterion of credal decision trees.
use numeric::shannon_entropy;
use error::{Error, LearningResult};
use imprecise::interval::{IntervalModel, ModelKind};


/// Which entropy measure scores a frequency vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Criterion {
    /// Maximum entropy over the IDM credal set.
    Idm,
    /// Maximum entropy over the NPI-M envelope.
    NpiM,
    /// Shannon entropy of the NPI-transformed distribution.
    ANpiM,
    /// Maximum entropy over the complete-admissible NPI model.
    CompleteAdmissible,
    /// NPI-transformed counts divided by per-class weights, renormalised.
    /// A tree configuration may leave `weights` empty to derive them from
    /// its cost matrix.
    CostWeighted {
        #[serde(default)]
        weights: Vec<f64>,
    },
}

impl Criterion {
    /// The interval model whose credal set this criterion maximises over.
    pub fn model_kind(&self) -> ModelKind {
        match *self {
            Criterion::Idm => ModelKind::Idm,
            Criterion::NpiM => ModelKind::NpiM,
            Criterion::ANpiM | Criterion::CostWeighted { .. } => ModelKind::ANpiM,
            Criterion::CompleteAdmissible => ModelKind::CompleteAdmissible,
        }
    }
}


/// Computes the imprecise entropy of class frequencies.
///
/// # Examples
///
/// ```
/// use credal::imprecise::*;
///
/// let h = EntropyEvaluator::new(Criterion::Idm, 1.).unwrap();
/// // One virtual observation makes a pure node look slightly mixed.
/// assert!(h.entropy(&[10., 0.]) > 0.);
/// // Without virtual observations it is Shannon entropy.
/// let h = EntropyEvaluator::new(Criterion::Idm, 0.).unwrap();
/// assert!(h.entropy(&[10., 0.]) == 0.);
/// assert!(h.entropy(&[5., 5.]) == 1.);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EntropyEvaluator {
    criterion: Criterion,
    model: IntervalModel,
}

impl EntropyEvaluator {
    /// Constructs an entropy evaluator.
    ///
    /// # Arguments
    ///
    /// * `criterion` - Entropy measure.
    /// * `s` - IDM prior strength (ignored by NPI-based criteria, but
    ///         still validated).
    pub fn new(criterion: Criterion, s: f64) -> LearningResult<EntropyEvaluator> {
        if let Criterion::CostWeighted { ref weights } = criterion {
            if weights.is_empty() {
                return Err(Error::InvalidClassWeights {
                    reason: "no weights given".into(),
                });
            }
            if weights.iter().any(|w| !w.is_finite() || *w <= 0.) {
                return Err(Error::InvalidClassWeights {
                    reason: format!("weights must be finite and positive (got {:?})", weights),
                });
            }
        }
        let model = IntervalModel::new(criterion.model_kind(), s)?;

        Ok(EntropyEvaluator { criterion, model })
    }

    pub fn criterion(&self) -> &Criterion {
        &self.criterion
    }

    /// The interval model backing this criterion.
    pub fn interval_model(&self) -> IntervalModel {
        self.model
    }

    /// Checks that the criterion can score `n_classes` classes.
    pub fn check_classes(&self, n_classes: usize) -> LearningResult<()> {
        if n_classes == 0 {
            return Err(Error::NoClasses);
        }
        if let Criterion::CostWeighted { ref weights } = self.criterion {
            if weights.len() != n_classes {
                return Err(Error::InvalidClassWeights {
                    reason: format!("expected {} weights, got {}", n_classes, weights.len()),
                });
            }
        }
        Ok(())
    }

    /// Returns the imprecise entropy (bits) of `freqs`.
    ///
    /// The result is in `[0, log2(K)]`; it is 0 for an all-zero vector
    /// and for a single class.
    pub fn entropy(&self, freqs: &[f64]) -> f64 {
        let total = freqs.iter().sum::<f64>();
        if freqs.len() <= 1 || !(total > 0.) {
            return 0.;
        }

        let point = self.model.max_entropy_counts(freqs);

        match self.criterion {
            Criterion::CostWeighted { ref weights } => {
                let reweighted = point.iter()
                                      .enumerate()
                                      .map(|(k, c)| c / weights.get(k).cloned().unwrap_or(1.))
                                      .collect::<Vec<_>>();
                shannon_entropy(&reweighted)
            },
            _ => shannon_entropy(&point),
        }
    }
}
