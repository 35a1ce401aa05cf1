//! Naive credal classifier.
//!
//! Conditional counts are pooled across features as in naive Bayes, and
//! every ordered pair of classes is compared with the credal dominance
//! test of `dominance::cir`.
use std::f64;

use ndarray::prelude::*;

use classify::CredalClassifier;
use data::{Dataset, MISSING};
use dominance::{CirTest, DominanceMatrix, FeatureCounts, MarginalCounts, NonDominatedSet,
                PairCounts};
use error::{Error, LearningResult};
use numeric::rescale_underflow;


/// How missing training values of a feature are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureTreatment {
    /// Missing at random: records with a missing value are ignored for
    /// this feature.
    Mar,
    /// Not missing at random: every possible completion of the missing
    /// values is considered, and the least favourable one is used.
    NonMar,
}

/// Counts collected at training time.
#[derive(Debug, Clone, PartialEq)]
struct NaiveModel {
    /// `n(c)`.
    class_counts: Vec<f64>,
    /// One `[value, class]` matrix of `n(f, v, c)` per feature.
    joint: Vec<Array2<f64>>,
    /// `[feature, class]` matrix of `miss(f, c)`.
    missing: Array2<f64>,
    n_values: Vec<usize>,
}

impl NaiveModel {
    fn collect(data: &Dataset) -> NaiveModel {
        let k = data.n_classes();
        let mut class_counts = vec![0.; k];
        let mut joint = data.n_values()
                            .iter()
                            .map(|&n| Array2::zeros((n, k)))
                            .collect::<Vec<_>>();
        let mut missing = Array2::zeros((data.n_features(), k));

        for (i, record) in data.features().outer_iter().enumerate() {
            let (y, w) = (data.label(i), data.weight(i));
            class_counts[y] += w;
            for (f, &v) in record.iter().enumerate() {
                if v == MISSING {
                    missing[[f, y]] += w;
                } else {
                    joint[f][[v, y]] += w;
                }
            }
        }

        NaiveModel { class_counts, joint, missing, n_values: data.n_values().to_vec() }
    }

    fn n_classes(&self) -> usize {
        self.class_counts.len()
    }

    fn has_missing(&self, feature: usize) -> bool {
        self.missing.row(feature).iter().any(|&m| m > 0.)
    }

    /// Records of class `c` where `feature` is observed.
    fn observed(&self, feature: usize, c: usize) -> f64 {
        self.class_counts[c] - self.missing[[feature, c]]
    }
}


/// Naive credal classifier.
///
/// # Examples
///
/// ```
/// #[macro_use(array)]
/// extern crate ndarray;
/// extern crate credal;
///
/// # fn main() {
/// use credal::classify::*;
/// use credal::data::Dataset;
///
/// let data = Dataset::new(array![[0, 0], [0, 1], [0, 0], [1, 1], [1, 0], [1, 1]],
///                         array![0, 0, 0, 1, 1, 1],
///                         vec![2, 2], 2).unwrap();
/// let mut ncc = NaiveCredalClassifier::new(1.).unwrap();
/// ncc.train(&data).expect("Failed to train model");
///
/// let set = ncc.classify(&array![0, 0].view()).unwrap();
/// assert!(set.contains(0));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct NaiveCredalClassifier {
    test: CirTest,
    treatments: Option<Vec<FeatureTreatment>>,
    model: Option<NaiveModel>,
}

impl NaiveCredalClassifier {
    /// Constructs an untrained classifier with prior strength `s`; every
    /// feature is treated as missing at random.
    pub fn new(s: f64) -> LearningResult<NaiveCredalClassifier> {
        Ok(NaiveCredalClassifier::from_test(CirTest::new(s)?))
    }

    /// Constructs an untrained classifier around an already validated
    /// dominance test.
    pub fn from_test(test: CirTest) -> NaiveCredalClassifier {
        NaiveCredalClassifier { test, treatments: None, model: None }
    }

    /// Sets how missing training values of each feature are handled.
    /// The length is checked against the training set.
    pub fn with_treatments(mut self, treatments: Vec<FeatureTreatment>) -> NaiveCredalClassifier {
        self.treatments = Some(treatments);
        self
    }

    /// Replaces the dominance test, e.g. to change its stopping rules.
    pub fn with_test(mut self, test: CirTest) -> NaiveCredalClassifier {
        self.test = test;
        self
    }

    pub fn s(&self) -> f64 {
        self.test.s()
    }

    pub fn treatment(&self, feature: usize) -> FeatureTreatment {
        self.treatments
            .as_ref()
            .and_then(|t| t.get(feature).cloned())
            .unwrap_or(FeatureTreatment::Mar)
    }

    /// Training class counts `n(c)`.
    pub fn class_counts(&self) -> Option<&[f64]> {
        self.model.as_ref().map(|m| &m.class_counts[..])
    }

    /// The counts entering the test of `c1` against `c2` for a record.
    pub fn pair_counts(&self, record: &ArrayView1<usize>, c1: usize, c2: usize)
            -> LearningResult<PairCounts> {
        let model = self.checked_model(record)?;
        Ok(self.pair_counts_unchecked(model, record, c1, c2))
    }

    /// The naive Bayes class under a uniform prior of strength `s`.
    ///
    /// Ties go to the lowest class index.
    pub fn precise_class(&self, record: &ArrayView1<usize>) -> LearningResult<usize> {
        let model = self.checked_model(record)?;
        let k = model.n_classes() as f64;
        let s = self.s();

        let mut probs = model.class_counts
                             .iter()
                             .map(|&n| n + s / k)
                             .collect::<Vec<_>>();
        for (f, &v) in record.iter().enumerate() {
            let prior = s / (k * model.n_values[f] as f64);
            for (c, p) in probs.iter_mut().enumerate() {
                *p *= ratio(model.joint[f][[v, c]] + prior, model.observed(f, c) + s / k);
            }
            if rescale_underflow(&mut probs) {
                trace!(feature = f, "rescaled naive posteriors");
            }
        }

        let mut best = 0;
        for (c, &p) in probs.iter().enumerate() {
            if p > probs[best] {
                best = c;
            }
        }
        Ok(best)
    }

    /// Naive Bayes log-scores of every class, as used by `precise_class`.
    pub fn log_scores(&self, record: &ArrayView1<usize>) -> LearningResult<Vec<f64>> {
        let model = self.checked_model(record)?;
        let k = model.n_classes() as f64;
        let s = self.s();

        Ok((0..model.n_classes()).map(|c| {
            let mut score = (model.class_counts[c] + s / k).ln();
            for (f, &v) in record.iter().enumerate() {
                let prior = s / (k * model.n_values[f] as f64);
                score += log_ratio(model.joint[f][[v, c]] + prior, model.observed(f, c) + s / k);
            }
            score
        }).collect())
    }

    /// Soft pairwise preferences between classes from their naive Bayes
    /// log-scores.
    pub fn preference_matrix(&self, record: &ArrayView1<usize>) -> LearningResult<DominanceMatrix> {
        Ok(DominanceMatrix::from_log_scores(&self.log_scores(record)?))
    }

    fn checked_model(&self, record: &ArrayView1<usize>) -> LearningResult<&NaiveModel> {
        let model = self.model.as_ref().ok_or(Error::NotTrained)?;
        if record.len() != model.n_values.len() {
            return Err(Error::QueryLength { expected: model.n_values.len(), got: record.len() });
        }
        for (feature, &value) in record.iter().enumerate() {
            if value == MISSING {
                return Err(Error::UnsupportedMissingValue { feature });
            }
            if value >= model.n_values[feature] {
                return Err(Error::UnknownFeatureValue {
                    feature,
                    value,
                    n_values: model.n_values[feature],
                });
            }
        }
        Ok(model)
    }

    fn pair_counts_unchecked(&self, model: &NaiveModel, record: &ArrayView1<usize>,
                             c1: usize, c2: usize) -> PairCounts {
        let mut complete = vec![];
        let mut partial = vec![];

        for (f, &v) in record.iter().enumerate() {
            let gamma = model.joint[f][[v, c1]];
            let delta = model.joint[f][[v, c2]];
            match self.treatment(f) {
                FeatureTreatment::NonMar => {
                    complete.push(FeatureCounts { gamma, delta: delta + model.missing[[f, c2]] });
                },
                FeatureTreatment::Mar if !model.has_missing(f) => {
                    complete.push(FeatureCounts { gamma, delta });
                },
                FeatureTreatment::Mar => {
                    partial.push(MarginalCounts {
                        gamma,
                        delta,
                        gamma_tilde: model.observed(f, c1),
                        delta_tilde: model.observed(f, c2),
                    });
                },
            }
        }

        PairCounts {
            alpha: model.class_counts[c1],
            beta: model.class_counts[c2],
            complete,
            partial,
        }
    }
}

impl CredalClassifier for NaiveCredalClassifier {
    fn train(&mut self, data: &Dataset) -> LearningResult<()> {
        if data.n_records() == 0 {
            return Err(Error::EmptyTrainingData);
        }
        if let Some(ref treatments) = self.treatments {
            if treatments.len() != data.n_features() {
                return Err(Error::ShapeMismatch {
                    expected: format!("{} feature treatments", data.n_features()),
                    got: format!("{} feature treatments", treatments.len()),
                });
            }
        }

        let model = NaiveModel::collect(data);
        debug!(records = data.n_records(), features = data.n_features(),
               classes = data.n_classes(), "trained naive credal classifier");
        self.model = Some(model);
        Ok(())
    }

    fn classify(&self, record: &ArrayView1<usize>) -> LearningResult<NonDominatedSet> {
        let model = self.checked_model(record)?;
        let k = model.n_classes();

        let mut non_dominated = vec![true; k];
        for c1 in 0..k {
            for c2 in 0..k {
                if c1 == c2 || !non_dominated[c2] {
                    continue;
                }
                let outcome = self.test.infimum(&self.pair_counts_unchecked(model, record, c1, c2));
                if outcome.dominates() {
                    trace!(c1, c2, infimum = outcome.infimum(), "class dominated");
                    non_dominated[c2] = false;
                }
            }
        }
        Ok(NonDominatedSet::from_flags(&non_dominated))
    }

    fn n_classes(&self) -> usize {
        self.model.as_ref().map_or(0, |m| m.n_classes())
    }

    fn precise_class(&self, record: &ArrayView1<usize>) -> Option<LearningResult<usize>> {
        Some(NaiveCredalClassifier::precise_class(self, record))
    }
}

/// `num / den`, or 0 when the denominator vanishes.
fn ratio(num: f64, den: f64) -> f64 {
    if den > 0. { num / den } else { 0. }
}

fn log_ratio(num: f64, den: f64) -> f64 {
    if den > 0. { num.ln() - den.ln() } else { f64::NEG_INFINITY }
}


#[cfg(test)]
mod tests {
    use super::*;
    use stats::SetAccuracy;

    /// Feature 0 separates the classes; feature 1 is noise.
    fn separable(copies: usize) -> Dataset {
        let mut features = vec![];
        let mut labels = vec![];
        for _ in 0..copies {
            features.extend(vec![0, 0, 0, 1, 1, 0, 1, 1]);
            labels.extend(vec![0, 0, 1, 1]);
        }
        Dataset::new(Array2::from_shape_vec((4 * copies, 2), features).unwrap(),
                     Array1::from(labels), vec![2, 2], 2).unwrap()
    }

    fn trained(data: &Dataset, s: f64) -> NaiveCredalClassifier {
        let mut ncc = NaiveCredalClassifier::new(s).unwrap();
        ncc.train(data).unwrap();
        ncc
    }

    /// With 500 features both posteriors would flush to zero and tie;
    /// rescaling keeps class 1 ahead.
    #[test]
    fn precise_class_survives_underflow() {
        let d = 500;
        // Class 0 takes every value once, class 1 takes values 0..5 twice.
        let features = Array2::from_shape_fn((20, d), |(i, _)| if i < 10 { i } else { (i - 10) % 5 });
        let labels = Array1::from_shape_fn(20, |i| if i < 10 { 0 } else { 1 });
        let data = Dataset::new(features, labels, vec![10; d], 2).unwrap();
        let ncc = trained(&data, 1.);

        assert!((2.05f64 / 10.5).powi(d as i32) == 0.);
        let query = Array1::zeros(d);
        assert!(ncc.precise_class(&query.view()).unwrap() == 1);

        let scores = ncc.log_scores(&query.view()).unwrap();
        assert!(scores[1] > scores[0]);
    }

    #[test]
    fn configuration_errors() {
        assert!(NaiveCredalClassifier::new(-1.).is_err());

        let mut ncc = NaiveCredalClassifier::new(1.).unwrap()
                                                    .with_treatments(vec![FeatureTreatment::Mar]);
        assert!(matches!(ncc.train(&separable(1)), Err(Error::ShapeMismatch { .. })));
        assert!(matches!(ncc.classify(&array![0, 0].view()), Err(Error::NotTrained)));
    }

    /// Enough data makes the prediction determinate.
    #[test]
    fn determinate_with_data() {
        let ncc = trained(&separable(10), 1.);
        assert!(ncc.classify(&array![0, 0].view()).unwrap().classes() == &[0]);
        assert!(ncc.classify(&array![1, 1].view()).unwrap().classes() == &[1]);
    }

    /// With two records the prior dominates and nothing is excluded.
    #[test]
    fn indeterminate_with_little_data() {
        let data = Dataset::new(array![[0], [1]], array![0, 1], vec![2], 2).unwrap();
        let ncc = trained(&data, 2.);
        assert!(ncc.classify(&array![0].view()).unwrap().classes() == &[0, 1]);
    }

    /// A class never seen with the queried value cannot dominate.
    #[test]
    fn zero_conditional_count() {
        let ncc = trained(&separable(10), 1.);
        let counts = ncc.pair_counts(&array![0, 0].view(), 1, 0).unwrap();
        assert!(counts.complete[0].gamma == 0.);
        assert!(!CirTest::new(1.).unwrap().dominates(&counts));
    }

    /// With s = 0 the test is the precise naive Bayes comparison.
    #[test]
    fn precise_limit_agrees_with_naive_bayes() {
        let data = separable(3);
        let ncc = trained(&data, 0.);
        let set = ncc.classify(&array![0, 1].view()).unwrap();
        assert!(set.determinate() == Some(ncc.precise_class(&array![0, 1].view()).unwrap()));
    }

    #[test]
    fn query_errors() {
        let ncc = trained(&separable(2), 1.);
        assert!(matches!(ncc.classify(&array![MISSING, 0].view()),
                         Err(Error::UnsupportedMissingValue { feature: 0 })));
        assert!(matches!(ncc.classify(&array![0, 2].view()),
                         Err(Error::UnknownFeatureValue { feature: 1, value: 2, .. })));
        assert!(matches!(ncc.classify(&array![0].view()),
                         Err(Error::QueryLength { expected: 2, got: 1 })));
        assert!(ncc.classify(&array![0, 0].view()).is_ok());
    }

    #[test]
    fn missing_training_values() {
        let data = Dataset::new(array![[0, MISSING], [0, 0], [1, 1], [1, MISSING]],
                                array![0, 0, 1, 1], vec![2, 2], 2).unwrap();
        let mar = trained(&data, 1.);
        let counts = mar.pair_counts(&array![0, 0].view(), 0, 1).unwrap();
        assert!(counts.complete.len() == 1 && counts.partial.len() == 1);
        assert!(counts.partial[0].gamma_tilde == 1.);

        let mut non_mar = NaiveCredalClassifier::new(1.).unwrap()
            .with_treatments(vec![FeatureTreatment::Mar, FeatureTreatment::NonMar]);
        non_mar.train(&data).unwrap();
        let counts = non_mar.pair_counts(&array![0, 0].view(), 0, 1).unwrap();
        assert!(counts.complete.len() == 2 && counts.partial.is_empty());
        // The missing record of class 1 is completed with the queried value.
        assert!(counts.complete[1].delta == 1.);
    }

    /// Conservative completion can only make predictions less determinate.
    #[test]
    fn non_mar_is_more_cautious() {
        let data = Dataset::new(array![[0, 0], [0, 0], [0, 0], [0, MISSING],
                                       [1, 1], [1, 1], [1, MISSING], [1, MISSING]],
                                array![0, 0, 0, 0, 1, 1, 1, 1], vec![2, 2], 2).unwrap();
        let mar = trained(&data, 1.);
        let mut non_mar = NaiveCredalClassifier::new(1.).unwrap()
            .with_treatments(vec![FeatureTreatment::NonMar, FeatureTreatment::NonMar]);
        non_mar.train(&data).unwrap();

        for record in &[array![0, 0], array![1, 1], array![0, 1]] {
            let cautious = non_mar.classify(&record.view()).unwrap();
            for &c in mar.classify(&record.view()).unwrap().classes() {
                assert!(cautious.contains(c));
            }
        }
    }

    #[test]
    fn preferences() {
        let ncc = trained(&separable(5), 1.);
        let m = ncc.preference_matrix(&array![0, 0].view()).unwrap();
        assert!(m.degree(0, 1) > 0.5);
        assert_relative_eq!(m.degree(0, 1) + m.degree(1, 0), 1., epsilon = 1e-12);
    }

    #[test]
    fn evaluate_records_precise_predictions() {
        let data = separable(10);
        let ncc = trained(&data, 1.);
        let mut stats = SetAccuracy::new();
        assert!(ncc.evaluate(&data, &mut stats).unwrap() == 0);
        assert!(stats.n_instances() == 40);
        assert!(stats.precise_accuracy().is_some());
    }
}
