//! Lazy naive credal classification on a neighbourhood of the query.
use ndarray::prelude::*;
use itertools::Itertools;

use classify::{CredalClassifier, FeatureTreatment, NaiveCredalClassifier};
use data::{Dataset, MISSING};
use dominance::{CirTest, NonDominatedSet};
use error::{Error, LearningResult};


/// Per-query state of a `LazyNaiveCredal`, owned by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalContext {
    /// Number of nearest records the last answer was computed on.
    pub bandwidth: usize,
    /// Training record indices, nearest first.
    pub ranking: Vec<usize>,
    /// Index of the query in the caller's sequence.
    pub instance: usize,
}

impl LocalContext {
    /// Ranks the training records by Hamming distance to `query`, ties by
    /// index. A missing training value never matches.
    pub fn new(training: &Dataset, query: &ArrayView1<usize>, instance: usize) -> LocalContext {
        let ranking = (0..training.n_records())
                          .sorted_by_key(|&i| (hamming(&training.record(i), query), i))
                          .collect();
        LocalContext { bandwidth: 0, ranking, instance }
    }

    /// The `bandwidth` nearest training records.
    pub fn neighbours(&self) -> &[usize] {
        &self.ranking[..self.bandwidth.min(self.ranking.len())]
    }
}

fn hamming(a: &ArrayView1<usize>, b: &ArrayView1<usize>) -> usize {
    a.iter()
     .zip(b.iter())
     .filter(|&(&x, &y)| x == MISSING || x != y)
     .count()
}


/// Naive credal classifier trained, for each query, on its nearest
/// training records only.
///
/// Bandwidths are tried in increasing order; the first determinate answer
/// is returned, otherwise the answer on the largest neighbourhood.
#[derive(Debug, Clone)]
pub struct LazyNaiveCredal {
    bandwidths: Vec<usize>,
    test: CirTest,
    treatments: Option<Vec<FeatureTreatment>>,
    training: Option<Dataset>,
}

impl LazyNaiveCredal {
    /// Constructs a lazy classifier.
    ///
    /// # Arguments
    ///
    /// * `bandwidths` - Neighbourhood sizes to try; zeros are ignored.
    /// * `s` - IDM prior strength of every local classifier.
    pub fn new(bandwidths: Vec<usize>, s: f64) -> LearningResult<LazyNaiveCredal> {
        let test = CirTest::new(s)?;
        let bandwidths = bandwidths.into_iter()
                                   .filter(|&b| b > 0)
                                   .sorted()
                                   .dedup()
                                   .collect::<Vec<_>>();
        if bandwidths.is_empty() {
            return Err(Error::InvalidBandwidths);
        }
        Ok(LazyNaiveCredal { bandwidths, test, treatments: None, training: None })
    }

    pub fn with_treatments(mut self, treatments: Vec<FeatureTreatment>) -> LazyNaiveCredal {
        self.treatments = Some(treatments);
        self
    }

    pub fn bandwidths(&self) -> &[usize] {
        &self.bandwidths
    }

    pub fn s(&self) -> f64 {
        self.test.s()
    }

    /// Builds a fresh context for a query.
    pub fn context(&self, record: &ArrayView1<usize>, instance: usize)
            -> LearningResult<LocalContext> {
        let training = self.training.as_ref().ok_or(Error::NotTrained)?;
        Ok(LocalContext::new(training, record, instance))
    }

    /// Classifies `record`, leaving in `context` the bandwidth that was
    /// used.
    pub fn classify_in(&self, context: &mut LocalContext, record: &ArrayView1<usize>)
            -> LearningResult<NonDominatedSet> {
        let training = self.training.as_ref().ok_or(Error::NotTrained)?;
        let n = training.n_records();

        let mut last = None;
        for &bandwidth in &self.bandwidths {
            context.bandwidth = bandwidth.min(n);
            let local = training.select(context.neighbours());

            let mut ncc = NaiveCredalClassifier::from_test(self.test);
            if let Some(ref treatments) = self.treatments {
                ncc = ncc.with_treatments(treatments.clone());
            }
            ncc.train(&local)?;
            let set = ncc.classify(record)?;

            trace!(instance = context.instance, bandwidth = context.bandwidth,
                   size = set.len(), "local prediction");
            if set.is_determinate() || bandwidth >= n {
                return Ok(set);
            }
            last = Some(set);
        }
        last.ok_or(Error::InvalidBandwidths)
    }
}

impl CredalClassifier for LazyNaiveCredal {
    /// Stores the training set; local models are built per query.
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
        self.training = Some(data.clone());
        Ok(())
    }

    fn classify(&self, record: &ArrayView1<usize>) -> LearningResult<NonDominatedSet> {
        let mut context = self.context(record, 0)?;
        self.classify_in(&mut context, record)
    }

    fn n_classes(&self) -> usize {
        self.training.as_ref().map_or(0, |t| t.n_classes())
    }
}
