//! Credal decision tree classifier.
use ndarray::prelude::*;

use classify::CredalClassifier;
use data::Dataset;
use dominance::{IntervalDominance, NonDominatedSet};
use error::{Error, LearningResult};
use imprecise::CredalInterval;
use tree::{CredalTree, TreeBuilder};


/// Routes a query to its leaf, turns the leaf's class frequencies into
/// credal intervals and returns the classes the configured dominance rule
/// keeps.
///
/// # Examples
///
/// ```
/// #[macro_use(array)]
/// extern crate ndarray;
/// extern crate credal;
///
/// # fn main() {
/// use ndarray::prelude::*;
/// use credal::classify::*;
/// use credal::data::Dataset;
/// use credal::dominance::IntervalDominance;
/// use credal::imprecise::*;
/// use credal::tree::TreeBuilder;
///
/// let builder = TreeBuilder::new(EntropyEvaluator::new(Criterion::Idm, 1.).unwrap());
/// let mut tree = CredalTreeClassifier::new(builder, IntervalDominance::IntervalOverlap);
///
/// let mut features = vec![];
/// let mut labels = vec![];
/// for i in 0..20 {
///     features.push(i % 2);
///     labels.push(i % 2);
/// }
/// let data = Dataset::new(Array2::from_shape_vec((20, 1), features).unwrap(),
///                         Array1::from(labels), vec![2], 2).unwrap();
/// tree.train(&data).expect("Failed to train model");
///
/// let set = tree.classify(&array![1].view()).unwrap();
/// assert!(set.classes() == &[1]);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CredalTreeClassifier {
    builder: TreeBuilder,
    dominance: IntervalDominance,
    tree: Option<CredalTree>,
}

impl CredalTreeClassifier {
    /// Constructs an untrained tree classifier.
    ///
    /// # Arguments
    ///
    /// * `builder` - Tree induction settings and split criterion.
    /// * `dominance` - Rule turning leaf intervals into a set of classes.
    pub fn new(builder: TreeBuilder, dominance: IntervalDominance) -> CredalTreeClassifier {
        CredalTreeClassifier { builder, dominance, tree: None }
    }

    pub fn builder(&self) -> &TreeBuilder {
        &self.builder
    }

    pub fn dominance(&self) -> &IntervalDominance {
        &self.dominance
    }

    /// The trained tree, if any.
    pub fn tree(&self) -> Option<&CredalTree> {
        self.tree.as_ref()
    }

    /// Credal intervals of the leaf reached by `record`.
    pub fn intervals(&self, record: &ArrayView1<usize>) -> LearningResult<Vec<CredalInterval>> {
        let tree = self.tree.as_ref().ok_or(Error::NotTrained)?;
        let leaf = tree.leaf_for(record)?;
        Ok(self.builder.evaluator().interval_model().bounds(leaf.counts()))
    }

    /// The most probable class under the point estimate of the record's
    /// leaf. Ties go to the lowest class index.
    pub fn precise_class(&self, record: &ArrayView1<usize>) -> LearningResult<usize> {
        let tree = self.tree.as_ref().ok_or(Error::NotTrained)?;
        let leaf = tree.leaf_for(record)?;
        let point = self.builder.evaluator().interval_model().point_estimate(leaf.counts());

        let mut best = 0;
        for (c, &p) in point.iter().enumerate() {
            if p > point[best] {
                best = c;
            }
        }
        Ok(best)
    }
}

impl CredalClassifier for CredalTreeClassifier {
    fn train(&mut self, data: &Dataset) -> LearningResult<()> {
        self.dominance.validate(data.n_classes())?;
        self.tree = Some(self.builder.fit(data)?);
        Ok(())
    }

    fn classify(&self, record: &ArrayView1<usize>) -> LearningResult<NonDominatedSet> {
        let bounds = self.intervals(record)?;
        Ok(self.dominance.resolve(&bounds))
    }

    fn n_classes(&self) -> usize {
        self.tree.as_ref().map_or(0, |t| t.n_classes())
    }

    fn precise_class(&self, record: &ArrayView1<usize>) -> Option<LearningResult<usize>> {
        Some(CredalTreeClassifier::precise_class(self, record))
    }
}
