//! Recursive induction of credal decision trees.
use std::f64;

use pcg_rand::Pcg32;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use ordered_float::OrderedFloat;
use itertools::Itertools;

use data::{Dataset, FrequencyTable, MISSING};
use error::{Error, LearningResult};
use imprecise::EntropyEvaluator;
use tree::node::{CredalTree, Node};


/// How the root split feature is chosen. Every other node always uses
/// the feature of strictly largest gain (lowest index on ties).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RootSelection {
    /// The feature of largest gain.
    Best,
    /// The feature of `k`-th largest gain (1-based). Falls back to the
    /// best feature if there is no such feature or its gain is not
    /// positive.
    KthBest(usize),
    /// A feature drawn uniformly among those of positive gain; the best
    /// feature if none is positive.
    RandomPositive,
}

/// What a child with no training records becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyLeafPolicy {
    /// A leaf with all-zero counts.
    Degenerate,
    /// A leaf with a copy of the parent's counts.
    InheritParent,
}


/// Grows credal trees with a given entropy criterion.
///
/// # Examples
///
/// ```
/// #[macro_use(array)]
/// extern crate ndarray;
/// extern crate credal;
///
/// # fn main() {
/// use credal::data::Dataset;
/// use credal::imprecise::{Criterion, EntropyEvaluator};
/// use credal::tree::TreeBuilder;
///
/// let data = Dataset::new(array![[0, 0], [0, 1], [1, 0], [1, 1]],
///                         array![0, 0, 1, 1],
///                         vec![2, 2], 2).unwrap();
/// let h = EntropyEvaluator::new(Criterion::Idm, 0.).unwrap();
/// let tree = TreeBuilder::new(h).fit(&data).expect("Failed to grow tree");
///
/// // Feature 0 separates the classes.
/// assert!(tree.depth() == 1);
/// assert!(tree.n_leaves() == 2);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    evaluator: EntropyEvaluator,
    max_depth: Option<usize>,
    root_selection: RootSelection,
    empty_leaf: EmptyLeafPolicy,
    seed: Option<u64>,
}

impl TreeBuilder {
    /// Constructs a builder with no stop level, best-gain root and
    /// degenerate empty leaves.
    pub fn new(evaluator: EntropyEvaluator) -> TreeBuilder {
        TreeBuilder {
            evaluator,
            max_depth: None,
            root_selection: RootSelection::Best,
            empty_leaf: EmptyLeafPolicy::Degenerate,
            seed: None,
        }
    }

    /// Sets the stop level: nodes at this depth always become leaves.
    pub fn max_depth(mut self, max_depth: Option<usize>) -> TreeBuilder {
        self.max_depth = max_depth;
        self
    }

    pub fn root_selection(mut self, root_selection: RootSelection) -> TreeBuilder {
        self.root_selection = root_selection;
        self
    }

    pub fn empty_leaf(mut self, empty_leaf: EmptyLeafPolicy) -> TreeBuilder {
        self.empty_leaf = empty_leaf;
        self
    }

    /// Seeds the PRNG used by `RootSelection::RandomPositive`.
    pub fn seed(mut self, seed: Option<u64>) -> TreeBuilder {
        self.seed = seed;
        self
    }

    pub fn evaluator(&self) -> &EntropyEvaluator {
        &self.evaluator
    }

    /// Checks the builder against a number of classes.
    pub fn validate(&self, n_classes: usize) -> LearningResult<()> {
        self.evaluator.check_classes(n_classes)?;
        if let RootSelection::KthBest(0) = self.root_selection {
            return Err(Error::InvalidRootSelection {
                reason: "k is 1-based; k = 0 selects nothing".into(),
            });
        }
        Ok(())
    }

    /// Grows a tree on a training set.
    ///
    /// # Errors
    ///
    /// - `Error::EmptyTrainingData` if there are no records.
    /// - `Error::MissingTrainingValue` if a record has a missing value;
    ///   missing values must be handled before training a tree.
    /// - Configuration errors from `validate()`.
    pub fn fit(&self, data: &Dataset) -> LearningResult<CredalTree> {
        self.validate(data.n_classes())?;

        if data.n_records() == 0 {
            return Err(Error::EmptyTrainingData);
        }
        if data.has_missing() {
            for (i, row) in data.features().outer_iter().enumerate() {
                if let Some(f) = row.iter().position(|&v| v == MISSING) {
                    return Err(Error::MissingTrainingValue { record: i, feature: f });
                }
            }
        }

        let mut rng = match self.seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::new_unseeded(),
        };
        let indices = (0..data.n_records()).collect::<Vec<_>>();
        let mut used = vec![false; data.n_features()];

        let root = self.grow(data, &indices, &mut used, 0, &mut rng);
        let tree = CredalTree::new(root, data.n_values().to_vec(), data.n_classes());

        debug!(records = data.n_records(),
               depth = tree.depth(),
               leaves = tree.n_leaves(),
               "grew credal tree");

        Ok(tree)
    }

    /// Information gain of splitting `indices` on `feature`:
    /// `H(parent) - sum_v (|part_v| / |parent|) H(part_v)`.
    pub fn information_gain(&self, data: &Dataset, indices: &[usize], feature: usize) -> f64 {
        let parent = data.frequencies(indices);
        let parent_entropy = self.evaluator.entropy(parent.counts());
        self.gain(data, indices, feature, &parent, parent_entropy)
    }

    fn gain(&self, data: &Dataset, indices: &[usize], feature: usize,
            parent: &FrequencyTable, parent_entropy: f64) -> f64 {
        let total = parent.total();
        if !(total > 0.) {
            return 0.;
        }

        let n_values = data.n_values()[feature];
        let mut counts = vec![vec![0.; data.n_classes()]; n_values];
        for &i in indices {
            counts[data.record(i)[feature]][data.label(i)] += data.weight(i);
        }

        let children = counts.iter()
                             .map(|c| {
                                 let weight = c.iter().sum::<f64>() / total;
                                 if weight > 0. { weight * self.evaluator.entropy(c) } else { 0. }
                             })
                             .sum::<f64>();

        parent_entropy - children
    }

    fn grow(&self, data: &Dataset, indices: &[usize], used: &mut Vec<bool>,
            depth: usize, rng: &mut Pcg32) -> Node {
        let freq = data.frequencies(indices);

        if freq.is_empty() || self.max_depth.map_or(false, |d| depth >= d) {
            return Node::Leaf(freq);
        }

        let parent_entropy = self.evaluator.entropy(freq.counts());
        let gains = (0..data.n_features())
                        .map(|f| if used[f] {
                            f64::NEG_INFINITY
                        } else {
                            self.gain(data, indices, f, &freq, parent_entropy)
                        })
                        .collect::<Vec<_>>();

        let chosen = if depth == 0 {
            self.select_root(&gains, rng)
        } else {
            best_feature(&gains)
        };

        let feature = match chosen {
            Some(f) if gains[f] > 0. => f,
            _ => return Node::Leaf(freq),
        };
        trace!(depth, feature, gain = gains[feature], records = indices.len(), "split");

        let mut parts = vec![vec![]; data.n_values()[feature]];
        for &i in indices {
            parts[data.record(i)[feature]].push(i);
        }

        used[feature] = true;
        let children = parts.iter()
                            .map(|part| match self.empty_leaf {
                                EmptyLeafPolicy::InheritParent if part.is_empty() => {
                                    Node::Leaf(freq.clone())
                                },
                                _ => self.grow(data, part, used, depth + 1, rng),
                            })
                            .collect::<Vec<_>>();
        used[feature] = false;

        Node::Internal { feature, children }
    }

    fn select_root(&self, gains: &[f64], rng: &mut Pcg32) -> Option<usize> {
        match self.root_selection {
            RootSelection::Best => best_feature(gains),
            RootSelection::KthBest(k) => {
                let ranked = (0..gains.len())
                                 .filter(|&f| gains[f].is_finite())
                                 .sorted_by_key(|&f| (OrderedFloat(-gains[f]), f))
                                 .collect::<Vec<_>>();
                match ranked.get(k.saturating_sub(1)) {
                    Some(&f) if gains[f] > 0. => Some(f),
                    _ => best_feature(gains),
                }
            },
            RootSelection::RandomPositive => {
                let positive = (0..gains.len())
                                   .filter(|&f| gains[f] > 0.)
                                   .collect::<Vec<_>>();
                match positive.choose(rng) {
                    Some(&f) => Some(f),
                    None => best_feature(gains),
                }
            },
        }
    }
}

/// Feature of strictly largest finite gain, lowest index on ties.
fn best_feature(gains: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (f, &g) in gains.iter().enumerate() {
        if !g.is_finite() {
            continue;
        }
        match best {
            Some(b) if gains[b] >= g => {},
            _ => best = Some(f),
        }
    }
    best
}
