//! Serialisable classifier configurations.
//!
//! Every field has a default, so `{}` is a valid configuration. All
//! configuration errors are raised by `validate()` (or `build()`) before
//! any training starts.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ndarray::Array2;
use serde::de::DeserializeOwned;

use classify::{CredalClassifier, CredalTreeClassifier, FeatureTreatment, LazyNaiveCredal,
               NaiveCredalClassifier};
use data::CostMatrix;
use dominance::IntervalDominance;
use error::{Error, LearningResult};
use imprecise::{Criterion, EntropyEvaluator};
use tree::{EmptyLeafPolicy, RootSelection, TreeBuilder};


/// Dominance rule of a tree classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "kebab-case")]
pub enum DominanceConfig {
    IntervalOverlap,
    Graded { threshold: f64 },
    /// `costs[i][j]` is the cost of predicting `i` when the truth is `j`.
    MinimumRisk { costs: Vec<Vec<f64>> },
}

impl Default for DominanceConfig {
    fn default() -> DominanceConfig {
        DominanceConfig::IntervalOverlap
    }
}

impl DominanceConfig {
    pub fn build(&self) -> LearningResult<IntervalDominance> {
        match *self {
            DominanceConfig::IntervalOverlap => Ok(IntervalDominance::IntervalOverlap),
            DominanceConfig::Graded { threshold } => {
                let rule = IntervalDominance::Graded { threshold };
                rule.validate(0)?;
                Ok(rule)
            },
            DominanceConfig::MinimumRisk { ref costs } => {
                Ok(IntervalDominance::MinimumRisk(cost_matrix(costs)?))
            },
        }
    }
}

fn cost_matrix(rows: &[Vec<f64>]) -> LearningResult<CostMatrix> {
    let k = rows.len();
    if rows.iter().any(|r| r.len() != k) {
        return Err(Error::InvalidCostMatrix { reason: "rows must all have one cost per class".into() });
    }
    let flat = rows.iter()
                   .flat_map(|r| r.iter().cloned())
                   .collect::<Vec<_>>();
    let costs = Array2::from_shape_vec((k, k), flat)
                       .map_err(|e| Error::InvalidCostMatrix { reason: e.to_string() })?;
    CostMatrix::new(costs)
}


/// Configuration of a credal decision tree.
///
/// # Examples
///
/// ```
/// use credal::config::{from_json_str, TreeConfig};
/// use credal::imprecise::Criterion;
///
/// let config: TreeConfig = from_json_str(r#"{"s": 2.0, "criterion": "npi-m"}"#).unwrap();
/// assert!(config.criterion == Criterion::NpiM);
/// assert!(config.max_depth.is_none());
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TreeConfig {
    pub s: f64,
    pub criterion: Criterion,
    /// Stop level: maximum depth of the tree.
    pub max_depth: Option<usize>,
    pub root_selection: RootSelection,
    pub empty_leaf: EmptyLeafPolicy,
    pub seed: Option<u64>,
    pub dominance: DominanceConfig,
}

impl Default for TreeConfig {
    fn default() -> TreeConfig {
        TreeConfig {
            s: 1.,
            criterion: Criterion::Idm,
            max_depth: None,
            root_selection: RootSelection::Best,
            empty_leaf: EmptyLeafPolicy::Degenerate,
            seed: None,
            dominance: DominanceConfig::default(),
        }
    }
}

impl TreeConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> LearningResult<TreeConfig> {
        from_json_file(path)
    }

    pub fn validate(&self) -> LearningResult<()> {
        self.build().map(|_| ())
    }

    /// Builds the untrained classifier.
    pub fn build(&self) -> LearningResult<CredalTreeClassifier> {
        if let RootSelection::KthBest(0) = self.root_selection {
            return Err(Error::InvalidRootSelection { reason: "k is 1-based".into() });
        }
        let dominance = self.dominance.build()?;
        let evaluator = EntropyEvaluator::new(self.split_criterion(&dominance)?, self.s)?;
        let builder = TreeBuilder::new(evaluator).max_depth(self.max_depth)
                                                 .root_selection(self.root_selection)
                                                 .empty_leaf(self.empty_leaf)
                                                 .seed(self.seed);
        Ok(CredalTreeClassifier::new(builder, dominance))
    }

    /// The configured criterion; cost-weighted entropy without explicit
    /// weights takes them from the minimum-risk cost matrix.
    fn split_criterion(&self, dominance: &IntervalDominance) -> LearningResult<Criterion> {
        match self.criterion {
            Criterion::CostWeighted { ref weights } if weights.is_empty() => match *dominance {
                IntervalDominance::MinimumRisk(ref costs) => {
                    Ok(Criterion::CostWeighted { weights: costs.class_weights() })
                },
                _ => Err(Error::InvalidClassWeights {
                    reason: "no weights given and no cost matrix to derive them from".into(),
                }),
            },
            ref criterion => Ok(criterion.clone()),
        }
    }
}


/// Configuration of a naive credal classifier. Setting `bandwidths`
/// selects the lazy local variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NaiveConfig {
    pub s: f64,
    /// One entry per feature; all features are missing at random if
    /// absent.
    pub treatments: Option<Vec<FeatureTreatment>>,
    pub bandwidths: Option<Vec<usize>>,
}

impl Default for NaiveConfig {
    fn default() -> NaiveConfig {
        NaiveConfig { s: 1., treatments: None, bandwidths: None }
    }
}

impl NaiveConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> LearningResult<NaiveConfig> {
        from_json_file(path)
    }

    pub fn validate(&self) -> LearningResult<()> {
        self.build().map(|_| ())
    }

    /// Builds the untrained classifier.
    pub fn build(&self) -> LearningResult<Box<dyn CredalClassifier>> {
        match self.bandwidths {
            Some(ref bandwidths) => {
                let mut lazy = LazyNaiveCredal::new(bandwidths.clone(), self.s)?;
                if let Some(ref treatments) = self.treatments {
                    lazy = lazy.with_treatments(treatments.clone());
                }
                Ok(Box::new(lazy))
            },
            None => {
                let mut ncc = NaiveCredalClassifier::new(self.s)?;
                if let Some(ref treatments) = self.treatments {
                    ncc = ncc.with_treatments(treatments.clone());
                }
                Ok(Box::new(ncc))
            },
        }
    }
}


/// Parses a configuration from a JSON string.
pub fn from_json_str<T: DeserializeOwned>(json: &str) -> LearningResult<T> {
    Ok(serde_json::from_str(json)?)
}

/// Parses a configuration from a JSON file.
pub fn from_json_file<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> LearningResult<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
