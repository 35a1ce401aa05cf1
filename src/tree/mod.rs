//! Module defining credal decision trees.
//!
//! A `TreeBuilder` grows a categorical decision tree by repeatedly
//! splitting on the feature with the largest imprecise information gain;
//! every leaf of the resulting `CredalTree` keeps the class frequencies
//! of the training records that reached it.
pub mod node;
pub mod builder;

pub use self::node::{CredalTree, Node};
pub use self::builder::{EmptyLeafPolicy, RootSelection, TreeBuilder};
