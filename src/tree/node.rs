//! Tree nodes and traversal.
use ndarray::prelude::*;

use data::{FrequencyTable, MISSING};
use error::{Error, LearningResult};


/// A node of a credal tree. Children are owned by their parent, one per
/// value of the split feature.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf(FrequencyTable),
    Internal {
        feature: usize,
        children: Vec<Node>,
    },
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        match *self {
            Node::Leaf(_) => true,
            Node::Internal { .. } => false,
        }
    }

    /// Depth of the subtree rooted here; a leaf has depth 0.
    pub fn depth(&self) -> usize {
        match *self {
            Node::Leaf(_) => 0,
            Node::Internal { ref children, .. } => {
                1 + children.iter().map(|c| c.depth()).max().unwrap_or(0)
            },
        }
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a FrequencyTable>) {
        match *self {
            Node::Leaf(ref freq) => out.push(freq),
            Node::Internal { ref children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            },
        }
    }

    fn count_nodes(&self) -> usize {
        match *self {
            Node::Leaf(_) => 1,
            Node::Internal { ref children, .. } => {
                1 + children.iter().map(|c| c.count_nodes()).sum::<usize>()
            },
        }
    }
}


/// A trained credal tree.
#[derive(Debug, Clone, PartialEq)]
pub struct CredalTree {
    root: Node,
    n_values: Vec<usize>,
    n_classes: usize,
}

impl CredalTree {
    pub fn new(root: Node, n_values: Vec<usize>, n_classes: usize) -> CredalTree {
        CredalTree { root, n_values, n_classes }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_features(&self) -> usize {
        self.n_values.len()
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn n_nodes(&self) -> usize {
        self.root.count_nodes()
    }

    pub fn n_leaves(&self) -> usize {
        self.leaves().len()
    }

    /// Frequency tables of all leaves, left to right.
    pub fn leaves(&self) -> Vec<&FrequencyTable> {
        let mut out = vec![];
        self.root.collect_leaves(&mut out);
        out
    }

    /// Routes a record to its leaf.
    ///
    /// Missing values are not supported: a record with any missing value
    /// fails with `Error::UnsupportedMissingValue`, whether or not its
    /// path tests that feature.
    pub fn leaf_for(&self, record: &ArrayView1<usize>) -> LearningResult<&FrequencyTable> {
        if record.len() != self.n_features() {
            return Err(Error::QueryLength { expected: self.n_features(), got: record.len() });
        }
        if let Some(feature) = record.iter().position(|&v| v == MISSING) {
            return Err(Error::UnsupportedMissingValue { feature });
        }

        let mut node = &self.root;
        loop {
            match *node {
                Node::Leaf(ref freq) => return Ok(freq),
                Node::Internal { feature, ref children } => {
                    let value = record[feature];
                    node = children.get(value)
                                   .ok_or(Error::UnknownFeatureValue {
                                       feature,
                                       value,
                                       n_values: children.len(),
                                   })?;
                },
            }
        }
    }
}
