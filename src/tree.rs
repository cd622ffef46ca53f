use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

use crate::approximation::Approximation;
use crate::error::{RegForestError, Result};
use crate::training_set::OrthogonalSplit;
use crate::FittedModel;

/// Stable handle of a node inside its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub enum RegressionNode {
    Leaf(Approximation),
    Internal {
        split: OrthogonalSplit,
        lower: NodeId,
        upper: NodeId,
    },
}

impl RegressionNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }
}

/// Regression tree stored as an arena. Children are only ever referenced by
/// their single parent, so the arena is a strict tree rooted at [`RegressionTree::ROOT`].
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<RegressionNode>,
}

impl RegressionTree {
    pub const ROOT: NodeId = NodeId(0);

    pub fn new(root: Approximation) -> Self {
        Self {
            nodes: vec![RegressionNode::Leaf(root)],
        }
    }

    pub fn node(&self, id: NodeId) -> &RegressionNode {
        &self.nodes[id.0]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Replaces the approximation of a leaf.
    pub fn set_approximation(&mut self, id: NodeId, approximation: Approximation) -> Result<()> {
        match &mut self.nodes[id.0] {
            RegressionNode::Leaf(a) => {
                *a = approximation;
                Ok(())
            }
            RegressionNode::Internal { .. } => Err(RegForestError::NodeAlreadySplit { node: id }),
        }
    }

    /// Turns a leaf into an internal node with two fresh leaves. Both children
    /// start from a copy of the parent's approximation until a grower refits them.
    pub fn split_leaf(&mut self, id: NodeId, split: OrthogonalSplit) -> Result<(NodeId, NodeId)> {
        let approximation = match &self.nodes[id.0] {
            RegressionNode::Leaf(a) => a.clone(),
            RegressionNode::Internal { .. } => {
                return Err(RegForestError::NodeAlreadySplit { node: id })
            }
        };
        let lower = NodeId(self.nodes.len());
        let upper = NodeId(self.nodes.len() + 1);
        self.nodes.push(RegressionNode::Leaf(approximation.clone()));
        self.nodes.push(RegressionNode::Leaf(approximation));
        self.nodes[id.0] = RegressionNode::Internal {
            split,
            lower,
            upper,
        };
        Ok((lower, upper))
    }

    /// Leaf reached by `input`.
    pub fn leaf_id(&self, input: ArrayView1<f64>) -> NodeId {
        let mut id = Self::ROOT;
        while let RegressionNode::Internal {
            split,
            lower,
            upper,
        } = &self.nodes[id.0]
        {
            id = if split.is_lower(input) { *lower } else { *upper };
        }
        id
    }

    pub fn eval(&self, input: ArrayView1<f64>) -> f64 {
        match &self.nodes[self.leaf_id(input).0] {
            RegressionNode::Leaf(a) => a.eval(input),
            RegressionNode::Internal { .. } => unreachable!("leaf_id always ends on a leaf"),
        }
    }

    pub fn leaves(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_leaf())
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub fn split_count(&self) -> usize {
        self.nodes.len() - self.leaf_count()
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(Self::ROOT, 0)];
        while let Some((id, depth)) = stack.pop() {
            match &self.nodes[id.0] {
                RegressionNode::Leaf(_) => max_depth = max_depth.max(depth),
                RegressionNode::Internal { lower, upper, .. } => {
                    stack.push((*lower, depth + 1));
                    stack.push((*upper, depth + 1));
                }
            }
        }
        max_depth
    }
}

impl FittedModel for RegressionTree {
    fn predict(&self, x: ArrayView2<f64>) -> Array1<f64> {
        x.axis_iter(Axis(0)).map(|row| self.eval(row)).collect()
    }
}
