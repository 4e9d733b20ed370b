//! Single regression tree in flat-array (structure-of-arrays) layout.
//!
//! The serialized form mirrors the `tree_` attribute of a fitted scikit-learn
//! estimator: parallel `children_left`, `children_right`, `feature`,
//! `threshold` and `value` arrays, with `-1` marking a missing child.
//!
//! Construction goes through [`Tree::from_arrays`], which validates the
//! structure once. After that, [`Tree::predict_row`] can walk the tree without
//! bounds or cycle checks.

use serde::Deserialize;
use thiserror::Error;

/// Child index used by the exporter for "no child"
const TREE_LEAF: i64 = -1;

/// Per-node output as exported. Single-output regressors write either a bare
/// number or the nested `[[v]]` shape of `tree_.value`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NodeValue {
    Scalar(f64),
    Nested(Vec<Vec<f64>>),
}

impl NodeValue {
    fn scalar(&self) -> Option<f64> {
        match self {
            NodeValue::Scalar(v) => Some(*v),
            NodeValue::Nested(rows) => rows.first().and_then(|r| r.first()).copied(),
        }
    }
}

/// Raw tree arrays as they appear in the model artifact
#[derive(Debug, Clone, Deserialize)]
pub struct TreeArrays {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<NodeValue>,
}

/// Structural problems found while building a [`Tree`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    #[error("tree has no nodes")]
    Empty,
    #[error("`{field}` has {len} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        len: usize,
        expected: usize,
    },
    #[error("node {node} has only one child")]
    HalfLeaf { node: usize },
    #[error("node {node}: {side} child {child} is out of bounds ({n_nodes} nodes)")]
    ChildOutOfBounds {
        node: usize,
        side: &'static str,
        child: i64,
        n_nodes: usize,
    },
    #[error("node {node} references itself")]
    SelfLoop { node: usize },
    #[error("cycle detected at node {node}")]
    CycleDetected { node: usize },
    #[error("node {node} is reachable by more than one path")]
    DuplicateVisit { node: usize },
    #[error("node {node} is unreachable from the root")]
    UnreachableNode { node: usize },
    #[error("node {node} splits on feature {feature}, model has {n_features}")]
    FeatureOutOfRange {
        node: usize,
        feature: i64,
        n_features: usize,
    },
    #[error("node {node} has a NaN threshold")]
    NanThreshold { node: usize },
    #[error("leaf {node} has no usable value")]
    MissingLeafValue { node: usize },
}

/// Validated regression tree
#[derive(Debug, Clone)]
pub struct Tree {
    left: Box<[u32]>,
    right: Box<[u32]>,
    feature: Box<[u32]>,
    threshold: Box<[f64]>,
    value: Box<[f64]>,
    is_leaf: Box<[bool]>,
}

impl Tree {
    /// Build a tree from exported arrays, checking that every split refers to
    /// one of `n_features` columns and that the nodes form a proper tree
    /// rooted at 0.
    pub fn from_arrays(raw: TreeArrays, n_features: usize) -> Result<Self, TreeError> {
        let n_nodes = raw.children_left.len();
        if n_nodes == 0 {
            return Err(TreeError::Empty);
        }
        for (field, len) in [
            ("children_right", raw.children_right.len()),
            ("feature", raw.feature.len()),
            ("threshold", raw.threshold.len()),
            ("value", raw.value.len()),
        ] {
            if len != n_nodes {
                return Err(TreeError::LengthMismatch {
                    field,
                    len,
                    expected: n_nodes,
                });
            }
        }

        let mut left = Vec::with_capacity(n_nodes);
        let mut right = Vec::with_capacity(n_nodes);
        let mut feature = Vec::with_capacity(n_nodes);
        let mut is_leaf = Vec::with_capacity(n_nodes);
        let mut value = Vec::with_capacity(n_nodes);

        for node in 0..n_nodes {
            let (l, r) = (raw.children_left[node], raw.children_right[node]);
            let leaf = match (l == TREE_LEAF, r == TREE_LEAF) {
                (true, true) => true,
                (false, false) => false,
                _ => return Err(TreeError::HalfLeaf { node }),
            };
            is_leaf.push(leaf);

            if leaf {
                left.push(0);
                right.push(0);
                feature.push(0);
                let v = raw.value[node]
                    .scalar()
                    .filter(|v| !v.is_nan())
                    .ok_or(TreeError::MissingLeafValue { node })?;
                value.push(v);
                continue;
            }

            left.push(child_index(node, "left", l, n_nodes)?);
            right.push(child_index(node, "right", r, n_nodes)?);

            let f = raw.feature[node];
            if f < 0 || f as usize >= n_features {
                return Err(TreeError::FeatureOutOfRange {
                    node,
                    feature: f,
                    n_features,
                });
            }
            feature.push(f as u32);
            if raw.threshold[node].is_nan() {
                return Err(TreeError::NanThreshold { node });
            }
            value.push(0.0);
        }

        let tree = Self {
            left: left.into_boxed_slice(),
            right: right.into_boxed_slice(),
            feature: feature.into_boxed_slice(),
            threshold: raw.threshold.into_boxed_slice(),
            value: value.into_boxed_slice(),
            is_leaf: is_leaf.into_boxed_slice(),
        };
        tree.check_topology()?;
        Ok(tree)
    }

    /// Iterative DFS with color marking: 0 = unvisited, 1 = on stack, 2 = done.
    fn check_topology(&self) -> Result<(), TreeError> {
        let n_nodes = self.n_nodes();
        let mut color = vec![0u8; n_nodes];
        let mut stack: Vec<(usize, bool)> = vec![(0, false)];

        while let Some((node, finished)) = stack.pop() {
            if finished {
                color[node] = 2;
                continue;
            }
            match color[node] {
                0 => {}
                1 => return Err(TreeError::CycleDetected { node }),
                _ => return Err(TreeError::DuplicateVisit { node }),
            }
            color[node] = 1;
            stack.push((node, true));

            if !self.is_leaf[node] {
                let (l, r) = (self.left[node] as usize, self.right[node] as usize);
                if l == node || r == node {
                    return Err(TreeError::SelfLoop { node });
                }
                stack.push((r, false));
                stack.push((l, false));
            }
        }

        match color.iter().position(|&c| c == 0) {
            Some(node) => Err(TreeError::UnreachableNode { node }),
            None => Ok(()),
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    /// Walk from the root to a leaf. Goes left when `row[feature] <= threshold`.
    ///
    /// `row` must hold at least as many columns as the tree was validated for.
    #[inline]
    pub fn predict_row(&self, row: &[f32]) -> f64 {
        let mut node = 0usize;
        while !self.is_leaf[node] {
            let x = f64::from(row[self.feature[node] as usize]);
            node = if x <= self.threshold[node] {
                self.left[node] as usize
            } else {
                self.right[node] as usize
            };
        }
        self.value[node]
    }
}

fn child_index(node: usize, side: &'static str, child: i64, n_nodes: usize) -> Result<u32, TreeError> {
    if child < 0 || child as usize >= n_nodes {
        return Err(TreeError::ChildOutOfBounds {
            node,
            side,
            child,
            n_nodes,
        });
    }
    Ok(child as u32)
}
