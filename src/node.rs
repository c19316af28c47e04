use crate::errors::CartError;
use crate::impurity::LabelCounts;
use crate::splitter::{SplitInfo, SplitRule};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A node of the tree, stored in the tree's node arena.
///
/// A leaf has a `result` and no split, an internal node has a split
/// feature, a split rule and two children, and no `result`.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Node {
    pub num: usize,
    pub depth: usize,
    pub split_feature: Option<usize>,
    pub split_rule: Option<SplitRule>,
    pub split_gain: f64,
    pub true_child: Option<usize>,
    pub false_child: Option<usize>,
    /// Gini impurity of the training rows that reached this node.
    pub impurity: f64,
    /// Number of training rows that reached this node.
    pub n_samples: usize,
    /// Label distribution of the training rows that reached this node.
    pub counts: LabelCounts,
    pub result: Option<f64>,
}

impl Node {
    /// Create a leaf holding `result`.
    pub fn new_leaf(num: usize, depth: usize, counts: LabelCounts, result: f64) -> Self {
        Node {
            num,
            depth,
            split_feature: None,
            split_rule: None,
            split_gain: 0.0,
            true_child: None,
            false_child: None,
            impurity: counts.gini(),
            n_samples: counts.total(),
            counts,
            result: Some(result),
        }
    }

    /// Create an internal node from the chosen split, the children are
    /// expected at `true_child` and `false_child` in the arena.
    pub fn new_parent(
        num: usize,
        depth: usize,
        counts: LabelCounts,
        split_info: &SplitInfo,
        true_child: usize,
        false_child: usize,
    ) -> Self {
        Node {
            num,
            depth,
            split_feature: Some(split_info.split_feature),
            split_rule: Some(split_info.split_rule),
            split_gain: split_info.split_gain,
            true_child: Some(true_child),
            false_child: Some(false_child),
            impurity: counts.gini(),
            n_samples: counts.total(),
            counts,
            result: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.result.is_some()
    }

    /// Turn an internal node into a leaf holding `result`.
    pub fn make_leaf(&mut self, result: f64) {
        self.split_feature = None;
        self.split_rule = None;
        self.split_gain = 0.0;
        self.true_child = None;
        self.false_child = None;
        self.result = Some(result);
    }

    /// Get the child a row travels to, `None` if the node is a leaf.
    pub fn get_child_idx(&self, row: &[f64]) -> Result<Option<usize>, CartError> {
        match (self.split_feature, &self.split_rule, self.true_child, self.false_child) {
            (Some(feature), Some(rule), Some(t), Some(f)) => {
                let value = *row.get(feature).ok_or(CartError::MissingFeature {
                    feature,
                    found: row.len(),
                })?;
                if rule.evaluate(value, feature)? {
                    Ok(Some(t))
                } else {
                    Ok(Some(f))
                }
            }
            _ => Ok(None),
        }
    }

    /// Check the leaf/internal invariant of the node.
    pub fn is_consistent(&self) -> bool {
        let split = (
            self.split_feature.is_some(),
            self.split_rule.is_some(),
            self.true_child.is_some(),
            self.false_child.is_some(),
        );
        match self.result {
            Some(_) => split == (false, false, false, false),
            None => split == (true, true, true, true),
        }
    }
}

impl fmt::Display for Node {
    // This trait requires `fmt` with this exact signature.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.result, self.split_feature, &self.split_rule) {
            (Some(result), _, _) => write!(
                f,
                "{}:leaf={},impurity={:.3},samples={}",
                self.num, result, self.impurity, self.n_samples
            ),
            (None, Some(feature), Some(rule)) => write!(
                f,
                "{}:[f{} {}] yes={},no={},gain={:.4},impurity={:.3},samples={}",
                self.num,
                feature,
                rule,
                self.true_child.unwrap_or_default(),
                self.false_child.unwrap_or_default(),
                self.split_gain,
                self.impurity,
                self.n_samples
            ),
            _ => write!(f, "{}:invalid", self.num),
        }
    }
}
