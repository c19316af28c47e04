use crate::config::{ModelIO, PrunePolicy, TreeConfig};
use crate::constants::N_NODES_ALLOC;
use crate::data::{validate_inputs, Matrix};
use crate::errors::CartError;
use crate::impurity::LabelCounts;
use crate::node::Node;
use crate::splitter::{category_code, is_constant, partition, Splitter};
use hashbrown::HashSet;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A binary classification tree grown with Gini impurity splits.
///
/// Nodes are stored in an arena, the root is at index 0 and every child
/// is stored after its parent.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Tree {
    pub cfg: TreeConfig,
    pub nodes: Vec<Node>,
    /// Number of feature columns the tree was fitted on.
    pub n_features: usize,
    pub depth: usize,
    pub n_leaves: usize,
    /// Set once the tree has been pruned, it is never pruned twice.
    pub pruned: bool,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new(TreeConfig::default())
    }
}

/// Rows waiting to become a node.
struct PendingNode {
    num: usize,
    depth: usize,
    index: Vec<usize>,
    used_features: Vec<usize>,
}

impl Tree {
    pub fn new(cfg: TreeConfig) -> Self {
        Tree {
            cfg,
            nodes: Vec::new(),
            n_features: 0,
            depth: 0,
            n_leaves: 0,
            pruned: false,
        }
    }

    /// Set the categorical features on the tree.
    /// * `categorical_features` - Indices of the columns holding category codes.
    pub fn set_categorical_features(mut self, categorical_features: HashSet<usize>) -> Self {
        self.cfg.categorical_features = categorical_features;
        self
    }

    /// Set the prune threshold on the tree.
    /// * `prune_threshold` - Splits above two leaves with a gain below this value are collapsed.
    pub fn set_prune_threshold(mut self, prune_threshold: f64) -> Self {
        self.cfg.prune_threshold = prune_threshold;
        self
    }

    /// Set the prune policy on the tree.
    /// * `prune_policy` - Pruning applied the first time the tree is scored.
    pub fn set_prune_policy(mut self, prune_policy: PrunePolicy) -> Self {
        self.cfg.prune_policy = prune_policy;
        self
    }

    /// Set whether features may be reused further down a path.
    /// * `allow_feature_reuse` - If false, a feature is split on at most once on any path.
    pub fn set_allow_feature_reuse(mut self, allow_feature_reuse: bool) -> Self {
        self.cfg.allow_feature_reuse = allow_feature_reuse;
        self
    }

    pub fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    fn validate_categorical(&self, data: &Matrix<f64>) -> Result<(), CartError> {
        for &feature in self.cfg.categorical_features.iter() {
            if feature >= data.cols {
                return Err(CartError::InvalidParameter(
                    "categorical_features".to_string(),
                    format!("feature indices below {}", data.cols),
                    feature.to_string(),
                ));
            }
            for row in data.rows_iter() {
                category_code(row[feature], feature)?;
            }
        }
        Ok(())
    }

    /// Grow the tree on the data, replacing any previous fit.
    ///
    /// * `data` - Feature matrix, one row per sample.
    /// * `y` - Labels of the samples.
    pub fn fit(&mut self, data: &Matrix<f64>, y: &[f64]) -> Result<(), CartError> {
        validate_inputs(data, y)?;
        self.cfg.validate()?;
        self.validate_categorical(data)?;

        let splitter = Splitter::new(&self.cfg.categorical_features);
        let mut nodes: Vec<Option<Node>> = Vec::with_capacity(N_NODES_ALLOC);
        let mut n_nodes = 1;
        let mut pending = vec![PendingNode {
            num: 0,
            depth: 0,
            index: data.index.to_owned(),
            used_features: Vec::new(),
        }];

        while let Some(item) = pending.pop() {
            let counts = LabelCounts::from_index(y, &item.index);
            let node = if let Some(label) = counts.pure_label() {
                Node::new_leaf(item.num, item.depth, counts, label)
            } else {
                let col_index: Vec<usize> = (0..data.cols)
                    .filter(|c| !item.used_features.contains(c) && !is_constant(data, &item.index, *c))
                    .collect();
                let split_info = if col_index.is_empty() {
                    None
                } else {
                    splitter.best_split(data, y, &item.index, counts.gini(), &col_index)?
                };
                match split_info {
                    Some(info) if info.split_gain > 0.0 => {
                        let (true_index, false_index) =
                            partition(data, &item.index, info.split_feature, &info.split_rule)?;
                        let mut used_features = item.used_features;
                        if !self.cfg.allow_feature_reuse {
                            used_features.push(info.split_feature);
                        }
                        let (true_num, false_num) = (n_nodes, n_nodes + 1);
                        n_nodes += 2;
                        let node = Node::new_parent(item.num, item.depth, counts, &info, true_num, false_num);
                        // The false side goes on the stack first so the true side is grown first.
                        pending.push(PendingNode {
                            num: false_num,
                            depth: item.depth + 1,
                            index: false_index,
                            used_features: used_features.clone(),
                        });
                        pending.push(PendingNode {
                            num: true_num,
                            depth: item.depth + 1,
                            index: true_index,
                            used_features,
                        });
                        node
                    }
                    _ => {
                        let result = majority_label(&counts)?;
                        Node::new_leaf(item.num, item.depth, counts, result)
                    }
                }
            };
            if nodes.len() <= node.num {
                nodes.resize(node.num + 1, None);
            }
            let num = node.num;
            nodes[num] = Some(node);
        }

        self.nodes = nodes.into_iter().flatten().collect();
        self.n_features = data.cols;
        self.pruned = false;
        self.update_stats();
        info!(
            "fitted tree: n_nodes: {}, n_leaves: {}, depth: {}",
            self.nodes.len(),
            self.n_leaves,
            self.depth
        );
        Ok(())
    }

    pub(crate) fn update_stats(&mut self) {
        self.depth = self.nodes.iter().map(|n| n.depth).max().unwrap_or(0);
        self.n_leaves = self.nodes.iter().filter(|n| n.is_leaf()).count();
    }

    /// Check the arena layout: every node is either a leaf or a split with
    /// two children, and children are stored after their parent.
    pub fn validate_nodes(&self) -> Result<(), CartError> {
        for (idx, node) in self.nodes.iter().enumerate() {
            if !node.is_consistent() {
                return Err(CartError::InvalidInput(format!(
                    "node {} is neither a leaf nor a complete split",
                    idx
                )));
            }
            if let (Some(t), Some(f)) = (node.true_child, node.false_child) {
                for child in [t, f] {
                    if child <= idx || child >= self.nodes.len() {
                        return Err(CartError::InvalidInput(format!(
                            "node {} points to invalid child {}",
                            idx, child
                        )));
                    }
                }
            }
            if let Some(feature) = node.split_feature {
                if feature >= self.n_features {
                    return Err(CartError::InvalidInput(format!(
                        "node {} splits on feature {}, the tree has {} features",
                        idx, feature, self.n_features
                    )));
                }
            }
        }
        Ok(())
    }

    /// Root node of a fitted tree.
    pub fn root(&self) -> Option<&Node> {
        self.nodes.first()
    }

    /// Leaves of the tree, in arena order.
    pub fn leaves(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_leaf())
    }
}

fn majority_label(counts: &LabelCounts) -> Result<f64, CartError> {
    counts
        .majority()
        .ok_or_else(|| CartError::InvalidInput("no rows reached the node".to_string()))
}

impl ModelIO for Tree {
    /// Load from a Json string, rejecting trees whose nodes do not link up.
    ///
    /// * `json_str` - String object, which can be serialized to json.
    fn from_json(json_str: &str) -> Result<Self, CartError> {
        let tree = serde_json::from_str::<Self>(json_str).map_err(|e| CartError::UnableToRead(e.to_string()))?;
        tree.validate_nodes()?;
        Ok(tree)
    }
}

impl Display for Tree {
    // Nodes are printed depth first, true branch before false branch.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut print_buffer: Vec<usize> = if self.nodes.is_empty() { vec![] } else { vec![0] };
        let mut r = String::new();
        while let Some(idx) = print_buffer.pop() {
            let node = match self.nodes.get(idx) {
                Some(node) => node,
                None => {
                    r += format!("{}:missing\n", idx).as_str();
                    continue;
                }
            };
            if let (Some(t), Some(f)) = (node.true_child, node.false_child) {
                // A child stored before its parent would loop forever.
                for child in [f, t] {
                    if child > idx {
                        print_buffer.push(child);
                    } else {
                        r += format!("{}:missing\n", child).as_str();
                    }
                }
            }
            r += format!("{}{}\n", "      ".repeat(node.depth), node).as_str();
        }
        write!(f, "{}", r)
    }
}
