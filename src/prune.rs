use crate::config::PrunePolicy;
use crate::impurity::{gain, LabelCounts};
use crate::node::Node;
use crate::tree::tree::Tree;
use log::info;

impl Tree {
    /// Prune the tree the first time it is needed, using the configured policy.
    pub(crate) fn prune_once(&mut self) {
        if self.pruned {
            return;
        }
        match self.cfg.prune_policy {
            PrunePolicy::SinglePass => {
                self.prune();
            }
            PrunePolicy::Converged => {
                self.prune_converged();
            }
            PrunePolicy::Disabled => self.pruned = true,
        }
    }

    /// Collapse low gain splits directly above the leaves, in a single pass.
    ///
    /// Only nodes whose two children are leaves when the pass starts are
    /// considered. Such a node becomes a leaf holding the majority label of
    /// both children when keeping the split gains less than
    /// `cfg.prune_threshold`. A node whose children only become leaves during
    /// the pass is left alone. Does nothing if the tree was already pruned.
    ///
    /// Returns the number of collapsed nodes.
    pub fn prune(&mut self) -> usize {
        if self.pruned {
            return 0;
        }
        let old_length = self.nodes.len();
        let collapsed = self.prune_pass();
        self.pruned = true;
        info!("pruning: n_nodes: {} -> {}", old_length, self.nodes.len());
        collapsed
    }

    /// Repeat the single prune pass until no node collapses anymore.
    ///
    /// Returns the number of collapsed nodes.
    pub fn prune_converged(&mut self) -> usize {
        if self.pruned {
            return 0;
        }
        let old_length = self.nodes.len();
        let mut collapsed = 0;
        loop {
            let n = self.prune_pass();
            if n == 0 {
                break;
            }
            collapsed += n;
        }
        self.pruned = true;
        info!("pruning to convergence: n_nodes: {} -> {}", old_length, self.nodes.len());
        collapsed
    }

    fn prune_pass(&mut self) -> usize {
        let candidates: Vec<usize> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| match (n.true_child, n.false_child) {
                (Some(t), Some(f)) => {
                    self.nodes.get(t).map_or(false, Node::is_leaf) && self.nodes.get(f).map_or(false, Node::is_leaf)
                }
                _ => false,
            })
            .map(|(i, _)| i)
            .collect();

        let mut collapsed = 0;
        for num in candidates {
            let (t, f) = match (self.nodes[num].true_child, self.nodes[num].false_child) {
                (Some(t), Some(f)) => (t, f),
                _ => continue,
            };
            let true_counts = &self.nodes[t].counts;
            let false_counts = &self.nodes[f].counts;
            let merged = LabelCounts::merged(true_counts, false_counts);
            let split_gain = gain(merged.gini(), true_counts, false_counts);
            if split_gain < self.cfg.prune_threshold {
                if let Some(result) = merged.majority() {
                    let node = &mut self.nodes[num];
                    node.make_leaf(result);
                    node.counts = merged;
                    collapsed += 1;
                }
            }
        }

        if collapsed > 0 {
            self.compact();
        }
        collapsed
    }

    /// Drop the nodes that are no longer reachable from the root, and
    /// renumber the rest in depth first order.
    fn compact(&mut self) {
        let mut old_nodes: Vec<Option<Node>> = std::mem::take(&mut self.nodes).into_iter().map(Some).collect();
        let mut new_nodes: Vec<Node> = Vec::with_capacity(old_nodes.len());
        // (old index, parent's new index, is true child)
        let mut stack: Vec<(usize, Option<(usize, bool)>)> = vec![(0, None)];
        while let Some((old_idx, parent)) = stack.pop() {
            let mut node = match old_nodes.get_mut(old_idx).and_then(Option::take) {
                Some(node) => node,
                None => continue,
            };
            let new_idx = new_nodes.len();
            node.num = new_idx;
            if let Some((p, is_true)) = parent {
                if is_true {
                    new_nodes[p].true_child = Some(new_idx);
                } else {
                    new_nodes[p].false_child = Some(new_idx);
                }
            }
            if let (Some(t), Some(f)) = (node.true_child, node.false_child) {
                stack.push((f, Some((new_idx, false))));
                stack.push((t, Some((new_idx, true))));
            }
            new_nodes.push(node);
        }
        self.nodes = new_nodes;
        self.update_stats();
    }
}
