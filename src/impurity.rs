//! Impurity
//!
//! Label distributions, Gini impurity and the gain of a binary split.
use serde::{Deserialize, Serialize};

/// Counts of each label in a subset of the data.
///
/// Labels are stored in the order they were first encountered, this
/// order is what breaks ties when looking for the majority label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelCounts {
    counts: Vec<(f64, usize)>,
    total: usize,
}

impl LabelCounts {
    pub fn new() -> Self {
        LabelCounts::default()
    }

    /// Count the labels of the rows in `index`.
    pub fn from_index(y: &[f64], index: &[usize]) -> Self {
        let mut counts = LabelCounts::new();
        index.iter().for_each(|i| counts.add(y[*i]));
        counts
    }

    /// Count every label in `y`.
    pub fn from_labels(y: &[f64]) -> Self {
        let mut counts = LabelCounts::new();
        y.iter().for_each(|v| counts.add(*v));
        counts
    }

    pub fn add(&mut self, label: f64) {
        self.add_n(label, 1);
    }

    fn add_n(&mut self, label: f64, n: usize) {
        match self.counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, c)) => *c += n,
            None => self.counts.push((label, n)),
        }
        self.total += n;
    }

    /// Combine two distributions, the labels of `first` keep their order
    /// and unseen labels of `second` are appended after them.
    pub fn merged(first: &LabelCounts, second: &LabelCounts) -> Self {
        let mut merged = first.clone();
        second.counts.iter().for_each(|(l, c)| merged.add_n(*l, *c));
        merged
    }

    /// Number of rows counted.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct labels.
    pub fn n_labels(&self) -> usize {
        self.counts.len()
    }

    /// Labels and their counts in encounter order.
    pub fn iter(&self) -> impl Iterator<Item = &(f64, usize)> {
        self.counts.iter()
    }

    /// The single label of a pure subset.
    pub fn pure_label(&self) -> Option<f64> {
        match self.counts.as_slice() {
            [(label, _)] => Some(*label),
            _ => None,
        }
    }

    /// Most frequent label; on equal counts the first seen label wins.
    pub fn majority(&self) -> Option<f64> {
        let mut best: Option<(f64, usize)> = None;
        for (label, count) in &self.counts {
            match best {
                Some((_, c)) if *count <= c => {}
                _ => best = Some((*label, *count)),
            }
        }
        best.map(|(label, _)| label)
    }

    /// Gini impurity of the distribution.
    pub fn gini(&self) -> f64 {
        gini(self)
    }
}

/// Gini impurity, `1 - sum(p_c^2)` over the label proportions.
///
/// An empty subset has an impurity of 0.
pub fn gini(counts: &LabelCounts) -> f64 {
    if counts.total() == 0 {
        return 0.0;
    }
    let n = counts.total() as f64;
    let sum_sq: f64 = counts
        .iter()
        .map(|(_, c)| {
            let p = *c as f64 / n;
            p * p
        })
        .sum();
    1.0 - sum_sq
}

/// Weighted impurity reduction of splitting a node into `left` and `right`.
pub fn gain(parent_impurity: f64, left: &LabelCounts, right: &LabelCounts) -> f64 {
    let n = (left.total() + right.total()) as f64;
    if n == 0.0 {
        return 0.0;
    }
    let p = left.total() as f64 / n;
    parent_impurity - p * gini(left) - (1.0 - p) * gini(right)
}
