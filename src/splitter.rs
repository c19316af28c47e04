//! Splitter
//!
//! Exhaustive search for the best binary split of a node, and the
//! partitioning of its rows once a split is chosen.
use crate::data::Matrix;
use crate::errors::CartError;
use crate::impurity::{gain, LabelCounts};
use hashbrown::HashSet;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The predicate stored on an internal node.
///
/// Rows satisfying the predicate are sent down the true branch,
/// every other row down the false branch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SplitRule {
    /// Numeric split, true iff `value >= threshold`.
    Threshold(f64),
    /// Categorical split, true iff `value == category`.
    Equals(usize),
}

impl SplitRule {
    /// Evaluate the rule against the value of `feature` for a row.
    pub fn evaluate(&self, value: f64, feature: usize) -> Result<bool, CartError> {
        match self {
            SplitRule::Threshold(t) => Ok(value >= *t),
            SplitRule::Equals(c) => Ok(category_code(value, feature)? == *c),
        }
    }
}

impl fmt::Display for SplitRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SplitRule::Threshold(t) => write!(f, ">= {}", t),
            SplitRule::Equals(c) => write!(f, "== {}", c),
        }
    }
}

/// Convert a value of a categorical feature into its category code.
pub fn category_code(value: f64, feature: usize) -> Result<usize, CartError> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Ok(value as usize)
    } else {
        Err(CartError::InvalidCategory { feature, value })
    }
}

/// The best split found for a node.
#[derive(Debug)]
pub struct SplitInfo {
    pub split_feature: usize,
    pub split_rule: SplitRule,
    pub split_gain: f64,
    pub true_counts: LabelCounts,
    pub false_counts: LabelCounts,
}

/// Settings that shape the candidate splits of a node.
pub struct Splitter<'a> {
    /// Columns holding category codes, compared with equality.
    pub categorical_features: &'a HashSet<usize>,
}

impl<'a> Splitter<'a> {
    pub fn new(categorical_features: &'a HashSet<usize>) -> Self {
        Splitter { categorical_features }
    }

    fn make_rule(&self, feature: usize, value: f64) -> Result<SplitRule, CartError> {
        if self.categorical_features.contains(&feature) {
            Ok(SplitRule::Equals(category_code(value, feature)?))
        } else {
            Ok(SplitRule::Threshold(value))
        }
    }

    /// Search every candidate column and every distinct value in it for
    /// the split with the largest gain.
    ///
    /// A candidate replaces the current best when its gain is greater than
    /// or equal to it, the search starts from a gain of 0. Partitions with
    /// an empty side are skipped. Returns `None` if no valid partition exists.
    pub fn best_split(
        &self,
        data: &Matrix<f64>,
        y: &[f64],
        index: &[usize],
        impurity: f64,
        col_index: &[usize],
    ) -> Result<Option<SplitInfo>, CartError> {
        let mut best: Option<SplitInfo> = None;
        let mut best_gain = 0.0;

        for &col in col_index {
            for value in distinct_values(data, index, col) {
                let rule = self.make_rule(col, value)?;
                let (true_counts, false_counts) = count_split(data, y, index, col, &rule)?;
                if true_counts.total() == 0 || false_counts.total() == 0 {
                    continue;
                }
                let split_gain = gain(impurity, &true_counts, &false_counts);
                if split_gain >= best_gain {
                    best_gain = split_gain;
                    best = Some(SplitInfo {
                        split_feature: col,
                        split_rule: rule,
                        split_gain,
                        true_counts,
                        false_counts,
                    });
                }
            }
        }

        if let Some(info) = &best {
            debug!(
                "best split: feature {} {} gain={:.4} ({} / {} rows)",
                info.split_feature,
                info.split_rule,
                info.split_gain,
                info.true_counts.total(),
                info.false_counts.total()
            );
        }
        Ok(best)
    }
}

/// Distinct values of a column within the rows of `index`, in the order
/// they are first seen.
pub fn distinct_values(data: &Matrix<f64>, index: &[usize], col: usize) -> Vec<f64> {
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for &i in index {
        let v = *data.get(i, col);
        // 0.0 and -0.0 compare equal, hash them the same.
        let key = if v == 0.0 { 0.0_f64.to_bits() } else { v.to_bits() };
        if seen.insert(key) {
            values.push(v);
        }
    }
    values
}

/// Whether every row of `index` shares the same value in `col`.
pub fn is_constant(data: &Matrix<f64>, index: &[usize], col: usize) -> bool {
    match index.first() {
        None => true,
        Some(&first) => {
            let v = *data.get(first, col);
            index.iter().all(|&i| *data.get(i, col) == v)
        }
    }
}

fn count_split(
    data: &Matrix<f64>,
    y: &[f64],
    index: &[usize],
    col: usize,
    rule: &SplitRule,
) -> Result<(LabelCounts, LabelCounts), CartError> {
    let mut true_counts = LabelCounts::new();
    let mut false_counts = LabelCounts::new();
    for &i in index {
        if rule.evaluate(*data.get(i, col), col)? {
            true_counts.add(y[i]);
        } else {
            false_counts.add(y[i]);
        }
    }
    Ok((true_counts, false_counts))
}

/// Route the rows of `index` to the true and false side of a split.
///
/// Row order within each side follows the order of `index`.
pub fn partition(
    data: &Matrix<f64>,
    index: &[usize],
    col: usize,
    rule: &SplitRule,
) -> Result<(Vec<usize>, Vec<usize>), CartError> {
    let mut true_index = Vec::new();
    let mut false_index = Vec::new();
    for &i in index {
        if rule.evaluate(*data.get(i, col), col)? {
            true_index.push(i);
        } else {
            false_index.push(i);
        }
    }
    Ok((true_index, false_index))
}
