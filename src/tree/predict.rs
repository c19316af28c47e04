//! Tree Prediction Methods
//!
//! Classification of rows and scoring of a fitted tree.
use super::tree::Tree;
use crate::data::{validate_inputs, Matrix};
use crate::errors::CartError;
use crate::metrics::classification::accuracy;
use log::info;
use rayon::prelude::*;

impl Tree {
    fn check_fitted(&self, n_cols: usize) -> Result<(), CartError> {
        if !self.is_fitted() {
            return Err(CartError::NotFitted);
        }
        if n_cols < self.n_features {
            return Err(CartError::RowTooShort {
                expected: self.n_features,
                found: n_cols,
            });
        }
        Ok(())
    }

    /// Index of the leaf a row ends up in.
    pub fn leaf_index(&self, row: &[f64]) -> Result<usize, CartError> {
        self.check_fitted(row.len())?;
        let mut node_idx = 0;
        // Children are stored after their parents, so a walk never takes
        // more steps than there are nodes.
        for _ in 0..self.nodes.len() {
            match self.nodes[node_idx].get_child_idx(row)? {
                Some(child_idx) if child_idx > node_idx && child_idx < self.nodes.len() => node_idx = child_idx,
                Some(child_idx) => {
                    return Err(CartError::InvalidInput(format!(
                        "node {} points to invalid child {}",
                        node_idx, child_idx
                    )))
                }
                None => return Ok(node_idx),
            }
        }
        Err(CartError::InvalidInput("tree walk did not reach a leaf".to_string()))
    }

    /// Predict the label of a single row.
    pub fn classify(&self, row: &[f64]) -> Result<f64, CartError> {
        let leaf = &self.nodes[self.leaf_index(row)?];
        leaf.result
            .ok_or_else(|| CartError::InvalidInput(format!("node {} has neither a split nor a result", leaf.num)))
    }

    /// Predict the label of every row of the matrix.
    ///
    /// * `data` - Feature matrix, one row per sample.
    /// * `parallel` - Classify the rows with the rayon thread pool.
    pub fn predict(&self, data: &Matrix<f64>, parallel: bool) -> Result<Vec<f64>, CartError> {
        self.check_fitted(data.cols)?;
        if parallel {
            data.index.par_iter().map(|i| self.classify(data.get_row(*i))).collect()
        } else {
            data.index.iter().map(|i| self.classify(data.get_row(*i))).collect()
        }
    }

    /// Index of the leaf each row of the matrix ends up in.
    pub fn apply(&self, data: &Matrix<f64>) -> Result<Vec<usize>, CartError> {
        self.check_fitted(data.cols)?;
        data.index.iter().map(|i| self.leaf_index(data.get_row(*i))).collect()
    }

    /// Accuracy of the tree on the data, as a percentage.
    ///
    /// The first call prunes the tree according to the configured
    /// `PrunePolicy`, later calls reuse the pruned tree.
    pub fn score(&mut self, data: &Matrix<f64>, y: &[f64]) -> Result<f64, CartError> {
        validate_inputs(data, y)?;
        self.check_fitted(data.cols)?;
        self.validate_nodes()?;
        self.prune_once();
        let yhat = self.predict(data, false)?;
        let acc = accuracy(y, &yhat)?;
        info!("ACC: {:.4}%", acc);
        Ok(acc)
    }
}
