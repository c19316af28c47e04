//! Metrics
//!
//! Evaluation metrics for fitted trees.
pub mod classification;
