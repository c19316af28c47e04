//! Errors
//!
//! Custom error types used throughout the `cartree` crate.
use thiserror::Error;

/// Errors that can occur while fitting, pruning or using a tree.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// The training or scoring data is malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// A categorical split was evaluated against a value that is not a category code.
    #[error("Feature number {feature} is categorical, but the value {value} is not a valid category code.")]
    InvalidCategory { feature: usize, value: f64 },
    /// A row passed for classification has fewer columns than the tree was trained on.
    #[error("Row has {found} columns, but the tree was fitted on {expected} features.")]
    RowTooShort { expected: usize, found: usize },
    /// A node splits on a feature the row does not have.
    #[error("Row has {found} columns, but the node splits on feature number {feature}.")]
    MissingFeature { feature: usize, found: usize },
    /// The tree was used before `fit` was called.
    #[error("The tree has not been fitted yet.")]
    NotFitted,
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
    /// Unable to write model to file.
    #[error("Unable to write model to file: {0}")]
    UnableToWrite(String),
    /// Unable to read model from file.
    #[error("Unable to read model from a file {0}")]
    UnableToRead(String),
}
