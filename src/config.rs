//! Tree Configuration
//!
//! Defines the configuration used when growing and pruning a tree,
//! and the JSON persistence shared by the configuration and fitted trees.
use crate::constants::PRUNE_GAIN_THRESHOLD;
use crate::errors::CartError;
use crate::utils::validate_float_parameter;
use hashbrown::HashSet;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How the tree is pruned before it is first used for scoring.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug, Default)]
pub enum PrunePolicy {
    /// One pass over the nodes whose children are both leaves.
    #[default]
    SinglePass,
    /// Repeat the single pass until no node collapses.
    Converged,
    /// Never prune.
    Disabled,
}

fn default_categorical_features() -> HashSet<usize> {
    HashSet::new()
}
fn default_prune_threshold() -> f64 {
    PRUNE_GAIN_THRESHOLD
}
fn default_prune_policy() -> PrunePolicy {
    PrunePolicy::SinglePass
}
fn default_allow_feature_reuse() -> bool {
    true
}

/// Configuration for a `Tree`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Features holding category codes, split on equality instead of a threshold.
    #[serde(default = "default_categorical_features")]
    pub categorical_features: HashSet<usize>,
    /// Splits of leaf parents with a gain below this value are collapsed when pruning.
    #[serde(default = "default_prune_threshold")]
    pub prune_threshold: f64,
    /// Pruning applied the first time the tree is scored.
    #[serde(default = "default_prune_policy")]
    pub prune_policy: PrunePolicy,
    /// Whether a feature may be split on again below a node that already split on it.
    #[serde(default = "default_allow_feature_reuse")]
    pub allow_feature_reuse: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            categorical_features: HashSet::new(),
            prune_threshold: PRUNE_GAIN_THRESHOLD,
            prune_policy: PrunePolicy::SinglePass,
            allow_feature_reuse: true,
        }
    }
}

impl TreeConfig {
    /// Check the parameters before fitting.
    pub fn validate(&self) -> Result<(), CartError> {
        validate_float_parameter(self.prune_threshold, 0.0, f64::MAX, "prune_threshold")
    }
}

/// IO
pub trait ModelIO: Serialize + DeserializeOwned + Sized {
    /// Save as a json object to a file.
    ///
    /// * `path` - Path to save to.
    fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<(), CartError> {
        fs::write(path, self.json_dump()?).map_err(|e| CartError::UnableToWrite(e.to_string()))
    }

    /// Dump as a json object.
    fn json_dump(&self) -> Result<String, CartError> {
        serde_json::to_string(self).map_err(|e| CartError::UnableToWrite(e.to_string()))
    }

    /// Load from a Json string.
    ///
    /// * `json_str` - String object, which can be serialized to json.
    fn from_json(json_str: &str) -> Result<Self, CartError> {
        serde_json::from_str::<Self>(json_str).map_err(|e| CartError::UnableToRead(e.to_string()))
    }

    /// Load from a path to a json object.
    ///
    /// * `path` - Path to load from.
    fn load_model<P: AsRef<Path>>(path: P) -> Result<Self, CartError> {
        let json_str = fs::read_to_string(path).map_err(|e| CartError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}

impl ModelIO for TreeConfig {}
