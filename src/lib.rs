mod prune;

// Modules
pub mod config;
pub mod constants;
pub mod data;
pub mod errors;
pub mod impurity;
pub mod metrics;
pub mod node;
pub mod splitter;
pub mod tree;
pub mod utils;

// Individual classes, and functions
pub use config::{ModelIO, PrunePolicy, TreeConfig};
pub use data::Matrix;
pub use errors::CartError;
pub use tree::Tree;
