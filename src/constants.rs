/// Splits whose re-computed gain falls below this value are collapsed when pruning.
pub const PRUNE_GAIN_THRESHOLD: f64 = 0.1;
/// Initial capacity of the node arena.
pub const N_NODES_ALLOC: usize = 64;
