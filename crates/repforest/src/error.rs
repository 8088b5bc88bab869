//! Errors returned by forest expansion.
//!
//! Component discovery and condensation are total over any finite graph and
//! never fail. The only failures come from the optional bounds in
//! [`ForestConfig`](crate::ForestConfig), which stop an expansion that would
//! otherwise replicate a densely cross-linked condensation without limit.

/// Failure of a representative forest run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForestError {
    /// Expansion would emit more tree nodes than `max_tree_nodes` allows.
    #[error("representative forest exceeds {limit} tree nodes")]
    TreeNodeLimitExceeded { limit: usize },

    /// A root-to-node path is longer than `max_depth` allows.
    #[error("representative forest path of depth {depth} exceeds the limit of {limit}")]
    DepthLimitExceeded { limit: usize, depth: usize },

    /// The configuration cannot be used for a run.
    #[error("invalid forest configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias for forest runs.
pub type Result<T, E = ForestError> = std::result::Result<T, E>;
