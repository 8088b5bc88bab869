//! Bounds on representative forest expansion.
//!
//! The forest holds one tree node per distinct root-to-node path through
//! the condensation, which grows combinatorially on densely cross-linked
//! graphs. [`ForestConfig`] lets callers put a hard ceiling on that growth.
//! A run that hits a ceiling fails with a [`ForestError`]; it never returns
//! a silently truncated forest.

use serde::{Deserialize, Serialize};

use crate::error::{ForestError, Result};

/// Configuration for a representative forest run.
///
/// Both bounds default to unbounded. Deserializes from any serde format;
/// missing fields take their defaults.
///
/// ```
/// use repforest::ForestConfig;
///
/// let config: ForestConfig = serde_json::from_str(r#"{ "max_tree_nodes": 10000 }"#).unwrap();
/// assert_eq!(config.max_tree_nodes, Some(10_000));
/// assert_eq!(config.max_depth, None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Maximum number of tree nodes a run may emit.
    #[serde(default)]
    pub max_tree_nodes: Option<usize>,
    /// Maximum hierarchy path length; roots have length 1.
    #[serde(default)]
    pub max_depth: Option<usize>,
}

impl ForestConfig {
    /// An unbounded configuration.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            max_tree_nodes: None,
            max_depth: None,
        }
    }

    /// Cap the number of emitted tree nodes at `limit`.
    #[must_use]
    pub const fn with_max_tree_nodes(mut self, limit: usize) -> Self {
        self.max_tree_nodes = Some(limit);
        self
    }

    /// Cap hierarchy path length at `limit`; roots have length 1.
    #[must_use]
    pub const fn with_max_depth(mut self, limit: usize) -> Self {
        self.max_depth = Some(limit);
        self
    }

    /// Reject bounds that no non-empty forest could satisfy.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidConfig`] if either bound is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_tree_nodes == Some(0) {
            return Err(ForestError::InvalidConfig(
                "max_tree_nodes must be at least 1".to_string(),
            ));
        }
        if self.max_depth == Some(0) {
            return Err(ForestError::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
