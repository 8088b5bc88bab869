#![forbid(unsafe_code)]
//! repforest library.
//!
//! Strongly connected components, condensation, and replicated
//! representative forests over arbitrary directed graphs.
//!
//! # Conventions
//!
//! - **Errors**: Forest runs return [`Result`] with [`ForestError`]; component
//!   discovery itself is total and never fails.
//! - **Logging**: Use `tracing` macros (`debug!`, `trace!`, `warn!`). The
//!   library never installs a subscriber.
//! - **Identity**: Nodes are compared through a [`NodeEquality`] policy,
//!   never through their own `Eq` unless that is the policy.
//!
//! # Example
//!
//! ```
//! use repforest::{ForestConfig, Graph};
//!
//! let mut graph = Graph::new();
//! graph.extend([(0, 1), (1, 2), (2, 1), (2, 3), (4, 3)]);
//!
//! let forest = graph.representative_forest(&ForestConfig::default()).unwrap();
//!
//! assert_eq!(forest.representative(&2), Some(&1));
//! assert!(forest.is_ancestor(&0, &3));
//! assert!(!forest.is_ancestor(&4, &1));
//! assert_eq!(forest.occurrences(&3).count(), 2);
//! ```

pub mod config;
pub mod equality;
pub mod error;
pub mod forest;
pub mod graph;

pub use config::ForestConfig;
pub use equality::{KeyEquality, NaturalEquality, NodeEquality};
pub use error::{ForestError, Result};
pub use forest::tree::{Edge, HierarchyPath, TreeNode, TreeNodeEquality};
pub use forest::{ForestSummary, RepresentativeForest};
pub use graph::Graph;
