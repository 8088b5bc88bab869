//! Depth-first replay of the condensation into the representative forest.
//!
//! # Roots
//!
//! A root is a representative whose component no other component points
//! to (no `HAS_INCOMING_EDGE`). Every non-empty DAG has at least one such
//! source, and every component is reachable from one, so the forest covers
//! the whole graph. Roots are numbered in storage order.
//!
//! # Replication
//!
//! The condensation is a DAG, not a tree. A component reachable along `k`
//! distinct root-to-component paths is emitted `k` times, each with its own
//! hierarchy path, and its whole sub-forest is emitted again under each
//! copy. On densely cross-linked graphs this grows combinatorially; callers
//! that cannot trust their input should bound the run with
//! [`ForestConfig`].
//!
//! # Stack safety
//!
//! The walk keeps an explicit frame stack (`node`, next exit position) and a
//! single working path that grows and shrinks with it.

use tracing::{debug, trace, warn};

use crate::config::ForestConfig;
use crate::error::{ForestError, Result};
use crate::graph::node::{NodeId, NodeRecord};

#[derive(Debug, Clone, Copy)]
struct Frame {
    node: NodeId,
    next_exit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expansion {
    pub roots: usize,
    pub tree_nodes: usize,
}

/// Representatives that no other component points to, in storage order.
pub fn roots(records: &[NodeRecord]) -> Vec<NodeId> {
    let is_representative = |slot: usize, record: &NodeRecord| record.cycle.index() == slot;

    let roots: Vec<NodeId> = records
        .iter()
        .enumerate()
        .filter(|&(slot, record)| is_representative(slot, record) && !record.has_incoming_edge())
        .map(|(slot, _)| NodeId::new(slot))
        .collect();

    if roots.is_empty() && !records.is_empty() {
        // Only reachable if exit discovery saw a cycle between components.
        warn!("condensation has no source; expanding from every representative");
        return records
            .iter()
            .enumerate()
            .filter(|&(slot, record)| is_representative(slot, record))
            .map(|(slot, _)| NodeId::new(slot))
            .collect();
    }
    roots
}

struct Emitter<'c, F> {
    config: &'c ForestConfig,
    emitted: usize,
    sink: F,
}

impl<F: FnMut(NodeId, &[usize])> Emitter<'_, F> {
    fn emit(&mut self, node: NodeId, path: &[usize]) -> Result<()> {
        if let Some(limit) = self.config.max_depth
            && path.len() > limit
        {
            warn!(limit, depth = path.len(), "forest depth limit exceeded");
            return Err(ForestError::DepthLimitExceeded {
                limit,
                depth: path.len(),
            });
        }
        if let Some(limit) = self.config.max_tree_nodes
            && self.emitted >= limit
        {
            warn!(limit, "forest tree node limit exceeded");
            return Err(ForestError::TreeNodeLimitExceeded { limit });
        }

        trace!(node = node.index(), depth = path.len(), "tree node");
        self.emitted += 1;
        (self.sink)(node, path);
        Ok(())
    }
}

/// Walk the condensation from every root, calling `on_tree_node(node, path)`
/// once per distinct root-to-node path. Records must carry exits.
///
/// # Errors
///
/// Fails as soon as a bound in `config` would be exceeded; tree nodes
/// emitted before that point have already been delivered.
pub fn expand<F>(
    records: &[NodeRecord],
    config: &ForestConfig,
    on_tree_node: F,
) -> Result<Expansion>
where
    F: FnMut(NodeId, &[usize]),
{
    let roots = roots(records);
    let mut emitter = Emitter {
        config,
        emitted: 0,
        sink: on_tree_node,
    };
    let mut path: Vec<usize> = Vec::new();
    let mut frames: Vec<Frame> = Vec::new();

    for (root_index, &root) in roots.iter().enumerate() {
        path.push(root_index);
        emitter.emit(root, &path)?;
        frames.push(Frame {
            node: root,
            next_exit: 0,
        });

        while let Some(&Frame { node, next_exit }) = frames.last() {
            if let Some(&child) = records[node.index()].exits.get(next_exit) {
                if let Some(top) = frames.last_mut() {
                    top.next_exit += 1;
                }
                path.push(next_exit);
                emitter.emit(child, &path)?;
                frames.push(Frame {
                    node: child,
                    next_exit: 0,
                });
            } else {
                frames.pop();
                path.pop();
            }
        }
        debug_assert!(path.is_empty());
    }

    debug!(
        roots = roots.len(),
        tree_nodes = emitter.emitted,
        "representative forest expanded"
    );
    Ok(Expansion {
        roots: roots.len(),
        tree_nodes: emitter.emitted,
    })
}
