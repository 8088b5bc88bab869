//! Tarjan's strongly connected components over the graph arena.
//!
//! # Root selection
//!
//! Nodes are visited in storage order, but the first pass only starts a
//! depth-first search from nodes that are not marked `DESCENDANT`, i.e.
//! nodes nothing else points to. Starting from sources tends to make the
//! first-discovered node of each component (its representative) the entry
//! point a reader would expect.
//!
//! Graphs where every node has a predecessor (one big cycle, or a cycle
//! that no source reaches) leave nodes unvisited after that pass. A second
//! pass starts from every node still unvisited, in storage order, so every
//! node is covered no matter how the graph is shaped.
//!
//! # Stack safety
//!
//! The search keeps an explicit frame stack (`node`, next edge position)
//! instead of recursing, so depth is bounded by heap, not by the call stack.

use tracing::{debug, instrument, trace};

use crate::equality::NodeEquality;
use crate::graph::node::{NodeId, NodeRecord};
use crate::graph::{Graph, Phase};

#[derive(Debug, Clone, Copy)]
struct Frame {
    node: NodeId,
    next_edge: usize,
}

#[derive(Debug, Default)]
struct Tarjan {
    index: usize,
    stack: Vec<NodeId>,
    frames: Vec<Frame>,
    components: usize,
}

/// Partition `records` into strongly connected components.
///
/// Calls `on_member(representative, member)` once for every node, as each
/// component is closed; the representative itself is reported last for its
/// component. Components close in reverse topological order (sinks first).
/// Returns the number of components.
///
/// `records` must be freshly reset.
pub fn strongly_connect<F>(records: &mut [NodeRecord], mut on_member: F) -> usize
where
    F: FnMut(NodeId, NodeId),
{
    let mut tarjan = Tarjan::default();

    for slot in 0..records.len() {
        let record = &records[slot];
        if record.is_visited() || record.is_descendant() {
            continue;
        }
        tarjan.visit(records, NodeId::new(slot), &mut on_member);
    }
    let from_sources = tarjan.index;

    for slot in 0..records.len() {
        if !records[slot].is_visited() {
            tarjan.visit(records, NodeId::new(slot), &mut on_member);
        }
    }

    debug!(
        nodes = records.len(),
        components = tarjan.components,
        from_sources,
        "strongly connected components found"
    );
    debug_assert!(tarjan.stack.is_empty());
    tarjan.components
}

impl Tarjan {
    fn visit<F>(&mut self, records: &mut [NodeRecord], root: NodeId, on_member: &mut F)
    where
        F: FnMut(NodeId, NodeId),
    {
        self.push(records, root);

        while let Some(&Frame { node, next_edge }) = self.frames.last() {
            if let Some(edge) = records[node.index()].edges.get(next_edge) {
                let successor = edge.to;
                if let Some(top) = self.frames.last_mut() {
                    top.next_edge += 1;
                }

                let target = &records[successor.index()];
                if !target.is_visited() {
                    self.push(records, successor);
                } else if target.is_on_stack() {
                    let target_index = target.index;
                    let current = &mut records[node.index()];
                    current.low_link = current.low_link.min(target_index);
                }
                // Successors off the stack belong to closed components.
                continue;
            }

            self.frames.pop();
            let current = &records[node.index()];
            let (low_link, index) = (current.low_link, current.index);
            if let Some(parent) = self.frames.last() {
                let parent = &mut records[parent.node.index()];
                parent.low_link = parent.low_link.min(low_link);
            }
            if low_link == index {
                self.close(records, node, on_member);
            }
        }
    }

    fn push(&mut self, records: &mut [NodeRecord], node: NodeId) {
        trace!(node = node.index(), index = self.index, "strong connect");
        records[node.index()].enter(self.index);
        self.index += 1;
        self.stack.push(node);
        self.frames.push(Frame { node, next_edge: 0 });
    }

    fn close<F>(&mut self, records: &mut [NodeRecord], representative: NodeId, on_member: &mut F)
    where
        F: FnMut(NodeId, NodeId),
    {
        while let Some(member) = self.stack.pop() {
            records[member.index()].close(representative);
            on_member(representative, member);
            if member == representative {
                break;
            }
        }
        self.components += 1;
    }
}

impl<T: Clone, E: NodeEquality<T>> Graph<T, E> {
    /// Partition the graph into its strongly connected components.
    ///
    /// Every node appears in exactly one component, including nodes with no
    /// edges at all. Components are returned sinks first; within a
    /// component the representative comes last. After this call
    /// [`Graph::representative_of`] answers for every node.
    #[must_use]
    #[instrument(skip(self), fields(nodes = self.node_count(), edges = self.edge_count()))]
    pub fn tarjan(&mut self) -> Vec<Vec<T>> {
        self.reset_analysis();

        let mut components: Vec<Vec<NodeId>> = Vec::new();
        let mut current: Vec<NodeId> = Vec::new();
        strongly_connect(&mut self.records, |representative, member| {
            current.push(member);
            if member == representative {
                components.push(std::mem::take(&mut current));
            }
        });
        self.phase = Phase::Components;

        components
            .into_iter()
            .map(|ids| ids.into_iter().map(|id| self.value(id).clone()).collect())
            .collect()
    }
}
