//! Directed graph container and the analysis phases that run over it.
//!
//! # Overview
//!
//! [`Graph`] is an arena: node identities live in one vector, their
//! `NodeRecord`s in a parallel vector, and a policy-driven `KeyIndex`
//! maps identities to slots. Edges are stored as slot pairs in each
//! record's adjacency list, so the structure has no internal pointers.
//!
//! ## Pipeline
//!
//! ```text
//! add_edge / add_node
//!        ↓
//! Graph (possibly cyclic, possibly without any source node)
//!        ↓  scc::strongly_connect()      every record gets `cycle`
//! components
//!        ↓  condense::find_exits()       representatives get `exits`
//! condensation (DAG over representatives)
//!        ↓  forest::expand()             one tree node per root-to-node path
//! representative forest
//! ```
//!
//! ## Run state
//!
//! The analysis phases write scratch state into the records. Every public
//! analysis entry point takes `&mut self` and resets that state first, so a
//! graph can be analysed any number of times, and a run abandoned by a
//! panicking callback never leaks into the next one.

pub(crate) mod condense;
pub(crate) mod index;
pub(crate) mod node;
pub(crate) mod scc;

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use petgraph::graph::DiGraph;
use tracing::instrument;

use crate::equality::{NaturalEquality, NodeEquality};
use index::KeyIndex;
use node::{EdgeOptions, EdgeSlot, NodeId, NodeOptions, NodeRecord};

/// How far the last analysis run got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    /// No run since the last mutation or reset.
    Built,
    /// Every record has its component representative.
    Components,
    /// Representatives carry their exits.
    Condensed,
}

/// A mutable directed graph over node identities of type `T`.
///
/// Identities are compared with the [`NodeEquality`] policy `E`
/// ([`NaturalEquality`] by default). Inserting an edge inserts both
/// endpoints; re-inserting an existing edge is a cheap no-op.
///
/// Node slots are `u32`: a graph holds at most `u32::MAX + 1` nodes, and
/// inserting one more panics.
///
/// ```
/// use repforest::Graph;
///
/// let mut graph = Graph::new();
/// graph.add_edge("a", "b");
/// graph.add_edge("b", "a");
/// graph.add_edge("b", "c");
///
/// let mut components = graph.tarjan();
/// components.iter_mut().for_each(|c| c.sort_unstable());
/// components.sort_unstable();
/// assert_eq!(components, vec![vec!["a", "b"], vec!["c"]]);
/// ```
pub struct Graph<T, E = NaturalEquality> {
    pub(crate) values: Vec<T>,
    pub(crate) records: Vec<NodeRecord>,
    index: KeyIndex,
    edge_set: HashSet<(NodeId, NodeId)>,
    equality: E,
    pub(crate) phase: Phase,
}

impl<T: Eq + Hash> Graph<T> {
    /// Create an empty graph using the node type's own equality.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity_and_equality(0, NaturalEquality)
    }

    /// Create an empty graph sized for roughly `capacity` nodes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_equality(capacity, NaturalEquality)
    }
}

impl<T: Clone + Eq + Hash> Graph<T> {
    /// Build a graph from a petgraph [`DiGraph`], keeping isolated nodes.
    ///
    /// Node weights become identities; weights that compare equal collapse
    /// into one node. Edge weights are ignored.
    #[must_use]
    #[instrument(skip(source), fields(nodes = source.node_count(), edges = source.edge_count()))]
    pub fn from_petgraph<W>(source: &DiGraph<T, W>) -> Self {
        let mut graph = Self::with_capacity(source.node_count());
        for weight in source.node_weights() {
            graph.add_node(weight.clone());
        }
        for edge in source.raw_edges() {
            graph.add_edge(
                source[edge.source()].clone(),
                source[edge.target()].clone(),
            );
        }
        graph
    }
}

impl<T: Eq + Hash> Default for Graph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E: NodeEquality<T>> Graph<T, E> {
    /// Create an empty graph that compares identities with `equality`.
    #[must_use]
    pub fn with_equality(equality: E) -> Self {
        Self::with_capacity_and_equality(0, equality)
    }

    /// Create an empty graph with a capacity hint and an equality policy.
    #[must_use]
    pub fn with_capacity_and_equality(capacity: usize, equality: E) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            records: Vec::with_capacity(capacity),
            index: KeyIndex::with_capacity(capacity),
            edge_set: HashSet::with_capacity(capacity),
            equality,
            phase: Phase::Built,
        }
    }

    /// The equality policy this graph was built with.
    #[must_use]
    pub const fn equality(&self) -> &E {
        &self.equality
    }

    /// Insert `node` with no edges. Returns `false` if it was already present.
    pub fn add_node(&mut self, node: T) -> bool {
        if self.id_of(&node).is_some() {
            return false;
        }
        self.insert_node(node);
        true
    }

    /// Insert the edge `from → to`, creating missing endpoints.
    ///
    /// `to` is marked as a descendant unless the edge is a self-loop; the
    /// flag biases component discovery towards source nodes. Returns
    /// `false` if the edge already existed.
    pub fn add_edge(&mut self, from: T, to: T) -> bool {
        let from = self.id_or_insert(from);
        let to = self.id_or_insert(to);

        if !self.edge_set.insert((from, to)) {
            return false;
        }

        self.records[from.index()].edges.push(EdgeSlot {
            to,
            options: EdgeOptions::empty(),
        });
        if from != to {
            self.records[to.index()].options.insert(NodeOptions::DESCENDANT);
        }
        self.phase = Phase::Built;
        true
    }

    /// Number of distinct nodes.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.values.len()
    }

    /// Number of distinct edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_set.len()
    }

    /// `true` if the graph has no nodes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `true` if a node equal to `node` under the policy is present.
    #[must_use]
    pub fn contains_node(&self, node: &T) -> bool {
        self.id_of(node).is_some()
    }

    /// `true` if the edge `from → to` has been inserted.
    #[must_use]
    pub fn contains_edge(&self, from: &T, to: &T) -> bool {
        match (self.id_of(from), self.id_of(to)) {
            (Some(from), Some(to)) => self.edge_set.contains(&(from, to)),
            _ => false,
        }
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    /// Direct successors of `node` in edge insertion order.
    ///
    /// Empty if `node` is not in the graph.
    pub fn successors<'a>(&'a self, node: &T) -> impl Iterator<Item = &'a T> + use<'a, T, E> {
        let edges: &'a [EdgeSlot] = self
            .id_of(node)
            .map(|id| self.records[id.index()].edges.as_slice())
            .unwrap_or_default();
        edges.iter().map(|edge| &self.values[edge.to.index()])
    }

    /// Representative of `node`'s strongly connected component.
    ///
    /// Available after [`Graph::tarjan`] or a forest run; `None` before
    /// that, after a later mutation, or if `node` is absent.
    #[must_use]
    pub fn representative_of(&self, node: &T) -> Option<&T> {
        if self.phase == Phase::Built {
            return None;
        }
        let id = self.id_of(node)?;
        Some(&self.values[self.records[id.index()].cycle.index()])
    }

    /// Representatives reachable by one edge out of `node`'s component.
    ///
    /// Available after a forest run; `None` before that or if `node` is
    /// absent. Non-representative members report their representative's exits.
    #[must_use]
    pub fn exits_of(&self, node: &T) -> Option<Vec<&T>> {
        if self.phase != Phase::Condensed {
            return None;
        }
        let id = self.id_of(node)?;
        let representative = self.records[id.index()].cycle;
        Some(
            self.records[representative.index()]
                .exits
                .iter()
                .map(|exit| &self.values[exit.index()])
                .collect(),
        )
    }

    pub(crate) fn id_of(&self, node: &T) -> Option<NodeId> {
        self.index.find(&self.equality, &self.values, node)
    }

    pub(crate) fn value(&self, id: NodeId) -> &T {
        &self.values[id.index()]
    }

    pub(crate) const fn key_index(&self) -> &KeyIndex {
        &self.index
    }

    /// Clear all per-run state so a new analysis starts from scratch.
    pub(crate) fn reset_analysis(&mut self) {
        node::reset_all(&mut self.records);
        self.phase = Phase::Built;
    }

    fn id_or_insert(&mut self, node: T) -> NodeId {
        self.id_of(&node).unwrap_or_else(|| self.insert_node(node))
    }

    fn insert_node(&mut self, node: T) -> NodeId {
        let id = NodeId::new(self.values.len());
        self.index.insert(&self.equality, &node, id);
        self.values.push(node);
        self.records.push(NodeRecord::new(id));
        self.phase = Phase::Built;
        id
    }
}

impl<T, E: NodeEquality<T>> Extend<(T, T)> for Graph<T, E> {
    fn extend<I: IntoIterator<Item = (T, T)>>(&mut self, edges: I) {
        for (from, to) in edges {
            self.add_edge(from, to);
        }
    }
}

impl<T: Eq + Hash> FromIterator<(T, T)> for Graph<T> {
    fn from_iter<I: IntoIterator<Item = (T, T)>>(edges: I) -> Self {
        let mut graph = Self::new();
        graph.extend(edges);
        graph
    }
}

impl<T: fmt::Debug, E> fmt::Debug for Graph<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.values.len())
            .field("edges", &self.edge_set.len())
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}
