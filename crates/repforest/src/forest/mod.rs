//! Representative forests: the public face of the analysis pipeline.
//!
//! # Overview
//!
//! A representative forest replays the condensation of a graph as a set of
//! trees. Each strongly connected component is stood in for by its
//! representative; a representative reachable along several paths appears
//! once per path. With every path materialised, "does `a` reach `b`" becomes
//! a prefix test between hierarchy paths rather than a graph search.
//!
//! Two ways in:
//!
//! - [`Graph::to_representative_forest`] streams results through two
//!   callbacks and keeps nothing.
//! - [`Graph::representative_forest`] collects everything into a
//!   [`RepresentativeForest`] that answers ancestor/descendant queries.
//!
//! # Cost
//!
//! The number of tree nodes equals the number of distinct root-to-component
//! paths in the condensation. That is linear for trees and chains but can
//! be exponential in the number of components for layered, fully
//! cross-linked graphs. Use [`ForestConfig`] bounds when the input is not
//! trusted.
//!
//! ## Typical Usage
//!
//! ```
//! use repforest::Graph;
//!
//! let mut graph = Graph::new();
//! for (from, to) in [("app", "db"), ("db", "cache"), ("cache", "db"), ("app", "log")] {
//!     graph.add_edge(from, to);
//! }
//!
//! let mut cycles = Vec::new();
//! let mut tree = Vec::new();
//! let summary = graph
//!     .to_representative_forest(
//!         |edge| cycles.push(edge.cloned()),
//!         |node| tree.push(node.to_string()),
//!     )
//!     .unwrap();
//!
//! assert_eq!(summary.components, 3);
//! assert_eq!(cycles.len(), 4);
//! assert_eq!(tree, vec!["app@0", "db@0/0", "log@0/1"]);
//! ```

pub(crate) mod expand;
pub mod tree;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::ForestConfig;
use crate::equality::{NaturalEquality, NodeEquality};
use crate::error::Result;
use crate::graph::condense::find_exits;
use crate::graph::index::KeyIndex;
use crate::graph::node::{self, NodeId, NodeRecord};
use crate::graph::scc::strongly_connect;
use crate::graph::{Graph, Phase};
use tree::{Edge, HierarchyPath, TreeNode};

/// Counts reported by a forest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ForestSummary {
    /// Strongly connected components, singletons included.
    pub components: usize,
    /// Distinct edges of the condensation.
    pub exits: usize,
    /// Forest roots: components no other component points to.
    pub roots: usize,
    /// Emitted tree nodes, replicas included.
    pub tree_nodes: usize,
}

/// Run every phase over `records`, reporting node slots.
fn run<C, N>(
    records: &mut [NodeRecord],
    phase: &mut Phase,
    config: &ForestConfig,
    on_member: C,
    on_tree_node: N,
) -> Result<ForestSummary>
where
    C: FnMut(NodeId, NodeId),
    N: FnMut(NodeId, &[usize]),
{
    config.validate()?;

    node::reset_all(records);
    *phase = Phase::Built;
    let components = strongly_connect(records, on_member);
    *phase = Phase::Components;
    let exits = find_exits(records);
    *phase = Phase::Condensed;
    let expansion = expand::expand(records, config, on_tree_node)?;

    Ok(ForestSummary {
        components,
        exits,
        roots: expansion.roots,
        tree_nodes: expansion.tree_nodes,
    })
}

impl<T, E: NodeEquality<T>> Graph<T, E> {
    /// Decompose the graph and stream its representative forest.
    ///
    /// `on_cycle` receives `Edge { from: representative, to: member }` once
    /// for every node, `from == to` included, as each component closes.
    /// `on_tree_node` receives one [`TreeNode`] per distinct root-to-node
    /// path of the condensation, in depth-first pre-order.
    ///
    /// Callbacks borrow node identities from the graph; clone what you keep.
    ///
    /// # Errors
    ///
    /// Never fails with the default, unbounded configuration.
    pub fn to_representative_forest<C, N>(&mut self, on_cycle: C, on_tree_node: N) -> Result<ForestSummary>
    where
        C: FnMut(Edge<&T>),
        N: FnMut(TreeNode<&T>),
    {
        self.to_representative_forest_with(&ForestConfig::default(), on_cycle, on_tree_node)
    }

    /// [`Graph::to_representative_forest`] with explicit bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidConfig`](crate::ForestError::InvalidConfig)
    /// for an unusable `config`, or a limit error as soon as expansion
    /// would exceed a bound. Cycle edges are fully delivered before any
    /// limit error.
    #[instrument(skip_all, fields(nodes = self.node_count(), edges = self.edge_count()))]
    pub fn to_representative_forest_with<C, N>(
        &mut self,
        config: &ForestConfig,
        mut on_cycle: C,
        mut on_tree_node: N,
    ) -> Result<ForestSummary>
    where
        C: FnMut(Edge<&T>),
        N: FnMut(TreeNode<&T>),
    {
        let values = &self.values;
        run(
            &mut self.records,
            &mut self.phase,
            config,
            |representative, member| {
                on_cycle(Edge::new(
                    &values[representative.index()],
                    &values[member.index()],
                ));
            },
            |node, path| {
                on_tree_node(TreeNode::new(&values[node.index()], HierarchyPath::from(path)));
            },
        )
    }
}

impl<T: Clone, E: NodeEquality<T> + Clone> Graph<T, E> {
    /// Decompose the graph and collect its representative forest.
    ///
    /// # Errors
    ///
    /// Same as [`Graph::to_representative_forest_with`].
    #[instrument(skip_all, fields(nodes = self.node_count(), edges = self.edge_count()))]
    pub fn representative_forest(&mut self, config: &ForestConfig) -> Result<RepresentativeForest<T, E>> {
        let slots = self.values.len();
        let mut members: Vec<Vec<NodeId>> = vec![Vec::new(); slots];
        let mut cycle_pairs: Vec<(NodeId, NodeId)> = Vec::with_capacity(slots);
        let mut placed: Vec<(NodeId, HierarchyPath)> = Vec::with_capacity(slots);

        let summary = run(
            &mut self.records,
            &mut self.phase,
            config,
            |representative, member| {
                members[representative.index()].push(member);
                cycle_pairs.push((representative, member));
            },
            |node, path| placed.push((node, HierarchyPath::from(path))),
        )?;

        let representatives: Vec<NodeId> = self.records.iter().map(|r| r.cycle).collect();
        let cyclic: Vec<bool> = self
            .records
            .iter()
            .enumerate()
            .map(|(slot, record)| {
                members[slot].len() > 1 || record.edges.iter().any(|e| e.to.index() == slot)
            })
            .collect();

        let mut occurrences: Vec<Vec<usize>> = vec![Vec::new(); slots];
        let mut tree_slots = Vec::with_capacity(placed.len());
        let mut tree_nodes = Vec::with_capacity(placed.len());
        for (position, (node, path)) in placed.into_iter().enumerate() {
            occurrences[node.index()].push(position);
            tree_slots.push(node);
            tree_nodes.push(TreeNode::new(self.value(node).clone(), path));
        }

        let cycle_edges = cycle_pairs
            .into_iter()
            .map(|(from, to)| Edge::new(self.value(from).clone(), self.value(to).clone()))
            .collect();

        Ok(RepresentativeForest {
            values: self.values.clone(),
            index: self.key_index().clone(),
            equality: self.equality().clone(),
            representatives,
            members,
            cyclic,
            occurrences,
            tree_nodes,
            tree_slots,
            cycle_edges,
            summary,
        })
    }
}

/// A fully materialised representative forest.
///
/// Owns every cycle edge and tree node of one run and answers reachability
/// questions about the original graph from them. Queries take node
/// identities and compare them with the graph's equality policy; unknown
/// nodes yield empty answers.
#[derive(Debug, Clone)]
pub struct RepresentativeForest<T, E = NaturalEquality> {
    values: Vec<T>,
    index: KeyIndex,
    equality: E,
    /// Per slot: representative of the slot's component.
    representatives: Vec<NodeId>,
    /// Per representative slot: members in close order, representative last.
    members: Vec<Vec<NodeId>>,
    /// Per representative slot: the component contains a cycle.
    cyclic: Vec<bool>,
    /// Per representative slot: positions in `tree_nodes`.
    occurrences: Vec<Vec<usize>>,
    /// Pre-order.
    tree_nodes: Vec<TreeNode<T>>,
    tree_slots: Vec<NodeId>,
    cycle_edges: Vec<Edge<T>>,
    summary: ForestSummary,
}

impl<T, E: NodeEquality<T>> RepresentativeForest<T, E> {
    /// Counts reported by the run that built this forest.
    #[must_use]
    pub const fn summary(&self) -> ForestSummary {
        self.summary
    }

    /// Every tree node in depth-first pre-order.
    #[must_use]
    pub fn tree_nodes(&self) -> &[TreeNode<T>] {
        &self.tree_nodes
    }

    /// `(representative, member)` for every node, in component close order.
    #[must_use]
    pub fn cycle_edges(&self) -> &[Edge<T>] {
        &self.cycle_edges
    }

    /// Root tree nodes, in root index order.
    pub fn roots(&self) -> impl Iterator<Item = &TreeNode<T>> {
        self.tree_nodes.iter().filter(|node| node.path().len() == 1)
    }

    /// `true` if `node` was in the graph when the forest was built.
    #[must_use]
    pub fn contains(&self, node: &T) -> bool {
        self.slot_of(node).is_some()
    }

    /// Representative of `node`'s component.
    #[must_use]
    pub fn representative(&self, node: &T) -> Option<&T> {
        let slot = self.slot_of(node)?;
        Some(&self.values[self.representatives[slot.index()].index()])
    }

    /// Every member of `node`'s component, representative last.
    #[must_use]
    pub fn component(&self, node: &T) -> Vec<&T> {
        self.slot_of(node)
            .map(|slot| {
                self.members[self.representatives[slot.index()].index()]
                    .iter()
                    .map(|member| &self.values[member.index()])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `true` if `node` lies on a cycle (a multi-node component or a self-loop).
    #[must_use]
    pub fn is_cyclic(&self, node: &T) -> bool {
        self.slot_of(node)
            .is_some_and(|slot| self.cyclic[self.representatives[slot.index()].index()])
    }

    /// Tree nodes standing for `node`'s component, one per root-to-node path.
    pub fn occurrences<'a>(&'a self, node: &T) -> impl Iterator<Item = &'a TreeNode<T>> + use<'a, T, E> {
        let positions: &'a [usize] = self
            .slot_of(node)
            .map(|slot| self.occurrences[self.representatives[slot.index()].index()].as_slice())
            .unwrap_or_default();
        positions.iter().map(|&position| &self.tree_nodes[position])
    }

    /// `true` if a non-empty path leads from `ancestor` to `descendant` in
    /// the original graph.
    ///
    /// A node is its own ancestor only when it lies on a cycle.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: &T, descendant: &T) -> bool {
        let (Some(a), Some(b)) = (self.slot_of(ancestor), self.slot_of(descendant)) else {
            return false;
        };
        let (a, b) = (self.representatives[a.index()], self.representatives[b.index()]);
        if a == b {
            return self.cyclic[a.index()];
        }

        let ancestor_paths: HashSet<&[usize]> = self.occurrences[a.index()]
            .iter()
            .map(|&position| self.tree_nodes[position].path().as_slice())
            .collect();

        self.occurrences[b.index()].iter().any(|&position| {
            let path = self.tree_nodes[position].path().as_slice();
            (1..path.len()).any(|len| ancestor_paths.contains(&path[..len]))
        })
    }

    /// Every node reachable from `node` by a non-empty path, in graph
    /// insertion order.
    #[must_use]
    pub fn descendants(&self, node: &T) -> Vec<&T> {
        let Some(slot) = self.slot_of(node) else {
            return Vec::new();
        };
        let representative = self.representatives[slot.index()];

        let mut reached = Vec::new();
        if self.cyclic[representative.index()] {
            reached.push(representative);
        }
        for &position in &self.occurrences[representative.index()] {
            let base = self.tree_nodes[position].path();
            let subtree = self.tree_nodes[position + 1..]
                .iter()
                .take_while(|tree_node| base.is_ancestor_of(tree_node.path()))
                .count();
            reached.extend_from_slice(&self.tree_slots[position + 1..=position + subtree]);
        }
        self.expand_components(&reached)
    }

    /// Every node with a non-empty path to `node`, in graph insertion order.
    #[must_use]
    pub fn ancestors(&self, node: &T) -> Vec<&T> {
        let Some(slot) = self.slot_of(node) else {
            return Vec::new();
        };
        let representative = self.representatives[slot.index()];

        let mut reached = Vec::new();
        if self.cyclic[representative.index()] {
            reached.push(representative);
        }
        for &position in &self.occurrences[representative.index()] {
            // In pre-order, the closest earlier node one level up is the parent.
            let mut wanted = self.tree_nodes[position].path().len() - 1;
            for earlier in (0..position).rev() {
                if wanted == 0 {
                    break;
                }
                if self.tree_nodes[earlier].path().len() == wanted {
                    reached.push(self.tree_slots[earlier]);
                    wanted -= 1;
                }
            }
        }
        self.expand_components(&reached)
    }

    fn slot_of(&self, node: &T) -> Option<NodeId> {
        self.index.find(&self.equality, &self.values, node)
    }

    /// Replace representatives by all their members, deduplicated, in slot order.
    fn expand_components(&self, representatives: &[NodeId]) -> Vec<&T> {
        let mut hit = vec![false; self.values.len()];
        for representative in representatives {
            for member in &self.members[representative.index()] {
                hit[member.index()] = true;
            }
        }
        hit.iter()
            .enumerate()
            .filter(|&(_, &hit)| hit)
            .map(|(slot, _)| &self.values[slot])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ForestError;

    fn collect(graph: &mut Graph<u32>) -> (Vec<Edge<u32>>, Vec<(u32, String)>) {
        let mut cycles = Vec::new();
        let mut tree = Vec::new();
        graph
            .to_representative_forest(
                |edge| cycles.push(edge.cloned()),
                |node| tree.push((**node.node(), node.hierarchy_path())),
            )
            .expect("unbounded run");
        (cycles, tree)
    }

    #[test]
    fn empty_graph_emits_nothing() {
        let mut graph: Graph<u32> = Graph::new();
        let (cycles, tree) = collect(&mut graph);

        assert!(cycles.is_empty());
        assert!(tree.is_empty());
    }

    #[test]
    fn self_loop_is_one_cycle_edge_and_one_root() {
        let mut graph = Graph::new();
        graph.add_edge(5_u32, 5);
        let (cycles, tree) = collect(&mut graph);

        assert_eq!(cycles, vec![Edge::new(5, 5)]);
        assert_eq!(tree, vec![(5, "0".to_string())]);
    }

    #[test]
    fn isolated_node_reports_reflexive_membership() {
        let mut graph = Graph::new();
        graph.add_node(9_u32);
        let (cycles, tree) = collect(&mut graph);

        assert_eq!(cycles, vec![Edge::new(9, 9)]);
        assert_eq!(tree, vec![(9, "0".to_string())]);
    }

    #[test]
    fn members_report_through_cycle_edges_only() {
        let mut graph: Graph<u32> = [(1, 2), (2, 3), (3, 1), (3, 4)].into_iter().collect();
        let (cycles, tree) = collect(&mut graph);

        assert_eq!(
            cycles,
            vec![Edge::new(4, 4), Edge::new(1, 3), Edge::new(1, 2), Edge::new(1, 1)]
        );
        assert_eq!(tree, vec![(1, "0".to_string()), (4, "0/0".to_string())]);
    }

    #[test]
    fn summary_counts_every_phase() {
        let mut graph: Graph<u32> = [(1, 2), (1, 3), (2, 4), (3, 4)].into_iter().collect();
        let summary = graph
            .to_representative_forest(|_| {}, |_| {})
            .expect("unbounded run");

        assert_eq!(
            summary,
            ForestSummary {
                components: 4,
                exits: 4,
                roots: 1,
                tree_nodes: 5,
            }
        );
        assert_eq!(graph.exits_of(&1), Some(vec![&2, &3]));
    }

    #[test]
    fn invalid_config_leaves_graph_untouched() {
        let mut graph: Graph<u32> = [(1, 2)].into_iter().collect();
        let mut called = false;
        let err = graph
            .to_representative_forest_with(
                &ForestConfig::default().with_max_depth(0),
                |_| called = true,
                |_| {},
            )
            .expect_err("zero depth");

        assert!(matches!(err, ForestError::InvalidConfig(_)));
        assert!(!called);
        assert_eq!(graph.representative_of(&1), None);
    }

    #[test]
    fn rerun_on_same_graph_is_stable() {
        let mut graph: Graph<u32> = [(1, 2), (2, 1), (2, 3), (4, 3)].into_iter().collect();

        let first = collect(&mut graph);
        let second = collect(&mut graph);

        assert_eq!(first, second);
    }

    #[test]
    fn collected_forest_answers_reachability() {
        // 0 -> {1 <-> 2} -> 3 -> 4, plus 5 -> 3
        let mut graph: Graph<u32> = [(0, 1), (1, 2), (2, 1), (2, 3), (3, 4), (5, 3)]
            .into_iter()
            .collect();
        let forest = graph
            .representative_forest(&ForestConfig::default())
            .expect("unbounded run");

        assert_eq!(forest.representative(&2), Some(&1));
        assert_eq!(forest.component(&2), vec![&2, &1]);
        assert!(forest.is_cyclic(&2));
        assert!(!forest.is_cyclic(&3));

        assert!(forest.is_ancestor(&0, &4));
        assert!(forest.is_ancestor(&2, &1), "members of a cycle reach each other");
        assert!(forest.is_ancestor(&5, &4));
        assert!(!forest.is_ancestor(&5, &1));
        assert!(!forest.is_ancestor(&3, &3), "no self-loop on 3");
        assert!(!forest.is_ancestor(&4, &0));
        assert!(!forest.is_ancestor(&0, &99));

        assert_eq!(forest.descendants(&0), vec![&1, &2, &3, &4]);
        assert_eq!(forest.descendants(&1), vec![&1, &2, &3, &4]);
        assert_eq!(forest.ancestors(&3), vec![&0, &1, &2, &5]);
        assert_eq!(forest.ancestors(&0), Vec::<&u32>::new());

        assert_eq!(forest.occurrences(&4).count(), 2, "reached from roots 0 and 5");
        assert_eq!(
            forest.roots().map(|root| *root.node()).collect::<Vec<_>>(),
            vec![0, 5]
        );
    }
}
