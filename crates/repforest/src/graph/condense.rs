//! Exit discovery: the condensation of the graph over its representatives.
//!
//! Once every record knows its representative, each edge `v → w` whose
//! endpoints sit in different components is an edge of the condensation
//! `rep(v) → rep(w)`. Those edges are stored as `exits` on the record of
//! `rep(v)`, deduplicated and in discovery order, and `rep(w)` is flagged
//! `HAS_INCOMING_EDGE`. Representatives without that flag are the sources
//! of the condensation, i.e. the roots of the representative forest.

use std::collections::HashSet;

use tracing::debug;

use crate::graph::node::{EdgeOptions, NodeId, NodeOptions, NodeRecord};

/// Populate `exits` on every representative. Returns the number of
/// distinct condensation edges.
///
/// Every edge is examined at most once per run; the `CONDENSATION_VISITED`
/// flag guards against a second look.
pub fn find_exits(records: &mut [NodeRecord]) -> usize {
    let mut seen: HashSet<(NodeId, NodeId)> = HashSet::new();

    for slot in 0..records.len() {
        let source = records[slot].cycle;

        for position in 0..records[slot].edges.len() {
            let edge = &mut records[slot].edges[position];
            if edge.options.contains(EdgeOptions::CONDENSATION_VISITED) {
                continue;
            }
            edge.options.insert(EdgeOptions::CONDENSATION_VISITED);
            let to = edge.to;
            let target = records[to.index()].cycle;

            if target != source && seen.insert((source, target)) {
                records[source.index()].exits.push(target);
                records[target.index()]
                    .options
                    .insert(NodeOptions::HAS_INCOMING_EDGE);
            }
        }
    }

    debug!(exits = seen.len(), "condensation built");
    seen.len()
}
