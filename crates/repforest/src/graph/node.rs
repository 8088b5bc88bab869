//! Per-node and per-edge records stored in the graph arena.
//!
//! A [`NodeRecord`] carries both the build-time adjacency of a node and the
//! scratch state that one analysis run writes into it. The run state is a
//! small state machine encoded in [`NodeOptions`]:
//!
//! ```text
//! unvisited ──enter──▶ ON_STACK | STRONG_CONNECT_EXECUTED ──close──▶ STRONG_CONNECT_EXECUTED
//! ```
//!
//! `DESCENDANT` is written while edges are inserted and survives runs.
//! `HAS_INCOMING_EDGE` is written on component representatives during exit
//! discovery. Transitions are checked with `debug_assert!`.

use bitflags::bitflags;

bitflags! {
    /// Node state flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeOptions: u8 {
        /// The node is on the Tarjan stack of the component being built.
        const ON_STACK = 1;
        /// Tarjan has assigned `index`/`low_link` to this node.
        const STRONG_CONNECT_EXECUTED = 1 << 1;
        /// Another node has an edge into this one. Build-time only.
        const DESCENDANT = 1 << 2;
        /// Representative of a component entered from a different component.
        const HAS_INCOMING_EDGE = 1 << 3;
    }
}

bitflags! {
    /// Edge state flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EdgeOptions: u8 {
        /// The edge has been examined by exit discovery in the current run.
        const CONDENSATION_VISITED = 1;
    }
}

impl NodeOptions {
    /// Flags that belong to one analysis run and are cleared by a reset.
    const RUN_STATE: Self = Self::ON_STACK
        .union(Self::STRONG_CONNECT_EXECUTED)
        .union(Self::HAS_INCOMING_EDGE);
}

/// Dense handle of a node inside one [`Graph`](crate::Graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Panics if `slot` does not fit in `u32`; two identities must never
    /// share a slot.
    pub fn new(slot: usize) -> Self {
        let Ok(narrow) = u32::try_from(slot) else {
            panic!("node slot {slot} overflows u32");
        };
        Self(narrow)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One outgoing edge in a node's adjacency list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeSlot {
    pub to: NodeId,
    pub options: EdgeOptions,
}

/// Adjacency and algorithm state of a single node.
#[derive(Debug, Clone)]
pub struct NodeRecord {
    /// Outgoing edges in insertion order, without duplicates.
    pub edges: Vec<EdgeSlot>,
    /// Tarjan discovery order.
    pub index: usize,
    /// Lowest discovery order reachable from this node on the stack.
    pub low_link: usize,
    pub options: NodeOptions,
    /// Representative of this node's component.
    pub cycle: NodeId,
    /// Representatives reachable by one edge out of this component.
    /// Only populated on the representative's own record.
    pub exits: Vec<NodeId>,
}

impl NodeRecord {
    pub const fn new(own: NodeId) -> Self {
        Self {
            edges: Vec::new(),
            index: 0,
            low_link: 0,
            options: NodeOptions::empty(),
            cycle: own,
            exits: Vec::new(),
        }
    }

    #[inline]
    pub const fn is_visited(&self) -> bool {
        self.options.contains(NodeOptions::STRONG_CONNECT_EXECUTED)
    }

    #[inline]
    pub const fn is_on_stack(&self) -> bool {
        self.options.contains(NodeOptions::ON_STACK)
    }

    #[inline]
    pub const fn is_descendant(&self) -> bool {
        self.options.contains(NodeOptions::DESCENDANT)
    }

    #[inline]
    pub const fn has_incoming_edge(&self) -> bool {
        self.options.contains(NodeOptions::HAS_INCOMING_EDGE)
    }

    /// Tarjan discovery: assign the discovery order and push on the stack.
    pub fn enter(&mut self, index: usize) {
        debug_assert!(!self.is_visited(), "node entered twice in one run");
        self.index = index;
        self.low_link = index;
        self.options
            .insert(NodeOptions::ON_STACK | NodeOptions::STRONG_CONNECT_EXECUTED);
    }

    /// Tarjan component close: pop from the stack and record the representative.
    pub fn close(&mut self, representative: NodeId) {
        debug_assert!(self.is_on_stack(), "closing a node that is not on the stack");
        self.options.remove(NodeOptions::ON_STACK);
        self.cycle = representative;
    }

    /// Clear everything a previous run wrote, keeping adjacency and `DESCENDANT`.
    pub fn reset(&mut self, own: NodeId) {
        self.index = 0;
        self.low_link = 0;
        self.options.remove(NodeOptions::RUN_STATE);
        self.cycle = own;
        self.exits.clear();
        for edge in &mut self.edges {
            edge.options = EdgeOptions::empty();
        }
    }
}

/// Reset every record to its pre-run state.
pub fn reset_all(records: &mut [NodeRecord]) {
    for (slot, record) in records.iter_mut().enumerate() {
        record.reset(NodeId::new(slot));
    }
}
