//! Values emitted by an analysis run: cycle edges, hierarchy paths and tree nodes.
//!
//! Both [`Edge`] and [`TreeNode`] are generic over how the node identity is
//! held. Runs emit borrowed forms (`Edge<&T>`, `TreeNode<&T>`) that point
//! into the graph; `cloned()` turns them into owned values for retention.
//!
//! A [`HierarchyPath`] is an immutable, reference-counted snapshot. The
//! expander copies its working path into a fresh snapshot for every emitted
//! tree node. That copy costs one allocation per tree node; in exchange a
//! tree node stays valid after the callback returns and can be shared
//! across threads.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::equality::NodeEquality;

/// A directed pair of nodes.
///
/// Cycle membership is reported as `Edge { from: representative, to: member }`,
/// including `from == to` for every representative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge<N> {
    /// Source; the representative for cycle membership edges.
    pub from: N,
    /// Target; the member for cycle membership edges.
    pub to: N,
}

impl<N> Edge<N> {
    #[must_use]
    pub const fn new(from: N, to: N) -> Self {
        Self { from, to }
    }
}

impl<T: Clone> Edge<&T> {
    /// Clone both endpoints into an owned edge.
    #[must_use]
    pub fn cloned(&self) -> Edge<T> {
        Edge::new(self.from.clone(), self.to.clone())
    }
}

impl<N: fmt::Display> fmt::Display for Edge<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Path elements sampled when hashing a [`HierarchyPath`].
const HASH_SAMPLES: usize = 8;

/// Position of a tree node in the representative forest.
///
/// The first element is the root index; each further element is the child
/// index at that depth. `[0, 0, 1]` is the second child of the first child
/// of the first root.
///
/// Equality compares every element. Hashing samples at most eight evenly
/// strided elements plus the length and the last element, so hashing deep
/// paths stays cheap at the price of a few more collisions between paths
/// that differ only in unsampled positions.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct HierarchyPath(Arc<[usize]>);

impl HierarchyPath {
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Number of elements; roots have length 1.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the root this path starts from.
    #[must_use]
    pub fn root_index(&self) -> Option<usize> {
        self.0.first().copied()
    }

    /// `true` if `self` is a strict prefix of `other`.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.len() < other.len() && other.0.starts_with(&self.0)
    }

    /// The path of the parent tree node, if this is not a root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        match self.0.len() {
            0 | 1 => None,
            len => Some(Self::from(&self.0[..len - 1])),
        }
    }
}

impl From<&[usize]> for HierarchyPath {
    fn from(path: &[usize]) -> Self {
        Self(Arc::from(path))
    }
}

impl From<Vec<usize>> for HierarchyPath {
    fn from(path: Vec<usize>) -> Self {
        Self(Arc::from(path))
    }
}

impl Hash for HierarchyPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let path = &*self.0;
        state.write_usize(path.len());
        let stride = (path.len() / HASH_SAMPLES).max(1);
        for &element in path.iter().step_by(stride) {
            state.write_usize(element);
        }
        if let Some(&last) = path.last() {
            state.write_usize(last);
        }
    }
}

impl fmt::Display for HierarchyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut elements = self.0.iter();
        if let Some(first) = elements.next() {
            write!(f, "{first}")?;
            for element in elements {
                write!(f, "/{element}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for HierarchyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HierarchyPath({self})")
    }
}

impl Serialize for HierarchyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl<'de> Deserialize<'de> for HierarchyPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<usize>::deserialize(deserializer).map(Self::from)
    }
}

/// One occurrence of a component representative in the forest.
///
/// A representative reachable along several root-to-node paths of the
/// condensation has one tree node per path. Members of a cycle other than
/// its representative never appear as tree nodes; they are reported through
/// cycle edges only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeNode<N> {
    node: N,
    path: HierarchyPath,
}

impl<N> TreeNode<N> {
    #[must_use]
    pub const fn new(node: N, path: HierarchyPath) -> Self {
        Self { node, path }
    }

    #[must_use]
    pub const fn node(&self) -> &N {
        &self.node
    }

    #[must_use]
    pub const fn path(&self) -> &HierarchyPath {
        &self.path
    }

    /// Depth in the forest; roots are at depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// The hierarchy path rendered as `0/0/1`. Display only.
    #[must_use]
    pub fn hierarchy_path(&self) -> String {
        self.path.to_string()
    }

    #[must_use]
    pub fn into_parts(self) -> (N, HierarchyPath) {
        (self.node, self.path)
    }
}

impl<T: Clone> TreeNode<&T> {
    /// Clone the node identity into an owned tree node. The path snapshot
    /// is shared, not copied.
    #[must_use]
    pub fn cloned(&self) -> TreeNode<T> {
        TreeNode::new(self.node.clone(), self.path.clone())
    }
}

impl<N: fmt::Display> fmt::Display for TreeNode<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.node, self.path)
    }
}

/// Lifts a node policy to tree nodes: same node under `E` and same path.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeNodeEquality<E>(pub E);

impl<T, E: NodeEquality<T>> NodeEquality<TreeNode<T>> for TreeNodeEquality<E> {
    fn eq(&self, a: &TreeNode<T>, b: &TreeNode<T>) -> bool {
        a.path == b.path && self.0.eq(&a.node, &b.node)
    }

    fn hash<H: Hasher>(&self, value: &TreeNode<T>, state: &mut H) {
        self.0.hash(&value.node, state);
        value.path.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::hash::{BuildHasher, RandomState};

    use super::*;
    use crate::equality::KeyEquality;

    fn path(elements: &[usize]) -> HierarchyPath {
        HierarchyPath::from(elements)
    }

    #[test]
    fn renders_slash_delimited() {
        assert_eq!(path(&[0, 0, 1]).to_string(), "0/0/1");
        assert_eq!(path(&[3]).to_string(), "3");
        assert_eq!(path(&[]).to_string(), "");

        let node = TreeNode::new("svc", path(&[1, 2]));
        assert_eq!(node.to_string(), "svc@1/2");
        assert_eq!(node.hierarchy_path(), "1/2");
        assert_eq!(node.depth(), 1);
    }

    #[test]
    fn ancestry_is_strict_prefix() {
        assert!(path(&[0]).is_ancestor_of(&path(&[0, 2])));
        assert!(path(&[0, 2]).is_ancestor_of(&path(&[0, 2, 0, 1])));
        assert!(!path(&[0, 2]).is_ancestor_of(&path(&[0, 2])));
        assert!(!path(&[0, 1]).is_ancestor_of(&path(&[0, 2, 0])));
        assert!(!path(&[1]).is_ancestor_of(&path(&[0, 1])));
    }

    #[test]
    fn parent_drops_the_last_element() {
        assert_eq!(path(&[2, 0, 3]).parent(), Some(path(&[2, 0])));
        assert_eq!(path(&[2]).parent(), None);

        assert_eq!(path(&[2, 0, 3]).root_index(), Some(2));
        assert_eq!(path(&[]).root_index(), None);
        assert!(path(&[]).is_empty());
        assert!(!path(&[2]).is_empty());
    }

    #[test]
    fn deep_paths_differing_in_any_element_are_unequal() {
        let a: Vec<usize> = (0..100).collect();
        let mut b = a.clone();
        b[37] += 1;

        assert_ne!(path(&a), path(&b));

        let set: HashSet<HierarchyPath> = [path(&a), path(&b), path(&a)].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn equal_paths_hash_equally() {
        let s = RandomState::new();
        let long: Vec<usize> = (0..1000).map(|i| i % 7).collect();

        assert_eq!(s.hash_one(path(&long)), s.hash_one(HierarchyPath::from(long.clone())));
    }

    #[test]
    fn tree_node_equality_uses_the_node_policy() {
        let policy = TreeNodeEquality(KeyEquality::new(|s: &String| s.to_lowercase()));
        let a = TreeNode::new("Node".to_string(), path(&[0, 1]));
        let b = TreeNode::new("NODE".to_string(), path(&[0, 1]));
        let c = TreeNode::new("node".to_string(), path(&[0, 2]));

        assert!(policy.eq(&a, &b));
        assert!(!policy.eq(&a, &c));

        let s = RandomState::new();
        let hash = |node: &TreeNode<String>| {
            let mut hasher = s.build_hasher();
            policy.hash(node, &mut hasher);
            hasher.finish()
        };
        assert_eq!(hash(&a), hash(&b));
    }

    #[test]
    fn cloned_shares_the_path_snapshot() {
        let value = String::from("x");
        let borrowed = TreeNode::new(&value, path(&[4, 2]));
        let owned = borrowed.cloned();

        assert_eq!(owned.node(), "x");
        assert!(Arc::ptr_eq(&borrowed.path().0, &owned.path().0));

        let (node, snapshot) = owned.into_parts();
        assert_eq!(node, "x");
        assert_eq!(snapshot, path(&[4, 2]));
    }

    #[test]
    fn serializes_as_plain_data() {
        let node = TreeNode::new(7_u32, path(&[0, 3]));
        let json = serde_json::to_string(&node).expect("serializes");

        assert_eq!(json, r#"{"node":7,"path":[0,3]}"#);
        assert_eq!(serde_json::from_str::<TreeNode<u32>>(&json).expect("deserializes"), node);

        let edge = Edge::new("a", "b");
        assert_eq!(serde_json::to_string(&edge).expect("serializes"), r#"{"from":"a","to":"b"}"#);
    }
}
