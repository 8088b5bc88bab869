//! Pluggable equality and hashing over node identities.
//!
//! # Overview
//!
//! The engine never relies on the node type's own `Eq`/`Hash` directly.
//! Every lookup (graph storage keys, component representatives, forest
//! queries) goes through a [`NodeEquality`] policy injected at graph
//! construction time. [`NaturalEquality`] forwards to the type's own impls
//! and is the default; [`KeyEquality`] compares nodes by a projected key,
//! which covers the usual "case-insensitive name" or "compare by id field"
//! policies without a newtype.
//!
//! A policy must be consistent: `eq(a, b)` implies that `hash(a)` and
//! `hash(b)` feed identical bytes into the hasher.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Equality and hashing policy over node identities of type `T`.
pub trait NodeEquality<T: ?Sized> {
    /// Return `true` if `a` and `b` denote the same node.
    fn eq(&self, a: &T, b: &T) -> bool;

    /// Feed the identity of `value` into `state`.
    fn hash<H: Hasher>(&self, value: &T, state: &mut H);
}

/// The node type's own `Eq` and `Hash` implementations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalEquality;

impl<T: Eq + Hash + ?Sized> NodeEquality<T> for NaturalEquality {
    #[inline]
    fn eq(&self, a: &T, b: &T) -> bool {
        a == b
    }

    #[inline]
    fn hash<H: Hasher>(&self, value: &T, state: &mut H) {
        value.hash(state);
    }
}

/// Compares nodes by a key projected out of each node.
///
/// ```
/// use repforest::{Graph, KeyEquality};
///
/// let mut graph = Graph::with_equality(KeyEquality::new(|s: &String| s.to_lowercase()));
/// graph.add_edge("A".to_string(), "b".to_string());
/// graph.add_edge("a".to_string(), "B".to_string());
///
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 1);
/// ```
#[derive(Clone, Copy)]
pub struct KeyEquality<F> {
    key: F,
}

impl<F> KeyEquality<F> {
    /// Build a policy from a key projection.
    pub const fn new(key: F) -> Self {
        Self { key }
    }
}

impl<F> fmt::Debug for KeyEquality<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyEquality").finish_non_exhaustive()
    }
}

impl<T, K, F> NodeEquality<T> for KeyEquality<F>
where
    T: ?Sized,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    fn eq(&self, a: &T, b: &T) -> bool {
        (self.key)(a) == (self.key)(b)
    }

    fn hash<H: Hasher>(&self, value: &T, state: &mut H) {
        (self.key)(value).hash(state);
    }
}

#[cfg(test)]
mod tests {
    use std::hash::{BuildHasher, RandomState};

    use super::*;

    fn hash_with<T: ?Sized, E: NodeEquality<T>>(s: &RandomState, eq: &E, value: &T) -> u64 {
        let mut hasher = s.build_hasher();
        eq.hash(value, &mut hasher);
        hasher.finish()
    }

    #[test]
    fn natural_equality_matches_std() {
        let s = RandomState::new();
        assert!(NaturalEquality.eq(&3_u32, &3));
        assert!(!NaturalEquality.eq(&3_u32, &4));
        assert_eq!(
            hash_with(&s, &NaturalEquality, "node"),
            hash_with(&s, &NaturalEquality, "node")
        );
    }

    #[test]
    fn key_equality_is_hash_consistent() {
        let s = RandomState::new();
        let policy = KeyEquality::new(|v: &str| v.to_ascii_lowercase());

        assert!(policy.eq("Alpha", "ALPHA"));
        assert!(!policy.eq("Alpha", "Beta"));
        assert_eq!(hash_with(&s, &policy, "Alpha"), hash_with(&s, &policy, "aLPHA"));
    }

    #[test]
    fn key_equality_by_field() {
        #[derive(Debug)]
        struct Task {
            id: u32,
            label: &'static str,
        }

        let policy = KeyEquality::new(|t: &Task| t.id);
        let a = Task { id: 7, label: "first" };
        let b = Task { id: 7, label: "renamed" };

        assert!(policy.eq(&a, &b), "{} vs {}", a.label, b.label);
    }
}
