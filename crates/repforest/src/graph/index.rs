//! Identity → slot lookup driven by a [`NodeEquality`] policy.
//!
//! `HashMap<T, _>` would hard-wire `T`'s own `Eq`/`Hash`, so the index
//! buckets slots by the policy hash and resolves collisions with the policy
//! equality against the caller's value storage.

use std::collections::HashMap;
use std::hash::{BuildHasher, Hasher, RandomState};

use crate::equality::NodeEquality;
use crate::graph::node::NodeId;

#[derive(Debug, Clone, Default)]
pub struct KeyIndex {
    hasher: RandomState,
    buckets: HashMap<u64, Vec<NodeId>>,
}

impl KeyIndex {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            hasher: RandomState::new(),
            buckets: HashMap::with_capacity(capacity),
        }
    }

    fn hash_of<T, E: NodeEquality<T>>(&self, equality: &E, value: &T) -> u64 {
        let mut hasher = self.hasher.build_hasher();
        equality.hash(value, &mut hasher);
        hasher.finish()
    }

    /// Find the slot whose stored value equals `value` under `equality`.
    pub fn find<T, E: NodeEquality<T>>(
        &self,
        equality: &E,
        values: &[T],
        value: &T,
    ) -> Option<NodeId> {
        self.buckets
            .get(&self.hash_of(equality, value))?
            .iter()
            .copied()
            .find(|id| equality.eq(&values[id.index()], value))
    }

    /// Register `id` as the slot holding `value`. The caller guarantees the
    /// value is not already present.
    pub fn insert<T, E: NodeEquality<T>>(&mut self, equality: &E, value: &T, id: NodeId) {
        let hash = self.hash_of(equality, value);
        self.buckets.entry(hash).or_default().push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equality::{KeyEquality, NaturalEquality};

    #[test]
    fn finds_inserted_values() {
        let values = vec!["a", "b", "c"];
        let mut index = KeyIndex::default();
        for (slot, value) in values.iter().enumerate() {
            index.insert(&NaturalEquality, value, NodeId::new(slot));
        }

        assert_eq!(index.find(&NaturalEquality, &values, &"b"), Some(NodeId::new(1)));
        assert_eq!(index.find(&NaturalEquality, &values, &"z"), None);
    }

    #[test]
    fn collisions_resolve_through_policy_equality() {
        // Every value lands in the same bucket, so lookups must fall back to `eq`.
        struct Colliding;

        impl NodeEquality<u32> for Colliding {
            fn eq(&self, a: &u32, b: &u32) -> bool {
                a == b
            }

            fn hash<H: Hasher>(&self, _value: &u32, state: &mut H) {
                state.write_u8(0);
            }
        }

        let values = vec![10_u32, 20, 30];
        let mut index = KeyIndex::with_capacity(3);
        for (slot, value) in values.iter().enumerate() {
            index.insert(&Colliding, value, NodeId::new(slot));
        }

        assert_eq!(index.buckets.len(), 1);
        assert_eq!(index.find(&Colliding, &values, &30), Some(NodeId::new(2)));
        assert_eq!(index.find(&Colliding, &values, &40), None);
    }

    #[test]
    fn key_policy_merges_equal_keys() {
        let policy = KeyEquality::new(|v: &&str| v.len());
        let values = vec!["one", "three"];
        let mut index = KeyIndex::default();
        for (slot, value) in values.iter().enumerate() {
            index.insert(&policy, value, NodeId::new(slot));
        }

        assert_eq!(index.find(&policy, &values, &"two"), Some(NodeId::new(0)));
        assert_eq!(index.find(&policy, &values, &"seven"), Some(NodeId::new(1)));
        assert_eq!(index.find(&policy, &values, &"four"), None);
    }
}
