//! Node uniquing (hash-consing) table
//!
//! Keys are the node kind plus canonical input identities plus the stamp, so two
//! requests for the same pure value resolve to one arena entry.

use ahash::AHashMap as HashMap;

use super::node::{BinaryOp, CompareOp, Constant, Node, NodeKind};
use crate::shared::models::{NodeId, Stamp};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ValueKey {
    Parameter(u32),
    Constant(Constant),
    Binary(BinaryOp, NodeId, NodeId),
    Compare(CompareOp, NodeId, NodeId),
    IsNull(NodeId),
}

/// Content key of a value-numberable node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataKey {
    value: ValueKey,
    stamp: Stamp,
}

impl DataKey {
    /// Key for `node`, or None when the node does not take part in uniquing
    pub fn of(node: &Node) -> Option<Self> {
        let value = match &node.kind {
            NodeKind::Parameter { index } => ValueKey::Parameter(*index),
            NodeKind::Constant(c) => ValueKey::Constant(*c),
            NodeKind::Binary { op, x, y } => ValueKey::Binary(*op, *x, *y),
            NodeKind::Compare { op, x, y } => ValueKey::Compare(*op, *x, *y),
            NodeKind::IsNull { value } => ValueKey::IsNull(*value),
            _ => return None,
        };
        Some(Self {
            value,
            stamp: node.stamp.clone(),
        })
    }
}

/// Uniquing statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValueNumberStats {
    pub lookups: usize,
    pub hits: usize,
}

/// Content-keyed lookup table scoped to one graph
#[derive(Debug, Default)]
pub struct ValueNumberTable {
    entries: HashMap<DataKey, NodeId>,
    stats: ValueNumberStats,
}

impl ValueNumberTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&mut self, key: &DataKey) -> Option<NodeId> {
        self.stats.lookups += 1;
        let found = self.entries.get(key).copied();
        if found.is_some() {
            self.stats.hits += 1;
        }
        found
    }

    pub fn insert(&mut self, key: DataKey, id: NodeId) {
        self.entries.insert(key, id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> &ValueNumberStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ignores_control_nodes() {
        assert!(DataKey::of(&Node::begin()).is_none());
        assert!(DataKey::of(&Node::end()).is_none());
    }

    #[test]
    fn test_key_includes_stamp() {
        let a = Node::parameter(0, Stamp::int());
        let b = Node::parameter(0, Stamp::long());
        assert_ne!(DataKey::of(&a), DataKey::of(&b));
    }

    #[test]
    fn test_table_counts_hits() {
        let mut table = ValueNumberTable::new();
        let key = DataKey::of(&Node::constant(Constant::Int(7))).unwrap();
        assert_eq!(table.find(&key), None);
        table.insert(key.clone(), NodeId::from_index(5));
        assert_eq!(table.find(&key), Some(NodeId::from_index(5)));
        assert_eq!(
            table.stats(),
            &ValueNumberStats {
                lookups: 2,
                hits: 1
            }
        );
    }
}
