//! Serializable graph dump for debugging and golden tests

use serde::{Deserialize, Serialize};

use crate::features::graph_store::domain::StructuredGraph;
use crate::shared::models::{NodeId, SourcePosition};

/// One node in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub kind: String,
    pub label: String,
    pub stamp: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub successors: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predecessor: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_after: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_position: Option<SourcePosition>,
}

/// Whole-graph snapshot, nodes in creation order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub name: String,
    pub nodes: Vec<NodeSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub called_methods: Vec<String>,
}

impl GraphSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeSnapshot> {
        self.nodes.get(id.index())
    }

    /// Number of nodes of the given kind name
    pub fn count_kind(&self, kind: &str) -> usize {
        self.nodes.iter().filter(|n| n.kind == kind).count()
    }
}

impl StructuredGraph {
    pub fn snapshot(&self) -> GraphSnapshot {
        let nodes = self
            .iter()
            .map(|(id, node)| NodeSnapshot {
                id,
                kind: node.kind().name().to_string(),
                label: node.to_string(),
                stamp: node.stamp().to_string(),
                inputs: node.kind().inputs(),
                successors: node.successors(),
                predecessor: node.predecessor(),
                state_after: node.state_after(),
                source_position: node.source_position().cloned(),
            })
            .collect();
        GraphSnapshot {
            name: self.name().to_string(),
            nodes,
            called_methods: self.called_methods().iter().map(|m| m.to_string()).collect(),
        }
    }
}
