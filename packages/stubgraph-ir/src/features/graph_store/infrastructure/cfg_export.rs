//! Control-flow view of a structured graph
//!
//! Projects the control nodes of a `StructuredGraph` onto a petgraph `DiGraph`
//! so standard algorithms (dominators, DFS reachability) can run over it.

use std::collections::{HashMap, HashSet};

use petgraph::algo::dominators::{self, Dominators};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;

use crate::features::graph_store::domain::{NodeKind, StructuredGraph};
use crate::shared::models::NodeId;

/// Label of a control edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEdge {
    Next,
    TrueBranch,
    FalseBranch,
    Exception,
    /// End -> Merge
    Forward,
}

/// Control-flow graph over the control nodes
#[derive(Debug)]
pub struct ControlFlowView {
    pub graph: DiGraph<NodeId, ControlEdge>,
    index: HashMap<NodeId, NodeIndex>,
    root: NodeIndex,
}

impl ControlFlowView {
    pub fn build(source: &StructuredGraph) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        let root = graph.add_node(source.start());
        index.insert(source.start(), root);
        for (id, node) in source.iter() {
            if node.is_control() && id != source.start() {
                index.insert(id, graph.add_node(id));
            }
        }

        for (id, node) in source.iter() {
            let Some(&from) = index.get(&id) else {
                continue;
            };
            if let Some(next) = node.next() {
                if let Some(&to) = index.get(&next) {
                    graph.add_edge(from, to, ControlEdge::Next);
                }
            }
            match node.kind() {
                NodeKind::If {
                    true_successor,
                    false_successor,
                    ..
                } => {
                    if let Some(&to) = index.get(true_successor) {
                        graph.add_edge(from, to, ControlEdge::TrueBranch);
                    }
                    if let Some(&to) = index.get(false_successor) {
                        graph.add_edge(from, to, ControlEdge::FalseBranch);
                    }
                }
                NodeKind::InvokeWithException { exception_edge, .. } => {
                    if let Some(&to) = index.get(exception_edge) {
                        graph.add_edge(from, to, ControlEdge::Exception);
                    }
                }
                NodeKind::Merge { ends } => {
                    for end in ends {
                        if let Some(&pred) = index.get(end) {
                            graph.add_edge(pred, from, ControlEdge::Forward);
                        }
                    }
                }
                _ => {}
            }
        }

        Self { graph, index, root }
    }

    pub fn node_index(&self, id: NodeId) -> Option<NodeIndex> {
        self.index.get(&id).copied()
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn dominators(&self) -> Dominators<NodeIndex> {
        dominators::simple_fast(&self.graph, self.root)
    }

    /// Control nodes reachable from `Start`
    pub fn reachable(&self) -> HashSet<NodeId> {
        let mut seen = HashSet::new();
        let mut dfs = Dfs::new(&self.graph, self.root);
        while let Some(ix) = dfs.next(&self.graph) {
            seen.insert(self.graph[ix]);
        }
        seen
    }
}
