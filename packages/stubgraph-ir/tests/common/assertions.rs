//! Graph assertions

use stubgraph_ir::{NodeId, NodeKind, StructuredGraph};

pub fn count_kind(graph: &StructuredGraph, name: &str) -> usize {
    graph.count_where(|k| k.name() == name)
}

/// The control nodes that feed `merge`, in forward-end order
pub fn merge_inputs(graph: &StructuredGraph, merge: NodeId) -> Vec<NodeId> {
    graph
        .merge_ends(merge)
        .expect("merge node")
        .iter()
        .map(|end| {
            graph
                .get(*end)
                .expect("end node")
                .predecessor()
                .expect("linked end")
        })
        .collect()
}

/// Walk `next` links from `from` until a node without one
pub fn control_chain(graph: &StructuredGraph, from: NodeId) -> Vec<NodeId> {
    let mut chain = vec![from];
    let mut current = from;
    while let Some(next) = graph.get(current).expect("node").next() {
        chain.push(next);
        current = next;
    }
    chain
}

pub fn if_successors(graph: &StructuredGraph, split: NodeId) -> (NodeId, NodeId) {
    match graph.kind(split).expect("if node") {
        NodeKind::If {
            true_successor,
            false_successor,
            ..
        } => (*true_successor, *false_successor),
        other => panic!("expected If, got {:?}", other),
    }
}
