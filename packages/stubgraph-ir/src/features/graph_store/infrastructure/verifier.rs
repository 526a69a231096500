/*
 * Graph Verifier
 *
 * Checks run over a finished graph:
 * - predecessor / successor links agree on both ends
 * - every End feeds exactly one Merge
 * - every ValuePhi has one value per forward end of its merge
 * - every control node is reachable from Start
 * - every value used by a control node is available there (dominance)
 *
 * Dominators come from petgraph over the `ControlFlowView` projection.
 */

use std::collections::HashSet;

use petgraph::algo::dominators::Dominators;
use petgraph::graph::NodeIndex;
use tracing::warn;

use super::cfg_export::ControlFlowView;
use crate::errors::{GraphKitError, Result};
use crate::features::graph_store::domain::{NodeKind, StructuredGraph};
use crate::shared::models::NodeId;

impl StructuredGraph {
    /// Control-flow projection of this graph
    pub fn control_flow_graph(&self) -> ControlFlowView {
        ControlFlowView::build(self)
    }

    /// Run all structural checks
    pub fn verify(&self) -> Result<()> {
        let result = GraphVerifier::new(self).run();
        if let Err(err) = &result {
            warn!(graph = %self.name(), error = %err, "graph verification failed");
        }
        result
    }
}

struct GraphVerifier<'g> {
    graph: &'g StructuredGraph,
    view: ControlFlowView,
    dominators: Dominators<NodeIndex>,
    checked: HashSet<(NodeId, NodeId)>,
}

impl<'g> GraphVerifier<'g> {
    fn new(graph: &'g StructuredGraph) -> Self {
        let view = ControlFlowView::build(graph);
        let dominators = view.dominators();
        Self {
            graph,
            view,
            dominators,
            checked: HashSet::new(),
        }
    }

    fn fail(&self, message: impl Into<String>) -> GraphKitError {
        GraphKitError::verification(self.graph.name(), message)
    }

    fn run(mut self) -> Result<()> {
        self.check_links()?;
        self.check_merges()?;
        self.check_phis()?;
        self.check_reachability()?;
        self.check_dominance()
    }

    fn check_links(&self) -> Result<()> {
        for (id, node) in self.graph.iter() {
            for succ in node.successors() {
                let target = self.graph.get(succ)?;
                if target.predecessor() != Some(id) {
                    return Err(self.fail(format!(
                        "{} lists {} as successor but its predecessor is {:?}",
                        id,
                        succ,
                        target.predecessor()
                    )));
                }
            }
            if let Some(pred) = node.predecessor() {
                if !self.graph.get(pred)?.successors().contains(&id) {
                    return Err(self.fail(format!(
                        "{} names {} as predecessor but is not one of its successors",
                        id, pred
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_merges(&self) -> Result<()> {
        for end in self.graph.node_ids_where(|k| matches!(k, NodeKind::End)) {
            let users = self
                .graph
                .count_where(|k| matches!(k, NodeKind::Merge { ends } if ends.contains(&end)));
            if users != 1 {
                return Err(self.fail(format!("{} feeds {} merges, expected 1", end, users)));
            }
        }
        Ok(())
    }

    fn check_phis(&self) -> Result<()> {
        for (id, node) in self.graph.iter() {
            if let NodeKind::ValuePhi { merge, values } = node.kind() {
                let ends = self.graph.merge_ends(*merge)?;
                if ends.len() != values.len() {
                    return Err(self.fail(format!(
                        "{} has {} values but {} has {} forward ends",
                        id,
                        values.len(),
                        merge,
                        ends.len()
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_reachability(&self) -> Result<()> {
        let reachable = self.view.reachable();
        for (id, node) in self.graph.iter() {
            if node.is_control() && !reachable.contains(&id) {
                return Err(self.fail(format!("{} ({}) is unreachable", id, node)));
            }
        }
        Ok(())
    }

    fn check_dominance(&mut self) -> Result<()> {
        let control: Vec<NodeId> = self.graph.node_ids_where(NodeKind::is_control);
        for point in control {
            for input in self.graph.get(point)?.inputs() {
                self.check_value(input, point)?;
            }
        }
        Ok(())
    }

    /// `value` must be available at the control node `point`.
    ///
    /// Walks data inputs with an explicit worklist; data chains can be
    /// arbitrarily long.
    fn check_value(&mut self, value: NodeId, point: NodeId) -> Result<()> {
        let mut worklist: Vec<(NodeId, NodeId)> = vec![(value, point)];
        while let Some((value, point)) = worklist.pop() {
            if !self.checked.insert((value, point)) {
                continue;
            }
            let node = self.graph.get(value)?;
            if node.is_control() {
                if !self.dominates(value, point) {
                    return Err(
                        self.fail(format!("{} does not dominate its use at {}", value, point))
                    );
                }
                continue;
            }
            if let NodeKind::ValuePhi { merge, values } = node.kind() {
                if !self.dominates(*merge, point) {
                    return Err(self.fail(format!("{} used at {} outside its merge", value, point)));
                }
                let ends = self.graph.merge_ends(*merge)?;
                worklist.extend(values.iter().copied().zip(ends.iter().copied()));
                continue;
            }
            worklist.extend(node.inputs().into_iter().map(|input| (input, point)));
        }
        Ok(())
    }

    fn dominates(&self, a: NodeId, b: NodeId) -> bool {
        let (Some(a), Some(b)) = (self.view.node_index(a), self.view.node_index(b)) else {
            return false;
        };
        let mut current = Some(b);
        while let Some(ix) = current {
            if ix == a {
                return true;
            }
            current = self.dominators.immediate_dominator(ix);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::graph_store::domain::{BinaryOp, Constant, Node};
    use crate::shared::models::Stamp;

    fn diamond(graph: &mut StructuredGraph) -> (NodeId, NodeId, NodeId) {
        let cond = graph.unique(Node::constant(Constant::Boolean(true))).unwrap();
        let t = graph.add(Node::begin()).unwrap();
        let f = graph.add(Node::begin()).unwrap();
        let split = graph.add(Node::if_node(cond, t, f, 0.5)).unwrap();
        graph.add_after_fixed(graph.start(), split).unwrap();
        let end_t = graph.add(Node::end()).unwrap();
        graph.add_after_fixed(t, end_t).unwrap();
        let end_f = graph.add(Node::end()).unwrap();
        graph.add_after_fixed(f, end_f).unwrap();
        let merge = graph.add(Node::merge()).unwrap();
        graph.add_forward_end(merge, end_t).unwrap();
        graph.add_forward_end(merge, end_f).unwrap();
        (t, f, merge)
    }

    #[test]
    fn test_valid_diamond_with_phi() {
        let mut graph = StructuredGraph::new("stub");
        let (_, _, merge) = diamond(&mut graph);
        let one = graph.unique(Node::constant(Constant::Int(1))).unwrap();
        let two = graph.unique(Node::constant(Constant::Int(2))).unwrap();
        let phi = graph.add(Node::value_phi(merge, vec![one, two], Stamp::int())).unwrap();
        let ret = graph.add(Node::return_value(Some(phi))).unwrap();
        graph.add_after_fixed(merge, ret).unwrap();
        graph.verify().unwrap();
    }

    #[test]
    fn test_phi_arity_mismatch() {
        let mut graph = StructuredGraph::new("stub");
        let (_, _, merge) = diamond(&mut graph);
        let one = graph.unique(Node::constant(Constant::Int(1))).unwrap();
        graph.add(Node::value_phi(merge, vec![one], Stamp::int())).unwrap();
        let err = graph.verify().unwrap_err();
        assert!(matches!(err, GraphKitError::Verification { .. }));
    }

    #[test]
    fn test_unreachable_control_node() {
        let mut graph = StructuredGraph::new("stub");
        graph.add(Node::begin()).unwrap();
        let err = graph.verify().unwrap_err();
        assert!(err.to_string().contains("unreachable"));
    }

    #[test]
    fn test_value_from_one_arm_used_after_merge() {
        let mut graph = StructuredGraph::new("stub");
        let (t, _, merge) = diamond(&mut graph);
        let unwind = graph.add(Node::unwind(t)).unwrap();
        graph.add_after_fixed(merge, unwind).unwrap();
        let err = graph.verify().unwrap_err();
        assert!(err.to_string().contains("does not dominate"));
    }

    #[test]
    fn test_long_data_chain_verifies() {
        let mut graph = StructuredGraph::new("stub");
        let one = graph.unique(Node::constant(Constant::Int(1))).unwrap();
        let mut v = graph.unique(Node::parameter(0, Stamp::int())).unwrap();
        for _ in 0..50_000 {
            v = graph
                .unique(Node::binary(BinaryOp::Add, v, one, Stamp::int()))
                .unwrap();
        }
        let ret = graph.add(Node::return_value(Some(v))).unwrap();
        graph.add_after_fixed(graph.start(), ret).unwrap();
        graph.verify().unwrap();
    }

    #[test]
    fn test_dangling_end() {
        let mut graph = StructuredGraph::new("stub");
        let end = graph.add(Node::end()).unwrap();
        graph.add_after_fixed(graph.start(), end).unwrap();
        let err = graph.verify().unwrap_err();
        assert!(err.to_string().contains("feeds 0 merges"));
    }
}
