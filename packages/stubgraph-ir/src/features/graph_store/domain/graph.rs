/*
 * Structured Graph
 *
 * Arena of nodes addressed by `NodeId`. Owns:
 * - every node of one stub body
 * - the uniquing table for pure data nodes
 * - the "current source position" that new nodes inherit
 *
 * Control links are stored on both ends (`next` / `predecessor`) and every
 * link operation refuses to overwrite an existing one, so a control node is
 * never linked twice.
 */

use crate::errors::{GraphKitError, Result};
use crate::shared::models::{MethodRef, NodeId, SourcePosition, Stamp};

use super::node::{Node, NodeKind};
use super::value_numbering::{DataKey, ValueNumberStats, ValueNumberTable};

/// IR graph of one synthesized stub body
#[derive(Debug)]
pub struct StructuredGraph {
    name: String,
    nodes: Vec<Node>,
    start: NodeId,
    value_numbers: ValueNumberTable,
    track_node_source_position: bool,
    current_position: Option<SourcePosition>,
    record_called_methods: bool,
    called_methods: Vec<MethodRef>,
}

impl StructuredGraph {
    /// Create a graph holding only its `Start` node
    pub fn new(name: impl Into<String>) -> Self {
        let mut nodes = Vec::with_capacity(64);
        nodes.push(Node::new(NodeKind::Start, Stamp::void()));
        Self {
            name: name.into(),
            nodes,
            start: NodeId::from_index(0),
            value_numbers: ValueNumberTable::new(),
            track_node_source_position: false,
            current_position: None,
            record_called_methods: false,
            called_methods: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Node lookup that reports unknown ids as a contract violation
    pub fn get(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.index())
            .ok_or_else(|| GraphKitError::invalid_node(&self.name, id, "unknown node id"))
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        let name = &self.name;
        self.nodes
            .get_mut(id.index())
            .ok_or_else(|| GraphKitError::invalid_node(name, id, "unknown node id"))
    }

    pub fn kind(&self, id: NodeId) -> Result<&NodeKind> {
        Ok(&self.get(id)?.kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId::from_index(i), n))
    }

    /// Ids of all nodes whose kind satisfies `pred`, in creation order
    pub fn node_ids_where(&self, pred: impl Fn(&NodeKind) -> bool) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, n)| pred(&n.kind))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn count_where(&self, pred: impl Fn(&NodeKind) -> bool) -> usize {
        self.nodes.iter().filter(|n| pred(&n.kind)).count()
    }

    // ========================================
    // Insertion
    // ========================================

    /// Insert a node unconditionally
    pub fn add(&mut self, mut node: Node) -> Result<NodeId> {
        for input in node.kind.inputs() {
            self.get(input)?;
        }
        if let Some(state) = node.state_after {
            self.get(state)?;
        }
        let successors = node.kind.fixed_successors();
        for succ in &successors {
            let target = self.get(*succ)?;
            if let Some(pred) = target.predecessor {
                return Err(GraphKitError::AlreadyLinked {
                    graph: self.name.clone(),
                    node: *succ,
                    message: format!("successor placeholder already follows {}", pred),
                });
            }
        }
        if node.source_position.is_none() && self.track_node_source_position {
            node.source_position = self.current_position.clone();
        }

        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(node);
        for succ in successors {
            self.nodes[succ.index()].predecessor = Some(id);
        }

        #[cfg(feature = "trace")]
        tracing::trace!(graph = %self.name, node = %id, kind = self.nodes[id.index()].kind.name(), "add");

        Ok(id)
    }

    /// Insert a data node, or return an existing content-equal node.
    /// Nodes outside the uniquing scheme are added as-is.
    pub fn unique(&mut self, node: Node) -> Result<NodeId> {
        if node.is_control() {
            return Err(GraphKitError::NotDataNode {
                graph: self.name.clone(),
                node: node.to_string(),
            });
        }
        let Some(key) = DataKey::of(&node) else {
            return self.add(node);
        };
        if let Some(existing) = self.value_numbers.find(&key) {
            #[cfg(feature = "trace")]
            tracing::trace!(graph = %self.name, node = %existing, "unique hit");
            return Ok(existing);
        }
        let id = self.add(node)?;
        self.value_numbers.insert(key, id);
        Ok(id)
    }

    /// `unique` for value-numberable nodes, `add` for everything else
    pub fn add_or_unique(&mut self, node: Node) -> Result<NodeId> {
        if node.kind.is_value_numberable() {
            self.unique(node)
        } else {
            self.add(node)
        }
    }

    // ========================================
    // Control links
    // ========================================

    /// Link `node` as the successor of the fixed-with-next node `prev`
    pub fn add_after_fixed(&mut self, prev: NodeId, node: NodeId) -> Result<()> {
        if !self.get(prev)?.kind.is_fixed_with_next() {
            return Err(GraphKitError::invalid_node(
                &self.name,
                prev,
                "cannot add after a node without a single next successor",
            ));
        }
        self.set_next(prev, node)
    }

    /// Fill the `next` slot of `node`
    pub fn set_next(&mut self, node: NodeId, next: NodeId) -> Result<()> {
        let current = self.get(node)?;
        if !current.kind.has_next_slot() {
            return Err(GraphKitError::invalid_node(
                &self.name,
                node,
                format!("{} has no next slot", current.kind.name()),
            ));
        }
        if let Some(existing) = current.next {
            return Err(GraphKitError::AlreadyLinked {
                graph: self.name.clone(),
                node,
                message: format!("next is already {}", existing),
            });
        }
        let successor = self.get(next)?;
        if !successor.is_control() || next == self.start {
            return Err(GraphKitError::invalid_node(
                &self.name,
                next,
                "only non-start control nodes can be linked",
            ));
        }
        if let Some(pred) = successor.predecessor {
            return Err(GraphKitError::AlreadyLinked {
                graph: self.name.clone(),
                node: next,
                message: format!("expected no predecessor but found {}", pred),
            });
        }
        self.nodes[node.index()].next = Some(next);
        self.nodes[next.index()].predecessor = Some(node);
        Ok(())
    }

    /// Append `end` to the forward ends of `merge`
    pub fn add_forward_end(&mut self, merge: NodeId, end: NodeId) -> Result<()> {
        if !matches!(self.get(end)?.kind, NodeKind::End) {
            return Err(GraphKitError::invalid_node(&self.name, end, "forward end must be an End"));
        }
        let name = self.name.clone();
        match &mut self.get_mut(merge)?.kind {
            NodeKind::Merge { ends } => {
                if ends.contains(&end) {
                    return Err(GraphKitError::AlreadyLinked {
                        graph: name,
                        node: end,
                        message: format!("already a forward end of {}", merge),
                    });
                }
                ends.push(end);
                Ok(())
            }
            _ => Err(GraphKitError::invalid_node(name, merge, "not a Merge")),
        }
    }

    pub fn merge_ends(&self, merge: NodeId) -> Result<&[NodeId]> {
        match &self.get(merge)?.kind {
            NodeKind::Merge { ends } => Ok(ends),
            _ => Err(GraphKitError::invalid_node(&self.name, merge, "not a Merge")),
        }
    }

    // ========================================
    // Metadata
    // ========================================

    /// Attach recovery metadata to a node
    pub fn set_state_after(&mut self, node: NodeId, state: NodeId) -> Result<()> {
        if !matches!(self.get(state)?.kind, NodeKind::FrameState { .. }) {
            return Err(GraphKitError::invalid_node(&self.name, state, "not a FrameState"));
        }
        self.get_mut(node)?.state_after = Some(state);
        Ok(())
    }

    pub fn set_stamp(&mut self, node: NodeId, stamp: Stamp) -> Result<()> {
        self.get_mut(node)?.stamp = stamp;
        Ok(())
    }

    pub fn value_numbering_stats(&self) -> &ValueNumberStats {
        self.value_numbers.stats()
    }

    pub fn set_track_node_source_position(&mut self, enabled: bool) {
        self.track_node_source_position = enabled;
    }

    pub fn tracks_node_source_position(&self) -> bool {
        self.track_node_source_position
    }

    pub fn current_position(&self) -> Option<&SourcePosition> {
        self.current_position.as_ref()
    }

    /// Replace the position new nodes inherit, returning the previous one
    pub fn replace_current_position(
        &mut self,
        position: Option<SourcePosition>,
    ) -> Option<SourcePosition> {
        std::mem::replace(&mut self.current_position, position)
    }

    pub fn set_record_called_methods(&mut self, enabled: bool) {
        self.record_called_methods = enabled;
    }

    /// Remember `method` as a callee of this graph, once
    pub fn record_called_method(&mut self, method: &MethodRef) {
        if self.record_called_methods && !self.called_methods.contains(method) {
            self.called_methods.push(method.clone());
        }
    }

    pub fn called_methods(&self) -> &[MethodRef] {
        &self.called_methods
    }
}
