/*
 * GraphKit
 *
 * Imperative builder for a `StructuredGraph`:
 * - insertion cursor (`last_fixed`), absent once the current path hit a sink
 * - structure stack of open branch / exception-edge contexts
 * - word-type re-stamping on every node that enters the graph
 *
 * `append` is the only way control nodes are linked into the chain; the
 * branch, exception-edge and invoke operations (sibling modules) all go
 * through it.
 */

use tracing::debug;

use crate::config::KitConfig;
use crate::errors::{GraphKitError, Result};
use crate::features::graph_kit::domain::StructureStack;
use crate::features::graph_kit::ports::Providers;
use crate::features::graph_store::domain::{Constant, Node, StructuredGraph};
use crate::shared::models::{MethodRef, NodeId, SourcePosition, Stamp, TypeRef, ValueKind};

/// A node to append: either fresh, or already in the graph
#[derive(Debug, Clone)]
pub enum NodeHandle {
    Detached(Node),
    Attached(NodeId),
}

impl From<Node> for NodeHandle {
    fn from(node: Node) -> Self {
        NodeHandle::Detached(node)
    }
}

impl From<NodeId> for NodeHandle {
    fn from(id: NodeId) -> Self {
        NodeHandle::Attached(id)
    }
}

#[derive(Debug)]
pub struct GraphKit {
    pub(super) graph: StructuredGraph,
    pub(super) providers: Providers,
    pub(super) config: KitConfig,
    pub(super) stub_method: MethodRef,
    pub(super) last_fixed: Option<NodeId>,
    pub(super) structures: StructureStack,
}

impl GraphKit {
    /// Start a graph for `stub_method`. The cursor sits on `Start`.
    pub fn new(stub_method: MethodRef, providers: Providers, config: KitConfig) -> Result<Self> {
        config.validate()?;
        let name = config
            .name
            .clone()
            .unwrap_or_else(|| stub_method.qualified_name());
        let mut graph = StructuredGraph::new(name);
        graph.set_record_called_methods(config.record_called_methods);
        if config.track_node_source_position {
            graph.set_track_node_source_position(true);
            graph.replace_current_position(Some(SourcePosition::substitution(
                stub_method.qualified_name(),
            )));
        }
        let start = graph.start();
        let structures = StructureStack::new(config.max_structure_depth);

        debug!(graph = %graph.name(), stub = %stub_method, "graph kit created");

        Ok(Self {
            graph,
            providers,
            config,
            stub_method,
            last_fixed: Some(start),
            structures,
        })
    }

    pub fn graph(&self) -> &StructuredGraph {
        &self.graph
    }

    /// Direct graph access for operations the kit does not wrap
    pub fn graph_mut(&mut self) -> &mut StructuredGraph {
        &mut self.graph
    }

    pub fn providers(&self) -> &Providers {
        &self.providers
    }

    pub fn config(&self) -> &KitConfig {
        &self.config
    }

    pub fn stub_method(&self) -> &MethodRef {
        &self.stub_method
    }

    /// Current insertion point; `None` once the path ended in a sink
    pub fn last_fixed(&self) -> Option<NodeId> {
        self.last_fixed
    }

    /// Number of open structured contexts
    pub fn structure_depth(&self) -> usize {
        self.structures.depth()
    }

    // ========================================
    // Node insertion
    // ========================================

    /// Insert a data node, reusing a content-equal one when present
    pub fn unique(&mut self, node: Node) -> Result<NodeId> {
        let node = self.change_to_word(node);
        self.graph.unique(node)
    }

    /// Insert a node without linking it into the control chain
    pub fn add(&mut self, node: Node) -> Result<NodeId> {
        let node = self.change_to_word(node);
        self.graph.add(node)
    }

    /// Re-stamp `node` if its declared type is a word type
    pub fn change_to_word(&self, mut node: Node) -> Node {
        if let (Some(words), Some(ty)) = (&self.providers.word_types, &node.stamp.declared_type) {
            if words.is_word(ty) {
                node.stamp = words.word_stamp(ty);
            }
        }
        node
    }

    pub fn word_stamp(&self, ty: &TypeRef) -> Option<Stamp> {
        let words = self.providers.word_types.as_ref()?;
        words.is_word(ty).then(|| words.word_stamp(ty))
    }

    pub fn as_kind(&self, ty: &TypeRef) -> ValueKind {
        match &self.providers.word_types {
            Some(words) => words.as_kind(ty),
            None => ty.kind(),
        }
    }

    /// Attach a node at the cursor.
    ///
    /// An already attached node is returned unchanged and is not linked. A
    /// fresh data node goes through `unique` (or `add` when it does not take
    /// part in uniquing). A fresh control node is linked after the cursor,
    /// which then moves to it if it has a single successor, or becomes
    /// absent if it does not.
    pub fn append(&mut self, node: impl Into<NodeHandle>) -> Result<NodeId> {
        let node = match node.into() {
            NodeHandle::Attached(id) => {
                self.graph.get(id)?;
                return Ok(id);
            }
            NodeHandle::Detached(node) => self.change_to_word(node),
        };
        if !node.is_control() {
            return self.graph.add_or_unique(node);
        }

        let Some(prev) = self.last_fixed else {
            return Err(GraphKitError::AbsentCursor {
                graph: self.graph.name().to_string(),
                node: node.to_string(),
            });
        };
        let has_next = node.kind().is_fixed_with_next();
        let id = self.graph.add(node)?;
        self.graph.add_after_fixed(prev, id)?;
        self.last_fixed = has_next.then_some(id);

        #[cfg(feature = "trace")]
        tracing::trace!(graph = %self.graph.name(), node = %id, after = %prev, "append");

        Ok(id)
    }

    // ========================================
    // Value helpers
    // ========================================

    /// Uniqued parameter `index` of declared type `ty`
    pub fn parameter(&mut self, index: u32, ty: &TypeRef) -> Result<NodeId> {
        let stamp = self.stamp_for(ty);
        self.unique(Node::parameter(index, stamp))
    }

    pub fn constant(&mut self, value: Constant) -> Result<NodeId> {
        self.unique(Node::constant(value))
    }

    /// Value selection at `merge`; `values[i]` flows in through forward end `i`
    pub fn value_phi(&mut self, merge: NodeId, values: Vec<NodeId>, stamp: Stamp) -> Result<NodeId> {
        let ends = self.graph.merge_ends(merge)?.len();
        if ends != values.len() {
            return Err(GraphKitError::invalid_node(
                self.graph.name(),
                merge,
                format!("phi with {} values for {} forward ends", values.len(), ends),
            ));
        }
        self.add(Node::value_phi(merge, values, stamp))
    }

    pub fn return_value(&mut self, result: Option<NodeId>) -> Result<NodeId> {
        self.append(Node::return_value(result))
    }

    /// Stamp of a value of declared type `ty`
    pub fn stamp_for(&self, ty: &TypeRef) -> Stamp {
        self.providers
            .stamps
            .overriding_stamp(ty)
            .unwrap_or_else(|| Stamp::for_declared_type(ty))
    }

    // ========================================
    // Completion
    // ========================================

    /// Check that every structured context was closed, optionally verify,
    /// and hand out the graph.
    pub fn finish(self) -> Result<StructuredGraph> {
        let open = self.structures.depth();
        if open != 0 {
            return Err(GraphKitError::UnbalancedStructures {
                graph: self.graph.name().to_string(),
                open,
            });
        }
        if self.config.verify_on_finish {
            self.graph.verify()?;
        }
        debug!(
            graph = %self.graph.name(),
            nodes = self.graph.len(),
            "graph kit finished"
        );
        Ok(self.graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::graph_kit::infrastructure::{MetaAccess, NamedWordTypes};
    use crate::features::graph_store::domain::NodeKind;
    use std::sync::Arc;

    fn kit() -> GraphKit {
        let stub = MethodRef::new_static(TypeRef::object("Stubs"), "stub", vec![], TypeRef::void());
        GraphKit::new(stub, Providers::new(Arc::new(MetaAccess::new())), KitConfig::default())
            .unwrap()
    }

    #[test]
    fn test_new_kit_cursor_at_start() {
        let kit = kit();
        assert_eq!(kit.last_fixed(), Some(kit.graph().start()));
        assert_eq!(kit.graph().name(), "Stubs.stub");
        assert_eq!(kit.structure_depth(), 0);
    }

    #[test]
    fn test_append_control_advances_cursor() {
        let mut kit = kit();
        let begin = kit.append(Node::begin()).unwrap();
        assert_eq!(kit.last_fixed(), Some(begin));
        let ret = kit.return_value(None).unwrap();
        assert_eq!(kit.last_fixed(), None);
        assert_eq!(kit.graph().get(begin).unwrap().next(), Some(ret));
    }

    #[test]
    fn test_append_attached_is_identity() {
        let mut kit = kit();
        let begin = kit.append(Node::begin()).unwrap();
        let len = kit.graph().len();
        assert_eq!(kit.append(begin).unwrap(), begin);
        assert_eq!(kit.append(begin).unwrap(), begin);
        assert_eq!(kit.graph().len(), len);
        assert_eq!(kit.last_fixed(), Some(begin));
    }

    #[test]
    fn test_append_data_uniques() {
        let mut kit = kit();
        let a = kit.append(Node::constant(Constant::Int(3))).unwrap();
        let b = kit.append(Node::constant(Constant::Int(3))).unwrap();
        assert_eq!(a, b);
        assert_eq!(kit.last_fixed(), Some(kit.graph().start()));
    }

    #[test]
    fn test_append_with_absent_cursor() {
        let mut kit = kit();
        kit.append(Node::deoptimize("unreachable")).unwrap();
        let err = kit.append(Node::begin()).unwrap_err();
        assert!(matches!(err, GraphKitError::AbsentCursor { .. }));
        assert!(err.is_contract_violation());
    }

    #[test]
    fn test_word_restamping() {
        let stub = MethodRef::new_static(TypeRef::object("Stubs"), "stub", vec![], TypeRef::void());
        let providers = Providers::new(Arc::new(MetaAccess::new()))
            .with_word_types(Arc::new(NamedWordTypes::new(["Pointer"])));
        let mut kit = GraphKit::new(stub, providers, KitConfig::default()).unwrap();
        let p = kit.parameter(0, &TypeRef::object("Pointer")).unwrap();
        assert_eq!(kit.graph().get(p).unwrap().stamp(), &Stamp::long());
        assert_eq!(kit.as_kind(&TypeRef::object("Pointer")), ValueKind::Long);
        assert!(kit.word_stamp(&TypeRef::object("byte[]")).is_none());
        assert!(matches!(
            kit.graph().kind(p).unwrap(),
            NodeKind::Parameter { index: 0 }
        ));
    }

    #[test]
    fn test_value_phi_arity_checked() {
        let mut kit = kit();
        let merge = kit.add(Node::merge()).unwrap();
        let one = kit.constant(Constant::Int(1)).unwrap();
        let err = kit.value_phi(merge, vec![one], Stamp::int()).unwrap_err();
        assert!(matches!(err, GraphKitError::InvalidNode { .. }));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let stub = MethodRef::new_static(TypeRef::object("Stubs"), "stub", vec![], TypeRef::void());
        let err = GraphKit::new(
            stub,
            Providers::new(Arc::new(MetaAccess::new())),
            KitConfig::default().max_structure_depth(0),
        )
        .unwrap_err();
        assert!(matches!(err, GraphKitError::Config(_)));
    }
}
