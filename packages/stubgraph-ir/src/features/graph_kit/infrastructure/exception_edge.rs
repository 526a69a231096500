//! Structured exception edge around a raising node
//!
//! The normal continuation starts at a fresh `Begin` linked as the raising
//! node's `next`; the exception continuation starts at its `ExceptionObject`.
//! When both arms survive, the merge lists the normal edge first and the
//! exception edge second.

use tracing::debug;

use super::kit::GraphKit;
use crate::errors::{GraphKitError, Result};
use crate::features::frame_state::FrameStateBuilder;
use crate::features::graph_kit::domain::{ExceptionEdgeState, Structure, WithExceptionStructure};
use crate::features::graph_store::domain::{Node, NodeKind};
use crate::shared::models::{NodeId, ValueKind};

impl GraphKit {
    /// Open an exception edge for the already appended `with_exception` node,
    /// whose exception successor is `exception_object`.
    pub fn start_with_exception(
        &mut self,
        with_exception: NodeId,
        exception_object: NodeId,
        frame_state: Option<&mut FrameStateBuilder>,
        bci: i32,
    ) -> Result<NodeId> {
        self.check_exception_edge_nodes(with_exception, exception_object)?;
        self.structures.ensure_capacity(self.graph.name())?;
        let normal_begin = self.graph.add(Node::begin())?;
        self.graph.set_next(with_exception, normal_begin)?;
        self.push_for_state_split(frame_state, bci, with_exception)?;
        self.last_fixed = None;

        self.structures.push(
            self.graph.name(),
            Structure::WithException(WithExceptionStructure::new(
                with_exception,
                normal_begin,
                exception_object,
            )),
        )?;
        debug!(
            graph = %self.graph.name(),
            node = %with_exception,
            depth = self.structures.depth(),
            "exception edge opened"
        );
        Ok(with_exception)
    }

    /// Enter the normal-continuation arm
    pub fn no_exception_part(&mut self) -> Result<()> {
        let s = self.save_exception_edge_cursor("noExceptionPart", &[ExceptionEdgeState::Start])?;
        s.state = ExceptionEdgeState::NormalEdge;
        let cursor = s.no_exception_edge;
        self.last_fixed = cursor;
        Ok(())
    }

    /// Leave the normal arm (if entered) and enter the exception arm
    pub fn exception_part(&mut self) -> Result<()> {
        let s = self.save_exception_edge_cursor(
            "exceptionPart",
            &[ExceptionEdgeState::Start, ExceptionEdgeState::NormalEdge],
        )?;
        s.state = ExceptionEdgeState::ExceptionEdge;
        let cursor = s.exception_edge;
        self.last_fixed = cursor;
        Ok(())
    }

    /// Exception object of the innermost open exception edge
    pub fn exception_object(&mut self) -> Result<NodeId> {
        let s = self
            .structures
            .top_exception_edge_mut(self.graph.name(), "exceptionObject")?;
        Ok(s.exception_object)
    }

    /// Close the exception edge and join its arms (normal edge first)
    pub fn end_with_exception(&mut self) -> Result<Option<NodeId>> {
        let s = self.save_exception_edge_cursor(
            "endWithException",
            &[ExceptionEdgeState::NormalEdge, ExceptionEdgeState::ExceptionEdge],
        )?;
        s.state = ExceptionEdgeState::Closed;
        let (node, normal, exceptional) = (s.with_exception, s.no_exception_edge, s.exception_edge);
        self.structures.pop(self.graph.name())?;

        let merge = self.merge_control_split_branches(normal, exceptional)?;
        debug!(
            graph = %self.graph.name(),
            %node,
            merge = ?merge,
            cursor = ?self.last_fixed,
            "exception edge closed"
        );
        Ok(merge)
    }

    /// Same as `end_with_exception`, for edges opened by `start_invoke_with_exception*`
    pub fn end_invoke_with_exception(&mut self) -> Result<Option<NodeId>> {
        self.end_with_exception()
    }

    /// Add an `ExceptionObject` whose state rethrows at `bci`
    pub(super) fn create_exception_object(
        &mut self,
        frame_state: Option<&FrameStateBuilder>,
        bci: i32,
    ) -> Result<NodeId> {
        let exception = self.add(Node::exception_object())?;
        self.set_state_after_exception(frame_state, bci, exception, true)?;
        Ok(exception)
    }

    /// Attach the state seen by an exception handler: the caller's state
    /// (stack cleared when rethrowing) with the exception pushed.
    pub fn set_state_after_exception(
        &mut self,
        frame_state: Option<&FrameStateBuilder>,
        bci: i32,
        exception: NodeId,
        rethrow: bool,
    ) -> Result<()> {
        let Some(builder) = frame_state else {
            return Ok(());
        };
        let mut exception_state = builder.copy();
        if rethrow {
            exception_state.clear_stack();
            exception_state.set_rethrow_exception(true);
        }
        exception_state.push(ValueKind::Object, exception);
        let state = exception_state.create(&mut self.graph, bci)?;
        self.graph.set_state_after(exception, state)
    }

    /// `with_exception` must be a raising call whose exception successor is
    /// the `ExceptionObject` `exception_object`
    fn check_exception_edge_nodes(
        &self,
        with_exception: NodeId,
        exception_object: NodeId,
    ) -> Result<()> {
        match self.graph.kind(with_exception)? {
            NodeKind::InvokeWithException { exception_edge, .. }
                if *exception_edge == exception_object => {}
            NodeKind::InvokeWithException { exception_edge, .. } => {
                return Err(GraphKitError::invalid_node(
                    self.graph.name(),
                    with_exception,
                    format!("exception successor is {}, not {}", exception_edge, exception_object),
                ));
            }
            other => {
                return Err(GraphKitError::invalid_node(
                    self.graph.name(),
                    with_exception,
                    format!("{} cannot open an exception edge", other.name()),
                ));
            }
        }
        if !matches!(self.graph.kind(exception_object)?, NodeKind::ExceptionObject) {
            return Err(GraphKitError::invalid_node(
                self.graph.name(),
                exception_object,
                "not an ExceptionObject",
            ));
        }
        Ok(())
    }

    fn save_exception_edge_cursor(
        &mut self,
        operation: &str,
        allowed: &[ExceptionEdgeState],
    ) -> Result<&mut WithExceptionStructure> {
        let cursor = self.last_fixed;
        let s = self
            .structures
            .top_exception_edge_mut(self.graph.name(), operation)?;
        if !allowed.contains(&s.state) {
            return Err(GraphKitError::structure_state(
                self.graph.name(),
                format!("{} in state {}", operation, s.state),
            ));
        }
        if s.state == ExceptionEdgeState::Start && cursor.is_some() {
            return Err(GraphKitError::structure_state(
                self.graph.name(),
                format!("{}: control emitted before entering an edge", operation),
            ));
        }
        s.save(cursor);
        self.last_fixed = None;
        Ok(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KitConfig;
    use crate::features::graph_kit::infrastructure::MetaAccess;
    use crate::features::graph_kit::ports::Providers;
    use crate::shared::models::{MethodRef, Stamp, TypeRef};
    use std::sync::Arc;

    fn kit() -> GraphKit {
        let stub = MethodRef::new_static(TypeRef::object("Stubs"), "stub", vec![], TypeRef::void());
        GraphKit::new(stub, Providers::new(Arc::new(MetaAccess::new())), KitConfig::default())
            .unwrap()
    }

    /// A raising foreign call wrapped by hand
    fn start_raising_call(kit: &mut GraphKit) -> (NodeId, NodeId) {
        let exception = kit.add(Node::exception_object()).unwrap();
        let target = kit
            .add(Node::method_call_target(
                crate::shared::models::InvokeKind::Static,
                MethodRef::new_static(TypeRef::object("Runtime"), "raise", vec![], TypeRef::void()),
                vec![],
                Stamp::void(),
            ))
            .unwrap();
        let invoke = kit
            .append(Node::invoke_with_exception(target, exception, Stamp::void(), 3))
            .unwrap();
        assert_eq!(kit.last_fixed(), None);
        kit.start_with_exception(invoke, exception, None, 3).unwrap();
        (invoke, exception)
    }

    #[test]
    fn test_both_edges_live_merge_order() {
        let mut kit = kit();
        let (invoke, exception) = start_raising_call(&mut kit);
        assert_eq!(kit.exception_object().unwrap(), exception);
        kit.no_exception_part().unwrap();
        let normal_begin = kit.last_fixed().unwrap();
        assert_eq!(kit.graph().get(invoke).unwrap().next(), Some(normal_begin));
        kit.exception_part().unwrap();
        assert_eq!(kit.last_fixed(), Some(exception));
        let merge = kit.end_with_exception().unwrap().unwrap();

        let ends = kit.graph().merge_ends(merge).unwrap().to_vec();
        assert_eq!(kit.graph().get(ends[0]).unwrap().predecessor(), Some(normal_begin));
        assert_eq!(kit.graph().get(ends[1]).unwrap().predecessor(), Some(exception));
    }

    #[test]
    fn test_no_exception_part_after_exception_part_rejected() {
        let mut kit = kit();
        start_raising_call(&mut kit);
        kit.exception_part().unwrap();
        let err = kit.no_exception_part().unwrap_err();
        assert!(err.to_string().contains("noExceptionPart in state EXCEPTION_EDGE"));
    }

    #[test]
    fn test_end_from_start_rejected() {
        let mut kit = kit();
        start_raising_call(&mut kit);
        assert!(kit.end_with_exception().is_err());
    }

    #[test]
    fn test_exception_state_rethrows() {
        let mut kit = kit();
        let method = MethodRef::new_static(
            TypeRef::object("Stubs"),
            "stub",
            vec![TypeRef::object("byte[]")],
            TypeRef::void(),
        );
        let mut fsb = FrameStateBuilder::new(method);
        let params = fsb.init_parameters(kit.graph_mut()).unwrap();
        fsb.push(ValueKind::Object, params[0]);

        let exception = kit.create_exception_object(Some(&fsb), 11).unwrap();
        let state = kit.graph().get(exception).unwrap().state_after().unwrap();
        match kit.graph().kind(state).unwrap() {
            NodeKind::FrameState {
                bci,
                stack,
                rethrow_exception,
                ..
            } => {
                assert_eq!(*bci, 11);
                assert_eq!(stack, &vec![exception]);
                assert!(*rethrow_exception);
            }
            other => panic!("unexpected {:?}", other),
        }
        // caller's builder is untouched
        assert_eq!(fsb.stack_size(), 1);
        assert!(!fsb.rethrow_exception());
    }

    #[test]
    fn test_start_with_exception_rejects_plain_invoke() {
        let mut kit = kit();
        let target = kit
            .add(Node::method_call_target(
                crate::shared::models::InvokeKind::Static,
                MethodRef::new_static(TypeRef::object("Stubs"), "f", vec![], TypeRef::void()),
                vec![],
                Stamp::void(),
            ))
            .unwrap();
        let invoke = kit.append(Node::invoke(target, Stamp::void(), 0)).unwrap();
        let begin = kit.add(Node::begin()).unwrap();
        let len = kit.graph().len();

        let err = kit.start_with_exception(invoke, begin, None, 0).unwrap_err();
        assert!(matches!(err, GraphKitError::InvalidNode { .. }));
        assert!(err.to_string().contains("Invoke cannot open an exception edge"));
        assert_eq!(kit.graph().len(), len);
        assert_eq!(kit.structure_depth(), 0);
        assert_eq!(kit.last_fixed(), Some(invoke));
        assert_eq!(kit.graph().get(invoke).unwrap().next(), None);
    }

    #[test]
    fn test_start_with_exception_rejects_foreign_exception_object() {
        let mut kit = kit();
        let (_, exception) = start_raising_call(&mut kit);
        kit.exception_part().unwrap();
        kit.append(Node::unwind(exception)).unwrap();
        kit.end_with_exception().unwrap();

        let other = kit.add(Node::exception_object()).unwrap();
        let target = kit
            .add(Node::method_call_target(
                crate::shared::models::InvokeKind::Static,
                MethodRef::new_static(TypeRef::object("Runtime"), "raise", vec![], TypeRef::void()),
                vec![],
                Stamp::void(),
            ))
            .unwrap();
        let invoke = kit
            .append(Node::invoke_with_exception(target, other, Stamp::void(), 4))
            .unwrap();
        let unrelated = kit.add(Node::exception_object()).unwrap();
        let err = kit.start_with_exception(invoke, unrelated, None, 4).unwrap_err();
        assert!(err.to_string().contains("exception successor is"));
        assert_eq!(kit.structure_depth(), 0);
    }

    #[test]
    fn test_rejected_edge_operation_keeps_cursor() {
        let mut kit = kit();
        let begin = kit.append(Node::begin()).unwrap();
        assert!(kit.exception_part().is_err());
        assert!(kit.end_with_exception().is_err());
        assert_eq!(kit.last_fixed(), Some(begin));

        let (_, exception) = start_raising_call(&mut kit);
        kit.exception_part().unwrap();
        assert!(kit.no_exception_part().is_err());
        assert_eq!(kit.last_fixed(), Some(exception));
    }
}
