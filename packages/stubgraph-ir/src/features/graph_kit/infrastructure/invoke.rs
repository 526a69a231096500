/*
 * Invoke Construction
 *
 * - method lookup through the `MethodResolver` port
 * - argument checks against the callee signature (count, stack kinds)
 * - call target + call node, appended at the cursor
 * - frame state after the call when a `FrameStateBuilder` is supplied
 * - raising variants that open an exception edge, by default unwinding
 *
 * While a call is built, nodes inherit a source position at the call's bci
 * (only when the graph tracks positions).
 */

use super::kit::GraphKit;
use crate::errors::{GraphKitError, Result};
use crate::features::frame_state::FrameStateBuilder;
use crate::features::graph_store::domain::Node;
use crate::shared::models::{
    InvokeKind, MethodRef, NodeId, SourcePosition, Stamp, TypeRef, ValueKind, UNKNOWN_BCI,
};

impl GraphKit {
    // ========================================
    // Method lookup
    // ========================================

    /// The unique method of `declaring` named `name` with the given static-ness
    pub fn find_method(&self, declaring: &str, name: &str, is_static: bool) -> Result<MethodRef> {
        let ty = self.lookup_type(declaring)?;
        let mut found: Option<MethodRef> = None;
        for m in self.providers.resolver.declared_methods(&ty) {
            if m.is_static() == is_static && m.name() == name {
                if found.is_some() {
                    return Err(GraphKitError::AmbiguousMethod {
                        declaring: declaring.to_string(),
                        name: name.to_string(),
                    });
                }
                found = Some(m);
            }
        }
        found.ok_or_else(|| GraphKitError::MethodNotFound {
            declaring: declaring.to_string(),
            name: name.to_string(),
            detail: if is_static { "static" } else { "non-static" }.to_string(),
        })
    }

    /// The method of `declaring` named `name` whose parameter types are exactly `params`
    pub fn find_method_with_params(
        &self,
        declaring: &str,
        name: &str,
        params: &[TypeRef],
    ) -> Result<MethodRef> {
        let ty = self.lookup_type(declaring)?;
        let mut matches = self
            .providers
            .resolver
            .declared_methods(&ty)
            .into_iter()
            .filter(|m| m.name() == name && m.signature().params == params);
        let Some(method) = matches.next() else {
            let detail = params
                .iter()
                .map(|p| p.name())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(GraphKitError::MethodNotFound {
                declaring: declaring.to_string(),
                name: name.to_string(),
                detail: format!("arity {}: {}", params.len(), detail),
            });
        };
        if matches.next().is_some() {
            return Err(GraphKitError::AmbiguousMethod {
                declaring: declaring.to_string(),
                name: name.to_string(),
            });
        }
        Ok(method)
    }

    fn lookup_type(&self, name: &str) -> Result<TypeRef> {
        self.providers
            .resolver
            .lookup_type(name)
            .ok_or_else(|| GraphKitError::TypeNotFound(name.to_string()))
    }

    // ========================================
    // Plain invokes
    // ========================================

    /// Static call without frame state
    pub fn create_invoke(&mut self, declaring: &str, name: &str, args: &[NodeId]) -> Result<NodeId> {
        self.create_invoke_by_name(declaring, name, InvokeKind::Static, None, UNKNOWN_BCI, args)
    }

    pub fn create_invoke_by_name(
        &mut self,
        declaring: &str,
        name: &str,
        kind: InvokeKind,
        frame_state: Option<&mut FrameStateBuilder>,
        bci: i32,
        args: &[NodeId],
    ) -> Result<NodeId> {
        let method = self.find_method(declaring, name, kind == InvokeKind::Static)?;
        self.create_invoke_method(&method, kind, frame_state, bci, args)
    }

    /// Append an `Invoke` of `method`
    pub fn create_invoke_method(
        &mut self,
        method: &MethodRef,
        kind: InvokeKind,
        frame_state: Option<&mut FrameStateBuilder>,
        bci: i32,
        args: &[NodeId],
    ) -> Result<NodeId> {
        self.with_invoke_position(bci, |kit| {
            let (call_target, return_stamp) = kit.create_method_call_target(method, kind, args)?;
            let invoke = kit.append(Node::invoke(call_target, return_stamp, bci))?;
            kit.push_for_state_split(frame_state, bci, invoke)?;
            Ok(invoke)
        })
    }

    /// Static call of an intrinsic, no frame state
    pub fn create_intrinsic_invoke(&mut self, method: &MethodRef, args: &[NodeId]) -> Result<NodeId> {
        self.create_invoke_method(method, InvokeKind::Static, None, UNKNOWN_BCI, args)
    }

    // ========================================
    // Raising invokes
    // ========================================

    /// Append an `InvokeWithException` of `method` and open its exception edge
    pub fn start_invoke_with_exception(
        &mut self,
        method: &MethodRef,
        kind: InvokeKind,
        frame_state: Option<&mut FrameStateBuilder>,
        bci: i32,
        args: &[NodeId],
    ) -> Result<NodeId> {
        let (call_target, _) = self.create_method_call_target(method, kind, args)?;
        self.start_invoke_with_exception_target(call_target, frame_state, bci)
    }

    /// `start_invoke_with_exception` for an existing call target
    pub fn start_invoke_with_exception_target(
        &mut self,
        call_target: NodeId,
        mut frame_state: Option<&mut FrameStateBuilder>,
        bci: i32,
    ) -> Result<NodeId> {
        self.structures.ensure_capacity(self.graph.name())?;
        let return_stamp = self.call_target_stamp(call_target)?;
        let exception = self.create_exception_object(frame_state.as_deref(), bci)?;
        let invoke = self.append(Node::invoke_with_exception(
            call_target,
            exception,
            return_stamp,
            bci,
        ))?;
        self.start_with_exception(invoke, exception, frame_state.as_deref_mut(), bci)
    }

    /// Raising call whose exception arm unwinds to the caller
    pub fn create_invoke_with_exception_and_unwind(
        &mut self,
        method: &MethodRef,
        kind: InvokeKind,
        frame_state: Option<&mut FrameStateBuilder>,
        bci: i32,
        args: &[NodeId],
    ) -> Result<NodeId> {
        self.with_invoke_position(bci, |kit| {
            let invoke = kit.start_invoke_with_exception(method, kind, frame_state, bci, args)?;
            kit.unwind_exception_edge()?;
            Ok(invoke)
        })
    }

    /// `create_invoke_with_exception_and_unwind` for an existing call target
    pub fn create_invoke_with_exception_and_unwind_target(
        &mut self,
        call_target: NodeId,
        frame_state: Option<&mut FrameStateBuilder>,
        bci: i32,
    ) -> Result<NodeId> {
        self.with_invoke_position(bci, |kit| {
            let invoke = kit.start_invoke_with_exception_target(call_target, frame_state, bci)?;
            kit.unwind_exception_edge()?;
            Ok(invoke)
        })
    }

    fn unwind_exception_edge(&mut self) -> Result<()> {
        self.exception_part()?;
        let exception = self.exception_object()?;
        self.append(Node::unwind(exception))?;
        self.end_invoke_with_exception()?;
        Ok(())
    }

    // ========================================
    // Shared pieces
    // ========================================

    /// Check `args` against `method` and add its `MethodCallTarget`
    fn create_method_call_target(
        &mut self,
        method: &MethodRef,
        kind: InvokeKind,
        args: &[NodeId],
    ) -> Result<(NodeId, Stamp)> {
        if method.is_static() != (kind == InvokeKind::Static) {
            return Err(GraphKitError::InvokeKindMismatch {
                graph: self.graph.name().to_string(),
                method: method.to_string(),
                kind: kind.to_string(),
                is_static: method.is_static(),
            });
        }
        self.check_args(method, args)?;
        let return_stamp = self.stamp_for(method.return_type());
        let call_target = self.graph.add(Node::method_call_target(
            kind,
            method.clone(),
            args.to_vec(),
            return_stamp.clone(),
        ))?;
        self.graph.record_called_method(method);
        Ok((call_target, return_stamp))
    }

    fn call_target_stamp(&self, call_target: NodeId) -> Result<Stamp> {
        let node = self.graph.get(call_target)?;
        if node.is_control() {
            return Err(GraphKitError::invalid_node(
                self.graph.name(),
                call_target,
                "call target must be a data node",
            ));
        }
        Ok(node.stamp().clone())
    }

    /// Verify argument count and the stack kind of every argument
    pub fn check_args(&self, method: &MethodRef, args: &[NodeId]) -> Result<()> {
        let signature = method.signature();
        let is_static = method.is_static();
        let expected = signature.parameter_count(!is_static);
        if expected != args.len() {
            return Err(GraphKitError::ArgumentCount {
                graph: self.graph.name().to_string(),
                method: method.to_string(),
                expected,
                actual: args.len(),
            });
        }

        let mut args = args.iter();
        if !is_static {
            if let Some(receiver) = args.next() {
                let expected = self.as_kind(method.declaring()).stack_kind();
                self.check_arg_kind(method, "receiver argument".to_string(), expected, *receiver)?;
            }
        }
        for (i, (param, arg)) in signature.params.iter().zip(args).enumerate() {
            let expected = self.as_kind(param).stack_kind();
            self.check_arg_kind(method, format!("argument {}", i), expected, *arg)?;
        }
        Ok(())
    }

    fn check_arg_kind(
        &self,
        method: &MethodRef,
        position: String,
        expected: ValueKind,
        arg: NodeId,
    ) -> Result<()> {
        let actual = self.graph.get(arg)?.stamp().stack_kind();
        if actual != expected {
            return Err(GraphKitError::ArgumentKind {
                graph: self.graph.name().to_string(),
                method: method.to_string(),
                position,
                expected: expected.to_string(),
                actual: actual.to_string(),
            });
        }
        Ok(())
    }

    /// Record the state after `split`, with its result on the stack
    pub(super) fn push_for_state_split(
        &mut self,
        frame_state: Option<&mut FrameStateBuilder>,
        bci: i32,
        split: NodeId,
    ) -> Result<()> {
        let Some(builder) = frame_state else {
            return Ok(());
        };
        let stack_kind = self.graph.get(split)?.stamp().stack_kind();
        let produces_value = stack_kind != ValueKind::Void;
        if produces_value {
            builder.push(stack_kind, split);
        }
        let state = builder.create(&mut self.graph, bci)?;
        self.graph.set_state_after(split, state)?;
        if produces_value {
            builder.pop(stack_kind)?;
        }
        Ok(())
    }

    // ========================================
    // Source positions
    // ========================================

    fn invoke_position(&self, bci: i32) -> Option<SourcePosition> {
        if !self.graph.tracks_node_source_position() {
            return None;
        }
        let method = match self.graph.current_position() {
            Some(current) => current.method.clone(),
            None => self.stub_method.qualified_name().into(),
        };
        Some(SourcePosition::at(method, bci))
    }

    /// Run `build` with new nodes positioned at `bci`, restoring the previous
    /// position afterwards (also on error).
    fn with_invoke_position<T>(
        &mut self,
        bci: i32,
        build: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let Some(position) = self.invoke_position(bci) else {
            return build(self);
        };
        let previous = self.graph.replace_current_position(Some(position));
        let result = build(self);
        self.graph.replace_current_position(previous);
        result
    }
}
