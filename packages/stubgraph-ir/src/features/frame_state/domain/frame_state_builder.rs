/*
 * Frame State Builder
 *
 * Abstract interpreter state of one stub method:
 * - locals (one slot per receiver / parameter, plus any locals stored later)
 * - typed operand stack
 * - rethrow flag for exception states
 *
 * `create` snapshots the current state into a `FrameState` data node, which
 * the kit attaches to calls and exception objects as recovery metadata.
 */

use crate::errors::{GraphKitError, Result};
use crate::features::graph_store::domain::{Node, StructuredGraph};
use crate::shared::models::{MethodRef, NodeId, Stamp, TypeRef, ValueKind};

#[derive(Debug, Clone)]
pub struct FrameStateBuilder {
    method: MethodRef,
    locals: Vec<Option<NodeId>>,
    stack: Vec<(ValueKind, NodeId)>,
    rethrow_exception: bool,
}

impl FrameStateBuilder {
    pub fn new(method: MethodRef) -> Self {
        let slots = method.signature().parameter_count(!method.is_static());
        Self {
            method,
            locals: vec![None; slots],
            stack: Vec::new(),
            rethrow_exception: false,
        }
    }

    pub fn method(&self) -> &MethodRef {
        &self.method
    }

    /// Create one uniqued `Parameter` per receiver / declared parameter and
    /// store them in the leading local slots.
    pub fn init_parameters(&mut self, graph: &mut StructuredGraph) -> Result<Vec<NodeId>> {
        let mut types: Vec<Stamp> = Vec::with_capacity(self.locals.len());
        if !self.method.is_static() {
            types.push(Stamp::object(Some(self.method.declaring().clone()), true));
        }
        types.extend(self.method.signature().params.iter().map(Stamp::for_declared_type));

        let mut params = Vec::with_capacity(types.len());
        for (index, stamp) in types.into_iter().enumerate() {
            let id = graph.unique(Node::parameter(index as u32, stamp))?;
            self.store_local(index, id);
            params.push(id);
        }
        Ok(params)
    }

    pub fn store_local(&mut self, index: usize, value: NodeId) {
        if index >= self.locals.len() {
            self.locals.resize(index + 1, None);
        }
        self.locals[index] = Some(value);
    }

    pub fn load_local(&self, index: usize) -> Option<NodeId> {
        self.locals.get(index).copied().flatten()
    }

    pub fn locals(&self) -> &[Option<NodeId>] {
        &self.locals
    }

    pub fn stack_size(&self) -> usize {
        self.stack.len()
    }

    /// Push `value` with the stack kind of `kind`
    pub fn push(&mut self, kind: ValueKind, value: NodeId) {
        self.stack.push((kind.stack_kind(), value));
    }

    /// Pop a value that must have the stack kind of `kind`
    pub fn pop(&mut self, kind: ValueKind) -> Result<NodeId> {
        let expected = kind.stack_kind();
        match self.stack.pop() {
            Some((actual, value)) if actual == expected => Ok(value),
            Some((actual, value)) => {
                self.stack.push((actual, value));
                Err(self.error(format!("pop {} but top of stack is {}", expected, actual)))
            }
            None => Err(self.error(format!("pop {} from an empty stack", expected))),
        }
    }

    pub fn peek(&self) -> Option<NodeId> {
        self.stack.last().map(|(_, v)| *v)
    }

    /// Independent copy for a diverging path
    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn clear_stack(&mut self) {
        self.stack.clear();
    }

    pub fn set_rethrow_exception(&mut self, rethrow: bool) {
        self.rethrow_exception = rethrow;
    }

    pub fn rethrow_exception(&self) -> bool {
        self.rethrow_exception
    }

    /// Snapshot the current state as a `FrameState` node
    pub fn create(&self, graph: &mut StructuredGraph, bci: i32) -> Result<NodeId> {
        let stack = self.stack.iter().map(|(_, v)| *v).collect();
        graph.add(Node::frame_state(
            bci,
            self.locals.clone(),
            stack,
            self.rethrow_exception,
        ))
    }

    /// Declared type of local slot `index` at method entry
    pub fn parameter_type(&self, index: usize) -> Option<TypeRef> {
        if !self.method.is_static() {
            if index == 0 {
                return Some(self.method.declaring().clone());
            }
            return self.method.signature().params.get(index - 1).cloned();
        }
        self.method.signature().params.get(index).cloned()
    }

    fn error(&self, message: String) -> GraphKitError {
        GraphKitError::FrameState {
            method: self.method.qualified_name(),
            message,
        }
    }
}
