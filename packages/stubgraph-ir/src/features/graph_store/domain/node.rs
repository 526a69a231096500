//! IR nodes
//!
//! A node is either a control node (fixed position in the execution order, at
//! most one predecessor) or a data node (floating pure value, shareable).
//! Edges are `NodeId`s into the owning graph's arena.

use std::fmt;
use std::sync::Arc;

use crate::shared::models::{InvokeKind, MethodRef, NodeId, SourcePosition, Stamp, ValueKind};

/// Node category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCategory {
    Control,
    Data,
}

/// Constant payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constant {
    Int(i32),
    Long(i64),
    Boolean(bool),
    Null,
    /// Raw machine word (address-sized)
    Word(u64),
}

impl Constant {
    pub fn stamp(&self) -> Stamp {
        match self {
            Constant::Int(_) => Stamp::int(),
            Constant::Long(_) | Constant::Word(_) => Stamp::long(),
            Constant::Boolean(_) => Stamp::boolean(),
            Constant::Null => Stamp::object(None, false),
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(v) => write!(f, "{}i", v),
            Constant::Long(v) => write!(f, "{}l", v),
            Constant::Boolean(v) => write!(f, "{}", v),
            Constant::Null => f.write_str("null"),
            Constant::Word(v) => write!(f, "{:#x}w", v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    UShr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Unsigned less-than
    Below,
}

/// Node kind with its kind-specific edges
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    // ---- control ----
    /// Graph entry
    Start,
    /// Entry marker of a branch arm or of a normal call continuation
    Begin,
    /// Two-way split; successors are `Begin` placeholders
    If {
        condition: NodeId,
        true_successor: NodeId,
        false_successor: NodeId,
        true_probability: f64,
    },
    /// Join of forward ends, in order
    Merge { ends: Vec<NodeId> },
    /// Path end feeding a merge
    End,
    /// Call that cannot raise (or whose exception is not modelled)
    Invoke { call_target: NodeId, bci: i32 },
    /// Call with a normal successor (`next`) and an exception successor
    InvokeWithException {
        call_target: NodeId,
        exception_edge: NodeId,
        bci: i32,
    },
    /// Control enters here because the preceding call raised
    ExceptionObject,
    /// Leaf call into a runtime routine
    ForeignCall {
        descriptor: Arc<str>,
        args: Vec<NodeId>,
    },
    /// Propagate an exception to the caller
    Unwind { exception: NodeId },
    Return { result: Option<NodeId> },
    Deoptimize { reason: Arc<str> },

    // ---- data ----
    Parameter { index: u32 },
    Constant(Constant),
    Binary { op: BinaryOp, x: NodeId, y: NodeId },
    Compare { op: CompareOp, x: NodeId, y: NodeId },
    IsNull { value: NodeId },
    MethodCallTarget {
        invoke_kind: InvokeKind,
        target: MethodRef,
        args: Vec<NodeId>,
    },
    /// Recovery metadata snapshot
    FrameState {
        bci: i32,
        locals: Vec<Option<NodeId>>,
        stack: Vec<NodeId>,
        rethrow_exception: bool,
    },
    /// Value selection after a merge; `values[i]` flows in through `ends[i]`
    ValuePhi { merge: NodeId, values: Vec<NodeId> },
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Start => "Start",
            NodeKind::Begin => "Begin",
            NodeKind::If { .. } => "If",
            NodeKind::Merge { .. } => "Merge",
            NodeKind::End => "End",
            NodeKind::Invoke { .. } => "Invoke",
            NodeKind::InvokeWithException { .. } => "InvokeWithException",
            NodeKind::ExceptionObject => "ExceptionObject",
            NodeKind::ForeignCall { .. } => "ForeignCall",
            NodeKind::Unwind { .. } => "Unwind",
            NodeKind::Return { .. } => "Return",
            NodeKind::Deoptimize { .. } => "Deoptimize",
            NodeKind::Parameter { .. } => "Parameter",
            NodeKind::Constant(_) => "Constant",
            NodeKind::Binary { .. } => "Binary",
            NodeKind::Compare { .. } => "Compare",
            NodeKind::IsNull { .. } => "IsNull",
            NodeKind::MethodCallTarget { .. } => "MethodCallTarget",
            NodeKind::FrameState { .. } => "FrameState",
            NodeKind::ValuePhi { .. } => "ValuePhi",
        }
    }

    pub fn category(&self) -> NodeCategory {
        match self {
            NodeKind::Start
            | NodeKind::Begin
            | NodeKind::If { .. }
            | NodeKind::Merge { .. }
            | NodeKind::End
            | NodeKind::Invoke { .. }
            | NodeKind::InvokeWithException { .. }
            | NodeKind::ExceptionObject
            | NodeKind::ForeignCall { .. }
            | NodeKind::Unwind { .. }
            | NodeKind::Return { .. }
            | NodeKind::Deoptimize { .. } => NodeCategory::Control,
            _ => NodeCategory::Data,
        }
    }

    pub fn is_control(&self) -> bool {
        self.category() == NodeCategory::Control
    }

    /// Control nodes with exactly one `next` successor that the cursor can sit on
    pub fn is_fixed_with_next(&self) -> bool {
        matches!(
            self,
            NodeKind::Start
                | NodeKind::Begin
                | NodeKind::Merge { .. }
                | NodeKind::Invoke { .. }
                | NodeKind::ExceptionObject
                | NodeKind::ForeignCall { .. }
        )
    }

    /// Nodes owning a `next` slot (fixed-with-next plus the normal edge of a raising call)
    pub fn has_next_slot(&self) -> bool {
        self.is_fixed_with_next() || matches!(self, NodeKind::InvokeWithException { .. })
    }

    /// Terminal nodes that end a path without feeding a merge
    pub fn is_control_sink(&self) -> bool {
        matches!(
            self,
            NodeKind::Unwind { .. } | NodeKind::Return { .. } | NodeKind::Deoptimize { .. }
        )
    }

    /// Pure nodes that take part in uniquing
    pub fn is_value_numberable(&self) -> bool {
        matches!(
            self,
            NodeKind::Parameter { .. }
                | NodeKind::Constant(_)
                | NodeKind::Binary { .. }
                | NodeKind::Compare { .. }
                | NodeKind::IsNull { .. }
        )
    }

    /// Value inputs (successor slots are not inputs)
    pub fn inputs(&self) -> Vec<NodeId> {
        match self {
            NodeKind::If { condition, .. } => vec![*condition],
            NodeKind::Invoke { call_target, .. } => vec![*call_target],
            NodeKind::InvokeWithException { call_target, .. } => vec![*call_target],
            NodeKind::ForeignCall { args, .. } => args.clone(),
            NodeKind::Unwind { exception } => vec![*exception],
            NodeKind::Return { result } => result.iter().copied().collect(),
            NodeKind::Binary { x, y, .. } | NodeKind::Compare { x, y, .. } => vec![*x, *y],
            NodeKind::IsNull { value } => vec![*value],
            NodeKind::MethodCallTarget { args, .. } => args.clone(),
            NodeKind::FrameState { locals, stack, .. } => locals
                .iter()
                .flatten()
                .chain(stack.iter())
                .copied()
                .collect(),
            NodeKind::ValuePhi { merge, values } => {
                std::iter::once(*merge).chain(values.iter().copied()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Successor slots fixed at construction time
    pub fn fixed_successors(&self) -> Vec<NodeId> {
        match self {
            NodeKind::If {
                true_successor,
                false_successor,
                ..
            } => vec![*true_successor, *false_successor],
            NodeKind::InvokeWithException { exception_edge, .. } => vec![*exception_edge],
            _ => Vec::new(),
        }
    }
}

/// A node with its links
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) stamp: Stamp,
    pub(crate) next: Option<NodeId>,
    pub(crate) predecessor: Option<NodeId>,
    pub(crate) state_after: Option<NodeId>,
    pub(crate) source_position: Option<SourcePosition>,
}

impl Node {
    pub fn new(kind: NodeKind, stamp: Stamp) -> Self {
        Self {
            kind,
            stamp,
            next: None,
            predecessor: None,
            state_after: None,
            source_position: None,
        }
    }

    pub fn begin() -> Self {
        Self::new(NodeKind::Begin, Stamp::void())
    }

    pub fn if_node(
        condition: NodeId,
        true_successor: NodeId,
        false_successor: NodeId,
        true_probability: f64,
    ) -> Self {
        Self::new(
            NodeKind::If {
                condition,
                true_successor,
                false_successor,
                true_probability,
            },
            Stamp::void(),
        )
    }

    pub fn merge() -> Self {
        Self::new(NodeKind::Merge { ends: Vec::new() }, Stamp::void())
    }

    pub fn end() -> Self {
        Self::new(NodeKind::End, Stamp::void())
    }

    pub fn invoke(call_target: NodeId, return_stamp: Stamp, bci: i32) -> Self {
        Self::new(NodeKind::Invoke { call_target, bci }, return_stamp)
    }

    pub fn invoke_with_exception(
        call_target: NodeId,
        exception_edge: NodeId,
        return_stamp: Stamp,
        bci: i32,
    ) -> Self {
        Self::new(
            NodeKind::InvokeWithException {
                call_target,
                exception_edge,
                bci,
            },
            return_stamp,
        )
    }

    pub fn exception_object() -> Self {
        Self::new(
            NodeKind::ExceptionObject,
            Stamp::object(Some(crate::shared::models::TypeRef::object("Throwable")), true),
        )
    }

    pub fn foreign_call(descriptor: impl Into<Arc<str>>, args: Vec<NodeId>, stamp: Stamp) -> Self {
        Self::new(
            NodeKind::ForeignCall {
                descriptor: descriptor.into(),
                args,
            },
            stamp,
        )
    }

    pub fn unwind(exception: NodeId) -> Self {
        Self::new(NodeKind::Unwind { exception }, Stamp::void())
    }

    pub fn return_value(result: Option<NodeId>) -> Self {
        Self::new(NodeKind::Return { result }, Stamp::void())
    }

    pub fn deoptimize(reason: impl Into<Arc<str>>) -> Self {
        Self::new(
            NodeKind::Deoptimize {
                reason: reason.into(),
            },
            Stamp::void(),
        )
    }

    pub fn parameter(index: u32, stamp: Stamp) -> Self {
        Self::new(NodeKind::Parameter { index }, stamp)
    }

    pub fn constant(value: Constant) -> Self {
        Self::new(NodeKind::Constant(value), value.stamp())
    }

    pub fn binary(op: BinaryOp, x: NodeId, y: NodeId, stamp: Stamp) -> Self {
        Self::new(NodeKind::Binary { op, x, y }, stamp)
    }

    pub fn compare(op: CompareOp, x: NodeId, y: NodeId) -> Self {
        Self::new(NodeKind::Compare { op, x, y }, Stamp::boolean())
    }

    pub fn is_null(value: NodeId) -> Self {
        Self::new(NodeKind::IsNull { value }, Stamp::boolean())
    }

    pub fn method_call_target(
        invoke_kind: InvokeKind,
        target: MethodRef,
        args: Vec<NodeId>,
        return_stamp: Stamp,
    ) -> Self {
        Self::new(
            NodeKind::MethodCallTarget {
                invoke_kind,
                target,
                args,
            },
            return_stamp,
        )
    }

    pub fn frame_state(
        bci: i32,
        locals: Vec<Option<NodeId>>,
        stack: Vec<NodeId>,
        rethrow_exception: bool,
    ) -> Self {
        Self::new(
            NodeKind::FrameState {
                bci,
                locals,
                stack,
                rethrow_exception,
            },
            Stamp::for_kind(ValueKind::Illegal),
        )
    }

    pub fn value_phi(merge: NodeId, values: Vec<NodeId>, stamp: Stamp) -> Self {
        Self::new(NodeKind::ValuePhi { merge, values }, stamp)
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn stamp(&self) -> &Stamp {
        &self.stamp
    }

    pub fn set_stamp(&mut self, stamp: Stamp) {
        self.stamp = stamp;
    }

    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    pub fn predecessor(&self) -> Option<NodeId> {
        self.predecessor
    }

    pub fn state_after(&self) -> Option<NodeId> {
        self.state_after
    }

    pub fn source_position(&self) -> Option<&SourcePosition> {
        self.source_position.as_ref()
    }

    pub fn with_source_position(mut self, position: SourcePosition) -> Self {
        self.source_position = Some(position);
        self
    }

    pub fn is_control(&self) -> bool {
        self.kind.is_control()
    }

    /// All successors: `next` first, then slots fixed by the kind
    pub fn successors(&self) -> Vec<NodeId> {
        self.next
            .into_iter()
            .chain(self.kind.fixed_successors())
            .collect()
    }

    /// Value inputs plus the attached frame state
    pub fn inputs(&self) -> Vec<NodeId> {
        let mut inputs = self.kind.inputs();
        inputs.extend(self.state_after);
        inputs
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Constant(c) => write!(f, "Constant({})", c),
            NodeKind::Parameter { index } => write!(f, "Parameter({})", index),
            NodeKind::ForeignCall { descriptor, .. } => write!(f, "ForeignCall({})", descriptor),
            NodeKind::MethodCallTarget { target, .. } => write!(f, "MethodCallTarget({})", target),
            kind => f.write_str(kind.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert!(Node::begin().is_control());
        assert!(Node::end().is_control());
        assert!(!Node::constant(Constant::Int(1)).is_control());
        assert!(NodeKind::Unwind {
            exception: NodeId::from_index(0)
        }
        .is_control_sink());
        assert!(!NodeKind::End.is_fixed_with_next());
        assert!(!NodeKind::End.is_control_sink());
    }

    #[test]
    fn test_invoke_with_exception_has_next_slot_but_no_cursor() {
        let kind = NodeKind::InvokeWithException {
            call_target: NodeId::from_index(1),
            exception_edge: NodeId::from_index(2),
            bci: 0,
        };
        assert!(kind.has_next_slot());
        assert!(!kind.is_fixed_with_next());
        assert_eq!(kind.fixed_successors(), vec![NodeId::from_index(2)]);
    }

    #[test]
    fn test_frame_state_inputs_skip_empty_locals() {
        let a = NodeId::from_index(3);
        let b = NodeId::from_index(4);
        let node = Node::frame_state(0, vec![Some(a), None], vec![b], false);
        assert_eq!(node.inputs(), vec![a, b]);
    }
}
