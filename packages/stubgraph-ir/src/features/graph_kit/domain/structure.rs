/*
 * Structure Stack
 *
 * Open structured-control contexts of a kit, innermost last:
 * - Branch:        CONDITION -> THEN -> ELSE -> CLOSED
 * - WithException: START -> NORMAL_EDGE -> EXCEPTION_EDGE -> CLOSED
 *
 * The bottom frame is a `Root` sentinel that is never popped, so "top of
 * stack" is always defined. Frames close in strict LIFO order.
 *
 * Each context keeps one saved cursor per arm. Before the arm is entered the
 * slot holds the arm's placeholder (a `Begin` or the `ExceptionObject`);
 * after the arm is left it holds the arm's last fixed node, or `None` when
 * the arm ended in a control sink.
 */

use std::fmt;

use crate::errors::{GraphKitError, Result};
use crate::shared::models::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchState {
    Condition,
    Then,
    Else,
    Closed,
}

impl fmt::Display for BranchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BranchState::Condition => "CONDITION",
            BranchState::Then => "THEN",
            BranchState::Else => "ELSE",
            BranchState::Closed => "CLOSED",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionEdgeState {
    Start,
    NormalEdge,
    ExceptionEdge,
    Closed,
}

impl fmt::Display for ExceptionEdgeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExceptionEdgeState::Start => "START",
            ExceptionEdgeState::NormalEdge => "NORMAL_EDGE",
            ExceptionEdgeState::ExceptionEdge => "EXCEPTION_EDGE",
            ExceptionEdgeState::Closed => "CLOSED",
        })
    }
}

/// Open conditional branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchStructure {
    pub split: NodeId,
    pub state: BranchState,
    pub then_part: Option<NodeId>,
    pub else_part: Option<NodeId>,
}

impl BranchStructure {
    pub fn new(split: NodeId, then_begin: NodeId, else_begin: NodeId) -> Self {
        Self {
            split,
            state: BranchState::Condition,
            then_part: Some(then_begin),
            else_part: Some(else_begin),
        }
    }

    /// Store the cursor of the arm being left
    pub fn save(&mut self, cursor: Option<NodeId>) {
        match self.state {
            BranchState::Then => self.then_part = cursor,
            BranchState::Else => self.else_part = cursor,
            BranchState::Condition | BranchState::Closed => {}
        }
    }
}

/// Open exception edge around a raising node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithExceptionStructure {
    pub with_exception: NodeId,
    pub state: ExceptionEdgeState,
    pub exception_object: NodeId,
    pub no_exception_edge: Option<NodeId>,
    pub exception_edge: Option<NodeId>,
}

impl WithExceptionStructure {
    pub fn new(with_exception: NodeId, normal_begin: NodeId, exception_object: NodeId) -> Self {
        Self {
            with_exception,
            state: ExceptionEdgeState::Start,
            exception_object,
            no_exception_edge: Some(normal_begin),
            exception_edge: Some(exception_object),
        }
    }

    pub fn save(&mut self, cursor: Option<NodeId>) {
        match self.state {
            ExceptionEdgeState::NormalEdge => self.no_exception_edge = cursor,
            ExceptionEdgeState::ExceptionEdge => self.exception_edge = cursor,
            ExceptionEdgeState::Start | ExceptionEdgeState::Closed => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Structure {
    Root,
    Branch(BranchStructure),
    WithException(WithExceptionStructure),
}

impl Structure {
    pub fn name(&self) -> &'static str {
        match self {
            Structure::Root => "root",
            Structure::Branch(_) => "branch",
            Structure::WithException(_) => "exception edge",
        }
    }
}

/// Stack of open contexts over a `Root` sentinel
#[derive(Debug, Clone)]
pub struct StructureStack {
    frames: Vec<Structure>,
    max_depth: usize,
}

impl StructureStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            frames: vec![Structure::Root],
            max_depth,
        }
    }

    /// Number of open contexts, not counting the sentinel
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn top(&self) -> &Structure {
        &self.frames[self.frames.len() - 1]
    }

    pub fn ensure_capacity(&self, graph: &str) -> Result<()> {
        if self.depth() >= self.max_depth {
            return Err(GraphKitError::structure_state(
                graph,
                format!("structured contexts nested deeper than {}", self.max_depth),
            ));
        }
        Ok(())
    }

    pub fn push(&mut self, graph: &str, structure: Structure) -> Result<()> {
        self.ensure_capacity(graph)?;
        self.frames.push(structure);
        Ok(())
    }

    /// Pop the top context; the sentinel stays
    pub fn pop(&mut self, graph: &str) -> Result<Structure> {
        if self.frames.len() == 1 {
            return Err(GraphKitError::structure_state(graph, "no open structured context"));
        }
        self.frames
            .pop()
            .ok_or_else(|| GraphKitError::structure_state(graph, "structure stack is empty"))
    }

    pub fn top_branch_mut(&mut self, graph: &str, operation: &str) -> Result<&mut BranchStructure> {
        match self.frames.last_mut() {
            Some(Structure::Branch(s)) => Ok(s),
            Some(other) => Err(GraphKitError::structure_state(
                graph,
                format!("{} expects a branch on top, found {}", operation, other.name()),
            )),
            None => Err(GraphKitError::structure_state(graph, "structure stack is empty")),
        }
    }

    pub fn top_exception_edge_mut(
        &mut self,
        graph: &str,
        operation: &str,
    ) -> Result<&mut WithExceptionStructure> {
        match self.frames.last_mut() {
            Some(Structure::WithException(s)) => Ok(s),
            Some(other) => Err(GraphKitError::structure_state(
                graph,
                format!("{} expects an exception edge on top, found {}", operation, other.name()),
            )),
            None => Err(GraphKitError::structure_state(graph, "structure stack is empty")),
        }
    }
}
