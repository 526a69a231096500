//! Structured conditional branch
//!
//! ```rust,ignore
//! kit.start_branch(cond, 0.5)?;
//! kit.then_part()?;
//! // ... then arm
//! kit.else_part()?;
//! // ... else arm
//! let merge = kit.end_branch()?;
//! ```

use tracing::debug;

use super::kit::GraphKit;
use crate::errors::{GraphKitError, Result};
use crate::features::graph_kit::domain::{BranchState, BranchStructure, Structure};
use crate::features::graph_store::domain::Node;
use crate::shared::models::NodeId;

impl GraphKit {
    /// Emit an `If` on `condition` and open a branch context. The cursor
    /// becomes absent until an arm is entered.
    pub fn start_branch(&mut self, condition: NodeId, true_probability: f64) -> Result<NodeId> {
        self.structures.ensure_capacity(self.graph.name())?;
        let then_begin = self.graph.add(Node::begin())?;
        let else_begin = self.graph.add(Node::begin())?;
        let split = self.append(Node::if_node(
            condition,
            then_begin,
            else_begin,
            true_probability,
        ))?;
        self.last_fixed = None;

        self.structures.push(
            self.graph.name(),
            Structure::Branch(BranchStructure::new(split, then_begin, else_begin)),
        )?;
        debug!(graph = %self.graph.name(), %split, depth = self.structures.depth(), "branch opened");
        Ok(split)
    }

    /// Enter the then arm
    pub fn then_part(&mut self) -> Result<()> {
        let s = self.save_branch_cursor("thenPart", &[BranchState::Condition])?;
        s.state = BranchState::Then;
        let cursor = s.then_part;
        self.last_fixed = cursor;
        Ok(())
    }

    /// Leave the then arm (if entered) and enter the else arm
    pub fn else_part(&mut self) -> Result<()> {
        let s = self.save_branch_cursor("elsePart", &[BranchState::Condition, BranchState::Then])?;
        s.state = BranchState::Else;
        let cursor = s.else_part;
        self.last_fixed = cursor;
        Ok(())
    }

    /// Close the branch and join its arms.
    ///
    /// Returns the merge, or `None` when at most one arm is still live.
    pub fn end_branch(&mut self) -> Result<Option<NodeId>> {
        let s = self.save_branch_cursor("endBranch", &[BranchState::Then, BranchState::Else])?;
        s.state = BranchState::Closed;
        let (split, then_part, else_part) = (s.split, s.then_part, s.else_part);
        self.structures.pop(self.graph.name())?;

        let merge = self.merge_control_split_branches(then_part, else_part)?;
        debug!(
            graph = %self.graph.name(),
            %split,
            merge = ?merge,
            cursor = ?self.last_fixed,
            "branch closed"
        );
        Ok(merge)
    }

    /// Store the cursor into the arm being left and clear it
    fn save_branch_cursor(
        &mut self,
        operation: &str,
        allowed: &[BranchState],
    ) -> Result<&mut BranchStructure> {
        let cursor = self.last_fixed;
        let s = self
            .structures
            .top_branch_mut(self.graph.name(), operation)?;
        if !allowed.contains(&s.state) {
            return Err(GraphKitError::structure_state(
                self.graph.name(),
                format!("{} in state {}", operation, s.state),
            ));
        }
        if s.state == BranchState::Condition && cursor.is_some() {
            return Err(GraphKitError::structure_state(
                self.graph.name(),
                format!("{}: control emitted before entering an arm", operation),
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
    use crate::features::graph_store::domain::{Constant, NodeKind};
    use crate::shared::models::{MethodRef, TypeRef};
    use std::sync::Arc;

    fn kit() -> GraphKit {
        let stub = MethodRef::new_static(TypeRef::object("Stubs"), "stub", vec![], TypeRef::void());
        GraphKit::new(stub, Providers::new(Arc::new(MetaAccess::new())), KitConfig::default())
            .unwrap()
    }

    #[test]
    fn test_empty_arms_fall_through_to_merge() {
        let mut kit = kit();
        let cond = kit.constant(Constant::Boolean(true)).unwrap();
        kit.start_branch(cond, 0.5).unwrap();
        assert_eq!(kit.last_fixed(), None);
        kit.then_part().unwrap();
        let merge = kit.end_branch().unwrap().unwrap();
        assert_eq!(kit.last_fixed(), Some(merge));
        assert_eq!(kit.graph().merge_ends(merge).unwrap().len(), 2);
    }

    #[test]
    fn test_then_part_twice_rejected() {
        let mut kit = kit();
        let cond = kit.constant(Constant::Boolean(true)).unwrap();
        kit.start_branch(cond, 0.5).unwrap();
        kit.then_part().unwrap();
        let err = kit.then_part().unwrap_err();
        assert!(err.to_string().contains("thenPart in state THEN"));
    }

    #[test]
    fn test_end_branch_without_arm_rejected() {
        let mut kit = kit();
        let cond = kit.constant(Constant::Boolean(true)).unwrap();
        kit.start_branch(cond, 0.5).unwrap();
        let err = kit.end_branch().unwrap_err();
        assert!(matches!(err, GraphKitError::StructureState { .. }));
    }

    #[test]
    fn test_branch_op_without_branch_rejected() {
        let mut kit = kit();
        assert!(kit.else_part().is_err());
        assert!(kit.end_branch().is_err());
    }

    #[test]
    fn test_else_only_keeps_then_placeholder() {
        let mut kit = kit();
        let cond = kit.constant(Constant::Boolean(false)).unwrap();
        let split = kit.start_branch(cond, 0.1).unwrap();
        kit.else_part().unwrap();
        kit.append(Node::deoptimize("slow path")).unwrap();
        assert_eq!(kit.end_branch().unwrap(), None);

        let then_begin = match kit.graph().kind(split).unwrap() {
            NodeKind::If { true_successor, .. } => *true_successor,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(kit.last_fixed(), Some(then_begin));
    }

    #[test]
    fn test_rejected_branch_operation_keeps_cursor() {
        let mut kit = kit();
        let begin = kit.append(Node::begin()).unwrap();
        assert!(kit.then_part().is_err());
        assert!(kit.end_branch().is_err());
        assert_eq!(kit.last_fixed(), Some(begin));

        let cond = kit.constant(Constant::Boolean(true)).unwrap();
        kit.start_branch(cond, 0.5).unwrap();
        kit.then_part().unwrap();
        let inner = kit.append(Node::begin()).unwrap();
        assert!(kit.then_part().is_err());
        assert_eq!(kit.last_fixed(), Some(inner));
    }
}
