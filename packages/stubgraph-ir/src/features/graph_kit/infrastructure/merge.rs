//! Join of two structured-context arms

use tracing::debug;

use super::kit::GraphKit;
use crate::errors::Result;
use crate::features::graph_store::domain::Node;
use crate::shared::models::NodeId;

impl GraphKit {
    /// Join the arm results `first` and `second` (`None` = the arm ended in a sink).
    ///
    /// Both live: a `Merge` is created with one `End` per arm, in the order
    /// `[first, second]`, and the cursor moves to it. One live: no merge; the
    /// cursor continues on that arm. None live: the cursor stays absent.
    pub(super) fn merge_control_split_branches(
        &mut self,
        first: Option<NodeId>,
        second: Option<NodeId>,
    ) -> Result<Option<NodeId>> {
        match (first, second) {
            (Some(x), Some(y)) => {
                let x_end = self.graph.add(Node::end())?;
                self.graph.add_after_fixed(x, x_end)?;
                let y_end = self.graph.add(Node::end())?;
                self.graph.add_after_fixed(y, y_end)?;

                let merge = self.graph.add(Node::merge())?;
                self.graph.add_forward_end(merge, x_end)?;
                self.graph.add_forward_end(merge, y_end)?;

                debug!(graph = %self.graph.name(), %merge, ends = ?[x_end, y_end], "merge created");
                self.last_fixed = Some(merge);
                Ok(Some(merge))
            }
            (Some(live), None) | (None, Some(live)) => {
                self.last_fixed = Some(live);
                Ok(None)
            }
            (None, None) => {
                self.last_fixed = None;
                Ok(None)
            }
        }
    }
}
