use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TreeError;
use crate::tree::{self, ElementNode, InsertPosition, NodeId};

/// One structural edit.
///
/// External JSON uses an `op` tag in snake_case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TreeOp {
    /// Insert `node` relative to `target`; `position` defaults to `child`.
    Insert {
        target: NodeId,
        node: ElementNode,
        #[serde(default)]
        position: InsertPosition,
    },
    /// Append a new top-level node.
    AddRoot { node: ElementNode },
    /// Replace direct text; an empty string clears it.
    SetText { node_id: NodeId, text: String },
    Remove { node_id: NodeId },
}

/// Applies one op, failing when its target is missing.
pub fn apply_op(tree: &[ElementNode], op: TreeOp) -> Result<Vec<ElementNode>, TreeError> {
    match op {
        TreeOp::Insert {
            target,
            node,
            position,
        } => tree::try_insert_node(tree, &target, node, position),
        TreeOp::AddRoot { node } => Ok(tree::add_root(tree, node)),
        TreeOp::SetText { node_id, text } => tree::try_set_text_content(tree, &node_id, text),
        TreeOp::Remove { node_id } => tree::try_remove_node(tree, &node_id).map(|(next, _)| next),
    }
}

/// Applies ops in order. Ops whose target is missing are skipped; the count
/// of applied ops is returned with the new forest.
pub fn apply_ops(tree: &[ElementNode], ops: Vec<TreeOp>) -> (Vec<ElementNode>, usize) {
    let mut current = tree.to_vec();
    let mut applied = 0usize;
    for op in ops {
        match apply_op(&current, op) {
            Ok(next) => {
                current = next;
                applied += 1;
            }
            Err(err) => debug!(%err, "tree op skipped"),
        }
    }
    (current, applied)
}
