use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ElementNode;
use crate::error::TreeError;

/// Where [`insert_node`] places a node relative to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertPosition {
    /// Last child of the target.
    #[default]
    Child,
    /// Sibling immediately before the target.
    Before,
    /// Sibling immediately after the target.
    After,
}

/// Pre-order depth-first search; returns the first node whose id matches.
pub fn find_node<'a>(tree: &'a [ElementNode], node_id: &str) -> Option<&'a ElementNode> {
    for node in tree {
        if node.id == node_id {
            return Some(node);
        }
        if let Some(found) = find_node(&node.children, node_id) {
            return Some(found);
        }
    }
    None
}

/// Child-index path from the forest root to the first pre-order match.
pub fn node_path(tree: &[ElementNode], node_id: &str) -> Option<Vec<usize>> {
    for (index, node) in tree.iter().enumerate() {
        if node.id == node_id {
            return Some(vec![index]);
        }
        if let Some(mut rest) = node_path(&node.children, node_id) {
            rest.insert(0, index);
            return Some(rest);
        }
    }
    None
}

pub fn contains_id(tree: &[ElementNode], node_id: &str) -> bool {
    find_node(tree, node_id).is_some()
}

/// Total number of nodes in the forest.
pub fn node_count(tree: &[ElementNode]) -> usize {
    tree.iter()
        .map(|node| 1 + node_count(&node.children))
        .sum()
}

/// Visits every node in pre-order with its depth (roots are depth 0).
pub fn walk<F>(tree: &[ElementNode], visitor: &mut F)
where
    F: FnMut(&ElementNode, usize),
{
    fn inner<F>(nodes: &[ElementNode], depth: usize, visitor: &mut F)
    where
        F: FnMut(&ElementNode, usize),
    {
        for node in nodes {
            visitor(node, depth);
            inner(&node.children, depth + 1, visitor);
        }
    }
    inner(tree, 0, visitor);
}

/// Appends `node` as the last child of the first node whose id is
/// `parent_id`. A missing parent leaves the tree unchanged.
pub fn add_child(tree: &[ElementNode], parent_id: &str, node: ElementNode) -> Vec<ElementNode> {
    try_add_child(tree, parent_id, node).unwrap_or_else(|err| {
        debug!(%err, "add_child ignored");
        tree.to_vec()
    })
}

pub fn try_add_child(
    tree: &[ElementNode],
    parent_id: &str,
    node: ElementNode,
) -> Result<Vec<ElementNode>, TreeError> {
    let mut next = tree.to_vec();
    let parent = find_node_mut(&mut next, parent_id)
        .ok_or_else(|| TreeError::NodeNotFound(parent_id.to_string()))?;
    parent.children.push(node);
    Ok(next)
}

/// Appends `node` as a new top-level sibling.
pub fn add_root(tree: &[ElementNode], node: ElementNode) -> Vec<ElementNode> {
    let mut next = Vec::with_capacity(tree.len() + 1);
    next.extend_from_slice(tree);
    next.push(node);
    next
}

/// Replaces the direct text of the first node matching `node_id`. An empty
/// string clears the text. Children are untouched.
pub fn set_text_content(
    tree: &[ElementNode],
    node_id: &str,
    text: impl Into<String>,
) -> Vec<ElementNode> {
    try_set_text_content(tree, node_id, text).unwrap_or_else(|err| {
        debug!(%err, "set_text_content ignored");
        tree.to_vec()
    })
}

pub fn try_set_text_content(
    tree: &[ElementNode],
    node_id: &str,
    text: impl Into<String>,
) -> Result<Vec<ElementNode>, TreeError> {
    let text: String = text.into();
    let mut next = tree.to_vec();
    let node = find_node_mut(&mut next, node_id)
        .ok_or_else(|| TreeError::NodeNotFound(node_id.to_string()))?;
    node.text_content = (!text.is_empty()).then_some(text);
    Ok(next)
}

/// Inserts `node` relative to `target_id`. Missing targets leave the tree
/// unchanged.
pub fn insert_node(
    tree: &[ElementNode],
    target_id: &str,
    node: ElementNode,
    position: InsertPosition,
) -> Vec<ElementNode> {
    try_insert_node(tree, target_id, node, position).unwrap_or_else(|err| {
        debug!(%err, ?position, "insert_node ignored");
        tree.to_vec()
    })
}

pub fn try_insert_node(
    tree: &[ElementNode],
    target_id: &str,
    node: ElementNode,
    position: InsertPosition,
) -> Result<Vec<ElementNode>, TreeError> {
    if position == InsertPosition::Child {
        return try_add_child(tree, target_id, node);
    }
    let mut next = tree.to_vec();
    let (siblings, index) = sibling_list_mut(&mut next, target_id)
        .ok_or_else(|| TreeError::NodeNotFound(target_id.to_string()))?;
    let at = match position {
        InsertPosition::Before => index,
        _ => index + 1,
    };
    siblings.insert(at, node);
    Ok(next)
}

/// Removes the first node matching `node_id` together with its subtree.
pub fn remove_node(tree: &[ElementNode], node_id: &str) -> Vec<ElementNode> {
    try_remove_node(tree, node_id)
        .map(|(next, _)| next)
        .unwrap_or_else(|err| {
            debug!(%err, "remove_node ignored");
            tree.to_vec()
        })
}

/// Like [`remove_node`] but also hands back the detached subtree.
pub fn try_remove_node(
    tree: &[ElementNode],
    node_id: &str,
) -> Result<(Vec<ElementNode>, ElementNode), TreeError> {
    let mut next = tree.to_vec();
    let (siblings, index) = sibling_list_mut(&mut next, node_id)
        .ok_or_else(|| TreeError::NodeNotFound(node_id.to_string()))?;
    let removed = siblings.remove(index);
    Ok((next, removed))
}

fn find_node_mut<'a>(tree: &'a mut [ElementNode], node_id: &str) -> Option<&'a mut ElementNode> {
    let path = node_path(tree, node_id)?;
    let (first, rest) = path.split_first()?;
    let mut node = &mut tree[*first];
    for &index in rest {
        node = &mut node.children[index];
    }
    Some(node)
}

/// Resolves the sibling vector holding the first match and its index there.
fn sibling_list_mut<'a>(
    tree: &'a mut Vec<ElementNode>,
    node_id: &str,
) -> Option<(&'a mut Vec<ElementNode>, usize)> {
    let path = node_path(tree, node_id)?;
    let (last, parents) = path.split_last()?;
    let mut list = tree;
    for &index in parents {
        list = &mut list[index].children;
    }
    Some((list, *last))
}
