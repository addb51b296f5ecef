// src/outline/mutate.rs

//! Persistent updates of outline trees.
//!
//! Replacing a node copies only the nodes on the path to it. Every other
//! node of the result is the same `Arc` as in the input tree, so callers can
//! detect changes with `Arc::ptr_eq`.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{ChildMap, Node, OutlineTree};
use crate::outline::path::{ChildSlot, NodePath};

/// Return a tree where the node at `path` is replaced by `updater(old)`.
pub fn replace_at<F>(tree: &OutlineTree, path: &NodePath, updater: F) -> Result<OutlineTree>
where
    F: FnOnce(&Node) -> Node,
{
    replace_shared_at(tree, path, |node| Arc::new(updater(node)))
}

/// Like [`replace_at`], but the updater may hand back the same `Arc` to
/// signal "unchanged", in which case the whole tree is shared.
pub fn replace_shared_at<F>(tree: &OutlineTree, path: &NodePath, updater: F) -> Result<OutlineTree>
where
    F: FnOnce(&Arc<Node>) -> Arc<Node>,
{
    match path {
        NodePath::CourseInfo => {
            let course_info = updater(&tree.course_info);
            Ok(OutlineTree {
                course_info,
                course_outline: tree.course_outline.clone(),
            })
        }
        NodePath::Outline(ids) => {
            let (id, rest) = ids
                .split_first()
                .ok_or_else(|| AppError::invalid_path("empty outline path"))?;
            let section = tree
                .course_outline
                .get(id)
                .ok_or_else(|| AppError::not_found(path))?;
            let replaced =
                replace_node(section, rest, 1, updater).ok_or_else(|| AppError::not_found(path))?;

            let mut course_outline = tree.course_outline.clone();
            if !Arc::ptr_eq(&replaced, section) {
                // Existing key, so the entry keeps its position.
                course_outline.insert(id.clone(), replaced);
            }
            Ok(OutlineTree {
                course_info: Arc::clone(&tree.course_info),
                course_outline,
            })
        }
    }
}

/// Replace the node at `rest` below `current`, which sits at `depth`.
/// Returns `current` itself when nothing below it changed.
fn replace_node<F>(current: &Arc<Node>, rest: &[String], depth: usize, updater: F) -> Option<Arc<Node>>
where
    F: FnOnce(&Arc<Node>) -> Arc<Node>,
{
    let Some((id, deeper)) = rest.split_first() else {
        return Some(updater(current));
    };

    let slot = ChildSlot::below(depth);
    let child = slot.get(current)?.get(id)?;
    let replaced = replace_node(child, deeper, depth + 1, updater)?;
    if Arc::ptr_eq(&replaced, child) {
        return Some(Arc::clone(current));
    }

    let mut node = Node::clone(current);
    let children: &mut ChildMap = slot.get_mut(&mut node)?;
    children.insert(id.clone(), replaced);
    Some(Arc::new(node))
}
