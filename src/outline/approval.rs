// src/outline/approval.rs

//! Recursive bulk approval of an outline sub-tree.
//!
//! Approval is a two-step exchange: collect the usage keys of every eligible
//! node below a target, send them in one request, then fold the returned
//! per-block results back into the same sub-tree.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{ApprovalEntry, ApprovalPatch, ChildMap, Node, OutlineTree, Version};
use crate::outline::mutate::replace_shared_at;
use crate::outline::path::NodePath;

/// Usage keys of approval-eligible nodes, in pre-order and server order.
pub fn collect_eligible(node: &Node) -> Vec<String> {
    fn collect(node: &Node, keys: &mut Vec<String>) {
        if node.is_approval_eligible() {
            keys.push(node.usage_key.clone());
        }
        for child in node.child_nodes() {
            collect(child, keys);
        }
    }

    let mut keys = Vec::new();
    collect(node, &mut keys);
    keys
}

/// Block ids to send for approving the sub-tree at `path`.
///
/// Fails with `EmptyApprovalSet` when nothing below `path` is eligible, in
/// which case no request must be made.
pub fn plan_approval(tree: &OutlineTree, path: &NodePath) -> Result<Vec<String>> {
    let node = path.require(tree)?;
    let block_ids = collect_eligible(node);
    if block_ids.is_empty() {
        return Err(AppError::EmptyApprovalSet(path.to_string()));
    }
    Ok(block_ids)
}

/// Fold an approval response into a sub-tree.
///
/// Nodes whose key is absent from `patch` are left as they are, and so is
/// every sub-tree without a patched node: those come back as the same `Arc`.
pub fn apply_approval_result(node: &Arc<Node>, patch: &ApprovalPatch) -> Arc<Node> {
    if patch.is_empty() {
        return Arc::clone(node);
    }

    let entry = patch.get(&node.usage_key);
    let children = node.children.as_ref().and_then(|map| apply_to_map(map, patch));
    let units = node.units.as_ref().and_then(|map| apply_to_map(map, patch));

    if entry.is_none() && children.is_none() && units.is_none() {
        return Arc::clone(node);
    }

    let mut updated = Node::clone(node);
    if let Some(entry) = entry {
        record_approval(&mut updated, entry);
    }
    if children.is_some() {
        updated.children = children;
    }
    if units.is_some() {
        updated.units = units;
    }
    Arc::new(updated)
}

/// Apply an approval response to the sub-tree at `path`.
pub fn approve_in_tree(
    tree: &OutlineTree,
    path: &NodePath,
    patch: &ApprovalPatch,
) -> Result<OutlineTree> {
    replace_shared_at(tree, path, |node| apply_approval_result(node, patch))
}

/// Rebuilt map when any entry changed, `None` otherwise.
fn apply_to_map(map: &ChildMap, patch: &ApprovalPatch) -> Option<ChildMap> {
    let mut changed = false;
    let rebuilt: ChildMap = map
        .iter()
        .map(|(id, child)| {
            let updated = apply_approval_result(child, patch);
            changed |= !Arc::ptr_eq(&updated, child);
            (id.clone(), updated)
        })
        .collect();
    changed.then_some(rebuilt)
}

fn record_approval(node: &mut Node, entry: &ApprovalEntry) {
    let status = node.status.get_or_insert_with(Default::default);
    status.approved = entry.approved;
    status.applied = entry.applied_translation;

    let version_status = node.version_status.get_or_insert_with(Default::default);
    version_status.applied = entry.applied_translation;
    version_status.applied_version = entry.applied_version;

    if let Some(id) = entry.applied_version {
        // One entry per version id, even if the same response is applied twice.
        if !version_status.contains(id) {
            version_status.versions.push(Version {
                id,
                date: entry.applied_version_date.clone(),
            });
        }
        version_status.latest_version = version_status.versions.last().map(|v| v.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Status, VersionStatus};
    use crate::testing::{eligible_status, node_with, sample_tree};
    use indexmap::IndexMap;

    fn approved_entry(version: i64, date: &str) -> ApprovalEntry {
        ApprovalEntry {
            approved: true,
            applied_translation: true,
            applied_version: Some(version),
            applied_version_date: Some(date.to_string()),
        }
    }

    /// Section -> Subsection -> Unit -> Content with only the content eligible.
    fn single_chain() -> Arc<Node> {
        let blocked = Status {
            destination_flag: false,
            ..eligible_status()
        };
        let content = node_with("content-key", "html", Some(eligible_status()), None, None);
        let unit = node_with(
            "unit-key",
            "vertical",
            Some(blocked.clone()),
            None,
            Some(IndexMap::from([("C".to_string(), content)])),
        );
        let subsection = node_with(
            "subsection-key",
            "sequential",
            Some(blocked.clone()),
            Some(IndexMap::from([("U".to_string(), unit)])),
            None,
        );
        Arc::new(node_with(
            "section-key",
            "chapter",
            Some(blocked),
            Some(IndexMap::from([("Q".to_string(), subsection)])),
            None,
        ))
    }

    #[test]
    fn test_collect_single_content_node() {
        let section = single_chain();
        assert_eq!(collect_eligible(&section), vec!["content-key"]);
    }

    #[test]
    fn test_apply_single_content_node() {
        let section = single_chain();
        let patch = ApprovalPatch::from([(
            "content-key".to_string(),
            approved_entry(7, "2024-01-01"),
        )]);

        let updated = apply_approval_result(&section, &patch);
        let content = &updated.children.as_ref().unwrap()["Q"].children.as_ref().unwrap()["U"]
            .units
            .as_ref()
            .unwrap()["C"];

        assert!(content.status.as_ref().unwrap().approved);
        let versions = &content.version_status.as_ref().unwrap().versions;
        assert!(versions.contains(&Version::new(7, "2024-01-01")));
        assert!(collect_eligible(&updated).is_empty());
    }

    #[test]
    fn test_collect_is_preorder_in_server_order() {
        let tree = sample_tree();
        let section = &tree.course_outline["S1"];
        assert_eq!(
            collect_eligible(section),
            vec!["r-chapter-1", "r-vert-1", "r-html-1", "r-vert-2"]
        );
    }

    #[test]
    fn test_destination_flag_excludes_node() {
        let status = Status {
            destination_flag: false,
            ..eligible_status()
        };
        let node = Arc::new(node_with("k", "html", Some(status), None, None));
        assert!(collect_eligible(&node).is_empty());
    }

    #[test]
    fn test_plan_approval_empty_set() {
        let tree = sample_tree();
        let result = plan_approval(&tree, &NodePath::section("S2"));
        assert!(matches!(result, Err(AppError::EmptyApprovalSet(_))));
    }

    #[test]
    fn test_empty_patch_changes_nothing() {
        let tree = sample_tree();
        let section = &tree.course_outline["S1"];
        let updated = apply_approval_result(section, &ApprovalPatch::new());
        assert!(Arc::ptr_eq(section, &updated));
    }

    #[test]
    fn test_unrelated_keys_leave_subtree_shared() {
        let tree = sample_tree();
        let section = &tree.course_outline["S1"];
        let patch = ApprovalPatch::from([("not-in-tree".to_string(), approved_entry(1, "x"))]);
        let updated = apply_approval_result(section, &patch);
        assert!(Arc::ptr_eq(section, &updated));
    }

    #[test]
    fn test_apply_twice_is_idempotent() {
        let tree = sample_tree();
        let path = NodePath::section("S1");
        let patch = ApprovalPatch::from([
            ("r-html-1".to_string(), approved_entry(11, "Jun 10, 2022")),
            ("r-vert-2".to_string(), approved_entry(12, "Jun 10, 2022")),
        ]);

        let once = approve_in_tree(&tree, &path, &patch).unwrap();
        let twice = approve_in_tree(&once, &path, &patch).unwrap();
        assert_eq!(once, twice);

        let content: NodePath = "S1/Q1/U1/C1".parse().unwrap();
        let versions = &content.resolve(&twice).unwrap().version_status.as_ref().unwrap().versions;
        assert_eq!(versions.iter().filter(|v| v.id == 11).count(), 1);
    }

    #[test]
    fn test_partial_patch_only_touches_listed_nodes() {
        let tree = sample_tree();
        let path = NodePath::section("S1");
        let patch = ApprovalPatch::from([("r-vert-2".to_string(), approved_entry(3, "d"))]);

        let updated = approve_in_tree(&tree, &path, &patch).unwrap();

        let approved: NodePath = "S1/Q1/U2".parse().unwrap();
        let untouched: NodePath = "S1/Q1/U1".parse().unwrap();
        assert!(approved.resolve(&updated).unwrap().is_approved());
        assert!(Arc::ptr_eq(
            untouched.resolve(&tree).unwrap(),
            untouched.resolve(&updated).unwrap()
        ));
        assert!(!NodePath::section("S1").resolve(&updated).unwrap().is_approved());
    }

    #[test]
    fn test_record_sets_applied_version() {
        let mut node = node_with("k", "html", Some(eligible_status()), None, None);
        node.version_status = Some(VersionStatus {
            applied: false,
            applied_version: None,
            latest_version: Some(4),
            versions: vec![Version::new(4, "a")],
        });

        record_approval(&mut node, &approved_entry(9, "b"));

        let vs = node.version_status.as_ref().unwrap();
        assert!(vs.applied);
        assert_eq!(vs.applied_version, Some(9));
        assert_eq!(vs.latest_version, Some(9));
        assert!(vs.is_consistent());
        assert!(node.status.as_ref().unwrap().applied);
    }
}
