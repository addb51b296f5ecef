// src/outline/versions.rs

//! Version history view of a node.
//!
//! Reviewers can preview any historical version of a block, revert to the
//! pending (not yet versioned) translation, and apply a previewed version to
//! the live block.

use serde_json::Value;

use crate::models::{AppliedVersion, Node, Version, VersionId};

/// Selector value for the pending translation, which has no version id.
pub const PENDING_VERSION: VersionId = -1;

/// Version selected for a node and whether applying it is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionSelection {
    pub version: VersionId,
    pub apply_enabled: bool,
}

impl VersionSelection {
    pub fn pending() -> Self {
        Self {
            version: PENDING_VERSION,
            apply_enabled: false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.version == PENDING_VERSION
    }
}

/// Versions grouped for presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionChoices {
    /// The pending translation, offered while the node is unapproved
    pub recent: Option<Version>,
    /// The version applied to the live block
    pub applied: Option<Version>,
    /// Everything else, most recent first
    pub other: Vec<Version>,
}

impl VersionChoices {
    /// All choices in presentation order.
    pub fn iter(&self) -> impl Iterator<Item = &Version> {
        self.recent
            .iter()
            .chain(self.applied.iter())
            .chain(self.other.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_none() && self.applied.is_none() && self.other.is_empty()
    }
}

/// The pending translation can be selected while the node is unapproved.
pub fn pending_selectable(node: &Node) -> bool {
    node.status.as_ref().is_some_and(|s| !s.approved)
}

/// Most recent server-side version.
pub fn latest_version(node: &Node) -> Option<&Version> {
    node.version_status.as_ref()?.versions.last()
}

/// Applying `selected` would change the live block.
pub fn apply_enabled(node: &Node, selected: VersionId) -> bool {
    if selected == PENDING_VERSION {
        return false;
    }
    match &node.version_status {
        Some(vs) => vs.applied_version != Some(selected) || !vs.applied,
        None => true,
    }
}

/// Group a node's versions into recent / applied / other.
pub fn version_choices(node: &Node) -> VersionChoices {
    let mut choices = VersionChoices::default();
    if pending_selectable(node) {
        choices.recent = Some(Version {
            id: PENDING_VERSION,
            date: None,
        });
    }

    let Some(vs) = &node.version_status else {
        return choices;
    };

    let applied_id = vs.applied.then_some(vs.applied_version).flatten();
    for version in vs.versions.iter().rev() {
        if Some(version.id) == applied_id && choices.applied.is_none() {
            choices.applied = Some(version.clone());
        } else {
            choices.other.push(version.clone());
        }
    }
    choices
}

/// Show a fetched version's payload, keeping the current data for revert.
pub fn preview_version(node: &Node, payload: Value) -> Node {
    let mut node = node.clone();
    if node.previous_state.is_none() {
        node.previous_state = Some(std::mem::replace(&mut node.data, payload));
    } else {
        node.data = payload;
    }
    node
}

/// Restore the data saved before the preview. No-op without a preview.
pub fn revert_preview(node: &Node) -> Node {
    let mut node = node.clone();
    if let Some(previous) = node.previous_state.take() {
        node.data = previous;
    }
    node
}

/// Record an applied version; the previewed data becomes permanent.
pub fn commit_applied(node: &Node, applied: &AppliedVersion) -> Node {
    let mut node = node.clone();
    node.previous_state = None;

    if let Some(status) = node.status.as_mut() {
        status.applied = applied.applied_translation;
    }
    let vs = node.version_status.get_or_insert_with(Default::default);
    vs.applied = applied.applied_translation;
    vs.applied_version = applied.applied_version;
    node
}
