//! Outline tree logic.
//!
//! - `path`: addressing a node from section/subsection/unit/content ids
//! - `mutate`: persistent, structurally shared node replacement
//! - `approval`: collecting eligible nodes and folding approval results back
//! - `versions`: version choices, preview, revert and apply
//! - `expansion`: lazy unit loading and expand/collapse state

pub mod approval;
pub mod expansion;
pub mod mutate;
pub mod path;
pub mod versions;

pub use approval::{apply_approval_result, approve_in_tree, collect_eligible, plan_approval};
pub use expansion::{
    ExpandAction, ExpansionTracker, LoadState, Visibility, merge_unit_components, needs_fetch,
    unit_paths,
};
pub use mutate::{replace_at, replace_shared_at};
pub use path::NodePath;
pub use versions::{
    PENDING_VERSION, VersionChoices, VersionSelection, apply_enabled, commit_applied,
    latest_version, pending_selectable, preview_version, revert_preview, version_choices,
};
