// src/outline/expansion.rs

//! Lazy expansion of outline nodes.
//!
//! Each expandable node has two independent pieces of state: whether its
//! content has been fetched, and whether it is currently shown expanded.
//! Only the first expansion of an unfetched unit triggers a request;
//! collapsing and re-expanding afterwards is purely local.

use std::collections::HashMap;

use crate::error::{AppError, Result};
use crate::models::{Node, Outline, OutlineTree, UnitComponents};
use crate::outline::approval::collect_eligible;
use crate::outline::mutate::replace_at;
use crate::outline::path::NodePath;

/// Data availability of a node's children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    NotFetched,
    Fetching,
    Fetched,
}

/// Whether a node is shown expanded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Collapsed,
    Expanded,
}

impl Visibility {
    pub fn toggled(self) -> Self {
        match self {
            Visibility::Collapsed => Visibility::Expanded,
            Visibility::Expanded => Visibility::Collapsed,
        }
    }

    pub fn is_expanded(self) -> bool {
        self == Visibility::Expanded
    }
}

/// What the caller must do after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandAction {
    /// Visibility changed locally, nothing to request
    None,
    /// First expansion of an unfetched unit: request its content
    Fetch,
}

#[derive(Debug, Clone, Copy, Default)]
struct NodeView {
    load: LoadState,
    /// `None` follows the last expand/collapse-all trigger
    visibility: Option<Visibility>,
}

/// Per-path load and visibility state for one outline.
#[derive(Debug, Clone, Default)]
pub struct ExpansionTracker {
    nodes: HashMap<NodePath, NodeView>,
    global_toggles: u64,
}

impl ExpansionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visibility implied by the expand/collapse-all trigger parity.
    fn global_visibility(&self) -> Visibility {
        if self.global_toggles % 2 == 1 {
            Visibility::Expanded
        } else {
            Visibility::Collapsed
        }
    }

    pub fn visibility(&self, path: &NodePath) -> Visibility {
        self.nodes
            .get(path)
            .and_then(|view| view.visibility)
            .unwrap_or_else(|| self.global_visibility())
    }

    pub fn is_expanded(&self, path: &NodePath) -> bool {
        self.visibility(path).is_expanded()
    }

    pub fn load_state(&self, path: &NodePath) -> LoadState {
        self.nodes.get(path).map(|view| view.load).unwrap_or_default()
    }

    /// Flip visibility of `path`. Returns `Fetch` only when the node becomes
    /// expanded, `needs_fetch` holds, and no fetch has been started yet.
    pub fn toggle(&mut self, path: &NodePath, needs_fetch: bool) -> ExpandAction {
        let global = self.global_visibility();
        let view = self.nodes.entry(path.clone()).or_default();
        let next = view.visibility.unwrap_or(global).toggled();
        view.visibility = Some(next);

        if next.is_expanded() && needs_fetch && view.load == LoadState::NotFetched {
            view.load = LoadState::Fetching;
            ExpandAction::Fetch
        } else {
            ExpandAction::None
        }
    }

    /// Settle a fetch started by [`ExpansionTracker::toggle`]. A failed
    /// fetch goes back to `NotFetched` so the next expansion retries.
    pub fn finish_fetch(&mut self, path: &NodePath, success: bool) {
        let view = self.nodes.entry(path.clone()).or_default();
        view.load = if success {
            LoadState::Fetched
        } else {
            LoadState::NotFetched
        };
    }

    /// Start a fetch without touching visibility, e.g. for bulk loading.
    /// Returns false when the node is already fetching or fetched.
    pub fn begin_fetch(&mut self, path: &NodePath) -> bool {
        let view = self.nodes.entry(path.clone()).or_default();
        if view.load != LoadState::NotFetched {
            return false;
        }
        view.load = LoadState::Fetching;
        true
    }

    /// External expand/collapse-all trigger. Every node follows the new
    /// parity; load state is untouched. Returns the resulting visibility.
    pub fn toggle_all(&mut self) -> Visibility {
        self.global_toggles += 1;
        for view in self.nodes.values_mut() {
            view.visibility = None;
        }
        self.global_visibility()
    }

    /// Forget everything, for a newly loaded outline.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.global_toggles = 0;
    }
}

/// Unit content has to be fetched before the node can show children.
pub fn needs_fetch(path: &NodePath, node: &Node) -> bool {
    path.is_unit() && node.units.is_none()
}

/// Paths of every unit at or below `under`, in outline order. The course
/// node stands for the whole outline.
pub fn unit_paths(tree: &OutlineTree, under: &NodePath) -> Result<Vec<NodePath>> {
    fn descend(node: &Node, path: NodePath, paths: &mut Vec<NodePath>) -> Result<()> {
        if path.is_unit() {
            paths.push(path);
            return Ok(());
        }
        for (id, child) in node.children.iter().flatten() {
            descend(child, path.child(id.as_str())?, paths)?;
        }
        Ok(())
    }

    let mut paths = Vec::new();
    if under.is_course_info() {
        for (id, section) in &tree.course_outline {
            descend(section, NodePath::section(id.as_str()), &mut paths)?;
        }
    } else {
        descend(under.require(tree)?, under.clone(), &mut paths)?;
    }
    Ok(paths)
}

/// Install freshly fetched unit content on both sides of the pairing.
///
/// Returns the new outline and whether any fetched rerun-side content node
/// is approval-eligible. Only the fetched content is inspected.
pub fn merge_unit_components(
    outline: &Outline,
    path: &NodePath,
    components: UnitComponents,
) -> Result<(Outline, bool)> {
    if !path.is_unit() {
        return Err(AppError::invalid_path(format!("{path} is not a unit")));
    }

    let rerun_units = components.components_data.unwrap_or_default();
    let base_units = components.base_components_data.unwrap_or_default();
    let has_eligible = rerun_units
        .values()
        .any(|content| !collect_eligible(content).is_empty());

    let rerun = replace_at(&outline.rerun, path, |unit| Node {
        units: Some(rerun_units),
        ..unit.clone()
    })?;
    let base = replace_at(&outline.base, path, |unit| Node {
        units: Some(base_units),
        ..unit.clone()
    })?;

    Ok((Outline { rerun, base }, has_eligible))
}
