// src/session.rs

//! Review session state for one course pairing.
//!
//! The session owns the outline and all per-node UI state. Every operation
//! that needs the server is split in two: `begin_*` validates the request,
//! marks the operation busy and returns a [`Ticket`]; `finish_*` takes the
//! ticket back together with the server result and applies it.
//!
//! Tickets carry the session generation. Loading another pairing bumps the
//! generation, so results that arrive for the abandoned pairing are rejected
//! with `StaleResponse` instead of being applied to the new tree.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::{
    AppliedVersion, ApprovalPatch, Node, Outline, OutlineResponse, OutlineTree, UnitComponents,
    VersionId, VersionPayload,
};
use crate::outline::{
    self, ExpandAction, ExpansionTracker, NodePath, VersionSelection, Visibility,
};

/// Operations that talk to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Load,
    Expand,
    SelectVersion,
    ApplyVersion,
    Approve,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Load => "load",
            Operation::Expand => "expand",
            Operation::SelectVersion => "select version",
            Operation::ApplyVersion => "apply version",
            Operation::Approve => "approve",
        };
        f.write_str(name)
    }
}

/// An outstanding request, to be handed back to the matching `finish_*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<R> {
    generation: u64,
    operation: Operation,
    path: Option<NodePath>,
    /// What to send
    pub request: R,
}

impl<R> Ticket<R> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn path(&self) -> Option<&NodePath> {
        self.path.as_ref()
    }
}

/// Request for a pairing's outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineFetch {
    pub rerun_id: String,
}

/// Request for one unit's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFetch {
    pub usage_key: String,
}

/// Request for a historical version's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionFetch {
    pub version: VersionId,
}

/// Request to apply a version to a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionApply {
    pub usage_key: String,
    pub version: VersionId,
}

/// Request to approve a set of blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approval {
    pub block_ids: Vec<String>,
}

/// Outcome of starting a version selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectStep {
    /// Handled locally (pending version), nothing to request
    Done(VersionSelection),
    /// The version payload has to be fetched first
    Fetch(Ticket<VersionFetch>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// A message for the user about a finished operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

/// State of one review session.
#[derive(Debug, Default)]
pub struct OutlineSession {
    generation: u64,
    rerun_id: Option<String>,
    outline: Option<Arc<Outline>>,
    loaded_at: Option<DateTime<Utc>>,
    expansion: ExpansionTracker,
    selections: HashMap<NodePath, VersionSelection>,
    in_flight: HashSet<(Operation, Option<NodePath>)>,
    notifications: Vec<Notification>,
}

impl OutlineSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Rerun course of the current pairing.
    pub fn rerun_id(&self) -> Option<&str> {
        self.rerun_id.as_deref()
    }

    pub fn outline(&self) -> Option<Arc<Outline>> {
        self.outline.clone()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    pub fn expansion(&self) -> &ExpansionTracker {
        &self.expansion
    }

    pub fn selection(&self, path: &NodePath) -> Option<VersionSelection> {
        self.selections.get(path).copied()
    }

    /// The control for `operation` on `path` should be disabled.
    pub fn is_busy(&self, operation: Operation, path: &NodePath) -> bool {
        self.in_flight.contains(&(operation, Some(path.clone())))
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.contains(&(Operation::Load, None))
    }

    /// Drain queued notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // --- Load ---

    /// Switch to a pairing. Drops the current outline and all node state;
    /// responses to earlier tickets become stale.
    pub fn begin_load(&mut self, rerun_id: impl Into<String>) -> Ticket<OutlineFetch> {
        let rerun_id = rerun_id.into();
        self.generation += 1;
        self.rerun_id = Some(rerun_id.clone());
        self.outline = None;
        self.loaded_at = None;
        self.expansion.reset();
        self.selections.clear();
        self.in_flight.clear();

        log::debug!("Loading outline for {rerun_id} (generation {})", self.generation);
        self.issue(Operation::Load, None, OutlineFetch { rerun_id })
    }

    pub fn finish_load(
        &mut self,
        ticket: Ticket<OutlineFetch>,
        result: Result<OutlineResponse>,
    ) -> Result<Arc<Outline>> {
        self.settle(&ticket)?;
        let response = result.map_err(|e| self.fail(Operation::Load, None, e))?;

        let outline = Arc::new(Outline::from(response));
        let stats = outline.rerun.stats();
        log::info!(
            "Loaded outline for {}: {} sections, {} units, {} eligible",
            ticket.request.rerun_id,
            stats.sections,
            stats.units,
            stats.eligible
        );
        self.outline = Some(Arc::clone(&outline));
        self.loaded_at = Some(Utc::now());
        Ok(outline)
    }

    // --- Expand ---

    /// User toggled a node. Returns a ticket when the unit's content must be
    /// fetched; otherwise only visibility changed.
    pub fn toggle(&mut self, path: &NodePath) -> Result<Option<Ticket<UnitFetch>>> {
        let outline = self.require_outline()?;
        let node = path.require(&outline.rerun)?;
        let needs_fetch = outline::needs_fetch(path, node);

        match self.expansion.toggle(path, needs_fetch) {
            ExpandAction::Fetch => Ok(Some(self.issue(
                Operation::Expand,
                Some(path.clone()),
                UnitFetch {
                    usage_key: node.usage_key.clone(),
                },
            ))),
            ExpandAction::None => Ok(None),
        }
    }

    /// Start fetching a unit's content without changing its visibility.
    /// `None` when the unit is already loaded or loading.
    pub fn begin_unit_fetch(&mut self, path: &NodePath) -> Result<Option<Ticket<UnitFetch>>> {
        let outline = self.require_outline()?;
        let node = path.require(&outline.rerun)?;
        if !outline::needs_fetch(path, node) || !self.expansion.begin_fetch(path) {
            return Ok(None);
        }
        Ok(Some(self.issue(
            Operation::Expand,
            Some(path.clone()),
            UnitFetch {
                usage_key: node.usage_key.clone(),
            },
        )))
    }

    /// Merge fetched unit content. Returns whether any fetched content node
    /// is approval-eligible.
    pub fn finish_unit_fetch(
        &mut self,
        ticket: Ticket<UnitFetch>,
        result: Result<UnitComponents>,
    ) -> Result<bool> {
        self.settle(&ticket)?;
        let path = ticket_path(&ticket)?;

        let merged = result.and_then(|components| {
            let outline = self.require_outline()?;
            outline::merge_unit_components(&outline, &path, components)
        });
        match merged {
            Ok((outline, has_eligible)) => {
                self.outline = Some(Arc::new(outline));
                self.expansion.finish_fetch(&path, true);
                Ok(has_eligible)
            }
            Err(e) => {
                self.expansion.finish_fetch(&path, false);
                Err(self.fail(Operation::Expand, Some(&path), e))
            }
        }
    }

    /// External expand/collapse-all trigger.
    pub fn toggle_all(&mut self) -> Visibility {
        self.expansion.toggle_all()
    }

    // --- Versions ---

    /// Select a version of the node at `path`. The pending version reverts
    /// any preview locally; other versions need their payload fetched.
    pub fn begin_select_version(
        &mut self,
        path: &NodePath,
        version: VersionId,
    ) -> Result<SelectStep> {
        let outline = self.require_outline()?;
        path.require(&outline.rerun)?;
        self.ensure_idle(Operation::SelectVersion, path)?;

        if version == outline::PENDING_VERSION {
            self.update_rerun(path, outline::revert_preview)?;
            let selection = VersionSelection::pending();
            self.selections.insert(path.clone(), selection);
            return Ok(SelectStep::Done(selection));
        }

        Ok(SelectStep::Fetch(self.issue(
            Operation::SelectVersion,
            Some(path.clone()),
            VersionFetch { version },
        )))
    }

    pub fn finish_select_version(
        &mut self,
        ticket: Ticket<VersionFetch>,
        result: Result<VersionPayload>,
    ) -> Result<VersionSelection> {
        self.settle(&ticket)?;
        let path = ticket_path(&ticket)?;
        let payload = result.map_err(|e| self.fail(Operation::SelectVersion, Some(&path), e))?;

        let version = ticket.request.version;
        self.update_rerun(&path, |node| outline::preview_version(node, payload.data))?;

        let outline = self.require_outline()?;
        let node = path.require(&outline.rerun)?;
        let selection = VersionSelection {
            version,
            apply_enabled: outline::apply_enabled(node, version),
        };
        self.selections.insert(path, selection);
        Ok(selection)
    }

    /// Apply the selected version of the node at `path` to the live block.
    pub fn begin_apply(&mut self, path: &NodePath) -> Result<Ticket<VersionApply>> {
        let outline = self.require_outline()?;
        let node = path.require(&outline.rerun)?;

        let selection = self
            .selections
            .get(path)
            .copied()
            .filter(|s| !s.is_pending())
            .ok_or_else(|| AppError::NoSelection(path.to_string()))?;
        if !outline::apply_enabled(node, selection.version) {
            return Err(AppError::validation(format!(
                "version {} is already applied to {}",
                selection.version, path
            )));
        }

        self.ensure_idle(Operation::ApplyVersion, path)?;
        Ok(self.issue(
            Operation::ApplyVersion,
            Some(path.clone()),
            VersionApply {
                usage_key: node.usage_key.clone(),
                version: selection.version,
            },
        ))
    }

    pub fn finish_apply(
        &mut self,
        ticket: Ticket<VersionApply>,
        result: Result<AppliedVersion>,
    ) -> Result<()> {
        self.settle(&ticket)?;
        let path = ticket_path(&ticket)?;
        let applied = result.map_err(|e| self.fail(Operation::ApplyVersion, Some(&path), e))?;

        self.update_rerun(&path, |node| outline::commit_applied(node, &applied))?;
        if let Some(selection) = self.selections.get_mut(&path) {
            selection.apply_enabled = false;
        }
        log::info!(
            "Applied version {:?} to {}",
            applied.applied_version,
            ticket.request.usage_key
        );
        Ok(())
    }

    // --- Approval ---

    /// Collect everything approvable below `path`. Fails with
    /// `EmptyApprovalSet` when there is nothing to send.
    pub fn begin_approve(&mut self, path: &NodePath) -> Result<Ticket<Approval>> {
        let outline = self.require_outline()?;
        self.ensure_idle(Operation::Approve, path)?;

        let block_ids = match outline::plan_approval(&outline.rerun, path) {
            Ok(block_ids) => block_ids,
            Err(e @ AppError::EmptyApprovalSet(_)) => {
                self.notify(Severity::Info, format!("Nothing to approve under {path}"));
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        log::debug!("Approving {} blocks under {}", block_ids.len(), path);
        Ok(self.issue(
            Operation::Approve,
            Some(path.clone()),
            Approval { block_ids },
        ))
    }

    /// Fold the approval response into the sub-tree. Returns how many of the
    /// requested blocks the server reported back.
    pub fn finish_approve(
        &mut self,
        ticket: Ticket<Approval>,
        result: Result<ApprovalPatch>,
    ) -> Result<usize> {
        self.settle(&ticket)?;
        let path = ticket_path(&ticket)?;
        let patch = result.map_err(|e| self.fail(Operation::Approve, Some(&path), e))?;

        let outline = self.require_outline()?;
        let rerun = outline::approve_in_tree(&outline.rerun, &path, &patch)?;
        self.set_rerun(&outline, rerun);

        let reported = ticket
            .request
            .block_ids
            .iter()
            .filter(|id| patch.contains_key(*id))
            .count();
        if reported < ticket.request.block_ids.len() {
            log::warn!(
                "Approval under {}: {} of {} blocks reported back",
                path,
                reported,
                ticket.request.block_ids.len()
            );
        }
        Ok(reported)
    }

    // --- Internals ---

    fn issue<R>(&mut self, operation: Operation, path: Option<NodePath>, request: R) -> Ticket<R> {
        self.in_flight.insert((operation, path.clone()));
        Ticket {
            generation: self.generation,
            operation,
            path,
            request,
        }
    }

    /// Reject tickets from another generation, then clear the busy flag.
    fn settle<R>(&mut self, ticket: &Ticket<R>) -> Result<()> {
        if ticket.generation != self.generation {
            log::debug!(
                "Discarding {} response for generation {} (current {})",
                ticket.operation,
                ticket.generation,
                self.generation
            );
            return Err(AppError::StaleResponse {
                ticket: ticket.generation,
                current: self.generation,
            });
        }
        self.in_flight
            .remove(&(ticket.operation, ticket.path.clone()));
        Ok(())
    }

    fn ensure_idle(&self, operation: Operation, path: &NodePath) -> Result<()> {
        if self.is_busy(operation, path) {
            return Err(AppError::busy(operation, path));
        }
        Ok(())
    }

    fn require_outline(&self) -> Result<Arc<Outline>> {
        self.outline.clone().ok_or(AppError::NotLoaded)
    }

    fn update_rerun<F>(&mut self, path: &NodePath, updater: F) -> Result<()>
    where
        F: FnOnce(&Node) -> Node,
    {
        let outline = self.require_outline()?;
        let rerun = outline::replace_at(&outline.rerun, path, updater)?;
        self.set_rerun(&outline, rerun);
        Ok(())
    }

    fn set_rerun(&mut self, outline: &Outline, rerun: OutlineTree) {
        self.outline = Some(Arc::new(Outline {
            rerun,
            base: outline.base.clone(),
        }));
    }

    fn notify(&mut self, severity: Severity, message: String) {
        self.notifications.push(Notification { severity, message });
    }

    /// Record a failed request. The tree is left as it was.
    fn fail(&mut self, operation: Operation, path: Option<&NodePath>, error: AppError) -> AppError {
        let target = path.map(|p| format!(" for {p}")).unwrap_or_default();
        log::warn!("{operation}{target} failed: {error}");
        if error.is_transport() {
            self.notify(Severity::Error, format!("Could not {operation}{target}: {error}"));
        }
        error
    }
}

fn ticket_path<R>(ticket: &Ticket<R>) -> Result<NodePath> {
    ticket
        .path
        .clone()
        .ok_or_else(|| AppError::invalid_path(format!("{} ticket without a path", ticket.operation)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApprovalEntry;
    use crate::testing::{eligible_status, node_with, sample_response};
    use indexmap::IndexMap;
    use serde_json::json;

    fn loaded() -> OutlineSession {
        let mut session = OutlineSession::new();
        let ticket = session.begin_load("course-v1:rerun");
        session.finish_load(ticket, Ok(sample_response())).unwrap();
        session
    }

    fn tree(session: &OutlineSession) -> OutlineTree {
        session.outline().unwrap().rerun.clone()
    }

    fn approval(version: i64) -> ApprovalEntry {
        ApprovalEntry {
            approved: true,
            applied_translation: true,
            applied_version: Some(version),
            applied_version_date: Some("Jun 10, 2022".into()),
        }
    }

    #[test]
    fn test_load_populates_outline() {
        let session = loaded();
        assert_eq!(session.rerun_id(), Some("course-v1:rerun"));
        assert!(session.loaded_at().is_some());
        assert!(!session.is_loading());
        assert!(tree(&session).course_outline.contains_key("S1"));
    }

    #[test]
    fn test_operations_require_outline() {
        let mut session = OutlineSession::new();
        let path = NodePath::section("S1");
        assert!(matches!(session.toggle(&path), Err(AppError::NotLoaded)));
        assert!(matches!(session.begin_approve(&path), Err(AppError::NotLoaded)));
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut session = loaded();
        let path: NodePath = "S1/Q1/U2".parse().unwrap();
        let ticket = session.toggle(&path).unwrap().unwrap();

        // User switches to another pairing before the unit arrives.
        let reload = session.begin_load("course-v1:other");
        session.finish_load(reload, Ok(sample_response())).unwrap();
        let before = tree(&session);

        let result = session.finish_unit_fetch(ticket, Ok(UnitComponents::default()));
        assert!(matches!(result, Err(AppError::StaleResponse { .. })));
        assert_eq!(tree(&session), before);
        assert!(session.take_notifications().is_empty());
    }

    #[test]
    fn test_expand_fetches_once_and_reports_eligibility() {
        let mut session = loaded();
        let path: NodePath = "S1/Q1/U2".parse().unwrap();

        let ticket = session.toggle(&path).unwrap().expect("first expansion fetches");
        assert_eq!(ticket.request.usage_key, "r-vert-2");
        assert!(session.toggle(&path).unwrap().is_none());
        assert!(session.toggle(&path).unwrap().is_none());

        let components = UnitComponents {
            components_data: Some(IndexMap::from([(
                "C5".to_string(),
                Arc::new(node_with("r-html-5", "html", Some(eligible_status()), None, None)),
            )])),
            base_components_data: Some(IndexMap::from([(
                "C5".to_string(),
                Arc::new(node_with("b-html-5", "html", None, None, None)),
            )])),
        };
        assert!(session.finish_unit_fetch(ticket, Ok(components)).unwrap());

        let content = path.child("C5").unwrap();
        assert!(content.resolve(&tree(&session)).is_some());
        assert!(content.resolve(&session.outline().unwrap().base).is_some());
        assert!(session.expansion().is_expanded(&path));

        // Collapse and expand: no new request.
        assert!(session.toggle(&path).unwrap().is_none());
        assert!(session.toggle(&path).unwrap().is_none());
    }

    #[test]
    fn test_expand_failure_leaves_tree_and_notifies() {
        let mut session = loaded();
        let path: NodePath = "S1/Q1/U2".parse().unwrap();
        let before = tree(&session);

        let ticket = session.toggle(&path).unwrap().unwrap();
        let result =
            session.finish_unit_fetch(ticket, Err(AppError::transport("u", 502, "bad gateway")));

        assert!(result.unwrap_err().is_transport());
        assert_eq!(tree(&session), before);
        let notes = session.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, Severity::Error);
        assert_eq!(
            session.expansion().load_state(&path),
            crate::outline::LoadState::NotFetched
        );
    }

    #[test]
    fn test_approve_flow() {
        let mut session = loaded();
        let path = NodePath::section("S1");

        let ticket = session.begin_approve(&path).unwrap();
        assert_eq!(
            ticket.request.block_ids,
            vec!["r-chapter-1", "r-vert-1", "r-html-1", "r-vert-2"]
        );
        assert!(session.is_busy(Operation::Approve, &path));
        assert!(matches!(
            session.begin_approve(&path),
            Err(AppError::Busy { .. })
        ));

        let patch: ApprovalPatch = ticket
            .request
            .block_ids
            .iter()
            .map(|id| (id.clone(), approval(20)))
            .collect();
        assert_eq!(session.finish_approve(ticket, Ok(patch)).unwrap(), 4);
        assert!(!session.is_busy(Operation::Approve, &path));

        let tree = tree(&session);
        assert!(path.resolve(&tree).unwrap().is_approved());
        assert!(outline::collect_eligible(path.resolve(&tree).unwrap()).is_empty());
    }

    #[test]
    fn test_approve_empty_set_notifies_without_request() {
        let mut session = loaded();
        let path = NodePath::section("S2");

        let result = session.begin_approve(&path);
        assert!(matches!(result, Err(AppError::EmptyApprovalSet(_))));
        assert!(!session.is_busy(Operation::Approve, &path));

        let notes = session.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, Severity::Info);
        assert!(notes[0].message.contains("Nothing to approve"));
    }

    #[test]
    fn test_approve_failure_clears_busy() {
        let mut session = loaded();
        let path = NodePath::section("S1");
        let before = tree(&session);

        let ticket = session.begin_approve(&path).unwrap();
        let result = session.finish_approve(ticket, Err(AppError::transport("a", 500, "")));
        assert!(result.is_err());
        assert!(!session.is_busy(Operation::Approve, &path));
        assert_eq!(tree(&session), before);
        assert!(session.begin_approve(&path).is_ok());
    }

    #[test]
    fn test_approve_course_info() {
        let mut session = loaded();
        let ticket = session.begin_approve(&NodePath::course_info()).unwrap();
        assert_eq!(ticket.request.block_ids, vec!["course-v1:rerun"]);

        let patch = ApprovalPatch::from([("course-v1:rerun".to_string(), approval(1))]);
        session.finish_approve(ticket, Ok(patch)).unwrap();
        assert!(tree(&session).course_info.is_approved());
    }

    #[test]
    fn test_select_preview_and_revert() {
        let mut session = loaded();
        let path: NodePath = "S1/Q1/U1/C1".parse().unwrap();
        let original = path.resolve(&tree(&session)).unwrap().data.clone();

        let SelectStep::Fetch(ticket) = session.begin_select_version(&path, 2).unwrap() else {
            panic!("historical versions are fetched");
        };
        assert_eq!(ticket.request.version, 2);
        let payload = VersionPayload {
            block_id: Some("r-html-1".into()),
            date: None,
            data: json!({"display_name": "Version two"}),
        };
        let selection = session.finish_select_version(ticket, Ok(payload)).unwrap();
        assert!(selection.apply_enabled);
        assert_eq!(
            path.resolve(&tree(&session)).unwrap().display_name(),
            Some("Version two")
        );

        let step = session
            .begin_select_version(&path, outline::PENDING_VERSION)
            .unwrap();
        assert_eq!(step, SelectStep::Done(VersionSelection::pending()));
        let node = Arc::clone(path.resolve(&tree(&session)).unwrap());
        assert_eq!(node.data, original);
        assert!(!node.is_previewing());
        assert!(!session.selection(&path).unwrap().apply_enabled);
    }

    #[test]
    fn test_apply_selected_version() {
        let mut session = loaded();
        let path: NodePath = "S1/Q1/U1/C1".parse().unwrap();

        assert!(matches!(
            session.begin_apply(&path),
            Err(AppError::NoSelection(_))
        ));

        let SelectStep::Fetch(ticket) = session.begin_select_version(&path, 2).unwrap() else {
            panic!("historical versions are fetched");
        };
        let payload = VersionPayload {
            block_id: None,
            date: None,
            data: json!({"display_name": "Version two"}),
        };
        session.finish_select_version(ticket, Ok(payload)).unwrap();

        let apply = session.begin_apply(&path).unwrap();
        assert_eq!(apply.request.usage_key, "r-html-1");
        assert_eq!(apply.request.version, 2);
        assert!(session.is_busy(Operation::ApplyVersion, &path));

        session
            .finish_apply(
                apply,
                Ok(AppliedVersion {
                    block_id: Some("r-html-1".into()),
                    applied_translation: true,
                    applied_version: Some(2),
                }),
            )
            .unwrap();

        let node = Arc::clone(path.resolve(&tree(&session)).unwrap());
        assert_eq!(node.display_name(), Some("Version two"));
        assert!(!node.is_previewing());
        assert_eq!(node.version_status.as_ref().unwrap().applied_version, Some(2));
        assert!(!session.selection(&path).unwrap().apply_enabled);
        assert!(session.begin_apply(&path).is_err());
    }

    #[test]
    fn test_select_pending_without_preview_keeps_tree() {
        let mut session = loaded();
        let path: NodePath = "S1/Q1/U1/C2".parse().unwrap();
        let before = tree(&session);

        let step = session
            .begin_select_version(&path, outline::PENDING_VERSION)
            .unwrap();
        assert_eq!(step, SelectStep::Done(VersionSelection::pending()));
        assert_eq!(tree(&session), before);
        assert!(!session.is_busy(Operation::SelectVersion, &path));
    }

    #[test]
    fn test_pending_selection_waits_for_outstanding_fetch() {
        let mut session = loaded();
        let path: NodePath = "S1/Q1/U1/C1".parse().unwrap();

        let SelectStep::Fetch(ticket) = session.begin_select_version(&path, 2).unwrap() else {
            panic!("historical versions are fetched");
        };
        assert!(matches!(
            session.begin_select_version(&path, outline::PENDING_VERSION),
            Err(AppError::Busy { .. })
        ));

        let payload = VersionPayload {
            block_id: None,
            date: None,
            data: json!({"display_name": "v2"}),
        };
        session.finish_select_version(ticket, Ok(payload)).unwrap();
        assert_eq!(session.selection(&path).unwrap().version, 2);

        let step = session
            .begin_select_version(&path, outline::PENDING_VERSION)
            .unwrap();
        assert_eq!(step, SelectStep::Done(VersionSelection::pending()));
        let node = Arc::clone(path.resolve(&tree(&session)).unwrap());
        assert!(!node.is_previewing());
        assert_eq!(node.display_name(), Some("r-html-1"));
    }
}
