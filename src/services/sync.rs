// src/services/sync.rs

//! Async driver for an [`OutlineSession`].
//!
//! Each operation takes the session lock to begin, releases it for the
//! request, and takes it again to finish. Requests for different nodes
//! therefore overlap, and a pairing switch in between turns late responses
//! into stale ones.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::{Mutex, MutexGuard};

use crate::error::{AppError, Result};
use crate::models::{Config, CoursePairing, Outline, VersionId};
use crate::outline::{self, NodePath, VersionSelection, Visibility};
use crate::services::api::TranslationApi;
use crate::services::http::{HttpClient, ReqwestClient};
use crate::session::{OutlineSession, SelectStep};

/// Result of toggling a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandOutcome {
    pub visibility: Visibility,
    /// Set when unit content was fetched: whether any of it can be approved
    pub has_eligible: Option<bool>,
}

/// Keeps the local outline of one pairing in sync with the server.
pub struct Synchronizer<C> {
    api: TranslationApi<C>,
    session: Mutex<OutlineSession>,
    max_concurrent: usize,
}

impl Synchronizer<ReqwestClient> {
    /// Build a synchronizer talking to the configured server.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = ReqwestClient::new(&config.http)?;
        let api = TranslationApi::new(client, config.api.clone())?;
        Ok(Self::new(api, config.http.max_concurrent))
    }
}

impl<C: HttpClient> Synchronizer<C> {
    pub fn new(api: TranslationApi<C>, max_concurrent: usize) -> Self {
        Self {
            api,
            session: Mutex::new(OutlineSession::new()),
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn api(&self) -> &TranslationApi<C> {
        &self.api
    }

    /// Lock the session for inspection. Do not hold across a request.
    pub async fn session(&self) -> MutexGuard<'_, OutlineSession> {
        self.session.lock().await
    }

    pub async fn outline(&self) -> Option<Arc<Outline>> {
        self.session.lock().await.outline()
    }

    /// List base courses and their reruns.
    pub async fn course_pairings(&self) -> Result<Vec<CoursePairing>> {
        self.api.course_pairings().await
    }

    /// Load a pairing, replacing whatever was loaded before.
    ///
    /// `Ok(None)` means another load started while this one was in flight.
    pub async fn load(&self, rerun_id: &str) -> Result<Option<Arc<Outline>>> {
        let ticket = self.session.lock().await.begin_load(rerun_id);
        let result = self.api.outline(&ticket.request.rerun_id).await;
        let finished = self.session.lock().await.finish_load(ticket, result);
        settle(finished)
    }

    /// Expand or collapse a node, fetching unit content on first expansion.
    pub async fn toggle(&self, path: &NodePath) -> Result<Option<ExpandOutcome>> {
        let (ticket, visibility) = {
            let mut session = self.session.lock().await;
            let ticket = session.toggle(path)?;
            (ticket, session.expansion().visibility(path))
        };

        let has_eligible = match ticket {
            Some(ticket) => {
                let result = self.api.unit_components(&ticket.request.usage_key).await;
                let finished = self.session.lock().await.finish_unit_fetch(ticket, result);
                match settle(finished)? {
                    Some(flag) => Some(flag),
                    None => return Ok(None),
                }
            }
            None => None,
        };
        Ok(Some(ExpandOutcome {
            visibility,
            has_eligible,
        }))
    }

    /// Expand or collapse everything without fetching.
    pub async fn toggle_all(&self) -> Visibility {
        self.session.lock().await.toggle_all()
    }

    /// Fetch content for every unit at or below `path` that is not loaded
    /// yet, `max_concurrent` requests at a time. Returns how many units were
    /// loaded; failures are logged and left for a later retry.
    pub async fn load_all_units(&self, path: &NodePath) -> Result<usize> {
        let tickets = {
            let mut session = self.session.lock().await;
            let outline = session.outline().ok_or(AppError::NotLoaded)?;
            let mut tickets = Vec::new();
            for unit in outline::unit_paths(&outline.rerun, path)? {
                if let Some(ticket) = session.begin_unit_fetch(&unit)? {
                    tickets.push(ticket);
                }
            }
            tickets
        };

        let total = tickets.len();
        let mut loaded = 0;
        let mut fetches = stream::iter(tickets)
            .map(|ticket| async move {
                let result = self.api.unit_components(&ticket.request.usage_key).await;
                (ticket, result)
            })
            .buffer_unordered(self.max_concurrent);

        while let Some((ticket, result)) = fetches.next().await {
            let finished = self.session.lock().await.finish_unit_fetch(ticket, result);
            match settle(finished) {
                Ok(Some(_)) => loaded += 1,
                Ok(None) => {}
                Err(e) => log::debug!("Unit fetch under {path} failed: {e}"),
            }
        }

        log::info!("Loaded {loaded}/{total} units under {path}");
        Ok(loaded)
    }

    /// Select a version of a node, previewing its payload.
    pub async fn select_version(
        &self,
        path: &NodePath,
        version: VersionId,
    ) -> Result<Option<VersionSelection>> {
        let step = self.session.lock().await.begin_select_version(path, version)?;
        match step {
            SelectStep::Done(selection) => Ok(Some(selection)),
            SelectStep::Fetch(ticket) => {
                let result = self.api.version(ticket.request.version).await;
                let finished = self.session.lock().await.finish_select_version(ticket, result);
                settle(finished)
            }
        }
    }

    /// Apply the selected version of a node. Returns false when the
    /// response was discarded.
    pub async fn apply_version(&self, path: &NodePath) -> Result<bool> {
        let ticket = self.session.lock().await.begin_apply(path)?;
        let result = self
            .api
            .apply_version(&ticket.request.usage_key, ticket.request.version)
            .await;
        let finished = self.session.lock().await.finish_apply(ticket, result);
        Ok(settle(finished)?.is_some())
    }

    /// Approve every eligible node at or below `path` in one request.
    /// Returns how many blocks the server reported as handled.
    pub async fn approve(&self, path: &NodePath) -> Result<Option<usize>> {
        let ticket = self.session.lock().await.begin_approve(path)?;
        let result = self.api.approve(&ticket.request.block_ids).await;
        let finished = self.session.lock().await.finish_approve(ticket, result);
        settle(finished)
    }
}

/// Turn a stale response into `Ok(None)`.
fn settle<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_stale() => {
            log::debug!("{e}");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
