// src/models/mod.rs

//! Domain models for the outline synchronizer.
//!
//! This module contains the outline data model, the API payloads exchanged
//! with the translation service, and the application configuration.

mod api;
mod config;
mod node;
mod outline;

// Re-export all public types
pub use api::{
    AppliedVersion, ApplyRequest, ApprovalEntry, ApprovalPatch, ApproveRequest, CoursePairing,
    CourseRef, UnitComponents, VersionPayload,
};
pub use config::{ApiConfig, Config, HttpConfig, LoggingConfig};
pub use node::{ChildMap, Links, Node, NodeKind, Status, Version, VersionId, VersionStatus};
pub use outline::{Outline, OutlineResponse, OutlineStats, OutlineTree};
