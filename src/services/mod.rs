//! Service layer for the outline synchronizer.
//!
//! This module contains:
//! - The HTTP collaborator seam (`HttpClient`, `ReqwestClient`)
//! - Typed translation API endpoints (`TranslationApi`)
//! - The async session driver (`Synchronizer`)

mod api;
mod http;
mod sync;

pub use api::TranslationApi;
pub use http::{ApiResponse, HttpClient, Method, ReqwestClient};
pub use sync::{ExpandOutcome, Synchronizer};
