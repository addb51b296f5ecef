// src/lib.rs

//! Outline synchronizer library.
//!
//! Keeps a client-side copy of a course translation pairing (base course
//! and translated rerun) in sync with the translation API: lazy unit
//! loading, version preview and apply, and recursive bulk approval.

pub mod error;
pub mod models;
pub mod outline;
pub mod services;
pub mod session;
pub mod utils;

#[cfg(test)]
mod testing;
