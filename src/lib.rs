//! Object store and repository layout for a content-addressed version-control tool
//!
//! - `areas`: on-disk areas (configuration, repository layout, loose object database, refs)
//! - `artifacts`: value types (objects, object ids, name resolution)
//! - `commands`: the top-level command layer used by the binary
//! - `errors`: the shared error taxonomy

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;

pub use errors::{Error, Result};
