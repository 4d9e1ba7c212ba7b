//! Command implementations
//!
//! Organized the way git splits its own commands:
//!
//! - `plumbing`: Low-level commands for direct object access (cat-file, hash-object, rev-parse)
//! - `porcelain`: User-facing commands (init)
//!
//! Commands write their output to a caller-supplied writer and return errors
//! with context; the binary decides how to report them.

use crate::areas::repository::Repository;
use anyhow::Context;
use std::path::Path;

pub mod plumbing;
pub mod porcelain;

/// Locate the repository containing `start`, failing if there is none
pub(crate) fn find_repository(start: &Path) -> anyhow::Result<Repository> {
    Repository::locate(start, true)
        .with_context(|| format!("Unable to open repository from {}", start.display()))?
        .with_context(|| format!("No repository found from {}", start.display()))
}
