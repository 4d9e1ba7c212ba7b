//! Reference lookup (HEAD, branches, tags)
//!
//! References are text files under the metadata directory containing either:
//! - A 40-character SHA-1 hash (direct reference)
//! - `ref: <path>` for symbolic references
//!
//! Only reading is supported here; writing refs belongs to the command layer.

use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use derive_new::new;
use std::path::Path;
use tracing::trace;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

/// Symbolic references deeper than this are treated as a cycle
const MAX_SYMREF_DEPTH: usize = 10;

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the metadata directory
    path: Box<Path>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SymRefOrOid {
    SymRef(String),
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn read(path: &Path) -> Result<Option<SymRefOrOid>> {
        if !path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        if let Some(captures) = regex::Regex::new(SYMREF_REGEX)?.captures(content) {
            return Ok(Some(SymRefOrOid::SymRef(captures[1].to_string())));
        }

        ObjectId::try_parse(content)
            .map(|oid| Some(SymRefOrOid::Oid(oid)))
            .map_err(|_| Error::InvalidObjectName(format!("{}: {content}", path.display())))
    }
}

impl Refs {
    /// Resolve a ref path relative to the metadata directory (e.g. `refs/heads/master`)
    ///
    /// Follows symbolic references. Returns `None` for refs that do not exist,
    /// including branches that have no commits yet.
    pub fn read_ref(&self, name: &str) -> Result<Option<ObjectId>> {
        let mut name = name.to_string();

        for _ in 0..MAX_SYMREF_DEPTH {
            trace!(%name, "reading ref");

            match SymRefOrOid::read(&self.path.join(&name))? {
                Some(SymRefOrOid::SymRef(target)) => name = target,
                Some(SymRefOrOid::Oid(oid)) => return Ok(Some(oid)),
                None => return Ok(None),
            }
        }

        Err(Error::InvalidObjectName(format!(
            "{name}: symbolic reference nested too deeply"
        )))
    }

    pub fn read_head(&self) -> Result<Option<ObjectId>> {
        self.read_ref(HEAD_REF_NAME)
    }
}
