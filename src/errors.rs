//! Error taxonomy shared by every storage component
//!
//! Components return these errors to their caller instead of reporting them.
//! Only the command layer decides whether to print and halt.

use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The locator walked up to the filesystem root without finding a metadata directory.
    #[error("not a git repository (or any of the parent directories): {0}")]
    NoRepositoryFound(PathBuf),

    /// A metadata directory exists but its layout or configuration is unusable.
    #[error("invalid repository at {path}: {reason}")]
    RepositoryInvalid { path: PathBuf, reason: String },

    #[error("refusing to initialize over non-empty directory {0}")]
    TargetNotEmpty(PathBuf),

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    /// The object location is occupied by something other than a regular file.
    #[error("{0} is not a file")]
    NotAFile(PathBuf),

    #[error("object {0} not found")]
    ObjectNotFound(ObjectId),

    #[error("malformed object: {0}")]
    MalformedObject(String),

    #[error("unknown type {object_type} for object {oid}")]
    UnknownObjectType { oid: ObjectId, object_type: String },

    #[error("not a valid object name {0}")]
    InvalidObjectName(String),

    #[error("short object name {name} is ambiguous: {} candidates", .candidates.len())]
    AmbiguousObjectName {
        name: String,
        candidates: Vec<ObjectId>,
    },

    #[error("object {oid} is a {actual}, not a {expected}")]
    ObjectTypeMismatch {
        oid: ObjectId,
        expected: ObjectType,
        actual: ObjectType,
    },

    #[error("bad config line {line}: {reason}")]
    Config { line: usize, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedObject(reason.into())
    }
}
