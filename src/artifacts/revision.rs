//! Object name resolution
//!
//! Turns a user-supplied name into the object id the database needs. A name is
//! offered to every [`NameSource`]; the candidates they produce are pooled and
//! must narrow down to exactly one object.
//!
//! Supported names:
//! - Full ids: 40 hexadecimal characters (format-checked only)
//! - Abbreviated ids: 4-39 hexadecimal characters, matched against stored objects
//! - Refs: `HEAD`, `@`, `refs/...` paths, and short tag or branch names

use crate::areas::refs::HEAD_REF_NAME;
use crate::areas::repository::Repository;
use crate::artifacts::objects::object::GitObject;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::errors::{Error, Result};
use tracing::debug;

/// Shortest abbreviated id that is searched for
pub const MIN_ABBREV_LENGTH: usize = 4;

pub const REF_ALIASES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "@" => "HEAD",
};

/// Directories searched, in order, for a short ref name
const REF_SEARCH_PATH: [&str; 3] = ["refs/tags", "refs/heads", "refs/remotes"];

/// A way of turning a name into candidate object ids
pub trait NameSource {
    fn candidates(&self, repository: &Repository, name: &str) -> Result<Vec<ObjectId>>;
}

/// A full 40-character id, accepted without checking that it exists
#[derive(Debug, Default)]
pub struct FullHash;

impl NameSource for FullHash {
    fn candidates(&self, _repository: &Repository, name: &str) -> Result<Vec<ObjectId>> {
        if !ObjectId::is_full_hex(name) {
            return Ok(Vec::new());
        }

        Ok(vec![ObjectId::try_parse(name)?])
    }
}

/// A hexadecimal prefix of a stored object's id
#[derive(Debug, Default)]
pub struct AbbreviatedHash;

impl NameSource for AbbreviatedHash {
    fn candidates(&self, repository: &Repository, name: &str) -> Result<Vec<ObjectId>> {
        let looks_like_oid = (MIN_ABBREV_LENGTH..OBJECT_ID_LENGTH).contains(&name.len())
            && name.chars().all(|c| c.is_ascii_hexdigit());
        if !looks_like_oid {
            return Ok(Vec::new());
        }

        repository.database().find_objects_by_prefix(name)
    }
}

/// HEAD, explicit `refs/...` paths, and short tag/branch names
#[derive(Debug, Default)]
pub struct SymbolicRef;

impl SymbolicRef {
    fn is_safe_ref_name(name: &str) -> bool {
        !name.is_empty()
            && !name.starts_with('/')
            && name
                .split('/')
                .all(|part| !part.is_empty() && part != "." && part != "..")
    }
}

impl NameSource for SymbolicRef {
    fn candidates(&self, repository: &Repository, name: &str) -> Result<Vec<ObjectId>> {
        let name = *REF_ALIASES.get(name).unwrap_or(&name);
        if !Self::is_safe_ref_name(name) {
            return Ok(Vec::new());
        }

        let refs = repository.refs();

        if name == HEAD_REF_NAME || name.starts_with("refs/") {
            return Ok(refs.read_ref(name)?.into_iter().collect());
        }

        let mut candidates = Vec::new();
        for dir in REF_SEARCH_PATH {
            if let Some(oid) = refs.read_ref(&format!("{dir}/{name}"))? {
                candidates.push(oid);
            }
        }

        Ok(candidates)
    }
}

pub struct Resolver {
    sources: Vec<Box<dyn NameSource>>,
}

impl Default for Resolver {
    fn default() -> Self {
        Resolver::new(vec![
            Box::new(FullHash),
            Box::new(SymbolicRef),
            Box::new(AbbreviatedHash),
        ])
    }
}

impl Resolver {
    pub fn new(sources: Vec<Box<dyn NameSource>>) -> Self {
        Resolver { sources }
    }

    /// Every distinct object id `name` could refer to
    pub fn candidates(&self, repository: &Repository, name: &str) -> Result<Vec<ObjectId>> {
        let mut candidates = Vec::new();

        for source in &self.sources {
            for oid in source.candidates(repository, name)? {
                if !candidates.contains(&oid) {
                    candidates.push(oid);
                }
            }
        }

        debug!(%name, count = candidates.len(), "resolved name candidates");
        Ok(candidates)
    }

    /// Resolve `name` to a single object id
    ///
    /// With an `expected` type the object is read and must have that type. When
    /// `follow_tags` is set, annotated tags are peeled until the expected type
    /// (or a non-tag) is reached.
    pub fn resolve(
        &self,
        repository: &Repository,
        name: &str,
        expected: Option<ObjectType>,
        follow_tags: bool,
    ) -> Result<ObjectId> {
        let name = name.trim();
        let mut candidates = self.candidates(repository, name)?;

        let oid = match candidates.len() {
            0 => return Err(Error::InvalidObjectName(name.to_string())),
            1 => candidates.remove(0),
            _ => {
                return Err(Error::AmbiguousObjectName {
                    name: name.to_string(),
                    candidates,
                });
            }
        };

        match expected {
            Some(expected) => Self::peel(repository, oid, expected, follow_tags),
            None => Ok(oid),
        }
    }

    fn peel(
        repository: &Repository,
        mut oid: ObjectId,
        expected: ObjectType,
        follow_tags: bool,
    ) -> Result<ObjectId> {
        let database = repository.database();

        loop {
            let actual = database.object_type(&oid)?;
            if actual == expected {
                return Ok(oid);
            }

            if actual == ObjectType::Tag && follow_tags {
                if let GitObject::Tag(tag) = database.load(&oid)? {
                    oid = tag.object()?;
                    continue;
                }
            }

            return Err(Error::ObjectTypeMismatch {
                oid,
                expected,
                actual,
            });
        }
    }
}

/// Resolve `name` with the default sources
pub fn resolve(
    repository: &Repository,
    name: &str,
    expected: Option<ObjectType>,
    follow_tags: bool,
) -> Result<ObjectId> {
    Resolver::default().resolve(repository, name, expected, follow_tags)
}
