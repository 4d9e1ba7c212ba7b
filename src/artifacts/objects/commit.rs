//! Commit object
//!
//! Commits represent snapshots of the repository at specific points in time.
//! They contain:
//! - A tree object ID (directory snapshot)
//! - Parent commit ID(s) (for history)
//! - Author and committer information
//! - Commit message
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```
//!
//! Unknown headers (`gpgsig`, `encoding`, ...) are kept as-is so foreign commits
//! hash to the same id after a round trip.

use crate::artifacts::objects::headers::Headers;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::signature::Signature;
use crate::errors::{Error, Result};
use bytes::Bytes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    headers: Headers,
}

impl Commit {
    pub fn new(
        tree_oid: &ObjectId,
        parents: &[ObjectId],
        author: &Signature,
        committer: &Signature,
        message: impl Into<Bytes>,
    ) -> Self {
        let mut headers = Headers::new(message);

        headers.push("tree", tree_oid.to_string());
        for parent in parents {
            headers.push("parent", parent.to_string());
        }
        headers.push("author", author.to_string());
        headers.push("committer", committer.to_string());

        Commit { headers }
    }

    pub fn tree_oid(&self) -> Result<ObjectId> {
        let tree = self
            .headers
            .get_str("tree")?
            .ok_or_else(|| Error::malformed("commit without tree"))?;

        ObjectId::try_parse(tree).map_err(|_| Error::malformed(format!("bad tree id '{tree}'")))
    }

    pub fn parents(&self) -> Result<Vec<ObjectId>> {
        self.headers
            .get_all("parent")
            .map(|parent| {
                std::str::from_utf8(parent)
                    .ok()
                    .and_then(|parent| ObjectId::try_parse(parent).ok())
                    .ok_or_else(|| {
                        Error::malformed(format!(
                            "bad parent id '{}'",
                            String::from_utf8_lossy(parent)
                        ))
                    })
            })
            .collect()
    }

    pub fn author(&self) -> Result<Signature> {
        self.signature("author")
    }

    pub fn committer(&self) -> Result<Signature> {
        self.signature("committer")
    }

    /// Message bytes as stored; their charset is named by the `encoding` header, if any
    pub fn message(&self) -> &[u8] {
        self.headers.message()
    }

    fn signature(&self, key: &str) -> Result<Signature> {
        let line = self
            .headers
            .get_str(key)?
            .ok_or_else(|| Error::malformed(format!("commit without {key}")))?;

        Signature::try_from(line)
    }
}

impl Packable for Commit {
    fn serialize(&self) -> Result<Bytes> {
        Ok(self.headers.serialize())
    }
}

impl Unpackable for Commit {
    fn deserialize(payload: Bytes) -> Result<Self> {
        Ok(Commit {
            headers: Headers::deserialize(payload)?,
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        String::from_utf8_lossy(&self.headers.serialize()).into_owned()
    }
}
