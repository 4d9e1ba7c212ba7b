use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tag::Tag;
use crate::artifacts::objects::tree::Tree;
use crate::errors::Result;
use bytes::{BufMut, Bytes, BytesMut};

/// Canonical payload encoding (without the `<type> <size>\0` header)
pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

/// Inverse of [`Packable`]: accepts exactly the bytes `serialize` produces
pub trait Unpackable {
    fn deserialize(payload: Bytes) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn display(&self) -> String;

    /// Header plus payload: the bytes that are hashed and compressed on disk
    fn envelope(&self) -> Result<Bytes> {
        let payload = self.serialize()?;
        let header = format!("{} {}\0", self.object_type(), payload.len());

        let mut envelope = BytesMut::with_capacity(header.len() + payload.len());
        envelope.put_slice(header.as_bytes());
        envelope.put_slice(&payload);

        Ok(envelope.freeze())
    }

    fn object_id(&self) -> Result<ObjectId> {
        Ok(ObjectId::digest(&self.envelope()?))
    }
}

/// Any of the four stored object kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitObject {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
    Tag(Tag),
}

impl GitObject {
    /// Build the variant matching `object_type` from its payload
    pub fn deserialize(object_type: ObjectType, payload: Bytes) -> Result<Self> {
        Ok(match object_type {
            ObjectType::Blob => GitObject::Blob(Blob::deserialize(payload)?),
            ObjectType::Tree => GitObject::Tree(Tree::deserialize(payload)?),
            ObjectType::Commit => GitObject::Commit(Commit::deserialize(payload)?),
            ObjectType::Tag => GitObject::Tag(Tag::deserialize(payload)?),
        })
    }
}

impl Packable for GitObject {
    fn serialize(&self) -> Result<Bytes> {
        match self {
            GitObject::Blob(blob) => blob.serialize(),
            GitObject::Tree(tree) => tree.serialize(),
            GitObject::Commit(commit) => commit.serialize(),
            GitObject::Tag(tag) => tag.serialize(),
        }
    }
}

impl Object for GitObject {
    fn object_type(&self) -> ObjectType {
        match self {
            GitObject::Blob(_) => ObjectType::Blob,
            GitObject::Tree(_) => ObjectType::Tree,
            GitObject::Commit(_) => ObjectType::Commit,
            GitObject::Tag(_) => ObjectType::Tag,
        }
    }

    fn display(&self) -> String {
        match self {
            GitObject::Blob(blob) => blob.display(),
            GitObject::Tree(tree) => tree.display(),
            GitObject::Commit(commit) => commit.display(),
            GitObject::Tag(tag) => tag.display(),
        }
    }
}

impl From<Blob> for GitObject {
    fn from(blob: Blob) -> Self {
        GitObject::Blob(blob)
    }
}

impl From<Tree> for GitObject {
    fn from(tree: Tree) -> Self {
        GitObject::Tree(tree)
    }
}

impl From<Commit> for GitObject {
    fn from(commit: Commit) -> Self {
        GitObject::Commit(commit)
    }
}

impl From<Tag> for GitObject {
    fn from(tag: Tag) -> Self {
        GitObject::Tag(tag)
    }
}
