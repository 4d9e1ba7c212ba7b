//! Tree object
//!
//! Trees represent directory snapshots. They contain entries for files (blobs)
//! and subdirectories (other trees), along with their names and modes.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<mode> <name>\0<20-byte-sha1>`
//!
//! ## Ordering
//!
//! Entries may be held in any order in memory. Serialization sorts them the way
//! git does: by name, with tree entries compared as if their name ended in `/`.
//! That keeps hashes compatible with other implementations of the format.
//! Stored trees must already be in that order; anything else is malformed,
//! since re-sorting it would change the object's id.

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::RAW_OBJECT_ID_LENGTH;
use crate::errors::{Error, Result};
use bytes::Bytes;
use derive_new::new;
use std::io::Write;

/// Mode used for subdirectory entries
pub const TREE_MODE: &str = "40000";

/// Mode used for submodule (gitlink) entries, which point at a commit
pub const GITLINK_MODE: &str = "160000";

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    pub mode: String,
    pub name: String,
    pub oid: ObjectId,
}

impl TreeEntry {
    pub fn is_tree(&self) -> bool {
        self.mode.trim_start_matches('0') == TREE_MODE
    }

    /// Type of the object the entry points at
    pub fn object_type(&self) -> ObjectType {
        if self.is_tree() {
            ObjectType::Tree
        } else if self.mode == GITLINK_MODE {
            ObjectType::Commit
        } else {
            ObjectType::Blob
        }
    }

    fn sort_key(&self) -> Vec<u8> {
        let mut key = self.name.as_bytes().to_vec();
        if self.is_tree() {
            key.push(b'/');
        }
        key
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, new)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn push(&mut self, entry: TreeEntry) {
        self.entries.push(entry);
    }

    /// Entries in their in-memory order
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// Entries in canonical (serialization) order
    pub fn sorted_entries(&self) -> Vec<&TreeEntry> {
        let mut entries = self.entries.iter().collect::<Vec<_>>();
        entries.sort_by_cached_key(|entry| entry.sort_key());
        entries
    }
}

impl Packable for Tree {
    fn serialize(&self) -> Result<Bytes> {
        let mut content = Vec::new();

        for entry in self.sorted_entries() {
            write!(content, "{} {}", entry.mode, entry.name)?;
            content.push(0);
            entry.oid.write_h40_to(&mut content)?;
        }

        Ok(content.into())
    }
}

impl Unpackable for Tree {
    fn deserialize(payload: Bytes) -> Result<Self> {
        let mut entries: Vec<TreeEntry> = Vec::new();
        let mut rest = &payload[..];

        while !rest.is_empty() {
            let space = rest
                .iter()
                .position(|&b| b == b' ')
                .ok_or_else(|| Error::malformed("tree entry without mode separator"))?;
            let nul = rest
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| Error::malformed("tree entry without name terminator"))?;

            if nul < space {
                return Err(Error::malformed("tree entry name terminator before mode"));
            }

            let mode = std::str::from_utf8(&rest[..space])
                .map_err(|_| Error::malformed("tree entry mode is not utf-8"))?;
            let name = std::str::from_utf8(&rest[space + 1..nul])
                .map_err(|_| Error::malformed("tree entry name is not utf-8"))?;

            if mode.is_empty() || name.is_empty() {
                return Err(Error::malformed("tree entry with empty mode or name"));
            }

            let oid = ObjectId::read_h40_from(&rest[nul + 1..])?;
            let entry = TreeEntry::new(mode.to_string(), name.to_string(), oid);

            if let Some(previous) = entries.last()
                && previous.sort_key() >= entry.sort_key()
            {
                return Err(Error::malformed(format!(
                    "tree entry '{}' is out of order after '{}'",
                    entry.name, previous.name
                )));
            }
            entries.push(entry);

            rest = &rest[nul + 1 + RAW_OBJECT_ID_LENGTH..];
        }

        Ok(Tree::new(entries))
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.sorted_entries()
            .iter()
            .map(|entry| {
                format!(
                    "{:0>6} {} {}\t{}",
                    entry.mode,
                    entry.object_type(),
                    entry.oid,
                    entry.name
                )
            })
            .collect::<Vec<String>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn oid() -> ObjectId {
        ObjectId::digest(b"tree entry")
    }

    #[rstest]
    fn serialized_entries_use_raw_ids(oid: ObjectId) {
        let tree = Tree::new(vec![TreeEntry::new("100644".into(), "a.txt".into(), oid.clone())]);

        let mut expected = b"100644 a.txt\0".to_vec();
        oid.write_h40_to(&mut expected).unwrap();

        assert_eq!(&tree.serialize().unwrap()[..], &expected[..]);
    }

    #[rstest]
    fn directories_sort_as_if_suffixed_with_slash(oid: ObjectId) {
        let tree = Tree::new(vec![
            TreeEntry::new(TREE_MODE.into(), "foo".into(), oid.clone()),
            TreeEntry::new("100644".into(), "foo.txt".into(), oid.clone()),
            TreeEntry::new("100644".into(), "foo-bar".into(), oid.clone()),
        ]);

        let names = tree
            .sorted_entries()
            .iter()
            .map(|entry| entry.name.as_str())
            .collect::<Vec<_>>();

        // '-' (0x2d) < '.' (0x2e) < '/' (0x2f)
        assert_eq!(names, vec!["foo-bar", "foo.txt", "foo"]);
    }

    #[rstest]
    fn deserialize_reads_what_serialize_writes(oid: ObjectId) {
        let tree = Tree::new(vec![
            TreeEntry::new("100644".into(), "README".into(), oid.clone()),
            TreeEntry::new(TREE_MODE.into(), "src".into(), ObjectId::digest(b"src")),
        ]);

        let bytes = tree.serialize().unwrap();
        let parsed = Tree::deserialize(bytes.clone()).unwrap();

        assert_eq!(parsed, tree);
        assert_eq!(parsed.serialize().unwrap(), bytes);
    }

    #[rstest]
    fn truncated_digest_is_malformed(oid: ObjectId) {
        let tree = Tree::new(vec![TreeEntry::new("100644".into(), "a".into(), oid)]);
        let bytes = tree.serialize().unwrap();

        let result = Tree::deserialize(bytes.slice(..bytes.len() - 1));
        assert!(matches!(result, Err(Error::MalformedObject(_))));
    }

    #[test]
    fn missing_separators_are_malformed() {
        let result = Tree::deserialize(Bytes::from_static(b"100644"));
        assert!(matches!(result, Err(Error::MalformedObject(_))));

        let result = Tree::deserialize(Bytes::from_static(b"100644 name-without-nul"));
        assert!(matches!(result, Err(Error::MalformedObject(_))));
    }

    #[rstest]
    fn out_of_order_entries_are_malformed(oid: ObjectId) {
        let mut payload = Vec::new();
        for name in ["b", "a"] {
            write!(payload, "100644 {name}").unwrap();
            payload.push(0);
            oid.write_h40_to(&mut payload).unwrap();
        }

        let result = Tree::deserialize(payload.into());
        assert!(matches!(result, Err(Error::MalformedObject(_))));
    }

    #[rstest]
    fn duplicate_names_are_malformed(oid: ObjectId) {
        let mut payload = Vec::new();
        for _ in 0..2 {
            payload.extend_from_slice(b"100644 a\0");
            oid.write_h40_to(&mut payload).unwrap();
        }

        let result = Tree::deserialize(payload.into());
        assert!(matches!(result, Err(Error::MalformedObject(_))));
    }

    #[rstest]
    fn pushed_entries_keep_insertion_order(oid: ObjectId) {
        let mut tree = Tree::default();
        tree.push(TreeEntry::new("100644".into(), "zeta".into(), oid.clone()));
        tree.push(TreeEntry::new("100644".into(), "alpha".into(), oid.clone()));

        let names = tree
            .entries()
            .iter()
            .map(|entry| entry.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["zeta", "alpha"]);

        let parsed = Tree::deserialize(tree.serialize().unwrap()).unwrap();
        assert_eq!(parsed.entries()[0].name, "alpha");
    }

    #[rstest]
    fn display_names_the_target_type(oid: ObjectId) {
        let tree = Tree::new(vec![
            TreeEntry::new("100644".into(), "file".into(), oid.clone()),
            TreeEntry::new(GITLINK_MODE.into(), "module".into(), oid.clone()),
            TreeEntry::new(TREE_MODE.into(), "src".into(), oid.clone()),
        ]);

        assert_eq!(
            tree.display(),
            format!(
                "100644 blob {oid}\tfile\n160000 commit {oid}\tmodule\n040000 tree {oid}\tsrc"
            )
        );
    }

    #[test]
    fn empty_tree_serializes_to_nothing() {
        assert!(Tree::default().serialize().unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn insertion_order_does_not_change_bytes(
            names in proptest::collection::btree_set("[a-z]{1,8}", 1..12),
            seed in any::<u64>(),
        ) {
            let entries = names
                .iter()
                .map(|name| TreeEntry::new("100644".into(), name.clone(), ObjectId::digest(name.as_bytes())))
                .collect::<Vec<_>>();

            let mut shuffled = entries.clone();
            let len = shuffled.len();
            shuffled.rotate_left(seed as usize % len);
            shuffled.reverse();

            let sorted = Tree::new(entries).serialize().unwrap();
            let unsorted = Tree::new(shuffled).serialize().unwrap();
            prop_assert_eq!(sorted, unsorted);
        }
    }
}
