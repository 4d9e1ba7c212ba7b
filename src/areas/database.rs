//! Loose object database
//!
//! Every object lives in its own zlib-compressed file at
//! `objects/<first-2-hex>/<remaining-38-hex>`. The file holds the envelope
//! `<type> <decimal-size>\0<payload>`, and the object id is the SHA-1 of that
//! envelope before compression.
//!
//! Writes go to a temporary file in the target directory and are renamed into
//! place, so readers never observe a half-written object and concurrent writers
//! of the same object converge on one file.

use crate::areas::repository::Repository;
use crate::artifacts::objects::object::{GitObject, Object};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};
use bytes::Bytes;
use fake::rand;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Fresh temp names tried before a write gives up
const MAX_TEMP_NAME_ATTEMPTS: usize = 8;

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn object_path(&self, object_id: &ObjectId) -> PathBuf {
        self.path.join(object_id.to_path())
    }

    pub fn exists(&self, object_id: &ObjectId) -> bool {
        self.object_path(object_id).is_file()
    }

    /// Store `object`, returning its id
    ///
    /// Storing an object that is already present leaves the existing file untouched.
    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        let envelope = object.envelope()?;
        let object_id = ObjectId::digest(&envelope);
        let object_path = self.object_path(&object_id);

        if object_path.is_dir() {
            return Err(Error::NotAFile(object_path));
        }
        if object_path.exists() {
            trace!(oid = %object_id, "object already stored");
            return Ok(object_id);
        }

        let object_dir = object_path
            .parent()
            .ok_or_else(|| Error::NotADirectory(object_path.clone()))?;
        // create_dir_all tolerates a concurrent writer creating the same directory
        std::fs::create_dir_all(object_dir)?;

        self.write_object(object_dir, &object_path, envelope)?;
        debug!(oid = %object_id, object_type = %object.object_type(), "stored object");

        Ok(object_id)
    }

    /// Load and decode the object stored under `object_id`
    pub fn load(&self, object_id: &ObjectId) -> Result<GitObject> {
        let (object_type, payload) = self.load_raw(object_id)?;

        GitObject::deserialize(object_type, payload)
    }

    /// Load an object's type and undecoded payload
    pub fn load_raw(&self, object_id: &ObjectId) -> Result<(ObjectType, Bytes)> {
        let envelope = self.read_object(object_id)?;

        Self::parse_envelope(object_id, envelope)
    }

    pub fn object_type(&self, object_id: &ObjectId) -> Result<ObjectType> {
        Ok(self.load_raw(object_id)?.0)
    }

    /// Split an envelope into its type and payload, checking the recorded size
    fn parse_envelope(object_id: &ObjectId, envelope: Bytes) -> Result<(ObjectType, Bytes)> {
        let space = envelope
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| Error::malformed(format!("{object_id}: missing type separator")))?;
        let nul = envelope
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::malformed(format!("{object_id}: missing size terminator")))?;

        if nul < space {
            return Err(Error::malformed(format!(
                "{object_id}: size terminator before type separator"
            )));
        }

        let size = std::str::from_utf8(&envelope[space + 1..nul])
            .ok()
            .filter(|size| !size.is_empty() && size.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|size| size.parse::<usize>().ok())
            .ok_or_else(|| Error::malformed(format!("{object_id}: bad size field")))?;

        let payload = envelope.slice(nul + 1..);
        if size != payload.len() {
            return Err(Error::malformed(format!(
                "{object_id}: bad length, header says {size} but payload has {}",
                payload.len()
            )));
        }

        let object_type =
            ObjectType::parse(&envelope[..space]).ok_or_else(|| Error::UnknownObjectType {
                oid: object_id.clone(),
                object_type: String::from_utf8_lossy(&envelope[..space]).into_owned(),
            })?;

        Ok((object_type, payload))
    }

    fn read_object(&self, object_id: &ObjectId) -> Result<Bytes> {
        let object_path = self.object_path(object_id);

        if !object_path.exists() {
            return Err(Error::ObjectNotFound(object_id.clone()));
        }
        if object_path.is_dir() {
            return Err(Error::NotAFile(object_path));
        }

        let compressed = std::fs::read(&object_path)?;
        Self::decompress(&compressed)
            .map_err(|e| Error::malformed(format!("{object_id}: cannot decompress: {e}")))
    }

    fn write_object(&self, object_dir: &Path, object_path: &Path, envelope: Bytes) -> Result<()> {
        let content = Self::compress(&envelope)?;
        let names = std::iter::repeat_with(Self::generate_temp_name).take(MAX_TEMP_NAME_ATTEMPTS);
        let (temp, mut file) = Self::open_temp_file(object_dir, names)?;

        file.write_all(&content)?;
        drop(file);

        // rename the temp file to the object file to make it atomic
        std::fs::rename(temp.path(), object_path)?;
        temp.persist();

        Ok(())
    }

    /// Create the first of `names` that is not taken in `object_dir`
    ///
    /// A taken name belongs to a concurrent writer and is left alone.
    fn open_temp_file(
        object_dir: &Path,
        names: impl IntoIterator<Item = String>,
    ) -> Result<(TempObject, std::fs::File)> {
        let mut last_error = None;

        for name in names {
            let path = object_dir.join(name);
            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(file) => return Ok((TempObject::new(path), file)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    trace!(path = %path.display(), "temp object name taken, retrying");
                    last_error = Some(e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(last_error
            .unwrap_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "no free temporary object name",
                )
            })
            .into())
    }

    fn compress(data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data)?;

        Ok(encoder.finish()?)
    }

    fn decompress(data: &[u8]) -> std::io::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed)?;

        Ok(decompressed.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }

    /// Find all objects whose id starts with the given hex prefix
    ///
    /// Prefixes of 2+ characters only scan their own fan-out directory; shorter
    /// ones scan all 256.
    pub fn find_objects_by_prefix(&self, prefix: &str) -> Result<Vec<ObjectId>> {
        let prefix = prefix.to_ascii_lowercase();
        let mut matches = Vec::new();

        if !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(matches);
        }

        let dir_names = if prefix.len() >= 2 {
            vec![prefix[..2].to_string()]
        } else {
            (0..=255u8).map(|i| format!("{i:02x}")).collect()
        };

        for dir_name in dir_names {
            let dir_path = self.path.join(&dir_name);
            if !dir_path.is_dir() {
                continue;
            }

            for entry in std::fs::read_dir(&dir_path)? {
                let entry = entry?;
                let full_oid = format!("{}{}", dir_name, entry.file_name().to_string_lossy());

                // temp files and other strays fail to parse and are skipped
                if full_oid.starts_with(&prefix)
                    && let Ok(oid) = ObjectId::try_parse(&full_oid)
                {
                    matches.push(oid);
                }
            }
        }

        matches.sort();
        Ok(matches)
    }
}

/// Temporary object file, removed on drop unless persisted
struct TempObject {
    path: PathBuf,
    persisted: bool,
}

impl TempObject {
    fn new(path: PathBuf) -> Self {
        TempObject {
            path,
            persisted: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn persist(mut self) {
        self.persisted = true;
    }
}

impl Drop for TempObject {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Hash `object` without storing it
pub fn hash_object(object: &impl Object) -> Result<ObjectId> {
    object.object_id()
}

/// Store `object` in `repository`, or only hash it when there is no repository
pub fn write_object(repository: Option<&Repository>, object: &impl Object) -> Result<ObjectId> {
    match repository {
        Some(repository) => repository.database().store(object),
        None => hash_object(object),
    }
}

pub fn read_object(repository: &Repository, object_id: &ObjectId) -> Result<GitObject> {
    repository.database().load(object_id)
}
