use crate::areas::database;
use crate::artifacts::objects::object::GitObject;
use crate::artifacts::objects::object_type::ObjectType;
use crate::commands::find_repository;
use anyhow::Context;
use std::io::Write;
use std::path::Path;

/// Hash the file at `file` as an object of `object_type`, storing it when `write` is set
///
/// Non-blob content must already be in its canonical payload form.
pub fn hash_object(
    start: &Path,
    file: &Path,
    object_type: ObjectType,
    write: bool,
    writer: &mut impl Write,
) -> anyhow::Result<()> {
    let content = std::fs::read(file)
        .with_context(|| format!("Unable to read file {}", file.display()))?;
    let object = GitObject::deserialize(object_type, content.into())
        .with_context(|| format!("{} is not a valid {object_type}", file.display()))?;

    let repository = if write {
        Some(find_repository(start)?)
    } else {
        None
    };

    let object_id = database::write_object(repository.as_ref(), &object)
        .context("Unable to write object")?;

    writeln!(writer, "{object_id}")?;

    Ok(())
}
