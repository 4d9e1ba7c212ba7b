use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::revision;
use crate::commands::find_repository;
use anyhow::Context;
use std::io::Write;
use std::path::Path;

/// Print the object `name` refers to, peeling tags until `object_type` is reached
///
/// Writes the raw payload, or the human-readable form when `pretty` is set.
pub fn cat_file(
    start: &Path,
    object_type: ObjectType,
    name: &str,
    pretty: bool,
    writer: &mut impl Write,
) -> anyhow::Result<()> {
    let repository = find_repository(start)?;

    let object_id = revision::resolve(&repository, name, Some(object_type), true)
        .with_context(|| format!("Not a valid {object_type} name {name}"))?;
    let object = repository
        .database()
        .load(&object_id)
        .with_context(|| format!("Unable to read object {object_id}"))?;

    if pretty {
        writeln!(writer, "{}", object.display())?;
    } else {
        writer.write_all(&object.serialize()?)?;
    }

    Ok(())
}
