use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::revision;
use crate::commands::find_repository;
use anyhow::Context;
use std::io::Write;
use std::path::Path;

pub fn rev_parse(
    start: &Path,
    name: &str,
    object_type: Option<ObjectType>,
    writer: &mut impl Write,
) -> anyhow::Result<()> {
    let repository = find_repository(start)?;

    let object_id = revision::resolve(&repository, name, object_type, true)
        .with_context(|| format!("Unable to resolve {name}"))?;

    writeln!(writer, "{object_id}")?;

    Ok(())
}
