use crate::areas::repository::Repository;
use anyhow::Context;
use std::io::Write;
use std::path::Path;

pub fn init(path: &Path, writer: &mut impl Write) -> anyhow::Result<()> {
    let repository = Repository::create(path)
        .with_context(|| format!("Failed to initialize repository at {}", path.display()))?;

    writeln!(
        writer,
        "Initialized empty Git repository in {}",
        repository.git_dir().display()
    )?;

    Ok(())
}
