use assert_fs::fixture::{FileWriteStr, PathChild};
use predicates::prelude::predicate;

mod common;

#[test]
fn init_repository_successfully() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let dir_absolute_path = dir.path().display().to_string();

    let mut sut = common::tiger();
    sut.arg("init").arg(dir.path());

    sut.assert()
        .success()
        .stdout(predicate::str::is_match(
            r"^Initialized empty Git repository in .+\.git\n$",
        )?)
        .stdout(predicate::str::contains(dir_absolute_path));

    for sub in ["branches", "objects", "refs/heads", "refs/tags"] {
        assert!(dir.path().join(".git").join(sub).is_dir(), "{sub} missing");
    }
    pretty_assertions::assert_eq!(
        std::fs::read_to_string(dir.path().join(".git/HEAD"))?,
        "ref: refs/heads/master\n"
    );
    pretty_assertions::assert_eq!(
        std::fs::read_to_string(dir.path().join(".git/config"))?,
        "[core]\n\trepositoryformatversion = 0\n\tfilemode = false\n\tbare = false\n"
    );

    Ok(())
}

#[test]
fn init_defaults_to_current_directory() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;

    common::init_repository(dir.path());

    assert!(dir.path().join(".git").join("objects").is_dir());

    Ok(())
}

#[test]
fn init_creates_missing_directories() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let target = dir.path().join("deeply").join("nested");

    common::tiger().arg("init").arg(&target).assert().success();

    assert!(target.join(".git").join("refs").join("heads").is_dir());

    Ok(())
}

#[test]
fn init_twice_is_refused() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    common::init_repository(dir.path());

    common::tiger()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to initialize"));

    Ok(())
}

#[test]
fn init_over_a_file_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let file = dir.child("file.txt");
    file.write_str(&common::generated_content())?;

    common::tiger()
        .arg("init")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a directory"));

    Ok(())
}
