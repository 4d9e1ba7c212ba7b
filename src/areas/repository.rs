//! Repository handle, locator and builder
//!
//! A [`Repository`] ties a working tree to its metadata directory and the
//! configuration loaded from it. It is built either by [`Repository::locate`],
//! which validates an existing layout, or by [`Repository::create`], which lays
//! out a fresh one.

use crate::areas::config::Config;
use crate::areas::database::Database;
use crate::areas::refs::Refs;
use crate::errors::{Error, Result};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};

/// Name of the metadata directory inside a working tree
pub const GIT_DIR: &str = ".git";

/// Only layout version this implementation understands
pub const REPOSITORY_FORMAT_VERSION: i64 = 0;

const DEFAULT_BRANCH: &str = "master";
const LAYOUT: [&[&str]; 4] = [
    &["branches"],
    &["objects"],
    &["refs", "tags"],
    &["refs", "heads"],
];
const DESCRIPTION: &str = "Unnamed repository; edit this file 'description' to name the repository.\n";

#[derive(Debug, Clone)]
pub struct Repository {
    worktree: Box<Path>,
    git_dir: Box<Path>,
    config: Config,
}

impl Repository {
    /// Bind a repository handle to `path`
    ///
    /// Without `force` the metadata directory must exist and carry a readable
    /// configuration with a supported format version. With `force` nothing is
    /// checked and missing configuration falls back to [`Config::defaults`].
    pub fn open(path: &Path, force: bool) -> Result<Self> {
        let worktree = normalize(path)?;
        let git_dir = worktree.join(GIT_DIR);

        if force {
            let config = match Config::load(&git_dir.join("config")) {
                Ok(config) => config,
                Err(Error::Io(e)) if is_missing(&e) => Config::defaults(),
                Err(e) => return Err(e),
            };
            return Ok(Self::with_config(worktree, git_dir, config));
        }

        let invalid = |reason: String| Error::RepositoryInvalid {
            path: git_dir.clone(),
            reason,
        };

        if !git_dir.is_dir() {
            return Err(invalid("metadata directory is missing".to_string()));
        }

        let config_path = git_dir.join("config");
        if !config_path.exists() {
            return Err(invalid("configuration file missing".to_string()));
        }
        if config_path.is_dir() {
            return Err(invalid("configuration file is a directory".to_string()));
        }

        let config = Config::load(&config_path)
            .map_err(|e| invalid(format!("unreadable configuration: {e}")))?;

        match config.get_int("core", "repositoryformatversion") {
            Some(REPOSITORY_FORMAT_VERSION) => {}
            Some(version) => {
                return Err(invalid(format!(
                    "unsupported repositoryformatversion {version}"
                )));
            }
            None => {
                return Err(invalid(
                    "core.repositoryformatversion missing or not an integer".to_string(),
                ));
            }
        }

        Ok(Self::with_config(worktree, git_dir, config))
    }

    fn with_config(worktree: PathBuf, git_dir: PathBuf, config: Config) -> Self {
        Repository {
            worktree: worktree.into_boxed_path(),
            git_dir: git_dir.into_boxed_path(),
            config,
        }
    }

    /// Find the repository containing `start`
    ///
    /// Walks from `start` towards the filesystem root and opens the first
    /// ancestor holding a metadata directory. A metadata directory that fails
    /// validation is an error, not a reason to keep searching.
    pub fn locate(start: &Path, required: bool) -> Result<Option<Self>> {
        let start = normalize(start)?;
        let mut current = start.as_path();

        loop {
            trace!(path = %current.display(), "looking for metadata directory");

            if current.join(GIT_DIR).is_dir() {
                debug!(worktree = %current.display(), "found repository");
                return Self::open(current, false).map(Some);
            }

            let parent = current.parent().unwrap_or(current);
            if parent == current {
                break;
            }
            current = parent;
        }

        if required {
            Err(Error::NoRepositoryFound(start))
        } else {
            Ok(None)
        }
    }

    /// Lay out a new repository at `path`
    ///
    /// Refuses to touch a metadata directory that already has content. Steps run
    /// in order and are not rolled back if a later one fails.
    pub fn create(path: &Path) -> Result<Self> {
        let repository = Self::open(path, true)?;

        if repository.worktree.exists() {
            if !repository.worktree.is_dir() {
                return Err(Error::NotADirectory(repository.worktree.to_path_buf()));
            }

            if repository.git_dir.exists() {
                if !repository.git_dir.is_dir() {
                    return Err(Error::NotADirectory(repository.git_dir.to_path_buf()));
                }
                if std::fs::read_dir(&repository.git_dir)?.next().is_some() {
                    return Err(Error::TargetNotEmpty(repository.git_dir.to_path_buf()));
                }
            }
        } else {
            debug!(worktree = %repository.worktree.display(), "creating worktree");
            std::fs::create_dir_all(&repository.worktree)?;
        }

        for dir in LAYOUT {
            repository.dir_path(dir, true)?;
        }

        std::fs::write(repository.path_in(&["description"]), DESCRIPTION)?;
        std::fs::write(
            repository.path_in(&["HEAD"]),
            format!("ref: refs/heads/{DEFAULT_BRANCH}\n"),
        )?;

        let config = Config::defaults();
        config.save(&repository.path_in(&["config"]))?;

        debug!(git_dir = %repository.git_dir.display(), "initialized repository");

        Ok(Repository {
            config,
            ..repository
        })
    }

    pub fn worktree(&self) -> &Path {
        &self.worktree
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> Database {
        Database::new(self.path_in(&["objects"]).into_boxed_path())
    }

    pub fn refs(&self) -> Refs {
        Refs::new(self.git_dir.clone())
    }

    /// Join `parts` under the metadata directory
    pub fn path_in(&self, parts: &[&str]) -> PathBuf {
        parts
            .iter()
            .fold(self.git_dir.to_path_buf(), |path, part| path.join(part))
    }

    /// Path to a directory under the metadata directory
    ///
    /// Returns `None` when it does not exist and `mkdir` is false. Every
    /// existing segment on the way must be a directory.
    pub fn dir_path(&self, parts: &[&str], mkdir: bool) -> Result<Option<PathBuf>> {
        let path = self.path_in(parts);

        for ancestor in path.ancestors().take(parts.len() + 1) {
            if ancestor.exists() && !ancestor.is_dir() {
                return Err(Error::NotADirectory(ancestor.to_path_buf()));
            }
        }

        if path.is_dir() {
            return Ok(Some(path));
        }
        if !mkdir {
            return Ok(None);
        }

        trace!(path = %path.display(), "creating directory");
        std::fs::create_dir_all(&path)?;

        Ok(Some(path))
    }

    /// Path to a file under the metadata directory
    ///
    /// Only the parent directories are checked (and created with `mkdir`); the
    /// file itself may not exist yet.
    pub fn file_path(&self, parts: &[&str], mkdir: bool) -> Result<Option<PathBuf>> {
        let Some((_, dirs)) = parts.split_last() else {
            return Ok(Some(self.git_dir.to_path_buf()));
        };

        Ok(self
            .dir_path(dirs, mkdir)?
            .map(|_| self.path_in(parts)))
    }
}

/// The path or one of its parents does not exist (yet)
fn is_missing(error: &std::io::Error) -> bool {
    matches!(
        error.kind(),
        std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
    )
}

/// Absolute, lexically normalized form of `path` (no symlink resolution)
fn normalize(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut normalized = PathBuf::new();

    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn dir() -> TempDir {
        TempDir::new().unwrap()
    }

    #[test]
    fn path_in_joins_under_git_dir() {
        let repository = Repository::open(Path::new("/a"), true).unwrap();

        assert_eq!(
            repository.path_in(&["test", "here"]),
            PathBuf::from("/a/.git/test/here")
        );
    }

    #[rstest]
    fn forced_open_without_config_uses_defaults(dir: TempDir) {
        let repository = Repository::open(dir.path(), true).unwrap();

        assert_eq!(repository.config(), &Config::defaults());
    }

    #[rstest]
    fn forced_open_reports_unparsable_config(dir: TempDir) {
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join(".git").join("config"), "not a config line\n").unwrap();

        let result = Repository::open(dir.path(), true);
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[rstest]
    fn file_path_creates_parents_on_request(dir: TempDir) {
        let repository = Repository::open(dir.path(), true).unwrap();

        assert_eq!(repository.file_path(&["test", "here", "a"], false).unwrap(), None);

        let path = repository.file_path(&["test", "here", "a"], true).unwrap();
        assert_eq!(path, Some(dir.path().join(".git/test/here/a")));
        assert!(dir.path().join(".git/test/here").is_dir());
        assert!(!dir.path().join(".git/test/here/a").exists());
    }

    #[rstest]
    fn file_in_the_way_is_not_a_directory(dir: TempDir) {
        let repository = Repository::create(dir.path()).unwrap();
        std::fs::write(repository.path_in(&["refs", "remotes"]), b"").unwrap();

        let result = repository.dir_path(&["refs", "remotes", "origin"], true);
        assert!(matches!(result, Err(Error::NotADirectory(path)) if path.ends_with("refs/remotes")));
    }

    #[rstest]
    fn create_writes_the_skeleton(dir: TempDir) {
        let repository = Repository::create(dir.path()).unwrap();
        let git_dir = dir.path().join(".git");

        for sub in ["branches", "objects", "refs/tags", "refs/heads"] {
            assert!(git_dir.join(sub).is_dir(), "{sub} missing");
        }
        assert_eq!(
            std::fs::read_to_string(git_dir.join("HEAD")).unwrap(),
            "ref: refs/heads/master\n"
        );
        assert_eq!(
            std::fs::read_to_string(git_dir.join("description")).unwrap(),
            DESCRIPTION
        );
        assert_eq!(repository.config(), &Config::defaults());
    }

    #[rstest]
    fn create_makes_missing_worktree(dir: TempDir) {
        let target = dir.path().join("nested").join("repo");
        Repository::create(&target).unwrap();

        assert!(target.join(".git").join("objects").is_dir());
    }

    #[rstest]
    fn create_refuses_non_empty_metadata(dir: TempDir) {
        Repository::create(dir.path()).unwrap();

        let result = Repository::create(dir.path());
        assert!(matches!(result, Err(Error::TargetNotEmpty(_))));
    }

    #[rstest]
    fn create_accepts_empty_metadata(dir: TempDir) {
        std::fs::create_dir(dir.path().join(".git")).unwrap();

        assert!(Repository::create(dir.path()).is_ok());
    }

    #[rstest]
    fn create_on_a_file_is_not_a_directory(dir: TempDir) {
        let file = dir.path().join("file");
        std::fs::write(&file, b"content").unwrap();

        let result = Repository::create(&file);
        assert!(matches!(result, Err(Error::NotADirectory(_))));
    }

    #[rstest]
    fn open_rejects_unsupported_version(dir: TempDir) {
        let repository = Repository::create(dir.path()).unwrap();
        let mut config = Config::defaults();
        config.set("core", "repositoryformatversion", "1");
        config.save(&repository.path_in(&["config"])).unwrap();

        let result = Repository::open(dir.path(), false);
        assert!(matches!(result, Err(Error::RepositoryInvalid { .. })));
    }

    #[rstest]
    fn open_rejects_config_directory(dir: TempDir) {
        std::fs::create_dir_all(dir.path().join(".git").join("config")).unwrap();

        let result = Repository::open(dir.path(), false);
        assert!(matches!(result, Err(Error::RepositoryInvalid { .. })));
    }

    #[rstest]
    fn locate_walks_up_to_the_worktree(dir: TempDir) {
        let repository = Repository::create(dir.path()).unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let found = Repository::locate(&nested, true).unwrap().unwrap();
        assert_eq!(found.worktree(), repository.worktree());
    }

    #[rstest]
    fn locate_normalizes_parent_components(dir: TempDir) {
        let repository = Repository::create(dir.path()).unwrap();
        let start = dir.path().join("missing").join("..").join("also-missing");

        let found = Repository::locate(&start, true).unwrap().unwrap();
        assert_eq!(found.worktree(), repository.worktree());
    }

    #[rstest]
    fn locate_reports_invalid_repository_instead_of_searching(dir: TempDir) {
        std::fs::create_dir(dir.path().join(".git")).unwrap();

        let result = Repository::locate(dir.path(), false);
        assert!(matches!(result, Err(Error::RepositoryInvalid { .. })));
    }
}
