use git2::{ObjectType, Repository};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, SyncError};

/// Source of historical file contents
pub trait RevisionReader {
    /// Text of `path` at `revision`, or `None` if the path did not exist there
    fn read_file_at_revision(&self, path: &Path, revision: &str) -> Result<Option<String>>;
}

/// Reads revisions from the git repository that contains the locale file
pub struct GitRevisionReader {
    repo: Repository,
}

impl GitRevisionReader {
    /// Open the repository enclosing `start` (a file or a directory)
    pub fn discover(start: &Path) -> Result<Self> {
        let dir = if start.is_file() {
            start.parent().unwrap_or_else(|| Path::new("."))
        } else {
            start
        };
        let dir = if dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            dir
        };
        let repo = Repository::discover(dir)?;
        Ok(Self { repo })
    }

    pub fn from_repository(repo: Repository) -> Self {
        Self { repo }
    }

    /// Path of `path` relative to the work tree, with `/` separators
    fn repo_relative(&self, path: &Path) -> Result<PathBuf> {
        let workdir = self
            .repo
            .workdir()
            .ok_or_else(|| SyncError::history("repository has no working directory"))?;
        let workdir = workdir.canonicalize()?;

        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        // The file may be gone from disk; canonicalise its directory instead.
        let absolute = match (absolute.parent(), absolute.file_name()) {
            (Some(parent), Some(name)) if parent.exists() => parent.canonicalize()?.join(name),
            _ => absolute,
        };

        absolute
            .strip_prefix(&workdir)
            .map(Path::to_path_buf)
            .map_err(|_| {
                SyncError::history(format!(
                    "'{}' is outside the repository at '{}'",
                    path.display(),
                    workdir.display()
                ))
            })
    }
}

impl RevisionReader for GitRevisionReader {
    fn read_file_at_revision(&self, path: &Path, revision: &str) -> Result<Option<String>> {
        let relative = self.repo_relative(path)?;
        let commit = self.repo.revparse_single(revision)?.peel_to_commit()?;
        let tree = commit.tree()?;

        let tree_entry = match tree.get_path(&relative) {
            Ok(entry) => entry,
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                debug!("'{}' does not exist at {}", relative.display(), revision);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        if tree_entry.kind() != Some(ObjectType::Blob) {
            return Ok(None);
        }

        let object = tree_entry.to_object(&self.repo)?;
        let blob = object
            .as_blob()
            .ok_or_else(|| SyncError::history(format!("{} is not a file", relative.display())))?;
        let text = std::str::from_utf8(blob.content()).map_err(|_| {
            SyncError::history(format!(
                "'{}' at {} is not valid UTF-8",
                relative.display(),
                revision
            ))
        })?;

        Ok(Some(text.to_string()))
    }
}
