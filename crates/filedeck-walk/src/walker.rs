//! JWalk-based pre-order tree walker.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jwalk::{Parallelism, WalkDir};

use filedeck_core::{Entry, FsError};

/// One item produced by a walk.
#[derive(Debug, Clone)]
pub struct WalkEntry {
    /// Snapshot of the entry.
    pub entry: Entry,
    /// Depth below the walk root (root = 0).
    pub depth: usize,
    /// Path relative to the walk root (empty for the root itself).
    pub relative: PathBuf,
}

impl WalkEntry {
    /// Absolute path of the entry.
    pub fn path(&self) -> &Path {
        &self.entry.path
    }

    /// Check if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.entry.is_dir()
    }

    /// Relative path with components joined by `/`.
    pub fn relative_name(&self) -> String {
        self.relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Restartable walker over a directory subtree.
///
/// Symbolic links are reported but never followed, so a walk always
/// terminates even when the tree contains link cycles.
#[derive(Debug, Clone)]
pub struct TreeWalker {
    root: PathBuf,
    threads: usize,
    include_hidden: bool,
    max_depth: Option<usize>,
}

impl TreeWalker {
    /// Create a walker rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            threads: 0,
            include_hidden: true,
            max_depth: None,
        }
    }

    /// Number of walker threads (0 = auto-detect, 1 = serial).
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Whether dot-files are yielded.
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Maximum depth below the root (None = unlimited).
    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// The walk root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start a fresh walk. Walks share no state.
    pub fn walk(&self) -> Walk {
        let metadata = match fs::symlink_metadata(&self.root) {
            Ok(m) => m,
            Err(e) => return Walk::single(Err(FsError::io(&self.root, e))),
        };

        let root_entry = Entry::from_metadata(&self.root, &metadata);
        if !root_entry.is_dir() {
            return Walk::single(Ok(WalkEntry {
                entry: root_entry,
                depth: 0,
                relative: PathBuf::new(),
            }));
        }

        let parallelism = match self.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_millis(100),
            },
            1 => Parallelism::Serial,
            n => Parallelism::RayonNewPool(n),
        };

        let walker = WalkDir::new(&self.root)
            .parallelism(parallelism)
            .skip_hidden(!self.include_hidden)
            .follow_links(false)
            .sort(true)
            .min_depth(0)
            .max_depth(self.max_depth.unwrap_or(usize::MAX));

        let root = self.root.clone();
        let iter = walker
            .into_iter()
            .map(move |result| -> Result<WalkEntry, FsError> {
                let mut dir_entry = result.map_err(|err| walk_error(&root, err))?;
                let path = dir_entry.path();

                // A directory whose children could not be listed is unreadable
                if let Some(err) = dir_entry.read_children_error.take() {
                    return Err(walk_error(&path, err));
                }

                let metadata = dir_entry.metadata().map_err(|err| walk_error(&path, err))?;
                let relative = path
                    .strip_prefix(&root)
                    .map(Path::to_path_buf)
                    .unwrap_or_default();

                Ok(WalkEntry {
                    entry: Entry::from_metadata(path, &metadata),
                    depth: dir_entry.depth,
                    relative,
                })
            });

        Walk {
            inner: Box::new(iter),
        }
    }
}

/// Lazy pre-order sequence of walk results.
///
/// Errors are yielded in place of the entry that failed; consumers decide
/// whether to stop or skip.
pub struct Walk {
    inner: Box<dyn Iterator<Item = Result<WalkEntry, FsError>>>,
}

impl Walk {
    fn single(item: Result<WalkEntry, FsError>) -> Self {
        Self {
            inner: Box::new(std::iter::once(item)),
        }
    }

    /// Drop failed entries, logging them, for best-effort listing.
    pub fn skip_errors(self) -> impl Iterator<Item = WalkEntry> {
        self.filter_map(|result| match result {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable entry");
                None
            }
        })
    }
}

impl Iterator for Walk {
    type Item = Result<WalkEntry, FsError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl std::fmt::Debug for Walk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walk").finish_non_exhaustive()
    }
}

/// Convert a jwalk error into an `FsError`.
fn walk_error(fallback: &Path, err: jwalk::Error) -> FsError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| fallback.to_path_buf());
    let message = err.to_string();

    match err.into_io_error() {
        Some(source) => FsError::io(path, source),
        None => FsError::Io {
            path,
            source: io::Error::other(message),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_name_uses_forward_slashes() {
        let temp = tempfile::tempdir().unwrap();
        let entry = Entry::from_path(temp.path()).unwrap();
        let walk_entry = WalkEntry {
            entry,
            depth: 2,
            relative: PathBuf::from("photos").join("2024").join("a.jpg"),
        };
        assert_eq!(walk_entry.relative_name(), "photos/2024/a.jpg");
    }

    #[test]
    fn test_walk_missing_root_yields_single_error() {
        let temp = tempfile::tempdir().unwrap();
        let results: Vec<_> = TreeWalker::new(temp.path().join("missing")).walk().collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(FsError::NotFound { .. })));
    }

    #[test]
    fn test_walk_file_root_yields_itself() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("single.txt");
        fs::write(&file, b"x").unwrap();

        let entries: Vec<_> = TreeWalker::new(&file).walk().skip_errors().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].depth, 0);
        assert!(entries[0].relative.as_os_str().is_empty());
        assert_eq!(entries[0].relative_name(), "");
    }
}
