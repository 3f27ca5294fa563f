//! Destination resolution and collision handling.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use filedeck_core::{ConflictPolicy, FsError};

/// Where an entry is going, resolved against the live filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Placement {
    /// The source with its parent directory canonicalized.
    pub source: PathBuf,
    /// `destination/name`, before any collision handling.
    pub target: PathBuf,
}

impl Placement {
    /// Resolve `source` into `destination_dir`, rejecting self-nesting.
    ///
    /// Fails with `NotFound` when the source has vanished since its snapshot.
    pub(crate) fn resolve(source: &Path, destination_dir: &Path) -> Result<Self, FsError> {
        fs::symlink_metadata(source).map_err(|e| FsError::io(source, e))?;

        let source = absolute_location(source)?;
        let Some(name) = source.file_name() else {
            return Err(FsError::invalid_name(
                source.to_string_lossy(),
                "has no file name",
            ));
        };

        let destination_dir =
            fs::canonicalize(destination_dir).map_err(|e| FsError::io(destination_dir, e))?;
        let target = destination_dir.join(name);

        if target != source && target.starts_with(&source) {
            return Err(FsError::DestinationInsideSource {
                source_path: source,
                destination: target,
            });
        }

        Ok(Self { source, target })
    }

    /// Check if the entry would land on itself.
    pub(crate) fn is_same_path(&self) -> bool {
        self.source == self.target
    }
}

/// Canonicalize the parent of `path` without resolving a final symlink.
pub(crate) fn absolute_location(path: &Path) -> Result<PathBuf, FsError> {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            let parent = fs::canonicalize(parent).map_err(|e| FsError::io(parent, e))?;
            Ok(parent.join(name))
        }
        _ => fs::canonicalize(path).map_err(|e| FsError::io(path, e)),
    }
}

/// Apply the collision policy to a target path.
///
/// `Overwrite` returns the target unchanged; files are later truncated and
/// directories merged.
pub(crate) fn resolve_conflict(policy: ConflictPolicy, target: PathBuf) -> Result<PathBuf, FsError> {
    if !path_exists(&target)? {
        return Ok(target);
    }

    match policy {
        ConflictPolicy::Overwrite => Ok(target),
        ConflictPolicy::Fail => Err(FsError::AlreadyExists { path: target }),
        ConflictPolicy::AutoRename => Ok(auto_rename_path(&target)),
    }
}

/// Check for anything at `path`, dangling symlinks included.
pub(crate) fn path_exists(path: &Path) -> Result<bool, FsError> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(FsError::io(path, e)),
    }
}

/// Generate an auto-renamed path to avoid conflicts.
///
/// For "file.txt", tries "file (1).txt", "file (2).txt", etc.
pub fn auto_rename_path(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new(""));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path.extension().map(|e| e.to_string_lossy().into_owned());

    let candidate = |suffix: &str| -> PathBuf {
        let name = match &extension {
            Some(ext) => format!("{stem}{suffix}.{ext}"),
            None => format!("{stem}{suffix}"),
        };
        parent.join(name)
    };

    for i in 1..1000 {
        let new_path = candidate(&format!(" ({i})"));
        if !matches!(path_exists(&new_path), Ok(true)) {
            return new_path;
        }
    }

    // Fallback: use timestamp
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    candidate(&format!("_{timestamp}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_rename_path() {
        let path = PathBuf::from("/tmp/filedeck-no-such-dir/test.txt");
        let renamed = auto_rename_path(&path);
        assert_eq!(renamed, PathBuf::from("/tmp/filedeck-no-such-dir/test (1).txt"));
    }

    #[test]
    fn test_auto_rename_no_extension() {
        let path = PathBuf::from("/tmp/filedeck-no-such-dir/testfile");
        let renamed = auto_rename_path(&path);
        assert_eq!(renamed, PathBuf::from("/tmp/filedeck-no-such-dir/testfile (1)"));
    }

    #[test]
    fn test_auto_rename_skips_taken_names() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("a.txt"), b"").unwrap();
        fs::write(temp.path().join("a (1).txt"), b"").unwrap();
        assert_eq!(auto_rename_path(&temp.path().join("a.txt")), temp.path().join("a (2).txt"));
    }

    #[test]
    fn test_resolve_conflict_policies() {
        let temp = tempfile::tempdir().unwrap();
        let taken = temp.path().join("taken.txt");
        let free = temp.path().join("free.txt");
        fs::write(&taken, b"x").unwrap();

        assert_eq!(resolve_conflict(ConflictPolicy::Fail, free.clone()).unwrap(), free);
        assert_eq!(resolve_conflict(ConflictPolicy::Overwrite, taken.clone()).unwrap(), taken);
        assert!(matches!(
            resolve_conflict(ConflictPolicy::Fail, taken.clone()),
            Err(FsError::AlreadyExists { .. })
        ));
        assert_eq!(
            resolve_conflict(ConflictPolicy::AutoRename, taken).unwrap(),
            temp.path().join("taken (1).txt")
        );
    }

    #[test]
    fn test_placement_rejects_nesting() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("dir");
        fs::create_dir_all(dir.join("child")).unwrap();

        let err = Placement::resolve(&dir, &dir.join("child")).unwrap_err();
        assert!(matches!(err, FsError::DestinationInsideSource { .. }));

        let err = Placement::resolve(&dir, &dir).unwrap_err();
        assert!(matches!(err, FsError::DestinationInsideSource { .. }));

        let same = Placement::resolve(&dir, temp.path()).unwrap();
        assert!(same.is_same_path());
    }

    #[test]
    fn test_placement_missing_source() {
        let temp = tempfile::tempdir().unwrap();
        let err = Placement::resolve(&temp.path().join("gone"), temp.path()).unwrap_err();
        assert!(matches!(err, FsError::NotFound { .. }));
    }
}
