//! Folder creation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use filedeck_core::{Entry, FsError};

use crate::context::run_blocking;
use crate::rename::validate_filename;

/// Create the folder `parent/name` and return its snapshot.
///
/// Fails with `AlreadyExists` if anything is already at that path and with
/// `NotFound` if `parent` does not exist.
pub async fn create_folder(parent: impl Into<PathBuf>, name: &str) -> Result<Entry, FsError> {
    let parent = parent.into();
    let name = name.to_string();
    run_blocking(parent.clone(), move || create_folder_at(&parent, &name)).await
}

/// Blocking variant of [`create_folder`].
pub fn create_folder_at(parent: &Path, name: &str) -> Result<Entry, FsError> {
    validate_filename(name)?;

    let path = parent.join(name);
    match fs::create_dir(&path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(FsError::NotFound {
                path: parent.to_path_buf(),
            });
        }
        Err(e) => return Err(FsError::io(&path, e)),
    }

    tracing::info!(path = %path.display(), "created folder");
    Entry::from_path(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_folder_at() {
        let temp = tempfile::tempdir().unwrap();
        let entry = create_folder_at(temp.path(), "new").unwrap();
        assert!(entry.is_dir());
        assert_eq!(entry.name, "new");

        let err = create_folder_at(temp.path(), "new").unwrap_err();
        assert!(matches!(err, FsError::AlreadyExists { .. }));
    }

    #[test]
    fn test_create_folder_missing_parent() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("missing");
        let err = create_folder_at(&missing, "child").unwrap_err();
        match err {
            FsError::NotFound { path } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_create_folder_rejects_bad_names() {
        let temp = tempfile::tempdir().unwrap();
        assert!(matches!(
            create_folder_at(temp.path(), "a/b"),
            Err(FsError::InvalidName { .. })
        ));
        assert!(matches!(
            create_folder_at(temp.path(), ".."),
            Err(FsError::InvalidName { .. })
        ));
    }
}
