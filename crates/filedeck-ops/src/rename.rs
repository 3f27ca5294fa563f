//! Rename operation and file name validation.

use std::fs;
use std::path::Path;

use filedeck_core::{Entry, FsError};

use crate::conflict::path_exists;
use crate::context::run_blocking;

/// Rename `entry` within its parent directory.
///
/// Returns a snapshot of the renamed entry. Renaming to the current name
/// succeeds without touching the filesystem.
pub async fn rename(entry: &Entry, new_name: &str) -> Result<Entry, FsError> {
    let source = entry.path.clone();
    let new_name = new_name.to_string();
    run_blocking(source.clone(), move || rename_path(&source, &new_name)).await
}

/// Blocking rename of the entry at `source`.
pub fn rename_path(source: &Path, new_name: &str) -> Result<Entry, FsError> {
    validate_filename(new_name)?;

    fs::symlink_metadata(source).map_err(|e| FsError::io(source, e))?;

    let parent = source.parent().unwrap_or(Path::new(""));
    let target = parent.join(new_name);
    if target == source {
        return Entry::from_path(source);
    }

    // The check and the rename are not atomic; a sibling created in between
    // is replaced on platforms whose rename overwrites.
    if path_exists(&target)? {
        return Err(FsError::AlreadyExists { path: target });
    }

    fs::rename(source, &target).map_err(|e| FsError::io(source, e))?;
    tracing::info!(from = %source.display(), to = %target.display(), "renamed entry");

    Entry::from_path(&target)
}

/// Validate a user-supplied file name.
pub fn validate_filename(name: &str) -> Result<(), FsError> {
    let reject = |reason: &str| Err(FsError::invalid_name(name, reason));

    if name.is_empty() {
        return reject("name cannot be empty");
    }

    if name.len() > 255 {
        return reject("name is too long (max 255 bytes)");
    }

    for c in ['/', '\0'] {
        if name.contains(c) {
            return reject(&format!("name cannot contain {c:?}"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        let windows_invalid = ['\\', ':', '*', '?', '"', '<', '>', '|'];
        for c in windows_invalid {
            if name.contains(c) {
                return reject(&format!("name cannot contain {c:?}"));
            }
        }

        let reserved = [
            "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7",
            "COM8", "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
        ];
        let upper_name = name.to_uppercase();
        let base_name = upper_name.split('.').next().unwrap_or("");
        if reserved.contains(&base_name) {
            return reject("reserved file name");
        }
    }

    if name == "." || name == ".." {
        return reject("'.' and '..' are reserved names");
    }

    Ok(())
}
