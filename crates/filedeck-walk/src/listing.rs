//! Single-level directory listing.

use std::fs;
use std::path::Path;

use filedeck_core::{Entry, FsError};

/// List the direct children of `path`, sorted by name.
///
/// Children whose metadata cannot be read are skipped.
pub fn list_directory(path: impl AsRef<Path>) -> Result<Vec<Entry>, FsError> {
    let path = path.as_ref();
    let metadata = fs::metadata(path).map_err(|e| FsError::io(path, e))?;
    if !metadata.is_dir() {
        return Err(FsError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    let read_dir = fs::read_dir(path).map_err(|e| FsError::io(path, e))?;

    let mut entries: Vec<Entry> = read_dir
        .filter_map(|item| {
            let dir_entry = match item {
                Ok(d) => d,
                Err(err) => {
                    tracing::debug!(path = %path.display(), error = %err, "skipping unreadable child");
                    return None;
                }
            };
            let child = dir_entry.path();
            match fs::symlink_metadata(&child) {
                Ok(m) => Some(Entry::from_metadata(child, &m)),
                Err(err) => {
                    tracing::debug!(path = %child.display(), error = %err, "skipping unreadable child");
                    None
                }
            }
        })
        .collect();

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}
