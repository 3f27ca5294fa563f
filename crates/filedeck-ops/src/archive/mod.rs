//! Zip container codec.
//!
//! The writer produces deflate-compressed entries with explicit directory
//! records; the reader indexes the central directory and decompresses
//! entries one at a time in container order.

mod reader;
mod writer;

use std::io;
use std::path::{Component, Path, PathBuf};

use zip::result::ZipError;

use filedeck_core::FsError;

pub use reader::{ArchiveEntry, ArchiveReader};
pub use writer::ArchiveWriter;

/// Resolve an entry name below `dest`, rejecting names that would escape it.
///
/// Absolute paths, `..` components and names that reduce to nothing yield
/// `None`.
pub fn sanitize_entry_path(dest: &Path, name: &str) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if clean.as_os_str().is_empty() {
        return None;
    }

    let out = dest.join(clean);
    out.starts_with(dest).then_some(out)
}

/// Classify an I/O error raised while reading archive bytes.
pub fn archive_read_error(path: &Path, err: io::Error) -> FsError {
    match err.kind() {
        io::ErrorKind::UnexpectedEof | io::ErrorKind::InvalidData => {
            FsError::corrupt(path, err.to_string())
        }
        _ => FsError::io(path, err),
    }
}

pub(crate) fn zip_error(path: &Path, err: ZipError) -> FsError {
    match err {
        ZipError::Io(e) => archive_read_error(path, e),
        other => FsError::corrupt(path, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_entry_path_blocks_unsafe_paths() {
        let root = Path::new("/tmp/out");
        assert_eq!(
            sanitize_entry_path(root, "ok/file.txt"),
            Some(PathBuf::from("/tmp/out/ok/file.txt"))
        );
        assert_eq!(
            sanitize_entry_path(root, "./dir/"),
            Some(PathBuf::from("/tmp/out/dir"))
        );
        assert!(sanitize_entry_path(root, "../evil").is_none());
        assert!(sanitize_entry_path(root, "a/../../evil").is_none());
        assert!(sanitize_entry_path(root, "/abs/path").is_none());
        assert!(sanitize_entry_path(root, "").is_none());
        assert!(sanitize_entry_path(root, "./").is_none());
    }

    #[test]
    fn test_read_error_classification() {
        let path = Path::new("a.zip");
        let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "short read");
        assert!(matches!(archive_read_error(path, eof), FsError::ArchiveCorrupt { .. }));

        let other = io::Error::other("disk on fire");
        assert!(matches!(archive_read_error(path, other), FsError::Io { .. }));
    }
}
