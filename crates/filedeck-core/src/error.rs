//! Error types for file operations.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while operating on the filesystem.
#[derive(Debug, Error)]
pub enum FsError {
    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Something already exists at the target path.
    #[error("Already exists: {path}")]
    AlreadyExists { path: PathBuf },

    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The archive is malformed, truncated or unsafe to extract.
    #[error("Corrupt archive {path}: {reason}")]
    ArchiveCorrupt { path: PathBuf, reason: String },

    /// A user-supplied file name was rejected before touching the filesystem.
    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Path was expected to be a directory.
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// A directory cannot be copied or moved into itself.
    #[error("Cannot place {source_path} inside itself ({destination})")]
    DestinationInsideSource {
        source_path: PathBuf,
        destination: PathBuf,
    },

    /// Source and destination resolve to the same path.
    #[error("Source and destination are the same: {path}")]
    SameFile { path: PathBuf },

    /// Operation was cancelled by the caller.
    #[error("Operation cancelled")]
    Cancelled,
}

impl FsError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::AlreadyExists => Self::AlreadyExists { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create an archive corruption error.
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ArchiveCorrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid name error.
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::Io { .. } => ErrorKind::Io,
            Self::ArchiveCorrupt { .. } => ErrorKind::ArchiveCorrupt,
            Self::InvalidName { .. } => ErrorKind::InvalidName,
            Self::NotADirectory { .. } => ErrorKind::NotADirectory,
            Self::DestinationInsideSource { .. } | Self::SameFile { .. } => {
                ErrorKind::InvalidDestination
            }
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }
}

/// Serializable error category, carried by progress events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    PermissionDenied,
    Io,
    ArchiveCorrupt,
    InvalidName,
    NotADirectory,
    InvalidDestination,
    Cancelled,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "Not found"),
            Self::AlreadyExists => write!(f, "Already exists"),
            Self::PermissionDenied => write!(f, "Permission denied"),
            Self::Io => write!(f, "I/O failure"),
            Self::ArchiveCorrupt => write!(f, "Corrupt archive"),
            Self::InvalidName => write!(f, "Invalid name"),
            Self::NotADirectory => write!(f, "Not a directory"),
            Self::InvalidDestination => write!(f, "Invalid destination"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_error_io_classification() {
        let err = FsError::io(
            "/test/path",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, FsError::PermissionDenied { .. }));

        let err = FsError::io("/test/path", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = FsError::io("/test/path", io::Error::from(io::ErrorKind::AlreadyExists));
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        let err = FsError::io("/test/path", io::Error::other("disk on fire"));
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("disk on fire"));
    }

    #[test]
    fn test_destination_errors_share_kind() {
        let inside = FsError::DestinationInsideSource {
            source_path: "/a".into(),
            destination: "/a/b".into(),
        };
        let same = FsError::SameFile { path: "/a".into() };
        assert_eq!(inside.kind(), ErrorKind::InvalidDestination);
        assert_eq!(same.kind(), ErrorKind::InvalidDestination);
    }
}
