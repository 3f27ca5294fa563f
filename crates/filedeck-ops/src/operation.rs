//! File operation types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use filedeck_core::{Entry, ErrorKind, FsError};

use crate::progress::OperationKind;

/// A streamed file operation to be executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FileOperation {
    /// Copy entries into a destination directory.
    Copy {
        entries: Vec<Entry>,
        destination: PathBuf,
    },
    /// Move entries into a destination directory.
    Move {
        entries: Vec<Entry>,
        destination: PathBuf,
    },
    /// Recursively delete entries.
    Delete { entries: Vec<Entry> },
    /// Pack entries into `destination/archive_name`.
    Compress {
        entries: Vec<Entry>,
        destination: PathBuf,
        archive_name: String,
    },
    /// Unpack an archive into a destination directory.
    Extract {
        archive: PathBuf,
        destination: PathBuf,
    },
}

impl FileOperation {
    /// Create a copy operation.
    pub fn copy(entries: Vec<Entry>, destination: impl Into<PathBuf>) -> Self {
        Self::Copy {
            entries,
            destination: destination.into(),
        }
    }

    /// Create a move operation.
    pub fn move_to(entries: Vec<Entry>, destination: impl Into<PathBuf>) -> Self {
        Self::Move {
            entries,
            destination: destination.into(),
        }
    }

    /// Create a delete operation.
    pub fn delete(entries: Vec<Entry>) -> Self {
        Self::Delete { entries }
    }

    /// Create a compress operation.
    pub fn compress(
        entries: Vec<Entry>,
        destination: impl Into<PathBuf>,
        archive_name: impl Into<String>,
    ) -> Self {
        Self::Compress {
            entries,
            destination: destination.into(),
            archive_name: archive_name.into(),
        }
    }

    /// Create an extract operation.
    pub fn extract(archive: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self::Extract {
            archive: archive.into(),
            destination: destination.into(),
        }
    }

    /// The kind tag of this operation.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Copy { .. } => OperationKind::Copy,
            Self::Move { .. } => OperationKind::Move,
            Self::Delete { .. } => OperationKind::Delete,
            Self::Compress { .. } => OperationKind::Compress,
            Self::Extract { .. } => OperationKind::Extract,
        }
    }
}

/// The error that stopped a streamed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationError {
    /// Error category.
    pub kind: ErrorKind,
    /// The item the operation was working on.
    pub path: PathBuf,
    /// A human-readable error message.
    pub message: String,
}

impl OperationError {
    /// Create a new operation error.
    pub fn new(kind: ErrorKind, path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Wrap a filesystem error raised while processing `name`.
    pub(crate) fn from_fs(op: OperationKind, name: &str, path: &Path, err: &FsError) -> Self {
        Self::new(
            err.kind(),
            path,
            format!("Failed to {} {}: {}", op.verb(), name, err),
        )
    }

    pub(crate) fn cancelled(op: OperationKind) -> Self {
        Self::new(
            ErrorKind::Cancelled,
            PathBuf::new(),
            format!("{op} cancelled"),
        )
    }
}

impl std::fmt::Display for OperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for OperationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message() {
        let err = FsError::NotFound {
            path: PathBuf::from("/x/a.txt"),
        };
        let op_err = OperationError::from_fs(OperationKind::Copy, "a.txt", Path::new("/x/a.txt"), &err);
        assert_eq!(op_err.kind, ErrorKind::NotFound);
        assert_eq!(op_err.to_string(), "Failed to copy a.txt: Path not found: /x/a.txt");
    }

    #[test]
    fn test_operation_kind_tag() {
        let op = FileOperation::extract("/tmp/a.zip", "/tmp/out");
        assert_eq!(op.kind(), OperationKind::Extract);
        assert_eq!(FileOperation::delete(Vec::new()).kind(), OperationKind::Delete);
    }
}
