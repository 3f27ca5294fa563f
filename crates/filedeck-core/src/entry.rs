//! Filesystem entry snapshots.

use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::FsError;

/// Type of filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link (never followed).
    Symlink,
    /// Sockets, devices, fifos.
    Other,
}

impl EntryKind {
    /// Classify from metadata obtained without following links.
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let file_type = metadata.file_type();
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

/// Broad content category derived from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum FileCategory {
    Folder,
    Image,
    Video,
    Audio,
    Pdf,
    Document,
    Spreadsheet,
    Presentation,
    Archive,
    Apk,
    Code,
    Unknown,
}

impl FileCategory {
    /// Categorize a lowercase extension.
    pub fn from_extension(extension: &str) -> Self {
        match extension {
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "webp" | "svg" => Self::Image,
            "mp4" | "avi" | "mkv" | "mov" | "wmv" | "flv" | "webm" => Self::Video,
            "mp3" | "wav" | "flac" | "aac" | "ogg" | "m4a" | "wma" => Self::Audio,
            "pdf" => Self::Pdf,
            "doc" | "docx" | "txt" | "rtf" | "odt" => Self::Document,
            "xls" | "xlsx" | "csv" | "ods" => Self::Spreadsheet,
            "ppt" | "pptx" | "odp" => Self::Presentation,
            "zip" | "rar" | "7z" | "tar" | "gz" | "bz2" => Self::Archive,
            "apk" => Self::Apk,
            "java" | "kt" | "py" | "js" | "html" | "css" | "xml" | "json" | "cpp" | "c" | "h"
            | "rs" => Self::Code,
            _ => Self::Unknown,
        }
    }
}

/// Immutable snapshot of one filesystem object, taken at listing time.
///
/// The live filesystem may have changed since the snapshot was taken;
/// operations re-check the path instead of trusting these fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// File/directory name (not full path).
    pub name: CompactString,

    /// Absolute path at snapshot time.
    pub path: PathBuf,

    /// Entry type.
    pub kind: EntryKind,

    /// Size in bytes (0 for directories).
    pub size: u64,

    /// Last modification time.
    pub modified: SystemTime,

    /// Lowercase extension, empty for directories.
    pub extension: CompactString,

    /// Whether the entry is write-protected.
    pub readonly: bool,
}

impl Entry {
    /// Snapshot the entry at `path` without following a final symlink.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FsError> {
        let path = path.as_ref();
        let metadata = fs::symlink_metadata(path).map_err(|e| FsError::io(path, e))?;
        Ok(Self::from_metadata(path, &metadata))
    }

    /// Build a snapshot from already-fetched metadata.
    pub fn from_metadata(path: impl Into<PathBuf>, metadata: &Metadata) -> Self {
        let path = path.into();
        let kind = EntryKind::from_metadata(metadata);

        let name: CompactString = path
            .file_name()
            .map(|n| n.to_string_lossy().as_ref().into())
            .unwrap_or_else(|| path.to_string_lossy().as_ref().into());

        let extension = if kind == EntryKind::Directory {
            CompactString::default()
        } else {
            path.extension()
                .map(|e| e.to_string_lossy().to_lowercase().into())
                .unwrap_or_default()
        };

        Self {
            name,
            kind,
            size: if kind == EntryKind::Directory {
                0
            } else {
                metadata.len()
            },
            modified: metadata.modified().unwrap_or(UNIX_EPOCH),
            extension,
            readonly: metadata.permissions().readonly(),
            path,
        }
    }

    /// Check if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Check if this entry is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Dot-files are hidden.
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }

    /// Content category of this entry.
    pub fn category(&self) -> FileCategory {
        if self.is_dir() {
            FileCategory::Folder
        } else {
            FileCategory::from_extension(&self.extension)
        }
    }

    /// Human-readable size; empty for directories.
    pub fn formatted_size(&self) -> String {
        if self.is_dir() {
            return String::new();
        }
        humansize::format_size(self.size, humansize::WINDOWS)
    }

    /// Modification time in local time, e.g. `Mar 07, 2026 14:05`.
    pub fn formatted_date(&self) -> String {
        let local: DateTime<Local> = self.modified.into();
        local.format("%b %d, %Y %H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_category() {
        assert_eq!(FileCategory::from_extension("png"), FileCategory::Image);
        assert_eq!(FileCategory::from_extension("kt"), FileCategory::Code);
        assert_eq!(FileCategory::from_extension("zip"), FileCategory::Archive);
        assert_eq!(FileCategory::from_extension(""), FileCategory::Unknown);
        assert_eq!(FileCategory::Spreadsheet.to_string(), "Spreadsheet");
    }

    #[test]
    fn test_entry_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Report.PDF");
        fs::write(&file, b"%PDF-1.7").unwrap();

        let entry = Entry::from_path(&file).unwrap();
        assert_eq!(entry.name.as_str(), "Report.PDF");
        assert_eq!(entry.extension.as_str(), "pdf");
        assert_eq!(entry.size, 8);
        assert!(entry.is_file());
        assert_eq!(entry.category(), FileCategory::Pdf);

        let dir_entry = Entry::from_path(dir.path()).unwrap();
        assert!(dir_entry.is_dir());
        assert_eq!(dir_entry.size, 0);
        assert!(dir_entry.extension.is_empty());
        assert_eq!(dir_entry.category(), FileCategory::Folder);
        assert!(dir_entry.formatted_size().is_empty());
    }

    #[test]
    fn test_entry_from_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = Entry::from_path(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, FsError::NotFound { .. }));
    }
}
