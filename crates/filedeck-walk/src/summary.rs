//! Best-effort size and item counting over a subtree.

use std::path::Path;

use filedeck_core::EntryKind;

use crate::walker::TreeWalker;

/// Aggregate counts for a subtree, excluding the root itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeSummary {
    /// Number of regular files below the root.
    pub files: u64,
    /// Number of directories below the root.
    pub dirs: u64,
    /// Number of symlinks and special files below the root.
    pub others: u64,
    /// Total size of regular files in bytes.
    pub bytes: u64,
}

impl TreeSummary {
    /// Create an empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk `walker`'s tree and summarize it, skipping unreadable entries.
    ///
    /// A file root counts as one file.
    pub fn collect(walker: &TreeWalker) -> Self {
        let mut summary = Self::new();

        for item in walker.walk().skip_errors() {
            match item.entry.kind {
                EntryKind::File => {
                    summary.files += 1;
                    summary.bytes += item.entry.size;
                }
                EntryKind::Directory if item.depth > 0 => summary.dirs += 1,
                EntryKind::Directory => {}
                EntryKind::Symlink | EntryKind::Other => summary.others += 1,
            }
        }

        summary
    }

    /// Total items below the root (files + dirs + others).
    pub fn total_items(&self) -> u64 {
        self.files + self.dirs + self.others
    }
}

/// Total bytes of regular files under `path`.
pub fn dir_size(path: impl AsRef<Path>) -> u64 {
    TreeSummary::collect(&TreeWalker::new(path.as_ref())).bytes
}

/// Number of files and directories under `path`, not counting `path` itself.
pub fn count_items(path: impl AsRef<Path>) -> u64 {
    let path = path.as_ref();
    let summary = TreeSummary::collect(&TreeWalker::new(path));
    if path.is_dir() {
        summary.total_items()
    } else {
        0
    }
}
