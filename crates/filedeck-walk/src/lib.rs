//! Tree walking for filedeck.
//!
//! This crate enumerates filesystem subtrees using jwalk.
//!
//! # Overview
//!
//! - **Pre-order walks** via [`TreeWalker`]: a directory is always yielded
//!   before its children, siblings in name order
//! - **Per-entry errors**: a failed entry is yielded as an `Err` item;
//!   copy and delete stop on it, listing and sizing skip it
//! - **No link following**, so walks terminate on symlink cycles
//!
//! # Example
//!
//! ```rust,no_run
//! use filedeck_walk::TreeWalker;
//!
//! let walker = TreeWalker::new("/path/to/tree");
//! for item in walker.walk().skip_errors() {
//!     println!("{} (depth {})", item.relative_name(), item.depth);
//! }
//!
//! println!("Total size: {} bytes", filedeck_walk::dir_size("/path/to/tree"));
//! ```

mod listing;
mod summary;
mod walker;

pub use listing::list_directory;
pub use summary::{TreeSummary, count_items, dir_size};
pub use walker::{TreeWalker, Walk, WalkEntry};

// Re-export core types for convenience
pub use filedeck_core::{Entry, EntryKind, FsError};
