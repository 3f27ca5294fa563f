//! File operations engine for filedeck.
//!
//! Streamed operations (copy, move, delete, compress, extract) run on the
//! blocking thread pool and report through a [`ProgressStream`]: one event
//! before each top-level item and exactly one terminal event. The first
//! failure stops the operation and is carried by the terminal event.
//! Rename and folder creation are single-shot and return a `Result`.
//!
//! # Example
//!
//! ```rust,no_run
//! use filedeck_core::Entry;
//! use filedeck_ops::OperationExecutor;
//!
//! # async fn demo() -> Result<(), filedeck_core::FsError> {
//! let executor = OperationExecutor::new();
//! let entry = Entry::from_path("/tmp/report.pdf")?;
//!
//! let mut progress = executor.copy(vec![entry], "/tmp/backup");
//! while let Some(event) = progress.next().await {
//!     println!("{}", event.summary());
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
mod clipboard;
mod compress;
mod conflict;
mod context;
mod copy;
mod create;
mod delete;
mod executor;
mod extract;
mod fs_util;
mod move_op;
mod operation;
mod progress;
mod rename;

pub use clipboard::{Clipboard, ClipboardItem, ClipboardKind};
pub use compress::start_compress;
pub use conflict::auto_rename_path;
pub use context::OperationContext;
pub use copy::start_copy;
pub use create::{create_folder, create_folder_at};
pub use delete::start_delete;
pub use executor::OperationExecutor;
pub use extract::start_extract;
pub use move_op::start_move;
pub use operation::{FileOperation, OperationError};
pub use progress::{OperationKind, OperationProgress, OperationState, ProgressStream};
pub use rename::{rename, rename_path, validate_filename};
