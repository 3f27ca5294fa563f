//! High-level operation executor with a shared configuration.

use std::path::PathBuf;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use filedeck_core::{EngineConfig, Entry, FsError};

use crate::clipboard::{Clipboard, ClipboardKind};
use crate::compress::start_compress;
use crate::context::OperationContext;
use crate::copy::start_copy;
use crate::delete::start_delete;
use crate::extract::start_extract;
use crate::move_op::start_move;
use crate::operation::FileOperation;
use crate::progress::{OperationKind, ProgressStream};
use crate::{create, rename};

/// Executor for file operations with a unified interface.
///
/// Clones share configuration and cancellation.
#[derive(Debug, Clone, Default)]
pub struct OperationExecutor {
    context: OperationContext,
}

impl OperationExecutor {
    /// Create a new executor with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an executor with the given configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            context: OperationContext::new(config),
        }
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.context = self.context.with_cancellation(cancel);
        self
    }

    /// The configuration every operation runs with.
    pub fn config(&self) -> &EngineConfig {
        &self.context.config
    }

    /// The shared operation context.
    pub fn context(&self) -> &OperationContext {
        &self.context
    }

    /// Stop every running and future operation of this executor.
    ///
    /// Operations finish their current file, then report `Cancelled`.
    pub fn cancel(&self) {
        self.context.cancel.cancel();
    }

    /// Execute a copy operation.
    pub fn copy(&self, entries: Vec<Entry>, destination: impl Into<PathBuf>) -> ProgressStream {
        start_copy(entries, destination.into(), &self.context)
    }

    /// Execute a move operation.
    pub fn move_to(&self, entries: Vec<Entry>, destination: impl Into<PathBuf>) -> ProgressStream {
        start_move(entries, destination.into(), &self.context)
    }

    /// Execute a recursive delete.
    pub fn delete(&self, entries: Vec<Entry>) -> ProgressStream {
        start_delete(entries, &self.context)
    }

    /// Execute a compress operation.
    pub fn compress(
        &self,
        entries: Vec<Entry>,
        destination: impl Into<PathBuf>,
        archive_name: impl Into<String>,
    ) -> ProgressStream {
        start_compress(entries, destination.into(), archive_name.into(), &self.context)
    }

    /// Execute an extract operation.
    pub fn extract(&self, archive: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> ProgressStream {
        start_extract(archive.into(), destination.into(), &self.context)
    }

    /// Rename an entry within its directory.
    pub async fn rename(&self, entry: &Entry, new_name: &str) -> Result<Entry, FsError> {
        rename::rename(entry, new_name).await
    }

    /// Create a folder inside `parent`.
    pub async fn create_folder(&self, parent: impl Into<PathBuf>, name: &str) -> Result<Entry, FsError> {
        create::create_folder(parent, name).await
    }

    /// Dispatch a described operation.
    pub fn execute(&self, operation: FileOperation) -> ProgressStream {
        match operation {
            FileOperation::Copy {
                entries,
                destination,
            } => self.copy(entries, destination),
            FileOperation::Move {
                entries,
                destination,
            } => self.move_to(entries, destination),
            FileOperation::Delete { entries } => self.delete(entries),
            FileOperation::Compress {
                entries,
                destination,
                archive_name,
            } => self.compress(entries, destination, archive_name),
            FileOperation::Extract {
                archive,
                destination,
            } => self.extract(archive, destination),
        }
    }

    /// Paste the clipboard contents into `destination`.
    ///
    /// Copies or moves according to the clipboard kind. The clipboard is
    /// cleared once the operation succeeds, unless it was replaced in the
    /// meantime. Returns `None` for an empty clipboard.
    pub fn paste(&self, clipboard: &Clipboard, destination: impl Into<PathBuf>) -> Option<ProgressStream> {
        let item = clipboard.current()?;
        let (kind, inner) = match item.kind {
            ClipboardKind::Copy => (OperationKind::Copy, self.copy(item.entries.clone(), destination)),
            ClipboardKind::Cut => (OperationKind::Move, self.move_to(item.entries.clone(), destination)),
        };

        let (tx, rx) = mpsc::channel(self.context.config.channel_size.max(1));
        let clipboard = clipboard.clone();

        tokio::spawn(async move {
            let mut inner = inner;
            let mut forwarding = true;
            while let Some(event) = inner.next().await {
                if event.is_success() && clipboard.clear_if_current(&item) {
                    tracing::debug!("clipboard cleared after paste");
                }
                // Keep draining after the consumer leaves so the clipboard still clears
                if forwarding && tx.send(event).await.is_err() {
                    forwarding = false;
                }
            }
        });

        Some(ProgressStream::new(kind, rx))
    }
}
