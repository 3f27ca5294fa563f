//! Shared execution context and the blocking worker that drives every
//! streamed operation.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use filedeck_core::{EngineConfig, Entry, ErrorKind, FsError};
use filedeck_walk::TreeWalker;

use crate::operation::OperationError;
use crate::progress::{OperationKind, OperationProgress, ProgressStream};

/// Configuration and cancellation handle shared by operations.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    /// Engine configuration.
    pub config: Arc<EngineConfig>,
    /// Cancelling this token stops every operation started with the context.
    pub cancel: CancellationToken,
}

impl OperationContext {
    /// Create a context with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: Arc::new(config),
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// A walker rooted at `root` honoring the configured thread count.
    pub(crate) fn walker(&self, root: impl Into<PathBuf>) -> TreeWalker {
        TreeWalker::new(root).threads(self.config.walk_threads)
    }

    pub(crate) fn check_cancelled(&self) -> Result<(), FsError> {
        if self.cancel.is_cancelled() {
            Err(FsError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Worker-side progress publisher.
pub(crate) struct Tracker {
    kind: OperationKind,
    total: u32,
    processed: Arc<AtomicU32>,
    cancel: CancellationToken,
    tx: mpsc::Sender<OperationProgress>,
}

impl Tracker {
    /// Announce the next item, or stop if the operation was cancelled.
    pub(crate) fn begin(&mut self, name: &str) -> Result<(), OperationError> {
        if self.cancel.is_cancelled() {
            return Err(OperationError::cancelled(self.kind));
        }

        let event = OperationProgress::started(self.kind, self.total, self.processed(), name);
        // A dropped receiver does not stop the operation
        let _ = self.tx.blocking_send(event);
        Ok(())
    }

    /// Mark the current item as completed.
    pub(crate) fn advance(&mut self) {
        self.processed.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn processed(&self) -> u32 {
        self.processed.load(Ordering::Acquire)
    }

    /// Run `step` over each top-level entry, stopping at the first failure.
    pub(crate) fn for_each_entry(
        &mut self,
        entries: &[Entry],
        mut step: impl FnMut(&Entry) -> Result<(), FsError>,
    ) -> Result<(), OperationError> {
        for entry in entries {
            self.begin(&entry.name)?;
            step(entry).map_err(|err| self.fail(&entry.name, &entry.path, &err))?;
            self.advance();
        }
        Ok(())
    }

    /// Wrap an error raised while working on `name`.
    pub(crate) fn fail(&self, name: &str, path: &Path, err: &FsError) -> OperationError {
        match err {
            FsError::Cancelled => OperationError::cancelled(self.kind),
            _ => OperationError::from_fs(self.kind, name, path, err),
        }
    }
}

/// Run `body` on the blocking pool and stream its progress.
///
/// The supervisor task sends the single terminal event after the worker
/// returns or panics. A `total` of 0 is reported as the final processed
/// count in the terminal event.
pub(crate) fn spawn_operation<F>(
    kind: OperationKind,
    total: u32,
    ctx: &OperationContext,
    body: F,
) -> ProgressStream
where
    F: FnOnce(&mut Tracker) -> Result<(), OperationError> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(ctx.config.channel_size.max(1));
    let processed = Arc::new(AtomicU32::new(0));
    let mut tracker = Tracker {
        kind,
        total,
        processed: Arc::clone(&processed),
        cancel: ctx.cancel.clone(),
        tx: tx.clone(),
    };

    tokio::spawn(async move {
        tracing::info!(%kind, total, "operation started");

        let error = match tokio::task::spawn_blocking(move || body(&mut tracker)).await {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err),
            Err(join_err) => Some(OperationError::new(
                ErrorKind::Io,
                PathBuf::new(),
                format!("{kind} worker task failed: {join_err}"),
            )),
        };

        let processed = processed.load(Ordering::Acquire);
        let total = if total == 0 { processed } else { total };
        match &error {
            Some(err) => tracing::info!(%kind, processed, total, error = %err, "operation failed"),
            None => tracing::info!(%kind, processed, total, "operation finished"),
        }

        let _ = tx
            .send(OperationProgress::finished(kind, total, processed, error))
            .await;
    });

    ProgressStream::new(kind, rx)
}

/// Run a single-shot blocking filesystem call off the async runtime.
pub(crate) async fn run_blocking<T, F>(path: PathBuf, f: F) -> Result<T, FsError>
where
    F: FnOnce() -> Result<T, FsError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|join_err| FsError::Io {
            path,
            source: io::Error::other(format!("Task failed: {join_err}")),
        })?
}

/// Number of entries as a progress count.
pub(crate) fn item_count(entries: &[Entry]) -> u32 {
    u32::try_from(entries.len()).unwrap_or(u32::MAX)
}
