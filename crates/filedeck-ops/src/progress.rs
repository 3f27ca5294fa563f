//! Progress reporting types for file operations.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use filedeck_core::ErrorKind;

use crate::OperationError;

/// The type of operation being performed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum OperationKind {
    Copy,
    Move,
    Delete,
    Compress,
    Extract,
}

impl OperationKind {
    /// Lowercase verb used in error messages.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Move => "move",
            Self::Delete => "delete",
            Self::Compress => "compress",
            Self::Extract => "extract",
        }
    }

    fn past_tense(&self) -> &'static str {
        match self {
            Self::Copy => "Copied",
            Self::Move => "Moved",
            Self::Delete => "Deleted",
            Self::Compress => "Compressed",
            Self::Extract => "Extracted",
        }
    }
}

/// One progress event of a streamed operation.
///
/// Every invocation ends with exactly one event whose `is_complete` is set;
/// it is always the last one sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationProgress {
    /// The type of operation.
    pub kind: OperationKind,
    /// Number of top-level items to process (0 = unknown).
    pub total_items: u32,
    /// Number of items fully completed.
    pub processed_items: u32,
    /// Name of the item being worked on, empty in the terminal event.
    pub current_entry: String,
    /// Set only on the terminal event.
    pub is_complete: bool,
    /// The error that stopped the operation, if any.
    pub error: Option<OperationError>,
}

impl OperationProgress {
    pub(crate) fn started(kind: OperationKind, total: u32, processed: u32, name: &str) -> Self {
        Self {
            kind,
            total_items: total,
            processed_items: processed,
            current_entry: name.to_string(),
            is_complete: false,
            error: None,
        }
    }

    pub(crate) fn finished(
        kind: OperationKind,
        total: u32,
        processed: u32,
        error: Option<OperationError>,
    ) -> Self {
        Self {
            kind,
            total_items: total,
            processed_items: processed,
            current_entry: String::new(),
            is_complete: true,
            error,
        }
    }

    /// Completion as a whole percentage (0 when the total is unknown).
    pub fn percentage(&self) -> u32 {
        if self.total_items == 0 {
            return 0;
        }
        let percent = u64::from(self.processed_items) * 100 / u64::from(self.total_items);
        percent.min(100) as u32
    }

    /// Check if this is a terminal event without an error.
    pub fn is_success(&self) -> bool {
        self.is_complete && self.error.is_none()
    }

    /// Get a human-readable summary of the operation so far.
    pub fn summary(&self) -> String {
        match (&self.error, self.is_complete) {
            (Some(error), _) => format!(
                "{} {} of {} items before failing: {}",
                self.kind.past_tense(),
                self.processed_items,
                self.total_items,
                error
            ),
            (None, true) => format!("{} {} items", self.kind.past_tense(), self.processed_items),
            (None, false) if self.total_items > 0 => format!(
                "{} {}/{}: {}",
                self.kind, self.processed_items, self.total_items, self.current_entry
            ),
            (None, false) => format!("{} {}", self.kind, self.current_entry),
        }
    }
}

/// Lifecycle of an operation as seen by its consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OperationState {
    /// No event observed yet.
    #[default]
    Pending,
    /// At least one non-terminal event observed.
    Running,
    /// Terminal event without an error.
    Succeeded,
    /// Terminal event with an error.
    Failed,
}

impl OperationState {
    /// Check if the operation has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Receiving end of an operation's progress channel.
#[derive(Debug)]
pub struct ProgressStream {
    kind: OperationKind,
    rx: mpsc::Receiver<OperationProgress>,
    state: OperationState,
}

impl ProgressStream {
    pub(crate) fn new(kind: OperationKind, rx: mpsc::Receiver<OperationProgress>) -> Self {
        Self {
            kind,
            rx,
            state: OperationState::Pending,
        }
    }

    /// The operation this stream reports on.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// State derived from the events received so far.
    pub fn state(&self) -> OperationState {
        self.state
    }

    /// Receive the next event, or `None` after the terminal event.
    pub async fn next(&mut self) -> Option<OperationProgress> {
        if self.state.is_terminal() {
            return None;
        }

        let event = self.rx.recv().await?;
        self.state = match (event.is_complete, &event.error) {
            (false, _) => OperationState::Running,
            (true, None) => OperationState::Succeeded,
            (true, Some(_)) => OperationState::Failed,
        };
        Some(event)
    }

    /// Drain the stream and return the terminal event.
    pub async fn wait(mut self) -> OperationProgress {
        let mut last = None;
        while let Some(event) = self.next().await {
            last = Some(event);
        }

        match last {
            Some(event) if event.is_complete => event,
            other => {
                let processed = other.map(|e| e.processed_items).unwrap_or(0);
                OperationProgress::finished(
                    self.kind,
                    0,
                    processed,
                    Some(OperationError::new(
                        ErrorKind::Io,
                        "",
                        "Progress channel closed before completion",
                    )),
                )
            }
        }
    }

    /// Drain the stream into a vector of every event.
    pub async fn collect(mut self) -> Vec<OperationProgress> {
        let mut events = Vec::new();
        while let Some(event) = self.next().await {
            events.push(event);
        }
        events
    }

    /// Convert into a `Stream` for use with stream combinators.
    ///
    /// The stream yields the raw events; [`state`](Self::state) is not
    /// tracked once converted.
    pub fn into_stream(self) -> ReceiverStream<OperationProgress> {
        ReceiverStream::new(self.rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        let mut event = OperationProgress::started(OperationKind::Copy, 4, 1, "a.txt");
        assert_eq!(event.percentage(), 25);
        event.total_items = 0;
        assert_eq!(event.percentage(), 0);
    }

    #[test]
    fn test_summary() {
        let done = OperationProgress::finished(OperationKind::Delete, 3, 3, None);
        assert_eq!(done.summary(), "Deleted 3 items");
        assert!(done.is_success());

        let running = OperationProgress::started(OperationKind::Copy, 3, 1, "b.txt");
        assert_eq!(running.summary(), "Copy 1/3: b.txt");
        assert!(!running.is_success());
    }

    #[tokio::test]
    async fn test_stream_state_transitions() {
        let (tx, rx) = mpsc::channel(4);
        let mut stream = ProgressStream::new(OperationKind::Move, rx);
        assert_eq!(stream.state(), OperationState::Pending);

        tx.send(OperationProgress::started(OperationKind::Move, 1, 0, "a"))
            .await
            .unwrap();
        tx.send(OperationProgress::finished(OperationKind::Move, 1, 1, None))
            .await
            .unwrap();

        stream.next().await.unwrap();
        assert_eq!(stream.state(), OperationState::Running);
        stream.next().await.unwrap();
        assert_eq!(stream.state(), OperationState::Succeeded);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_wait_synthesizes_failure_on_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(tx);
        let terminal = ProgressStream::new(OperationKind::Copy, rx).wait().await;
        assert!(terminal.is_complete);
        assert_eq!(terminal.error.unwrap().kind, ErrorKind::Io);
    }
}
