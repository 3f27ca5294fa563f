//! Single-slot clipboard shared between views and the executor.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use filedeck_core::Entry;

/// Whether pasting copies or moves the held entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum ClipboardKind {
    Copy,
    Cut,
}

/// The clipboard contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardItem {
    pub entries: Vec<Entry>,
    pub kind: ClipboardKind,
}

/// Cloneable handle to one clipboard slot.
///
/// Every clone sees the same slot; the last write wins.
#[derive(Debug, Clone)]
pub struct Clipboard {
    slot: Arc<watch::Sender<Option<ClipboardItem>>>,
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard {
    /// Create an empty clipboard.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { slot: Arc::new(tx) }
    }

    /// Hold `entries` for a later copy.
    pub fn copy(&self, entries: Vec<Entry>) {
        self.set(ClipboardItem {
            entries,
            kind: ClipboardKind::Copy,
        });
    }

    /// Hold `entries` for a later move.
    pub fn cut(&self, entries: Vec<Entry>) {
        self.set(ClipboardItem {
            entries,
            kind: ClipboardKind::Cut,
        });
    }

    fn set(&self, item: ClipboardItem) {
        tracing::debug!(kind = %item.kind, count = item.entries.len(), "clipboard updated");
        self.slot.send_replace(Some(item));
    }

    /// Empty the slot.
    pub fn clear(&self) {
        self.slot.send_replace(None);
    }

    /// Empty the slot only if it still holds `item`.
    pub(crate) fn clear_if_current(&self, item: &ClipboardItem) -> bool {
        self.slot.send_if_modified(|slot| {
            if slot.as_ref() == Some(item) {
                *slot = None;
                true
            } else {
                false
            }
        })
    }

    /// A copy of the current contents.
    pub fn current(&self) -> Option<ClipboardItem> {
        self.slot.borrow().clone()
    }

    /// Check if the slot holds anything.
    pub fn has_items(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Check if the held entries are pending a move.
    pub fn is_cut(&self) -> bool {
        self.slot
            .borrow()
            .as_ref()
            .is_some_and(|item| item.kind == ClipboardKind::Cut)
    }

    /// Watch the slot for changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<ClipboardItem>> {
        self.slot.subscribe()
    }
}
