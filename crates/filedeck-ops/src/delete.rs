//! Streamed recursive delete.

use filedeck_core::Entry;

use crate::context::{OperationContext, item_count, spawn_operation};
use crate::fs_util::remove_tree;
use crate::progress::{OperationKind, ProgressStream};

/// Start deleting `entries` recursively.
///
/// Entries that have already vanished count as deleted.
pub fn start_delete(entries: Vec<Entry>, ctx: &OperationContext) -> ProgressStream {
    let total = item_count(&entries);
    let worker_ctx = ctx.clone();

    spawn_operation(OperationKind::Delete, total, ctx, move |tracker| {
        tracker.for_each_entry(&entries, |entry| remove_tree(&entry.path, &worker_ctx))
    })
}
