//! Streamed copy operation.

use std::path::{Path, PathBuf};

use filedeck_core::{Entry, FsError};

use crate::conflict::{Placement, resolve_conflict};
use crate::context::{OperationContext, item_count, spawn_operation};
use crate::fs_util::{copy_tree, ensure_dir};
use crate::progress::{OperationKind, ProgressStream};

/// Start copying `entries` into `destination`.
///
/// The destination directory is created if missing. Each top-level entry
/// is one processed item; the first failure ends the operation.
pub fn start_copy(entries: Vec<Entry>, destination: PathBuf, ctx: &OperationContext) -> ProgressStream {
    let kind = OperationKind::Copy;
    let total = item_count(&entries);
    let worker_ctx = ctx.clone();

    spawn_operation(kind, total, ctx, move |tracker| {
        ensure_dir(&destination).map_err(|err| {
            let name = destination.to_string_lossy();
            tracker.fail(&name, &destination, &err)
        })?;

        tracker.for_each_entry(&entries, |entry| {
            copy_entry(entry, &destination, &worker_ctx).map(|bytes| {
                tracing::debug!(name = %entry.name, bytes, "copied entry");
            })
        })
    })
}

/// Copy one entry into `destination`, returning the bytes written.
fn copy_entry(entry: &Entry, destination: &Path, ctx: &OperationContext) -> Result<u64, FsError> {
    let placement = Placement::resolve(&entry.path, destination)?;
    let target = resolve_conflict(ctx.config.conflict_policy, placement.target)?;

    if target == placement.source {
        return Err(FsError::SameFile { path: target });
    }

    copy_tree(&placement.source, &target, ctx)
}
