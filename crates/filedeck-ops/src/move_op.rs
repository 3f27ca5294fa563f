//! Streamed move operation.

use std::fs;
use std::path::{Path, PathBuf};

use filedeck_core::{Entry, FsError};

use crate::conflict::{Placement, resolve_conflict};
use crate::context::{OperationContext, item_count, spawn_operation};
use crate::fs_util::{copy_tree, ensure_dir, remove_tree};
use crate::progress::{OperationKind, ProgressStream};

/// Start moving `entries` into `destination`.
///
/// Each entry is renamed in place when possible and otherwise copied then
/// deleted; either way it counts as one processed item.
pub fn start_move(entries: Vec<Entry>, destination: PathBuf, ctx: &OperationContext) -> ProgressStream {
    let kind = OperationKind::Move;
    let total = item_count(&entries);
    let worker_ctx = ctx.clone();

    spawn_operation(kind, total, ctx, move |tracker| {
        ensure_dir(&destination).map_err(|err| {
            let name = destination.to_string_lossy();
            tracker.fail(&name, &destination, &err)
        })?;

        tracker.for_each_entry(&entries, |entry| move_entry(entry, &destination, &worker_ctx))
    })
}

fn move_entry(entry: &Entry, destination: &Path, ctx: &OperationContext) -> Result<(), FsError> {
    let placement = Placement::resolve(&entry.path, destination)?;
    if placement.is_same_path() {
        tracing::debug!(path = %placement.source.display(), "entry already in place");
        return Ok(());
    }

    let target = resolve_conflict(ctx.config.conflict_policy, placement.target)?;
    let source = placement.source;

    match fs::rename(&source, &target) {
        Ok(()) => Ok(()),
        Err(err) => {
            // Cross-device moves and merges into existing directories land here
            tracing::debug!(
                source = %source.display(),
                target = %target.display(),
                error = %err,
                "rename failed, falling back to copy and delete"
            );
            copy_tree(&source, &target, ctx)?;
            remove_tree(&source, ctx)
        }
    }
}
