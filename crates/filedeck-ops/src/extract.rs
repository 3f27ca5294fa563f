//! Streamed zip extraction.

use std::fs::File;
use std::path::{Path, PathBuf};

use filedeck_core::FsError;

use crate::archive::{ArchiveEntry, ArchiveReader, archive_read_error, sanitize_entry_path};
use crate::conflict::resolve_conflict;
use crate::context::{OperationContext, Tracker, spawn_operation};
use crate::fs_util::{ensure_dir, remove_existing_link, write_stream};
use crate::operation::OperationError;
use crate::progress::{OperationKind, ProgressStream};

/// Start unpacking `archive` into `destination`.
///
/// The entry count is unknown until the archive has been read, so
/// non-terminal events report a total of 0.
pub fn start_extract(archive: PathBuf, destination: PathBuf, ctx: &OperationContext) -> ProgressStream {
    let worker_ctx = ctx.clone();

    spawn_operation(OperationKind::Extract, 0, ctx, move |tracker| {
        extract_into(tracker, &archive, &destination, &worker_ctx)
    })
}

fn extract_into(
    tracker: &mut Tracker,
    archive: &Path,
    destination: &Path,
    ctx: &OperationContext,
) -> Result<(), OperationError> {
    let archive_name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| archive.to_string_lossy().into_owned());

    let file = File::open(archive)
        .map_err(|e| tracker.fail(&archive_name, archive, &FsError::io(archive, e)))?;
    ensure_dir(destination).map_err(|err| tracker.fail(&archive_name, destination, &err))?;

    let mut reader =
        ArchiveReader::open(file, archive).map_err(|err| tracker.fail(&archive_name, archive, &err))?;
    loop {
        let mut entry = match reader.next_entry() {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(err) => return Err(tracker.fail(&archive_name, archive, &err)),
        };

        let name = entry.name().to_string();
        tracker.begin(&name)?;
        extract_entry(&mut entry, archive, destination, ctx)
            .map_err(|err| tracker.fail(&name, &destination.join(&name), &err))?;
        tracker.advance();
    }

    Ok(())
}

fn extract_entry(
    entry: &mut ArchiveEntry<'_>,
    archive: &Path,
    destination: &Path,
    ctx: &OperationContext,
) -> Result<(), FsError> {
    let Some(target) = sanitize_entry_path(destination, entry.name()) else {
        return Err(FsError::corrupt(
            archive,
            format!("entry '{}' escapes the destination", entry.name()),
        ));
    };

    if entry.is_dir() {
        return ensure_dir(&target);
    }

    if let Some(parent) = target.parent() {
        ensure_dir(parent)?;
    }
    let target = resolve_conflict(ctx.config.conflict_policy, target)?;
    remove_existing_link(&target)?;

    let bytes = write_stream(entry, &target, ctx.config.buffer_size, |e| {
        archive_read_error(archive, e)
    })?;
    tracing::debug!(path = %target.display(), bytes, "extracted entry");
    Ok(())
}
