//! Streamed zip compression.

use std::fs::{self, File};
use std::io::{BufWriter, Seek, Write};
use std::path::{Path, PathBuf};

use filedeck_core::{Entry, EntryKind, FsError};

use crate::archive::ArchiveWriter;
use crate::conflict::{absolute_location, resolve_conflict};
use crate::context::{OperationContext, Tracker, item_count, spawn_operation};
use crate::operation::OperationError;
use crate::progress::{OperationKind, ProgressStream};
use crate::rename::validate_filename;

/// Start packing `entries` into `destination/archive_name`.
///
/// Each top-level entry is one processed item. A partially written archive
/// is removed when the operation fails.
pub fn start_compress(
    entries: Vec<Entry>,
    destination: PathBuf,
    archive_name: String,
    ctx: &OperationContext,
) -> ProgressStream {
    let total = item_count(&entries);
    let worker_ctx = ctx.clone();

    spawn_operation(OperationKind::Compress, total, ctx, move |tracker| {
        compress_into(tracker, &entries, &destination, &archive_name, &worker_ctx)
    })
}

fn compress_into(
    tracker: &mut Tracker,
    entries: &[Entry],
    destination: &Path,
    archive_name: &str,
    ctx: &OperationContext,
) -> Result<(), OperationError> {
    let planned = destination.join(archive_name);
    let archive_path = validate_filename(archive_name)
        .and_then(|()| fs::create_dir_all(destination).map_err(|e| FsError::io(destination, e)))
        .and_then(|()| resolve_conflict(ctx.config.conflict_policy, planned.clone()))
        .and_then(|path| reject_input_target(entries, &path).map(|()| path))
        .map_err(|err| tracker.fail(archive_name, &planned, &err))?;

    let file = File::create(&archive_path)
        .map_err(|e| tracker.fail(archive_name, &archive_path, &FsError::io(&archive_path, e)))?;
    // Entries never include the archive itself
    let skip = fs::canonicalize(&archive_path).unwrap_or_else(|_| archive_path.clone());

    let mut writer = ArchiveWriter::new(BufWriter::new(file), &archive_path)
        .buffer_size(ctx.config.buffer_size);

    let result = tracker
        .for_each_entry(entries, |entry| add_entry(&mut writer, entry, &skip, ctx))
        .and_then(|()| {
            writer
                .finish()
                .and_then(|mut out| out.flush().map_err(|e| FsError::io(&archive_path, e)))
                .map_err(|err| tracker.fail(archive_name, &archive_path, &err))
        });

    if result.is_err() {
        if let Err(err) = fs::remove_file(&archive_path) {
            tracing::warn!(path = %archive_path.display(), error = %err, "failed to remove partial archive");
        }
    }

    result
}

/// Refuse an archive path that names one of the entries being packed.
fn reject_input_target(entries: &[Entry], archive_path: &Path) -> Result<(), FsError> {
    let target = absolute_location(archive_path)?;
    // A vanished entry is reported when its turn comes
    let overlaps = entries
        .iter()
        .any(|entry| absolute_location(&entry.path).is_ok_and(|source| source == target));

    if overlaps {
        return Err(FsError::SameFile { path: target });
    }
    Ok(())
}

/// Add one top-level entry and everything below it.
fn add_entry<W: Write + Seek>(
    writer: &mut ArchiveWriter<W>,
    entry: &Entry,
    skip: &Path,
    ctx: &OperationContext,
) -> Result<(), FsError> {
    let root = absolute_location(&entry.path)?;

    for item in ctx.walker(&root).walk() {
        let item = item?;
        ctx.check_cancelled()?;

        if item.path() == skip {
            continue;
        }

        let name = if item.relative.as_os_str().is_empty() {
            entry.name.to_string()
        } else {
            format!("{}/{}", entry.name, item.relative_name())
        };

        match item.entry.kind {
            EntryKind::Directory => writer.add_directory(&name)?,
            EntryKind::File => {
                writer.add_file(&name, item.path())?;
            }
            EntryKind::Symlink if item.path().is_file() => {
                writer.add_file(&name, item.path())?;
            }
            EntryKind::Symlink | EntryKind::Other => {
                tracing::warn!(path = %item.path().display(), "skipping entry that is not a regular file");
            }
        }
    }

    Ok(())
}
