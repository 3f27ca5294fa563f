//! Blocking filesystem primitives shared by the streamed operations.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use filedeck_core::{EngineConfig, EntryKind, FsError};

use crate::context::OperationContext;

/// Copy one regular file with a buffered read/write loop.
///
/// Read failures are reported against `source`, write failures against
/// `target`. An existing target file is truncated; an existing symlink is
/// replaced, never written through.
pub(crate) fn copy_file(source: &Path, target: &Path, config: &EngineConfig) -> Result<u64, FsError> {
    let input = File::open(source).map_err(|e| FsError::io(source, e))?;
    let mut reader = BufReader::with_capacity(config.buffer_size.max(1), input);
    remove_existing_link(target)?;
    let output = File::create(target).map_err(|e| FsError::io(target, e))?;
    let mut writer = BufWriter::with_capacity(config.buffer_size.max(1), output);

    let mut copied = 0u64;
    loop {
        let chunk = match reader.fill_buf() {
            Ok(chunk) => chunk,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(FsError::io(source, e)),
        };
        if chunk.is_empty() {
            break;
        }
        let len = chunk.len();
        writer.write_all(chunk).map_err(|e| FsError::io(target, e))?;
        reader.consume(len);
        copied += len as u64;
    }

    let output = writer
        .into_inner()
        .map_err(|e| FsError::io(target, e.into_error()))?;

    if config.preserve_timestamps {
        let modified = fs::metadata(source)
            .and_then(|m| m.modified())
            .map_err(|e| FsError::io(source, e))?;
        output
            .set_modified(modified)
            .map_err(|e| FsError::io(target, e))?;
    }

    Ok(copied)
}

/// Stream `reader` into a new file at `target`, returning the bytes written.
///
/// Read errors are classified by `read_error`.
pub(crate) fn write_stream(
    reader: &mut dyn Read,
    target: &Path,
    buffer_size: usize,
    read_error: impl Fn(io::Error) -> FsError,
) -> Result<u64, FsError> {
    let output = File::create(target).map_err(|e| FsError::io(target, e))?;
    let mut writer = BufWriter::with_capacity(buffer_size.max(1), output);
    let mut buffer = vec![0u8; buffer_size.max(1)];

    let mut written = 0u64;
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(read_error(e)),
        };
        writer
            .write_all(&buffer[..n])
            .map_err(|e| FsError::io(target, e))?;
        written += n as u64;
    }

    writer.flush().map_err(|e| FsError::io(target, e))?;
    Ok(written)
}

/// Mirror the tree at `source` onto `target`.
///
/// Directories are created (merged if present), files buffer-copied and
/// symlinks re-created. Stops at the first unreadable entry.
pub(crate) fn copy_tree(source: &Path, target: &Path, ctx: &OperationContext) -> Result<u64, FsError> {
    let mut bytes = 0u64;

    for item in ctx.walker(source).walk() {
        let item = item?;
        ctx.check_cancelled()?;

        let dest = if item.relative.as_os_str().is_empty() {
            target.to_path_buf()
        } else {
            target.join(&item.relative)
        };

        match item.entry.kind {
            EntryKind::Directory => fs::create_dir_all(&dest).map_err(|e| FsError::io(&dest, e))?,
            EntryKind::File => bytes += copy_file(item.path(), &dest, &ctx.config)?,
            EntryKind::Symlink => copy_symlink(item.path(), &dest, &ctx.config)?,
            EntryKind::Other => {
                tracing::warn!(path = %item.path().display(), "skipping special file");
            }
        }
    }

    Ok(bytes)
}

/// Re-create the link at `source` as a new link at `target`.
#[cfg(unix)]
fn copy_symlink(source: &Path, target: &Path, _config: &EngineConfig) -> Result<(), FsError> {
    let link = fs::read_link(source).map_err(|e| FsError::io(source, e))?;

    match fs::symlink_metadata(target) {
        Ok(existing) if existing.is_dir() => {
            return Err(FsError::AlreadyExists {
                path: target.to_path_buf(),
            });
        }
        Ok(_) => fs::remove_file(target).map_err(|e| FsError::io(target, e))?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(FsError::io(target, e)),
    }

    std::os::unix::fs::symlink(&link, target).map_err(|e| FsError::io(target, e))
}

/// Copy the link's target contents; link creation needs privileges here.
#[cfg(not(unix))]
fn copy_symlink(source: &Path, target: &Path, config: &EngineConfig) -> Result<(), FsError> {
    copy_file(source, target, config).map(|_| ())
}

/// Recursively delete `path`, children before parents.
///
/// A path that no longer exists counts as deleted. Symlinks are removed,
/// never followed.
pub(crate) fn remove_tree(path: &Path, ctx: &OperationContext) -> Result<(), FsError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(FsError::io(path, e)),
    };

    if !metadata.is_dir() {
        return remove_one(path, false);
    }

    let items = ctx
        .walker(path)
        .walk()
        .collect::<Result<Vec<_>, FsError>>()?;

    for item in items.iter().rev() {
        ctx.check_cancelled()?;
        remove_one(item.path(), item.is_dir())?;
    }

    Ok(())
}

fn remove_one(path: &Path, is_dir: bool) -> Result<(), FsError> {
    let result = if is_dir {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(FsError::io(path, e)),
    }
}

/// Remove a symlink at `target` so the next write creates a fresh file.
pub(crate) fn remove_existing_link(target: &Path) -> Result<(), FsError> {
    match fs::symlink_metadata(target) {
        Ok(m) if m.file_type().is_symlink() => {
            fs::remove_file(target).map_err(|e| FsError::io(target, e))
        }
        _ => Ok(()),
    }
}

/// Create `dir` and its parents if missing.
pub(crate) fn ensure_dir(dir: &Path) -> Result<(), FsError> {
    fs::create_dir_all(dir).map_err(|e| FsError::io(dir, e))
}
