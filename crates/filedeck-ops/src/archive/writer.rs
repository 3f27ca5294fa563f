//! Streaming zip writer.

use std::fs::{File, Metadata};
use std::io::{self, Read, Seek, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use filedeck_core::{DEFAULT_BUFFER_SIZE, FsError};

use super::zip_error;

/// Entries at or above this size need zip64 headers.
const ZIP64_THRESHOLD: u64 = 0xFFFF_FFFF;

/// Writes entries into a zip container.
pub struct ArchiveWriter<W: Write + Seek> {
    inner: ZipWriter<W>,
    path: PathBuf,
    buffer_size: usize,
}

impl<W: Write + Seek> ArchiveWriter<W> {
    /// Create a writer over `writer`; `path` names the archive in errors.
    pub fn new(writer: W, path: impl Into<PathBuf>) -> Self {
        Self {
            inner: ZipWriter::new(writer),
            path: path.into(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Set the copy buffer size.
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    fn options(size_hint: u64, mode: Option<u32>) -> SimpleFileOptions {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(size_hint >= ZIP64_THRESHOLD);
        match mode {
            Some(mode) => options.unix_permissions(mode),
            None => options,
        }
    }

    /// Add an explicit directory record. A trailing `/` is appended if missing.
    pub fn add_directory(&mut self, name: &str) -> Result<(), FsError> {
        let mut name = name.to_string();
        if !name.ends_with('/') {
            name.push('/');
        }
        self.inner
            .add_directory(name, Self::options(0, None))
            .map_err(|e| zip_error(&self.path, e))
    }

    /// Add the regular file at `source` under `name`, returning bytes read.
    pub fn add_file(&mut self, name: &str, source: &Path) -> Result<u64, FsError> {
        let mut file = File::open(source).map_err(|e| FsError::io(source, e))?;
        let metadata = file.metadata().map_err(|e| FsError::io(source, e))?;

        self.inner
            .start_file(name, Self::options(metadata.len(), unix_mode(&metadata)))
            .map_err(|e| zip_error(&self.path, e))?;

        let mut buffer = vec![0u8; self.buffer_size];
        let mut total = 0u64;
        loop {
            let n = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(FsError::io(source, e)),
            };
            self.inner
                .write_all(&buffer[..n])
                .map_err(|e| FsError::io(&self.path, e))?;
            total += n as u64;
        }

        Ok(total)
    }

    /// Write the central directory and return the underlying writer.
    pub fn finish(self) -> Result<W, FsError> {
        self.inner.finish().map_err(|e| zip_error(&self.path, e))
    }
}

#[cfg(unix)]
fn unix_mode(metadata: &Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode())
}

#[cfg(not(unix))]
fn unix_mode(_metadata: &Metadata) -> Option<u32> {
    None
}
