//! Zip reader over a seekable archive.

use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use filedeck_core::FsError;

use super::zip_error;

/// Size of the end-of-central-directory record, the smallest valid archive.
const MIN_ARCHIVE_LEN: u64 = 22;

/// Reads zip entries one at a time in container order.
///
/// Only the central directory is read up front; entry contents are
/// decompressed while the caller reads them. Entry sizes come from the
/// central directory, so entries that carry a trailing data descriptor
/// read the same as any other.
pub struct ArchiveReader<R: Read + Seek> {
    archive: ZipArchive<R>,
    path: PathBuf,
    next: usize,
}

/// One entry of an archive being read.
///
/// Reading yields the decompressed bytes. Dropping the entry skips the
/// remainder of its data.
pub struct ArchiveEntry<'a> {
    name: String,
    is_dir: bool,
    size: u64,
    content: Box<dyn Read + 'a>,
}

impl<R: Read + Seek> ArchiveReader<R> {
    /// Open the archive in `reader`; `path` names the archive in errors.
    ///
    /// Input too short for an end record, or without a readable central
    /// directory, is `ArchiveCorrupt`.
    pub fn open(mut reader: R, path: impl Into<PathBuf>) -> Result<Self, FsError> {
        let path = path.into();

        let len = reader
            .seek(SeekFrom::End(0))
            .and_then(|len| reader.rewind().map(|()| len))
            .map_err(|e| FsError::io(&path, e))?;
        if len < MIN_ARCHIVE_LEN {
            return Err(FsError::corrupt(&path, "too short to be a zip archive"));
        }

        let archive = ZipArchive::new(reader).map_err(|e| zip_error(&path, e))?;
        Ok(Self {
            archive,
            path,
            next: 0,
        })
    }

    /// The archive path used in errors.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries in the archive.
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Check if the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    /// The next entry in container order, or `None` after the last one.
    pub fn next_entry(&mut self) -> Result<Option<ArchiveEntry<'_>>, FsError> {
        if self.next >= self.archive.len() {
            return Ok(None);
        }

        let index = self.next;
        self.next += 1;

        let file = self
            .archive
            .by_index(index)
            .map_err(|e| zip_error(&self.path, e))?;
        Ok(Some(ArchiveEntry {
            name: file.name().to_string(),
            is_dir: file.is_dir(),
            size: file.size(),
            content: Box::new(file),
        }))
    }
}

impl ArchiveEntry<'_> {
    /// Entry name as stored, `/`-separated.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if this entry is a directory record.
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Uncompressed size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Read for ArchiveEntry<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.content.read(buf)
    }
}

impl<R: Read + Seek> std::fmt::Debug for ArchiveReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveReader")
            .field("path", &self.path)
            .field("entries", &self.archive.len())
            .field("next", &self.next)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for ArchiveEntry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveEntry")
            .field("name", &self.name)
            .field("is_dir", &self.is_dir)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::archive::ArchiveWriter;

    fn build_archive(dir: &Path) -> Vec<u8> {
        std::fs::write(dir.join("hello.txt"), b"hello archive").unwrap();
        let mut writer = ArchiveWriter::new(Cursor::new(Vec::new()), "test.zip");
        writer.add_directory("docs").unwrap();
        writer.add_file("docs/hello.txt", &dir.join("hello.txt")).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_reads_entries_in_order() {
        let temp = tempfile::tempdir().unwrap();
        let bytes = build_archive(temp.path());
        let mut reader = ArchiveReader::open(Cursor::new(bytes), "test.zip").unwrap();
        assert_eq!(reader.len(), 2);

        let dir = reader.next_entry().unwrap().unwrap();
        assert_eq!(dir.name(), "docs/");
        assert!(dir.is_dir());
        drop(dir);

        let mut file = reader.next_entry().unwrap().unwrap();
        assert_eq!(file.name(), "docs/hello.txt");
        assert!(!file.is_dir());
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        assert_eq!(content, "hello archive");
        drop(file);

        assert!(reader.next_entry().unwrap().is_none());
        assert!(reader.next_entry().unwrap().is_none());
    }

    #[test]
    fn test_skipping_entry_content() {
        let temp = tempfile::tempdir().unwrap();
        let bytes = build_archive(temp.path());
        let mut reader = ArchiveReader::open(Cursor::new(bytes), "test.zip").unwrap();

        let mut names = Vec::new();
        while let Some(entry) = reader.next_entry().unwrap() {
            names.push(entry.name().to_string());
        }
        assert_eq!(names, vec!["docs/", "docs/hello.txt"]);
    }

    #[test]
    fn test_empty_archive_has_no_entries() {
        let writer = ArchiveWriter::new(Cursor::new(Vec::new()), "empty.zip");
        let bytes = writer.finish().unwrap().into_inner();
        let mut reader = ArchiveReader::open(Cursor::new(bytes), "empty.zip").unwrap();
        assert!(reader.is_empty());
        assert!(reader.next_entry().unwrap().is_none());
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let err = ArchiveReader::open(Cursor::new(b"not a zip at all".to_vec()), "bad.zip").unwrap_err();
        assert!(matches!(err, FsError::ArchiveCorrupt { .. }));

        let padded = vec![b'x'; 4096];
        let err = ArchiveReader::open(Cursor::new(padded), "bad.zip").unwrap_err();
        assert!(matches!(err, FsError::ArchiveCorrupt { .. }));
    }

    #[test]
    fn test_zero_bytes_is_corrupt() {
        let err = ArchiveReader::open(Cursor::new(Vec::new()), "empty.bin").unwrap_err();
        assert!(matches!(err, FsError::ArchiveCorrupt { .. }));
    }

    #[test]
    fn test_truncated_archive_is_corrupt() {
        let temp = tempfile::tempdir().unwrap();
        let bytes = build_archive(temp.path());
        // The end record is gone
        let truncated = bytes[..bytes.len() - 10].to_vec();
        let err = ArchiveReader::open(Cursor::new(truncated), "cut.zip").unwrap_err();
        assert!(matches!(err, FsError::ArchiveCorrupt { .. }));
    }

    /// A stored entry whose CRC and sizes follow its data in a descriptor,
    /// as written by producers that cannot seek back.
    fn data_descriptor_archive(name: &str, content: &[u8], crc: u32) -> Vec<u8> {
        let len = content.len() as u32;
        let mut out = Vec::new();

        // Local header with bit 3 set and zeroed CRC and sizes
        out.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes());
        out.extend_from_slice(&0x0008u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0x0021u16.to_le_bytes());
        out.extend_from_slice(&[0u8; 12]);
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(content);

        out.extend_from_slice(&0x0807_4b50u32.to_le_bytes());
        out.extend_from_slice(&crc.to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());

        let central_offset = out.len() as u32;
        out.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes());
        out.extend_from_slice(&0x0008u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0x0021u16.to_le_bytes());
        out.extend_from_slice(&crc.to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&[0u8; 12]);
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(name.as_bytes());
        let central_len = out.len() as u32 - central_offset;

        out.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
        out.extend_from_slice(&[0u8; 4]);
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&central_len.to_le_bytes());
        out.extend_from_slice(&central_offset.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out
    }

    #[test]
    fn test_reads_entry_with_data_descriptor() {
        let bytes = data_descriptor_archive("hello.txt", b"hello", 0x3610_a686);
        let mut reader = ArchiveReader::open(Cursor::new(bytes), "dd.zip").unwrap();

        let mut entry = reader.next_entry().unwrap().unwrap();
        assert_eq!(entry.name(), "hello.txt");
        assert_eq!(entry.size(), 5);
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "hello");
        drop(entry);

        assert!(reader.next_entry().unwrap().is_none());
    }
}
