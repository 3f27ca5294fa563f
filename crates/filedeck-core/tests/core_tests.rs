use filedeck_core::{
    ConflictPolicy, EngineConfig, Entry, EntryKind, ErrorKind, FileCategory, FsError,
};
use std::fs;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

#[test]
fn test_entry_snapshot_fields() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("photo.JPG");
    fs::write(&path, vec![0u8; 2048]).unwrap();

    let entry = Entry::from_path(&path).unwrap();

    assert_eq!(entry.name.as_str(), "photo.JPG");
    assert_eq!(entry.path, path);
    assert_eq!(entry.kind, EntryKind::File);
    assert_eq!(entry.size, 2048);
    assert_eq!(entry.extension.as_str(), "jpg");
    assert_eq!(entry.category(), FileCategory::Image);
    assert!(!entry.is_hidden());
    assert!(!entry.readonly);
    assert!(entry.formatted_size().contains("KB"));
}

#[test]
fn test_entry_snapshot_is_not_live() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("notes.txt");
    fs::write(&path, b"first").unwrap();

    let entry = Entry::from_path(&path).unwrap();
    fs::write(&path, b"first and second").unwrap();

    // The snapshot keeps the size observed at listing time
    assert_eq!(entry.size, 5);
    assert_eq!(Entry::from_path(&path).unwrap().size, 16);
}

#[test]
fn test_hidden_and_extensionless_entries() {
    let temp = TempDir::new().unwrap();
    let hidden = temp.path().join(".bashrc");
    fs::write(&hidden, b"").unwrap();
    let plain = temp.path().join("Makefile");
    fs::write(&plain, b"all:").unwrap();

    let hidden = Entry::from_path(&hidden).unwrap();
    assert!(hidden.is_hidden());
    assert!(hidden.extension.is_empty());

    let plain = Entry::from_path(&plain).unwrap();
    assert!(!plain.is_hidden());
    assert_eq!(plain.category(), FileCategory::Unknown);
}

#[test]
fn test_directory_entry_has_no_extension() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("backup.d");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("inner.txt"), b"data").unwrap();

    let entry = Entry::from_path(&dir).unwrap();
    assert!(entry.is_dir());
    assert!(!entry.is_file());
    assert_eq!(entry.size, 0);
    assert!(entry.extension.is_empty());
}

#[cfg(unix)]
#[test]
fn test_symlink_entry_is_not_followed() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("target_dir");
    fs::create_dir(&target).unwrap();
    let link = temp.path().join("link");
    std::os::unix::fs::symlink(&target, &link).unwrap();

    let entry = Entry::from_path(&link).unwrap();
    assert_eq!(entry.kind, EntryKind::Symlink);
    assert!(!entry.is_dir());
}

#[test]
fn test_formatted_date_shape() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("a.txt");
    fs::write(&path, b"a").unwrap();

    let mut entry = Entry::from_path(&path).unwrap();
    entry.modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);

    let formatted = entry.formatted_date();
    // "Nov 14, 2023 22:13" in UTC; exact value depends on local time zone
    assert!(formatted.contains(", 2023 "));
    assert_eq!(formatted.len(), "Nov 14, 2023 22:13".len());
}

#[test]
fn test_entry_serde_roundtrip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("data.json");
    fs::write(&path, b"{}").unwrap();

    let entry = Entry::from_path(&path).unwrap();
    let json = serde_json::to_string(&entry).unwrap();
    let back: Entry = serde_json::from_str(&json).unwrap();
    assert_eq!(back, entry);
}

#[test]
fn test_engine_config_from_partial_json() {
    let config: EngineConfig =
        serde_json::from_str(r#"{ "conflict_policy": "auto_rename" }"#).unwrap();

    assert_eq!(config.conflict_policy, ConflictPolicy::AutoRename);
    assert_eq!(config.buffer_size, filedeck_core::DEFAULT_BUFFER_SIZE);
    assert_eq!(config.channel_size, filedeck_core::DEFAULT_CHANNEL_SIZE);
    assert_eq!(config.walk_threads, 0);
}

#[test]
fn test_error_kinds_and_messages() {
    let err = FsError::invalid_name("a/b", "Name cannot contain '/'");
    assert_eq!(err.kind(), ErrorKind::InvalidName);
    assert_eq!(err.to_string(), "Invalid name 'a/b': Name cannot contain '/'");

    let err = FsError::corrupt("/tmp/x.zip", "Invalid local file header");
    assert_eq!(err.kind(), ErrorKind::ArchiveCorrupt);
    assert!(err.to_string().contains("/tmp/x.zip"));

    assert_eq!(FsError::Cancelled.kind(), ErrorKind::Cancelled);
    assert_eq!(ErrorKind::Io.to_string(), "I/O failure");
}
