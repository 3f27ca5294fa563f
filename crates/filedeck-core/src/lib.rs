//! Core types for filedeck.
//!
//! This crate provides the fundamental data structures shared by the
//! walker and the operation engine: entry snapshots, the error taxonomy,
//! and engine configuration.

mod config;
mod entry;
mod error;

pub use config::{
    ConflictPolicy, DEFAULT_BUFFER_SIZE, DEFAULT_CHANNEL_SIZE, EngineConfig, EngineConfigBuilder,
};
pub use entry::{Entry, EntryKind, FileCategory};
pub use error::{ErrorKind, FsError};
