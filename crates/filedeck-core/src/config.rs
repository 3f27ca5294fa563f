//! Engine configuration types.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Default copy buffer size (64 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Default progress channel capacity.
pub const DEFAULT_CHANNEL_SIZE: usize = 100;

/// What to do when a destination path already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Overwrite files and merge directories.
    #[default]
    Overwrite,
    /// Stop the operation with an `AlreadyExists` error.
    Fail,
    /// Pick a free name such as `file (1).txt`.
    AutoRename,
}

/// Configuration shared by every operation the engine runs.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct EngineConfig {
    /// Collision handling for copy, move, compress and extract.
    #[builder(default)]
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,

    /// Buffer size used for byte copies.
    #[builder(default = "DEFAULT_BUFFER_SIZE")]
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Capacity of each operation's progress channel.
    #[builder(default = "DEFAULT_CHANNEL_SIZE")]
    #[serde(default = "default_channel_size")]
    pub channel_size: usize,

    /// Number of threads for tree walks (0 = auto-detect, 1 = serial).
    #[builder(default = "0")]
    #[serde(default)]
    pub walk_threads: usize,

    /// Carry modification times over to copied files.
    #[builder(default = "false")]
    #[serde(default)]
    pub preserve_timestamps: bool,
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

fn default_channel_size() -> usize {
    DEFAULT_CHANNEL_SIZE
}

fn validate_sizes(buffer_size: usize, channel_size: usize) -> Result<(), String> {
    if buffer_size == 0 {
        return Err("Buffer size must be greater than zero".to_string());
    }
    if channel_size == 0 {
        return Err("Channel size must be greater than zero".to_string());
    }
    Ok(())
}

impl EngineConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        validate_sizes(
            self.buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE),
            self.channel_size.unwrap_or(DEFAULT_CHANNEL_SIZE),
        )
    }
}

impl EngineConfig {
    /// Create a new config builder.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Check a config that did not come through the builder, e.g. one
    /// deserialized from a file.
    pub fn validate(&self) -> Result<(), String> {
        validate_sizes(self.buffer_size, self.channel_size)
    }

    /// Default configuration with a different conflict policy.
    pub fn with_policy(conflict_policy: ConflictPolicy) -> Self {
        Self {
            conflict_policy,
            ..Self::default()
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            conflict_policy: ConflictPolicy::default(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            channel_size: DEFAULT_CHANNEL_SIZE,
            walk_threads: 0,
            preserve_timestamps: false,
        }
    }
}
