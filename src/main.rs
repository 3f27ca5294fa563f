//! filedeck - file operations with streamed progress.
//!
//! Usage:
//!   fdeck copy SRC... DEST           Copy entries into DEST
//!   fdeck move SRC... DEST           Move entries into DEST
//!   fdeck delete PATH...             Delete entries recursively
//!   fdeck compress SRC... -o ZIP     Pack entries into a zip archive
//!   fdeck extract ZIP DEST           Unpack a zip archive
//!   fdeck rename PATH NEW_NAME       Rename in place
//!   fdeck mkdir PARENT NAME          Create a folder
//!   fdeck size PATH                  Total size and item count
//!   fdeck ls [PATH]                  List a directory
//!   fdeck --help                     Show help

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};

use filedeck_core::{ConflictPolicy, EngineConfig, Entry};
use filedeck_ops::{OperationExecutor, ProgressStream};
use filedeck_walk::{TreeSummary, TreeWalker, list_directory};

#[derive(Parser)]
#[command(
    name = "filedeck",
    version,
    about = "File operations with streamed progress",
    long_about = "filedeck copies, moves, deletes, zips and unzips files, reporting \
                  progress for every top-level item.\n\n\
                  Operations stop at the first failure and report it."
)]
struct Cli {
    /// What to do when a destination already exists
    #[arg(long, global = true, value_enum)]
    on_conflict: Option<ConflictArg>,

    /// Engine configuration as a JSON file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print every progress event as a JSON line
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Copy files and directories into a destination directory
    Copy {
        /// Entries to copy
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Destination directory (created if missing)
        destination: PathBuf,
    },

    /// Move files and directories into a destination directory
    Move {
        /// Entries to move
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Destination directory (created if missing)
        destination: PathBuf,
    },

    /// Delete files and directories recursively
    Delete {
        /// Entries to delete
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Pack files and directories into a zip archive
    Compress {
        /// Entries to pack
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Archive to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Unpack a zip archive
    Extract {
        /// Archive to read
        archive: PathBuf,

        /// Destination directory (created if missing)
        #[arg(default_value = ".")]
        destination: PathBuf,
    },

    /// Rename a file or directory in place
    Rename {
        /// Entry to rename
        path: PathBuf,

        /// New name (not a path)
        new_name: String,
    },

    /// Create a folder
    Mkdir {
        /// Parent directory
        parent: PathBuf,

        /// Folder name
        name: String,
    },

    /// Show total size and item count
    Size {
        /// Path to measure
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// List a directory
    Ls {
        /// Directory to list
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Include dot-files
        #[arg(short, long)]
        all: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ConflictArg {
    Overwrite,
    Fail,
    Rename,
}

impl From<ConflictArg> for ConflictPolicy {
    fn from(arg: ConflictArg) -> Self {
        match arg {
            ConflictArg::Overwrite => Self::Overwrite,
            ConflictArg::Fail => Self::Fail,
            ConflictArg::Rename => Self::AutoRename,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.on_conflict)?;
    let executor = OperationExecutor::with_config(config);
    let json = cli.json;

    match cli.command {
        Command::Copy {
            sources,
            destination,
        } => {
            let entries = snapshot(&sources)?;
            report(executor.copy(entries, destination), json).await?;
        }
        Command::Move {
            sources,
            destination,
        } => {
            let entries = snapshot(&sources)?;
            report(executor.move_to(entries, destination), json).await?;
        }
        Command::Delete { paths } => {
            let entries = snapshot(&paths)?;
            report(executor.delete(entries), json).await?;
        }
        Command::Compress { sources, output } => {
            let entries = snapshot(&sources)?;
            let Some(name) = output.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                bail!("Archive path has no file name: {}", output.display());
            };
            let destination = match output.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            report(executor.compress(entries, destination, name), json).await?;
        }
        Command::Extract {
            archive,
            destination,
        } => {
            report(executor.extract(archive, destination), json).await?;
        }
        Command::Rename { path, new_name } => {
            let entry = Entry::from_path(&path).wrap_err("Invalid path")?;
            let renamed = executor.rename(&entry, &new_name).await?;
            print_entry_result(&renamed, json)?;
        }
        Command::Mkdir { parent, name } => {
            let created = executor.create_folder(parent, &name).await?;
            print_entry_result(&created, json)?;
        }
        Command::Size { path } => run_size(&path, json)?,
        Command::Ls { path, all } => run_ls(&path, all, json)?,
    }

    Ok(())
}

/// Build the engine configuration from an optional file and CLI overrides.
fn load_config(path: Option<&Path>, on_conflict: Option<ConflictArg>) -> Result<EngineConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str::<EngineConfig>(&text)
                .wrap_err_with(|| format!("Invalid config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    if let Err(reason) = config.validate() {
        bail!("Invalid config: {reason}");
    }

    if let Some(arg) = on_conflict {
        config.conflict_policy = arg.into();
    }

    Ok(config)
}

/// Snapshot the given paths as entries.
fn snapshot(paths: &[PathBuf]) -> Result<Vec<Entry>> {
    paths
        .iter()
        .map(|path| {
            Entry::from_path(path).wrap_err_with(|| format!("Invalid path {}", path.display()))
        })
        .collect()
}

/// Print progress until the terminal event, failing if it carries an error.
async fn report(mut progress: ProgressStream, json: bool) -> Result<()> {
    while let Some(event) = progress.next().await {
        if json {
            println!("{}", serde_json::to_string(&event)?);
        } else if !event.is_complete {
            if event.total_items > 0 {
                eprintln!(
                    "[{}/{}] {}",
                    event.processed_items + 1,
                    event.total_items,
                    event.current_entry
                );
            } else {
                eprintln!("[{}] {}", event.processed_items + 1, event.current_entry);
            }
        }

        if event.is_complete {
            if let Some(error) = &event.error {
                bail!("{error}");
            }
            if !json {
                println!("{}", event.summary());
            }
        }
    }

    Ok(())
}

fn print_entry_result(entry: &Entry, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(entry)?);
    } else {
        println!("{}", entry.path.display());
    }
    Ok(())
}

/// Show the total size and item count below a path.
fn run_size(path: &Path, json: bool) -> Result<()> {
    if !path.exists() {
        bail!("Path not found: {}", path.display());
    }

    let summary = TreeSummary::collect(&TreeWalker::new(path));
    let items = if path.is_dir() { summary.total_items() } else { 0 };

    if json {
        let value = serde_json::json!({
            "path": path,
            "bytes": summary.bytes,
            "files": summary.files,
            "dirs": summary.dirs,
            "items": items,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!(
            "{}  {} ({} files, {} directories)",
            path.display(),
            format_size(summary.bytes),
            summary.files,
            summary.dirs
        );
    }

    Ok(())
}

/// List a directory, directories marked with a trailing slash.
fn run_ls(path: &Path, all: bool, json: bool) -> Result<()> {
    let entries: Vec<Entry> = list_directory(path)
        .wrap_err("Failed to list directory")?
        .into_iter()
        .filter(|e| all || !e.is_hidden())
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in &entries {
        let name = if entry.is_dir() {
            format!("{}/", entry.name)
        } else {
            entry.name.to_string()
        };
        println!(
            "{:<40} {:>10}  {:<10}  {}",
            truncate(&name, 40),
            entry.formatted_size(),
            entry.category(),
            entry.formatted_date()
        );
    }

    Ok(())
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Truncate a string to max length.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 1).collect();
        format!("{head}…")
    }
}
