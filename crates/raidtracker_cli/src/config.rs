//! Command-line and environment configuration.
//!
//! # Responsibility
//! - Parse flags and subcommands.
//! - Resolve database and log locations, falling back to the per-user data
//!   directory.

use clap::{Parser, Subcommand};
use raidtracker_core::{default_log_level, Tier};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "raidtracker";
const DB_FILE_NAME: &str = "raidtracker.sqlite3";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Parser)]
#[command(name = "raidtracker", version)]
#[command(about = "Track weekly raid completion for your characters")]
pub struct Cli {
    /// SQLite file holding tracker state
    #[arg(long, env = "RAIDTRACKER_DB_PATH", value_name = "FILE")]
    pub db_path: Option<PathBuf>,

    /// Directory for rotating log files
    #[arg(long, env = "RAIDTRACKER_LOG_DIR", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "RAIDTRACKER_LOG_LEVEL", value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show every character and its completion marks (default)
    List,
    /// Add a character
    Add { name: String },
    /// Change a character's name
    Rename {
        /// Row number from `list`
        row: usize,
        name: String,
    },
    /// Set a character's gear score
    Score {
        /// Row number from `list`
        row: usize,
        value: String,
    },
    /// Flip one raid/size completion mark
    Toggle {
        /// Row number from `list`
        row: usize,
        /// Raid id, e.g. ICC
        activity: String,
        /// Raid size: 10 or 25
        tier: Tier,
    },
    /// Clear every completion mark for every character
    Reset,
    /// List the tracked raids
    Catalog,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl Cli {
    pub fn settings(&self) -> Settings {
        let data_dir = app_data_dir();
        Settings {
            db_path: self
                .db_path
                .as_deref()
                .map(absolutize)
                .unwrap_or_else(|| data_dir.join(DB_FILE_NAME)),
            log_dir: self
                .log_dir
                .as_deref()
                .map(absolutize)
                .unwrap_or_else(|| data_dir.join(LOG_DIR_NAME)),
            log_level: self
                .log_level
                .clone()
                .unwrap_or_else(|| default_log_level().to_string()),
        }
    }
}

fn app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_NAME)
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
