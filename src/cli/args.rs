//! Command line argument parsing

use crate::config::Config;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// EasyShare - download shared videos with yt-dlp
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config file (JSON)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the yt-dlp binary
    #[arg(long, global = true, value_name = "PATH")]
    pub tool: Option<PathBuf>,

    /// Download folder
    #[arg(short, long, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// History database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Socket timeout passed to yt-dlp (e.g., 30s, 1m)
    #[arg(long, global = true, value_name = "DURATION")]
    pub socket_timeout: Option<humantime::Duration>,

    /// Verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Quiet output (only errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Download a video, trying each format until one works
    Download(DownloadArgs),
    /// Update yt-dlp to the latest version
    Update,
    /// Browse and manage download history
    #[command(subcommand)]
    History(HistoryCommand),
    /// Print easyshare and yt-dlp versions
    Version,
}

#[derive(ClapArgs, Debug, Clone, PartialEq)]
pub struct DownloadArgs {
    /// Video URL
    pub url: String,

    /// Format selector to try, in order (repeatable; replaces the defaults)
    #[arg(short, long = "format", value_name = "FORMAT")]
    pub formats: Vec<String>,

    /// Disable progress output
    #[arg(long)]
    pub no_progress: bool,

    /// Don't record the download in history
    #[arg(long)]
    pub no_history: bool,

    /// Update yt-dlp before downloading
    #[arg(long)]
    pub update: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum HistoryCommand {
    /// List downloads, newest first
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one download
    Show { id: i64 },
    /// Remove one download from history (the file is kept)
    Delete { id: i64 },
    /// Remove all downloads from history
    Clear,
    /// Open the folder containing a downloaded file
    Open { id: i64 },
    /// Print a downloaded file's path, URI and MIME type as JSON
    Share { id: i64 },
}

impl Args {
    /// Get output verbosity level
    pub fn verbosity_level(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    /// Layer command-line overrides on top of a loaded config
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(tool) = &self.tool {
            config.tool_path = tool.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = Some(dir.clone());
        }
        if let Some(db) = &self.db {
            config.database_path = Some(db.clone());
        }
        if let Some(timeout) = self.socket_timeout {
            config.socket_timeout = timeout.to_string();
        }
        if let Command::Download(download) = &self.command {
            if !download.formats.is_empty() {
                config.formats = download.formats.clone();
            }
            if download.no_history {
                config.record_history = false;
            }
        }
    }
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbosityLevel {
    /// Quiet (only errors)
    Quiet,
    /// Normal
    Normal,
    /// Verbose (debug info)
    Verbose,
}
