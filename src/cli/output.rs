//! Output formatting and progress display

use crate::cli::args::VerbosityLevel;
use crate::core::{DownloadState, UpdateState};
use crate::history::HistoryRecord;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Shown after a failed download
pub const UPDATE_HINT: &str = "Try running 'easyshare update' to get the latest yt-dlp version";

/// Output formatter for easyshare
pub struct OutputFormatter {
    verbosity: VerbosityLevel,
    show_progress: bool,
    progress_bar: Mutex<Option<ProgressBar>>,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            show_progress: verbosity != VerbosityLevel::Quiet,
            progress_bar: Mutex::new(None),
        }
    }

    /// Disable the progress bar while keeping other output
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    fn bar(&self) -> std::sync::MutexGuard<'_, Option<ProgressBar>> {
        self.progress_bar.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn create_progress_bar() -> ProgressBar {
        let progress_bar = ProgressBar::new(1000);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {msg}")
        {
            progress_bar.set_style(style.progress_chars("#>-"));
        }
        progress_bar
    }

    fn finish_progress(&self, message: String) {
        if let Some(progress_bar) = self.bar().take() {
            progress_bar.finish_with_message(message);
        }
    }

    /// Render one download state
    pub fn render_state(&self, state: &DownloadState) {
        match state {
            DownloadState::Initializing => {
                self.info(&state.status_line());
            }
            DownloadState::Progress { percent, .. } => {
                if !self.show_progress {
                    return;
                }
                let mut bar = self.bar();
                let progress_bar = bar.get_or_insert_with(Self::create_progress_bar);
                progress_bar.set_position((percent.clamp(0.0, 100.0) * 10.0) as u64);
                progress_bar.set_message(state.status_line());
            }
            DownloadState::Success { file_path } => {
                self.finish_progress(state.status_line());
                self.success(&state.status_line());
                if self.verbosity != VerbosityLevel::Quiet {
                    println!("💾 Saved to: {}", file_path.display().to_string().bold());
                }
            }
            DownloadState::Error { message } => {
                self.finish_progress(state.status_line());
                self.error(message);
                if self.verbosity != VerbosityLevel::Quiet {
                    eprintln!("💡 {}", UPDATE_HINT);
                }
            }
            DownloadState::Cancelled => {
                self.finish_progress(state.status_line());
                self.warning(&state.status_line());
            }
        }
    }

    /// Render one update state
    pub fn render_update(&self, state: &UpdateState) {
        match state {
            UpdateState::Idle => {}
            UpdateState::Updating => self.info("Updating yt-dlp..."),
            UpdateState::Success(message) => self.success(message),
            UpdateState::Error(message) => self.error(message),
        }
    }

    /// Print the history table
    pub fn print_history(&self, records: &[HistoryRecord]) {
        if records.is_empty() {
            self.info("No downloads yet");
            return;
        }

        for record in records {
            let missing = if record.file_exists() {
                String::new()
            } else {
                format!(" {}", "(file missing)".red())
            };
            println!(
                "{:>5}  {}  {}  {}{}",
                record.id.to_string().cyan(),
                record.formatted_date(),
                format!("{:>12}", record.formatted_file_size()).dimmed(),
                record.title.bold(),
                missing
            );
        }
    }

    /// Print one history record in full
    pub fn print_record(&self, record: &HistoryRecord) {
        println!("📹 {}", record.title.bold());
        println!("🔗 URL: {}", record.source_url);
        println!("💾 File: {}", record.file_path.display());
        println!("📊 Size: {}", record.formatted_file_size());
        println!("🕒 Downloaded: {}", record.formatted_date());
        if let Some(thumbnail) = &record.thumbnail_url {
            println!("🖼️  Thumbnail: {}", thumbnail);
        }
    }

    /// Print info message
    pub fn info(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            println!("ℹ️  {}", message);
        }
    }

    /// Print success message
    pub fn success(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            println!("✅ {}", message.green());
        }
    }

    /// Print warning message
    pub fn warning(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            eprintln!("⚠️  {}", message.yellow());
        }
    }

    /// Print error message
    pub fn error(&self, message: &str) {
        eprintln!("❌ {}", message.red());
    }

    /// Print debug message
    pub fn debug(&self, message: &str) {
        if self.verbosity == VerbosityLevel::Verbose {
            println!("🐛 {}", message);
        }
    }

    /// Print version information
    pub fn print_version(&self, tool_version: Option<&str>) {
        println!("easyshare version {}", env!("CARGO_PKG_VERSION"));
        match tool_version {
            Some(version) => println!("yt-dlp version {}", version),
            None => println!("yt-dlp not found"),
        }
    }
}
