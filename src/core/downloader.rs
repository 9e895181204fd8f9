//! Format-fallback download orchestration

use crate::config::{
    DEFAULT_COMPAT_OPTIONS, DEFAULT_EXTRACTOR_ARGS, DEFAULT_EXTRACTOR_RETRIES,
    DEFAULT_FILE_SEARCH_WINDOW, DEFAULT_FORMATS, DEFAULT_SOCKET_TIMEOUT, DEFAULT_USER_AGENT,
};
use crate::core::{DownloadState, Progress};
use crate::error::ShareError;
use crate::tool::{ExternalTool, ToolRequest};
use crate::utils::locate_downloaded_file;
use crate::Result;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Listener receiving every state of a run, in order
pub type StateListener<'a> = &'a (dyn Fn(DownloadState) + Send + Sync);

/// Main downloader configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadOptions {
    /// Format selectors, tried in order
    pub formats: Vec<String>,
    /// Folder the tool writes into
    pub output_dir: PathBuf,
    /// User-Agent override passed to the tool
    pub user_agent: String,
    /// Extractor arguments passed to the tool
    pub extractor_args: String,
    /// Compatibility options passed to the tool
    pub compat_options: String,
    /// Extractor retries passed to the tool
    pub extractor_retries: u32,
    /// Socket timeout passed to the tool
    pub socket_timeout: Duration,
    /// Age limit for stray files picked up from the parent folder
    pub file_search_window: Duration,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            formats: DEFAULT_FORMATS.iter().map(|s| s.to_string()).collect(),
            output_dir: crate::config::default_output_dir(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            extractor_args: DEFAULT_EXTRACTOR_ARGS.to_string(),
            compat_options: DEFAULT_COMPAT_OPTIONS.to_string(),
            extractor_retries: DEFAULT_EXTRACTOR_RETRIES,
            socket_timeout: DEFAULT_SOCKET_TIMEOUT,
            file_search_window: DEFAULT_FILE_SEARCH_WINDOW,
        }
    }
}

/// Cloneable handle that requests cancellation of the current run.
///
/// Cancellation is checked before each tool invocation; an invocation that
/// is already running is allowed to finish.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Clears the running flag when a run ends, however it ends
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Main downloader struct
pub struct Downloader {
    options: DownloadOptions,
    tool: Arc<dyn ExternalTool>,
    cancel: CancelHandle,
    running: AtomicBool,
}

impl Downloader {
    /// Create a new downloader with default options
    pub fn new(tool: Arc<dyn ExternalTool>) -> Self {
        Self {
            options: DownloadOptions::default(),
            tool,
            cancel: CancelHandle::default(),
            running: AtomicBool::new(false),
        }
    }

    /// Replace all options
    pub fn with_options(mut self, options: DownloadOptions) -> Self {
        self.options = options;
        self
    }

    /// Set format selectors
    pub fn with_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.formats = formats.into_iter().map(Into::into).collect();
        self
    }

    /// Set output folder
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.output_dir = dir.into();
        self
    }

    pub fn options(&self) -> &DownloadOptions {
        &self.options
    }

    /// The tool used for invocations
    pub fn tool(&self) -> Arc<dyn ExternalTool> {
        Arc::clone(&self.tool)
    }

    /// Handle that can cancel runs of this downloader from elsewhere
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Request cancellation of the current run
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Check if a run is in progress
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Build the tool invocation for one format selector
    pub fn build_request(&self, url: &str, format: &str) -> ToolRequest {
        let template = self.options.output_dir.join("%(title)s.%(ext)s");

        ToolRequest::new(url)
            .option("-o", template.to_string_lossy())
            .flag("--restrict-filenames")
            .option("-f", format)
            .option("--extractor-args", self.options.extractor_args.as_str())
            .flag("--no-check-certificates")
            .option("--user-agent", self.options.user_agent.as_str())
            .option("--compat-options", self.options.compat_options.as_str())
            .option("--extractor-retries", self.options.extractor_retries.to_string())
            .option("--socket-timeout", self.options.socket_timeout.as_secs().to_string())
            .flag("--newline")
            .flag("--no-warnings")
            .flag("--ignore-errors")
    }

    /// Download `url`, trying each format selector in order.
    ///
    /// Every state is passed to `listener`; the terminal state is also
    /// returned. Fails only if another run is already in progress.
    pub async fn run(&self, url: &str, listener: StateListener<'_>) -> Result<DownloadState> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ShareError::AlreadyRunning);
        }
        let _guard = RunGuard(&self.running);

        self.cancel.reset();
        listener(DownloadState::Initializing);

        let state = self.run_attempts(url, listener).await;
        listener(state.clone());
        Ok(state)
    }

    async fn run_attempts(&self, url: &str, listener: StateListener<'_>) -> DownloadState {
        let formats = &self.options.formats;
        if formats.is_empty() {
            return DownloadState::Error {
                message: "No format options configured".to_string(),
            };
        }

        if let Err(e) = tokio::fs::create_dir_all(&self.options.output_dir).await {
            error!("Cannot create output folder {}: {}", self.options.output_dir.display(), e);
            return DownloadState::Error {
                message: ShareError::from(e).user_message(),
            };
        }

        let on_progress = |progress: Progress| {
            listener(DownloadState::Progress {
                percent: progress.percent,
                eta: progress.eta,
            })
        };

        let total = formats.len();
        for (index, format) in formats.iter().enumerate() {
            let is_last = index + 1 == total;

            if self.cancel.is_cancelled() {
                info!("Download cancelled by user");
                return DownloadState::Cancelled;
            }

            info!("Trying format: {} (attempt {}/{})", format, index + 1, total);
            let request = self.build_request(url, format);

            match self.tool.execute(&request, &on_progress).await {
                Ok(response) if response.is_success() => {
                    info!("Download successful with format: {}", format);
                    let file_path = locate_downloaded_file(
                        &self.options.output_dir,
                        &response.out,
                        self.options.file_search_window,
                    );
                    return DownloadState::Success { file_path };
                }
                Ok(response) => {
                    if self.cancel.is_cancelled() {
                        info!("Download cancelled by user");
                        return DownloadState::Cancelled;
                    }
                    if is_last {
                        let message = format!(
                            "Download failed with all format options. Exit code: {}. Output: {}",
                            response.exit_code,
                            response.out.trim()
                        );
                        error!("{}", message);
                        return DownloadState::Error { message };
                    }
                    warn!(
                        "Format {} failed (exit code: {}), trying next option...",
                        format, response.exit_code
                    );
                }
                Err(e) => {
                    warn!("Format {} failed with exception: {}", format, e);
                    if self.cancel.is_cancelled() {
                        info!("Download cancelled by user");
                        return DownloadState::Cancelled;
                    }
                    if is_last {
                        error!("Download error with all format options: {}", e);
                        return DownloadState::Error {
                            message: e.user_message(),
                        };
                    }
                }
            }
        }

        DownloadState::Error {
            message: "Download failed with all format options".to_string(),
        }
    }
}
