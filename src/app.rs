//! Application service tying downloads, tool updates and history together

use crate::core::{CancelHandle, DownloadState, Downloader, StateListener, UpdateState};
use crate::error::ShareError;
use crate::history::{HistoryStore, NewHistoryRecord};
use crate::utils::source_url;
use crate::Result;
use std::sync::Arc;
use tracing::{error, info, warn};

/// High-level operations behind the command line
pub struct ShareApp {
    downloader: Downloader,
    history: Arc<HistoryStore>,
    record_history: bool,
}

impl ShareApp {
    pub fn new(downloader: Downloader, history: Arc<HistoryStore>) -> Self {
        Self {
            downloader,
            history,
            record_history: true,
        }
    }

    /// Turn history recording on or off
    pub fn with_history_recording(mut self, enabled: bool) -> Self {
        self.record_history = enabled;
        self
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    pub fn downloader(&self) -> &Downloader {
        &self.downloader
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.downloader.cancel_handle()
    }

    /// Request cancellation of the running download
    pub fn cancel(&self) {
        self.downloader.cancel();
    }

    /// Download `url` and record it in history on success.
    ///
    /// Blank input is reported as an `Error` state without starting a run.
    /// Anything else is passed to the tool as typed, minus surrounding
    /// whitespace.
    pub async fn download(&self, url: &str, listener: StateListener<'_>) -> Result<DownloadState> {
        let url = match source_url(url) {
            Ok(url) => url,
            Err(e) => {
                let state = DownloadState::Error {
                    message: input_error_message(&e),
                };
                listener(state.clone());
                return Ok(state);
            }
        };

        info!("Starting download: {}", url);
        let state = self.downloader.run(url, listener).await?;

        if let DownloadState::Success { file_path } = &state {
            if self.record_history {
                let record = NewHistoryRecord::from_download(url, file_path);
                if let Err(e) = self.history.insert(&record) {
                    error!("Failed to save download history: {}", e);
                }
            }
        }

        Ok(state)
    }

    /// Update the external tool, reporting progress to `listener`
    pub async fn update_tool(&self, listener: &(dyn Fn(UpdateState) + Send + Sync)) -> UpdateState {
        listener(UpdateState::Updating);

        let state = match self.downloader.tool().update().await {
            Ok(report) => {
                info!("yt-dlp update: {}", report.trim());
                UpdateState::Success("yt-dlp updated successfully!".to_string())
            }
            Err(e) => {
                warn!("{}", e);
                UpdateState::Error("Failed to update yt-dlp".to_string())
            }
        };

        listener(state.clone());
        state
    }
}

fn input_error_message(error: &ShareError) -> String {
    match error {
        ShareError::InvalidUrl(message) => message.clone(),
        other => other.to_string(),
    }
}
