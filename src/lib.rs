//! # easyshare - share-to-download video fetcher
//!
//! Downloads a shared video URL with an external `yt-dlp` binary, trying a
//! list of format selectors until one succeeds, and keeps a local history
//! of finished downloads.
//!
//! ## Example
//!
//! ```rust,no_run
//! use easyshare::{Downloader, DownloadState, YtDlp};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = Downloader::new(Arc::new(YtDlp::default()))
//!         .with_output_dir("./downloads");
//!
//!     let state = downloader
//!         .run("VIDEO_URL", &|state: DownloadState| println!("{}", state.status_line()))
//!         .await?;
//!     println!("Finished: {:?}", state);
//!
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod history;
pub mod tool;
pub mod utils;

// Re-export main types
pub use app::ShareApp;
pub use config::Config;
pub use self::core::{CancelHandle, DownloadOptions, DownloadState, Downloader, Progress, UpdateState};
pub use error::ShareError;
pub use history::{HistoryRecord, HistoryStore, NewHistoryRecord};
pub use tool::{ExternalTool, ToolRequest, ToolResponse, YtDlp};

/// Result type alias for easyshare operations
pub type Result<T> = std::result::Result<T, ShareError>;
