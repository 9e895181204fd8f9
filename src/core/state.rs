//! Download and update state reported to listeners

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// State of one orchestration run.
///
/// A run always starts with [`DownloadState::Initializing`], may emit any
/// number of [`DownloadState::Progress`] updates and ends with exactly one
/// terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DownloadState {
    Initializing,
    Progress { percent: f32, eta: Option<String> },
    Success { file_path: PathBuf },
    Error { message: String },
    Cancelled,
}

impl DownloadState {
    /// Check if this state ends a run
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DownloadState::Success { .. } | DownloadState::Error { .. } | DownloadState::Cancelled
        )
    }

    /// Short human-readable status line
    pub fn status_line(&self) -> String {
        match self {
            DownloadState::Initializing => "Initializing download...".to_string(),
            DownloadState::Progress { percent, eta } => format!(
                "Downloading... {:.1}% ETA: {}",
                percent,
                eta.as_deref().unwrap_or("Calculating...")
            ),
            DownloadState::Success { .. } => "Download Successful!".to_string(),
            DownloadState::Error { .. } => "Download Failed!".to_string(),
            DownloadState::Cancelled => "Download Cancelled".to_string(),
        }
    }
}

/// State of an external tool self-update
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum UpdateState {
    #[default]
    Idle,
    Updating,
    Success(String),
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!DownloadState::Initializing.is_terminal());
        assert!(!DownloadState::Progress { percent: 10.0, eta: None }.is_terminal());
        assert!(DownloadState::Success { file_path: PathBuf::from("/tmp/a.mp4") }.is_terminal());
        assert!(DownloadState::Error { message: "x".into() }.is_terminal());
        assert!(DownloadState::Cancelled.is_terminal());
    }

    #[test]
    fn test_status_line() {
        let progress = DownloadState::Progress { percent: 42.3, eta: Some("00:15".into()) };
        assert_eq!(progress.status_line(), "Downloading... 42.3% ETA: 00:15");

        let progress = DownloadState::Progress { percent: 5.0, eta: None };
        assert_eq!(progress.status_line(), "Downloading... 5.0% ETA: Calculating...");

        assert_eq!(DownloadState::Cancelled.status_line(), "Download Cancelled");
    }

    #[test]
    fn test_state_serializes_tagged() {
        let json = serde_json::to_string(&DownloadState::Error { message: "boom".into() }).unwrap();
        assert_eq!(json, r#"{"state":"error","message":"boom"}"#);
    }

    #[test]
    fn test_update_state_default() {
        assert_eq!(UpdateState::default(), UpdateState::Idle);
    }
}
