//! Error types for easyshare

use thiserror::Error;

/// Failure phrase emitted when no player response could be extracted
pub const FAILED_TO_EXTRACT_PLAYER_RESPONSE: &str = "Failed to extract any player response";
/// Failure phrase for removed or unavailable videos
pub const VIDEO_UNAVAILABLE_KEYWORD: &str = "Video unavailable";
/// Failure phrase for private videos
pub const PRIVATE_VIDEO_KEYWORD: &str = "Private video";
/// Failure phrase for age-gated videos
pub const SIGN_IN_CONFIRM_AGE: &str = "Sign in to confirm your age";
/// Failure phrase for geo-blocked videos
pub const VIDEO_NOT_AVAILABLE_KEYWORD: &str = "This video is not available";

/// Main error type for easyshare operations
#[derive(Debug, Error)]
pub enum ShareError {
    #[error("YouTube extraction failed. Try updating the app or the video might be restricted. Error: {0}")]
    ExtractionFailed(String),

    #[error("Video is unavailable or has been removed.")]
    VideoUnavailable,

    #[error("Cannot download private videos.")]
    PrivateVideo,

    #[error("Age-restricted video. Cannot download without authentication.")]
    AgeRestricted,

    #[error("Video is not available in your region or has been removed.")]
    RegionRestricted,

    #[error("Download error: {0}")]
    GenericDownloadError(String),

    #[error("Failed to update yt-dlp: {0}")]
    UpdateFailed(String),

    #[error("External tool not found at '{path}': {source}")]
    ToolMissing {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    ToolFailed { exit_code: i32, message: String },

    #[error("A download is already in progress")]
    AlreadyRunning,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("History record {0} not found")]
    NotFound(i64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),
}

impl ShareError {
    /// Map raw failure text from the external tool to a user-facing error.
    ///
    /// Phrases are checked in a fixed order; the first match wins and
    /// anything unrecognised becomes [`ShareError::GenericDownloadError`]
    /// carrying the raw text.
    pub fn classify(raw: &str) -> Self {
        if raw.contains(FAILED_TO_EXTRACT_PLAYER_RESPONSE) {
            ShareError::ExtractionFailed(raw.to_string())
        } else if raw.contains(VIDEO_UNAVAILABLE_KEYWORD) {
            ShareError::VideoUnavailable
        } else if raw.contains(PRIVATE_VIDEO_KEYWORD) {
            ShareError::PrivateVideo
        } else if raw.contains(SIGN_IN_CONFIRM_AGE) {
            ShareError::AgeRestricted
        } else if raw.contains(VIDEO_NOT_AVAILABLE_KEYWORD) {
            ShareError::RegionRestricted
        } else {
            ShareError::GenericDownloadError(raw.to_string())
        }
    }

    /// Translate any fault into the message shown to the user
    pub fn user_message(&self) -> String {
        match self {
            ShareError::ToolFailed { message, .. } => ShareError::classify(message).to_string(),
            ShareError::GenericDownloadError(_) | ShareError::UpdateFailed(_) => self.to_string(),
            _ if self.is_content_error() => self.to_string(),
            other => ShareError::classify(&other.to_string()).to_string(),
        }
    }

    /// Check if error originates from the video site rather than from us
    pub fn is_content_error(&self) -> bool {
        matches!(
            self,
            ShareError::ExtractionFailed(_)
                | ShareError::VideoUnavailable
                | ShareError::PrivateVideo
                | ShareError::AgeRestricted
                | ShareError::RegionRestricted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_phrases() {
        assert!(matches!(
            ShareError::classify("ERROR: [youtube] abc: Private video. Sign in if you've been granted access"),
            ShareError::PrivateVideo
        ));
        assert!(matches!(
            ShareError::classify("ERROR: [youtube] abc: Video unavailable"),
            ShareError::VideoUnavailable
        ));
        assert!(matches!(
            ShareError::classify("Sign in to confirm your age. This video may be inappropriate"),
            ShareError::AgeRestricted
        ));
        assert!(matches!(
            ShareError::classify("This video is not available in your country"),
            ShareError::RegionRestricted
        ));
        assert!(matches!(
            ShareError::classify("Failed to extract any player response; please report this issue"),
            ShareError::ExtractionFailed(_)
        ));
    }

    #[test]
    fn test_classify_order() {
        // Extraction failure wins over anything else in the same text
        let raw = "Failed to extract any player response (Private video)";
        assert!(matches!(ShareError::classify(raw), ShareError::ExtractionFailed(_)));
    }

    #[test]
    fn test_classify_unknown_keeps_raw_text() {
        let err = ShareError::classify("HTTP Error 503: Service Unavailable");
        assert_eq!(err.to_string(), "Download error: HTTP Error 503: Service Unavailable");
    }

    #[test]
    fn test_private_video_message_is_fixed() {
        let err = ShareError::ToolFailed {
            exit_code: 1,
            message: "ERROR: [youtube] xyz: Private video".to_string(),
        };
        assert_eq!(err.user_message(), "Cannot download private videos.");
    }

    #[test]
    fn test_extraction_failed_message_embeds_raw() {
        let err = ShareError::classify("Failed to extract any player response");
        assert_eq!(
            err.to_string(),
            "YouTube extraction failed. Try updating the app or the video might be restricted. Error: Failed to extract any player response"
        );
    }

    #[test]
    fn test_is_content_error() {
        assert!(ShareError::PrivateVideo.is_content_error());
        assert!(ShareError::RegionRestricted.is_content_error());
        assert!(!ShareError::AlreadyRunning.is_content_error());
        assert!(!ShareError::GenericDownloadError("x".into()).is_content_error());
    }
}
