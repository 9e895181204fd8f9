//! History record types

use crate::utils::title_from_path;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One successful download, as stored in the history database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub source_url: String,
    pub title: String,
    pub file_path: PathBuf,
    pub downloaded_at: DateTime<Utc>,
    pub file_size: Option<u64>,
    pub thumbnail_url: Option<String>,
}

impl HistoryRecord {
    /// Download time in local time, e.g. `Mar 04, 2024 17:05`
    pub fn formatted_date(&self) -> String {
        self.downloaded_at
            .with_timezone(&Local)
            .format("%b %d, %Y %H:%M")
            .to_string()
    }

    /// File size in whole B/KB/MB/GB units
    pub fn formatted_file_size(&self) -> String {
        match self.file_size {
            None => "Unknown size".to_string(),
            Some(size) if size < 1024 => format!("{} B", size),
            Some(size) if size < 1024 * 1024 => format!("{} KB", size / 1024),
            Some(size) if size < 1024 * 1024 * 1024 => format!("{} MB", size / (1024 * 1024)),
            Some(size) => format!("{} GB", size / (1024 * 1024 * 1024)),
        }
    }

    /// Check if the downloaded file is still on disk
    pub fn file_exists(&self) -> bool {
        self.file_path.is_file()
    }
}

/// A record that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewHistoryRecord {
    pub source_url: String,
    pub title: String,
    pub file_path: PathBuf,
    pub downloaded_at: DateTime<Utc>,
    pub file_size: Option<u64>,
    pub thumbnail_url: Option<String>,
}

impl NewHistoryRecord {
    /// Describe a download that just finished.
    ///
    /// The title comes from the file name and the size from file metadata
    /// when the file exists.
    pub fn from_download(source_url: impl Into<String>, file_path: &Path) -> Self {
        Self {
            source_url: source_url.into(),
            title: title_from_path(file_path),
            file_path: file_path.to_path_buf(),
            downloaded_at: Utc::now(),
            file_size: std::fs::metadata(file_path)
                .ok()
                .filter(|m| m.is_file())
                .map(|m| m.len()),
            thumbnail_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(file_size: Option<u64>) -> HistoryRecord {
        HistoryRecord {
            id: 1,
            source_url: "https://youtu.be/abc".into(),
            title: "Clip".into(),
            file_path: PathBuf::from("/dl/Clip.mp4"),
            downloaded_at: Utc.with_ymd_and_hms(2024, 3, 4, 12, 5, 0).unwrap(),
            file_size,
            thumbnail_url: None,
        }
    }

    #[test]
    fn test_formatted_file_size() {
        assert_eq!(record(None).formatted_file_size(), "Unknown size");
        assert_eq!(record(Some(512)).formatted_file_size(), "512 B");
        assert_eq!(record(Some(1536)).formatted_file_size(), "1 KB");
        assert_eq!(record(Some(5 * 1024 * 1024 + 10)).formatted_file_size(), "5 MB");
        assert_eq!(record(Some(3 * 1024 * 1024 * 1024)).formatted_file_size(), "3 GB");
    }

    #[test]
    fn test_formatted_date_shape() {
        let date = record(None).formatted_date();
        // Local timezone varies, the shape does not
        assert!(date.contains(", 2024 "), "{}", date);
        assert!(date.starts_with("Mar "), "{}", date);
    }

    #[test]
    fn test_from_download() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("My_Great_Clip.mp4");
        std::fs::write(&path, vec![0u8; 2048]).unwrap();

        let new = NewHistoryRecord::from_download("https://youtu.be/abc", &path);
        assert_eq!(new.title, "My Great Clip");
        assert_eq!(new.file_size, Some(2048));
        assert_eq!(new.file_path, path);

        let missing = NewHistoryRecord::from_download("https://youtu.be/abc", &dir.path().join("gone.mp4"));
        assert_eq!(missing.file_size, None);
    }
}
