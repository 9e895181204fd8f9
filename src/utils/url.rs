//! URL utilities for user input and file links

use crate::error::ShareError;
use std::path::Path;
use url::Url;

/// Clean up a user-supplied source URL.
///
/// Only surrounding whitespace is removed and blank input rejected; the
/// tool itself decides what it can download, scheme-less links included.
pub fn source_url(input: &str) -> Result<&str, ShareError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ShareError::InvalidUrl("URL cannot be empty".to_string()));
    }
    Ok(trimmed)
}

/// Build a `file://` URI for a local path
pub fn file_uri(path: &Path) -> Option<String> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(path)
    };
    Url::from_file_path(absolute).ok().map(String::from)
}
