//! Media type detection for downloaded files

use std::path::Path;

/// Get MIME type from file extension
pub fn mime_from_ext(extension: &str) -> &'static str {
    let ext = extension.trim_start_matches('.').to_lowercase();
    match ext.as_str() {
        // Video formats
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "3gp" => "video/3gpp",
        "flv" => "video/x-flv",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "ts" => "video/mp2t",
        "mpeg" | "mpg" => "video/mpeg",
        "ogv" => "video/ogg",
        "mkv" => "video/x-matroska",

        // Audio formats
        "m4a" => "audio/mp4",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        "opus" => "audio/opus",

        _ => "application/octet-stream",
    }
}

/// MIME type of a file, judged by its extension
pub fn mime_from_path(path: &Path) -> &'static str {
    path.extension()
        .map(|ext| mime_from_ext(&ext.to_string_lossy()))
        .unwrap_or("application/octet-stream")
}

/// Check if MIME type is a video format
pub fn is_video_mime(mime_type: &str) -> bool {
    mime_type.starts_with("video/")
}

/// Check if MIME type is an audio format
pub fn is_audio_mime(mime_type: &str) -> bool {
    mime_type.starts_with("audio/")
}

/// Check if a path looks like a playable media file
pub fn is_media_file(path: &Path) -> bool {
    let mime = mime_from_path(path);
    is_video_mime(mime) || is_audio_mime(mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_from_ext() {
        assert_eq!(mime_from_ext("mp4"), "video/mp4");
        assert_eq!(mime_from_ext(".mp4"), "video/mp4");
        assert_eq!(mime_from_ext("MP4"), "video/mp4");
        assert_eq!(mime_from_ext("m4a"), "audio/mp4");
        assert_eq!(mime_from_ext("mpg"), "video/mpeg");
        assert_eq!(mime_from_ext("unknown"), "application/octet-stream");
    }

    #[test]
    fn test_mime_from_path() {
        assert_eq!(mime_from_path(Path::new("/a/b/clip.webm")), "video/webm");
        assert_eq!(mime_from_path(Path::new("song.opus")), "audio/opus");
        assert_eq!(mime_from_path(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn test_is_media_file() {
        assert!(is_media_file(Path::new("clip.mkv")));
        assert!(is_media_file(Path::new("clip.MP3")));
        assert!(!is_media_file(Path::new("clip.info.json")));
        assert!(!is_media_file(Path::new("clip.mp4.part")));
    }
}
