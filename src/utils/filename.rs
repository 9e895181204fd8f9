//! Filename helpers for downloaded files

use std::path::Path;

/// Extensions the tool uses for in-progress or bookkeeping files
const PARTIAL_EXTENSIONS: &[&str] = &["part", "ytdl", "temp", "tmp"];

/// Derive a display title from a downloaded file's path.
///
/// Restricted filenames replace spaces with underscores, so they are turned
/// back into spaces here.
pub fn title_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let title = stem
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if title.trim().is_empty() {
        "video".to_string()
    } else {
        title.trim().to_string()
    }
}

/// Check if a file is an unfinished download or tool bookkeeping file
pub fn is_partial_download(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if name.contains(".part-frag") {
        return true;
    }

    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .map_or(false, |ext| PARTIAL_EXTENSIONS.contains(&ext.as_str()))
}

/// Generate a unique filename by appending a number if the file already exists
pub fn generate_unique_filename(base_path: &Path, filename: &str) -> std::io::Result<String> {
    let mut counter = 1;
    let mut final_filename = filename.to_string();

    while base_path.join(&final_filename).exists() {
        let path = Path::new(filename);
        let stem = path.file_stem().unwrap_or_default();
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        final_filename = format!("{} ({}){}", stem.to_string_lossy(), counter, extension);
        counter += 1;

        if counter > 10000 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "Too many files with similar names",
            ));
        }
    }

    Ok(final_filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_title_from_path() {
        assert_eq!(
            title_from_path(Path::new("/dl/EasyShare/Never_Gonna_Give_You_Up.mp4")),
            "Never Gonna Give You Up"
        );
        assert_eq!(title_from_path(Path::new("clip.webm")), "clip");
        assert_eq!(title_from_path(Path::new("__a__b_.mkv")), "a b");
        assert_eq!(title_from_path(Path::new("/")), "video");
        assert_eq!(title_from_path(&PathBuf::from("___.mp4")), "video");
    }

    #[test]
    fn test_is_partial_download() {
        assert!(is_partial_download(Path::new("video.mp4.part")));
        assert!(is_partial_download(Path::new("video.mp4.ytdl")));
        assert!(is_partial_download(Path::new("video.f137.mp4.part-Frag12")));
        assert!(is_partial_download(Path::new("VIDEO.PART")));
        assert!(!is_partial_download(Path::new("video.mp4")));
        assert!(!is_partial_download(Path::new("partial_results.mkv")));
    }

    #[test]
    fn test_generate_unique_filename() {
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(
            generate_unique_filename(dir.path(), "clip.mp4").unwrap(),
            "clip.mp4"
        );

        std::fs::write(dir.path().join("clip.mp4"), b"x").unwrap();
        assert_eq!(
            generate_unique_filename(dir.path(), "clip.mp4").unwrap(),
            "clip (1).mp4"
        );

        std::fs::write(dir.path().join("clip (1).mp4"), b"x").unwrap();
        assert_eq!(
            generate_unique_filename(dir.path(), "clip.mp4").unwrap(),
            "clip (2).mp4"
        );
    }
}
