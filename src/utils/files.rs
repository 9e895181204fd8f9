//! Locating and handing off downloaded files

use crate::utils::filename::{generate_unique_filename, is_partial_download};
use crate::utils::media::is_media_file;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Placeholder file name reported when no output file can be found
pub const DEFAULT_FILE_NAME: &str = "downloaded_video";

fn destination_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?m)^\[\w+\] (?:Destination: (.+?)|Merging formats into "(.+?)"|(.+?) has already been downloaded)\s*$"#,
        )
        .expect("valid destination regex")
    })
}

/// Paths the tool announced as output files, in the order they appeared
pub fn announced_destinations(output: &str) -> Vec<PathBuf> {
    destination_regex()
        .captures_iter(output)
        .filter_map(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map(|m| PathBuf::from(m.as_str()))
        })
        .collect()
}

/// Regular files directly inside `dir` with their modification time
fn files_in(dir: &Path) -> Vec<(PathBuf, SystemTime)> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| !is_partial_download(entry.path()))
        .filter_map(|entry| {
            let modified = entry.metadata().ok()?.modified().ok()?;
            Some((entry.into_path(), modified))
        })
        .collect()
}

/// Most recently modified finished file in `dir`, preferring media files
pub fn latest_file(dir: &Path) -> Option<PathBuf> {
    let files = files_in(dir);

    let newest = |media_only: bool| {
        files
            .iter()
            .filter(|(path, _)| !media_only || is_media_file(path))
            .max_by_key(|(_, modified)| *modified)
            .map(|(path, _)| path.clone())
    };

    newest(true).or_else(|| newest(false))
}

/// Most recently modified finished file in `dir` changed within `window`
pub fn recent_file(dir: &Path, window: Duration) -> Option<PathBuf> {
    let now = SystemTime::now();
    files_in(dir)
        .into_iter()
        .filter(|(_, modified)| {
            now.duration_since(*modified)
                .map_or(true, |age| age <= window)
        })
        .max_by_key(|(_, modified)| *modified)
        .map(|(path, _)| path)
}

/// Move `file` into `dir`, keeping the original location on failure
pub fn move_into(file: &Path, dir: &Path) -> PathBuf {
    let Some(name) = file.file_name() else {
        return file.to_path_buf();
    };

    let target_name = match generate_unique_filename(dir, &name.to_string_lossy()) {
        Ok(name) => name,
        Err(e) => {
            warn!("Error moving file, using original location: {} ({})", file.display(), e);
            return file.to_path_buf();
        }
    };

    let target = dir.join(target_name);
    match std::fs::rename(file, &target) {
        Ok(()) => {
            debug!("Moved file into output folder: {}", target.display());
            target
        }
        Err(e) => {
            warn!("Could not move file, using original location: {} ({})", file.display(), e);
            file.to_path_buf()
        }
    }
}

/// Resolve the file produced by a successful tool run.
///
/// Tries, in order: the last announced destination that exists, the newest
/// file in `output_dir`, a file in the parent directory modified within
/// `window` (moved into `output_dir`), and finally a placeholder path.
pub fn locate_downloaded_file(output_dir: &Path, tool_output: &str, window: Duration) -> PathBuf {
    if let Some(announced) = announced_destinations(tool_output)
        .into_iter()
        .rev()
        .find(|path| path.is_file())
    {
        debug!("Found announced file: {}", announced.display());
        return announced;
    }

    if let Some(latest) = latest_file(output_dir) {
        debug!("Found file in output folder: {}", latest.display());
        return latest;
    }

    if let Some(parent) = output_dir.parent() {
        if let Some(recent) = recent_file(parent, window) {
            return move_into(&recent, output_dir);
        }
    }

    output_dir.join(DEFAULT_FILE_NAME)
}

/// Open the folder containing `path` with the platform file manager
pub fn reveal_in_file_manager(path: &Path) -> std::io::Result<()> {
    let folder = if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(path)
    };

    #[cfg(target_os = "macos")]
    let opener = "open";
    #[cfg(target_os = "windows")]
    let opener = "explorer";
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let opener = "xdg-open";

    std::process::Command::new(opener)
        .arg(folder)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map(|_| ())
}
