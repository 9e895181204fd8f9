//! yt-dlp process runner

use crate::core::progress::parse_progress_line;
use crate::error::ShareError;
use crate::tool::{ExternalTool, ProgressCallback, ToolRequest, ToolResponse};
use crate::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Runs a yt-dlp compatible binary as a child process
#[derive(Debug, Clone)]
pub struct YtDlp {
    path: PathBuf,
}

impl YtDlp {
    /// Create a runner for the binary at `path` (a bare name is looked up in `PATH`)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the binary
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.path);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    fn missing(&self, source: std::io::Error) -> ShareError {
        ShareError::ToolMissing {
            path: self.path.display().to_string(),
            source,
        }
    }
}

/// Read one line, replacing bytes that are not valid UTF-8.
///
/// The tool prints titles in the console encoding, which is not always UTF-8.
async fn read_line_lossy<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(buf);
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_TOOL_PATH)
    }
}

#[async_trait]
impl ExternalTool for YtDlp {
    async fn execute(&self, request: &ToolRequest, on_progress: ProgressCallback<'_>) -> Result<ToolResponse> {
        let args = request.build_args();
        debug!("Running {} with args: {:?}", self.path.display(), args);

        let start = Instant::now();
        let mut child = self.command().args(&args).spawn().map_err(|e| self.missing(e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ShareError::GenericDownloadError("Failed to capture stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ShareError::GenericDownloadError("Failed to capture stderr".to_string()))?;

        // Drain stderr concurrently so a chatty tool cannot block on a full pipe
        let stderr_task = tokio::spawn(async move {
            let mut reader = BufReader::new(stderr);
            let mut buf = Vec::new();
            let mut captured = Vec::new();
            while let Some(line) = read_line_lossy(&mut reader, &mut buf).await? {
                captured.push(line);
            }
            Ok::<_, std::io::Error>(captured.join("\n"))
        });

        let mut out_lines = Vec::new();
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        while let Some(line) = read_line_lossy(&mut reader, &mut buf).await? {
            if let Some(progress) = parse_progress_line(&line) {
                on_progress(progress);
            } else {
                debug!("yt-dlp: {}", line);
            }
            out_lines.push(line);
        }

        let status = child.wait().await?;
        let err = stderr_task
            .await
            .map_err(|e| ShareError::IoError(std::io::Error::other(e)))??;

        let response = ToolResponse {
            exit_code: status.code().unwrap_or(-1),
            out: out_lines.join("\n"),
            err,
            elapsed: start.elapsed(),
        };
        debug!(
            "yt-dlp exited with {} after {:?}",
            response.exit_code, response.elapsed
        );

        if !response.is_success() {
            if let Some(message) = response.error_text() {
                return Err(ShareError::ToolFailed {
                    exit_code: response.exit_code,
                    message,
                });
            }
        }

        Ok(response)
    }

    async fn update(&self) -> Result<String> {
        info!("Updating {}", self.path.display());
        let output = self
            .command()
            .arg("-U")
            .output()
            .await
            .map_err(|e| ShareError::UpdateFailed(e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            let reason = if stderr.is_empty() { stdout } else { stderr };
            warn!("yt-dlp update failed: {}", reason);
            return Err(ShareError::UpdateFailed(reason));
        }

        Ok(stdout.lines().last().unwrap_or_default().to_string())
    }

    async fn version(&self) -> Result<String> {
        let output = self
            .command()
            .arg("--version")
            .output()
            .await
            .map_err(|e| self.missing(e))?;

        if !output.status.success() {
            return Err(ShareError::GenericDownloadError(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
