//! External extractor/downloader tool

pub mod request;
pub mod ytdlp;

pub use request::*;
pub use ytdlp::*;

use crate::core::Progress;
use crate::Result;
use async_trait::async_trait;

/// Callback receiving progress parsed from the tool's output
pub type ProgressCallback<'a> = &'a (dyn Fn(Progress) + Send + Sync);

/// A command-line tool that performs extraction and transfer.
///
/// `execute` returns `Ok` whenever the process ran to completion, even with
/// a non-zero exit status; `Err` is reserved for faults (spawn failures,
/// I/O errors, explicit error reports from the tool).
#[async_trait]
pub trait ExternalTool: Send + Sync {
    /// Run one invocation and wait for it to finish
    async fn execute(&self, request: &ToolRequest, on_progress: ProgressCallback<'_>) -> Result<ToolResponse>;

    /// Update the tool binary in place, returning the tool's report
    async fn update(&self) -> Result<String>;

    /// Version string reported by the tool
    async fn version(&self) -> Result<String>;
}
