//! Core functionality for easyshare

pub mod downloader;
pub mod progress;
pub mod state;

pub use downloader::*;
pub use progress::*;
pub use state::*;
