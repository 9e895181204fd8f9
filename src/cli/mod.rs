//! Command line interface

pub mod args;
pub mod output;

pub use args::{Args, Command, DownloadArgs, HistoryCommand, VerbosityLevel};
pub use output::OutputFormatter;
