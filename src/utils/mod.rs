//! Utility functions for easyshare

pub mod files;
pub mod filename;
pub mod media;
pub mod url;

pub use files::*;
pub use filename::*;
pub use media::*;
pub use self::url::*;
