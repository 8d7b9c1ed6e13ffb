//! ytmedia-core: validation, yt-dlp option mapping, and download
//! orchestration for the ytmedia CLI

pub mod config;
pub mod downloader;
pub mod error;
pub mod options;
pub mod orchestrator;
pub mod request;

pub use config::Config;
pub use error::{Result, YtMediaError};
pub use orchestrator::{DownloadSummary, Orchestrator, ProgressEvent};
pub use request::DownloadRequest;
