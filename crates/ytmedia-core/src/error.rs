//! Error types for ytmedia-core

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, YtMediaError>;

#[derive(Error, Debug)]
pub enum YtMediaError {
    #[error("Invalid request: {0}")]
    Request(#[from] RequestError),

    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Validation failures. Raised before any external tool is invoked.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported {mode} format '{format}'. Supported: {supported}")]
    UnsupportedFormat {
        mode: &'static str,
        format: String,
        supported: &'static str,
    },

    #[error("Invalid audio quality '{0}'. Expected a bitrate between 64 and 320 kbps")]
    InvalidAudioQuality(String),

    #[error("Invalid video quality '{0}'. Expected 360p, 480p, 720p, 1080p, 1440p, 2160p, best or worst")]
    InvalidVideoQuality(String),
}

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("{tool} not found on PATH. Install it and try again")]
    ToolMissing { tool: &'static str },

    #[error("Network failure: {0}")]
    Network(String),

    #[error("Content unavailable: {0}")]
    Unavailable(String),

    #[error("Transcoding failed: {0}")]
    Transcode(String),

    #[error("yt-dlp failed (exit code {code:?}): {message}")]
    YtDlpFailed { code: Option<i32>, message: String },

    #[error("Failed to parse yt-dlp output: {0}")]
    MetadataParse(String),

    #[error("yt-dlp reported success but no file exists at {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(String),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
