//! Configuration management for ytmedia

use crate::error::ConfigError;
use crate::request::DEFAULT_TEMPLATE;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Path to yt-dlp binary (auto-detected if not set)
    pub yt_dlp: Option<PathBuf>,
    /// Path to FFmpeg binary (auto-detected if not set)
    pub ffmpeg: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output directory
    pub default_directory: PathBuf,
    /// Default audio format
    pub default_format: String,
    /// Default audio bitrate in kbps
    pub default_quality: String,
    /// Default video quality when `--video` is set without `--quality`
    pub default_video_quality: String,
    /// Default filename template (yt-dlp tokens)
    pub default_template: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig {
                yt_dlp: None,
                ffmpeg: None,
            },
            output: OutputConfig {
                default_directory: PathBuf::from("downloads"),
                default_format: "mp3".to_string(),
                default_quality: "192".to_string(),
                default_video_quality: "best".to_string(),
                default_template: DEFAULT_TEMPLATE.to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Load from default config directory
        if let Some(config_dir) = dirs::config_dir() {
            let default_config = config_dir.join("ytmedia/config.toml");
            if default_config.exists() {
                figment = figment.merge(Toml::file(&default_config));
            }
        }

        // Load from specified config file
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment
        figment = figment.merge(Env::prefixed("YTMEDIA_").split("_"));

        figment
            .extract()
            .map_err(|e| ConfigError::LoadError(e.to_string()))
    }

    /// Get yt-dlp path, auto-detecting if not configured
    pub fn yt_dlp_path(&self) -> Result<PathBuf, ConfigError> {
        resolve_tool(self.paths.yt_dlp.as_deref(), "yt-dlp")
    }

    /// Get FFmpeg path, auto-detecting if not configured
    pub fn ffmpeg_path(&self) -> Result<PathBuf, ConfigError> {
        resolve_tool(self.paths.ffmpeg.as_deref(), "ffmpeg")
    }
}

/// A configured path must point at an existing binary; a dangling config
/// entry is reported here rather than mid-download.
fn resolve_tool(configured: Option<&Path>, name: &str) -> Result<PathBuf, ConfigError> {
    match configured {
        Some(path) => {
            if path.is_file() {
                Ok(path.to_path_buf())
            } else {
                Err(ConfigError::InvalidValue(format!(
                    "configured {} path does not exist: {}",
                    name,
                    path.display()
                )))
            }
        }
        None => which::which(name)
            .map_err(|_| ConfigError::InvalidValue(format!("{} not found in PATH", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_surface() {
        let config = Config::default();
        assert_eq!(config.output.default_directory, PathBuf::from("downloads"));
        assert_eq!(config.output.default_format, "mp3");
        assert_eq!(config.output.default_quality, "192");
        assert_eq!(config.output.default_video_quality, "best");
        assert_eq!(config.output.default_template, DEFAULT_TEMPLATE);
    }

    #[test]
    fn explicit_tool_path_wins_over_detection() {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("yt-dlp");
        std::fs::write(&binary, b"").unwrap();

        let mut config = Config::default();
        config.paths.yt_dlp = Some(binary.clone());
        assert_eq!(config.yt_dlp_path().unwrap(), binary);
    }

    #[test]
    fn configured_path_must_exist() {
        let mut config = Config::default();
        config.paths.yt_dlp = Some(PathBuf::from("/nonexistent/yt-dlp"));
        assert!(matches!(
            config.yt_dlp_path(),
            Err(ConfigError::InvalidValue(_))
        ));

        config.paths.ffmpeg = Some(PathBuf::from("/nonexistent/ffmpeg"));
        assert!(matches!(
            config.ffmpeg_path(),
            Err(ConfigError::InvalidValue(_))
        ));
    }
}
