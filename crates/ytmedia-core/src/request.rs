//! Request validation and the download data model

use crate::error::RequestError;
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_TEMPLATE: &str = "%(title)s - %(id)s.%(ext)s";

const AUDIO_BITRATE_MIN: u32 = 64;
const AUDIO_BITRATE_MAX: u32 = 320;
const VIDEO_HEIGHTS: [u32; 6] = [360, 480, 720, 1080, 1440, 2160];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Ogg,
    Wav,
    M4a,
    Aac,
    Flac,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Wav => "wav",
            AudioFormat::M4a => "m4a",
            AudioFormat::Aac => "aac",
            AudioFormat::Flac => "flac",
        }
    }

    /// Codec name as yt-dlp's `--audio-format` expects it. Ogg output is
    /// produced by the vorbis encoder.
    pub fn codec(&self) -> &'static str {
        match self {
            AudioFormat::Ogg => "vorbis",
            other => other.extension(),
        }
    }

    /// Whether the transcoder takes an explicit bitrate for this codec.
    /// Lossless and passthrough targets ignore it.
    pub fn takes_bitrate(&self) -> bool {
        matches!(self, AudioFormat::Mp3 | AudioFormat::Aac | AudioFormat::Ogg)
    }

    fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "ogg" => Some(AudioFormat::Ogg),
            "wav" => Some(AudioFormat::Wav),
            "m4a" => Some(AudioFormat::M4a),
            "aac" => Some(AudioFormat::Aac),
            "flac" => Some(AudioFormat::Flac),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFormat {
    Mp4,
    Webm,
    Mkv,
    Avi,
    Mov,
    Flv,
}

impl VideoFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            VideoFormat::Mp4 => "mp4",
            VideoFormat::Webm => "webm",
            VideoFormat::Mkv => "mkv",
            VideoFormat::Avi => "avi",
            VideoFormat::Mov => "mov",
            VideoFormat::Flv => "flv",
        }
    }

    /// Containers yt-dlp accepts for `--merge-output-format`. The rest need
    /// a full recode pass instead.
    pub fn supports_merge(&self) -> bool {
        matches!(
            self,
            VideoFormat::Mp4 | VideoFormat::Mkv | VideoFormat::Webm | VideoFormat::Flv
        )
    }

    fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mp4" => Some(VideoFormat::Mp4),
            "webm" => Some(VideoFormat::Webm),
            "mkv" => Some(VideoFormat::Mkv),
            "avi" => Some(VideoFormat::Avi),
            "mov" => Some(VideoFormat::Mov),
            "flv" => Some(VideoFormat::Flv),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    Audio(AudioFormat),
    Video(VideoFormat),
}

impl MediaFormat {
    pub fn parse(raw: &str, is_video: bool) -> Result<Self, RequestError> {
        if is_video {
            VideoFormat::from_str(raw)
                .map(MediaFormat::Video)
                .ok_or_else(|| RequestError::UnsupportedFormat {
                    mode: "video",
                    format: raw.to_string(),
                    supported: "mp4, webm, mkv, avi, mov, flv",
                })
        } else {
            AudioFormat::from_str(raw)
                .map(MediaFormat::Audio)
                .ok_or_else(|| RequestError::UnsupportedFormat {
                    mode: "audio",
                    format: raw.to_string(),
                    supported: "mp3, ogg, wav, m4a, aac, flac",
                })
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            MediaFormat::Audio(f) => f.extension(),
            MediaFormat::Video(f) => f.extension(),
        }
    }
}

impl std::fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Requested quality: a bitrate for audio, a height cap or best/worst
/// selector for video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Bitrate(u32),
    Height(u32),
    Best,
    Worst,
}

impl Quality {
    pub fn parse(raw: &str, is_video: bool) -> Result<Self, RequestError> {
        if is_video {
            Self::parse_video(raw)
        } else {
            Self::parse_audio(raw)
        }
    }

    fn parse_audio(raw: &str) -> Result<Self, RequestError> {
        let bitrate: u32 = raw
            .trim()
            .parse()
            .map_err(|_| RequestError::InvalidAudioQuality(raw.to_string()))?;
        if !(AUDIO_BITRATE_MIN..=AUDIO_BITRATE_MAX).contains(&bitrate) {
            return Err(RequestError::InvalidAudioQuality(raw.to_string()));
        }
        Ok(Quality::Bitrate(bitrate))
    }

    fn parse_video(raw: &str) -> Result<Self, RequestError> {
        match raw.trim().to_lowercase().as_str() {
            "best" => Ok(Quality::Best),
            "worst" => Ok(Quality::Worst),
            other => {
                // "1080p" and bare "1080" both name the same tier
                let height: u32 = other
                    .strip_suffix('p')
                    .unwrap_or(other)
                    .parse()
                    .map_err(|_| RequestError::InvalidVideoQuality(raw.to_string()))?;
                if !VIDEO_HEIGHTS.contains(&height) {
                    return Err(RequestError::InvalidVideoQuality(raw.to_string()));
                }
                Ok(Quality::Height(height))
            }
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quality::Bitrate(b) => write!(f, "{} kbps", b),
            Quality::Height(h) => write!(f, "{}p", h),
            Quality::Best => write!(f, "best"),
            Quality::Worst => write!(f, "worst"),
        }
    }
}

/// Reject anything that is not a syntactically valid http(s) URL before
/// yt-dlp is ever invoked.
pub fn validate_url(raw: &str) -> Result<Url, RequestError> {
    let parsed = Url::parse(raw).map_err(|_| RequestError::InvalidUrl(raw.to_string()))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed),
        _ => Err(RequestError::InvalidUrl(raw.to_string())),
    }
}

/// A fully validated download request, ready to be mapped onto yt-dlp
/// arguments.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: Url,
    pub outfolder: PathBuf,
    pub format: MediaFormat,
    pub quality: Quality,
    pub template: String,
}

impl DownloadRequest {
    pub fn build(
        url: &str,
        outfolder: PathBuf,
        format: &str,
        quality: &str,
        is_video: bool,
        template: &str,
    ) -> Result<Self, RequestError> {
        let url = validate_url(url)?;
        let format = MediaFormat::parse(format, is_video)?;
        let quality = Quality::parse(quality, is_video)?;

        Ok(Self {
            url,
            outfolder,
            format,
            quality,
            template: template.to_string(),
        })
    }

    pub fn is_video(&self) -> bool {
        matches!(self.format, MediaFormat::Video(_))
    }
}
