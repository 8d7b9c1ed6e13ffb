//! yt-dlp invocation: playlist probing, per-item download, output parsing

use crate::error::DownloadError;
use serde::Deserialize;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, info};

/// Metadata yt-dlp reports for a downloaded item (`--print-json` line).
#[derive(Debug, Clone, Deserialize)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub ext: String,
    #[serde(default)]
    pub uploader: Option<String>,
}

/// One finished download.
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub id: String,
    pub title: String,
    pub duration: Option<f64>,
    pub path: PathBuf,
}

/// One item to fetch, as resolved by the probe step.
#[derive(Debug, Clone)]
pub struct PlaylistEntry {
    pub url: String,
    pub id: Option<String>,
    pub title: Option<String>,
}

impl PlaylistEntry {
    /// Human-readable name for progress and summary lines.
    pub fn label(&self) -> String {
        self.title
            .clone()
            .or_else(|| self.id.clone())
            .unwrap_or_else(|| self.url.clone())
    }
}

/// What a URL resolves to before downloading.
#[derive(Debug)]
pub enum ProbedUrl {
    Single(PlaylistEntry),
    Playlist {
        title: Option<String>,
        entries: Vec<PlaylistEntry>,
    },
}

#[derive(Debug)]
pub struct Downloader {
    yt_dlp: PathBuf,
}

impl Downloader {
    pub fn new(yt_dlp: PathBuf) -> Self {
        Self { yt_dlp }
    }

    /// Resolve a URL into a single entry or the flat list of playlist
    /// entries, without downloading anything.
    pub async fn probe(&self, url: &str) -> Result<ProbedUrl, DownloadError> {
        debug!("Probing: {}", url);

        let output = Command::new(&self.yt_dlp)
            .args(["-J", "--flat-playlist", "--no-warnings", url])
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp probe stderr: {}", stderr);
            return Err(classify_stderr(output.status.code(), &stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_probe(url, &stdout)
    }

    /// Download one entry with the prepared argument list. Success requires
    /// the reported destination file to actually exist on disk.
    pub async fn fetch(
        &self,
        entry: &PlaylistEntry,
        args: &[String],
    ) -> Result<DownloadResult, DownloadError> {
        debug!("Fetching: {}", entry.url);

        let output = Command::new(&self.yt_dlp)
            .args(args)
            .arg(&entry.url)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr: {}", stderr);
            return Err(classify_stderr(output.status.code(), &stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let (metadata, filepath) = parse_fetch_output(&stdout);

        let metadata = metadata.ok_or_else(|| {
            DownloadError::MetadataParse("no JSON metadata line in yt-dlp output".to_string())
        })?;
        let path = filepath.ok_or_else(|| {
            DownloadError::MetadataParse("no destination path in yt-dlp output".to_string())
        })?;

        if !path.exists() {
            return Err(DownloadError::MissingOutput(path));
        }

        info!("Downloaded: {} ({})", metadata.title, metadata.id);

        Ok(DownloadResult {
            id: metadata.id,
            title: metadata.title,
            duration: metadata.duration,
            path,
        })
    }
}

#[derive(Deserialize)]
struct ProbeInfo {
    #[serde(rename = "_type", default)]
    kind: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    entries: Option<Vec<Option<ProbeEntry>>>,
}

#[derive(Deserialize)]
struct ProbeEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

fn parse_probe(url: &str, json: &str) -> Result<ProbedUrl, DownloadError> {
    let info: ProbeInfo = serde_json::from_str(json.trim())
        .map_err(|e| DownloadError::MetadataParse(e.to_string()))?;

    let is_playlist = info.kind.as_deref() == Some("playlist") || info.entries.is_some();
    if !is_playlist {
        return Ok(ProbedUrl::Single(PlaylistEntry {
            url: url.to_string(),
            id: info.id,
            title: info.title,
        }));
    }

    let mut entries = Vec::new();
    for entry in info.entries.unwrap_or_default().into_iter().flatten() {
        // Flat entries carry a direct per-item URL; unavailable items may
        // only have an id
        let Some(item_url) = entry.url.clone().or_else(|| {
            entry
                .id
                .as_ref()
                .map(|id| format!("https://www.youtube.com/watch?v={id}"))
        }) else {
            continue;
        };
        entries.push(PlaylistEntry {
            url: item_url,
            id: entry.id,
            title: entry.title,
        });
    }

    Ok(ProbedUrl::Playlist {
        title: info.title,
        entries,
    })
}

/// Split yt-dlp stdout into the metadata JSON line and the final filepath
/// line printed by `--print after_move:filepath`.
fn parse_fetch_output(stdout: &str) -> (Option<VideoMetadata>, Option<PathBuf>) {
    let mut metadata = None;
    let mut filepath = None;

    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('{') {
            if let Ok(parsed) = serde_json::from_str::<VideoMetadata>(line) {
                metadata = Some(parsed);
            }
        } else {
            filepath = Some(PathBuf::from(line));
        }
    }

    (metadata, filepath)
}

/// Sort a yt-dlp failure into the error taxonomy from its stderr.
pub(crate) fn classify_stderr(code: Option<i32>, stderr: &str) -> DownloadError {
    let lower = stderr.to_lowercase();

    if lower.contains("video unavailable")
        || lower.contains("private video")
        || lower.contains("members-only")
        || lower.contains("copyright")
        || lower.contains("sign in to confirm")
        || (lower.contains("geo") && lower.contains("block"))
        || lower.contains("not available in your country")
    {
        return DownloadError::Unavailable(last_error_line(stderr));
    }

    if lower.contains("ffmpeg")
        && (lower.contains("not found")
            || lower.contains("not installed")
            || lower.contains("no such file"))
    {
        return DownloadError::ToolMissing { tool: "ffmpeg" };
    }

    if lower.contains("postprocess")
        || lower.contains("conversion failed")
        || lower.contains("audio conversion")
        || lower.contains("error opening output")
    {
        return DownloadError::Transcode(last_error_line(stderr));
    }

    if lower.contains("timed out")
        || lower.contains("timeout")
        || lower.contains("connection")
        || lower.contains("getaddrinfo")
        || lower.contains("network")
        || lower.contains("unable to download")
        || lower.contains("http error 429")
        || lower.contains("http error 5")
    {
        return DownloadError::Network(last_error_line(stderr));
    }

    DownloadError::YtDlpFailed {
        code,
        message: last_error_line(stderr),
    }
}

/// Last `ERROR:` line from stderr, stripped of the prefix; falls back to a
/// trimmed slice of the whole stream.
fn last_error_line(stderr: &str) -> String {
    let found = stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| l.to_lowercase().starts_with("error"))
        .map(|l| {
            l.strip_prefix("ERROR:")
                .or_else(|| l.strip_prefix("error:"))
                .unwrap_or(l)
                .trim()
                .to_string()
        })
        .filter(|l| !l.is_empty());

    found.unwrap_or_else(|| stderr.trim().chars().take(300).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_unavailable() {
        let err = classify_stderr(Some(1), "ERROR: Video unavailable");
        assert!(matches!(err, DownloadError::Unavailable(_)));

        let err = classify_stderr(Some(1), "ERROR: Private video. Sign in if you've been granted access");
        assert!(matches!(err, DownloadError::Unavailable(_)));

        let err = classify_stderr(Some(1), "ERROR: The uploader has not made this video available in your country");
        assert!(matches!(err, DownloadError::Unavailable(_)));
    }

    #[test]
    fn classify_missing_ffmpeg() {
        let err = classify_stderr(Some(1), "ERROR: ffmpeg not found. Please install or provide the path");
        assert!(matches!(err, DownloadError::ToolMissing { tool: "ffmpeg" }));
    }

    #[test]
    fn classify_transcode_failure() {
        let err = classify_stderr(Some(1), "ERROR: Postprocessing: audio conversion failed");
        assert!(matches!(err, DownloadError::Transcode(_)));
    }

    #[test]
    fn classify_network_failure() {
        let err = classify_stderr(Some(1), "ERROR: Unable to download webpage: <urlopen error timed out>");
        assert!(matches!(err, DownloadError::Network(_)));

        let err = classify_stderr(Some(1), "ERROR: HTTP Error 429: Too Many Requests");
        assert!(matches!(err, DownloadError::Network(_)));
    }

    #[test]
    fn classify_unknown_falls_through_with_message() {
        let err = classify_stderr(Some(1), "ERROR: some unknown thing happened");
        match err {
            DownloadError::YtDlpFailed { code, message } => {
                assert_eq!(code, Some(1));
                assert_eq!(message, "some unknown thing happened");
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn last_error_line_picks_final_error() {
        let stderr = "WARNING: something minor\nERROR: first\nERROR: second problem";
        assert_eq!(last_error_line(stderr), "second problem");
    }

    #[test]
    fn probe_single_video() {
        let json = r#"{"id": "abc123", "title": "A Video", "duration": 212.0}"#;
        let probed = parse_probe("https://www.youtube.com/watch?v=abc123", json).unwrap();
        match probed {
            ProbedUrl::Single(entry) => {
                assert_eq!(entry.url, "https://www.youtube.com/watch?v=abc123");
                assert_eq!(entry.id.as_deref(), Some("abc123"));
                assert_eq!(entry.title.as_deref(), Some("A Video"));
            }
            other => panic!("expected single, got {:?}", other),
        }
    }

    #[test]
    fn probe_playlist_with_null_and_urlless_entries() {
        let json = r#"{
            "_type": "playlist",
            "id": "PL1",
            "title": "My Playlist",
            "entries": [
                {"id": "aaa", "url": "https://www.youtube.com/watch?v=aaa", "title": "One"},
                null,
                {"id": "bbb", "title": "[Private video]"},
                {"id": "ccc", "url": "https://www.youtube.com/watch?v=ccc", "title": "Three"}
            ]
        }"#;
        let probed = parse_probe("https://www.youtube.com/playlist?list=PL1", json).unwrap();
        match probed {
            ProbedUrl::Playlist { title, entries } => {
                assert_eq!(title.as_deref(), Some("My Playlist"));
                assert_eq!(entries.len(), 3);
                // the url-less entry falls back to its watch URL so it is
                // still attempted (and reported) rather than skipped
                assert_eq!(entries[1].url, "https://www.youtube.com/watch?v=bbb");
            }
            other => panic!("expected playlist, got {:?}", other),
        }
    }

    #[test]
    fn probe_rejects_garbage() {
        assert!(matches!(
            parse_probe("https://example.com", "not json"),
            Err(DownloadError::MetadataParse(_))
        ));
    }

    #[test]
    fn fetch_output_splits_metadata_and_path() {
        let stdout = "{\"id\": \"abc\", \"title\": \"Song\", \"duration\": 180.5, \"ext\": \"mp3\"}\n/tmp/downloads/Song - abc.mp3\n";
        let (metadata, path) = parse_fetch_output(stdout);
        let metadata = metadata.unwrap();
        assert_eq!(metadata.id, "abc");
        assert_eq!(metadata.title, "Song");
        assert_eq!(metadata.duration, Some(180.5));
        assert_eq!(path.unwrap(), PathBuf::from("/tmp/downloads/Song - abc.mp3"));
    }

    #[test]
    fn fetch_output_handles_missing_pieces() {
        let (metadata, path) = parse_fetch_output("");
        assert!(metadata.is_none());
        assert!(path.is_none());
    }

    #[test]
    fn entry_label_prefers_title() {
        let entry = PlaylistEntry {
            url: "https://example.com/x".into(),
            id: Some("x1".into()),
            title: Some("Title".into()),
        };
        assert_eq!(entry.label(), "Title");

        let entry = PlaylistEntry {
            url: "https://example.com/x".into(),
            id: Some("x1".into()),
            title: None,
        };
        assert_eq!(entry.label(), "x1");
    }
}
