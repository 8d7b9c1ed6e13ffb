//! Download orchestration: tool checks, folder setup, sequential playlist
//! traversal, per-item failure isolation.

use crate::config::Config;
use crate::downloader::{DownloadResult, Downloader, PlaylistEntry, ProbedUrl};
use crate::error::{DownloadError, YtMediaError};
use crate::options;
use crate::request::DownloadRequest;
use std::future::Future;
use std::io;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Progress events emitted while a request runs. Rendering is the CLI's
/// concern.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Resolved {
        total: usize,
        playlist_title: Option<String>,
    },
    EntryStarted {
        index: usize,
        total: usize,
        label: String,
    },
    EntryFinished {
        index: usize,
        total: usize,
        label: String,
        error: Option<String>,
    },
}

/// Outcome of one playlist entry (or the single requested item).
#[derive(Debug)]
pub struct EntryOutcome {
    pub label: String,
    pub result: Result<DownloadResult, DownloadError>,
}

/// Aggregated per-item results for a whole request.
#[derive(Debug, Default)]
pub struct DownloadSummary {
    pub outcomes: Vec<EntryOutcome>,
}

impl DownloadSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &DownloadError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.label.as_str(), e)))
    }

    pub fn results(&self) -> impl Iterator<Item = &DownloadResult> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }
}

#[derive(Debug)]
pub struct Orchestrator {
    request: DownloadRequest,
    downloader: Downloader,
    progress_tx: mpsc::Sender<ProgressEvent>,
}

impl Orchestrator {
    /// Resolve both external tools up front so a missing binary fails fast
    /// instead of surfacing mid-download.
    pub fn new(
        request: DownloadRequest,
        config: &Config,
        progress_tx: mpsc::Sender<ProgressEvent>,
    ) -> Result<Self, YtMediaError> {
        let yt_dlp = config
            .yt_dlp_path()
            .map_err(|_| DownloadError::ToolMissing { tool: "yt-dlp" })?;
        // ffmpeg does the transcoding for every format we offer
        config
            .ffmpeg_path()
            .map_err(|_| DownloadError::ToolMissing { tool: "ffmpeg" })?;

        Ok(Self {
            request,
            downloader: Downloader::new(yt_dlp),
            progress_tx,
        })
    }

    pub async fn run(&self) -> Result<DownloadSummary, YtMediaError> {
        ensure_outfolder(&self.request.outfolder)?;

        let args = options::build_args(&self.request);

        info!("Resolving: {}", self.request.url);
        let probed = self.downloader.probe(self.request.url.as_str()).await?;

        let (playlist_title, entries) = match probed {
            ProbedUrl::Single(entry) => (None, vec![entry]),
            ProbedUrl::Playlist { title, entries } => (title, entries),
        };

        let _ = self
            .progress_tx
            .send(ProgressEvent::Resolved {
                total: entries.len(),
                playlist_title,
            })
            .await;

        let downloader = &self.downloader;
        let args = &args;
        let summary = drain_entries(entries, &self.progress_tx, |entry| async move {
            downloader.fetch(&entry, args).await
        })
        .await;

        info!(
            "Finished: {} succeeded, {} failed",
            summary.succeeded(),
            summary.failed()
        );

        Ok(summary)
    }
}

/// Create the output folder if missing. Safe to call for an existing folder.
pub fn ensure_outfolder(path: &Path) -> io::Result<()> {
    std::fs::create_dir_all(path)
}

/// Walk the entries one at a time. A failed entry is recorded and the walk
/// continues with the next one.
async fn drain_entries<F, Fut>(
    entries: Vec<PlaylistEntry>,
    progress: &mpsc::Sender<ProgressEvent>,
    mut fetch: F,
) -> DownloadSummary
where
    F: FnMut(PlaylistEntry) -> Fut,
    Fut: Future<Output = Result<DownloadResult, DownloadError>>,
{
    let total = entries.len();
    let mut summary = DownloadSummary::default();

    for (index, entry) in entries.into_iter().enumerate() {
        let label = entry.label();

        let _ = progress
            .send(ProgressEvent::EntryStarted {
                index,
                total,
                label: label.clone(),
            })
            .await;

        let result = fetch(entry).await;

        if let Err(ref e) = result {
            warn!("Entry failed: {}: {}", label, e);
        }

        let _ = progress
            .send(ProgressEvent::EntryFinished {
                index,
                total,
                label: label.clone(),
                error: result.as_ref().err().map(|e| e.to_string()),
            })
            .await;

        summary.outcomes.push(EntryOutcome { label, result });
    }

    summary
}
