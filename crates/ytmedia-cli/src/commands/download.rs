use anyhow::{anyhow, bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use crate::args::Cli;
use ytmedia_core::{Config, DownloadRequest, Orchestrator, ProgressEvent};

pub async fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    let url = cli
        .url
        .as_deref()
        .ok_or_else(|| anyhow!("--url is required"))?;

    let quality_default = if cli.video {
        &config.output.default_video_quality
    } else {
        &config.output.default_quality
    };

    let request = DownloadRequest::build(
        url,
        cli.outfolder
            .clone()
            .unwrap_or_else(|| config.output.default_directory.clone()),
        cli.format.as_deref().unwrap_or(&config.output.default_format),
        cli.quality.as_deref().unwrap_or(quality_default),
        cli.video,
        cli.template
            .as_deref()
            .unwrap_or(&config.output.default_template),
    )?;

    tracing::debug!(?request, "validated request");

    println!(
        "Downloading {} to {} ({}, {})",
        if request.is_video() { "video" } else { "audio" },
        request.outfolder.display(),
        request.format,
        request.quality,
    );

    let (tx, mut rx) = mpsc::channel(32);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?.tick_chars("=>-"));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let progress_handle = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                ProgressEvent::Resolved {
                    total,
                    playlist_title,
                } => match playlist_title {
                    Some(title) => {
                        pb.println(format!("Playlist detected: {} ({} items)", title, total))
                    }
                    None => pb.println("Single item detected"),
                },
                ProgressEvent::EntryStarted {
                    index,
                    total,
                    label,
                } => {
                    pb.set_message(format!("[{}/{}] {}", index + 1, total, truncate(&label, 50)));
                }
                ProgressEvent::EntryFinished {
                    index,
                    total,
                    label,
                    error,
                } => match error {
                    None => pb.println(format!(
                        "[{}/{}] Done: {}",
                        index + 1,
                        total,
                        truncate(&label, 60)
                    )),
                    Some(e) => pb.println(format!(
                        "[{}/{}] Failed: {} - {}",
                        index + 1,
                        total,
                        truncate(&label, 60),
                        e
                    )),
                },
            }
        }
        pb.finish_and_clear();
    });

    let orchestrator = Orchestrator::new(request, &config, tx)?;
    let summary = orchestrator.run().await?;

    progress_handle.await?;

    println!("\n=== Download summary ===");
    println!("Total:     {}", summary.total());
    println!("Succeeded: {}", summary.succeeded());
    println!("Failed:    {}", summary.failed());

    for result in summary.results() {
        println!("Output: {}", result.path.display());
    }

    if summary.failed() > 0 {
        println!("\nFailures:");
        for (label, error) in summary.failures() {
            println!("  {} - {}", label, error);
        }
        bail!("{} of {} items failed", summary.failed(), summary.total());
    }

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
