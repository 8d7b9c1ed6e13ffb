use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ytmedia")]
#[command(author, version, about = "YouTube audio/video downloader wrapping yt-dlp and FFmpeg")]
#[command(subcommand_negates_reqs = true)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Video or playlist URL
    #[arg(long, required = true)]
    pub url: Option<String>,

    /// Destination folder (default: downloads)
    #[arg(long)]
    pub outfolder: Option<PathBuf>,

    /// Output format. Audio: mp3, ogg, wav, m4a, aac, flac. Video: mp4,
    /// webm, mkv, avi, mov, flv (default: mp3)
    #[arg(long)]
    pub format: Option<String>,

    /// Audio bitrate in kbps (64-320), or video resolution
    /// (360p/480p/720p/1080p/1440p/2160p, best, worst)
    /// (default: 192 for audio, best for video)
    #[arg(long)]
    pub quality: Option<String>,

    /// Download the full video instead of audio only
    #[arg(long)]
    pub video: bool,

    /// Filename template with yt-dlp tokens: %(title)s, %(id)s, %(ext)s
    /// (default: "%(title)s - %(id)s.%(ext)s")
    #[arg(long)]
    pub template: Option<String>,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that yt-dlp and FFmpeg are installed
    Doctor,

    /// Show effective configuration
    Config,
}
