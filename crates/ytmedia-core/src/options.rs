//! Maps a validated request onto the yt-dlp argument list.
//!
//! The mapping is one-to-one: format picks the codec/container flags,
//! quality picks the bitrate or height constraint, the template becomes the
//! output naming pattern. Stream selection itself stays inside yt-dlp.

use crate::request::{DownloadRequest, MediaFormat, Quality, VideoFormat};

/// Build the per-item yt-dlp argument list. The entry URL is appended by the
/// caller.
pub fn build_args(request: &DownloadRequest) -> Vec<String> {
    let mut args: Vec<String> = [
        // One entry per invocation; the orchestrator walks playlists itself
        "--no-playlist",
        "--no-overwrites",
        "--no-warnings",
        "--no-progress",
        // Download, then report: one JSON metadata line plus the final path
        "--no-simulate",
        "--print-json",
        "--print",
        "after_move:filepath",
        "-o",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    args.push(
        request
            .outfolder
            .join(&request.template)
            .to_string_lossy()
            .into_owned(),
    );

    match request.format {
        MediaFormat::Audio(fmt) => {
            args.push("-f".into());
            args.push("bestaudio/best".into());
            args.push("-x".into());
            args.push("--audio-format".into());
            args.push(fmt.codec().into());
            if let (true, Quality::Bitrate(bitrate)) = (fmt.takes_bitrate(), request.quality) {
                args.push("--audio-quality".into());
                args.push(format!("{}K", bitrate));
            }
        }
        MediaFormat::Video(fmt) => {
            args.push("-f".into());
            args.push(video_selector(request.quality));
            // mp4 is yt-dlp's default merge container; anything else needs
            // an explicit container choice
            if fmt != VideoFormat::Mp4 {
                if fmt.supports_merge() {
                    args.push("--merge-output-format".into());
                    args.push(fmt.extension().into());
                }
                args.push("--recode-video".into());
                args.push(fmt.extension().into());
            }
        }
    }

    args
}

fn video_selector(quality: Quality) -> String {
    match quality {
        Quality::Best => "bestvideo+bestaudio/best".into(),
        Quality::Worst => "worstvideo+worstaudio/worst".into(),
        Quality::Height(h) => format!("bestvideo[height<={h}]+bestaudio/best[height<={h}]"),
        // Quality::parse only yields Bitrate in audio mode, and build_args
        // only calls this for video requests
        Quality::Bitrate(_) => unreachable!("bitrate quality on a video request"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{DownloadRequest, DEFAULT_TEMPLATE};
    use std::path::PathBuf;

    fn request(format: &str, quality: &str, is_video: bool) -> DownloadRequest {
        DownloadRequest::build(
            "https://www.youtube.com/watch?v=abc",
            PathBuf::from("downloads"),
            format,
            quality,
            is_video,
            DEFAULT_TEMPLATE,
        )
        .unwrap()
    }

    fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
        args.windows(2).any(|w| w[0] == flag && w[1] == value)
    }

    #[test]
    fn audio_mp3_with_bitrate() {
        let args = build_args(&request("mp3", "192", false));
        assert!(has_pair(&args, "-f", "bestaudio/best"));
        assert!(args.contains(&"-x".to_string()));
        assert!(has_pair(&args, "--audio-format", "mp3"));
        assert!(has_pair(&args, "--audio-quality", "192K"));
    }

    #[test]
    fn lossless_audio_skips_bitrate() {
        for fmt in ["flac", "wav", "m4a"] {
            let args = build_args(&request(fmt, "192", false));
            assert!(
                !args.contains(&"--audio-quality".to_string()),
                "{} should not carry a bitrate",
                fmt
            );
        }
    }

    #[test]
    fn ogg_requests_vorbis() {
        let args = build_args(&request("ogg", "320", false));
        assert!(has_pair(&args, "--audio-format", "vorbis"));
        assert!(has_pair(&args, "--audio-quality", "320K"));
    }

    #[test]
    fn video_height_constraint() {
        let args = build_args(&request("mp4", "1080p", true));
        assert!(has_pair(
            &args,
            "-f",
            "bestvideo[height<=1080]+bestaudio/best[height<=1080]"
        ));
        assert!(!args.contains(&"--recode-video".to_string()));
        assert!(!args.contains(&"--merge-output-format".to_string()));
    }

    #[test]
    fn video_best_and_worst_pass_through() {
        let best = build_args(&request("mp4", "best", true));
        assert!(has_pair(&best, "-f", "bestvideo+bestaudio/best"));

        let worst = build_args(&request("mp4", "worst", true));
        assert!(has_pair(&worst, "-f", "worstvideo+worstaudio/worst"));
    }

    #[test]
    fn mkv_gets_merge_and_recode() {
        let args = build_args(&request("mkv", "720p", true));
        assert!(has_pair(&args, "--merge-output-format", "mkv"));
        assert!(has_pair(&args, "--recode-video", "mkv"));
    }

    #[test]
    fn avi_recodes_without_merge() {
        let args = build_args(&request("avi", "best", true));
        assert!(!args.contains(&"--merge-output-format".to_string()));
        assert!(has_pair(&args, "--recode-video", "avi"));
    }

    #[test]
    fn output_template_lands_under_outfolder() {
        let args = build_args(&request("mp3", "192", false));
        let template = PathBuf::from("downloads")
            .join(DEFAULT_TEMPLATE)
            .to_string_lossy()
            .into_owned();
        assert!(has_pair(&args, "-o", &template));
    }

    #[test]
    fn playlist_traversal_stays_with_orchestrator() {
        let args = build_args(&request("mp3", "192", false));
        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(args.contains(&"--no-overwrites".to_string()));
    }
}
