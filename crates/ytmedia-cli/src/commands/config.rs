use anyhow::Result;
use std::path::Path;
use ytmedia_core::Config;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("ytmedia configuration\n");

    println!("[paths]");
    if let Some(ref p) = config.paths.yt_dlp {
        println!("  yt_dlp = {:?}", p);
    } else {
        println!("  yt_dlp = (auto-detect)");
    }
    if let Some(ref p) = config.paths.ffmpeg {
        println!("  ffmpeg = {:?}", p);
    } else {
        println!("  ffmpeg = (auto-detect)");
    }

    println!("\n[output]");
    println!("  default_directory = {:?}", config.output.default_directory);
    println!("  default_format = {:?}", config.output.default_format);
    println!("  default_quality = {:?}", config.output.default_quality);
    println!(
        "  default_video_quality = {:?}",
        config.output.default_video_quality
    );
    println!("  default_template = {:?}", config.output.default_template);

    // Show config file locations
    println!("\nConfig file locations (in priority order):");
    if let Some(p) = config_path {
        println!("  1. {} (specified)", p.display());
    }
    if let Some(config_dir) = dirs::config_dir() {
        println!("  2. {}/ytmedia/config.toml", config_dir.display());
    }
    println!("  3. Environment variables (YTMEDIA_*)");

    Ok(())
}
