use anyhow::Result;
use std::process::Command;
use which::which;

struct ToolCheck {
    name: &'static str,
    version_args: &'static [&'static str],
    /// Index of the whitespace-separated token holding the version in the
    /// first output line; None takes the whole line (yt-dlp prints just the
    /// version, ffmpeg buries it in a banner).
    version_token: Option<usize>,
    install_hint: &'static str,
}

const CHECKS: [ToolCheck; 2] = [
    ToolCheck {
        name: "yt-dlp",
        version_args: &["--version"],
        version_token: None,
        install_hint: "https://github.com/yt-dlp/yt-dlp",
    },
    ToolCheck {
        name: "ffmpeg",
        version_args: &["-version"],
        version_token: Some(2),
        install_hint: "https://ffmpeg.org/download.html",
    },
];

pub async fn run() -> Result<()> {
    println!("ytmedia dependency check\n");

    let mut all_ok = true;
    for check in &CHECKS {
        if !report(check) {
            all_ok = false;
        }
    }

    println!();
    if all_ok {
        println!("All dependencies OK!");
    } else {
        println!("Some dependencies are missing. See above for installation instructions.");
    }

    Ok(())
}

fn report(check: &ToolCheck) -> bool {
    print!("{:<8} ", format!("{}:", check.name));

    let path = match which(check.name) {
        Ok(path) => path,
        Err(_) => {
            println!("NOT FOUND");
            println!("         Install from {}", check.install_hint);
            return false;
        }
    };

    match Command::new(&path).args(check.version_args).output() {
        Ok(out) => {
            println!("OK ({})", version_of(check, &out.stdout));
            true
        }
        Err(_) => {
            println!("FOUND but failed to get version");
            false
        }
    }
}

fn version_of(check: &ToolCheck, stdout: &[u8]) -> String {
    let text = String::from_utf8_lossy(stdout);
    let first_line = text.lines().next().unwrap_or("").trim();
    match check.version_token {
        Some(n) => first_line
            .split_whitespace()
            .nth(n)
            .unwrap_or("unknown")
            .to_string(),
        None => first_line.to_string(),
    }
}
