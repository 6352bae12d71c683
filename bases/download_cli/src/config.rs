// bases/download_cli/src/config.rs
use std::path::PathBuf;
use std::time::Duration;

use color_eyre::eyre::{eyre, Result};
use media_downloader::{DownloaderConfig, RequestMode, RetryPolicy};

use crate::args::{Args, Format};

/// Settled configuration for one run of the CLI
#[derive(Debug, Clone)]
pub struct Config {
    pub url: Option<String>,
    pub mode: RequestMode,

    /// Absolute, existing directory files are saved into
    pub output_dir: PathBuf,

    pub downloader: DownloaderConfig,
    pub verbose: bool,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        let output_dir = match args.output_dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        let output_dir = resolve_output_dir(output_dir)?;

        let mode = match args.format {
            Format::Mp4 => RequestMode::ProgressiveVideo,
            Format::Mp3 => RequestMode::AdaptiveAudio,
        };

        let url = args
            .url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let downloader = DownloaderConfig {
            ytdlp_path: args.ytdlp,
            ffmpeg_path: args.ffmpeg,
            retry: RetryPolicy {
                max_attempts: args.retries.max(1),
                delay: Duration::from_secs(args.retry_delay_secs),
            },
            ..DownloaderConfig::default()
        };

        Ok(Self {
            url,
            mode,
            output_dir,
            downloader,
            verbose: args.verbose,
        })
    }

    pub fn is_interactive(&self) -> bool {
        self.url.is_none()
    }
}

/// The folder has to exist before anything is dispatched
fn resolve_output_dir(dir: PathBuf) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(eyre!("Output directory does not exist: {}", dir.display()));
    }
    Ok(dunce::canonicalize(&dir)?)
}
