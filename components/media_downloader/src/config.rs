// components/media_downloader/src/config.rs
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Settings for the default (yt-dlp + HTTP + ffmpeg) downloader
#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    pub ytdlp_path: PathBuf,
    pub ffmpeg_path: PathBuf,

    /// Retry policy for interrupted transfers
    pub retry: RetryPolicy,

    /// How long a transfer may stall before it counts as interrupted
    pub read_timeout: Duration,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: PathBuf::from("yt-dlp"),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            retry: RetryPolicy::default(),
            read_timeout: Duration::from_secs(30),
        }
    }
}
