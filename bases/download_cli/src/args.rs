// bases/download_cli/src/args.rs
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Progressive video (picture and sound in one file)
    Mp4,
    /// Audio only
    Mp3,
}

/// Download a video or its audio track into a folder
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory to store downloaded files (defaults to the current directory)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// URL to download from. Without one, URLs are read from stdin, one per line
    pub url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Mp4)]
    pub format: Format,

    /// Total attempts for an interrupted transfer
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    /// Seconds to wait between transfer attempts
    #[arg(long, default_value_t = 2)]
    pub retry_delay_secs: u64,

    /// yt-dlp executable
    #[arg(long, default_value = "yt-dlp")]
    pub ytdlp: PathBuf,

    /// ffmpeg executable
    #[arg(long, default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
