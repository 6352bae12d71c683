// components/media_downloader/src/types.rs
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Required dependency not found: {0}")]
    DependencyNotFound(&'static str),

    #[error("Could not resolve streams: {0}")]
    ResolutionFailed(#[from] ResolveError),

    #[error("No {0} stream available")]
    NoStreamAvailable(RequestMode),

    #[error("Download failed after {attempts} attempt(s)")]
    DownloadFailed {
        attempts: u32,
        #[source]
        source: TransferError,
    },

    #[error("Format conversion failed: {0}")]
    TranscodeFailed(String),

    #[error("Setup failed: {0}")]
    Setup(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DownloadError {
    /// Short text suitable for showing to the person who asked for the job.
    /// The full error (with its source chain) belongs in the log.
    pub fn user_message(&self) -> String {
        match self {
            DownloadError::ResolutionFailed(e) => {
                format!("{}! Check URL or try it later.", e.class())
            }
            DownloadError::DownloadFailed { .. } => {
                "Download failed. Check your connection or try it later.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Failure to turn a URL into a stream catalogue.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("media unavailable: {0}")]
    Unavailable(String),

    #[error("source unreachable: {0}")]
    Unreachable(String),

    #[error("unexpected catalogue data: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResolveError {
    pub fn class(&self) -> &'static str {
        match self {
            ResolveError::InvalidUrl(_) => "InvalidUrl",
            ResolveError::Unavailable(_) => "Unavailable",
            ResolveError::Unreachable(_) => "Unreachable",
            ResolveError::Malformed(_) => "Malformed",
            ResolveError::Io(_) => "IoError",
        }
    }
}

/// Failure of a single transfer attempt.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The connection dropped or stalled mid-body. Safe to retry.
    #[error("transfer interrupted: {0}")]
    Interrupted(String),

    #[error("server responded with status {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Request(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransferError {
    pub fn is_transient(&self) -> bool {
        matches!(self, TransferError::Interrupted(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Video,
    Audio,
}

/// Output container for a finished job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Container {
    Mp4,
    Mp3,
}

impl Container {
    pub fn extension(&self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::Mp3 => "mp3",
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestMode {
    /// A single stream carrying both picture and sound, saved as mp4.
    ProgressiveVideo,
    /// An audio-only stream, saved as mp3.
    AdaptiveAudio,
}

impl RequestMode {
    pub fn target(&self) -> Container {
        match self {
            RequestMode::ProgressiveVideo => Container::Mp4,
            RequestMode::AdaptiveAudio => Container::Mp3,
        }
    }

    pub fn kind(&self) -> StreamKind {
        match self {
            RequestMode::ProgressiveVideo => StreamKind::Video,
            RequestMode::AdaptiveAudio => StreamKind::Audio,
        }
    }
}

impl fmt::Display for RequestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestMode::ProgressiveVideo => f.write_str("progressive video"),
            RequestMode::AdaptiveAudio => f.write_str("adaptive audio"),
        }
    }
}

/// Where the bytes of a stream live. Only the transfer layer looks inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHandle {
    pub format_id: String,
    pub url: Url,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStream {
    pub kind: StreamKind,

    /// Video stream that also carries an audio track
    pub progressive: bool,

    /// Pixel height for video, kbps for audio
    pub quality: u32,

    /// Container tag as reported by the source, e.g. `mp4` or `webm`
    pub subtype: String,

    pub default_filename: String,

    pub handle: StreamHandle,
}

impl SourceStream {
    pub fn matches(&self, mode: RequestMode) -> bool {
        match mode {
            RequestMode::ProgressiveVideo => self.kind == StreamKind::Video && self.progressive,
            RequestMode::AdaptiveAudio => self.kind == StreamKind::Audio,
        }
    }

    pub fn describe_quality(&self) -> String {
        match self.kind {
            StreamKind::Video => format!("{}p", self.quality),
            StreamKind::Audio => format!("{}kbps", self.quality),
        }
    }
}

/// Streams offered for one media item, in the order the source listed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamCatalogue {
    pub title: String,
    pub streams: Vec<SourceStream>,
}

impl StreamCatalogue {
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn of_kind(&self, kind: StreamKind) -> impl Iterator<Item = &SourceStream> {
        self.streams.iter().filter(move |s| s.kind == kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Resolving,
    Selecting,
    Downloading,
    Skipped,
    Transcoding,
    Done,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(PathBuf),
    Failure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_targets() {
        assert_eq!(RequestMode::ProgressiveVideo.target(), Container::Mp4);
        assert_eq!(RequestMode::AdaptiveAudio.target(), Container::Mp3);
        assert_eq!(Container::Mp3.to_string(), "mp3");
    }

    #[test]
    fn test_only_interrupted_transfers_are_transient() {
        assert!(TransferError::Interrupted("eof".into()).is_transient());
        assert!(!TransferError::Status(404).is_transient());
        assert!(!TransferError::Request("dns".into()).is_transient());
    }

    #[test]
    fn test_resolution_message_is_shorter_than_diagnostic() {
        let err = DownloadError::from(ResolveError::InvalidUrl(
            "'not a url' is not a valid URL. Set --default-search \"ytsearch\" to search"
                .to_string(),
        ));

        let message = err.user_message();
        assert_eq!(message, "InvalidUrl! Check URL or try it later.");
        assert!(message.len() < err.to_string().len());
    }
}
