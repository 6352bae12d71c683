// components/media_downloader/src/transcoder.rs
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::types::DownloadError;

/// Converts a media file into the container implied by `target`'s extension.
/// Implementations overwrite `target` and never touch `source`.
#[async_trait]
pub trait Transcoder {
    async fn check_available(&self) -> Result<(), DownloadError>;

    async fn transcode(&self, source: &Path, target: &Path) -> Result<(), DownloadError>;
}

pub struct Ffmpeg {
    binary: PathBuf,
}

impl Ffmpeg {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[async_trait]
impl Transcoder for Ffmpeg {
    async fn check_available(&self) -> Result<(), DownloadError> {
        which::which(&self.binary)
            .map(|_| ())
            .map_err(|_| DownloadError::DependencyNotFound("ffmpeg"))
    }

    async fn transcode(&self, source: &Path, target: &Path) -> Result<(), DownloadError> {
        tracing::debug!("ffmpeg {} -> {}", source.display(), target.display());

        let output = Command::new(&self.binary)
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-nostdin")
            .arg("-y")
            .arg("-i")
            .arg(source)
            .arg(target)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => DownloadError::DependencyNotFound("ffmpeg"),
                _ => DownloadError::TranscodeFailed(e.to_string()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DownloadError::TranscodeFailed(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}
