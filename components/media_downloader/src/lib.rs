// components/media_downloader/src/lib.rs
mod config;
mod fetcher;
mod host;
mod resolver;
mod retry;
mod selector;
mod transcoder;
mod types;
mod utils;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

pub use config::DownloaderConfig;
pub use fetcher::{Fetcher, HttpTransfer, Transfer};
pub use host::{DispatchError, JobEvent, JobHost, JobRequest};
pub use resolver::{parse_catalogue, StreamResolver, YtDlp};
pub use retry::{retry, RetryFailure, RetryPolicy};
pub use selector::select_best;
pub use transcoder::{Ffmpeg, Transcoder};
pub use types::{
    Container, DownloadError, JobStatus, Outcome, RequestMode, ResolveError, SourceStream,
    StreamCatalogue, StreamHandle, StreamKind, TransferError,
};
use utils::transcoded_path;

/// Runs one download job: resolve, select, fetch, and convert when needed.
pub struct MediaDownloader {
    resolver: Arc<dyn StreamResolver + Send + Sync>,
    fetcher: Fetcher,
    transcoder: Arc<dyn Transcoder + Send + Sync>,
}

impl MediaDownloader {
    /// Create a MediaDownloader backed by yt-dlp, HTTP and ffmpeg
    pub async fn new(config: DownloaderConfig) -> Result<Self, DownloadError> {
        let transfer = HttpTransfer::new(config.read_timeout)?;
        Self::new_with(
            Arc::new(YtDlp::new(config.ytdlp_path)),
            Arc::new(transfer),
            Arc::new(Ffmpeg::new(config.ffmpeg_path)),
            config.retry,
        )
        .await
    }

    /// Create a MediaDownloader with specific collaborator implementations
    pub async fn new_with(
        resolver: Arc<dyn StreamResolver + Send + Sync>,
        transfer: Arc<dyn Transfer + Send + Sync>,
        transcoder: Arc<dyn Transcoder + Send + Sync>,
        retry: RetryPolicy,
    ) -> Result<Self, DownloadError> {
        resolver.check_available().await?;
        transcoder.check_available().await?;

        Ok(Self {
            resolver,
            fetcher: Fetcher::new(transfer, retry),
            transcoder,
        })
    }

    /// Download `url` into `target_dir` as `mode`'s container.
    ///
    /// `target_dir` must already exist. Every failure is folded into
    /// `Outcome::Failure` with a short message; the detail goes to the log.
    pub async fn run(&self, url: &str, mode: RequestMode, target_dir: &Path) -> Outcome {
        self.run_with_status(url, mode, target_dir, |_| {}).await
    }

    /// Like [`run`](Self::run), reporting each state the job passes through.
    pub async fn run_with_status<F>(
        &self,
        url: &str,
        mode: RequestMode,
        target_dir: &Path,
        mut on_status: F,
    ) -> Outcome
    where
        F: FnMut(JobStatus) + Send,
    {
        tracing::info!("Download {} | URL: {}", mode, url);
        on_status(JobStatus::Pending);

        match self.execute(url, mode, target_dir, &mut on_status).await {
            Ok(path) => {
                tracing::info!("Saved as \"{}\"", path.display());
                on_status(JobStatus::Done);
                Outcome::Success(path)
            }
            Err(e) => {
                log_failure(&e);
                on_status(JobStatus::Failed);
                Outcome::Failure(e.user_message())
            }
        }
    }

    async fn execute<F>(
        &self,
        url: &str,
        mode: RequestMode,
        target_dir: &Path,
        on_status: &mut F,
    ) -> Result<PathBuf, DownloadError>
    where
        F: FnMut(JobStatus) + Send,
    {
        on_status(JobStatus::Resolving);
        let url = Url::parse(url.trim()).map_err(|e| ResolveError::InvalidUrl(e.to_string()))?;
        let catalogue = self.resolver.resolve(&url).await?;
        tracing::debug!("Collected {} streams", catalogue.len());

        on_status(JobStatus::Selecting);
        let target = mode.target();
        let stream = select_best(&catalogue, mode)?;
        tracing::info!(
            "Quality {:?} file: {}",
            stream.kind,
            stream.describe_quality()
        );

        on_status(JobStatus::Downloading);
        let downloaded = self.fetcher.fetch(stream, target_dir).await?;

        if stream.subtype == target.extension() {
            on_status(JobStatus::Skipped);
            tracing::debug!("Stream is already .{}, no conversion needed", target);
            return Ok(downloaded);
        }

        on_status(JobStatus::Transcoding);
        tracing::info!("Transform from .{} to .{}", stream.subtype, target);
        let final_path = transcoded_path(&downloaded, target);
        // On failure the download stays in place so it can be recovered by hand
        self.transcoder.transcode(&downloaded, &final_path).await?;

        if let Err(e) = tokio::fs::remove_file(&downloaded).await {
            tracing::warn!(
                "Could not remove intermediate file {}: {}",
                downloaded.display(),
                e
            );
        }

        Ok(final_path)
    }
}

fn log_failure(error: &DownloadError) {
    let mut detail = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }

    match error {
        DownloadError::ResolutionFailed(e) => tracing::error!("{}, {}", e.class(), detail),
        _ => tracing::error!("{}", detail),
    }
}
