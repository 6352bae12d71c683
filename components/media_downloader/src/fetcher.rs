// components/media_downloader/src/fetcher.rs
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;

use crate::retry::{retry, RetryPolicy};
use crate::types::{DownloadError, SourceStream, TransferError};
use crate::utils::partial_path;

/// Moves the bytes of one stream into a file.
#[async_trait]
pub trait Transfer {
    async fn transfer(&self, stream: &SourceStream, output: &Path) -> Result<(), TransferError>;
}

/// Plain HTTP GET of the stream's direct media URL.
pub struct HttpTransfer {
    client: Client,
}

impl HttpTransfer {
    pub fn new(timeout: Duration) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .read_timeout(timeout)
            .user_agent(concat!("media-downloader/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DownloadError::Setup(e.to_string()))?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

/// Failure before a response arrived: connect, DNS, TLS or a connect timeout.
fn request_error(e: reqwest::Error) -> TransferError {
    match e.status() {
        Some(status) => TransferError::Status(status.as_u16()),
        None => TransferError::Request(e.to_string()),
    }
}

/// Failure while the body was streaming; the only retryable kind.
fn body_error(e: reqwest::Error) -> TransferError {
    TransferError::Interrupted(e.to_string())
}

#[async_trait]
impl Transfer for HttpTransfer {
    async fn transfer(&self, stream: &SourceStream, output: &Path) -> Result<(), TransferError> {
        let response = self
            .client
            .get(stream.handle.url.clone())
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::Status(status.as_u16()));
        }

        let expected = response.content_length();
        let mut file = tokio::fs::File::create(output).await?;
        let mut body = response.bytes_stream();
        let mut received = 0u64;

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(body_error)?;
            file.write_all(&chunk).await?;
            received += chunk.len() as u64;
        }
        file.flush().await?;

        match expected {
            Some(expected) if received < expected => Err(TransferError::Interrupted(format!(
                "incomplete read: {} of {} bytes",
                received, expected
            ))),
            _ => Ok(()),
        }
    }
}

/// Downloads a selected stream into a directory, retrying interrupted transfers.
///
/// Bytes land in a `.part` sibling first and are renamed into place once the
/// transfer completes, so a failed fetch never touches an existing file.
pub struct Fetcher {
    transfer: Arc<dyn Transfer + Send + Sync>,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(transfer: Arc<dyn Transfer + Send + Sync>, policy: RetryPolicy) -> Self {
        Self { transfer, policy }
    }

    pub async fn fetch(
        &self,
        stream: &SourceStream,
        target_dir: &Path,
    ) -> Result<PathBuf, DownloadError> {
        let output = target_dir.join(&stream.default_filename);
        let partial = partial_path(&output);
        tracing::debug!(
            "Fetching format {} into {}",
            stream.handle.format_id,
            output.display()
        );

        let destination: &Path = &partial;
        let result = retry(self.policy, TransferError::is_transient, |attempt| {
            tracing::debug!("Transfer attempt {}", attempt);
            self.transfer.transfer(stream, destination)
        })
        .await;

        match result {
            Ok(()) => {
                tokio::fs::rename(&partial, &output).await?;
                Ok(output)
            }
            Err(failure) => {
                if let Err(e) = tokio::fs::remove_file(&partial).await {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!(
                            "Could not remove partial file {}: {}",
                            partial.display(),
                            e
                        );
                    }
                }
                Err(DownloadError::DownloadFailed {
                    attempts: failure.attempts,
                    source: failure.error,
                })
            }
        }
    }
}
