// components/media_downloader/src/host.rs
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::types::{JobStatus, Outcome, RequestMode};
use crate::MediaDownloader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub url: String,
    pub mode: RequestMode,

    /// Must exist before the job is dispatched
    pub target_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    Status(JobStatus),
    Finished(Outcome),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("A download is already running")]
    Busy,
}

/// Runs jobs off the caller's loop, one at a time.
///
/// `try_dispatch` closes the gate and `next_event` opens it again when the
/// job's `Finished` event is received. Requests made while the gate is
/// closed are rejected, not queued.
pub struct JobHost {
    downloader: Arc<MediaDownloader>,
    events_tx: mpsc::UnboundedSender<JobEvent>,
    events_rx: mpsc::UnboundedReceiver<JobEvent>,
    in_flight: bool,
}

impl JobHost {
    pub fn new(downloader: Arc<MediaDownloader>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            downloader,
            events_tx,
            events_rx,
            in_flight: false,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    pub fn try_dispatch(&mut self, request: JobRequest) -> Result<(), DispatchError> {
        if self.in_flight {
            return Err(DispatchError::Busy);
        }
        self.in_flight = true;

        let downloader = Arc::clone(&self.downloader);
        let events_tx = self.events_tx.clone();

        tokio::spawn(async move {
            let status_tx = events_tx.clone();
            let job = tokio::spawn(async move {
                downloader
                    .run_with_status(&request.url, request.mode, &request.target_dir, |status| {
                        if !status.is_terminal() {
                            let _ = status_tx.send(JobEvent::Status(status));
                        }
                    })
                    .await
            });

            let outcome = match job.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Download task aborted: {}", e);
                    Outcome::Failure("Download aborted unexpectedly".to_string())
                }
            };
            let _ = events_tx.send(JobEvent::Finished(outcome));
        });

        Ok(())
    }

    /// Wait for the next event of the running job. Returns `None` when no
    /// job is in flight.
    pub async fn next_event(&mut self) -> Option<JobEvent> {
        if !self.in_flight {
            return None;
        }

        let event = self.events_rx.recv().await?;
        if matches!(event, JobEvent::Finished(_)) {
            self.in_flight = false;
        }
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::{test_stream, ResolverStub, TranscoderStub, TransferStub};
    use crate::{RetryPolicy, StreamKind};
    use std::time::Duration;
    use tempfile::TempDir;

    async fn host(streams: Vec<crate::SourceStream>) -> JobHost {
        let downloader = MediaDownloader::new_with(
            Arc::new(ResolverStub::with_streams(streams)),
            Arc::new(TransferStub::succeeding()),
            Arc::new(TranscoderStub::succeeding()),
            RetryPolicy {
                max_attempts: 3,
                delay: Duration::ZERO,
            },
        )
        .await
        .unwrap();
        JobHost::new(Arc::new(downloader))
    }

    fn request(dir: &TempDir, mode: RequestMode) -> JobRequest {
        JobRequest {
            url: "https://example.com/watch?v=test".to_string(),
            mode,
            target_dir: dir.path().to_path_buf(),
        }
    }

    async fn finish(host: &mut JobHost) -> (Vec<JobStatus>, Outcome) {
        let mut statuses = Vec::new();
        while let Some(event) = host.next_event().await {
            match event {
                JobEvent::Status(status) => statuses.push(status),
                JobEvent::Finished(outcome) => return (statuses, outcome),
            }
        }
        panic!("host went idle without a Finished event");
    }

    #[tokio::test]
    async fn test_second_dispatch_is_rejected_while_busy() {
        let temp_dir = TempDir::new().unwrap();
        let mut host = host(vec![test_stream("22", StreamKind::Video, true, 720, "mp4")]).await;

        host.try_dispatch(request(&temp_dir, RequestMode::ProgressiveVideo))
            .unwrap();
        assert!(host.is_busy());
        assert_eq!(
            host.try_dispatch(request(&temp_dir, RequestMode::ProgressiveVideo)),
            Err(DispatchError::Busy)
        );

        let (_, outcome) = finish(&mut host).await;
        assert!(outcome.is_success());
        assert!(!host.is_busy());
    }

    #[tokio::test]
    async fn test_gate_reopens_after_failure() {
        let temp_dir = TempDir::new().unwrap();
        let mut host = host(vec![]).await;

        host.try_dispatch(request(&temp_dir, RequestMode::AdaptiveAudio))
            .unwrap();
        let (_, outcome) = finish(&mut host).await;

        assert!(matches!(outcome, Outcome::Failure(_)));
        assert!(!host.is_busy());
        assert!(host
            .try_dispatch(request(&temp_dir, RequestMode::AdaptiveAudio))
            .is_ok());
    }

    #[tokio::test]
    async fn test_status_events_precede_single_outcome() {
        let temp_dir = TempDir::new().unwrap();
        let mut host = host(vec![test_stream("251", StreamKind::Audio, false, 160, "webm")]).await;

        host.try_dispatch(request(&temp_dir, RequestMode::AdaptiveAudio))
            .unwrap();
        let (statuses, outcome) = finish(&mut host).await;

        assert_eq!(statuses.first(), Some(&JobStatus::Pending));
        assert!(statuses.contains(&JobStatus::Transcoding));
        assert!(statuses.iter().all(|s| !s.is_terminal()));
        assert_eq!(
            outcome,
            Outcome::Success(temp_dir.path().join("Test Song.mp3"))
        );
        assert_eq!(host.next_event().await, None);
    }

    #[tokio::test]
    async fn test_idle_host_has_no_events() {
        let mut host = host(vec![]).await;
        assert_eq!(host.next_event().await, None);
    }
}
