// bases/download_cli/src/app.rs
use std::sync::Arc;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use media_downloader::{DispatchError, JobEvent, JobHost, JobRequest, MediaDownloader, Outcome};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::Config;
use crate::output::OutputHandler;

/// One turn of the interactive loop
enum Step {
    Input(Option<String>),
    Event(JobEvent),
    Idle,
}

pub struct App {
    config: Config,
    output: OutputHandler,
}

impl App {
    pub fn new(config: Config) -> Self {
        let output = OutputHandler::new(config.verbose);
        Self { config, output }
    }

    pub async fn run(&self) -> Result<()> {
        let downloader = MediaDownloader::new(self.config.downloader.clone()).await?;
        let mut host = JobHost::new(Arc::new(downloader));

        match &self.config.url {
            Some(url) => self.run_once(&mut host, url).await,
            None => self.run_interactive(&mut host).await,
        }
    }

    async fn run_once(&self, host: &mut JobHost, url: &str) -> Result<()> {
        self.dispatch(host, url)?;

        while let Some(event) = host.next_event().await {
            match event {
                JobEvent::Status(status) => self.output.print_status(status, self.config.mode),
                JobEvent::Finished(outcome @ Outcome::Success(_)) => {
                    self.output.print_outcome(&outcome);
                    return Ok(());
                }
                JobEvent::Finished(Outcome::Failure(reason)) => return Err(eyre!(reason)),
            }
        }

        Err(eyre!("Download ended without a result"))
    }

    async fn run_interactive(&self, host: &mut JobHost) -> Result<()> {
        self.output
            .print_interactive_start(self.config.mode, &self.config.output_dir);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut input_open = true;

        loop {
            if !input_open && !host.is_busy() {
                break;
            }
            let busy = host.is_busy();

            let step = tokio::select! {
                line = lines.next_line(), if input_open => Step::Input(line?),
                Some(event) = host.next_event(), if busy => Step::Event(event),
                else => Step::Idle,
            };

            match step {
                Step::Input(None) => input_open = false,
                Step::Input(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if line == "exit" || line == "quit" {
                        input_open = false;
                        continue;
                    }
                    if let Err(DispatchError::Busy) = self.dispatch(host, line) {
                        self.output.print_busy(line);
                    }
                }
                Step::Event(JobEvent::Status(status)) => {
                    self.output.print_status(status, self.config.mode)
                }
                Step::Event(JobEvent::Finished(outcome)) => self.output.print_outcome(&outcome),
                Step::Idle => break,
            }
        }

        tracing::info!("Program close.");
        Ok(())
    }

    fn dispatch(&self, host: &mut JobHost, url: &str) -> Result<(), DispatchError> {
        host.try_dispatch(request(url, &self.config))?;
        self.output.print_download_start(url);
        Ok(())
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        self.output.print_error(error);
    }
}

fn request(url: &str, config: &Config) -> JobRequest {
    JobRequest {
        url: url.to_string(),
        mode: config.mode,
        target_dir: config.output_dir.clone(),
    }
}
