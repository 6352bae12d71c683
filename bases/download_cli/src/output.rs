// bases/download_cli/src/output.rs
use std::path::Path;

use media_downloader::{JobStatus, Outcome, RequestMode};

pub struct OutputHandler {
    verbose: bool,
}

impl OutputHandler {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn print_interactive_start(&self, mode: RequestMode, output_dir: &Path) {
        println!("Saving {} to {}", mode.target(), output_dir.display());
        println!("Paste a URL and press enter (\"exit\" to quit)");
    }

    pub fn print_download_start(&self, url: &str) {
        println!("Start downloading...");
        if self.verbose {
            println!("Source: {}", url);
        }
    }

    pub fn print_busy(&self, url: &str) {
        eprintln!("A download is already running, ignoring {}", url);
    }

    pub fn print_status(&self, status: JobStatus, mode: RequestMode) {
        match status {
            JobStatus::Transcoding => println!("Transform to {}...", mode.target()),
            other if self.verbose => println!("  {:?}", other),
            _ => {}
        }
    }

    pub fn print_outcome(&self, outcome: &Outcome) {
        match outcome {
            Outcome::Success(path) => println!("Saved to {}", path.display()),
            Outcome::Failure(reason) => eprintln!("{}", reason),
        }
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        eprintln!("Error: {}", error);

        if self.verbose {
            eprintln!("\nError details:");
            error.chain().skip(1).for_each(|cause| {
                eprintln!("  caused by: {}", cause);
            });
        }
    }
}
