use std::path::{Path, PathBuf};

use layerport_core::presentation::suggested_file_name;
use layerport_core::{Job, JobView, StatusIcon};
use layerport_tracker::{Notice, Notifier};

const BAR_WIDTH: usize = 30;

/// Render a fixed-width progress bar for `percent` (clamped to 100).
pub fn progress_bar(percent: u8, width: usize) -> String {
    let percent = percent.min(100) as usize;
    let filled = width * percent / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// One line of progress output for the current view.
pub fn progress_line(view: &JobView) -> String {
    let marker = match view.icon {
        StatusIcon::InProgress => "…",
        StatusIcon::Success => "✓",
        StatusIcon::Failure => "✗",
    };
    format!(
        "{} {} {:>3}% {}",
        marker,
        progress_bar(view.fill_percent, BAR_WIDTH),
        view.fill_percent,
        view.status_line
    )
}

/// What `convert` does once the tracked job is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finish {
    /// The conversion failed; the notifier has already told the user.
    Failed,
    /// Completed and the result should be saved.
    Download,
    /// Completed, but the service sent no result to download.
    MissingResult,
    /// Completed and no download was requested.
    Done,
}

pub fn finish_for(view: &JobView, download: bool) -> Finish {
    match view.icon {
        StatusIcon::Success if !download => Finish::Done,
        StatusIcon::Success if view.show_download => Finish::Download,
        StatusIcon::Success => Finish::MissingResult,
        StatusIcon::Failure | StatusIcon::InProgress => Finish::Failed,
    }
}

/// Where a job's result is saved inside `out_dir`.
pub fn download_path(out_dir: &Path, job: &Job) -> PathBuf {
    out_dir.join(suggested_file_name(job))
}

/// Prints notices to the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::Info(message) | Notice::Success(message) => println!("{}", message),
            Notice::Error(message) => eprintln!("Error: {}", message),
            Notice::UpgradeRequired {
                message,
                pricing_url,
            } => {
                eprintln!("{}", message);
                if let Some(url) = pricing_url {
                    eprintln!("See plans: {}", url);
                }
            }
            Notice::ConnectionError(message) => eprintln!("Connection: {}", message),
        }
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use layerport_core::presentation::present_job;
    use layerport_core::{JobId, JobUpdate};

    #[test]
    fn progress_bar_bounds() {
        assert_eq!(progress_bar(0, 4), "[----]");
        assert_eq!(progress_bar(50, 4), "[##--]");
        assert_eq!(progress_bar(100, 4), "[####]");
        assert_eq!(progress_bar(250, 4), "[####]");
    }

    #[test]
    fn progress_line_shows_status_and_percent() {
        let job = Job::from(
            JobUpdate::new(JobId::from("abc"))
                .with_status("pdf_loaded")
                .with_progress(40),
        );
        let line = progress_line(&present_job(&job));
        assert!(line.starts_with('…'));
        assert!(line.contains(" 40%"));
        assert!(line.ends_with(&present_job(&job).status_line));
    }

    fn terminal(status: &str, download_url: Option<&str>) -> JobView {
        let mut job = Job::from(JobUpdate::new(JobId::from("abc")).with_status(status));
        job.download_url = download_url.map(str::to_string);
        present_job(&job)
    }

    #[test]
    fn failed_job_without_reason_is_a_failure() {
        let view = terminal("error", None);
        assert!(view.error_message.is_none());
        assert_eq!(finish_for(&view, true), Finish::Failed);
        assert_eq!(finish_for(&terminal("failed", None), false), Finish::Failed);
    }

    #[test]
    fn completed_job_finish() {
        let url = Some("/downloads/abc.psd");
        assert_eq!(finish_for(&terminal("completed", url), true), Finish::Download);
        assert_eq!(
            finish_for(&terminal("completed_with_warnings", url), true),
            Finish::Download
        );
        assert_eq!(finish_for(&terminal("completed", url), false), Finish::Done);
        assert_eq!(
            finish_for(&terminal("completed", None), true),
            Finish::MissingResult
        );
        assert_eq!(finish_for(&terminal("completed", None), false), Finish::Done);
    }

    #[test]
    fn download_path_uses_source_stem() {
        let mut job = Job::new(JobId::from("abc"));
        job.file_name = Some("brochure.pdf".to_string());
        assert_eq!(
            download_path(Path::new("out"), &job),
            PathBuf::from("out/brochure.psd")
        );

        job.file_name = None;
        assert_eq!(
            download_path(Path::new("out"), &job),
            PathBuf::from("out/converted.psd")
        );
    }
}
