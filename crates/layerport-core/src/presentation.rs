//! Result presenter
//!
//! Pure mapping from the tracked job to what the user sees: icon, status line,
//! progress fill and which follow-up actions are offered.

use serde::Serialize;

use crate::models::{Job, JobStatus, StatusFamily};

/// Fallback line for status values this client does not know about.
pub const GENERIC_STATUS_LINE: &str = "Conversion in progress...";

/// Icon category for the progress panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusIcon {
    InProgress,
    Success,
    Failure,
}

impl From<StatusFamily> for StatusIcon {
    fn from(family: StatusFamily) -> Self {
        match family {
            StatusFamily::InProgress => StatusIcon::InProgress,
            StatusFamily::Completed => StatusIcon::Success,
            StatusFamily::Failed => StatusIcon::Failure,
        }
    }
}

/// Derived display state of the active job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobView {
    pub icon: StatusIcon,
    pub status_line: String,
    pub fill_percent: u8,
    pub file_name: Option<String>,
    pub show_download: bool,
    pub show_retry: bool,
    pub error_message: Option<String>,
    pub warning: Option<String>,
}

/// Fixed text for a status value; unknown values get [`GENERIC_STATUS_LINE`].
pub fn status_line(status: &JobStatus) -> &'static str {
    match status.as_str() {
        JobStatus::PENDING | JobStatus::QUEUED => "Queued for conversion...",
        JobStatus::STARTING => "Initializing conversion...",
        JobStatus::LOADING_ENGINE => "Loading conversion engine...",
        JobStatus::ENGINE_LOADED => "Conversion engine loaded",
        JobStatus::PDF_LOADED => "PDF file loaded",
        JobStatus::PDF_PROCESSED => "Processing PDF layers...",
        JobStatus::CONVERTING => "Converting layers...",
        JobStatus::PSD_EXPORTED | JobStatus::EXPORTING => "Exporting to PSD...",
        JobStatus::COMPLETED => "Conversion completed!",
        JobStatus::COMPLETED_WITH_WARNINGS => "Conversion completed with warnings",
        JobStatus::COMPLETED_FALLBACK => "Conversion completed using fallback mode",
        JobStatus::ERROR | JobStatus::FAILED => "Conversion failed",
        other if other.starts_with("completed_") => "Conversion completed!",
        _ => GENERIC_STATUS_LINE,
    }
}

/// Progress bar fill, clamped to 0-100; absent progress is 0.
pub fn fill_percent(job: &Job) -> u8 {
    job.progress.map(|p| p.min(100) as u8).unwrap_or(0)
}

/// Whether the download action is offered. Requires both a completed-family
/// status and a download URL.
pub fn can_download(job: &Job) -> bool {
    job.download_url.is_some() && job.family() == StatusFamily::Completed
}

/// Whether the "convert another file" / "try again" action is offered.
pub fn can_retry(job: &Job) -> bool {
    job.is_terminal()
}

pub fn present_job(job: &Job) -> JobView {
    let family = job.family();
    let line = match &job.status {
        Some(status) => status_line(status),
        None => "Preparing conversion...",
    };

    JobView {
        icon: family.into(),
        status_line: line.to_string(),
        fill_percent: fill_percent(job),
        file_name: job.file_name.clone(),
        show_download: can_download(job),
        show_retry: can_retry(job),
        error_message: match family {
            StatusFamily::Failed => job.error.clone(),
            _ => None,
        },
        warning: match family {
            StatusFamily::Completed => job.warning.clone(),
            _ => None,
        },
    }
}

/// Display state for the tracker; `None` when no job is active.
pub fn present(job: Option<&Job>) -> Option<JobView> {
    job.map(present_job)
}

/// File name to save the converted result under.
pub fn suggested_file_name(job: &Job) -> String {
    let stem = job
        .file_name
        .as_deref()
        .and_then(|name| std::path::Path::new(name).file_stem())
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty());

    match stem {
        Some(stem) => format!("{}.psd", stem),
        None => "converted.psd".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobId;

    fn job_with(status: Option<&str>, progress: Option<u32>, url: Option<&str>) -> Job {
        let mut job = Job::new(JobId::from("abc"));
        job.status = status.map(JobStatus::from);
        job.progress = progress;
        job.download_url = url.map(str::to_string);
        job
    }

    #[test]
    fn no_job_has_no_view() {
        assert!(present(None).is_none());
    }

    #[test]
    fn unknown_status_uses_generic_line() {
        let view = present_job(&job_with(Some("rasterizing_fonts"), Some(10), None));
        assert_eq!(view.status_line, GENERIC_STATUS_LINE);
        assert_eq!(view.icon, StatusIcon::InProgress);
        assert!(!view.show_retry);
    }

    #[test]
    fn known_status_lines() {
        assert_eq!(status_line(&JobStatus::from("starting")), "Initializing conversion...");
        assert_eq!(status_line(&JobStatus::from("pdf_processed")), "Processing PDF layers...");
        assert_eq!(status_line(&JobStatus::from("completed")), "Conversion completed!");
        assert_eq!(status_line(&JobStatus::from("error")), "Conversion failed");
    }

    #[test]
    fn fill_percent_defaults_and_clamps() {
        assert_eq!(fill_percent(&job_with(None, None, None)), 0);
        assert_eq!(fill_percent(&job_with(None, Some(65), None)), 65);
        assert_eq!(fill_percent(&job_with(None, Some(250), None)), 100);
    }

    #[test]
    fn download_only_for_completed_with_url() {
        assert!(can_download(&job_with(Some("completed"), Some(100), Some("/d/x.psd"))));
        assert!(can_download(&job_with(
            Some("completed_with_warnings"),
            Some(100),
            Some("/d/x.psd")
        )));
        assert!(!can_download(&job_with(Some("completed"), Some(100), None)));
        assert!(!can_download(&job_with(Some("converting"), Some(90), Some("/d/x.psd"))));
        assert!(!can_download(&job_with(Some("exporting"), Some(99), Some("/d/x.psd"))));
        assert!(!can_download(&job_with(None, None, Some("/d/x.psd"))));
        assert!(!can_download(&job_with(Some("error"), None, Some("/d/x.psd"))));
    }

    #[test]
    fn retry_offered_for_terminal_states() {
        assert!(can_retry(&job_with(Some("error"), None, None)));
        assert!(can_retry(&job_with(Some("completed"), Some(100), None)));
        assert!(!can_retry(&job_with(Some("pdf_loaded"), Some(30), None)));
        assert!(!can_retry(&job_with(None, None, None)));
    }

    #[test]
    fn error_and_warning_only_in_matching_family() {
        let mut failed = job_with(Some("error"), Some(20), None);
        failed.error = Some("Corrupt PDF".to_string());
        failed.warning = Some("ignored".to_string());
        let view = present_job(&failed);
        assert_eq!(view.icon, StatusIcon::Failure);
        assert_eq!(view.error_message.as_deref(), Some("Corrupt PDF"));
        assert!(view.warning.is_none());

        let mut done = job_with(Some("completed_fallback"), Some(100), Some("/d/x.psd"));
        done.warning = Some("Some text was rasterized".to_string());
        let view = present_job(&done);
        assert_eq!(view.icon, StatusIcon::Success);
        assert_eq!(view.warning.as_deref(), Some("Some text was rasterized"));
        assert!(view.show_download);
    }

    #[test]
    fn suggested_name_from_source_pdf() {
        let mut job = job_with(None, None, None);
        assert_eq!(suggested_file_name(&job), "converted.psd");
        job.file_name = Some("design.pdf".to_string());
        assert_eq!(suggested_file_name(&job), "design.psd");
    }
}
