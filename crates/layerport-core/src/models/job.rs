use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Opaque job identifier assigned by the conversion service on upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for JobId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Coarse grouping of job statuses used for presentation and terminal checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFamily {
    InProgress,
    Completed,
    Failed,
}

/// Job status as reported by the conversion service.
///
/// The service owns the set of values and may add new ones at any time, so this
/// is an open enumeration: unknown values are kept verbatim and fall into the
/// [`StatusFamily::InProgress`] family.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobStatus(String);

impl JobStatus {
    pub const PENDING: &'static str = "pending";
    pub const QUEUED: &'static str = "queued";
    pub const STARTING: &'static str = "starting";
    pub const LOADING_ENGINE: &'static str = "loading_engine";
    pub const ENGINE_LOADED: &'static str = "engine_loaded";
    pub const PDF_LOADED: &'static str = "pdf_loaded";
    pub const PDF_PROCESSED: &'static str = "pdf_processed";
    pub const PSD_EXPORTED: &'static str = "psd_exported";
    pub const CONVERTING: &'static str = "converting";
    pub const EXPORTING: &'static str = "exporting";
    pub const COMPLETED: &'static str = "completed";
    pub const COMPLETED_WITH_WARNINGS: &'static str = "completed_with_warnings";
    pub const COMPLETED_FALLBACK: &'static str = "completed_fallback";
    pub const ERROR: &'static str = "error";
    pub const FAILED: &'static str = "failed";

    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn family(&self) -> StatusFamily {
        match self.0.as_str() {
            Self::ERROR | Self::FAILED => StatusFamily::Failed,
            s if s == Self::COMPLETED || s.starts_with("completed_") => StatusFamily::Completed,
            _ => StatusFamily::InProgress,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.family() == StatusFamily::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.family() == StatusFamily::Failed
    }

    pub fn is_terminal(&self) -> bool {
        self.family() != StatusFamily::InProgress
    }
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobStatus {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Latest known state of a conversion job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: JobId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    /// Percentage, 0-100 by contract; not clamped here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl Job {
    /// A job with only its identifier set.
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            status: None,
            progress: None,
            file_name: None,
            download_url: None,
            error: None,
            warning: None,
        }
    }

    /// Initial job state right after a successful upload.
    pub fn from_upload(response: &UploadResponse) -> Self {
        Self {
            file_name: response.file_name.clone(),
            ..Self::new(response.job_id.clone())
        }
    }

    pub fn family(&self) -> StatusFamily {
        self.status
            .as_ref()
            .map(JobStatus::family)
            .unwrap_or(StatusFamily::InProgress)
    }

    pub fn is_terminal(&self) -> bool {
        self.family() != StatusFamily::InProgress
    }

    /// Apply a partial update. Fields absent from the update keep their value.
    pub fn apply(&mut self, update: JobUpdate) {
        if let Some(status) = update.status {
            self.status = Some(status);
        }
        if let Some(progress) = update.progress {
            self.progress = Some(progress);
        }
        if let Some(file_name) = update.file_name {
            self.file_name = Some(file_name);
        }
        if let Some(download_url) = update.download_url {
            self.download_url = Some(download_url);
        }
        if let Some(error) = update.error {
            self.error = Some(error);
        }
        if let Some(warning) = update.warning {
            self.warning = Some(warning);
        }
    }
}

/// Partial job state carried by a `conversion-progress` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobUpdate {
    pub job_id: JobId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl JobUpdate {
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            status: None,
            progress: None,
            file_name: None,
            download_url: None,
            error: None,
            warning: None,
        }
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = Some(JobStatus::from(status));
        self
    }

    pub fn with_progress(mut self, progress: u32) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_download_url(mut self, url: &str) -> Self {
        self.download_url = Some(url.to_string());
        self
    }

    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

impl From<JobUpdate> for Job {
    fn from(update: JobUpdate) -> Self {
        let mut job = Job::new(update.job_id.clone());
        job.apply(update);
        job
    }
}

/// Response of `POST /api/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub job_id: JobId,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /api/convert`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    pub job_id: JobId,
}
