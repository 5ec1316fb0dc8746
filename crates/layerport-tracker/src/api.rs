//! Conversion service seam used by the tracker.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use layerport_api_client::ApiClient;
use layerport_core::validation::declared_media_type;
use layerport_core::{CandidateFile, JobId, SubmissionError, UploadResponse};

/// Requests the tracker needs from the conversion service.
#[async_trait]
pub trait ConversionApi: Send + Sync {
    async fn upload(&self, file_name: &str, data: Bytes)
        -> Result<UploadResponse, SubmissionError>;

    async fn start_conversion(&self, job_id: &JobId) -> Result<(), SubmissionError>;
}

#[async_trait]
impl ConversionApi for ApiClient {
    async fn upload(
        &self,
        file_name: &str,
        data: Bytes,
    ) -> Result<UploadResponse, SubmissionError> {
        self.upload_pdf(file_name, data).await
    }

    async fn start_conversion(&self, job_id: &JobId) -> Result<(), SubmissionError> {
        ApiClient::start_conversion(self, job_id).await
    }
}

#[derive(Debug, Clone)]
enum Source {
    Memory(Bytes),
    Disk(PathBuf),
}

/// A file selected for conversion. Contents from disk are only read after the
/// upload gate has accepted the file.
#[derive(Debug, Clone)]
pub struct PdfFile {
    pub name: String,
    pub media_type: String,
    pub size: u64,
    source: Source,
}

impl PdfFile {
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size: data.len() as u64,
            source: Source::Memory(data),
        }
    }

    /// Describe a file on disk; the media type is declared from its extension.
    pub async fn from_path(path: &Path) -> Result<Self, SubmissionError> {
        let metadata = tokio::fs::metadata(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document.pdf")
            .to_string();

        Ok(Self {
            name,
            media_type: declared_media_type(path).to_string(),
            size: metadata.len(),
            source: Source::Disk(path.to_path_buf()),
        })
    }

    pub fn candidate(&self) -> CandidateFile {
        CandidateFile::new(self.name.clone(), self.media_type.clone(), self.size)
    }

    pub async fn read(&self) -> Result<Bytes, SubmissionError> {
        match &self.source {
            Source::Memory(data) => Ok(data.clone()),
            Source::Disk(path) => Ok(Bytes::from(tokio::fs::read(path).await?)),
        }
    }
}
