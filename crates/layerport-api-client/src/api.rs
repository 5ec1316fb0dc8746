//! Domain methods for the conversion service.

use std::path::Path;

use bytes::Bytes;
use futures::StreamExt;
use reqwest::Url;
use tokio::io::AsyncWriteExt;

use layerport_core::models::{AccountInfo, ConvertRequest, Job, JobId, UploadResponse};
use layerport_core::{SubmissionError, PDF_MEDIA_TYPE};

use crate::{classify_transport, ApiClient};

impl ApiClient {
    /// Upload a PDF as the multipart field `pdf`.
    #[tracing::instrument(skip(self, data), fields(size = data.len()))]
    pub async fn upload_pdf(
        &self,
        file_name: &str,
        data: Bytes,
    ) -> Result<UploadResponse, SubmissionError> {
        let length = data.len() as u64;
        let part = reqwest::multipart::Part::stream_with_length(data, length)
            .file_name(file_name.to_string())
            .mime_str(PDF_MEDIA_TYPE)
            .map_err(|e| SubmissionError::InvalidResponse(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("pdf", part);

        let response: UploadResponse = self.post_multipart("/api/upload", form).await?;
        tracing::info!(job_id = %response.job_id, "File uploaded");
        Ok(response)
    }

    /// Ask the service to start converting an uploaded file.
    #[tracing::instrument(skip(self))]
    pub async fn start_conversion(&self, job_id: &JobId) -> Result<(), SubmissionError> {
        let body = ConvertRequest {
            job_id: job_id.clone(),
        };
        self.post_json_no_content("/api/convert", &body).await?;
        tracing::info!(job_id = %job_id, "Conversion started");
        Ok(())
    }

    /// Current state of a job.
    pub async fn get_job_status(&self, job_id: &JobId) -> Result<Job, SubmissionError> {
        self.get(&format!(
            "/api/job/{}",
            urlencoding::encode(job_id.as_str())
        ))
        .await
    }

    /// Plan and remaining conversion allowance of the authenticated user.
    pub async fn get_account_info(&self) -> Result<AccountInfo, SubmissionError> {
        self.get("/api/user/account").await
    }

    /// Absolute URLs are kept; relative ones are resolved against the backend origin.
    pub fn resolve_download_url(&self, download_url: &str) -> Result<Url, SubmissionError> {
        if let Ok(url) = Url::parse(download_url) {
            return Ok(url);
        }

        let base = Url::parse(&format!("{}/", self.base_url()))
            .map_err(|e| SubmissionError::InvalidResponse(format!("Invalid base URL: {}", e)))?;
        base.join(download_url).map_err(|e| {
            SubmissionError::InvalidResponse(format!(
                "Invalid download URL {}: {}",
                download_url, e
            ))
        })
    }

    /// Download a conversion result to `dest`. Returns the number of bytes written.
    #[tracing::instrument(skip(self, dest), fields(dest = %dest.display()))]
    pub async fn download(&self, download_url: &str, dest: &Path) -> Result<u64, SubmissionError> {
        let url = self.resolve_download_url(download_url)?;
        let response = self.execute(self.client.get(url)).await?;

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| classify_transport(&e))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::info!(bytes = written, "Download complete");
        Ok(written)
    }
}
