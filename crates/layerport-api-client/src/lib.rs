//! HTTP client for the Layerport conversion service.
//!
//! Provides a minimal client with optional Bearer auth, generic GET/POST
//! helpers that classify failures into [`SubmissionError`], and domain methods
//! (upload, start conversion, job status, account, download).

pub mod api;
pub mod classify;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use layerport_core::{ClientConfig, SubmissionError};

pub use classify::{classify_failure, classify_transport, is_entitlement_phrase};

/// HTTP client for the conversion service.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Send a request and turn transport failures and non-2xx statuses into
    /// [`SubmissionError`]s.
    async fn execute(&self, request: RequestBuilder) -> Result<Response, SubmissionError> {
        let request = self.apply_auth(request);

        let response = request.send().await.map_err(|e| classify_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = classify_failure(status.as_u16(), &body);
            tracing::warn!(status = status.as_u16(), error = %err, "API request failed");
            return Err(err);
        }

        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, SubmissionError> {
        response.json().await.map_err(|e| {
            if e.is_decode() {
                SubmissionError::InvalidResponse(format!("Failed to parse response as JSON: {}", e))
            } else {
                classify_transport(&e)
            }
        })
    }

    /// GET request. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, SubmissionError> {
        let url = self.build_url(path);
        let response = self.execute(self.client.get(&url)).await?;
        Self::read_json(response).await
    }

    /// POST JSON body; any 2xx is success and the response body is ignored.
    pub async fn post_json_no_content<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), SubmissionError> {
        let url = self.build_url(path);
        self.execute(self.client.post(&url).json(body)).await?;
        Ok(())
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, SubmissionError> {
        let url = self.build_url(path);
        let response = self.execute(self.client.post(&url).multipart(form)).await?;
        Self::read_json(response).await
    }
}

// Re-export domain response types for convenience.
pub use layerport_core::models::{AccountInfo, Job, JobId, UploadResponse};
