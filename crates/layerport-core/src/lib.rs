//! Layerport Core Library
//!
//! This crate provides the conversion job model, the upload gate, the result
//! presenter, error types and configuration shared by the API client, the
//! tracker and the CLI.

pub mod config;
pub mod error;
pub mod models;
pub mod presentation;
pub mod validation;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{
    ChannelError, ErrorMetadata, LogLevel, SubmissionError, TrackerError, UploadRejection,
};
pub use models::{AccountInfo, Job, JobId, JobStatus, JobUpdate, StatusFamily, UploadResponse};
pub use presentation::{present, JobView, StatusIcon};
pub use validation::{validate_candidate, CandidateFile, MAX_UPLOAD_BYTES, PDF_MEDIA_TYPE};
