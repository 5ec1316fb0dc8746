//! Error types module
//!
//! Every failure in the conversion flow ends at the tracker boundary as a
//! user-visible message. The [`ErrorMetadata`] trait lets each error describe
//! how it is presented and logged without the caller matching on variants.

use thiserror::Error;

/// Generic message for failed submissions without a server-provided reason.
pub const GENERIC_SUBMISSION_MESSAGE: &str = "Failed to upload file. Please try again.";

/// Message shown when the plan allowance is exhausted.
pub const ENTITLEMENT_MESSAGE: &str =
    "You have no conversions left on your current plan. Upgrade to keep converting.";

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like connectivity
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error is surfaced to the user.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "WRONG_FILE_TYPE")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same action can succeed without user changes
    fn is_recoverable(&self) -> bool;

    /// Message shown to the user
    fn user_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Local rejection by the upload gate. Never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("Unsupported file type: {media_type}")]
    WrongType { media_type: String },

    #[error("File too large: {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
}

impl ErrorMetadata for UploadRejection {
    fn error_code(&self) -> &'static str {
        match self {
            UploadRejection::WrongType { .. } => "WRONG_FILE_TYPE",
            UploadRejection::TooLarge { .. } => "FILE_TOO_LARGE",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }

    fn user_message(&self) -> String {
        match self {
            UploadRejection::WrongType { .. } => "Please upload a PDF file".to_string(),
            UploadRejection::TooLarge { .. } => "File size must be less than 50MB".to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Debug
    }
}

/// Failure of a request to the conversion service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// The plan has no conversions left, or the feature requires an upgrade.
    #[error("Upgrade required: {message}")]
    Entitlement { message: String },

    /// No response was received (connect failure, timeout, reset).
    #[error("Connectivity error: {detail}")]
    Connectivity { detail: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Request failed with status {status}: {}", message.as_deref().unwrap_or("no message"))]
    Http { status: u16, message: Option<String> },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl SubmissionError {
    pub fn is_entitlement(&self) -> bool {
        matches!(self, SubmissionError::Entitlement { .. })
    }
}

impl From<std::io::Error> for SubmissionError {
    fn from(err: std::io::Error) -> Self {
        SubmissionError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SubmissionError {
    fn from(err: serde_json::Error) -> Self {
        SubmissionError::InvalidResponse(format!("JSON parsing error: {}", err))
    }
}

impl ErrorMetadata for SubmissionError {
    fn error_code(&self) -> &'static str {
        match self {
            SubmissionError::Entitlement { .. } => "UPGRADE_REQUIRED",
            SubmissionError::Connectivity { .. } => "CONNECTIVITY_ERROR",
            SubmissionError::Unauthorized => "UNAUTHORIZED",
            SubmissionError::Http { .. } => "HTTP_ERROR",
            SubmissionError::InvalidResponse(_) => "INVALID_RESPONSE",
            SubmissionError::Io(_) => "IO_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SubmissionError::Connectivity { .. } | SubmissionError::Http { .. }
        )
    }

    fn user_message(&self) -> String {
        match self {
            SubmissionError::Entitlement { .. } => ENTITLEMENT_MESSAGE.to_string(),
            SubmissionError::Connectivity { .. } => {
                "Could not reach the conversion service. Check your connection and try again."
                    .to_string()
            }
            SubmissionError::Unauthorized => {
                "Your session has expired. Please log in again.".to_string()
            }
            SubmissionError::Http {
                message: Some(message),
                ..
            } => message.clone(),
            SubmissionError::Http { message: None, .. } | SubmissionError::InvalidResponse(_) => {
                GENERIC_SUBMISSION_MESSAGE.to_string()
            }
            SubmissionError::Io(detail) => format!("Could not save the file: {}", detail),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            SubmissionError::Entitlement { .. } | SubmissionError::Unauthorized => LogLevel::Debug,
            SubmissionError::Connectivity { .. } => LogLevel::Warn,
            SubmissionError::Http { status, .. } if *status < 500 => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

/// Push channel failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("Failed to connect to push channel: {0}")]
    Connect(String),

    #[error("Push channel closed")]
    Closed,

    #[error("Push channel protocol error: {0}")]
    Protocol(String),
}

impl ErrorMetadata for ChannelError {
    fn error_code(&self) -> &'static str {
        match self {
            ChannelError::Connect(_) => "CHANNEL_CONNECT_ERROR",
            ChannelError::Closed => "CHANNEL_CLOSED",
            ChannelError::Protocol(_) => "CHANNEL_PROTOCOL_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        !matches!(self, ChannelError::Closed)
    }

    fn user_message(&self) -> String {
        "Live progress updates are unavailable right now.".to_string()
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Warn
    }
}

/// Errors returned by the conversion tracker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error("A conversion is already in progress")]
    Busy,

    #[error(transparent)]
    Rejected(#[from] UploadRejection),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error(transparent)]
    Channel(#[from] ChannelError),
}

impl ErrorMetadata for TrackerError {
    fn error_code(&self) -> &'static str {
        match self {
            TrackerError::Busy => "CONVERSION_IN_PROGRESS",
            TrackerError::Rejected(e) => e.error_code(),
            TrackerError::Submission(e) => e.error_code(),
            TrackerError::Channel(e) => e.error_code(),
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            TrackerError::Busy => true,
            TrackerError::Rejected(e) => e.is_recoverable(),
            TrackerError::Submission(e) => e.is_recoverable(),
            TrackerError::Channel(e) => e.is_recoverable(),
        }
    }

    fn user_message(&self) -> String {
        match self {
            TrackerError::Busy => {
                "A conversion is already running. Wait for it to finish.".to_string()
            }
            TrackerError::Rejected(e) => e.user_message(),
            TrackerError::Submission(e) => e.user_message(),
            TrackerError::Channel(e) => e.user_message(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            TrackerError::Busy => LogLevel::Debug,
            TrackerError::Rejected(e) => e.log_level(),
            TrackerError::Submission(e) => e.log_level(),
            TrackerError::Channel(e) => e.log_level(),
        }
    }
}
