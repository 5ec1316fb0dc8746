//! Validation modules

pub mod upload;

pub use upload::{
    declared_media_type, validate_candidate, CandidateFile, MAX_UPLOAD_BYTES, PDF_MEDIA_TYPE,
};
