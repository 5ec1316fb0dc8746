//! Upload gate: local checks a file must pass before it is sent anywhere.

use std::path::Path;

use crate::error::UploadRejection;

/// The only media type accepted for conversion.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Largest accepted upload, inclusive (50 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// A locally selected file, described the way a file picker reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    /// Declared media type (not sniffed from content).
    pub media_type: String,
    pub size: u64,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size,
        }
    }
}

/// Accept a candidate only if it is declared as PDF and is at most [`MAX_UPLOAD_BYTES`].
///
/// The type is checked first, so a large non-PDF file reports the type problem.
pub fn validate_candidate(file: &CandidateFile) -> Result<(), UploadRejection> {
    if file.media_type != PDF_MEDIA_TYPE {
        return Err(UploadRejection::WrongType {
            media_type: file.media_type.clone(),
        });
    }

    if file.size > MAX_UPLOAD_BYTES {
        return Err(UploadRejection::TooLarge {
            size: file.size,
            limit: MAX_UPLOAD_BYTES,
        });
    }

    Ok(())
}

/// Media type a file picker would declare for `path`, based on its extension.
pub fn declared_media_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("pdf") => PDF_MEDIA_TYPE,
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("txt") => "text/plain",
        Some("psd") => "image/vnd.adobe.photoshop",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_pdf_types() {
        for media_type in ["image/png", "text/plain", "application/octet-stream", ""] {
            let file = CandidateFile::new("design", media_type, 1024);
            assert!(matches!(
                validate_candidate(&file),
                Err(UploadRejection::WrongType { .. })
            ));
        }
    }

    #[test]
    fn media_type_must_match_exactly() {
        let file = CandidateFile::new("design.pdf", "application/pdf; charset=binary", 10);
        assert!(validate_candidate(&file).is_err());
        let file = CandidateFile::new("design.pdf", "APPLICATION/PDF", 10);
        assert!(validate_candidate(&file).is_err());
    }

    #[test]
    fn size_limit_is_inclusive() {
        let exact = CandidateFile::new("design.pdf", PDF_MEDIA_TYPE, 50 * 1024 * 1024);
        assert!(validate_candidate(&exact).is_ok());

        let over = CandidateFile::new("design.pdf", PDF_MEDIA_TYPE, 50 * 1024 * 1024 + 1);
        match validate_candidate(&over) {
            Err(UploadRejection::TooLarge { size, limit }) => {
                assert_eq!(size, 50 * 1024 * 1024 + 1);
                assert_eq!(limit, MAX_UPLOAD_BYTES);
            }
            other => panic!("expected TooLarge, got {:?}", other),
        }
    }

    #[test]
    fn wrong_type_reported_before_size() {
        let file = CandidateFile::new("huge.png", "image/png", MAX_UPLOAD_BYTES * 2);
        assert!(matches!(
            validate_candidate(&file),
            Err(UploadRejection::WrongType { .. })
        ));
    }

    #[test]
    fn empty_pdf_is_accepted() {
        let file = CandidateFile::new("empty.pdf", PDF_MEDIA_TYPE, 0);
        assert!(validate_candidate(&file).is_ok());
    }

    #[test]
    fn declared_type_from_extension() {
        assert_eq!(declared_media_type(Path::new("a/design.PDF")), PDF_MEDIA_TYPE);
        assert_eq!(declared_media_type(Path::new("logo.png")), "image/png");
        assert_eq!(declared_media_type(Path::new("notes.txt")), "text/plain");
        assert_eq!(
            declared_media_type(Path::new("no_extension")),
            "application/octet-stream"
        );
    }
}
