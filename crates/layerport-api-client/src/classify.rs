//! Failure classification for service requests.
//!
//! The service signals an exhausted plan allowance either with structured
//! fields (`conversionsLeft: 0`, `upgradeRequired: true`) or only through the
//! wording of its `error` / `message` field, so both are inspected.

use serde_json::Value;

use layerport_core::SubmissionError;

/// Lowercase phrases that mark an entitlement (plan allowance) failure.
const ENTITLEMENT_PHRASES: &[&str] = &[
    "0 conversions left",
    "no conversions left",
    "conversions left: 0",
    "0 conversions remaining",
    "no conversions remaining",
    "out of conversions",
    "conversion limit",
    "insufficient plan",
    "quota exceeded",
    "upgrade your plan",
    "upgrade required",
    "please upgrade",
];

pub fn is_entitlement_phrase(text: &str) -> bool {
    let text = text.to_lowercase();
    ENTITLEMENT_PHRASES.iter().any(|p| text.contains(p))
}

/// Classify a request that produced no usable response.
pub fn classify_transport(err: &reqwest::Error) -> SubmissionError {
    if err.is_decode() {
        return SubmissionError::InvalidResponse(err.to_string());
    }

    let detail = if err.is_timeout() {
        format!("request timed out: {}", err)
    } else {
        err.to_string()
    };
    SubmissionError::Connectivity { detail }
}

/// Classify a non-2xx response from its status and body.
pub fn classify_failure(status: u16, body: &str) -> SubmissionError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let error = field("error");
    let message = field("message");

    let upgrade_flag = parsed
        .as_ref()
        .and_then(|v| v.get("upgradeRequired"))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let none_left = parsed
        .as_ref()
        .and_then(|v| v.get("conversionsLeft"))
        .and_then(Value::as_i64)
        .map(|n| n <= 0)
        .unwrap_or(false);
    let phrase = [error.as_deref(), message.as_deref()]
        .into_iter()
        .flatten()
        .any(is_entitlement_phrase);

    if upgrade_flag || none_left || phrase {
        return SubmissionError::Entitlement {
            message: error
                .or(message)
                .unwrap_or_else(|| "Upgrade required".to_string()),
        };
    }

    if status == 401 {
        return SubmissionError::Unauthorized;
    }

    let plain_text = if parsed.is_none() {
        let trimmed = body.trim();
        (!trimmed.is_empty() && !trimmed.starts_with('<')).then(|| trimmed.to_string())
    } else {
        None
    };

    SubmissionError::Http {
        status,
        message: message.or(error).or(plain_text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_field_phrase_is_entitlement() {
        let err = classify_failure(403, r#"{"error":"0 conversions left"}"#);
        assert_eq!(
            err,
            SubmissionError::Entitlement {
                message: "0 conversions left".to_string()
            }
        );
    }

    #[test]
    fn message_field_phrase_is_entitlement() {
        let err = classify_failure(
            402,
            r#"{"message":"Please upgrade your plan to continue converting"}"#,
        );
        assert!(err.is_entitlement());
    }

    #[test]
    fn structured_fields_are_entitlement() {
        assert!(classify_failure(403, r#"{"conversionsLeft":0}"#).is_entitlement());
        assert!(classify_failure(403, r#"{"upgradeRequired":true,"error":"nope"}"#).is_entitlement());
        assert!(!classify_failure(400, r#"{"conversionsLeft":3,"error":"bad pdf"}"#).is_entitlement());
    }

    #[test]
    fn unauthorized_maps_to_session_expiry() {
        assert_eq!(
            classify_failure(401, r#"{"error":"Invalid token"}"#),
            SubmissionError::Unauthorized
        );
    }

    #[test]
    fn other_http_failure_keeps_server_message() {
        assert_eq!(
            classify_failure(422, r#"{"error":"x","message":"PDF is password protected"}"#),
            SubmissionError::Http {
                status: 422,
                message: Some("PDF is password protected".to_string())
            }
        );
        assert_eq!(
            classify_failure(500, r#"{"error":"Internal server error"}"#),
            SubmissionError::Http {
                status: 500,
                message: Some("Internal server error".to_string())
            }
        );
    }

    #[test]
    fn http_failure_without_message() {
        assert_eq!(
            classify_failure(502, ""),
            SubmissionError::Http {
                status: 502,
                message: None
            }
        );
        assert_eq!(
            classify_failure(502, "<html>Bad Gateway</html>"),
            SubmissionError::Http {
                status: 502,
                message: None
            }
        );
        assert_eq!(
            classify_failure(503, "Service Unavailable"),
            SubmissionError::Http {
                status: 503,
                message: Some("Service Unavailable".to_string())
            }
        );
    }

    #[test]
    fn phrase_matching_ignores_case() {
        assert!(is_entitlement_phrase("You have NO CONVERSIONS LEFT"));
        assert!(!is_entitlement_phrase("Conversion failed"));
    }

    #[test]
    fn maintenance_wording_is_not_entitlement() {
        assert!(!is_entitlement_phrase("Server upgraded, try again"));
        assert!(!is_entitlement_phrase("Converter upgrade in progress"));
        assert!(is_entitlement_phrase("Upgrade required to convert more files"));

        let err = classify_failure(503, r#"{"error":"Server upgraded, try again"}"#);
        assert_eq!(
            err,
            SubmissionError::Http {
                status: 503,
                message: Some("Server upgraded, try again".to_string())
            }
        );
    }
}
