use std::time::Duration;
use thiserror::Error;

// ─── Crate error hierarchy ───────────────────────────────────────────────────

/// Structured error hierarchy for `looklab`.
///
/// Library callers can match on these to decide recovery strategy; the binary
/// wraps them in `anyhow::Result` for ad-hoc context chains. The sentinel
/// display strings (`API_KEY_MISSING`, `QUOTA_EXCEEDED`, `KEY_INVALID`) are
/// stable and safe to surface verbatim.
#[derive(Debug, Error)]
pub enum LookError {
    /// The supplied credential was empty or whitespace-only.
    #[error("API_KEY_MISSING")]
    ApiKeyMissing,

    /// Input did not match `data:<mime>;base64,<payload>`.
    #[error("Invalid Data URL format: {0}")]
    InvalidDataUrl(String),

    /// The remote rejected the call for rate/quota reasons.
    #[error("QUOTA_EXCEEDED")]
    QuotaExceeded,

    /// The remote reported the model (and with it the key or project) as
    /// unknown. Style-transfer calls only; see `service`.
    #[error("KEY_INVALID")]
    KeyInvalid,

    /// A style-transfer response carried no inline image part.
    #[error("No image generated")]
    NoImageGenerated,

    /// The metrics body was empty, malformed, or missing a required score.
    #[error("invalid metrics payload: {0}")]
    InvalidMetrics(#[source] serde_json::Error),

    // ── Compositor ──────────────────────────────────────────────────────
    #[error("compose: {0}")]
    Compose(#[from] ComposeError),

    // ── Remote API ──────────────────────────────────────────────────────
    /// Non-2xx response, or an error object embedded in a 2xx body. The
    /// message has already been scrubbed and truncated.
    #[error("Gemini API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
}

// ─── Compositor errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("input is not a data URL: {0}")]
    Input(String),

    #[error("base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("image: {0}")]
    Image(#[from] image::ImageError),

    #[error("blend timed out after {0:?}")]
    Timeout(Duration),

    #[error("blend task canceled")]
    Canceled,
}

// ─── Convenience re-exports ──────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, LookError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_errors_display_stable_strings() {
        assert_eq!(LookError::ApiKeyMissing.to_string(), "API_KEY_MISSING");
        assert_eq!(LookError::QuotaExceeded.to_string(), "QUOTA_EXCEEDED");
        assert_eq!(LookError::KeyInvalid.to_string(), "KEY_INVALID");
        assert_eq!(LookError::NoImageGenerated.to_string(), "No image generated");
    }

    #[test]
    fn api_error_displays_status_and_message() {
        let err = LookError::Api {
            status: 429,
            message: "rate limited".into(),
        };
        let text = err.to_string();
        assert!(text.contains("429"));
        assert!(text.contains("rate limited"));
    }

    #[test]
    fn invalid_metrics_keeps_serde_source() {
        let source = serde_json::from_str::<u8>("not json").unwrap_err();
        let err = LookError::InvalidMetrics(source);
        assert!(err.to_string().contains("invalid metrics payload"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn compose_timeout_displays_duration() {
        let err = LookError::Compose(ComposeError::Timeout(Duration::from_secs(30)));
        assert!(err.to_string().contains("30s"));
    }

    #[test]
    fn invalid_data_url_displays_reason() {
        let err = LookError::InvalidDataUrl("missing \";base64,\" separator".into());
        assert!(err.to_string().contains("Invalid Data URL format"));
        assert!(err.to_string().contains("separator"));
    }
}
