use crate::error::{LookError, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::fmt;

const SCHEME: &str = "data:";
const SEPARATOR: &str = ";base64,";

/// A parsed `data:<mime>;base64,<payload>` URL.
///
/// The payload stays base64-encoded until [`DataUrl::decode`] is called;
/// parsing never touches the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    mime_type: String,
    data: String,
}

impl DataUrl {
    /// Build a data URL from already-known parts. No validation; intended
    /// for encoder output and other known-good values.
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Split a data URL into MIME type and base64 payload.
    ///
    /// The split point is the rightmost `;base64,` that leaves both a
    /// non-empty MIME section and a non-empty payload, so a MIME section
    /// containing the separator itself still parses.
    pub fn parse(input: &str) -> Result<Self> {
        let rest = input
            .strip_prefix(SCHEME)
            .ok_or_else(|| LookError::InvalidDataUrl("missing \"data:\" scheme".into()))?;

        let mut candidate = rest.rfind(SEPARATOR);
        while let Some(at) = candidate {
            let mime_type = &rest[..at];
            let payload = &rest[at + SEPARATOR.len()..];
            if !mime_type.is_empty() && !payload.is_empty() {
                return Ok(Self {
                    mime_type: mime_type.to_string(),
                    data: payload.to_string(),
                });
            }
            candidate = rest[..at].rfind(SEPARATOR);
        }

        Err(LookError::InvalidDataUrl(
            "expected data:<mime>;base64,<payload>".into(),
        ))
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The still-encoded base64 payload.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Decode the payload (standard base64 alphabet).
    pub fn decode(&self) -> std::result::Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(&self.data)
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}{}{SEPARATOR}{}", self.mime_type, self.data)
    }
}
