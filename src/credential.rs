use crate::error::{LookError, Result};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Caller-supplied Gemini API key.
///
/// There is no process-wide credential slot: every call takes an `ApiKey`,
/// and a constructed key is guaranteed non-empty, so missing-credential
/// failures happen before any request is built. The buffer is wiped on drop
/// and never shown by `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key value, trimming surrounding whitespace.
    ///
    /// Empty and whitespace-only input fail with [`LookError::ApiKeyMissing`].
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let mut value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            value.zeroize();
            return Err(LookError::ApiKeyMissing);
        }

        let key = Self(trimmed.to_string());
        value.zeroize();
        Ok(key)
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(ApiKey::new(""), Err(LookError::ApiKeyMissing)));
    }

    #[test]
    fn whitespace_only_key_is_rejected() {
        assert!(matches!(ApiKey::new("   \n\t"), Err(LookError::ApiKeyMissing)));
    }

    #[test]
    fn key_is_trimmed() {
        let key = ApiKey::new("  AIzaExample123  ").unwrap();
        assert_eq!(key.expose(), "AIzaExample123");
    }

    #[test]
    fn debug_output_is_redacted() {
        let key = ApiKey::new("AIzaExample123").unwrap();
        let debug = format!("{key:?}");
        assert!(!debug.contains("AIzaExample123"));
        assert!(debug.contains("[REDACTED]"));
    }
}
