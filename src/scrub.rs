use std::borrow::Cow;

const MAX_API_ERROR_CHARS: usize = 200;

const PREFIX_PATTERNS: [&str; 3] = ["AIza", "ya29.", "sk-"];

const MARKER_PATTERNS: [&str; 9] = [
    "key=",
    "api_key=",
    "access_token=",
    "x-goog-api-key: ",
    "X-Goog-Api-Key: ",
    "Authorization: Bearer ",
    "\"key\":\"",
    "\"api_key\":\"",
    "\"access_token\":\"",
];

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+' | '/' | '=')
}

fn redact_after(scrubbed: &mut String, marker: &str) {
    let mut from = 0;
    while let Some(rel) = scrubbed[from..].find(marker) {
        let start = from + rel;
        let token_start = start + marker.len();
        let token_len = scrubbed[token_start..]
            .find(|c: char| !is_token_char(c))
            .unwrap_or(scrubbed.len() - token_start);

        // Bare marker with no token value after it.
        if token_len == 0 {
            from = token_start;
            continue;
        }

        scrubbed.replace_range(start..token_start + token_len, "[REDACTED]");
        from = start + "[REDACTED]".len();
    }
}

/// Redact key-like tokens from remote error text before it reaches logs or
/// callers.
///
/// Covers Google credential prefixes (`AIza`, `ya29.`), generic `sk-`
/// tokens, and header/query/JSON credential markers.
pub fn scrub_secret_patterns(input: &str) -> Cow<'_, str> {
    let dirty = PREFIX_PATTERNS
        .iter()
        .chain(MARKER_PATTERNS.iter())
        .any(|pattern| input.contains(pattern));
    if !dirty {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for pattern in PREFIX_PATTERNS.iter().chain(MARKER_PATTERNS.iter()) {
        redact_after(&mut scrubbed, pattern);
    }

    Cow::Owned(scrubbed)
}

/// Scrub and length-bound a remote error body.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);

    if scrubbed.chars().count() <= MAX_API_ERROR_CHARS {
        return scrubbed.into_owned();
    }

    let scrubbed = scrubbed.as_ref();
    let mut end = MAX_API_ERROR_CHARS;
    while end > 0 && !scrubbed.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}...", &scrubbed[..end])
}
