//! Look-metric payloads for the analyzer.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Five photographic scores in `[0, 100]` produced by the remote model.
///
/// All five fields must be present in the response body; the score values
/// themselves are taken as-is and not range-checked locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookMetrics {
    pub contrast: u8,
    pub saturation: u8,
    pub warmth: u8,
    pub uniformity: u8,
    pub exposure: u8,
}

/// Instruction sent alongside the image being scored.
pub(crate) const ANALYZE_PROMPT: &str =
    "Analyze contrast, saturation, warmth, uniformity, exposure (0-100) as JSON.";

/// Response schema the model is constrained to: an object with the five
/// scores required as integers.
pub(crate) fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "contrast":   { "type": "INTEGER" },
            "saturation": { "type": "INTEGER" },
            "warmth":     { "type": "INTEGER" },
            "uniformity": { "type": "INTEGER" },
            "exposure":   { "type": "INTEGER" },
        },
        "required": ["contrast", "saturation", "warmth", "uniformity", "exposure"],
    })
}
