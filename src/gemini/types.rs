use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub(crate) struct GenerateContentRequest {
    pub(crate) contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub(crate) generation_config: Option<GenerationConfig>,
    #[serde(rename = "safetySettings", skip_serializing_if = "Option::is_none")]
    pub(crate) safety_settings: Option<Vec<SafetySetting>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) role: Option<String>,
    pub(crate) parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    pub(crate) inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct InlineData {
    #[serde(rename = "mimeType")]
    pub(crate) mime_type: String,
    pub(crate) data: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerationConfig {
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    pub(crate) response_mime_type: Option<String>,
    #[serde(rename = "responseSchema", skip_serializing_if = "Option::is_none")]
    pub(crate) response_schema: Option<Value>,
    #[serde(rename = "imageConfig", skip_serializing_if = "Option::is_none")]
    pub(crate) image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ImageConfig {
    #[serde(rename = "aspectRatio")]
    pub(crate) aspect_ratio: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SafetySetting {
    pub(crate) category: HarmCategory,
    pub(crate) threshold: HarmBlockThreshold,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) enum HarmBlockThreshold {
    #[serde(rename = "BLOCK_NONE")]
    BlockNone,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    pub(crate) candidates: Option<Vec<Candidate>>,
    pub(crate) error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    // Safety-blocked candidates come back without content.
    #[serde(default)]
    pub(crate) content: CandidateContent,
    #[serde(rename = "finishReason")]
    pub(crate) finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub(crate) parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponsePart {
    pub(crate) text: Option<String>,
    #[serde(rename = "inlineData")]
    pub(crate) inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub(crate) code: Option<u16>,
    pub(crate) message: String,
}
