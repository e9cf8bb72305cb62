//! The two public look operations: metric analysis and style transfer.
//!
//! Request shapes, prompts, and the error classification live here; raw
//! transport belongs to `gemini` and pixel work to `compose`.

use crate::compose::blend_images;
use crate::config::LookConfig;
use crate::credential::ApiKey;
use crate::data_url::DataUrl;
use crate::error::{LookError, Result};
use crate::gemini::GeminiClient;
use crate::gemini::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    HarmBlockThreshold, HarmCategory, ImageConfig, InlineData, Part, SafetySetting,
};
use crate::metrics::{ANALYZE_PROMPT, LookMetrics, response_schema};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::time::Duration;

/// Stateless façade over the Gemini calls. Cheap to construct, safe to
/// share; the credential is supplied per call, never stored.
pub struct LookService {
    client: GeminiClient,
    config: LookConfig,
}

impl LookService {
    pub fn new(config: LookConfig) -> Self {
        Self {
            client: GeminiClient::new(&config.base_url, config.request_timeout_secs),
            config,
        }
    }

    /// Score the five look metrics of an image.
    ///
    /// `image` is either a full data URL or a bare base64 payload. A bare
    /// payload gets its MIME type sniffed from the decoded bytes, falling
    /// back to JPEG; a `data:`-prefixed string that fails to parse is an
    /// [`LookError::InvalidDataUrl`] failure before any network traffic.
    ///
    /// Remote failures whose rendered text mentions `429` or `quota` are
    /// collapsed to [`LookError::QuotaExceeded`]; every other error
    /// propagates unchanged.
    pub async fn analyze_look_metrics(&self, key: &ApiKey, image: &str) -> Result<LookMetrics> {
        let image = normalize_image_input(image)?;
        let request = build_metrics_request(image);

        tracing::debug!(model = %self.config.metrics_model, "requesting look metrics");
        let response = self
            .client
            .generate_content(key, &self.config.metrics_model, &request)
            .await
            .map_err(quota_or_original)?;

        let body = first_candidate_text(&response);
        serde_json::from_str(&body).map_err(LookError::InvalidMetrics)
    }

    /// Restyle `target` after `reference` and blend the generated image
    /// back over the target at `intensity` percent.
    ///
    /// Both inputs must be data URLs. The returned string is a JPEG data
    /// URL, or the generated PNG data URL unblended when `intensity >= 100`.
    ///
    /// Remote failures map in order: `429`/`quota` →
    /// [`LookError::QuotaExceeded`], then `not found` →
    /// [`LookError::KeyInvalid`]; anything else propagates unchanged.
    /// Compositor failures are [`LookError::Compose`] and are never
    /// remapped.
    pub async fn apply_look_transfer(
        &self,
        key: &ApiKey,
        reference: &str,
        target: &str,
        intensity: u8,
        preset: &str,
    ) -> Result<String> {
        let reference_url = DataUrl::parse(reference)?;
        let target_url = DataUrl::parse(target)?;
        let request = build_transfer_request(&reference_url, &target_url, preset);

        tracing::debug!(
            model = %self.config.transfer_model,
            preset,
            intensity,
            "requesting look transfer"
        );
        let response = self
            .client
            .generate_content(key, &self.config.transfer_model, &request)
            .await
            .map_err(transfer_error)?;

        let Some(generated) = first_inline_image(&response) else {
            let reasons: Vec<&str> = response
                .candidates
                .as_deref()
                .unwrap_or_default()
                .iter()
                .filter_map(|candidate| candidate.finish_reason.as_deref())
                .collect();
            tracing::warn!(?reasons, "transfer response carried no inline image");
            return Err(LookError::NoImageGenerated);
        };

        let styled = DataUrl::new(mime::IMAGE_PNG.as_ref(), generated).to_string();
        let blended = blend_images(
            target,
            &styled,
            intensity,
            self.config.jpeg_quality,
            Duration::from_secs(self.config.blend_timeout_secs),
        )
        .await?;

        Ok(blended)
    }
}

/// Collapse rate-limit shaped errors, pass everything else through.
fn quota_or_original(err: LookError) -> LookError {
    let text = err.to_string();
    if text.contains("429") || text.contains("quota") {
        return LookError::QuotaExceeded;
    }
    err
}

/// Transfer-call mapping: quota first, then unknown-model, which the remote
/// reports for revoked or mis-scoped keys.
fn transfer_error(err: LookError) -> LookError {
    let err = quota_or_original(err);
    if matches!(err, LookError::QuotaExceeded) {
        return err;
    }
    if err.to_string().contains("not found") {
        return LookError::KeyInvalid;
    }
    err
}

fn normalize_image_input(image: &str) -> Result<InlineData> {
    if image.starts_with("data:") {
        let url = DataUrl::parse(image)?;
        return Ok(inline(&url));
    }

    let mime_type = BASE64
        .decode(image)
        .ok()
        .and_then(|bytes| infer::get(&bytes).map(|info| info.mime_type().to_string()))
        .unwrap_or_else(|| mime::IMAGE_JPEG.as_ref().to_string());

    Ok(InlineData {
        mime_type,
        data: image.to_string(),
    })
}

fn inline(url: &DataUrl) -> InlineData {
    InlineData {
        mime_type: url.mime_type().to_string(),
        data: url.data().to_string(),
    }
}

fn build_metrics_request(image: InlineData) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part::inline_data(image), Part::text(ANALYZE_PROMPT)],
        }],
        generation_config: Some(GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(response_schema()),
            image_config: None,
        }),
        safety_settings: None,
    }
}

fn build_transfer_request(
    reference: &DataUrl,
    target: &DataUrl,
    preset: &str,
) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![
                Part::text(format!(
                    "Apply {preset} style from reference to target. Return image."
                )),
                Part::text("Target:"),
                Part::inline_data(inline(target)),
                Part::text("Reference:"),
                Part::inline_data(inline(reference)),
            ],
        }],
        generation_config: Some(GenerationConfig {
            response_mime_type: None,
            response_schema: None,
            image_config: Some(ImageConfig {
                aspect_ratio: "1:1".to_string(),
            }),
        }),
        safety_settings: Some(relaxed_safety_settings()),
    }
}

fn relaxed_safety_settings() -> Vec<SafetySetting> {
    [
        HarmCategory::Harassment,
        HarmCategory::HateSpeech,
        HarmCategory::SexuallyExplicit,
        HarmCategory::DangerousContent,
    ]
    .into_iter()
    .map(|category| SafetySetting {
        category,
        threshold: HarmBlockThreshold::BlockNone,
    })
    .collect()
}

/// Text of the first candidate, parts concatenated in order with no
/// separator. The remote may split a JSON body anywhere, including
/// mid-token, so inserting anything between parts would corrupt it.
fn first_candidate_text(response: &GenerateContentResponse) -> String {
    let mut out = String::new();
    if let Some(candidate) = response.candidates.as_ref().and_then(|c| c.first()) {
        for part in &candidate.content.parts {
            if let Some(text) = &part.text {
                out.push_str(text);
            }
        }
    }
    out
}

/// First inline image payload anywhere in the response, scanning every
/// candidate's parts in order.
fn first_inline_image(response: &GenerateContentResponse) -> Option<String> {
    response
        .candidates
        .as_ref()?
        .iter()
        .flat_map(|candidate| candidate.content.parts.iter())
        .find_map(|part| part.inline_data.as_ref().map(|data| data.data.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16, message: &str) -> LookError {
        LookError::Api {
            status,
            message: message.to_string(),
        }
    }

    fn response_from(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn quota_mapping_catches_status_and_body_text() {
        assert!(matches!(
            quota_or_original(api_error(429, "slow down")),
            LookError::QuotaExceeded
        ));
        assert!(matches!(
            quota_or_original(api_error(500, "project quota exhausted")),
            LookError::QuotaExceeded
        ));
    }

    #[test]
    fn analyzer_path_does_not_remap_not_found() {
        let err = quota_or_original(api_error(404, "model not found"));
        assert!(matches!(err, LookError::Api { status: 404, .. }));
    }

    #[test]
    fn transfer_path_remaps_not_found_to_key_invalid() {
        assert!(matches!(
            transfer_error(api_error(404, "model not found")),
            LookError::KeyInvalid
        ));
    }

    #[test]
    fn transfer_path_prefers_quota_over_not_found() {
        assert!(matches!(
            transfer_error(api_error(429, "quota not found")),
            LookError::QuotaExceeded
        ));
    }

    #[test]
    fn transfer_path_passes_other_errors_through() {
        assert!(matches!(
            transfer_error(api_error(500, "internal")),
            LookError::Api { status: 500, .. }
        ));
    }

    #[test]
    fn normalize_keeps_data_url_mime() {
        let inline = normalize_image_input("data:image/webp;base64,AAAA").unwrap();
        assert_eq!(inline.mime_type, "image/webp");
        assert_eq!(inline.data, "AAAA");
    }

    #[test]
    fn normalize_rejects_malformed_data_prefix() {
        assert!(matches!(
            normalize_image_input("data:image/webp"),
            Err(LookError::InvalidDataUrl(_))
        ));
    }

    #[test]
    fn normalize_sniffs_raw_png_payload() {
        let png_magic = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
        let payload = BASE64.encode(png_magic);
        let inline = normalize_image_input(&payload).unwrap();
        assert_eq!(inline.mime_type, "image/png");
        assert_eq!(inline.data, payload);
    }

    #[test]
    fn normalize_defaults_unrecognized_payload_to_jpeg() {
        let inline = normalize_image_input("not//base64!!").unwrap();
        assert_eq!(inline.mime_type, "image/jpeg");
        assert_eq!(inline.data, "not//base64!!");
    }

    #[test]
    fn metrics_request_carries_schema_and_prompt() {
        let request = build_metrics_request(InlineData {
            mime_type: "image/png".to_string(),
            data: "AAAA".to_string(),
        });
        let json = serde_json::to_string(&request).unwrap();

        assert!(json.contains(ANALYZE_PROMPT));
        assert!(json.contains("\"responseMimeType\":\"application/json\""));
        assert!(json.contains("\"responseSchema\""));
        assert!(json.contains(
            "\"required\":[\"contrast\",\"saturation\",\"warmth\",\"uniformity\",\"exposure\"]"
        ));
        assert!(!json.contains("safetySettings"));
    }

    #[test]
    fn metrics_request_puts_image_before_instruction() {
        let request = build_metrics_request(InlineData {
            mime_type: "image/png".to_string(),
            data: "AAAA".to_string(),
        });
        let parts = &request.contents[0].parts;
        assert!(parts[0].inline_data.is_some());
        assert_eq!(parts[1].text.as_deref(), Some(ANALYZE_PROMPT));
    }

    #[test]
    fn transfer_request_orders_parts_and_relaxes_safety() {
        let reference = DataUrl::new("image/png", "UkVG");
        let target = DataUrl::new("image/jpeg", "VEFS");
        let request = build_transfer_request(&reference, &target, "cinematic");

        let parts = &request.contents[0].parts;
        assert_eq!(
            parts[0].text.as_deref(),
            Some("Apply cinematic style from reference to target. Return image.")
        );
        assert_eq!(parts[1].text.as_deref(), Some("Target:"));
        assert_eq!(parts[2].inline_data.as_ref().unwrap().data, "VEFS");
        assert_eq!(parts[3].text.as_deref(), Some("Reference:"));
        assert_eq!(parts[4].inline_data.as_ref().unwrap().data, "UkVG");

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"aspectRatio\":\"1:1\""));
        for category in [
            "HARM_CATEGORY_HARASSMENT",
            "HARM_CATEGORY_HATE_SPEECH",
            "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            "HARM_CATEGORY_DANGEROUS_CONTENT",
        ] {
            assert!(json.contains(category), "missing {category}");
        }
        assert_eq!(json.matches("BLOCK_NONE").count(), 4);
    }

    #[test]
    fn first_candidate_text_concatenates_parts_without_separator() {
        let response = response_from(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}}]}"#,
        );
        assert_eq!(first_candidate_text(&response), "{\"a\":1}");
    }

    #[test]
    fn first_candidate_text_empty_when_no_candidates() {
        assert_eq!(first_candidate_text(&response_from("{}")), "");
        assert_eq!(
            first_candidate_text(&response_from(r#"{"candidates":[]}"#)),
            ""
        );
    }

    #[test]
    fn first_inline_image_scans_later_candidates() {
        let response = response_from(
            r#"{"candidates":[
                {"content":{"parts":[{"text":"no image here"}]}},
                {"content":{"parts":[{"inlineData":{"mimeType":"image/png","data":"UElY"}}]}}
            ]}"#,
        );
        assert_eq!(first_inline_image(&response).as_deref(), Some("UElY"));
    }

    #[test]
    fn first_inline_image_none_for_text_only_response() {
        let response =
            response_from(r#"{"candidates":[{"content":{"parts":[{"text":"sorry"}]}}]}"#);
        assert!(first_inline_image(&response).is_none());
    }
}
