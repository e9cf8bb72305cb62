//! Thin client for the Gemini `generateContent` REST endpoint.
//!
//! Request and response shapes live in [`types`]; this module owns transport:
//! URL construction, the `x-goog-api-key` header, status checking, and
//! scrubbed error surfacing. Operation semantics (prompts, schemas, error
//! classification) belong to `service`.

use crate::credential::ApiKey;
use crate::error::{LookError, Result};
use crate::http_client::build_api_client;
use crate::scrub::sanitize_api_error;
use reqwest::Client;

pub(crate) mod types;

use types::{GenerateContentRequest, GenerateContentResponse, InlineData, Part};

pub(crate) struct GeminiClient {
    base_url: String,
    client: Client,
}

impl GeminiClient {
    pub(crate) fn new(base_url: &str, request_timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_api_client(request_timeout_secs),
        }
    }

    pub(crate) async fn generate_content(
        &self,
        key: &ApiKey,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", key.expose())
            .json(request)
            .send()
            .await?;

        let response = Self::ensure_success_status(response).await?;
        let result: GenerateContentResponse = response.json().await?;

        if let Some(err) = result.error.as_ref() {
            return Err(LookError::Api {
                status: err.code.unwrap_or(200),
                message: sanitize_api_error(&err.message),
            });
        }

        Ok(result)
    }

    fn endpoint(&self, model: &str) -> String {
        let model_name = Self::model_name(model);
        format!("{}/{model_name}:generateContent", self.base_url)
    }

    fn model_name(model: &str) -> String {
        if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        }
    }

    async fn ensure_success_status(response: reqwest::Response) -> Result<reqwest::Response> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LookError::Api {
                status: status.as_u16(),
                message: sanitize_api_error(&body),
            });
        }

        Ok(response)
    }
}

impl Part {
    pub(crate) fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub(crate) fn inline_data(data: InlineData) -> Self {
        Self {
            text: None,
            inline_data: Some(data),
        }
    }
}
