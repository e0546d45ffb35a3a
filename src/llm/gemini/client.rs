// src/llm/gemini/client.rs
// Google Gemini generateContent client (plain text prompts, non-streaming)

use crate::http::create_shared_client;
use crate::llm::gemini::extraction::{extract_text, finish_reason};
use crate::llm::gemini::types::{GeminiContent, GeminiRequest, GeminiResponse};
use crate::llm::http_client::LlmHttpClient;
use crate::llm::provider::{GenerationRequest, TextGenerator};
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use std::time::Instant;
use tracing::{Span, debug, instrument, warn};
use uuid::Uuid;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Auth header; keeps the key out of URLs and error text
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Google Gemini API client
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    http: LlmHttpClient,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_http_client(api_key, create_shared_client())
    }

    /// Create a new Gemini client with a shared HTTP client
    pub fn with_http_client(api_key: String, client: reqwest::Client) -> Self {
        Self {
            api_key,
            base_url: GEMINI_API_BASE.to_string(),
            http: LlmHttpClient::from_client(client),
        }
    }

    /// Point the client at another models endpoint (proxies, local mocks)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn provider_name(&self) -> &'static str {
        "Gemini"
    }

    #[instrument(skip(self, request), fields(request_id, model = %request.model))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let request_id = Uuid::new_v4().to_string();
        let start_time = Instant::now();
        Span::current().record("request_id", &request_id);

        let body = serde_json::to_string(&GeminiRequest {
            contents: vec![GeminiContent::user_text(request.prompt.as_str())],
        })?;
        debug!(request_id = %request_id, prompt_len = request.prompt.len(), "Gemini request");

        let response_body = self
            .http
            .post_json(
                &request_id,
                &self.endpoint(&request.model),
                &[(API_KEY_HEADER, self.api_key.as_str())],
                body,
            )
            .await?;

        let data: GeminiResponse = serde_json::from_str(&response_body)
            .map_err(|e| anyhow!("Failed to parse Gemini response: {}", e))?;

        if let Some(err) = data.error.as_ref() {
            bail!("Gemini error {}", err);
        }

        let content = extract_text(&data).unwrap_or_default();
        if content.is_empty()
            && let Some(reason) = finish_reason(&data).filter(|r| *r != "STOP")
        {
            warn!(request_id = %request_id, finish_reason = reason, "Gemini returned no text");
        }

        crate::llm::logging::log_completion(
            &request_id,
            self.provider_name(),
            &request.model,
            start_time.elapsed().as_millis() as u64,
            content.len(),
        );

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_base() {
        assert!(GEMINI_API_BASE.contains("googleapis.com"));
    }

    #[test]
    fn test_endpoint_format() {
        let client = GeminiClient::new("test-key".to_string());
        assert_eq!(
            client.endpoint("gemini-3-flash-preview"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:generateContent"
        );
    }

    #[test]
    fn test_with_base_url_trims_slash() {
        let client =
            GeminiClient::new("k".to_string()).with_base_url("http://127.0.0.1:9000/models/");
        assert_eq!(
            client.endpoint("m"),
            "http://127.0.0.1:9000/models/m:generateContent"
        );
    }

    #[tokio::test]
    async fn test_generate_unreachable_host() {
        let client = GeminiClient::new("k".to_string()).with_base_url("http://127.0.0.1:1");
        let err = client
            .generate(&GenerationRequest::new("m", "hi"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Request failed"));
    }

    #[test]
    fn test_endpoint_never_carries_key() {
        let client = GeminiClient::new("AIzaSyX429abc".to_string());
        assert!(!client.endpoint("gemini-3-pro-preview").contains("AIzaSyX429abc"));
    }
}
