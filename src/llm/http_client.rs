// src/llm/http_client.rs
// Single-attempt HTTP transport for LLM providers
// Exactly one attempt per call; 429s must surface to the request governor.

use anyhow::{Result, anyhow};
use reqwest::Client;
use tracing::warn;

/// Shared HTTP client configuration for LLM providers
pub struct LlmHttpClient {
    client: Client,
}

impl LlmHttpClient {
    /// Create from an existing reqwest::Client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// POST a JSON body once and return the response text.
    ///
    /// `headers` carry per-provider auth. Non-success statuses become
    /// `API error {status}: {body}` so callers see the status code and the
    /// provider's error payload. Transport errors never include the URL.
    pub async fn post_json(
        &self,
        request_id: &str,
        url: &str,
        headers: &[(&str, &str)],
        body: String,
    ) -> Result<String> {
        let mut request = self
            .client
            .post(url)
            .header("Content-Type", "application/json");
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request
            .body(body)
            .send()
            .await
            .map_err(|e| anyhow!("Request failed: {}", e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(
                request_id = %request_id,
                status = %status,
                error = %error_body,
                "LLM request rejected"
            );
            return Err(anyhow!("API error {}: {}", status, error_body));
        }

        response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read response: {}", e.without_url()))
    }
}
