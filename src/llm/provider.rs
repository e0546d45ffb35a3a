// src/llm/provider.rs
// Text generation abstraction - the one external call the governor gates

use anyhow::Result;
use async_trait::async_trait;

/// One prompt for one model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
        }
    }
}

/// Trait for text generation clients
///
/// `generate` performs exactly one call to the external service. Failures
/// must render the service's status or error text so rate limits can be
/// recognized from the message.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Provider name for logs
    fn provider_name(&self) -> &'static str;
}
