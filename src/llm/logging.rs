// src/llm/logging.rs
// Shared LLM logging helpers

use tracing::info;

/// Log completion summary for an LLM call.
pub fn log_completion(request_id: &str, provider: &str, model: &str, duration_ms: u64, content_len: usize) {
    info!(
        request_id = %request_id,
        model = %model,
        duration_ms = duration_ms,
        content_len = content_len,
        "{} generation complete", provider
    );
}
