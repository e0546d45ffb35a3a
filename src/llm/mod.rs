// src/llm/mod.rs
// LLM text generation clients (Gemini)

mod gemini;
mod http_client;
mod logging;
mod provider;

pub use gemini::GeminiClient;
pub use http_client::LlmHttpClient;
pub use provider::{GenerationRequest, TextGenerator};
