//! Text generation used by the semantic matcher.

pub mod gemini;

use thiserror::Error;

pub use gemini::GeminiClient;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Request to text generation service failed: {0}")]
    Request(String),

    #[error("Text generation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse text generation response: {0}")]
    ResponseParse(String),

    #[error("Text generation returned no candidates")]
    EmptyResponse,
}

/// Anything that turns a prompt into text.
pub trait TextGenerator {
    fn generate_text(&self, prompt: &str) -> Result<String, LlmError>;
}
