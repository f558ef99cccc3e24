//! Clients for the collaborator services the pipeline consumes.
//!
//! Each external service sits behind an object-safe trait so the pipeline
//! can run against mocks in tests. The concrete implementations talk HTTP
//! via a shared `reqwest::Client` and map transport, API and protocol
//! failures into [`ClientError`].

pub mod error;
pub mod gemini;
pub mod openai;

pub use error::ClientError;
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

use async_trait::async_trait;

/// Content generation: structured prompt in, free text out.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str)
    -> Result<String, ClientError>;
}

/// Slide image rendering: prompt in, raw image bytes out.
#[async_trait]
pub trait ImageApi: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, ClientError>;
}

/// Narration synthesis: text in, raw audio bytes out.
///
/// Callers never pass empty text; "nothing to synthesize" is decided before
/// a request is made.
#[async_trait]
pub trait SpeechApi: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ClientError>;
}
