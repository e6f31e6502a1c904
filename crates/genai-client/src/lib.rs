//! Text generation clients with complete and streaming modes
//!
//! Every backend implements [`TextGenerator`], so callers pick a provider once
//! and then use the same two calls regardless of who answers:
//!
//! - [`TextGenerator::complete`] waits for the full response text
//! - [`TextGenerator::stream`] yields text fragments as the provider emits them
//!
//! Supported providers:
//!
//! - Google Gemini (`generateContent` / `streamGenerateContent?alt=sse`)
//! - OpenAI-compatible chat completions (`/chat/completions` with `stream: true`)

mod error;
mod gemini;
mod openai;
mod sse;

pub use error::{GenAiError, Result};
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Lazily evaluated sequence of generated text fragments
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send + 'static>>;

/// System instruction plus a single user turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// A generative text backend
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name, used in logs
    fn name(&self) -> &'static str;

    /// Generate the full response in one request
    async fn complete(&self, prompt: &Prompt) -> Result<String>;

    /// Generate the response as a stream of fragments.
    ///
    /// No request is sent until the stream is first polled. An upstream
    /// failure is yielded as an `Err` item, after which the stream ends.
    fn stream(&self, prompt: &Prompt) -> TextStream;
}
