//! OpenAI-compatible chat completions client

use crate::error::{check_status, GenAiError, Result};
use crate::sse::{self, Chunk};
use crate::{Prompt, TextGenerator, TextStream};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    pub const BASE_URL: &'static str = "https://api.openai.com/v1";
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";

    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            base_url: Self::BASE_URL.to_string(),
        })
    }

    /// Point at another OpenAI-compatible server (Groq, Together, a local proxy)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn request(&self, prompt: &Prompt, stream: bool) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body(&self.model, prompt, stream))
    }
}

fn request_body(model: &str, prompt: &Prompt, stream: bool) -> Value {
    json!({
        "model": model,
        "stream": stream,
        "messages": [
            {"role": "system", "content": prompt.system},
            {"role": "user", "content": prompt.user},
        ],
    })
}

fn parse_stream_chunk(data: &str) -> Result<Chunk> {
    if data.trim() == "[DONE]" {
        return Ok(Chunk::Done);
    }
    let body: Value = serde_json::from_str(data)?;
    if let Some(message) = body["error"]["message"].as_str() {
        return Err(GenAiError::Stream(message.to_string()));
    }
    match body["choices"][0]["delta"]["content"].as_str() {
        Some(text) => Ok(Chunk::Text(text.to_string())),
        None => Ok(Chunk::Skip),
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let response = self.request(prompt, false).send().await?;
        let body: Value = check_status(response).await?.json().await?;
        Ok(body["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    fn stream(&self, prompt: &Prompt) -> TextStream {
        sse::request_stream(self.request(prompt, true), parse_stream_chunk)
    }
}
