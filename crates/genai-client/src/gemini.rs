//! Google Gemini client

use crate::error::{check_status, GenAiError, Result};
use crate::sse::{self, Chunk};
use crate::{Prompt, TextGenerator, TextStream};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Value};
use std::time::Duration;

pub struct GeminiClient {
    http: reqwest::Client,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub const BASE_URL: &'static str = "https://generativelanguage.googleapis.com";
    pub const DEFAULT_MODEL: &'static str = "gemini-2.0-flash";

    /// Header carrying the API key, kept out of request URLs
    pub const API_KEY_HEADER: &'static str = "x-goog-api-key";

    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let mut key = HeaderValue::from_str(&api_key.into())
            .map_err(|e| GenAiError::Config(format!("invalid API key: {}", e)))?;
        key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(Self::API_KEY_HEADER, key);

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            model: model.into(),
            base_url: Self::BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, method: &str) -> String {
        let mut url = format!("{}/v1beta/models/{}:{}", self.base_url, self.model, method);
        if method == "streamGenerateContent" {
            url.push_str("?alt=sse");
        }
        url
    }
}

fn request_body(prompt: &Prompt) -> Value {
    json!({
        "system_instruction": {
            "parts": [{"text": prompt.system}],
        },
        "contents": [{
            "role": "user",
            "parts": [{"text": prompt.user}],
        }],
    })
}

/// Concatenate the text parts of the first candidate
fn candidate_text(body: &Value) -> String {
    body["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect::<String>()
        })
        .unwrap_or_default()
}

fn parse_stream_chunk(data: &str) -> Result<Chunk> {
    let body: Value = serde_json::from_str(data)?;
    if let Some(message) = body["error"]["message"].as_str() {
        return Err(GenAiError::Stream(message.to_string()));
    }
    Ok(Chunk::Text(candidate_text(&body)))
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let response = self
            .http
            .post(self.url("generateContent"))
            .json(&request_body(prompt))
            .send()
            .await?;
        let body: Value = check_status(response).await?.json().await?;
        Ok(candidate_text(&body))
    }

    fn stream(&self, prompt: &Prompt) -> TextStream {
        let request = self
            .http
            .post(self.url("streamGenerateContent"))
            .json(&request_body(prompt));
        sse::request_stream(request, parse_stream_chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn test_request_body_carries_system_instruction() {
        let body = request_body(&Prompt::new("be mean", "compare these"));
        assert_eq!(body["system_instruction"]["parts"][0]["text"], "be mean");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "compare these");
    }

    #[test]
    fn test_stream_url_requests_sse() {
        let client = GeminiClient::new("k", "gemini-2.0-flash")
            .unwrap()
            .with_base_url("http://localhost:8080/");
        assert_eq!(
            client.url("streamGenerateContent"),
            "http://localhost:8080/v1beta/models/gemini-2.0-flash:streamGenerateContent?alt=sse"
        );
        assert!(!client.url("generateContent").contains("alt=sse"));
    }

    #[test]
    fn test_invalid_api_key_is_config_error() {
        let result = GeminiClient::new("bad\nkey", "gemini-2.0-flash");
        assert!(matches!(result, Err(GenAiError::Config(_))));
    }

    #[tokio::test]
    async fn test_transport_error_does_not_leak_api_key() {
        let client = GeminiClient::new("SECRET-KEY-123", "gemini-2.0-flash")
            .unwrap()
            .with_base_url("http://127.0.0.1:1");
        let prompt = Prompt::new("be mean", "compare these");

        let err = client.complete(&prompt).await.unwrap_err();
        assert!(matches!(err, GenAiError::Http(_)));
        assert!(!err.to_string().contains("SECRET-KEY-123"));
        assert!(!client.url("generateContent").contains("SECRET-KEY-123"));

        let err = client.stream(&prompt).next().await.unwrap().unwrap_err();
        assert!(!err.to_string().contains("SECRET-KEY-123"));
    }

    #[test]
    fn test_candidate_text_joins_parts() {
        let body = json!({
            "candidates": [{"content": {"parts": [{"text": "Foo"}, {"text": "Bar"}]}}]
        });
        assert_eq!(candidate_text(&body), "FooBar");
    }

    #[test]
    fn test_candidate_text_empty_when_blocked() {
        let body = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        assert_eq!(candidate_text(&body), "");
    }

    #[test]
    fn test_parse_stream_chunk_error_event() {
        let result = parse_stream_chunk(r#"{"error": {"code": 500, "message": "internal"}}"#);
        assert!(matches!(result, Err(GenAiError::Stream(msg)) if msg == "internal"));
    }

    #[test]
    fn test_parse_stream_chunk_text() {
        let data = r#"{"candidates": [{"content": {"parts": [{"text": "roast"}], "role": "model"}}]}"#;
        assert_eq!(
            parse_stream_chunk(data).unwrap(),
            Chunk::Text("roast".to_string())
        );
    }
}
