use std::env;
use std::time::Duration;

use crate::error::{Result, RoastError};

/// Which text generation backend answers roast requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    OpenAi,
}

impl Provider {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAi),
            other => Err(RoastError::Config(format!(
                "unknown LLM_PROVIDER '{}' (expected gemini or openai)",
                other
            ))),
        }
    }
}

/// Application configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub github_token: Option<String>,
    pub github_api_url: String,
    pub provider: Provider,
    pub gemini_key: Option<String>,
    pub gemini_model: String,
    pub openai_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub cache_ttl: Duration,
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = var("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(3001);

        let cors_origins = var("CORS_ORIGINS")
            .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_else(|| vec!["*".to_string()]);

        let github_token = var("GITHUB_TOKEN").filter(|t| !t.is_empty());

        let github_api_url =
            var("GITHUB_API_URL").unwrap_or_else(|| github_api::GithubClient::BASE_URL.to_string());

        let provider = match var("LLM_PROVIDER") {
            Some(value) => Provider::parse(&value)?,
            None => Provider::Gemini,
        };

        let gemini_key = var("GEMINI_KEY").filter(|k| !k.is_empty());
        let gemini_model = var("GEMINI_MODEL")
            .unwrap_or_else(|| genai_client::GeminiClient::DEFAULT_MODEL.to_string());

        let openai_key = var("OPENAI_API_KEY").filter(|k| !k.is_empty());
        let openai_model = var("OPENAI_MODEL")
            .unwrap_or_else(|| genai_client::OpenAiClient::DEFAULT_MODEL.to_string());
        let openai_base_url = var("OPENAI_BASE_URL")
            .unwrap_or_else(|| genai_client::OpenAiClient::BASE_URL.to_string());

        let cache_ttl = var("CACHE_TTL_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(300));

        Ok(Self {
            port,
            cors_origins,
            github_token,
            github_api_url,
            provider,
            gemini_key,
            gemini_model,
            openai_key,
            openai_model,
            openai_base_url,
            cache_ttl,
        })
    }
}
