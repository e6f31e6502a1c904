//! GitHub REST API HTTP client

use crate::error::{GithubError, Result};
use crate::types::User;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

/// Connection settings for [`GithubClient`]
#[derive(Debug, Clone)]
pub struct GithubOptions {
    /// API root, without trailing slash
    pub base_url: String,
    /// Personal access token. Sent as-is when it already carries a scheme
    /// (`token ...`, `Bearer ...`), otherwise as a bearer token.
    pub token: Option<String>,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for GithubOptions {
    fn default() -> Self {
        Self {
            base_url: GithubClient::BASE_URL.to_string(),
            token: None,
            timeout: Duration::from_secs(30),
            user_agent: GithubClient::USER_AGENT.to_string(),
        }
    }
}

/// Client for the GitHub user and repository endpoints
pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
}

impl GithubClient {
    /// Public GitHub API
    pub const BASE_URL: &'static str = "https://api.github.com";
    /// GitHub rejects requests without a user agent
    pub const USER_AGENT: &'static str = "github-api-rs/0.1";
    /// Pinned REST API version
    pub const API_VERSION: &'static str = "2022-11-28";
    /// Largest page size GitHub accepts for repository listings
    pub const REPOS_PER_PAGE: u32 = 100;

    /// Create a client from the given options
    pub fn new(options: GithubOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(Self::API_VERSION),
        );
        if let Some(token) = options.token.as_deref().filter(|t| !t.is_empty()) {
            let value = authorization_value(token);
            let mut value = HeaderValue::from_str(&value)
                .map_err(|e| GithubError::Config(format!("invalid token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: options.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get a user's public profile
    ///
    /// Returns `Ok(None)` when GitHub answers 404. Any other non-success
    /// status (rate limiting, outages) is an error.
    pub async fn get_user(&self, login: &str) -> Result<Option<User>> {
        let url = format!("{}/users/{}", self.base_url, urlencoding::encode(login));
        let response = self.http.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(login = login, "GitHub user not found");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(GithubError::Status(response.status().as_u16()));
        }

        Ok(Some(response.json().await?))
    }

    /// List a user's public repositories as the raw JSON array GitHub returns
    ///
    /// # Arguments
    /// * `login` - GitHub login of the account
    pub async fn list_repos(&self, login: &str) -> Result<serde_json::Value> {
        let url = format!(
            "{}/users/{}/repos?per_page={}",
            self.base_url,
            urlencoding::encode(login),
            Self::REPOS_PER_PAGE
        );
        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(GithubError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn authorization_value(token: &str) -> String {
    let token = token.trim();
    if token.contains(' ') {
        token.to_string()
    } else {
        format!("Bearer {}", token)
    }
}
