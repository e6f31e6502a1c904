//! Error types for the roast service

use std::fmt;

#[derive(Debug)]
pub enum RoastError {
    /// GitHub client setup or request error
    Github(github_api::GithubError),
    /// Generation backend setup or request error
    GenAi(genai_client::GenAiError),
    /// Configuration error
    Config(String),
    Io(Box<std::io::Error>),
}

impl fmt::Display for RoastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Github(e) => write!(f, "{}", e),
            Self::GenAi(e) => write!(f, "Generation backend error: {}", e),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for RoastError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Github(e) => Some(e),
            Self::GenAi(e) => Some(e),
            Self::Io(e) => Some(e.as_ref()),
            Self::Config(_) => None,
        }
    }
}

impl From<github_api::GithubError> for RoastError {
    fn from(e: github_api::GithubError) -> Self {
        Self::Github(e)
    }
}

impl From<genai_client::GenAiError> for RoastError {
    fn from(e: genai_client::GenAiError) -> Self {
        Self::GenAi(e)
    }
}

impl From<std::io::Error> for RoastError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(Box::new(e))
    }
}

impl From<tracing_subscriber::filter::ParseError> for RoastError {
    fn from(e: tracing_subscriber::filter::ParseError) -> Self {
        Self::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RoastError>;
