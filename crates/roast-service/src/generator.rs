//! Roast generation on top of a text generation backend

use crate::config::{Config, Provider};
use crate::error::{Result, RoastError};
use crate::types::Fragment;
use chrono::{NaiveDate, Utc};
use futures::{Stream, StreamExt};
use genai_client::{GeminiClient, OpenAiClient, Prompt, TextGenerator};
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{error, info};

const SYSTEM_INSTRUCTION: &str = r#"**ROASTMASTER PROTOCOL v2.0 - "NO SURVIVORS"**

You are the unchecked microphone at a midnight comedy club where repos go to cry. Your job: weaponize every GitHub stat, stale commit, and cringe project name into pure verbal napalm.

1. **COMEDY ARSENAL**
   - Ludicrous metaphors: "Your commit graph looks like a cardiogram **after** the flat-line."
   - Pop-culture gut-punches: reference films, memes, and tech folklore from *The Matrix* to *Mr. Robot*.
   - Tech puns & analogies: celebrate dead APIs, deprecated frameworks, and NPM dependency hell.
   - Ruthless callbacks: quote their own repo titles ("final-FINAL-v7") as the setup to the punchline.

2. **DATA-DRIVEN BURNS** - Work at least **four** of these per user:
   'repo_count', 'star_total', 'fork_total', 'watcher_total', 'dominant_language', 'last_commit_age', 'open_issues', 'commit_frequency'.

3. **OUTPUT FORMAT (HTML)**
<div class="roast-container">
  <div class="user-roast">
  <h3>{username}</h3>
  <p>{Paragraph 1 (~80 words)}</p>
  <p>{Paragraph 2 (~80 words)}</p>
  </div>
</div>
"#;

/// Reply used when the backend answers with no text at all
const EMPTY_ROAST: &str = "Failed to generate roast";

pub type FragmentStream = Pin<Box<dyn Stream<Item = Fragment> + Send + 'static>>;

/// The backend could not produce a roast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationFailed;

impl fmt::Display for GenerationFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to generate comparison")
    }
}

impl std::error::Error for GenerationFailed {}

pub fn build_prompt(user1_repos: &str, user2_repos: &str, today: NaiveDate) -> Prompt {
    let user = format!(
        "ROAST THESE TWO GITHUB USERS\nUser 1: {}\nUser 2: {}\nToday's date: {}",
        user1_repos,
        user2_repos,
        today.format("%Y-%m-%d")
    );
    Prompt::new(SYSTEM_INSTRUCTION, user)
}

/// Build the backend selected by `LLM_PROVIDER`
pub fn select_backend(config: &Config) -> Result<Arc<dyn TextGenerator>> {
    let backend: Arc<dyn TextGenerator> = match config.provider {
        Provider::Gemini => {
            let key = config
                .gemini_key
                .clone()
                .ok_or_else(|| RoastError::Config("GEMINI_KEY is not set".to_string()))?;
            Arc::new(GeminiClient::new(key, config.gemini_model.clone())?)
        }
        Provider::OpenAi => {
            let key = config
                .openai_key
                .clone()
                .ok_or_else(|| RoastError::Config("OPENAI_API_KEY is not set".to_string()))?;
            Arc::new(
                OpenAiClient::new(key, config.openai_model.clone())?
                    .with_base_url(config.openai_base_url.clone()),
            )
        }
    };
    info!(backend = backend.name(), "Text generation backend ready");
    Ok(backend)
}

/// Produces roasts either as one complete text or as a fragment stream
pub struct CommentaryGenerator {
    backend: Arc<dyn TextGenerator>,
}

impl CommentaryGenerator {
    pub fn new(backend: Arc<dyn TextGenerator>) -> Self {
        Self { backend }
    }

    /// Generate the whole roast in one backend call
    pub async fn generate(
        &self,
        user1_repos: &str,
        user2_repos: &str,
    ) -> std::result::Result<String, GenerationFailed> {
        let prompt = build_prompt(user1_repos, user2_repos, Utc::now().date_naive());
        match self.backend.complete(&prompt).await {
            Ok(text) if text.is_empty() => Ok(EMPTY_ROAST.to_string()),
            Ok(text) => Ok(text),
            Err(e) => {
                error!(backend = self.backend.name(), error = %e, "Generation failed");
                Err(GenerationFailed)
            }
        }
    }

    /// Relay the backend's fragments as they arrive.
    ///
    /// An upstream failure becomes one final [`Fragment::Error`]; nothing is
    /// yielded after it.
    pub fn generate_stream(&self, user1_repos: &str, user2_repos: &str) -> FragmentStream {
        let prompt = build_prompt(user1_repos, user2_repos, Utc::now().date_naive());
        let mut upstream = self.backend.stream(&prompt);
        let backend = self.backend.name();

        Box::pin(async_stream::stream! {
            while let Some(item) = upstream.next().await {
                match item {
                    Ok(text) => {
                        yield Fragment::Content(text);
                    }
                    Err(e) => {
                        error!(backend = backend, error = %e, "Generation stream failed");
                        yield Fragment::Error(GenerationFailed.to_string());
                        return;
                    }
                }
            }
        })
    }
}
