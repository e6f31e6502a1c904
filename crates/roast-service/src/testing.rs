//! In-memory directory and generator stubs for tests

use crate::directory::Directory;
use async_trait::async_trait;
use genai_client::{GenAiError, Prompt, TextGenerator, TextStream};
use github_api::{GithubError, User};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Barrier;

#[derive(Default)]
pub struct StubDirectory {
    repos: HashMap<String, String>,
    fail_lookups: bool,
    fail_repos: bool,
    entity_barrier: Option<Barrier>,
    repo_barrier: Option<Barrier>,
    entity_calls: AtomicUsize,
    repo_calls: AtomicUsize,
}

impl StubDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an existing user owning `repos` (a JSON array)
    pub fn with_user(mut self, login: &str, repos: &str) -> Self {
        self.repos.insert(login.to_string(), repos.to_string());
        self
    }

    pub fn with_failing_lookups(mut self) -> Self {
        self.fail_lookups = true;
        self
    }

    pub fn with_failing_repos(mut self) -> Self {
        self.fail_repos = true;
        self
    }

    /// Hold every user lookup until `parties` of them are in flight
    pub fn with_entity_barrier(mut self, parties: usize) -> Self {
        self.entity_barrier = Some(Barrier::new(parties));
        self
    }

    /// Hold every repository listing until `parties` of them are in flight
    pub fn with_repo_barrier(mut self, parties: usize) -> Self {
        self.repo_barrier = Some(Barrier::new(parties));
        self
    }

    pub fn entity_calls(&self) -> usize {
        self.entity_calls.load(Ordering::SeqCst)
    }

    pub fn repo_calls(&self) -> usize {
        self.repo_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Directory for StubDirectory {
    async fn get_entity(&self, login: &str) -> github_api::Result<Option<User>> {
        self.entity_calls.fetch_add(1, Ordering::SeqCst);
        match &self.entity_barrier {
            Some(barrier) => {
                barrier.wait().await;
            }
            None => tokio::task::yield_now().await,
        }
        if self.fail_lookups {
            return Err(GithubError::Status(503));
        }
        Ok(self.repos.get(login).map(|_| User {
            id: Some(1),
            login: login.to_string(),
            ..Default::default()
        }))
    }

    async fn list_resources(&self, login: &str) -> github_api::Result<serde_json::Value> {
        self.repo_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(barrier) = &self.repo_barrier {
            barrier.wait().await;
        }
        if self.fail_repos {
            return Err(GithubError::Status(502));
        }
        match self.repos.get(login) {
            Some(repos) => Ok(serde_json::from_str(repos)?),
            None => Err(GithubError::Status(404)),
        }
    }
}

/// Scripted generator. `complete` answers `completion` (or fails when it is
/// `None`); `stream` replays `fragments`, an `Err` becoming an upstream error.
#[derive(Default)]
pub struct StubGenerator {
    completion: Option<String>,
    fragments: Vec<Result<String, String>>,
    complete_calls: AtomicUsize,
    stream_calls: AtomicUsize,
    prompts: Mutex<Vec<Prompt>>,
}

impl StubGenerator {
    pub fn completing(text: &str) -> Self {
        Self {
            completion: Some(text.to_string()),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn streaming(fragments: Vec<Result<&str, &str>>) -> Self {
        Self {
            fragments: fragments
                .into_iter()
                .map(|f| f.map(str::to_string).map_err(str::to_string))
                .collect(),
            ..Default::default()
        }
    }

    pub fn complete_calls(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }

    pub fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn complete(&self, prompt: &Prompt) -> genai_client::Result<String> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.clone());
        self.completion.clone().ok_or_else(|| GenAiError::Api {
            status: 500,
            message: "backend down".to_string(),
        })
    }

    fn stream(&self, prompt: &Prompt) -> TextStream {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.clone());
        let items: Vec<_> = self
            .fragments
            .iter()
            .cloned()
            .map(|f| f.map_err(GenAiError::Stream))
            .collect();
        Box::pin(futures::stream::iter(items))
    }
}
