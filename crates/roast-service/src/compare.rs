//! Compare two GitHub users: validate, fetch, generate

use crate::directory::Lookups;
use crate::generator::{CommentaryGenerator, FragmentStream};
use crate::types::{CompareRequest, CompareResponse, Fragment};
use futures::StreamExt;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Stand-in payload when a repository listing can't be fetched in batch mode
pub const MISSING_REPOS: &str = "No Repo Found";

/// How the comparison is delivered, fixed by the endpoint that was called
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// One JSON document once everything is done
    Batch,
    /// Server-sent events, one per generated fragment
    Streaming,
}

/// Why a comparison stopped before generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompareFailure {
    UnknownUser(String),
    ReposUnavailable(String),
}

impl fmt::Display for CompareFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownUser(user) => write!(f, "{} does not exist", user),
            Self::ReposUnavailable(user) => {
                write!(f, "Failed to fetch repositories for {}", user)
            }
        }
    }
}

impl std::error::Error for CompareFailure {}

pub struct Comparator {
    lookups: Lookups,
    generator: CommentaryGenerator,
}

impl Comparator {
    pub fn new(lookups: Lookups, generator: CommentaryGenerator) -> Self {
        Self { lookups, generator }
    }

    pub fn lookups(&self) -> &Lookups {
        &self.lookups
    }

    /// Validate both users, then fetch both repository listings.
    ///
    /// Each pair of lookups runs concurrently and both must finish before
    /// the next step. An unknown user1 is reported before an unknown user2.
    pub async fn prepare(
        &self,
        request: &CompareRequest,
        mode: DeliveryMode,
    ) -> Result<(String, String), CompareFailure> {
        let (user1_valid, user2_valid) = tokio::join!(
            self.lookups.validate(&request.user1),
            self.lookups.validate(&request.user2),
        );

        if !user1_valid {
            return Err(CompareFailure::UnknownUser(request.user1.clone()));
        }
        if !user2_valid {
            return Err(CompareFailure::UnknownUser(request.user2.clone()));
        }
        info!(user1 = %request.user1, user2 = %request.user2, "Both users exist");

        let (user1_repos, user2_repos) = tokio::join!(
            self.fetch_repos(&request.user1, mode),
            self.fetch_repos(&request.user2, mode),
        );
        Ok((user1_repos?, user2_repos?))
    }

    /// Batch tolerates a missing listing, streaming does not
    async fn fetch_repos(
        &self,
        login: &str,
        mode: DeliveryMode,
    ) -> Result<String, CompareFailure> {
        match self.lookups.fetch_repos(login).await {
            Ok(repos) => Ok(repos),
            Err(e) => {
                warn!(user = login, error = %e, "Repository fetch failed");
                match mode {
                    DeliveryMode::Batch => Ok(MISSING_REPOS.to_string()),
                    DeliveryMode::Streaming => {
                        Err(CompareFailure::ReposUnavailable(login.to_string()))
                    }
                }
            }
        }
    }

    /// Run a comparison for the batch endpoint
    pub async fn compare(&self, request: &CompareRequest) -> CompareResponse {
        let (user1_repos, user2_repos) = match self.prepare(request, DeliveryMode::Batch).await {
            Ok(repos) => repos,
            Err(failure) => return CompareResponse::failure(failure.to_string()),
        };

        info!(user1 = %request.user1, user2 = %request.user2, "Generating roast");
        match self.generator.generate(&user1_repos, &user2_repos).await {
            Ok(roast) => CompareResponse::roast(roast),
            Err(e) => CompareResponse::failure(e.to_string()),
        }
    }

    /// Run a comparison for the streaming endpoint.
    ///
    /// Nothing happens until the stream is polled. Any failure, before or
    /// during generation, is the last fragment.
    pub fn compare_stream(self: Arc<Self>, request: CompareRequest) -> FragmentStream {
        Box::pin(async_stream::stream! {
            let prepared = self.prepare(&request, DeliveryMode::Streaming).await;
            let (user1_repos, user2_repos) = match prepared {
                Ok(repos) => repos,
                Err(failure) => {
                    yield Fragment::Error(failure.to_string());
                    return;
                }
            };

            info!(user1 = %request.user1, user2 = %request.user2, "Streaming roast");
            let mut fragments = self.generator.generate_stream(&user1_repos, &user2_repos);
            while let Some(fragment) = fragments.next().await {
                yield fragment;
            }
        })
    }
}
