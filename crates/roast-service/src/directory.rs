//! Cache-backed GitHub lookups: login validation and repository listings

use crate::cache::{CacheKey, LookupCache};
use async_trait::async_trait;
use github_api::{GithubClient, GithubError, User};
use std::sync::Arc;
use tracing::{debug, warn};

/// Source of user profiles and repository listings
#[async_trait]
pub trait Directory: Send + Sync {
    /// `Ok(None)` when the directory definitively has no such user
    async fn get_entity(&self, login: &str) -> github_api::Result<Option<User>>;

    async fn list_resources(&self, login: &str) -> github_api::Result<serde_json::Value>;
}

#[async_trait]
impl Directory for GithubClient {
    async fn get_entity(&self, login: &str) -> github_api::Result<Option<User>> {
        self.get_user(login).await
    }

    async fn list_resources(&self, login: &str) -> github_api::Result<serde_json::Value> {
        self.list_repos(login).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedValue {
    User(bool),
    Repos(String),
}

/// GitHub logins are 1-39 ASCII alphanumerics or single hyphens, not
/// starting or ending with a hyphen. Underscores are also accepted for
/// Enterprise managed users (`jdoe_acme`).
pub fn is_valid_login(login: &str) -> bool {
    !login.is_empty()
        && login.len() <= 39
        && !login.starts_with('-')
        && !login.ends_with('-')
        && !login.contains("--")
        && login
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Identity validation and repository fetching over one shared cache
pub struct Lookups {
    cache: LookupCache<CachedValue>,
    directory: Arc<dyn Directory>,
}

impl Lookups {
    pub fn new(cache: LookupCache<CachedValue>, directory: Arc<dyn Directory>) -> Self {
        Self { cache, directory }
    }

    pub fn cache(&self) -> &LookupCache<CachedValue> {
        &self.cache
    }

    /// Whether `login` names a real GitHub account. Never fails.
    ///
    /// Both answers from the directory are cached; a transport failure is
    /// reported as `false` and not cached.
    pub async fn validate(&self, login: &str) -> bool {
        if !is_valid_login(login) {
            debug!(user = login, "Rejecting malformed login");
            return false;
        }

        let key = CacheKey::user(login);
        if let Some(CachedValue::User(exists)) = self.cache.get(&key).await {
            return exists;
        }

        match self.directory.get_entity(login).await {
            Ok(user) => {
                let exists = user.is_some_and(|u| u.exists());
                self.cache.set(&key, CachedValue::User(exists)).await;
                exists
            }
            Err(e) => {
                warn!(user = login, error = %e, "User lookup failed");
                false
            }
        }
    }

    /// Serialized public repository listing of `login`.
    ///
    /// Only successful fetches are cached; what to do with a failure is up
    /// to the caller.
    pub async fn fetch_repos(&self, login: &str) -> Result<String, GithubError> {
        let key = CacheKey::repos(login);
        if let Some(CachedValue::Repos(repos)) = self.cache.get(&key).await {
            return Ok(repos);
        }

        let repos = self.directory.list_resources(login).await?;
        let repos = serde_json::to_string(&repos)?;
        self.cache.set(&key, CachedValue::Repos(repos.clone())).await;
        Ok(repos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubDirectory;
    use std::time::Duration;

    fn lookups(directory: Arc<StubDirectory>) -> Lookups {
        Lookups::new(LookupCache::new(Duration::from_secs(300)), directory)
    }

    #[test]
    fn test_is_valid_login() {
        assert!(is_valid_login("octocat"));
        assert!(is_valid_login("real-user-1"));
        assert!(is_valid_login("jdoe_acme"));
        assert!(!is_valid_login(""));
        assert!(!is_valid_login("-octocat"));
        assert!(!is_valid_login("octo--cat"));
        assert!(!is_valid_login("octo/cat"));
        assert!(!is_valid_login(&"a".repeat(40)));
    }

    #[tokio::test]
    async fn test_validate_twice_hits_directory_once() {
        let directory = Arc::new(StubDirectory::new().with_user("octocat", "[]"));
        let lookups = lookups(directory.clone());

        assert!(lookups.validate("octocat").await);
        assert!(lookups.validate("octocat").await);
        assert_eq!(directory.entity_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_validate_after_ttl_refetches_once() {
        let directory = Arc::new(StubDirectory::new().with_user("octocat", "[]"));
        let lookups = lookups(directory.clone());

        assert!(lookups.validate("octocat").await);
        tokio::time::advance(Duration::from_secs(301)).await;

        assert!(lookups.validate("octocat").await);
        assert_eq!(directory.entity_calls(), 2);
        assert!(lookups.validate("octocat").await);
        assert_eq!(directory.entity_calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_user_is_cached_as_false() {
        let directory = Arc::new(StubDirectory::new());
        let lookups = lookups(directory.clone());

        assert!(!lookups.validate("ghost").await);
        assert!(!lookups.validate("ghost").await);
        assert_eq!(directory.entity_calls(), 1);
        assert_eq!(
            lookups.cache().get(&CacheKey::user("ghost")).await,
            Some(CachedValue::User(false))
        );
    }

    #[tokio::test]
    async fn test_lookup_failure_is_false_and_not_cached() {
        let directory = Arc::new(StubDirectory::new().with_failing_lookups());
        let lookups = lookups(directory.clone());

        assert!(!lookups.validate("octocat").await);
        assert!(!lookups.validate("octocat").await);
        assert_eq!(directory.entity_calls(), 2);
    }

    #[tokio::test]
    async fn test_malformed_login_skips_directory() {
        let directory = Arc::new(StubDirectory::new());
        let lookups = lookups(directory.clone());

        assert!(!lookups.validate("../admin").await);
        assert_eq!(directory.entity_calls(), 0);
    }

    #[tokio::test]
    async fn test_managed_user_login_reaches_directory() {
        let directory = Arc::new(StubDirectory::new().with_user("jdoe_acme", "[]"));
        let lookups = lookups(directory.clone());

        assert!(lookups.validate("jdoe_acme").await);
        assert_eq!(directory.entity_calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_repos_is_cached() {
        let directory =
            Arc::new(StubDirectory::new().with_user("octocat", r#"[{"name":"hello"}]"#));
        let lookups = lookups(directory.clone());

        let first = lookups.fetch_repos("octocat").await.unwrap();
        let second = lookups.fetch_repos("octocat").await.unwrap();
        assert_eq!(first, r#"[{"name":"hello"}]"#);
        assert_eq!(first, second);
        assert_eq!(directory.repo_calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_repos_failure_is_not_cached() {
        let directory = Arc::new(
            StubDirectory::new()
                .with_user("octocat", "[]")
                .with_failing_repos(),
        );
        let lookups = lookups(directory.clone());

        assert!(lookups.fetch_repos("octocat").await.is_err());
        assert!(lookups.fetch_repos("octocat").await.is_err());
        assert_eq!(directory.repo_calls(), 2);
        assert!(!lookups.cache().contains(&CacheKey::repos("octocat")));
    }
}
