//! Rust client for the subset of the GitHub REST API used to look up users
//!
//! Only two endpoints are covered:
//!
//! - `GET /users/{login}` - Public profile of a user or organization
//! - `GET /users/{login}/repos` - Public repositories owned by that account
//!
//! # Example
//!
//! ```no_run
//! use github_api::{GithubClient, GithubOptions};
//!
//! # async fn example() -> Result<(), github_api::GithubError> {
//! let client = GithubClient::new(GithubOptions::default())?;
//!
//! if let Some(user) = client.get_user("octocat").await? {
//!     println!("{} has {:?} public repos", user.login, user.public_repos);
//! }
//!
//! let repos = client.list_repos("octocat").await?;
//! println!("{}", repos);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod types;

pub use client::{GithubClient, GithubOptions};
pub use error::{GithubError, Result};
pub use types::User;
