//! Data types for GitHub API responses

use serde::{Deserialize, Serialize};

/// Public profile from `GET /users/{login}`
///
/// Only the fields worth logging are typed; everything else GitHub sends is
/// ignored. Repository listings are kept as raw JSON instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub id: Option<u64>,
    #[serde(default)]
    pub login: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    pub public_repos: Option<u64>,
    pub followers: Option<u64>,
    pub following: Option<u64>,
    pub created_at: Option<String>,
}

impl User {
    /// GitHub always assigns a numeric id to real accounts
    pub fn exists(&self) -> bool {
        self.id.is_some()
    }
}
