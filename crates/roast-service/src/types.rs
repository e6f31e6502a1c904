//! Request and response types for the roast service

use serde::{Deserialize, Serialize};

/// Body of both compare endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareRequest {
    pub user1: String,
    pub user2: String,
}

/// Batch endpoint response. Always sent with HTTP 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roast: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CompareResponse {
    pub fn roast(roast: String) -> Self {
        Self {
            success: true,
            roast: Some(roast),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            roast: None,
            message: Some(message.into()),
        }
    }
}

/// One element of a streamed comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Content(String),
    Error(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub cache: CacheStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
    pub hits: u64,
    pub misses: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response_omits_message() {
        let json = serde_json::to_value(CompareResponse::roast("<div/>".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "roast": "<div/>"}));
    }

    #[test]
    fn test_failure_response_omits_roast() {
        let json = serde_json::to_value(CompareResponse::failure("ghost does not exist")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "message": "ghost does not exist"})
        );
    }
}
