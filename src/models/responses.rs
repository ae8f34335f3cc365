//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::cache::StoreMode;

/// Response body for `GET /cache/:key`
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: Value,
    /// Seconds remaining, `-1` when the entry has no expiry
    pub ttl: i64,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: Value, ttl: i64) -> Self {
        Self {
            key: key.into(),
            value,
            ttl,
        }
    }
}

/// Response body for `PUT /cache`
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    pub message: String,
    pub key: String,
    /// TTL the entry was written with
    pub ttl: u64,
}

impl SetResponse {
    pub fn new(key: impl Into<String>, ttl: u64) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
            ttl,
        }
    }
}

/// Response body for `DELETE /cache/:key` and `DELETE /cache`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl DeleteResponse {
    pub fn key(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key: Some(key),
        }
    }

    pub fn cleared() -> Self {
        Self {
            message: "Cache cleared".to_string(),
            key: None,
        }
    }
}

/// Response body for every `POST /invalidate/...` route
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// The key or pattern that was invalidated
    pub target: String,
    /// Keys deleted by a pattern, or keys visited by a key cascade
    pub invalidated: u64,
}

impl InvalidateResponse {
    pub fn new(target: impl Into<String>, invalidated: u64) -> Self {
        Self {
            target: target.into(),
            invalidated,
        }
    }
}

/// Response body for the dependency routes
#[derive(Debug, Clone, Serialize)]
pub struct DependenciesResponse {
    pub key: String,
    pub dependents: Vec<String>,
}

impl DependenciesResponse {
    pub fn new(key: impl Into<String>, dependents: Vec<String>) -> Self {
        Self {
            key: key.into(),
            dependents,
        }
    }
}

/// Response body for `GET /stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub mode: StoreMode,
    pub backend: String,
    pub default_ttl: u64,
    /// Registered dependency edges in this process
    pub dependency_edges: usize,
    /// Raw store statistics, sorted by name
    pub store: BTreeMap<String, String>,
}

/// Response body for `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// "healthy" when connected, "degraded" otherwise
    pub status: String,
    pub mode: StoreMode,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn new(mode: StoreMode) -> Self {
        let status = match mode {
            StoreMode::Connected => "healthy",
            StoreMode::Degraded => "degraded",
        };
        Self {
            status: status.to_string(),
            mode,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_response_serialize() {
        let resp = GetResponse::new("task:1", json!({"title": "Fix printer"}), 120);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["key"], "task:1");
        assert_eq!(json["value"]["title"], "Fix printer");
        assert_eq!(json["ttl"], 120);
    }

    #[test]
    fn test_set_response_serialize() {
        let resp = SetResponse::new("my_key", 60);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("my_key"));
        assert!(json.contains("successfully"));
    }

    #[test]
    fn test_delete_response_variants() {
        let json = serde_json::to_value(DeleteResponse::key("gone")).unwrap();
        assert_eq!(json["key"], "gone");

        let json = serde_json::to_value(DeleteResponse::cleared()).unwrap();
        assert!(json.get("key").is_none());
        assert_eq!(json["message"], "Cache cleared");
    }

    #[test]
    fn test_health_response_reflects_mode() {
        let json = serde_json::to_value(HealthResponse::new(StoreMode::Connected)).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["mode"], "connected");
        assert!(json.get("timestamp").is_some());

        let json = serde_json::to_value(HealthResponse::new(StoreMode::Degraded)).unwrap();
        assert_eq!(json["status"], "degraded");
    }

    #[test]
    fn test_stats_response_serialize() {
        let resp = StatsResponse {
            mode: StoreMode::Degraded,
            backend: "none".to_string(),
            default_ttl: 3600,
            dependency_edges: 2,
            store: BTreeMap::new(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["mode"], "degraded");
        assert_eq!(json["dependency_edges"], 2);
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
