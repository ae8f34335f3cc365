//! Request DTOs for the admin API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

/// Maximum accepted key or pattern length
const MAX_KEY_LENGTH: usize = 512;

/// Maximum accepted TTL: one year
const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

fn validate_key(field: &str, key: &str) -> Option<String> {
    if key.is_empty() {
        return Some(format!("{} cannot be empty", field));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "{} exceeds maximum length of {} characters",
            field, MAX_KEY_LENGTH
        ));
    }
    None
}

/// Request body for `PUT /cache`
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    pub key: String,
    /// Any JSON value, stored as-is
    pub value: Value,
    /// TTL in seconds; the manager default when absent
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl SetRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if let Some(error) = validate_key("Key", &self.key) {
            return Some(error);
        }
        match self.ttl {
            Some(0) => Some("TTL must be at least 1 second".to_string()),
            Some(ttl) if ttl > MAX_TTL_SECS => Some(format!(
                "TTL cannot exceed {} seconds",
                MAX_TTL_SECS
            )),
            _ => None,
        }
    }
}

/// Request body for `POST /invalidate/pattern`
#[derive(Debug, Clone, Deserialize)]
pub struct PatternRequest {
    pub pattern: String,
}

impl PatternRequest {
    pub fn validate(&self) -> Option<String> {
        validate_key("Pattern", &self.pattern)
    }
}

/// Request body for `POST /dependencies`
#[derive(Debug, Clone, Deserialize)]
pub struct DependencyRequest {
    pub parent: String,
    pub dependent: String,
}

impl DependencyRequest {
    pub fn validate(&self) -> Option<String> {
        if let Some(error) = validate_key("Parent", &self.parent) {
            return Some(error);
        }
        if let Some(error) = validate_key("Dependent", &self.dependent) {
            return Some(error);
        }
        if self.parent == self.dependent {
            return Some("A key cannot depend on itself".to_string());
        }
        None
    }
}
