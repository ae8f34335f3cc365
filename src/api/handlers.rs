//! API Handlers
//!
//! HTTP request handlers for the admin endpoints. All cache access goes
//! through the shared [`CacheLayer`].

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::cache::CacheKeys;
use crate::error::{CacheError, Result};
use crate::layer::CacheLayer;
use crate::models::{
    DeleteResponse, DependenciesResponse, DependencyRequest, GetResponse, HealthResponse,
    InvalidateResponse, PatternRequest, SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: CacheLayer,
}

impl AppState {
    pub fn new(cache: CacheLayer) -> Self {
        Self { cache }
    }

    /// Creates the state from configuration, connecting in the background.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(CacheLayer::spawn(&config.cache))
    }
}

fn require_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidRequest("Key cannot be empty".to_string()));
    }
    Ok(())
}

/// Handler for PUT /cache
///
/// Stores any JSON value. Answers 503 while the store is not connected.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let manager = state.cache.manager();
    if !manager.is_connected() {
        return Err(CacheError::Unavailable(
            "Cache store is not connected".to_string(),
        ));
    }

    let ttl = req.ttl.unwrap_or_else(|| manager.default_ttl());
    manager.set(&req.key, &req.value, Some(ttl)).await;

    Ok(Json(SetResponse::new(req.key, ttl)))
}

/// Handler for GET /cache/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    require_key(&key)?;

    let manager = state.cache.manager();
    let value: Value = manager
        .get(&key)
        .await
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;
    let ttl = manager.get_ttl(&key).await;

    Ok(Json(GetResponse::new(key, value, ttl)))
}

/// Handler for DELETE /cache/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    require_key(&key)?;

    state.cache.manager().delete(&key).await;
    Ok(Json(DeleteResponse::key(key)))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<DeleteResponse> {
    state.cache.manager().clear().await;
    info!("Cache cleared via admin API");
    Json(DeleteResponse::cleared())
}

/// Handler for POST /invalidate/key/:key
///
/// Deletes the key and every registered dependent.
pub async fn invalidate_key_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<InvalidateResponse>> {
    require_key(&key)?;

    let invalidated = state.cache.invalidation().invalidate(&key).await;
    Ok(Json(InvalidateResponse::new(key, invalidated as u64)))
}

/// Handler for POST /invalidate/pattern
pub async fn invalidate_pattern_handler(
    State(state): State<AppState>,
    Json(req): Json<PatternRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let invalidated = state
        .cache
        .invalidation()
        .invalidate_pattern(&req.pattern)
        .await;
    Ok(Json(InvalidateResponse::new(req.pattern, invalidated)))
}

/// Handler for POST /invalidate/domain/:domain
pub async fn invalidate_domain_handler(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<Json<InvalidateResponse>> {
    require_key(&domain)?;

    let invalidation = state.cache.invalidation();
    let invalidated = invalidation.invalidate_domain(&domain).await;
    Ok(Json(InvalidateResponse::new(
        CacheKeys::domain_pattern(&domain),
        invalidated,
    )))
}

/// Handler for POST /invalidate/domain/:domain/:id
pub async fn invalidate_entity_handler(
    State(state): State<AppState>,
    Path((domain, id)): Path<(String, String)>,
) -> Result<Json<InvalidateResponse>> {
    require_key(&domain)?;
    require_key(&id)?;

    let invalidation = state.cache.invalidation();
    let invalidated = invalidation.invalidate_entity(&domain, &id).await;
    Ok(Json(InvalidateResponse::new(
        CacheKeys::entity_pattern(&domain, &id),
        invalidated,
    )))
}

/// Handler for POST /dependencies
pub async fn register_dependency_handler(
    State(state): State<AppState>,
    Json(req): Json<DependencyRequest>,
) -> Result<Json<DependenciesResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let invalidation = state.cache.invalidation();
    invalidation.register_dependency(&req.parent, &req.dependent);
    let dependents = invalidation.get_dependencies(&req.parent);

    Ok(Json(DependenciesResponse::new(req.parent, dependents)))
}

/// Handler for GET /dependencies/:key
pub async fn dependencies_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DependenciesResponse>> {
    require_key(&key)?;

    let dependents = state.cache.invalidation().get_dependencies(&key);
    Ok(Json(DependenciesResponse::new(key, dependents)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let manager = state.cache.manager();
    let store = manager.get_stats().await.into_iter().collect();

    Json(StatsResponse {
        mode: manager.mode(),
        backend: manager.backend_name().to_string(),
        default_ttl: manager.default_ttl(),
        dependency_edges: state.cache.invalidation().edge_count(),
        store,
    })
}

/// Handler for GET /health
///
/// Always 200; a degraded store is reported in the body.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::new(state.cache.manager().mode()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheManager, StoreMode};
    use crate::config::DEFAULT_TTL_SECS;
    use serde_json::json;
    use std::sync::Arc;

    fn memory_state() -> AppState {
        AppState::new(CacheLayer::in_memory(DEFAULT_TTL_SECS))
    }

    fn degraded_state() -> AppState {
        let manager = Arc::new(CacheManager::disabled(DEFAULT_TTL_SECS));
        AppState::new(CacheLayer::from_manager(manager))
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = memory_state();

        let req = SetRequest {
            key: "task:1".to_string(),
            value: json!({"title": "Reset VPN token"}),
            ttl: Some(90),
        };
        let response = set_handler(State(state.clone()), Json(req)).await.unwrap();
        assert_eq!(response.ttl, 90);

        let response = get_handler(State(state), Path("task:1".to_string()))
            .await
            .unwrap();
        assert_eq!(response.value, json!({"title": "Reset VPN token"}));
        assert!(response.ttl > 0 && response.ttl <= 90);
    }

    #[tokio::test]
    async fn test_set_uses_default_ttl() {
        let state = memory_state();
        let req = SetRequest {
            key: "k".to_string(),
            value: json!(1),
            ttl: None,
        };
        let response = set_handler(State(state), Json(req)).await.unwrap();
        assert_eq!(response.ttl, DEFAULT_TTL_SECS);
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let result = get_handler(State(memory_state()), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_set_rejected_when_degraded() {
        let req = SetRequest {
            key: "k".to_string(),
            value: json!(1),
            ttl: None,
        };
        let result = set_handler(State(degraded_state()), Json(req)).await;
        assert!(matches!(result, Err(CacheError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_set_invalid_request() {
        let req = SetRequest {
            key: "".to_string(),
            value: json!("value"),
            ttl: None,
        };
        let result = set_handler(State(memory_state()), Json(req)).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_invalidate_key_cascades() {
        let state = memory_state();
        let manager = state.cache.manager().clone();
        manager.set("project:42", &"p", None).await;
        manager.set("task:list:42", &"l", None).await;
        state
            .cache
            .invalidation()
            .register_dependency("project:42", "task:list:42");

        let response = invalidate_key_handler(State(state), Path("project:42".to_string()))
            .await
            .unwrap();
        assert_eq!(response.invalidated, 2);
        assert!(!manager.exists("task:list:42").await);
    }

    #[tokio::test]
    async fn test_invalidate_entity_handler() {
        let state = memory_state();
        let manager = state.cache.manager().clone();
        manager.set("form:f1:template", &"t", None).await;
        manager.set("form:f2:template", &"t", None).await;

        let response = invalidate_entity_handler(
            State(state),
            Path(("form".to_string(), "f1".to_string())),
        )
        .await
        .unwrap();
        assert_eq!(response.target, "form:f1:*");
        assert_eq!(response.invalidated, 1);
        assert!(manager.exists("form:f2:template").await);
    }

    #[tokio::test]
    async fn test_register_and_list_dependencies() {
        let state = memory_state();
        let req = DependencyRequest {
            parent: "project:42".to_string(),
            dependent: "project:42:members".to_string(),
        };
        register_dependency_handler(State(state.clone()), Json(req))
            .await
            .unwrap();

        let response = dependencies_handler(State(state), Path("project:42".to_string()))
            .await
            .unwrap();
        assert_eq!(response.dependents, vec!["project:42:members".to_string()]);
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = memory_state();
        state.cache.invalidation().register_dependency("a", "b");

        let response = stats_handler(State(state)).await;
        assert_eq!(response.mode, StoreMode::Connected);
        assert_eq!(response.backend, "memory");
        assert_eq!(response.dependency_edges, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler(State(memory_state())).await;
        assert_eq!(response.status, "healthy");

        let response = health_handler(State(degraded_state())).await;
        assert_eq!(response.status, "degraded");
    }
}
