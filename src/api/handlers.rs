//! API Handlers
//!
//! HTTP request handlers exposing the cache manager to local data-access
//! services and operators.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::cache::{CacheManager, CacheSize, CacheStatsReport, HealthReport};
use crate::error::{CacheError, Result};
use crate::models::{
    GetResponse, KeyResponse, OperationResponse, PatternQuery, PatternResponse, SetRequest,
};

/// Application state shared across all handlers.
///
/// Holds the process-wide cache manager. The manager synchronizes itself,
/// so handlers only need a shared reference.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CacheManager>,
}

impl AppState {
    pub fn new(cache: Arc<CacheManager>) -> Self {
        Self { cache }
    }
}

/// Handler for GET /cache/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let data = state
        .cache
        .get_value(&key)
        .await
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, data)))
}

/// Handler for PUT /cache/:key
///
/// Stores the JSON payload with an optional TTL in milliseconds.
pub async fn set_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<SetRequest>,
) -> Result<Json<KeyResponse>> {
    if let Some(error_msg) = req.validate(&key) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let success = state.cache.set_value(&key, req.data, req.ttl).await;

    Ok(Json(KeyResponse::new(key, success)))
}

/// Handler for DELETE /cache/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<KeyResponse> {
    let success = state.cache.invalidate(&key).await;
    Json(KeyResponse::new(key, success))
}

/// Handler for DELETE /cache?pattern=...
pub async fn invalidate_pattern_handler(
    State(state): State<AppState>,
    Query(query): Query<PatternQuery>,
) -> Result<Json<PatternResponse>> {
    if query.pattern.is_empty() {
        return Err(CacheError::InvalidRequest(
            "Pattern cannot be empty".to_string(),
        ));
    }

    let removed = state.cache.invalidate_pattern(&query.pattern).await;

    Ok(Json(PatternResponse::new(query.pattern, removed)))
}

/// Handler for POST /cache/clear
pub async fn clear_handler(State(state): State<AppState>) -> Json<OperationResponse> {
    let success = state.cache.clear_all().await;
    Json(OperationResponse::new("clear", success))
}

/// Handler for POST /cache/warmup
pub async fn warmup_handler(State(state): State<AppState>) -> Json<OperationResponse> {
    let success = state.cache.warmup().await;
    Json(OperationResponse::new("warmup", success))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheStatsReport> {
    Json(state.cache.get_stats().await)
}

/// Handler for GET /size
pub async fn size_handler(State(state): State<AppState>) -> Json<CacheSize> {
    Json(state.cache.get_cache_size().await)
}

/// Handler for GET /health
///
/// Answers 503 when the cache is unhealthy so probes can act on the status
/// code alone.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = state.cache.health_check().await;
    let status = if report.is_unhealthy() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (status, Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::HealthStatus;
    use crate::config::Config;
    use crate::persistence::InMemoryStore;
    use serde_json::json;

    fn state() -> AppState {
        let cache = CacheManager::new(&Config::default(), Arc::new(InMemoryStore::new()));
        AppState::new(Arc::new(cache))
    }

    fn set_request(data: serde_json::Value) -> SetRequest {
        SetRequest { data, ttl: None }
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = state();

        let result = set_handler(
            State(state.clone()),
            Path("teamA".to_string()),
            Json(set_request(json!({"wins": 5}))),
        )
        .await;
        assert!(result.unwrap().success);

        let response = get_handler(State(state), Path("teamA".to_string()))
            .await
            .unwrap();
        assert_eq!(response.data, json!({"wins": 5}));
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let result = get_handler(State(state()), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = state();
        set_handler(
            State(state.clone()),
            Path("to_delete".to_string()),
            Json(set_request(json!(1))),
        )
        .await
        .unwrap();

        let response = delete_handler(State(state.clone()), Path("to_delete".to_string())).await;
        assert!(response.success);

        let result = get_handler(State(state), Path("to_delete".to_string())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_invalidate_pattern_handler() {
        let state = state();
        for key in ["player-1", "player-2", "team-1"] {
            state.cache.set(key, &json!(key), None).await;
        }

        let response = invalidate_pattern_handler(
            State(state.clone()),
            Query(PatternQuery {
                pattern: "player-*".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.removed, 2);
        assert!(state.cache.is_resident("team-1").await);
    }

    #[tokio::test]
    async fn test_empty_pattern_rejected() {
        let result = invalidate_pattern_handler(
            State(state()),
            Query(PatternQuery {
                pattern: String::new(),
            }),
        )
        .await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_clear_and_stats_handlers() {
        let state = state();
        state.cache.set("k", &json!(1), None).await;

        assert!(clear_handler(State(state.clone())).await.success);

        let stats = stats_handler(State(state.clone())).await;
        assert_eq!(stats.sets, 0);
        assert_eq!(size_handler(State(state)).await.items, 0);
    }

    #[tokio::test]
    async fn test_warmup_handler() {
        let response = warmup_handler(State(state())).await;
        assert!(response.success);
    }

    #[tokio::test]
    async fn test_health_handler_degraded_when_empty() {
        let (status, report) = health_handler(State(state())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report.status, HealthStatus::Degraded);
    }

    #[tokio::test]
    async fn test_set_invalid_request() {
        let result = set_handler(
            State(state()),
            Path("".to_string()),
            Json(set_request(json!(1))),
        )
        .await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }
}
