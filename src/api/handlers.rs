//! API Handlers
//!
//! HTTP request handlers for the local list, filter and cache endpoints.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::backend::{AuthSession, BackendFailure};
use crate::cache::{make_key, SharedCache, TtlCache};
use crate::config::Config;
use crate::error::{CoreError, Result};
use crate::filters::{
    decode, describe, encode, has_active_filters, merge, structural_hash, FilterSet,
    QueryParams, RecentFilter, RecentFilters,
};
use crate::lists::{
    BatchOutcome, ChangeBus, ImportOutcome, ListKind, ListRegistry, ListUpdate, PartRef, RawId,
    ToggleAction, ToggleOutcome,
};
use crate::models::{
    BatchAddRequest, CacheCompatibilityRequest, CacheKeyQuery, CacheSearchRequest, CacheSection,
    CacheStatsResponse, CacheWriteResponse, CachedValueResponse, ContainsResponse,
    DescribeRequest, DescribeResponse, EncodeResponse, FailureReport, FailureResponse,
    HealthResponse, ListResponse, MergeRequest, MutationResponse, PartsQuery, SummaryResponse,
};
use crate::storage::{FileStorage, MemoryStorage, Storage};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// One bounded list per list kind
    pub lists: ListRegistry,
    /// Recently applied filter sets
    pub recent_filters: RecentFilters,
    /// Memoized search results
    pub search_cache: SharedCache<Value>,
    /// Memoized compatibility results keyed by part-id set
    pub compatibility_cache: SharedCache<Value>,
    /// Persisted admin session
    pub session: AuthSession,
}

impl AppState {
    /// Creates a new AppState over the given storage.
    pub fn new(storage: Arc<dyn Storage>, config: &Config) -> Self {
        Self {
            lists: ListRegistry::new(storage.clone(), ChangeBus::new(), config),
            recent_filters: RecentFilters::new(storage.clone(), config.recent_filters_max),
            search_cache: TtlCache::shared(config.cache_ttl()),
            compatibility_cache: TtlCache::shared(config.cache_ttl()),
            session: AuthSession::new(storage),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Uses file storage when `storage_path` is set, in-memory storage otherwise.
    pub fn from_config(config: &Config) -> Result<Self> {
        let storage: Arc<dyn Storage> = match &config.storage_path {
            Some(path) => Arc::new(FileStorage::open(path)?),
            None => Arc::new(MemoryStorage::new()),
        };
        Ok(Self::new(storage, config))
    }
}

fn list_kind(raw: &str) -> Result<ListKind> {
    raw.parse()
}

/// Runs synchronous storage work on the blocking pool.
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| CoreError::Storage(format!("storage task failed: {}", e)))?
}

// == Lists ==

/// Handler for GET /lists/:kind
pub async fn list_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<ListResponse>> {
    let kind = list_kind(&kind)?;
    let list = state.lists.get(kind).clone();
    let max_items = list.max_items();
    let items = run_blocking(move || Ok(list.list())).await?;

    Ok(Json(ListResponse {
        kind,
        count: items.len(),
        max_items,
        items,
    }))
}

/// Handler for POST /lists/:kind
pub async fn add_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(part): Json<PartRef>,
) -> Result<Json<MutationResponse<ListUpdate>>> {
    let kind = list_kind(&kind)?;
    let list = state.lists.get(kind).clone();
    let update = run_blocking(move || list.add(&part)).await?;

    Ok(Json(MutationResponse::new(
        format!("Added to {}", kind),
        update,
    )))
}

/// Handler for DELETE /lists/:kind/:id
pub async fn remove_handler(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<MutationResponse<ListUpdate>>> {
    let kind = list_kind(&kind)?;
    let list = state.lists.get(kind).clone();
    let update = run_blocking(move || list.remove(RawId::Text(id))).await?;

    Ok(Json(MutationResponse::new(
        format!("Removed from {}", kind),
        update,
    )))
}

/// Handler for DELETE /lists/:kind
pub async fn clear_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<MutationResponse<ListUpdate>>> {
    let kind = list_kind(&kind)?;
    let list = state.lists.get(kind).clone();
    let update = run_blocking(move || list.clear()).await?;

    Ok(Json(MutationResponse::new(format!("Cleared {}", kind), update)))
}

/// Handler for GET /lists/:kind/contains/:id
pub async fn contains_handler(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<ContainsResponse>> {
    let kind = list_kind(&kind)?;
    let id = RawId::Text(id).normalize()?;

    let list = state.lists.get(kind).clone();
    let contains = run_blocking(move || Ok(list.contains(id))).await?;

    Ok(Json(ContainsResponse { id, contains }))
}

/// Handler for POST /lists/:kind/toggle
pub async fn toggle_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(part): Json<PartRef>,
) -> Result<Json<MutationResponse<ToggleOutcome>>> {
    let kind = list_kind(&kind)?;
    let list = state.lists.get(kind).clone();
    let outcome = run_blocking(move || list.toggle(&part)).await?;
    let message = match outcome.action {
        ToggleAction::Added => format!("Added to {}", kind),
        ToggleAction::Removed => format!("Removed from {}", kind),
    };

    Ok(Json(MutationResponse::new(message, outcome)))
}

/// Handler for POST /lists/:kind/batch
pub async fn batch_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(req): Json<BatchAddRequest>,
) -> Result<Json<MutationResponse<BatchOutcome>>> {
    let kind = list_kind(&kind)?;
    let list = state.lists.get(kind).clone();
    let outcome = run_blocking(move || list.add_many(&req.parts)).await?;

    let mut message = format!("Added {} parts", outcome.added);
    if outcome.skipped > 0 {
        message.push_str(&format!(", skipped {} already listed", outcome.skipped));
    }

    Ok(Json(MutationResponse::new(message, outcome)))
}

/// Handler for GET /lists/:kind/summary
pub async fn summary_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<SummaryResponse>> {
    let list = state.lists.get(list_kind(&kind)?).clone();

    let response = run_blocking(move || {
        Ok(SummaryResponse {
            summary: list.summary(),
            check_url: list.check_url(),
        })
    })
    .await?;
    Ok(Json(response))
}

/// Handler for GET /lists/:kind/export
///
/// Responds with the JSON document as an attachment.
pub async fn export_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Response> {
    let list = state.lists.get(list_kind(&kind)?).clone();
    let doc = run_blocking(move || list.export_list()).await?;

    let headers = [
        (header::CONTENT_TYPE, "application/json".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", doc.file_name),
        ),
    ];
    Ok((headers, doc.content).into_response())
}

/// Handler for POST /lists/:kind/import
///
/// The request body is the exported JSON document.
pub async fn import_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    body: String,
) -> Result<Json<MutationResponse<ImportOutcome>>> {
    let kind = list_kind(&kind)?;
    let list = state.lists.get(kind).clone();
    let outcome = run_blocking(move || list.import_list(&body)).await?;

    Ok(Json(MutationResponse::new(
        format!("Imported {} new parts", outcome.imported),
        outcome,
    )))
}

/// Handler for GET /lists/:kind/events
///
/// Server-sent events: one `snapshot` event with the current list, then one
/// per successful mutation of that list.
pub async fn events_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse> {
    let kind = list_kind(&kind)?;
    let list = state.lists.get(kind).clone();
    let max_items = list.max_items();
    let mut watcher = state.lists.bus().watch(list.key());

    let current = run_blocking(move || Ok(list.list())).await?;
    info!("Change stream opened for {}", kind);

    let stream = async_stream::stream! {
        let mut next = Some(current);

        while let Some(items) = next {
            let snapshot = ListResponse {
                kind,
                count: items.len(),
                max_items,
                items,
            };
            match serde_json::to_string(&snapshot) {
                Ok(json) => {
                    yield Ok::<_, Infallible>(Event::default().event("snapshot").data(json));
                }
                Err(e) => debug!("Failed to serialize list snapshot: {}", e),
            }

            next = watcher.next().await;
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

// == Filters ==

/// Handler for POST /filters/encode
pub async fn encode_handler(Json(filters): Json<FilterSet>) -> Json<EncodeResponse> {
    let params = encode(&filters);
    let query = params.to_query_string();

    Json(EncodeResponse { params, query })
}

/// Handler for GET /filters/decode
pub async fn decode_handler(Query(params): Query<QueryParams>) -> Json<FilterSet> {
    Json(decode(&params))
}

/// Handler for POST /filters/merge
pub async fn merge_handler(Json(req): Json<MergeRequest>) -> Json<FilterSet> {
    Json(merge(&req.base, &req.overlay))
}

/// Handler for POST /filters/describe
pub async fn describe_handler(Json(req): Json<DescribeRequest>) -> Json<DescribeResponse> {
    Json(DescribeResponse {
        description: describe(&req.filters, &req.fields),
        active: has_active_filters(&req.filters),
        hash: structural_hash(&req.filters),
        filters: req.filters.normalized(),
    })
}

/// Handler for GET /filters/recent
pub async fn recent_list_handler(State(state): State<AppState>) -> Result<Json<Vec<RecentFilter>>> {
    let recent = state.recent_filters.clone();
    let entries = run_blocking(move || Ok(recent.list())).await?;
    Ok(Json(entries))
}

/// Handler for POST /filters/recent
pub async fn recent_record_handler(
    State(state): State<AppState>,
    Json(req): Json<DescribeRequest>,
) -> Result<Json<Vec<RecentFilter>>> {
    let recent = state.recent_filters.clone();
    let entries = run_blocking(move || {
        recent.record(&req.filters, &req.fields)?;
        Ok(recent.list())
    })
    .await?;
    Ok(Json(entries))
}

/// Handler for DELETE /filters/recent
pub async fn recent_clear_handler(State(state): State<AppState>) -> Result<Json<Vec<RecentFilter>>> {
    let recent = state.recent_filters.clone();
    run_blocking(move || recent.clear()).await?;
    Ok(Json(Vec::new()))
}

// == Cache ==

/// Handler for PUT /cache/search
pub async fn cache_search_put_handler(
    State(state): State<AppState>,
    Json(req): Json<CacheSearchRequest>,
) -> Result<Json<CacheWriteResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CoreError::InvalidRequest(error_msg));
    }

    let mut cache = state.search_cache.write().await;
    cache.set(req.key.clone(), req.value);

    Ok(Json(CacheWriteResponse::new(req.key)))
}

/// Handler for GET /cache/search?key=
pub async fn cache_search_get_handler(
    State(state): State<AppState>,
    Query(query): Query<CacheKeyQuery>,
) -> Result<Json<CachedValueResponse>> {
    // Write lock: an expired entry is evicted on lookup
    let mut cache = state.search_cache.write().await;
    let value = cache
        .get(&query.key)
        .ok_or_else(|| CoreError::CacheMiss(query.key.clone()))?;

    Ok(Json(CachedValueResponse {
        key: query.key,
        value,
    }))
}

/// Handler for PUT /cache/compatibility
pub async fn cache_compatibility_put_handler(
    State(state): State<AppState>,
    Json(req): Json<CacheCompatibilityRequest>,
) -> Result<Json<CacheWriteResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CoreError::InvalidRequest(error_msg));
    }

    let key = make_key(&req.part_ids);
    let mut cache = state.compatibility_cache.write().await;
    cache.set(key.clone(), req.value);

    Ok(Json(CacheWriteResponse::new(key)))
}

/// Handler for GET /cache/compatibility?parts=3,1,2
pub async fn cache_compatibility_get_handler(
    State(state): State<AppState>,
    Query(query): Query<PartsQuery>,
) -> Result<Json<CachedValueResponse>> {
    let ids = query.part_ids().map_err(CoreError::InvalidRequest)?;
    let key = make_key(&ids);

    let mut cache = state.compatibility_cache.write().await;
    let value = cache
        .get(&key)
        .ok_or_else(|| CoreError::CacheMiss(key.clone()))?;

    Ok(Json(CachedValueResponse { key, value }))
}

/// Handler for GET /cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let search = {
        let cache = state.search_cache.read().await;
        CacheSection::new(cache.stats(), cache.ttl().as_secs())
    };
    let compatibility = {
        let cache = state.compatibility_cache.read().await;
        CacheSection::new(cache.stats(), cache.ttl().as_secs())
    };

    Json(CacheStatsResponse {
        search,
        compatibility,
    })
}

/// Handler for DELETE /cache
pub async fn cache_clear_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    state.search_cache.write().await.clear();
    state.compatibility_cache.write().await.clear();
    info!("Search and compatibility caches cleared");

    cache_stats_handler(State(state)).await
}

// == Backend ==

/// Handler for POST /backend/failure
///
/// Maps a failed catalog call to its user-facing message and drops the
/// stored session on 401.
pub async fn failure_handler(
    State(state): State<AppState>,
    Json(report): Json<FailureReport>,
) -> Result<Json<FailureResponse>> {
    let failure = BackendFailure::classify(
        report.status,
        report.body.as_deref(),
        report.transport_failed,
    );
    let session = state.session.clone();
    let outcome = failure.clone();
    let message = run_blocking(move || session.handle_failure(&outcome)).await?;

    Ok(Json(FailureResponse {
        message,
        status: failure.status(),
        requires_login: failure.requires_login(),
    }))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> AppState {
        AppState::new(Arc::new(MemoryStorage::new()), &Config::default())
    }

    #[tokio::test]
    async fn test_add_and_list_handler() {
        let state = test_state();

        let result = add_handler(
            State(state.clone()),
            Path("favorites".to_string()),
            Json(PartRef::new("5", "Widget")),
        )
        .await;
        assert_eq!(result.unwrap().outcome.count, 1);

        let response = list_handler(State(state), Path("favorites".to_string()))
            .await
            .unwrap();
        assert_eq!(response.items[0].id, 5);
        assert_eq!(response.max_items, 100);
    }

    #[tokio::test]
    async fn test_unknown_list_kind() {
        let result = list_handler(State(test_state()), Path("wishlist".to_string())).await;
        assert!(matches!(result, Err(CoreError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_remove_missing_item() {
        let result = remove_handler(
            State(test_state()),
            Path(("comparison".to_string(), "9".to_string())),
        )
        .await;
        assert!(matches!(result, Err(CoreError::NotPresent(9))));
    }

    #[tokio::test]
    async fn test_toggle_handler_message() {
        let state = test_state();
        let part = PartRef::new(3, "Board");

        let first = toggle_handler(
            State(state.clone()),
            Path("compatibility".to_string()),
            Json(part.clone()),
        )
        .await
        .unwrap();
        assert_eq!(first.message, "Added to compatibility");

        let second = toggle_handler(State(state), Path("compatibility".to_string()), Json(part))
            .await
            .unwrap();
        assert_eq!(second.outcome.action, ToggleAction::Removed);
    }

    #[tokio::test]
    async fn test_cache_compatibility_order_independent() {
        let state = test_state();

        cache_compatibility_put_handler(
            State(state.clone()),
            Json(CacheCompatibilityRequest {
                part_ids: vec![3, 1, 2],
                value: serde_json::json!({"compatible": true}),
            }),
        )
        .await
        .unwrap();

        let response = cache_compatibility_get_handler(
            State(state),
            Query(PartsQuery {
                parts: "2,3,1".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.key, "1,2,3");
        assert_eq!(response.value["compatible"], true);
    }

    #[tokio::test]
    async fn test_cache_search_miss() {
        let result = cache_search_get_handler(
            State(test_state()),
            Query(CacheKeyQuery {
                key: "q=cpu".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(CoreError::CacheMiss(_))));
    }

    #[tokio::test]
    async fn test_failure_handler_logs_out_on_401() {
        let state = test_state();
        state.session.set_token("expired").unwrap();

        let response = failure_handler(
            State(state.clone()),
            Json(FailureReport {
                status: Some(401),
                body: None,
                transport_failed: false,
            }),
        )
        .await
        .unwrap();

        assert!(response.requires_login);
        assert!(!state.session.is_authenticated());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_file_backed_handlers_run_off_the_runtime() {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = Arc::new(FileStorage::open(dir.path().join("state.json")).unwrap());
        let state = AppState::new(storage, &Config::default());

        let adds = (1..=3).map(|id| {
            let state = state.clone();
            tokio::spawn(async move {
                add_handler(
                    State(state),
                    Path("favorites".to_string()),
                    Json(PartRef::new(id, format!("Part {}", id))),
                )
                .await
                .map(|_| ())
            })
        });
        for handle in adds.collect::<Vec<_>>() {
            handle.await.unwrap().unwrap();
        }

        let response = list_handler(State(state), Path("favorites".to_string()))
            .await
            .unwrap();
        assert_eq!(response.count, 3);
    }

    #[tokio::test]
    async fn test_events_handler_rejects_unknown_kind() {
        let result = events_handler(State(test_state()), Path("wishlist".to_string())).await;
        assert!(matches!(result, Err(CoreError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
