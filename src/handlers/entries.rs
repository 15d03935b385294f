use crate::{
    assigner::{self, Assignment},
    engine,
    errors::ApiError,
    models::{CreateEntryRequest, PaginationRequest, PaginationResult, UrlEntry},
    AppState,
};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::{collections::HashMap, sync::Arc};

/// GET /entries?pageSize=&lastKey=
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<PaginationResult>, ApiError> {
    let pagination = extract_page_info(&params);
    let page = state.store.find_all(&pagination).await?;
    tracing::debug!(num_items = page.num_items, more = page.last_key.is_some(), "Listed entries");
    Ok(Json(page))
}

/// GET /entries/:id
///
/// Also mounted on `/entries/` so a missing id gets the API's own error
/// rather than a bare 404 from the router.
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    id: Option<Path<String>>,
) -> Result<Json<UrlEntry>, ApiError> {
    let id = id
        .map(|Path(id)| id)
        .filter(|id| !id.trim().is_empty())
        .ok_or(ApiError::IdNotProvided)?;

    find_entry(&state, &id).await.map(Json)
}

/// POST /entries
///
/// 201 with the new entry, or 200 with the existing one when the URL was
/// shortened before.
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    // Any body without a usable "url" string, malformed JSON included, is
    // treated as a missing URL.
    let url = serde_json::from_slice::<CreateEntryRequest>(&body)
        .ok()
        .and_then(|req| req.url)
        .filter(|url| !url.is_empty())
        .ok_or(ApiError::UrlNotSpecified)?;

    if !engine::validate_url(&url) {
        return Err(ApiError::UrlFormat);
    }

    let assignment =
        assigner::assign(state.store.as_ref(), state.hasher.as_ref(), &url).await?;
    let status = match assignment {
        Assignment::Existing(_) => StatusCode::OK,
        Assignment::Created(_) => StatusCode::CREATED,
    };
    tracing::debug!(id = %assignment.entry().id, %status, "Create request handled");

    let entry = assignment.into_entry();
    state.cache.set(&entry);
    Ok((status, Json(entry)).into_response())
}

/// Resolve an id through the cache, falling back to the store.
pub(crate) async fn find_entry(state: &AppState, id: &str) -> Result<UrlEntry, ApiError> {
    if let Some(entry) = state.cache.get(id) {
        return Ok(entry);
    }

    match state.store.find_one(id).await? {
        Some(entry) => {
            // Backfill the cache for next time
            state.cache.set(&entry);
            tracing::debug!(id, cached = state.cache.len(), "Cache backfilled");
            Ok(entry)
        }
        None => Err(ApiError::NotFound(id.to_owned())),
    }
}

/// Unparseable page sizes and empty cursors count as absent.
fn extract_page_info(params: &HashMap<String, String>) -> PaginationRequest {
    let page_size = params
        .get("pageSize")
        .and_then(|v| v.trim().parse::<i64>().ok());
    let last_key = params.get("lastKey").filter(|v| !v.is_empty()).cloned();
    PaginationRequest::new(page_size, last_key)
}
