use crate::{errors::ApiError, handlers::entries::find_entry, AppState};
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// GET /:id
///
/// Send the visitor on to the stored URL with a 307. Paths are stored
/// verbatim, so a URL that is not a valid header value gets a 422 instead.
pub async fn redirect(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let entry = find_entry(&state, &id).await?;
    let location = HeaderValue::try_from(entry.url.as_str()).map_err(|_| {
        tracing::warn!(id = %entry.id, "Stored URL is not a valid Location header");
        ApiError::Unredirectable(entry.id.clone())
    })?;

    tracing::debug!(id = %entry.id, "Redirecting to {}", entry.url);
    Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response())
}
