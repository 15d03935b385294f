use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures raised by an `EntryStore` backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Everything a handler can answer with besides success.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Id not provided.")]
    IdNotProvided,

    #[error("Short url of id: {0} not found.")]
    NotFound(String),

    #[error("URL not specified.")]
    UrlNotSpecified,

    #[error("URL formatting error. Expect start with either http:// or https://")]
    UrlFormat,

    /// The store refused the assigned id, typically because a concurrent
    /// create under the same root saved it first.
    #[error("Short url of id: {0} already exists.")]
    Conflict(String),

    /// The stored URL cannot be sent as a `Location` header, e.g. it
    /// contains control characters.
    #[error("Short url of id: {0} cannot be redirected.")]
    Unredirectable(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::IdNotProvided | ApiError::UrlNotSpecified | ApiError::UrlFormat => {
                StatusCode::FORBIDDEN
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unredirectable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Store(e) => {
                tracing::error!("Store error: {:?}", e);
                "Internal error".to_owned()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
