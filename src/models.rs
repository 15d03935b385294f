use serde::{Deserialize, Serialize};

/// A shortened URL record.
///
/// `id` always starts with `root_key`; the trailing base-36 suffix tells
/// colliding URLs under the same root apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UrlEntry {
    pub id: String,
    pub root_key: String,
    pub url: String,
}

impl UrlEntry {
    pub fn new(id: impl Into<String>, root_key: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            root_key: root_key.into(),
            url: url.into(),
        }
    }
}

/// Caller-supplied cursor request for `GET /entries`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationRequest {
    pub page_size: Option<i64>,
    pub last_key: Option<String>,
}

/// One page of entries. `last_key` is only set when more entries follow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResult {
    pub items: Vec<UrlEntry>,
    pub num_items: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_key: Option<String>,
}

/// Body of `POST /entries`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateEntryRequest {
    pub url: Option<String>,
}
