use crate::{
    engine::{to_base36, RootHasher},
    errors::ApiError,
    models::UrlEntry,
    store::EntryStore,
};

/// Outcome of submitting a URL for shortening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    /// The URL was already stored; nothing was written.
    Existing(UrlEntry),
    /// A new entry was saved.
    Created(UrlEntry),
}

impl Assignment {
    pub fn entry(&self) -> &UrlEntry {
        match self {
            Assignment::Existing(entry) | Assignment::Created(entry) => entry,
        }
    }

    pub fn into_entry(self) -> UrlEntry {
        match self {
            Assignment::Existing(entry) | Assignment::Created(entry) => entry,
        }
    }
}

/// Assign a short id to `url`, or return the one it already has.
///
/// The id is `root + base36(n)` where `n` counts stored ids that already
/// start with `root`. Lookup, count and save are separate store calls with
/// no transaction around them: two concurrent creates under one root can
/// read the same `n`. The store then refuses the second save. If the URL
/// itself was saved in the meantime the stored entry is returned; a clash on
/// the id alone is reported as `ApiError::Conflict`, without retrying.
pub async fn assign(
    store: &dyn EntryStore,
    hasher: &dyn RootHasher,
    url: &str,
) -> Result<Assignment, ApiError> {
    if let Some(existing) = store.find_one_by_url(url).await? {
        tracing::debug!(id = %existing.id, "URL already shortened");
        return Ok(Assignment::Existing(existing));
    }

    let root = hasher.generate_hash(url);
    let collisions = store.count_all_by_root(&root).await?;
    let id = format!("{root}{}", to_base36(collisions));
    let entry = UrlEntry::new(id, root, url);

    if !store.save(&entry).await? {
        if let Some(existing) = store.find_one_by_url(url).await? {
            tracing::debug!(id = %existing.id, "URL saved by a concurrent request");
            return Ok(Assignment::Existing(existing));
        }
        tracing::warn!(id = %entry.id, "Store rejected assigned id");
        return Err(ApiError::Conflict(entry.id));
    }

    tracing::info!(id = %entry.id, root = %entry.root_key, collisions, "Short url created");
    Ok(Assignment::Created(entry))
}
