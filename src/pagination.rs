use crate::models::{PaginationRequest, PaginationResult, UrlEntry};

/// Page size used when the caller omits one or sends a non-positive value.
pub const DEFAULT_PAGE_SIZE: usize = 10;

impl PaginationRequest {
    pub fn new(page_size: Option<i64>, last_key: Option<String>) -> Self {
        Self {
            page_size,
            last_key,
        }
    }

    /// The page size actually applied to the scan.
    pub fn effective_page_size(&self) -> usize {
        match self.page_size {
            Some(n) if n > 0 => usize::try_from(n).unwrap_or(usize::MAX),
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    /// The resume cursor, if one was supplied. Empty strings count as absent.
    pub fn cursor(&self) -> Option<&str> {
        self.last_key.as_deref().filter(|key| !key.is_empty())
    }

    /// How many rows a backend should fetch past the cursor: one more than
    /// the page so it can tell whether another page follows.
    pub fn window_len(&self) -> usize {
        self.effective_page_size().saturating_add(1)
    }
}

/// Turn the entries following the resume point into a page.
///
/// `window` may hold more than `page_size` entries; any surplus only signals
/// that another page exists and is dropped from the result.
pub fn page_from_window(mut window: Vec<UrlEntry>, page_size: usize) -> PaginationResult {
    let has_more = window.len() > page_size;
    window.truncate(page_size);

    let last_key = if has_more {
        window.last().map(|entry| entry.id.clone())
    } else {
        None
    };

    PaginationResult {
        num_items: window.len(),
        items: window,
        last_key,
    }
}

/// Paginate an insertion-ordered slice of entries.
///
/// A cursor that matches no entry is ignored and the scan starts from the
/// first entry.
pub fn paginate(entries: &[UrlEntry], request: &PaginationRequest) -> PaginationResult {
    let start = request
        .cursor()
        .and_then(|key| entries.iter().position(|entry| entry.id == key))
        .map(|idx| idx + 1)
        .unwrap_or(0);

    let window = entries[start..]
        .iter()
        .take(request.window_len())
        .cloned()
        .collect();

    page_from_window(window, request.effective_page_size())
}
