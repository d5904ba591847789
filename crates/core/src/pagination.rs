//! Page-walking decisions for "return all" listings
//!
//! Pure functions that drive the shell's page loop: which query to send for a page,
//! which items a page contributes, and whether another page should be fetched.
//! Mixpost list responses look like `{"data": [...], "meta": {"current_page", "last_page", ...}}`.

use serde_json::{Map, Value};

use crate::types::PaginationMeta;

/// Page size used while walking every page
pub const PAGE_SIZE: u32 = 50;

/// Upper bound on pages fetched by one walk
pub const DEFAULT_MAX_PAGES: u32 = 1000;

/// What the walker does after receiving page `page`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStep {
    /// Fetch this page next
    Next(u32),
    /// The server reported the last page
    Done,
    /// The response carried no usable `meta`; stop with what was collected
    MissingMeta,
    /// Another page is needed but the walk already fetched `max_pages` pages
    LimitReached,
}

/// Query for page `page`: the caller's query plus `page` and `per_page`.
pub fn page_query(base: &Map<String, Value>, page: u32) -> Map<String, Value> {
    let mut query = base.clone();
    query.insert("page".into(), Value::from(page));
    query.insert("per_page".into(), Value::from(PAGE_SIZE));
    query
}

/// Items contributed by one response; anything but a `data` array contributes nothing.
pub fn page_items(response: &Value) -> Vec<Value> {
    response
        .get("data")
        .and_then(|d| d.as_array())
        .cloned()
        .unwrap_or_default()
}

/// Pagination metadata of a response, if it is well formed.
pub fn page_meta(response: &Value) -> Option<PaginationMeta> {
    response
        .get("meta")
        .and_then(|m| serde_json::from_value(m.clone()).ok())
}

/// Decide the next step after fetching `page`.
pub fn next_step(page: u32, response: &Value, max_pages: u32) -> PageStep {
    let Some(meta) = page_meta(response) else {
        return PageStep::MissingMeta;
    };

    if meta.current_page >= meta.last_page {
        PageStep::Done
    } else if page >= max_pages {
        PageStep::LimitReached
    } else {
        PageStep::Next(page + 1)
    }
}
