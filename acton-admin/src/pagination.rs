//! Offset/limit pagination codec
//!
//! Converts the raw `offset` / `limit` query parameters into a
//! [`PaginationWindow`] and turns a window plus the repository's total count
//! into a [`PaginationResult`] with next/previous links.
//!
//! Links are built by copying the current query parameters and replacing only
//! `offset`, so sorting, text filters and unknown parameters survive paging.
//!
//! # Example
//!
//! ```rust
//! use acton_admin::pagination::{build_pagination_result, PaginationWindow};
//! use acton_admin::query::QueryParams;
//!
//! let query = QueryParams::parse("offset=3&limit=3&sorting=-label");
//! let window = PaginationWindow::decode(&query, 10).unwrap();
//! let page = build_pagination_result(window, 10, &query, "/admin/my-model/");
//!
//! assert_eq!(page.range, (3, 6));
//! assert_eq!(page.next.unwrap().url, "/admin/my-model/?limit=3&sorting=-label&offset=6");
//! assert_eq!(page.previous.unwrap().offset, 0);
//! ```

use serde::Serialize;

use crate::error::QueryError;
use crate::query::QueryParams;

/// Query parameter carrying the first item index
pub const OFFSET_PARAM: &str = "offset";

/// Query parameter carrying the page size
pub const LIMIT_PARAM: &str = "limit";

/// Requested slice of a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationWindow {
    /// Number of items to skip
    pub offset: u64,
    /// Maximum number of items to return
    pub limit: u64,
}

impl PaginationWindow {
    /// Create a window
    #[must_use]
    pub const fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// Decode `offset` and `limit` from the request's query parameters
    ///
    /// Absent parameters fall back to `0` and `default_limit`. Present but
    /// malformed values (not a non-negative integer) are a client error and
    /// are never replaced by the default.
    ///
    /// `limit=0` decodes successfully; rejecting it is the list view's job.
    pub fn decode(query: &QueryParams, default_limit: u64) -> Result<Self, QueryError> {
        let offset = parse_param(query, OFFSET_PARAM, 0)?;
        let limit = parse_param(query, LIMIT_PARAM, default_limit)?;
        Ok(Self { offset, limit })
    }

    /// `offset + limit`, saturating
    pub const fn end(&self) -> u64 {
        self.offset.saturating_add(self.limit)
    }
}

fn parse_param(query: &QueryParams, name: &'static str, default: u64) -> Result<u64, QueryError> {
    match query.get(name) {
        None => Ok(default),
        Some(raw) => raw.parse::<u64>().map_err(|_| QueryError::MalformedInteger {
            name,
            value: raw.to_string(),
        }),
    }
}

/// Navigation link to another page of the same list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
    /// Offset the link points at
    pub offset: u64,
    /// Current route URL with the rewritten query string
    pub url: String,
}

/// Rendered pagination state for one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationResult {
    /// Total number of matching items reported by the repository
    pub total: u64,
    /// Offset of the current page
    pub offset: u64,
    /// Page size
    pub limit: u64,
    /// Half-open `[offset, min(offset + limit, total))` range shown
    ///
    /// The start is the raw offset even when it lies past `total`, so the
    /// range may be empty with `range.0 > range.1`.
    pub range: (u64, u64),
    /// Link to the following page, present iff `offset + limit < total`
    pub next: Option<PageLink>,
    /// Link to the preceding page, present iff `offset - limit >= 0`
    pub previous: Option<PageLink>,
}

impl PaginationResult {
    /// Number of items the range covers
    pub fn shown(&self) -> u64 {
        self.range.1.saturating_sub(self.range.0)
    }

    /// Whether the range covers no items
    pub fn is_empty(&self) -> bool {
        self.shown() == 0
    }
}

/// Build next/previous links for `window` over `total` items
///
/// `current_url` is the URL of the current route without a query string.
pub fn build_pagination_result(
    window: PaginationWindow,
    total: u64,
    query: &QueryParams,
    current_url: &str,
) -> PaginationResult {
    let PaginationWindow { offset, limit } = window;
    let end = window.end();

    let link = |target: u64| PageLink {
        offset: target,
        url: query.with(OFFSET_PARAM, target.to_string()).url_with(current_url),
    };

    let next = (end < total).then(|| link(end));
    let previous = offset.checked_sub(limit).map(link);

    PaginationResult {
        total,
        offset,
        limit,
        range: (offset, end.min(total)),
        next,
        previous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "/admin/my-model/";

    fn build(offset: u64, limit: u64, total: u64) -> PaginationResult {
        build_pagination_result(
            PaginationWindow::new(offset, limit),
            total,
            &QueryParams::new(),
            URL,
        )
    }

    #[test]
    fn test_decode_defaults() {
        let window = PaginationWindow::decode(&QueryParams::new(), 10).unwrap();
        assert_eq!(window, PaginationWindow::new(0, 10));
    }

    #[test]
    fn test_decode_explicit_values() {
        let query = QueryParams::parse("offset=30&limit=15");
        let window = PaginationWindow::decode(&query, 10).unwrap();
        assert_eq!(window, PaginationWindow::new(30, 15));
    }

    #[test]
    fn test_decode_malformed_is_client_error() {
        let query = QueryParams::parse("offset=abc");
        assert_eq!(
            PaginationWindow::decode(&query, 10),
            Err(QueryError::MalformedInteger {
                name: OFFSET_PARAM,
                value: "abc".to_string()
            })
        );

        let negative = QueryParams::parse("limit=-5");
        assert!(matches!(
            PaginationWindow::decode(&negative, 10),
            Err(QueryError::MalformedInteger { name: LIMIT_PARAM, .. })
        ));

        let empty = QueryParams::parse("offset=");
        assert!(PaginationWindow::decode(&empty, 10).is_err());
    }

    #[test]
    fn test_decode_accepts_zero_limit() {
        let query = QueryParams::parse("limit=0");
        assert_eq!(
            PaginationWindow::decode(&query, 10).unwrap(),
            PaginationWindow::new(0, 0)
        );
    }

    #[test]
    fn test_middle_page() {
        let page = build(3, 3, 10);
        assert_eq!(page.range, (3, 6));
        assert_eq!(page.next.as_ref().map(|l| l.offset), Some(6));
        assert_eq!(page.previous.as_ref().map(|l| l.offset), Some(0));
        assert_eq!(page.next.unwrap().url, "/admin/my-model/?offset=6");
    }

    #[test]
    fn test_single_full_page() {
        let page = build(0, 10, 10);
        assert_eq!(page.range, (0, 10));
        assert!(page.next.is_none());
        assert!(page.previous.is_none());
    }

    #[test]
    fn test_last_partial_page() {
        let page = build(9, 3, 10);
        assert_eq!(page.range, (9, 10));
        assert_eq!(page.shown(), 1);
        assert!(page.next.is_none());
        assert_eq!(page.previous.map(|l| l.offset), Some(6));
    }

    #[test]
    fn test_empty_total() {
        let first = build(0, 10, 0);
        assert_eq!(first.range, (0, 0));
        assert!(first.next.is_none());
        assert!(first.previous.is_none());
        assert!(first.is_empty());

        let past = build(20, 10, 0);
        assert_eq!(past.range, (20, 0));
        assert!(past.next.is_none());
        assert!(past.is_empty());
        assert_eq!(past.previous.map(|l| l.offset), Some(10));
    }

    #[test]
    fn test_zero_limit_boundary() {
        let page = build(4, 0, 10);
        assert_eq!(page.range, (4, 4));
        assert!(page.is_empty());
        // offset + 0 < total, so the codec still emits a self-referencing next link
        assert_eq!(page.next.map(|l| l.offset), Some(4));
        assert_eq!(page.previous.map(|l| l.offset), Some(4));
    }

    #[test]
    fn test_link_presence_equivalences() {
        for total in 0..12u64 {
            for limit in 0..6u64 {
                for offset in 0..14u64 {
                    let page = build(offset, limit, total);
                    assert_eq!(page.next.is_some(), offset + limit < total);
                    assert_eq!(page.previous.is_some(), offset >= limit);
                    assert_eq!(page.range, (offset, (offset + limit).min(total)));
                }
            }
        }
    }

    #[test]
    fn test_links_preserve_other_parameters() {
        let query = QueryParams::parse("sorting=-label%2Cid&query=item&offset=3&limit=3&x=1&x=2");
        let window = PaginationWindow::decode(&query, 10).unwrap();
        let page = build_pagination_result(window, 10, &query, URL);

        let next = QueryParams::parse(page.next.unwrap().url.split_once('?').unwrap().1);
        assert_eq!(next.get("sorting"), Some("-label,id"));
        assert_eq!(next.get("query"), Some("item"));
        assert_eq!(next.get("limit"), Some("3"));
        assert_eq!(next.get_all("x").collect::<Vec<_>>(), vec!["1", "2"]);
        assert_eq!(next.get_all("offset").collect::<Vec<_>>(), vec!["6"]);
    }

    #[test]
    fn test_next_link_round_trip() {
        let query = QueryParams::parse("limit=4&query=item");
        let window = PaginationWindow::decode(&query, 10).unwrap();
        let page = build_pagination_result(window, 10, &query, URL);

        let next_url = page.next.unwrap().url;
        let (path, raw) = next_url.split_once('?').unwrap();
        assert_eq!(path, URL);
        let decoded_query = QueryParams::parse(raw);
        let decoded = PaginationWindow::decode(&decoded_query, 10).unwrap();
        assert_eq!(decoded, PaginationWindow::new(window.offset + window.limit, window.limit));
        assert_eq!(decoded_query.without(OFFSET_PARAM), query.without(OFFSET_PARAM));
    }
}
