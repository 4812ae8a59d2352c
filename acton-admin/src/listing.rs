//! List-page orchestration
//!
//! [`list_page`] ties the codecs to a repository for one page render:
//! decode the window, sort order and text filter from the query string, make
//! the single repository call, then build pagination and sorting output.

use std::sync::Arc;

use crate::error::{ConfigurationError, QueryError, Result};
use crate::pagination::{build_pagination_result, PaginationResult, PaginationWindow};
use crate::query::QueryParams;
use crate::repository::Repository;
use crate::sorting::{SortSpec, SortableFieldSet, SortingState, SORTING_PARAM};

/// Query parameter carrying the free-text filter
pub const QUERY_PARAM: &str = "query";

/// Default page size when the request has no `limit`
pub const DEFAULT_LIST_LIMIT: u64 = 10;

/// Largest page size a request may ask for
pub const DEFAULT_MAX_LIST_LIMIT: u64 = 100;

/// Static configuration of one list view
#[derive(Debug, Clone)]
pub struct ListViewConfig {
    /// Columns in display order, with their sort allow-list
    pub fields: Arc<SortableFieldSet>,
    /// Field keys searched by the text filter; `None` disables it
    pub query_fields: Option<Vec<String>>,
    /// Page size used when the request has no `limit`
    pub default_limit: u64,
    /// Requests above this page size are clamped to it
    pub max_limit: u64,
    /// Drop `offset` from sort toggle links
    pub reset_offset_on_sort: bool,
}

impl ListViewConfig {
    /// Configuration with default limits and no text filter
    pub fn new(fields: SortableFieldSet) -> Self {
        Self {
            fields: Arc::new(fields),
            query_fields: None,
            default_limit: DEFAULT_LIST_LIMIT,
            max_limit: DEFAULT_MAX_LIST_LIMIT,
            reset_offset_on_sort: false,
        }
    }

    /// Enable the text filter over `fields`
    #[must_use]
    pub fn query_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Set the default page size
    #[must_use]
    pub fn default_limit(mut self, limit: u64) -> Self {
        self.default_limit = limit;
        self
    }

    /// Set the largest allowed page size
    #[must_use]
    pub fn max_limit(mut self, limit: u64) -> Self {
        self.max_limit = limit;
        self
    }

    /// Reset pagination whenever the sort order changes
    #[must_use]
    pub fn reset_offset_on_sort(mut self, reset: bool) -> Self {
        self.reset_offset_on_sort = reset;
        self
    }

    /// Check the configuration of view `view`
    ///
    /// List field keys must be unique and every query field must be a list
    /// field. Limits must be at least 1 with `default_limit <= max_limit`.
    pub fn validate(&self, view: &str) -> std::result::Result<(), ConfigurationError> {
        for (index, field) in self.fields.iter().enumerate() {
            if self.fields.iter().take(index).any(|f| f.key == field.key) {
                return Err(ConfigurationError::DuplicateField {
                    view: view.to_string(),
                    field: field.key.clone(),
                });
            }
        }

        for field in self.query_fields.iter().flatten() {
            if self.fields.get(field).is_none() {
                return Err(ConfigurationError::UnknownQueryField {
                    view: view.to_string(),
                    field: field.clone(),
                });
            }
        }

        if self.default_limit == 0 || self.max_limit < self.default_limit {
            return Err(ConfigurationError::Invalid {
                what: "list limits",
                value: format!("default {} max {}", self.default_limit, self.max_limit),
                reason: "limits must satisfy 1 <= default <= max",
            });
        }

        Ok(())
    }
}

/// One rendered page of a list view
#[derive(Debug, Clone)]
pub struct ListPage<M> {
    /// Items returned by the repository
    pub items: Vec<M>,
    /// Window and navigation links
    pub pagination: PaginationResult,
    /// Sort order and header toggle links
    pub sorting: SortingState,
    /// Active text filter
    pub query: Option<String>,
}

/// Decode the free-text filter
///
/// Surrounding whitespace is trimmed; an absent or blank value means no
/// filter.
pub fn decode_query_text(query: &QueryParams) -> Option<String> {
    query
        .get(QUERY_PARAM)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Render-ready data for one list page
///
/// `current_url` is the URL of the list route without a query string.
/// Rejects `limit=0` with [`QueryError::ZeroLimit`] and clamps larger
/// limits to `config.max_limit`. Repository errors are returned unchanged.
pub async fn list_page<R: Repository>(
    query: &QueryParams,
    current_url: &str,
    config: &ListViewConfig,
    repository: &R,
) -> Result<ListPage<R::Model>> {
    let mut window = PaginationWindow::decode(query, config.default_limit)?;
    if window.limit == 0 {
        return Err(QueryError::ZeroLimit.into());
    }
    if window.limit > config.max_limit {
        tracing::debug!(
            requested = window.limit,
            max = config.max_limit,
            "clamping list limit"
        );
        window.limit = config.max_limit;
    }

    let spec = SortSpec::parse(query.get(SORTING_PARAM), &config.fields);
    let text = decode_query_text(query);
    let query_fields: Option<Vec<String>> = config.query_fields.as_ref().map(|keys| {
        keys.iter()
            .map(|key| {
                config
                    .fields
                    .get(key)
                    .map_or(key.as_str(), |field| field.attribute())
                    .to_string()
            })
            .collect()
    });

    let (total, items) = repository
        .list(
            &spec.resolve(&config.fields),
            window.offset,
            window.limit,
            text.as_deref(),
            query_fields.as_deref(),
        )
        .await?;

    tracing::debug!(
        offset = window.offset,
        limit = window.limit,
        total,
        returned = items.len(),
        "listed page"
    );

    let pagination = build_pagination_result(window, total, query, current_url);
    let sorting = SortingState::new(spec, Arc::clone(&config.fields), query.clone(), current_url)
        .with_offset_reset(config.reset_offset_on_sort);

    Ok(ListPage {
        items,
        pagination,
        sorting,
        query: text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::repository::InMemoryRepository;
    use crate::sorting::{SortDirection, SortableField};
    use serde::{Deserialize, Serialize};

    const URL: &str = "/admin/my-model/";

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Row {
        id: String,
        label: String,
    }

    fn repository() -> InMemoryRepository<Row> {
        InMemoryRepository::new(
            (0..10).map(|i| Row {
                id: format!("item_{i}"),
                label: format!("Item {i}"),
            }),
            |row: &Row| row.id.clone(),
        )
    }

    fn config() -> ListViewConfig {
        ListViewConfig::new(SortableFieldSet::new([
            SortableField::new("id", "ID"),
            SortableField::new("title", "Label").with_column("label"),
        ]))
        .query_fields(["id", "title"])
        .max_limit(5)
    }

    async fn page(raw: &str) -> Result<ListPage<Row>> {
        list_page(&QueryParams::parse(raw), URL, &config(), &repository()).await
    }

    #[test]
    fn test_decode_query_text() {
        assert_eq!(decode_query_text(&QueryParams::parse("query=+item+0+")), Some("item 0".into()));
        assert_eq!(decode_query_text(&QueryParams::parse("query=++")), None);
        assert_eq!(decode_query_text(&QueryParams::new()), None);
    }

    #[test]
    fn test_validate_rejects_unknown_query_field() {
        let config = config().query_fields(["missing"]);
        assert_eq!(
            config.validate("list"),
            Err(ConfigurationError::UnknownQueryField {
                view: "list".into(),
                field: "missing".into()
            })
        );
        assert!(ListViewConfig::new(SortableFieldSet::default()).validate("list").is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_fields_and_bad_limits() {
        let duplicate = ListViewConfig::new(SortableFieldSet::new([
            SortableField::new("id", "ID"),
            SortableField::new("id", "Again"),
        ]));
        assert!(matches!(
            duplicate.validate("list"),
            Err(ConfigurationError::DuplicateField { .. })
        ));
        assert!(config().default_limit(0).validate("list").is_err());
        assert!(config().default_limit(10).max_limit(5).validate("list").is_err());
    }

    #[tokio::test]
    async fn test_first_page_defaults() {
        let page = page("limit=5").await.unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.pagination.total, 10);
        assert_eq!(page.pagination.next.map(|l| l.offset), Some(5));
        assert!(page.pagination.previous.is_none());
        assert!(page.query.is_none());
    }

    #[tokio::test]
    async fn test_sorting_uses_columns() {
        let page = page("sorting=-title&limit=3").await.unwrap();
        assert_eq!(page.items[0].id, "item_9");
        assert_eq!(
            page.sorting.direction_of("title"),
            Some(SortDirection::Descending)
        );
        assert_eq!(page.sorting.route_for("title").unwrap(), "/admin/my-model/?limit=3");
    }

    #[tokio::test]
    async fn test_text_filter() {
        let page = page("query=item+0").await.unwrap();
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.items[0].id, "item_0");
        assert_eq!(page.query.as_deref(), Some("item 0"));
    }

    #[tokio::test]
    async fn test_limit_is_clamped() {
        let page = page("limit=500").await.unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.pagination.limit, 5);
    }

    #[tokio::test]
    async fn test_zero_limit_rejected() {
        assert!(matches!(
            page("limit=0").await,
            Err(Error::Query(QueryError::ZeroLimit))
        ));
    }

    #[tokio::test]
    async fn test_malformed_offset_rejected() {
        assert!(matches!(
            page("offset=ten").await,
            Err(Error::Query(QueryError::MalformedInteger { .. }))
        ));
    }

    #[tokio::test]
    async fn test_unknown_sort_tokens_ignored() {
        let page = page("sorting=bogus,-id").await.unwrap();
        assert_eq!(page.sorting.spec().len(), 1);
        assert_eq!(page.items[0].id, "item_9");
    }
}
