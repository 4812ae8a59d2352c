//! Multi-field sorting codec
//!
//! The list view encodes its sort order in a single `sorting` query parameter:
//! a comma separated list of field keys, most significant first, where a
//! leading `-` means descending (`sorting=-label,id`).
//!
//! - [`SortableFieldSet`] is the static allow-list built at registration time
//! - [`SortSpec`] is the decoded, ordered `(field, direction)` list
//! - [`SortingState`] generates the toggle links rendered in column headers
//!
//! Toggling cycles a field through ascending → descending → unsorted while
//! every other active field keeps its position and direction.
//!
//! # Example
//!
//! ```rust
//! use acton_admin::sorting::{SortDirection, SortSpec, SortableFieldSet};
//!
//! let fields: SortableFieldSet = [("id", "ID"), ("label", "Label")].into_iter().collect();
//! let spec = SortSpec::parse(Some("-label,unknown,id"), &fields);
//!
//! assert_eq!(spec.direction_of("label"), Some(SortDirection::Descending));
//! assert_eq!(spec.direction_of("unknown"), None);
//! assert_eq!(spec.to_param().as_deref(), Some("-label,id"));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pagination::OFFSET_PARAM;
use crate::query::QueryParams;

/// Query parameter carrying the encoded [`SortSpec`]
pub const SORTING_PARAM: &str = "sorting";

const DESCENDING_PREFIX: char = '-';
const TOKEN_SEPARATOR: char = ',';

/// Sort direction of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending order (A-Z, 0-9)
    #[serde(rename = "ASC")]
    Ascending,
    /// Descending order (Z-A, 9-0)
    #[serde(rename = "DESC")]
    Descending,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// Precondition violations raised by the sorting codec
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortingError {
    /// A toggle link was requested for a field outside the sortable allow-list
    #[error("field '{0}' is not sortable")]
    NotSortable(String),
}

/// A public list field and how it sorts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortableField {
    /// Public key used in query strings
    pub key: String,
    /// Human readable column label
    pub label: String,
    /// Whether the field participates in sorting
    pub sortable: bool,
    /// Underlying attribute read and compared by the repository; `None` means the key
    pub column: Option<String>,
}

impl SortableField {
    /// A sortable field whose column has the same name as its key
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            column: Some(key.clone()),
            key,
            label: label.into(),
            sortable: true,
        }
    }

    /// A displayed field that cannot be sorted on
    pub fn unsortable(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: false,
            column: None,
        }
    }

    /// Read and compare a different underlying column
    ///
    /// Does not change whether the field is sortable.
    #[must_use]
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Whether the field participates in sorting
    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    /// Attribute the field reads from: its column, or the key itself
    pub fn attribute(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.key)
    }
}

/// Ordered allow-list of list fields
///
/// Built once when a view is registered and shared read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SortableFieldSet {
    fields: Vec<SortableField>,
}

impl SortableFieldSet {
    /// Create a set from fields in display order
    pub fn new(fields: impl IntoIterator<Item = SortableField>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    /// Look up a field by public key
    pub fn get(&self, key: &str) -> Option<&SortableField> {
        self.fields.iter().find(|field| field.key == key)
    }

    /// Whether `key` names a sortable field
    pub fn is_sortable(&self, key: &str) -> bool {
        self.get(key).is_some_and(SortableField::is_sortable)
    }

    /// Column compared for `key`, if it is sortable
    pub fn column_for(&self, key: &str) -> Option<&str> {
        self.get(key)
            .filter(|field| field.is_sortable())
            .map(SortableField::attribute)
    }

    /// Fields in display order
    pub fn iter(&self) -> impl Iterator<Item = &SortableField> {
        self.fields.iter()
    }

    /// Keys of sortable fields in display order
    pub fn sortable_keys(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|field| field.is_sortable())
            .map(|field| field.key.as_str())
    }

    /// Number of fields, sortable or not
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the set has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, L> FromIterator<(K, L)> for SortableFieldSet
where
    K: Into<String>,
    L: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, L)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(key, label)| SortableField::new(key, label)),
        )
    }
}

/// Ordered multi-field sort order, most significant field first
///
/// Field names are unique; pushing an existing field overwrites its
/// direction without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    fields: Vec<(String, SortDirection)>,
}

impl SortSpec {
    /// The unspecified (repository default) order
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`SortSpec::push`]
    #[must_use]
    pub fn then(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.push(field, direction);
        self
    }

    /// Add a field, or overwrite its direction in place if already present
    pub fn push(&mut self, field: impl Into<String>, direction: SortDirection) {
        let field = field.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = direction,
            None => self.fields.push((field, direction)),
        }
    }

    /// Decode the `sorting` parameter against an allow-list
    ///
    /// Tokens for unknown or unsortable keys are dropped silently so that
    /// bookmarked URLs survive configuration changes. Empty tokens are
    /// skipped. A repeated key keeps the position of its first occurrence
    /// and the direction of its last.
    pub fn parse(param: Option<&str>, allowed: &SortableFieldSet) -> Self {
        let mut spec = Self::new();
        let Some(param) = param else {
            return spec;
        };

        for token in param.split(TOKEN_SEPARATOR) {
            let token = token.trim();
            let (key, direction) = match token.strip_prefix(DESCENDING_PREFIX) {
                Some(key) => (key, SortDirection::Descending),
                None => (token, SortDirection::Ascending),
            };
            if key.is_empty() {
                continue;
            }
            if !allowed.is_sortable(key) {
                tracing::debug!(field = key, "dropping sort token for unknown field");
                continue;
            }
            spec.push(key, direction);
        }
        spec
    }

    /// Direction of `field`, or `None` when it is not part of the order
    pub fn direction_of(&self, field: &str) -> Option<SortDirection> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, direction)| *direction)
    }

    /// Fields and directions, most significant first
    pub fn iter(&self) -> impl Iterator<Item = (&str, SortDirection)> {
        self.fields
            .iter()
            .map(|(name, direction)| (name.as_str(), *direction))
    }

    /// Number of sort keys
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no order was requested
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Query-string tokens in order (`label`, `-id`, ...)
    pub fn tokens(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|(name, direction)| match direction {
                SortDirection::Ascending => name.clone(),
                SortDirection::Descending => format!("{}{}", DESCENDING_PREFIX, name),
            })
            .collect()
    }

    /// Encoded `sorting` parameter value; `None` for the empty order
    pub fn to_param(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.tokens().join(&TOKEN_SEPARATOR.to_string()))
        }
    }

    /// The order after one toggle of `field`
    ///
    /// Ascending becomes descending in place, descending is removed, and an
    /// absent field is appended as ascending.
    #[must_use]
    pub fn toggled(&self, field: &str) -> Self {
        let mut fields = self.fields.clone();
        match self.direction_of(field) {
            Some(SortDirection::Ascending) => {
                for entry in fields.iter_mut().filter(|(name, _)| name == field) {
                    entry.1 = SortDirection::Descending;
                }
            }
            Some(SortDirection::Descending) => fields.retain(|(name, _)| name != field),
            None => fields.push((field.to_string(), SortDirection::Ascending)),
        }
        Self { fields }
    }

    /// Translate public keys into the columns the repository compares
    ///
    /// Keys without a sortable column are skipped; a decoded spec never
    /// contains any.
    #[must_use]
    pub fn resolve(&self, fields: &SortableFieldSet) -> Self {
        self.fields
            .iter()
            .filter_map(|(key, direction)| {
                fields
                    .column_for(key)
                    .map(|column| (column.to_string(), *direction))
            })
            .collect()
    }
}

impl<F: Into<String>> FromIterator<(F, SortDirection)> for SortSpec {
    fn from_iter<I: IntoIterator<Item = (F, SortDirection)>>(iter: I) -> Self {
        let mut spec = Self::new();
        for (field, direction) in iter {
            spec.push(field, direction);
        }
        spec
    }
}

/// Sort state of one rendered list page
///
/// Holds everything needed to produce header toggle links: the decoded
/// order, the allow-list, the current query parameters and the route URL.
#[derive(Debug, Clone)]
pub struct SortingState {
    spec: SortSpec,
    fields: Arc<SortableFieldSet>,
    query: QueryParams,
    current_url: String,
    reset_offset: bool,
}

impl SortingState {
    /// Create the state for the current request
    pub fn new(
        spec: SortSpec,
        fields: Arc<SortableFieldSet>,
        query: QueryParams,
        current_url: impl Into<String>,
    ) -> Self {
        Self {
            spec,
            fields,
            query,
            current_url: current_url.into(),
            reset_offset: false,
        }
    }

    /// Drop `offset` from toggle links so a re-sort starts on the first page
    ///
    /// Off by default: links keep the current offset.
    #[must_use]
    pub fn with_offset_reset(mut self, reset: bool) -> Self {
        self.reset_offset = reset;
        self
    }

    /// The decoded order
    pub fn spec(&self) -> &SortSpec {
        &self.spec
    }

    /// Current direction of `field`
    pub fn direction_of(&self, field: &str) -> Option<SortDirection> {
        self.spec.direction_of(field)
    }

    /// URL that toggles `field` while keeping the rest of the order
    ///
    /// All other query parameters are preserved. Returns
    /// [`SortingError::NotSortable`] for fields outside the allow-list.
    pub fn route_for(&self, field: &str) -> Result<String, SortingError> {
        if !self.fields.is_sortable(field) {
            return Err(SortingError::NotSortable(field.to_string()));
        }

        let toggled = self.spec.toggled(field);
        let mut query = match toggled.to_param() {
            Some(param) => self.query.with(SORTING_PARAM, param),
            None => self.query.without(SORTING_PARAM),
        };
        if self.reset_offset {
            query = query.without(OFFSET_PARAM);
        }
        Ok(query.url_with(&self.current_url))
    }

    /// Serializable snapshot for templates
    pub fn view(&self) -> SortingView {
        let links = self
            .fields
            .sortable_keys()
            .filter_map(|key| {
                self.route_for(key)
                    .ok()
                    .map(|url| (key.to_string(), url))
            })
            .collect();

        SortingView {
            active: self
                .spec
                .iter()
                .map(|(field, direction)| SortEntry {
                    field: field.to_string(),
                    direction,
                })
                .collect(),
            directions: self
                .spec
                .iter()
                .map(|(field, direction)| (field.to_string(), direction))
                .collect(),
            links,
        }
    }
}

/// One active sort key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortEntry {
    /// Public field key
    pub field: String,
    /// Direction applied
    pub direction: SortDirection,
}

/// Template-facing view of [`SortingState`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortingView {
    /// Active keys, most significant first
    pub active: Vec<SortEntry>,
    /// Field key → current direction
    pub directions: BTreeMap<String, SortDirection>,
    /// Field key → toggle URL, for every sortable field
    pub links: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "/admin/my-model/";

    fn fields() -> SortableFieldSet {
        SortableFieldSet::new([
            SortableField::new("id", "ID"),
            SortableField::new("label", "Label"),
            SortableField::new("created", "Created At").with_column("created_at"),
            SortableField::unsortable("notes", "Notes"),
        ])
    }

    fn state(raw_query: &str) -> SortingState {
        let fields = Arc::new(fields());
        let query = QueryParams::parse(raw_query);
        let spec = SortSpec::parse(query.get(SORTING_PARAM), &fields);
        SortingState::new(spec, fields, query, URL)
    }

    fn sorting_of(url: &str) -> Option<String> {
        let query = url.split_once('?').map(|(_, q)| q).unwrap_or("");
        QueryParams::parse(query).get(SORTING_PARAM).map(str::to_string)
    }

    #[test]
    fn test_parse_none_is_empty() {
        assert!(SortSpec::parse(None, &fields()).is_empty());
        assert!(SortSpec::parse(Some(""), &fields()).is_empty());
    }

    #[test]
    fn test_parse_directions_and_order() {
        let spec = SortSpec::parse(Some("label,-id"), &fields());
        assert_eq!(
            spec.iter().collect::<Vec<_>>(),
            vec![
                ("label", SortDirection::Ascending),
                ("id", SortDirection::Descending)
            ]
        );
    }

    #[test]
    fn test_parse_drops_unknown_and_unsortable() {
        let spec = SortSpec::parse(Some("bogus,-notes,label,-,,"), &fields());
        assert_eq!(spec.tokens(), vec!["label".to_string()]);
        assert_eq!(spec.direction_of("bogus"), None);
        assert_eq!(spec.direction_of("notes"), None);
    }

    #[test]
    fn test_unsortable_field_with_column_stays_unsortable() {
        let fields = SortableFieldSet::new([
            SortableField::new("label", "Label"),
            SortableField::unsortable("created", "Created At").with_column("created_at"),
        ]);
        assert!(!fields.is_sortable("created"));
        assert_eq!(fields.column_for("created"), None);
        assert_eq!(fields.get("created").map(SortableField::attribute), Some("created_at"));

        let spec = SortSpec::parse(Some("-created,label"), &fields);
        assert_eq!(spec.tokens(), vec!["label".to_string()]);
    }

    #[test]
    fn test_parse_duplicates_overwrite_in_place() {
        let spec = SortSpec::parse(Some("label,id,-label"), &fields());
        assert_eq!(
            spec.tokens(),
            vec!["-label".to_string(), "id".to_string()]
        );
    }

    #[test]
    fn test_re_encode_is_identity() {
        for raw in ["label", "-label,id", "id,-created,label", "-id,-label"] {
            let spec = SortSpec::parse(Some(raw), &fields());
            assert_eq!(spec.to_param().as_deref(), Some(raw));
        }
        assert_eq!(SortSpec::new().to_param(), None);
    }

    #[test]
    fn test_resolve_maps_columns() {
        let spec = SortSpec::parse(Some("-created,label"), &fields());
        let resolved = spec.resolve(&fields());
        assert_eq!(
            resolved.iter().collect::<Vec<_>>(),
            vec![
                ("created_at", SortDirection::Descending),
                ("label", SortDirection::Ascending)
            ]
        );
    }

    #[test]
    fn test_toggle_ascending_becomes_descending_in_place() {
        let url = state("sorting=label,-id").route_for("label").unwrap();
        assert_eq!(sorting_of(&url).as_deref(), Some("-label,-id"));
    }

    #[test]
    fn test_toggle_descending_is_dropped() {
        let url = state("sorting=label,-id").route_for("id").unwrap();
        assert_eq!(sorting_of(&url).as_deref(), Some("label"));
    }

    #[test]
    fn test_toggle_absent_is_appended() {
        let url = state("sorting=-id").route_for("label").unwrap();
        assert_eq!(sorting_of(&url).as_deref(), Some("-id,label"));
    }

    #[test]
    fn test_toggle_last_field_removes_parameter() {
        let url = state("sorting=-label&limit=5").route_for("label").unwrap();
        assert_eq!(url, "/admin/my-model/?limit=5");
    }

    #[test]
    fn test_toggle_three_times_cycles() {
        let mut raw = "sorting=-id,created&offset=20".to_string();
        let expected = ["-id,created,label", "-id,created,-label", "-id,created", "-id,created,label"];
        for want in expected {
            let url = state(&raw).route_for("label").unwrap();
            assert_eq!(sorting_of(&url).as_deref(), Some(want));
            raw = url.split_once('?').unwrap().1.to_string();
            // other keys keep position and direction
            let spec = SortSpec::parse(QueryParams::parse(&raw).get(SORTING_PARAM), &fields());
            assert_eq!(spec.direction_of("id"), Some(SortDirection::Descending));
            assert_eq!(spec.direction_of("created"), Some(SortDirection::Ascending));
            assert_eq!(spec.iter().next().map(|(f, _)| f), Some("id"));
        }
    }

    #[test]
    fn test_toggle_preserves_offset_and_other_parameters() {
        let url = state("offset=30&limit=10&query=item&sorting=id")
            .route_for("id")
            .unwrap();
        let query = QueryParams::parse(url.split_once('?').unwrap().1);
        assert_eq!(query.get("offset"), Some("30"));
        assert_eq!(query.get("limit"), Some("10"));
        assert_eq!(query.get("query"), Some("item"));
        assert_eq!(query.get(SORTING_PARAM), Some("-id"));
    }

    #[test]
    fn test_toggle_with_offset_reset() {
        let url = state("offset=30&sorting=id")
            .with_offset_reset(true)
            .route_for("label")
            .unwrap();
        let query = QueryParams::parse(url.split_once('?').unwrap().1);
        assert!(!query.contains("offset"));
        assert_eq!(query.get(SORTING_PARAM), Some("id,label"));
    }

    #[test]
    fn test_toggle_unsortable_field_fails_fast() {
        assert_eq!(
            state("").route_for("notes"),
            Err(SortingError::NotSortable("notes".to_string()))
        );
        assert!(state("").route_for("missing").is_err());
    }

    #[test]
    fn test_view_snapshot() {
        let view = state("sorting=-label").view();
        assert_eq!(view.active.len(), 1);
        assert_eq!(view.directions.get("label"), Some(&SortDirection::Descending));
        assert_eq!(view.links.len(), 3);
        assert!(!view.links.contains_key("notes"));
        assert_eq!(view.links.get("label").map(String::as_str), Some(URL));
    }
}
