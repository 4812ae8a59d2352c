//! Ordered query-string parameters
//!
//! [`QueryParams`] is the query-parameter source the list codecs read from and
//! write modified copies of. It keeps every `(name, value)` pair in request
//! order, including repeated names, so that links generated from it echo
//! parameters the admin does not understand.
//!
//! # Example
//!
//! ```rust
//! use acton_admin::query::QueryParams;
//!
//! let params = QueryParams::parse("sorting=-label&offset=10&tag=a&tag=b");
//! assert_eq!(params.get("offset"), Some("10"));
//! assert_eq!(params.get_all("tag").collect::<Vec<_>>(), vec!["a", "b"]);
//!
//! let next = params.with("offset", "20");
//! assert_eq!(next.to_query_string(), "sorting=-label&tag=a&tag=b&offset=20");
//! ```

use std::convert::Infallible;
use std::fmt;

use axum::extract::FromRequestParts;
use http::request::Parts;
use http::Uri;
use url::form_urlencoded;

/// Ordered multimap of decoded query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Create an empty parameter set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an `application/x-www-form-urlencoded` query string
    ///
    /// A leading `?` is ignored.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        Self {
            pairs: form_urlencoded::parse(raw.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    /// Decode the query component of a request URI
    pub fn from_uri(uri: &Uri) -> Self {
        uri.query().map(Self::parse).unwrap_or_default()
    }

    /// Value of `name`; the last occurrence wins when the name repeats
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All values of `name` in request order
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether `name` occurs at least once
    pub fn contains(&self, name: &str) -> bool {
        self.pairs.iter().any(|(key, _)| key == name)
    }

    /// Iterate over all pairs in request order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of pairs, counting repeated names
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether there are no pairs at all
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Copy with every occurrence of `name` replaced by a single `name=value`
    ///
    /// The replaced pair moves to the end; all other pairs keep their order.
    #[must_use]
    pub fn with(&self, name: &str, value: impl Into<String>) -> Self {
        let mut copy = self.without(name);
        copy.pairs.push((name.to_string(), value.into()));
        copy
    }

    /// Copy with every occurrence of `name` removed
    #[must_use]
    pub fn without(&self, name: &str) -> Self {
        Self {
            pairs: self
                .pairs
                .iter()
                .filter(|(key, _)| key != name)
                .cloned()
                .collect(),
        }
    }

    /// Encode back into a query string (without the leading `?`)
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    /// Append the encoded parameters to `base`
    ///
    /// Returns `base` unchanged when there are no parameters.
    pub fn url_with(&self, base: &str) -> String {
        if self.pairs.is_empty() {
            base.to_string()
        } else {
            format!("{}?{}", base, self.to_query_string())
        }
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

impl<S> FromRequestParts<S> for QueryParams
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_uri(&parts.uri))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_order_and_repeats() {
        let params = QueryParams::parse("?a=1&b=2&a=3");
        assert_eq!(
            params.iter().collect::<Vec<_>>(),
            vec![("a", "1"), ("b", "2"), ("a", "3")]
        );
        assert_eq!(params.get("a"), Some("3"));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_parse_decodes_escapes() {
        let params = QueryParams::parse("query=item+0&name=caf%C3%A9");
        assert_eq!(params.get("query"), Some("item 0"));
        assert_eq!(params.get("name"), Some("café"));
    }

    #[test]
    fn test_missing_name() {
        let params = QueryParams::parse("a=1");
        assert_eq!(params.get("b"), None);
        assert!(!params.contains("b"));
        assert!(QueryParams::parse("").is_empty());
    }

    #[test]
    fn test_with_replaces_every_occurrence() {
        let params = QueryParams::parse("offset=1&limit=5&offset=2");
        let replaced = params.with("offset", "10");
        assert_eq!(replaced.to_query_string(), "limit=5&offset=10");
        // original untouched
        assert_eq!(params.get_all("offset").count(), 2);
    }

    #[test]
    fn test_round_trip_encoding() {
        let params: QueryParams = vec![("query", "item 0"), ("sorting", "-label,id")]
            .into_iter()
            .collect();
        let encoded = params.to_query_string();
        assert_eq!(encoded, "query=item+0&sorting=-label%2Cid");
        assert_eq!(QueryParams::parse(&encoded), params);
    }

    #[test]
    fn test_url_with() {
        assert_eq!(QueryParams::new().url_with("/admin/"), "/admin/");
        assert_eq!(
            QueryParams::parse("a=1").url_with("/admin/"),
            "/admin/?a=1"
        );
    }

    #[tokio::test]
    async fn test_extractor_reads_uri_query() {
        let request = http::Request::builder()
            .uri("/admin/my-model/?offset=3&limit=3")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        let params = QueryParams::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(params.get("limit"), Some("3"));
    }
}
