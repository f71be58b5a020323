//! Parsed JSON:API request query

use crate::core::error::QueryError;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

/// Value of a single `filter[...]` parameter
///
/// Filters are either a scalar string or a comma-separated list; the
/// controller owning the filter decides which interpretation applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterValue(String);

impl FilterValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw value as submitted
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The value as a list: comma-separated, trimmed, empty items dropped
    pub fn values(&self) -> Vec<&str> {
        self.0
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Immutable query of one request
///
/// Built once from the raw query parameters using the JSON:API parameter
/// families:
///
/// ```text
/// GET /api/v1/translations?filter[locale]=en,nl&filter[key]=label.*
///     &sort=-key&page[offset]=20&page[limit]=10
///     &fields[translations]=key,value,locale&include=locale
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonApiQuery {
    filters: IndexMap<String, FilterValue>,
    sort: Option<String>,
    offset: Option<usize>,
    limit: Option<usize>,
    fields: HashMap<String, IndexSet<String>>,
    include: IndexSet<String>,
}

impl JsonApiQuery {
    /// Create an empty query: no filters, no sort, everything requested
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query from raw `(name, value)` pairs
    ///
    /// Parameters outside the JSON:API families are ignored. A repeated
    /// parameter keeps its last value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = Self::new();

        for (name, value) in pairs {
            let name = name.as_ref();
            let value = value.as_ref();

            if let Some(filter) = bracketed(name, "filter") {
                query
                    .filters
                    .insert(filter.to_string(), FilterValue::new(value));
            } else if let Some(resource_type) = bracketed(name, "fields") {
                query
                    .fields
                    .insert(resource_type.to_string(), split_list(value));
            } else {
                match name {
                    "sort" => query.sort = Some(value.to_string()).filter(|s| !s.is_empty()),
                    "include" => query.include = split_list(value),
                    "page[offset]" => query.offset = Some(parse_number(name, value)?),
                    "page[limit]" => query.limit = Some(parse_number(name, value)?),
                    _ => {}
                }
            }
        }

        Ok(query)
    }

    /// Requested filters, in request order
    pub fn filters(&self) -> &IndexMap<String, FilterValue> {
        &self.filters
    }

    /// Raw sort specification (`-key,value`)
    pub fn sort(&self) -> Option<&str> {
        self.sort.as_deref()
    }

    /// Number of entries to skip, defaults to 0
    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }

    /// Requested page size clamped to `max`, or `max` when not requested
    pub fn limit(&self, max: usize) -> usize {
        self.limit.map_or(max, |limit| limit.min(max))
    }

    /// Whether `field` of `resource_type` should be rendered
    ///
    /// Without a `fields[resource_type]` parameter every field is requested.
    pub fn is_field_requested(&self, resource_type: &str, field: &str) -> bool {
        match self.fields.get(resource_type) {
            Some(fields) => fields.contains(field),
            None => true,
        }
    }

    /// Whether the resource at `path` belongs in the response
    ///
    /// `None` is the primary data, which is always included. A nested path
    /// is included when it, or a path below it, was named in `include`.
    pub fn is_included(&self, path: Option<&str>) -> bool {
        let Some(path) = path else {
            return true;
        };

        self.include.iter().any(|included| {
            included == path
                || included
                    .strip_prefix(path)
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }

    /// Builder style helpers, mostly for tests and internal callers
    pub fn with_filter(mut self, name: &str, value: &str) -> Self {
        self.filters
            .insert(name.to_string(), FilterValue::new(value));
        self
    }

    pub fn with_sort(mut self, sort: &str) -> Self {
        self.sort = Some(sort.to_string());
        self
    }

    pub fn with_page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }

    pub fn with_fields(mut self, resource_type: &str, fields: &str) -> Self {
        self.fields
            .insert(resource_type.to_string(), split_list(fields));
        self
    }

    pub fn with_include(mut self, include: &str) -> Self {
        self.include = split_list(include);
        self
    }
}

fn bracketed<'a>(name: &'a str, family: &str) -> Option<&'a str> {
    name.strip_prefix(family)?
        .strip_prefix('[')?
        .strip_suffix(']')
        .filter(|inner| !inner.is_empty())
}

fn split_list(value: &str) -> IndexSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_number(parameter: &str, value: &str) -> Result<usize, QueryError> {
    value
        .trim()
        .parse()
        .map_err(|_| QueryError::InvalidNumber {
            parameter: parameter.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let query = JsonApiQuery::new();
        assert_eq!(query.offset(), 0);
        assert_eq!(query.limit(100), 100);
        assert!(query.filters().is_empty());
        assert!(query.sort().is_none());
        assert!(query.is_field_requested("locales", "name"));
    }

    #[test]
    fn test_from_pairs_parses_families() {
        let query = JsonApiQuery::from_pairs([
            ("filter[locale]", "en,nl"),
            ("filter[key]", "label"),
            ("sort", "-key"),
            ("page[offset]", "20"),
            ("page[limit]", "10"),
            ("fields[translations]", "key, value"),
            ("include", "locale"),
            ("utm_source", "ignored"),
        ])
        .unwrap();

        assert_eq!(query.filters().len(), 2);
        assert_eq!(query.filters()["locale"].values(), vec!["en", "nl"]);
        assert_eq!(query.sort(), Some("-key"));
        assert_eq!(query.offset(), 20);
        assert_eq!(query.limit(100), 10);
        assert!(query.is_field_requested("translations", "value"));
        assert!(!query.is_field_requested("translations", "locale"));
        assert!(query.is_field_requested("locales", "name"));
        assert!(query.is_included(Some("locale")));
    }

    #[test]
    fn test_filters_keep_request_order() {
        let query =
            JsonApiQuery::from_pairs([("filter[value]", "a"), ("filter[key]", "b")]).unwrap();
        let names: Vec<&str> = query.filters().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["value", "key"]);
    }

    #[test]
    fn test_limit_is_clamped() {
        let query = JsonApiQuery::new().with_page(0, 500);
        assert_eq!(query.limit(100), 100);

        let query = JsonApiQuery::new().with_page(0, 5);
        assert_eq!(query.limit(100), 5);
    }

    #[test]
    fn test_invalid_page_number() {
        let err = JsonApiQuery::from_pairs([("page[limit]", "ten")]).unwrap_err();
        assert_eq!(
            err,
            QueryError::InvalidNumber {
                parameter: "page[limit]".to_string(),
                value: "ten".to_string(),
            }
        );
    }

    #[test]
    fn test_is_included_paths() {
        let query = JsonApiQuery::new().with_include("locale.region,author");
        assert!(query.is_included(None));
        assert!(query.is_included(Some("locale")));
        assert!(query.is_included(Some("locale.region")));
        assert!(query.is_included(Some("author")));
        assert!(!query.is_included(Some("loc")));
        assert!(!query.is_included(Some("value")));

        assert!(!JsonApiQuery::new().is_included(Some("locale")));
    }

    #[test]
    fn test_empty_sparse_fieldset_requests_nothing() {
        let query = JsonApiQuery::from_pairs([("fields[locales]", "")]).unwrap();
        assert!(!query.is_field_requested("locales", "code"));
    }

    #[test]
    fn test_filter_value_list() {
        let value = FilterValue::new(" en , ,nl ");
        assert_eq!(value.values(), vec!["en", "nl"]);
        assert!(!value.is_empty());
        assert!(FilterValue::new("  ").is_empty());
    }

    #[test]
    fn test_malformed_brackets_are_ignored() {
        let query = JsonApiQuery::from_pairs([("filter[]", "x"), ("filter[key", "y")]).unwrap();
        assert!(query.filters().is_empty());
    }
}
