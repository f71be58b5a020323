//! String filter matching
//!
//! A plain filter value matches any string containing it, ignoring case.
//! A value with `*` is a wildcard pattern matched against the whole string.

use regex::{Regex, RegexBuilder};

/// Compiled string filter
#[derive(Debug, Clone)]
pub enum StringMatcher {
    Contains(String),
    Wildcard(Regex),
}

impl StringMatcher {
    pub fn new(query: &str) -> Self {
        if !query.contains('*') {
            return StringMatcher::Contains(query.to_lowercase());
        }

        let pattern = query
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        match RegexBuilder::new(&format!("^{}$", pattern))
            .case_insensitive(true)
            .build()
        {
            Ok(regex) => StringMatcher::Wildcard(regex),
            // escaped input only fails on size limits
            Err(_) => StringMatcher::Contains(query.replace('*', "").to_lowercase()),
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            StringMatcher::Contains(needle) => value.to_lowercase().contains(needle.as_str()),
            StringMatcher::Wildcard(regex) => regex.is_match(value),
        }
    }
}

/// Apply an optional filter; an absent filter matches everything
pub fn matches_optional(matcher: Option<&StringMatcher>, value: &str) -> bool {
    matcher.is_none_or(|m| m.matches(value))
}
