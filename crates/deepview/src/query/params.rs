//! Request parameter parsing
//!
//! Turns the raw key/value pairs of a request's query string into typed
//! parameters. Only `depth` can fail here; every other key is carried as
//! an untrusted filter candidate and checked against the handler's legal
//! field set by the shaper.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{DeepResult, Error};

/// Reserved parameter controlling eager-load depth
pub const PARAM_DEPTH: &str = "depth";
/// Reserved parameter listing excluded path prefixes, comma separated
pub const PARAM_EXCLUDE: &str = "exclude";
/// Reserved parameter listing ordering fields, comma separated
pub const PARAM_ORDER_BY: &str = "order_by";

/// Typed request parameters for one read request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    /// Requested eager-load depth; the handler default applies when absent
    pub depth: Option<usize>,
    /// Relation path prefixes to exclude, each excluding its whole subtree
    pub exclude: BTreeSet<String>,
    /// Equality filter candidates, keyed by `__`-joined field path
    pub filters: BTreeMap<String, String>,
    /// Ordering fields in caller order; a `-` prefix means descending
    pub order_by: Vec<String>,
}

impl RequestParams {
    /// Create empty parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse raw query pairs.
    ///
    /// A non-integer `depth` is a client input error; it is never silently
    /// defaulted. Empty `exclude` and `order_by` entries are dropped.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> DeepResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                PARAM_DEPTH => {
                    let depth = value.parse::<usize>().map_err(|_| {
                        Error::InvalidParameter(format!(
                            "depth must be a non-negative integer, got '{}'",
                            value
                        ))
                    })?;
                    params.depth = Some(depth);
                }
                PARAM_EXCLUDE => {
                    params
                        .exclude
                        .extend(split_list(value).map(String::from));
                }
                PARAM_ORDER_BY => {
                    params.order_by.extend(split_list(value).map(String::from));
                }
                _ => {
                    params.filters.insert(key.to_string(), value.to_string());
                }
            }
        }
        Ok(params)
    }

    /// Set the requested depth
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Add an excluded path prefix
    pub fn with_exclude(mut self, path: impl Into<String>) -> Self {
        self.exclude.insert(path.into());
        self
    }

    /// Add an equality filter candidate
    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    /// Append an ordering field
    pub fn with_order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by.push(field.into());
        self
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|entry| !entry.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_reserved_and_filter_parameters() {
        let params = RequestParams::from_query_pairs([
            ("depth", "2"),
            ("exclude", "comments,author.profile"),
            ("order_by", "name,-created_at"),
            ("author__name", "ada"),
            ("title", "first"),
        ])
        .unwrap();

        assert_eq!(params.depth, Some(2));
        assert!(params.exclude.contains("comments"));
        assert!(params.exclude.contains("author.profile"));
        assert_eq!(params.order_by, vec!["name", "-created_at"]);
        assert_eq!(params.filters.get("author__name").map(String::as_str), Some("ada"));
        assert_eq!(params.filters.get("title").map(String::as_str), Some("first"));
    }

    #[test]
    fn test_malformed_depth_is_a_client_error() {
        let result = RequestParams::from_query_pairs([("depth", "ten")]);
        assert!(matches!(result, Err(Error::InvalidParameter(_))));

        let result = RequestParams::from_query_pairs([("depth", "-1")]);
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_empty_list_entries_are_dropped() {
        let params =
            RequestParams::from_query_pairs([("exclude", ",comments,"), ("order_by", "")]).unwrap();
        assert_eq!(params.exclude.len(), 1);
        assert!(params.order_by.is_empty());
    }

    #[test]
    fn test_missing_depth_stays_unset() {
        let params = RequestParams::from_query_pairs([("title", "first")]).unwrap();
        assert_eq!(params.depth, None);
    }
}
