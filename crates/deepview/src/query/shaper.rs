//! Query shaper - turns request parameters into a fetch plan
//!
//! Every filter and ordering key coming from the request is an untrusted
//! lookup against the handler's precomputed legal field set; unknown keys
//! are dropped, never interpreted.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use crate::handler::Handler;
use crate::paths::PATH_SEPARATOR;
use crate::query::params::RequestParams;

/// The resolved fetch specification for one request.
///
/// Owned solely by the request that created it and discarded after the
/// query executes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FetchPlan {
    /// Relation paths to eager-load, after exclusion and depth filtering
    pub eager_load: BTreeSet<String>,
    /// Validated equality filters
    pub filters: BTreeMap<String, String>,
    /// Validated ordering fields, first listed is the primary sort
    pub order_by: Vec<String>,
}

/// Shape a fetch plan from request parameters and the handler's path sets.
///
/// Depth 0 keeps the root entity only. Excluding a path excludes its whole
/// subtree; matching is on whole path segments, not substrings.
pub fn shape(handler: &Handler, params: &RequestParams) -> FetchPlan {
    let depth = params.depth.unwrap_or_else(|| handler.default_depth());

    let eager_load = handler
        .relation_paths()
        .iter()
        .filter(|path| !is_excluded(path, &params.exclude))
        .filter(|path| path.split(PATH_SEPARATOR).count() <= depth)
        .cloned()
        .collect();

    let mut filters = BTreeMap::new();
    for (field, value) in &params.filters {
        if handler.filterable_fields().contains(field) {
            filters.insert(field.clone(), value.clone());
        } else {
            debug!(entity = %handler.entity().name, field = %field, "dropping unknown filter field");
        }
    }

    let mut order_by = Vec::new();
    for field in &params.order_by {
        let name = field.strip_prefix('-').unwrap_or(field);
        if handler.filterable_fields().contains(name) {
            order_by.push(field.clone());
        } else {
            debug!(entity = %handler.entity().name, field = %field, "dropping unknown ordering field");
        }
    }

    FetchPlan {
        eager_load,
        filters,
        order_by,
    }
}

fn is_excluded(path: &str, excludes: &BTreeSet<String>) -> bool {
    excludes.iter().any(|exclude| {
        path.strip_prefix(exclude.as_str())
            .map_or(false, |rest| rest.is_empty() || rest.starts_with(PATH_SEPARATOR))
    })
}
