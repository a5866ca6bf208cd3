//! Relation graph walker - cycle-safe path enumeration
//!
//! Computes, per entity type, the exhaustive set of dotted relation paths
//! for eager loading and the `__`-joined field universe that filter and
//! ordering parameters are checked against. Both walks refuse to descend
//! into an entity type already visited on the current descent, so they
//! terminate on cyclic and self-referential schemas.

use std::collections::{BTreeSet, HashSet};

use crate::schema::{EntityType, SchemaGraph};

/// Separator for eager-load relation paths (`"author.profile"`)
pub const PATH_SEPARATOR: &str = ".";

/// Separator for filter and ordering field paths (`"author__name"`)
pub const FIELD_SEPARATOR: &str = "__";

/// Enumerate every valid dotted relation path reachable from `root`.
///
/// A relation whose target is already an ancestor on the current descent
/// still contributes its single segment but is not expanded further. An
/// entity type with no relations yields the empty set.
pub fn relation_paths(schema: &SchemaGraph, root: &EntityType) -> BTreeSet<String> {
    let mut visited = HashSet::new();
    collect_relation_paths(schema, root, &mut visited)
}

fn collect_relation_paths(
    schema: &SchemaGraph,
    root: &EntityType,
    visited: &mut HashSet<String>,
) -> BTreeSet<String> {
    let mut paths = BTreeSet::new();
    visited.insert(root.name.clone());
    for relation in &root.relations {
        paths.insert(relation.name.clone());
        if visited.contains(&relation.target) {
            continue;
        }
        // Targets are validated at schema construction.
        if let Some(target) = schema.entity(&relation.target) {
            for inner in collect_relation_paths(schema, target, visited) {
                paths.insert(format!("{}{}{}", relation.name, PATH_SEPARATOR, inner));
            }
        }
    }
    visited.remove(&root.name);
    paths
}

/// Enumerate the legal universe of filter and ordering fields for `root`:
/// its scalar fields, its relation names, and recursively
/// `relation__<field>` for every non-revisited relation target.
pub fn filterable_fields(schema: &SchemaGraph, root: &EntityType) -> BTreeSet<String> {
    let mut visited = HashSet::new();
    collect_filterable_fields(schema, root, &mut visited)
}

fn collect_filterable_fields(
    schema: &SchemaGraph,
    root: &EntityType,
    visited: &mut HashSet<String>,
) -> BTreeSet<String> {
    let mut fields = BTreeSet::new();
    visited.insert(root.name.clone());
    for field in &root.fields {
        fields.insert(field.name.clone());
    }
    for relation in &root.relations {
        fields.insert(relation.name.clone());
        if visited.contains(&relation.target) {
            continue;
        }
        if let Some(target) = schema.entity(&relation.target) {
            for inner in collect_filterable_fields(schema, target, visited) {
                fields.insert(format!("{}{}{}", relation.name, FIELD_SEPARATOR, inner));
            }
        }
    }
    visited.remove(&root.name);
    fields
}
