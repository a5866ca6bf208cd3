//! Relation declarations between entity types

use serde::{Deserialize, Serialize};

/// Defines the cardinality of a relation between entity types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// The source row references exactly one target row
    ToOne,
    /// The source row owns a collection of target rows
    ToMany,
    /// The inverse side of a target's to-one relation back to the source
    ReverseToMany,
}

impl RelationKind {
    /// Returns true if this relation resolves to a collection of rows
    pub fn is_collection(self) -> bool {
        matches!(self, Self::ToMany | Self::ReverseToMany)
    }
}

/// A declared reference from one entity type to another.
///
/// `foreign_key` names the column that carries the reference. For a
/// [`RelationKind::ToOne`] relation it is the source-side slot that stores
/// the target identity and defaults to the relation name; for collection
/// relations it is the target-side column that stores the source identity
/// and has no default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Name of the relation (payload and path segment vocabulary)
    pub name: String,
    /// Name of the target entity type
    pub target: String,
    /// Cardinality of the relation
    pub kind: RelationKind,
    /// Column carrying the reference, see the type-level docs
    pub foreign_key: Option<String>,
}

impl Relation {
    /// Create a to-one relation
    pub fn to_one(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, target, RelationKind::ToOne)
    }

    /// Create a to-many relation
    pub fn to_many(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, target, RelationKind::ToMany)
    }

    /// Create the inverse side of a target's to-one relation
    pub fn reverse_to_many(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, target, RelationKind::ReverseToMany)
    }

    fn new(name: impl Into<String>, target: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            kind,
            foreign_key: None,
        }
    }

    /// Set the column carrying the reference
    pub fn with_foreign_key(mut self, foreign_key: impl Into<String>) -> Self {
        self.foreign_key = Some(foreign_key.into());
        self
    }

    /// The source-side slot storing a to-one target identity
    pub fn parent_slot(&self) -> &str {
        self.foreign_key.as_deref().unwrap_or(&self.name)
    }

    /// The target-side column storing the source identity, when declared
    pub fn child_key(&self) -> Option<&str> {
        self.foreign_key.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_kind_collections() {
        assert!(RelationKind::ToMany.is_collection());
        assert!(RelationKind::ReverseToMany.is_collection());
        assert!(!RelationKind::ToOne.is_collection());
    }

    #[test]
    fn test_parent_slot_defaults_to_relation_name() {
        let relation = Relation::to_one("author", "User");
        assert_eq!(relation.parent_slot(), "author");

        let relation = Relation::to_one("author", "User").with_foreign_key("author_id");
        assert_eq!(relation.parent_slot(), "author_id");
    }

    #[test]
    fn test_child_key_requires_declaration() {
        let relation = Relation::reverse_to_many("comments", "Comment");
        assert_eq!(relation.child_key(), None);

        let relation = relation.with_foreign_key("post_id");
        assert_eq!(relation.child_key(), Some("post_id"));
    }
}
