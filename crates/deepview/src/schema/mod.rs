//! Schema description - explicit entity and relation declarations
//!
//! The schema graph is constructed once from the storage layer's own
//! schema description and treated as immutable input everywhere else.
//! Relations may form cycles; the graph is not required to be acyclic.

pub mod entity;
pub mod relation;

pub use entity::{EntityType, FieldDef, FieldType};
pub use relation::{Relation, RelationKind};

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{DeepResult, Error};

/// Immutable map of entity types keyed by name.
///
/// Construction validates every relation target against the declared
/// entity set; an undeclared target is fatal at startup.
#[derive(Debug, Clone)]
pub struct SchemaGraph {
    entities: BTreeMap<String, Arc<EntityType>>,
}

impl SchemaGraph {
    /// Build and validate a schema graph from entity declarations
    pub fn new(entities: Vec<EntityType>) -> DeepResult<Self> {
        let mut map = BTreeMap::new();
        for entity in entities {
            let name = entity.name.clone();
            if map.insert(name.clone(), Arc::new(entity)).is_some() {
                return Err(Error::Schema(format!("entity '{}' declared twice", name)));
            }
        }

        for entity in map.values() {
            for relation in &entity.relations {
                if !map.contains_key(&relation.target) {
                    return Err(Error::Schema(format!(
                        "relation '{}.{}' targets undeclared entity '{}'",
                        entity.name, relation.name, relation.target
                    )));
                }
                if entity.field_def(&relation.name).is_some() {
                    return Err(Error::Schema(format!(
                        "relation '{}.{}' collides with a scalar field of the same name",
                        entity.name, relation.name
                    )));
                }
            }
        }

        Ok(Self { entities: map })
    }

    /// Look up an entity type by name
    pub fn entity(&self, name: &str) -> Option<&Arc<EntityType>> {
        self.entities.get(name)
    }

    /// Look up an entity type by name, failing with a schema error
    pub fn expect_entity(&self, name: &str) -> DeepResult<&Arc<EntityType>> {
        self.entity(name)
            .ok_or_else(|| Error::Schema(format!("unknown entity type '{}'", name)))
    }

    /// Iterate over all declared entity names
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(|name| name.as_str())
    }

    /// Number of declared entity types
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check whether the schema declares no entity types
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_graph_validates_targets() {
        let result = SchemaGraph::new(vec![
            EntityType::new("Post").relation(Relation::to_one("author", "User")),
        ]);

        match result {
            Err(Error::Schema(message)) => assert!(message.contains("User")),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_graph_rejects_duplicate_entities() {
        let result = SchemaGraph::new(vec![EntityType::new("Post"), EntityType::new("Post")]);
        assert!(matches!(result, Err(Error::Schema(_))));
    }

    #[test]
    fn test_schema_graph_rejects_field_relation_collision() {
        let result = SchemaGraph::new(vec![
            EntityType::new("Post")
                .field(FieldDef::new("author", FieldType::Text))
                .relation(Relation::to_one("author", "User")),
            EntityType::new("User"),
        ]);
        assert!(matches!(result, Err(Error::Schema(_))));
    }

    #[test]
    fn test_schema_graph_lookup() {
        let schema = SchemaGraph::new(vec![
            EntityType::new("Post").relation(Relation::to_one("author", "User")),
            EntityType::new("User"),
        ])
        .unwrap();

        assert_eq!(schema.len(), 2);
        assert!(schema.entity("Post").is_some());
        assert!(schema.entity("Missing").is_none());
        assert!(schema.expect_entity("Missing").is_err());
        assert_eq!(schema.entity_names().collect::<Vec<_>>(), vec!["Post", "User"]);
    }

    #[test]
    fn test_schema_graph_allows_cycles() {
        let schema = SchemaGraph::new(vec![
            EntityType::new("Node").relation(Relation::to_one("parent", "Node")),
        ]);
        assert!(schema.is_ok());
    }
}
