//! Entity type and scalar field definitions

use std::fmt;

use serde::{Deserialize, Serialize};

use super::relation::Relation;

/// Declared type of a scalar field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Text,
    Integer,
    Float,
    Boolean,
    Json,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Json => "json",
        };
        write!(f, "{}", name)
    }
}

/// A scalar field declaration on an entity type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Column name of the field
    pub name: String,
    /// Declared scalar type
    pub field_type: FieldType,
    /// Whether an explicit null value is rejected
    pub required: bool,
}

impl FieldDef {
    /// Create an optional field of the given type
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
        }
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// A named schema node with an ordered set of scalar fields and relations.
///
/// Built once at process start from the storage layer's schema description
/// and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityType {
    /// Unique name of the entity type
    pub name: String,
    /// Primary key field name
    pub primary_key: String,
    /// Ordered scalar field declarations
    pub fields: Vec<FieldDef>,
    /// Ordered relation declarations
    pub relations: Vec<Relation>,
}

impl EntityType {
    /// Create an entity type with the default `id` primary key
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_key: "id".to_string(),
            fields: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Override the primary key field name
    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    /// Declare a scalar field
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Declare a relation
    pub fn relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    /// Look up a scalar field by name
    pub fn field_def(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Look up a relation by name
    pub fn relation_def(&self, name: &str) -> Option<&Relation> {
        self.relations.iter().find(|relation| relation.name == name)
    }
}
