//! Nested write engine - atomic deep create/update
//!
//! Persists a root entity together with its related payloads in one
//! transaction. To-one children are written before their parent so the
//! reference can be wired into the parent row; collection children are
//! written after it with the parent identity injected. Any failure rolls
//! the whole transaction back.

pub mod store;

pub use store::{TransactionalStore, WriteTransaction};

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{DeepResult, Error, ValidationFailure};
use crate::paths::PATH_SEPARATOR;
use crate::schema::{EntityType, Relation, SchemaGraph};
use crate::validate::{DeclaredTypeValidator, FieldValidator};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Policy for payload nodes that fail validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnInvalid {
    /// Abort the whole write on the first invalid node, rolling back
    Fail,
    /// Partial acceptance: drop invalid scalar fields and skip invalid
    /// child payloads whole. The root payload must still be an object.
    Skip,
}

/// Recursively persists a nested payload inside one transaction
pub struct NestedWriteEngine {
    schema: Arc<SchemaGraph>,
    validator: Arc<dyn FieldValidator>,
}

impl NestedWriteEngine {
    /// Create an engine validating against declared field types
    pub fn new(schema: Arc<SchemaGraph>) -> Self {
        Self::with_validator(schema, Arc::new(DeclaredTypeValidator))
    }

    /// Create an engine with an explicit validation strategy
    pub fn with_validator(schema: Arc<SchemaGraph>, validator: Arc<dyn FieldValidator>) -> Self {
        Self { schema, validator }
    }

    /// Persist `payload` as the entity graph rooted at `root`.
    ///
    /// Returns the persisted representation of the root, with every
    /// descendant's persisted representation nested under its relation
    /// key. On any failure the transaction is rolled back and storage is
    /// left unchanged.
    pub async fn upsert(
        &self,
        root: &str,
        payload: &Value,
        store: &dyn TransactionalStore,
        on_invalid: OnInvalid,
    ) -> DeepResult<Value> {
        let entity = self.schema.expect_entity(root)?.clone();
        let mut tx = store.begin().await?;
        debug!(entity = %entity.name, "beginning nested write");
        match self
            .upsert_node(&mut *tx, entity, payload, None, String::new(), on_invalid)
            .await
        {
            Ok(persisted) => {
                tx.commit().await?;
                Ok(persisted)
            }
            Err(error) => {
                warn!(entity = %root, %error, "rolling back nested write");
                if let Err(rollback_error) = tx.rollback().await {
                    warn!(entity = %root, %rollback_error, "rollback failed");
                }
                Err(error)
            }
        }
    }

    fn upsert_node<'a>(
        &'a self,
        tx: &'a mut dyn WriteTransaction,
        entity: Arc<EntityType>,
        payload: &'a Value,
        injected: Option<(String, Value)>,
        path: String,
        on_invalid: OnInvalid,
    ) -> BoxFuture<'a, DeepResult<Value>> {
        Box::pin(async move {
            let Some(object) = payload.as_object() else {
                return Err(ValidationFailure::new(path)
                    .with_error("payload", "expected a JSON object")
                    .into());
            };

            let mut scalars = Map::new();
            let mut to_one: Vec<(&Relation, &Value)> = Vec::new();
            let mut to_many: Vec<(&Relation, &Vec<Value>)> = Vec::new();
            let mut failure = ValidationFailure::new(path.clone());

            for (key, value) in object {
                if let Some(relation) = entity.relation_def(key) {
                    if relation.kind.is_collection() {
                        match value.as_array() {
                            Some(children) => to_many.push((relation, children)),
                            None => self.reject(
                                &mut failure,
                                on_invalid,
                                key,
                                "expected an array of child payloads",
                            ),
                        }
                    } else if value.is_object() {
                        to_one.push((relation, value));
                    } else if value.is_array() {
                        self.reject(&mut failure, on_invalid, key, "expected a child payload object");
                    } else {
                        // A scalar is a reference to an already persisted
                        // row, wired straight into the foreign-key slot.
                        scalars.insert(relation.parent_slot().to_string(), value.clone());
                    }
                } else if let Some(field) = entity.field_def(key) {
                    match self.validator.validate(&entity, field, value) {
                        Ok(()) => {
                            scalars.insert(key.clone(), value.clone());
                        }
                        Err(message) => self.reject(&mut failure, on_invalid, key, &message),
                    }
                } else {
                    self.reject(&mut failure, on_invalid, key, "unknown field");
                }
            }

            if !failure.is_empty() {
                return Err(failure.into());
            }

            let mut nested_to_one: Vec<(String, Value)> = Vec::new();
            for (relation, child_payload) in to_one {
                let child_entity = self.schema.expect_entity(&relation.target)?.clone();
                let child_path = node_path(&path, &relation.name);
                let child = self
                    .upsert_node(
                        &mut *tx,
                        child_entity.clone(),
                        child_payload,
                        None,
                        child_path,
                        on_invalid,
                    )
                    .await?;
                let child_id = identity_of(&child_entity, &child)?;
                scalars.insert(relation.parent_slot().to_string(), child_id);
                nested_to_one.push((relation.name.clone(), child));
            }

            if let Some((key, value)) = injected {
                scalars.insert(key, value);
            }

            let persisted = tx.upsert(&entity.name, &scalars).await?;
            let mut record = match persisted {
                Value::Object(record) => record,
                _ => {
                    return Err(Error::Storage(format!(
                        "persisted representation of '{}' is not an object",
                        entity.name
                    )))
                }
            };

            if !to_many.is_empty() {
                let parent_id = identity_of_map(&entity, &record)?;
                for (relation, children) in to_many {
                    let child_entity = self.schema.expect_entity(&relation.target)?.clone();
                    let base = node_path(&path, &relation.name);
                    let mut persisted_children = Vec::with_capacity(children.len());
                    for (index, child_payload) in children.iter().enumerate() {
                        let child_path = format!("{}{}{}", base, PATH_SEPARATOR, index);
                        if !child_payload.is_object() {
                            match on_invalid {
                                OnInvalid::Fail => {
                                    return Err(ValidationFailure::new(child_path)
                                        .with_error("payload", "expected a JSON object")
                                        .into())
                                }
                                OnInvalid::Skip => {
                                    debug!(path = %child_path, "skipping non-object child payload");
                                    continue;
                                }
                            }
                        }
                        let injected = relation
                            .child_key()
                            .map(|foreign_key| (foreign_key.to_string(), parent_id.clone()));
                        let child = self
                            .upsert_node(
                                &mut *tx,
                                child_entity.clone(),
                                child_payload,
                                injected,
                                child_path,
                                on_invalid,
                            )
                            .await?;
                        let child_id = identity_of(&child_entity, &child)?;
                        tx.associate(&entity.name, &parent_id, &relation.name, &child_id)
                            .await?;
                        persisted_children.push(child);
                    }
                    record.insert(relation.name.clone(), Value::Array(persisted_children));
                }
            }

            for (name, child) in nested_to_one {
                record.insert(name, child);
            }

            Ok(Value::Object(record))
        })
    }

    fn reject(&self, failure: &mut ValidationFailure, on_invalid: OnInvalid, field: &str, message: &str) {
        match on_invalid {
            OnInvalid::Fail => failure.add(field, message),
            OnInvalid::Skip => {
                debug!(path = %failure.path, field = %field, %message, "skipping invalid payload entry");
            }
        }
    }
}

impl fmt::Debug for NestedWriteEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NestedWriteEngine")
            .field("entities", &self.schema.len())
            .finish()
    }
}

fn node_path(base: &str, segment: &str) -> String {
    if base.is_empty() {
        segment.to_string()
    } else {
        format!("{}{}{}", base, PATH_SEPARATOR, segment)
    }
}

fn identity_of(entity: &EntityType, record: &Value) -> DeepResult<Value> {
    record
        .get(&entity.primary_key)
        .filter(|id| !id.is_null())
        .cloned()
        .ok_or_else(|| missing_primary_key(entity))
}

fn identity_of_map(entity: &EntityType, record: &Map<String, Value>) -> DeepResult<Value> {
    record
        .get(&entity.primary_key)
        .filter(|id| !id.is_null())
        .cloned()
        .ok_or_else(|| missing_primary_key(entity))
}

fn missing_primary_key(entity: &EntityType) -> Error {
    Error::Storage(format!(
        "persisted '{}' row is missing primary key '{}'",
        entity.name, entity.primary_key
    ))
}
