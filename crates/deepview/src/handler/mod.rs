//! Handlers - per (use case, entity type) request processing
//!
//! A handler owns everything that is computed once per entity type and
//! use case: the legal path sets from the relation graph walker, the
//! use-case capabilities, and the serialization strategy. Handlers are
//! built lazily by the [`HandlerRegistry`](registry::HandlerRegistry) and
//! reused for the process lifetime.

pub mod registry;

pub use registry::{HandlerRegistry, RegistryStats};

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{DeepResult, Error};
use crate::paths;
use crate::query::{shape, FetchPlan, QueryExecutor, RequestParams};
use crate::schema::{EntityType, SchemaGraph};
use crate::serializer::Serializer;
use crate::write::{NestedWriteEngine, OnInvalid, TransactionalStore};

/// Fixed suffix of registry keys
pub const HANDLER_SUFFIX: &str = "Handler";

/// Eager-load depth applied when a request does not specify one
pub const DEFAULT_DEPTH: usize = 10;

/// Capabilities of a named access mode.
///
/// An empty label denotes the default read-write handler; other labels
/// select a handler variant for that use case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UseCase {
    /// Label prefixed to registry keys
    pub label: String,
    /// Whether deep writes are permitted
    pub allow_write: bool,
    /// Eager-load depth applied when a request does not specify one
    pub default_depth: usize,
}

impl UseCase {
    /// The default read-write use case (empty label)
    pub fn read_write() -> Self {
        Self {
            label: String::new(),
            allow_write: true,
            default_depth: DEFAULT_DEPTH,
        }
    }

    /// The read-only use case
    pub fn read_only() -> Self {
        Self {
            label: "ReadOnly".to_string(),
            allow_write: false,
            default_depth: DEFAULT_DEPTH,
        }
    }

    /// Use a custom label for this use case
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Override the default eager-load depth
    pub fn with_default_depth(mut self, depth: usize) -> Self {
        self.default_depth = depth;
        self
    }

    /// Registry key for this use case and entity name
    pub fn key_for(&self, entity_name: &str) -> String {
        format!("{}{}{}", self.label, entity_name, HANDLER_SUFFIX)
    }
}

/// Request handler for one (use case, entity type) pair
pub struct Handler {
    entity: Arc<EntityType>,
    use_case: UseCase,
    key: String,
    relation_paths: BTreeSet<String>,
    filterable_fields: BTreeSet<String>,
    serializer: Arc<dyn Serializer>,
}

impl Handler {
    /// Construct a handler, computing its legal path sets via the walker.
    ///
    /// Exclusion is a per-request concern and plays no part here.
    pub fn new(
        schema: &SchemaGraph,
        entity_name: &str,
        use_case: UseCase,
        serializer: Arc<dyn Serializer>,
    ) -> DeepResult<Self> {
        let entity = schema.expect_entity(entity_name)?.clone();
        let relation_paths = paths::relation_paths(schema, &entity);
        let filterable_fields = paths::filterable_fields(schema, &entity);
        let key = use_case.key_for(&entity.name);
        Ok(Self {
            entity,
            use_case,
            key,
            relation_paths,
            filterable_fields,
            serializer,
        })
    }

    /// The entity type this handler serves
    pub fn entity(&self) -> &Arc<EntityType> {
        &self.entity
    }

    /// The use case this handler serves
    pub fn use_case(&self) -> &UseCase {
        &self.use_case
    }

    /// Registry key of this handler
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Every legal dotted eager-load path from this handler's entity
    pub fn relation_paths(&self) -> &BTreeSet<String> {
        &self.relation_paths
    }

    /// The legal universe of filter and ordering field paths
    pub fn filterable_fields(&self) -> &BTreeSet<String> {
        &self.filterable_fields
    }

    /// Depth applied when a request does not specify one
    pub fn default_depth(&self) -> usize {
        self.use_case.default_depth
    }

    /// The serialization strategy attached at build time
    pub fn serializer(&self) -> &Arc<dyn Serializer> {
        &self.serializer
    }

    /// Shape a fetch plan from request parameters
    pub fn fetch_plan(&self, params: &RequestParams) -> FetchPlan {
        shape(self, params)
    }

    /// Shape, execute and serialize one read request
    pub async fn read(
        &self,
        params: &RequestParams,
        executor: &dyn QueryExecutor,
    ) -> DeepResult<Vec<Value>> {
        let plan = self.fetch_plan(params);
        let records = executor.fetch(&self.entity.name, &plan).await?;
        Ok(records
            .iter()
            .map(|record| self.serializer.serialize(record))
            .collect())
    }

    /// Persist a nested payload through the write engine.
    ///
    /// Rejected for read-only use cases before any storage work happens.
    pub async fn deep_write(
        &self,
        engine: &NestedWriteEngine,
        store: &dyn TransactionalStore,
        payload: &Value,
        on_invalid: OnInvalid,
    ) -> DeepResult<Value> {
        if !self.use_case.allow_write {
            return Err(Error::Unsupported(format!(
                "handler '{}' is read-only",
                self.key
            )));
        }
        let persisted = engine
            .upsert(&self.entity.name, payload, store, on_invalid)
            .await?;
        Ok(self.serializer.serialize(&persisted))
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("key", &self.key)
            .field("entity", &self.entity.name)
            .field("use_case", &self.use_case)
            .field("relation_paths", &self.relation_paths.len())
            .field("filterable_fields", &self.filterable_fields.len())
            .finish()
    }
}
