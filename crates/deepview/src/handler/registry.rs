//! Handler registry - build-once storage for generated handlers
//!
//! A lifecycle-scoped registry mapping `{use_case}{EntityName}Handler`
//! keys to handlers. The first request for a key builds the handler while
//! holding that key's map entry, so concurrent first requests resolve to
//! a single construction; later requests return the cached instance
//! without recomputation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::error::DeepResult;
use crate::handler::{Handler, UseCase};
use crate::schema::SchemaGraph;
use crate::serializer::{DefaultSerializer, Serializer};

/// Thread-safe registry of handlers keyed by use case and entity type
pub struct HandlerRegistry {
    schema: Arc<SchemaGraph>,
    handlers: DashMap<String, Arc<Handler>>,
    serializers: DashMap<String, Arc<dyn Serializer>>,
    builds: AtomicUsize,
}

impl HandlerRegistry {
    /// Create an empty registry over an immutable schema graph
    pub fn new(schema: Arc<SchemaGraph>) -> Self {
        Self {
            schema,
            handlers: DashMap::new(),
            serializers: DashMap::new(),
            builds: AtomicUsize::new(0),
        }
    }

    /// The schema graph this registry serves
    pub fn schema(&self) -> &Arc<SchemaGraph> {
        &self.schema
    }

    /// Return the handler for `(entity_name, use_case)`, building it on
    /// first request.
    ///
    /// The build runs while the key's map entry is held, so a concurrent
    /// first request for the same key waits and receives the single built
    /// instance; a construction race is never observable.
    pub fn get_or_build(&self, entity_name: &str, use_case: &UseCase) -> DeepResult<Arc<Handler>> {
        let key = use_case.key_for(entity_name);
        if let Some(handler) = self.handlers.get(&key) {
            return Ok(handler.clone());
        }

        match self.handlers.entry(key.clone()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                debug!(key = %key, "building handler");
                let serializer = self.serializer_for(&key);
                let handler = Arc::new(Handler::new(
                    &self.schema,
                    entity_name,
                    use_case.clone(),
                    serializer,
                )?);
                self.builds.fetch_add(1, Ordering::Relaxed);
                entry.insert(handler.clone());
                Ok(handler)
            }
        }
    }

    /// Look up a handler without building it
    pub fn get(&self, entity_name: &str, use_case: &UseCase) -> Option<Arc<Handler>> {
        self.handlers
            .get(&use_case.key_for(entity_name))
            .map(|handler| handler.clone())
    }

    /// Pre-register a manually constructed handler.
    ///
    /// The first handler stored for a key wins; a pre-registered handler
    /// is never overwritten by auto-generation.
    pub fn register(&self, handler: Arc<Handler>) {
        self.handlers
            .entry(handler.key().to_string())
            .or_insert(handler);
    }

    /// Supply the serialization strategy for an entity type and use case,
    /// consulted when that handler is built
    pub fn set_serializer(
        &self,
        entity_name: &str,
        use_case: &UseCase,
        serializer: Arc<dyn Serializer>,
    ) {
        self.serializers
            .insert(use_case.key_for(entity_name), serializer);
    }

    /// Build handlers for every named entity in one use case, e.g. at
    /// startup for the read-only surface
    pub fn register_all<'a, I>(&self, entity_names: I, use_case: &UseCase) -> DeepResult<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for name in entity_names {
            self.get_or_build(name, use_case)?;
        }
        Ok(())
    }

    /// Statistics about the registry
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            entries: self.handlers.len(),
            handlers_built: self.builds.load(Ordering::Relaxed),
        }
    }

    fn serializer_for(&self, key: &str) -> Arc<dyn Serializer> {
        self.serializers
            .get(key)
            .map(|serializer| serializer.clone())
            .unwrap_or_else(|| Arc::new(DefaultSerializer))
    }
}

/// Statistics about a handler registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
    /// Number of stored handlers, including pre-registered ones
    pub entries: usize,
    /// Number of handlers built by the registry itself
    pub handlers_built: usize,
}
