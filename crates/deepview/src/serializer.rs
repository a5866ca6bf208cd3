//! Serialization strategy seam
//!
//! Producing the external representation of a persisted record belongs to
//! the layer outside the engine; handlers only hold a strategy reference.

use serde_json::Value;

/// Serialization strategy attached to a handler.
///
/// The registry attaches [`DefaultSerializer`] when no strategy was
/// explicitly supplied for an entity type and use case.
pub trait Serializer: Send + Sync {
    /// Produce the external representation of a persisted record
    fn serialize(&self, record: &Value) -> Value;
}

/// Passthrough strategy returning records unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSerializer;

impl Serializer for DefaultSerializer {
    fn serialize(&self, record: &Value) -> Value {
        record.clone()
    }
}
