//! Transactional write seam
//!
//! The storage engine owns persistence; the write engine only drives it.
//! One transaction spans the whole recursive descent of a nested write,
//! so a failure discovered deep in the payload rolls everything back.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::DeepResult;

/// Opens write transactions against the storage engine
#[async_trait]
pub trait TransactionalStore: Send + Sync {
    /// Begin a transaction covering one nested write
    async fn begin(&self) -> DeepResult<Box<dyn WriteTransaction>>;
}

/// One open write transaction.
///
/// `upsert` must return the persisted representation of the row including
/// its primary key, whether the row was inserted or updated.
#[async_trait]
pub trait WriteTransaction: Send {
    /// Insert or update one row from scalar values
    async fn upsert(&mut self, entity: &str, values: &Map<String, Value>) -> DeepResult<Value>;

    /// Associate a child row with a parent through the named relation
    async fn associate(
        &mut self,
        entity: &str,
        parent_id: &Value,
        relation: &str,
        child_id: &Value,
    ) -> DeepResult<()>;

    /// Make every staged change durable
    async fn commit(self: Box<Self>) -> DeepResult<()>;

    /// Discard every staged change
    async fn rollback(self: Box<Self>) -> DeepResult<()>;
}
