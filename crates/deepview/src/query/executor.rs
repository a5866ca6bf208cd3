//! Query executor seam
//!
//! The storage engine is an external collaborator; the engine hands it a
//! fetch plan and gets rows back. Implementations must support equality
//! filtering by field path, multi-key ordering, and eager loading by
//! dotted relation path so that nested reads avoid N+1 fetch patterns.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::DeepResult;
use crate::query::shaper::FetchPlan;

/// Executes a fetch plan against a base collection of entity rows
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Fetch the rows of `entity` selected and shaped by `plan`
    async fn fetch(&self, entity: &str, plan: &FetchPlan) -> DeepResult<Vec<Value>>;
}
