//! # deepview: introspection-driven deep read/write handlers
//!
//! Exposes a relational schema through generic request handlers without
//! one handler implementation per entity type. The schema graph is walked
//! once per (use case, entity type) to enumerate every legal relation
//! path; request parameters are then shaped into a fetch plan against
//! that precomputed set, and nested payloads are persisted atomically
//! through the write engine.
//!
//! Storage, routing and scalar (de)serialization are external
//! collaborators reached through the `QueryExecutor`, `TransactionalStore`,
//! `Serializer` and `FieldValidator` seams.

pub mod error;
pub mod handler;
pub mod paths;
pub mod query;
pub mod schema;
pub mod serializer;
pub mod validate;
pub mod write;


// Re-export core types
pub use error::*;
pub use handler::*;
pub use paths::*;
pub use query::*;
pub use schema::*;
pub use serializer::*;
pub use validate::*;
pub use write::*;
