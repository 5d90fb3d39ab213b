//! bimgraph-core: Shared types, schema registry, and error handling for bimgraph.
//!
//! This crate provides the foundational types used across all bimgraph components:
//! - Node and relationship kinds for the building graph (the IFC subset)
//! - Attribute values and external identifiers
//! - The schema registry (cardinalities, kind sets, ownership rules)
//! - The violation report model
//! - The CommitPlan handed to the persistence sink

pub mod error;
pub mod plan;
pub mod report;
pub mod schema;
pub mod types;

pub use error::SchemaError;
pub use plan::{CommitPlan, NodeUpsert, RelationshipUpsert};
pub use report::{Severity, Violation, ViolationKind};
pub use types::{AttrValue, EdgeKind, GlobalId, NodeKind, RelKind};
