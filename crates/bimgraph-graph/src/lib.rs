//! bimgraph-graph — Neo4j adapter for the building graph.
//!
//! This crate is the single mutation point for the persistent graph. The
//! ingestion pipeline hands it a validated `CommitPlan`; everything in the
//! plan is applied with MERGE semantics keyed on external identifiers, so
//! replaying a plan is a no-op.

pub mod client;
pub mod mutations;
pub mod queries;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use queries::NodeRecord;
