//! bimgraph-ingest: turns parsed exchange records into a validated
//! property graph and a replayable commit plan.
//!
//! One `Ingestor` owns the staging store and identity index; ingestion of
//! a document is a single-writer pass that upserts nodes, resolves every
//! cross-reference, validates the snapshot, and emits a `CommitPlan` for
//! the Neo4j adapter.

pub mod config;
pub mod error;
pub mod identity;
pub mod pipeline;
pub mod record;
pub mod store;
pub mod validate;

pub use config::IngestConfig;
pub use error::{IngestError, Result};
pub use pipeline::Ingestor;
pub use record::{Record, RecordRef, RefRole};
pub use store::{GraphStore, Snapshot};
