//! Error types for the bimgraph-ingest crate.

use thiserror::Error;

use bimgraph_core::{GlobalId, NodeKind, Violation};

use crate::record::RefRole;

fn first_fatal(violations: &[Violation]) -> String {
    violations
        .iter()
        .find(|v| v.is_fatal())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "no fatal violation".to_string())
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Unknown kind tag {kind:?} on record {global_id}")]
    UnknownKind { global_id: GlobalId, kind: String },

    #[error("Identity conflict on {global_id}: registered as {existing}, record claims {incoming}")]
    IdentityConflict {
        global_id: GlobalId,
        existing: NodeKind,
        incoming: NodeKind,
    },

    #[error("Record {global_id} references unknown target {target} in role {role}")]
    UnresolvedReference {
        global_id: GlobalId,
        role: RefRole,
        target: GlobalId,
    },

    #[error("Malformed record {global_id}: {detail}")]
    MalformedRecord { global_id: GlobalId, detail: String },

    #[error("Validation failed: {}; {} violation(s) in total", first_fatal(.violations), .violations.len())]
    Validation { violations: Vec<Violation> },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IngestError>;
