//! Configuration for the bimgraph ingestion pipeline.

use serde::Deserialize;

/// Ingestion policy knobs.
///
/// Loaded from `bimgraph.toml` `[ingest]` section or
/// `BIMGRAPH_INGEST__` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Skip records whose kind tag is outside the closed enumeration
    /// instead of aborting the document (default: abort).
    #[serde(default)]
    pub skip_unknown_kinds: bool,

    /// Attach orphan-element warnings to the commit plan.
    #[serde(default = "default_true")]
    pub report_orphans: bool,
}

fn default_true() -> bool {
    true
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            skip_unknown_kinds: false,
            report_orphans: true,
        }
    }
}
