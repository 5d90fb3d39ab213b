//! The ingestion pipeline: parsed records in, validated commit plan out.
//!
//! Ingestion of one document is a single logical transaction over the
//! staging store. Records are consumed in two passes — all nodes first,
//! then all edges — so forward references resolve no matter how the
//! producer ordered the document. Nothing outside the store and identity
//! index is touched until the caller hands the plan to the sink.

use std::collections::BTreeMap;

use bimgraph_core::{
    schema, AttrValue, CommitPlan, EdgeKind, GlobalId, NodeUpsert, RelationshipUpsert, Violation,
    ViolationKind,
};

use crate::config::IngestConfig;
use crate::error::{IngestError, Result};
use crate::identity::NodeHandle;
use crate::record::{Record, RefRole};
use crate::store::{GraphStore, Snapshot};
use crate::validate;

/// Single-writer ingestion engine.
///
/// The store persists across documents, so re-ingesting a corrected or
/// repeated document upserts rather than duplicates, and cross-document
/// identifier collisions are detected deterministically.
pub struct Ingestor {
    store: GraphStore,
    config: IngestConfig,
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new(IngestConfig::default())
    }
}

impl Ingestor {
    pub fn new(config: IngestConfig) -> Self {
        Self {
            store: GraphStore::new(),
            config,
        }
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Ingest one document. All-or-nothing: on any error the staging
    /// store is rolled back to its pre-document state and no plan is
    /// produced; the validator still reports the complete violation list.
    pub fn ingest(&mut self, records: &[Record]) -> Result<CommitPlan> {
        let checkpoint = self.store.clone();
        match self.ingest_document(records) {
            Ok(plan) => Ok(plan),
            Err(err) => {
                self.store = checkpoint;
                Err(err)
            }
        }
    }

    fn ingest_document(&mut self, records: &[Record]) -> Result<CommitPlan> {
        // Pass 1: upsert every node so later references resolve.
        let mut batch = Vec::with_capacity(records.len());
        for record in records {
            let kind = match schema::parse_kind(&record.kind) {
                Ok(kind) => kind,
                Err(_) if self.config.skip_unknown_kinds => {
                    tracing::warn!(
                        global_id = %record.global_id,
                        kind = %record.kind,
                        "Skipping record with unknown kind"
                    );
                    continue;
                }
                Err(_) => {
                    return Err(IngestError::UnknownKind {
                        global_id: record.global_id.clone(),
                        kind: record.kind.clone(),
                    });
                }
            };

            // A hosts record is a direct edge; it claims its identifier
            // but contributes no node.
            let handle = if kind.as_rel().map(|r| !schema::rel_spec(r).reified) == Some(true) {
                self.store.register_edge_record(&record.global_id, kind)?;
                None
            } else {
                Some(self.store.create_or_update_node(
                    kind,
                    &record.global_id,
                    record.attributes.clone(),
                )?)
            };
            batch.push((record, kind, handle));
        }

        // Pass 2: resolve references and upsert edges.
        for (record, kind, handle) in &batch {
            match (kind.as_rel(), handle) {
                (Some(rel), None) if !schema::rel_spec(rel).reified => {
                    self.link_direct_relationship(record)?;
                }
                (Some(_), Some(handle)) => self.link_reified_relationship(record, *handle)?,
                (_, Some(handle)) => self.link_entity_refs(record, *handle)?,
                _ => {}
            }
        }

        // Gate on the full snapshot.
        let snapshot = self.store.snapshot();
        let mut violations = validate::validate(&snapshot);
        if !self.config.report_orphans {
            violations.retain(|v| v.kind != ViolationKind::OrphanElement);
        }
        if violations.iter().any(|v| v.is_fatal()) {
            return Err(IngestError::Validation { violations });
        }

        for warning in &violations {
            tracing::warn!(violation = %warning, "Non-fatal violation");
        }

        let plan = build_plan(&snapshot, violations);
        let summary = plan.summary();
        tracing::info!(
            plan_id = %plan.plan_id,
            nodes = summary.node_upserts,
            relationships = summary.relationship_upserts,
            warnings = summary.warnings,
            "Ingestion complete"
        );
        Ok(plan)
    }

    fn resolve(&self, record: &Record, role: RefRole, target: &GlobalId) -> Result<NodeHandle> {
        self.store
            .identity()
            .resolve(target)
            .ok_or_else(|| IngestError::UnresolvedReference {
                global_id: record.global_id.clone(),
                role,
                target: target.clone(),
            })
    }

    /// Reified relationship record: role edges around its own node.
    fn link_reified_relationship(&mut self, record: &Record, self_handle: NodeHandle) -> Result<()> {
        for r in &record.refs {
            let target = self.resolve(record, r.role, &r.target)?;
            match r.role {
                RefRole::Relating => {
                    self.store
                        .link(EdgeKind::Relating, target, self_handle, BTreeMap::new());
                }
                RefRole::Related => {
                    self.store
                        .link(EdgeKind::Related, self_handle, target, BTreeMap::new());
                }
                other => {
                    return Err(IngestError::MalformedRecord {
                        global_id: record.global_id.clone(),
                        detail: format!("role {other} is not valid on a relationship record"),
                    });
                }
            }
        }
        Ok(())
    }

    /// Hosts record: one attributed edge per related target, carrying the
    /// record's own identifier and attributes.
    fn link_direct_relationship(&mut self, record: &Record) -> Result<()> {
        let mut relating = None;
        let mut related = Vec::new();
        for r in &record.refs {
            match r.role {
                RefRole::Relating if relating.is_none() => {
                    relating = Some(self.resolve(record, r.role, &r.target)?);
                }
                RefRole::Relating => {
                    return Err(IngestError::MalformedRecord {
                        global_id: record.global_id.clone(),
                        detail: "hosts record carries more than one relating reference".into(),
                    });
                }
                RefRole::Related => related.push(self.resolve(record, r.role, &r.target)?),
                other => {
                    return Err(IngestError::MalformedRecord {
                        global_id: record.global_id.clone(),
                        detail: format!("role {other} is not valid on a hosts record"),
                    });
                }
            }
        }

        let Some(relating) = relating else {
            return Err(IngestError::MalformedRecord {
                global_id: record.global_id.clone(),
                detail: "hosts record requires a relating reference".into(),
            });
        };

        let mut attributes = record.attributes.clone();
        attributes
            .entry("global_id".to_string())
            .or_insert_with(|| AttrValue::Text(record.global_id.as_str().to_string()));
        for target in related {
            self.store
                .link(EdgeKind::Hosts, relating, target, attributes.clone());
        }
        Ok(())
    }

    /// Entity record: ownership edges, plus inverse role declarations.
    fn link_entity_refs(&mut self, record: &Record, self_handle: NodeHandle) -> Result<()> {
        for r in &record.refs {
            let target = self.resolve(record, r.role, &r.target)?;
            match r.role {
                // "I am the relating side of that relationship."
                RefRole::Relating => {
                    self.store
                        .link(EdgeKind::Relating, self_handle, target, BTreeMap::new());
                }
                // "That relationship lists me as related."
                RefRole::Related => {
                    self.store
                        .link(EdgeKind::Related, target, self_handle, BTreeMap::new());
                }
                role => {
                    self.store
                        .link(role.edge_kind(), self_handle, target, BTreeMap::new());
                }
            }
        }
        Ok(())
    }
}

/// Assemble the replayable plan: node upserts in creation order, then
/// reified relationships, then direct edges.
fn build_plan(snap: &Snapshot<'_>, warnings: Vec<Violation>) -> CommitPlan {
    let mut nodes = Vec::new();
    let mut relationships = Vec::new();

    for node in snap.nodes() {
        match node.kind.as_rel() {
            None => nodes.push(NodeUpsert {
                kind: node.kind,
                global_id: node.global_id.clone(),
                class_label: node.class_label.clone(),
                attributes: node.attributes.clone(),
            }),
            Some(rel) => relationships.push(RelationshipUpsert::Reified {
                rel,
                global_id: node.global_id.clone(),
                class_label: node.class_label.clone(),
                attributes: node.attributes.clone(),
                relating: snap
                    .incoming(node.handle, EdgeKind::Relating)
                    .map(|e| snap.node(e.from).global_id.clone())
                    .collect(),
                related: snap
                    .outgoing(node.handle, EdgeKind::Related)
                    .map(|e| snap.node(e.to).global_id.clone())
                    .collect(),
            }),
        }
    }

    for edge in snap.edges() {
        if matches!(edge.kind, EdgeKind::Relating | EdgeKind::Related) {
            continue; // folded into the reified entries above
        }
        relationships.push(RelationshipUpsert::Edge {
            kind: edge.kind,
            from: snap.node(edge.from).global_id.clone(),
            to: snap.node(edge.to).global_id.clone(),
            attributes: edge.attributes.clone(),
        });
    }

    CommitPlan::new(nodes, relationships, warnings)
}
