//! Write operations for the building graph.
//!
//! All mutations use MERGE (upsert) semantics keyed on `global_id`, so
//! re-applying a commit plan after a partial failure converges on the same
//! graph. A plan is applied inside a single transaction.

use std::collections::BTreeMap;

use chrono::Utc;
use neo4rs::query;

use bimgraph_core::{
    AttrValue, CommitPlan, EdgeKind, NodeKind, NodeUpsert, RelKind, RelationshipUpsert,
};

use crate::client::{GraphClient, GraphError};

impl GraphClient {
    /// Apply a validated commit plan: all node upserts, then all
    /// relationship upserts, in one transaction.
    pub async fn apply_plan(&self, plan: &CommitPlan) -> Result<(), GraphError> {
        let mut txn = self.start_txn().await?;
        let now = Utc::now().to_rfc3339();

        for node in &plan.nodes {
            txn.run(node_upsert_query(node, &now)?).await?;
        }

        for rel in &plan.relationships {
            match rel {
                RelationshipUpsert::Reified {
                    rel,
                    global_id,
                    class_label,
                    attributes,
                    relating,
                    related,
                } => {
                    let label = rel_label(*rel);
                    let props = props_json(attributes)?;
                    let cypher = format!(
                        "MERGE (r:{label} {{global_id: $global_id}})
                         ON CREATE SET r.first_seen = $now
                         SET r += apoc.convert.fromJsonMap($props)
                         SET r.ifc_class = $ifc_class, r.last_seen = $now"
                    );
                    txn.run(
                        query(&cypher)
                            .param("global_id", global_id.as_str())
                            .param("props", props)
                            .param("ifc_class", class_label.clone())
                            .param("now", now.clone()),
                    )
                    .await?;

                    for source in relating {
                        let cypher = format!(
                            "MATCH (a {{global_id: $source}})
                             MATCH (r:{label} {{global_id: $global_id}})
                             MERGE (a)-[e:RELATING]->(r)
                             ON CREATE SET e.first_seen = $now
                             SET e.last_seen = $now"
                        );
                        txn.run(
                            query(&cypher)
                                .param("source", source.as_str())
                                .param("global_id", global_id.as_str())
                                .param("now", now.clone()),
                        )
                        .await?;
                    }

                    for target in related {
                        let cypher = format!(
                            "MATCH (r:{label} {{global_id: $global_id}})
                             MATCH (b {{global_id: $target}})
                             MERGE (r)-[e:RELATED]->(b)
                             ON CREATE SET e.first_seen = $now
                             SET e.last_seen = $now"
                        );
                        txn.run(
                            query(&cypher)
                                .param("global_id", global_id.as_str())
                                .param("target", target.as_str())
                                .param("now", now.clone()),
                        )
                        .await?;
                    }
                }
                RelationshipUpsert::Edge {
                    kind,
                    from,
                    to,
                    attributes,
                } => {
                    let rel_type = edge_kind_to_cypher(*kind);
                    let props = props_json(attributes)?;
                    let cypher = format!(
                        "MATCH (a {{global_id: $from}})
                         MATCH (b {{global_id: $to}})
                         MERGE (a)-[e:{rel_type}]->(b)
                         ON CREATE SET e.first_seen = $now
                         SET e += apoc.convert.fromJsonMap($props)
                         SET e.last_seen = $now"
                    );
                    txn.run(
                        query(&cypher)
                            .param("from", from.as_str())
                            .param("to", to.as_str())
                            .param("props", props)
                            .param("now", now.clone()),
                    )
                    .await?;
                }
            }
        }

        txn.commit().await?;
        tracing::info!(
            plan_id = %plan.plan_id,
            nodes = plan.nodes.len(),
            relationships = plan.relationships.len(),
            "Commit plan applied"
        );
        Ok(())
    }

    /// Delete a node and its edges by label and global_id.
    pub async fn delete_node(&self, label: &str, global_id: &str) -> Result<(), GraphError> {
        let cypher = format!(
            "MATCH (n:{label} {{global_id: $global_id}})
             DETACH DELETE n"
        );
        self.run(query(&cypher).param("global_id", global_id)).await
    }
}

fn node_upsert_query(node: &NodeUpsert, now: &str) -> Result<neo4rs::Query, GraphError> {
    let label = kind_label(node.kind);
    let props = props_json(&node.attributes)?;
    let cypher = format!(
        "MERGE (n:{label} {{global_id: $global_id}})
         ON CREATE SET n.first_seen = $now
         SET n += apoc.convert.fromJsonMap($props)
         SET n.ifc_class = $ifc_class, n.last_seen = $now"
    );
    Ok(query(&cypher)
        .param("global_id", node.global_id.as_str())
        .param("props", props)
        .param("ifc_class", node.class_label.clone())
        .param("now", now.to_string()))
}

fn props_json(attributes: &BTreeMap<String, AttrValue>) -> Result<String, GraphError> {
    serde_json::to_string(attributes).map_err(|e| GraphError::Serialization(e.to_string()))
}

// ── Helpers ──────────────────────────────────────────────────────

/// The Neo4j label for a node kind. Fixed per kind; the IFC class goes
/// into the `ifc_class` property instead of the label set.
pub fn kind_label(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Project => "Project",
        NodeKind::Site => "Site",
        NodeKind::Building => "Building",
        NodeKind::Storey => "Storey",
        NodeKind::Space => "Space",
        NodeKind::Column => "Column",
        NodeKind::Beam => "Beam",
        NodeKind::Wall => "Wall",
        NodeKind::Window => "Window",
        NodeKind::Door => "Door",
        NodeKind::Slab => "Slab",
        NodeKind::Opening => "Opening",
        NodeKind::Placement => "LocalPlacement",
        NodeKind::AxisPlacement => "AxisPlacement",
        NodeKind::ProfileDefinition => "ProfileDefinition",
        NodeKind::ExtrudedSolid => "ExtrudedSolid",
        NodeKind::ShapeRepresentation => "ShapeRepresentation",
        NodeKind::ProductDefinitionShape => "ProductDefinitionShape",
        NodeKind::Polyline => "Polyline",
        NodeKind::Aggregates => "RelAggregates",
        NodeKind::ConnectsElements => "RelConnectsElements",
        NodeKind::ContainedInSpatialStructure => "RelContainedInSpatialStructure",
        NodeKind::VoidsElement => "RelVoidsElement",
        NodeKind::FillsElement => "RelFillsElement",
        NodeKind::Hosts => "RelHosts",
    }
}

/// The Neo4j label for a reified relationship node.
pub fn rel_label(rel: RelKind) -> &'static str {
    kind_label(rel.node_kind())
}

/// Convert an edge kind to its Cypher relationship type string.
pub fn edge_kind_to_cypher(kind: EdgeKind) -> &'static str {
    match kind {
        EdgeKind::Relating => "RELATING",
        EdgeKind::Related => "RELATED",
        EdgeKind::Hosts => "HOSTS",
        EdgeKind::ObjectPlacement => "OBJECT_PLACEMENT",
        EdgeKind::PlacementRelTo => "PLACEMENT_REL_TO",
        EdgeKind::RelativePlacement => "RELATIVE_PLACEMENT",
        EdgeKind::Representation => "REPRESENTATION",
        EdgeKind::Representations => "REPRESENTATIONS",
        EdgeKind::Items => "ITEMS",
        EdgeKind::SweptArea => "SWEPT_AREA",
        EdgeKind::Position => "POSITION",
        EdgeKind::OuterCurve => "OUTER_CURVE",
    }
}
