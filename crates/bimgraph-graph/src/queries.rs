//! Read operations for the building graph.

use neo4rs::query;

use crate::client::{GraphClient, GraphError};

/// A lightweight record returned from node queries.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NodeRecord {
    pub global_id: String,
    pub label: String,
    pub properties: serde_json::Value,
}

impl GraphClient {
    // ── Single Node Lookups ──────────────────────────────────────

    /// Get a node by label and global_id.
    pub async fn get_node(&self, label: &str, global_id: &str) -> Result<NodeRecord, GraphError> {
        let cypher = format!(
            "MATCH (n:{label} {{global_id: $global_id}})
             RETURN n"
        );

        let q = query(&cypher).param("global_id", global_id);

        match self.query_one(q).await? {
            Some(row) => {
                let node: neo4rs::Node = row.get("n").map_err(|e| {
                    GraphError::Serialization(format!("Failed to deserialize node: {e}"))
                })?;
                Ok(neo4j_node_to_record(&node, label))
            }
            None => Err(GraphError::NotFound {
                label: label.to_string(),
                global_id: global_id.to_string(),
            }),
        }
    }

    // ── List Queries ─────────────────────────────────────────────

    /// List all nodes of a given label.
    pub async fn list_nodes(
        &self,
        label: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<NodeRecord>, GraphError> {
        let cypher = format!(
            "MATCH (n:{label})
             RETURN n
             ORDER BY n.last_seen DESC
             SKIP $offset LIMIT $limit"
        );

        let q = query(&cypher)
            .param("limit", limit as i64)
            .param("offset", offset as i64);

        let rows = self.query_rows(q).await?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let node: neo4rs::Node = row.get("n").map_err(|e| {
                GraphError::Serialization(format!("Failed to deserialize node: {e}"))
            })?;
            results.push(neo4j_node_to_record(&node, label));
        }
        Ok(results)
    }

    /// Count nodes of a given label.
    pub async fn count_nodes(&self, label: &str) -> Result<i64, GraphError> {
        let cypher = format!(
            "MATCH (n:{label})
             RETURN count(n) AS cnt"
        );

        match self.query_one(query(&cypher)).await? {
            Some(row) => Ok(row.get::<i64>("cnt").unwrap_or(0)),
            None => Ok(0),
        }
    }

    // ── Containment and Hosting ──────────────────────────────────

    /// Elements contained in a spatial container (space or storey),
    /// traversed through the reified containment relationship.
    pub async fn contained_elements(
        &self,
        container_global_id: &str,
    ) -> Result<Vec<NodeRecord>, GraphError> {
        let q = query(
            "MATCH (c {global_id: $global_id})
                   -[:RELATING]->(:RelContainedInSpatialStructure)
                   -[:RELATED]->(e)
             RETURN e, labels(e) AS labels",
        )
        .param("global_id", container_global_id);

        let rows = self.query_rows(q).await?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let node: neo4rs::Node = row.get("e").map_err(|e| {
                GraphError::Serialization(format!("Failed to deserialize element: {e}"))
            })?;
            let labels: Vec<String> = row.get("labels").unwrap_or_default();
            let label = labels.first().cloned().unwrap_or_default();
            results.push(neo4j_node_to_record(&node, &label));
        }
        Ok(results)
    }

    /// Elements hosted by a wall, with the placement ratio carried on the
    /// HOSTS edge.
    pub async fn hosted_elements(
        &self,
        wall_global_id: &str,
    ) -> Result<Vec<(NodeRecord, f64)>, GraphError> {
        let q = query(
            "MATCH (w:Wall {global_id: $global_id})-[h:HOSTS]->(e)
             RETURN e, labels(e) AS labels, h.placement_ratio AS ratio",
        )
        .param("global_id", wall_global_id);

        let rows = self.query_rows(q).await?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let node: neo4rs::Node = row.get("e").map_err(|e| {
                GraphError::Serialization(format!("Failed to deserialize element: {e}"))
            })?;
            let labels: Vec<String> = row.get("labels").unwrap_or_default();
            let label = labels.first().cloned().unwrap_or_default();
            let ratio: f64 = row.get("ratio").unwrap_or(0.0);
            results.push((neo4j_node_to_record(&node, &label), ratio));
        }
        Ok(results)
    }

    /// The placement chain of an element, root last: element placement,
    /// then each ancestor via PLACEMENT_REL_TO.
    pub async fn placement_chain(
        &self,
        element_global_id: &str,
    ) -> Result<Vec<NodeRecord>, GraphError> {
        let q = query(
            "MATCH (e {global_id: $global_id})-[:OBJECT_PLACEMENT]->(p)
             MATCH path = (p)-[:PLACEMENT_REL_TO*0..]->(root)
             WHERE NOT (root)-[:PLACEMENT_REL_TO]->()
             UNWIND nodes(path) AS n
             RETURN n",
        )
        .param("global_id", element_global_id);

        let rows = self.query_rows(q).await?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let node: neo4rs::Node = row.get("n").map_err(|e| {
                GraphError::Serialization(format!("Failed to deserialize placement: {e}"))
            })?;
            results.push(neo4j_node_to_record(&node, "LocalPlacement"));
        }
        Ok(results)
    }
}

/// Convert a neo4rs::Node to our lightweight NodeRecord.
fn neo4j_node_to_record(node: &neo4rs::Node, label: &str) -> NodeRecord {
    let global_id: String = node.get("global_id").unwrap_or_default();

    let mut props = serde_json::Map::new();
    for key in &[
        "name",
        "ifc_class",
        "long_name",
        "object_type",
        "phase",
        "first_seen",
        "last_seen",
    ] {
        if let Ok(v) = node.get::<String>(key) {
            props.insert((*key).to_string(), serde_json::Value::String(v));
        }
    }
    for key in &[
        "size_x",
        "size_y",
        "size_z",
        "length",
        "depth",
        "elevation",
        "placement_ratio",
    ] {
        if let Ok(v) = node.get::<f64>(key) {
            if let Some(num) = serde_json::Number::from_f64(v) {
                props.insert((*key).to_string(), serde_json::Value::Number(num));
            }
        }
    }

    NodeRecord {
        global_id,
        label: label.to_string(),
        properties: serde_json::Value::Object(props),
    }
}
