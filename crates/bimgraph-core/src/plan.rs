//! The CommitPlan: the ordered set of upsert operations handed to the
//! persistence sink after successful validation.
//!
//! A plan is safe to replay: every operation is an upsert keyed on
//! external identifiers, so applying the same plan twice is a no-op.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::report::Violation;
use crate::types::{AttrValue, EdgeKind, GlobalId, NodeKind, RelKind};

/// One node upsert: entity and geometry nodes, dependency-ordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeUpsert {
    pub kind: NodeKind,
    pub global_id: GlobalId,
    pub class_label: String,
    pub attributes: BTreeMap<String, AttrValue>,
}

/// One relationship upsert, following all node upserts in the plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RelationshipUpsert {
    /// A reified relationship: its own node plus relating/related role edges.
    Reified {
        rel: RelKind,
        global_id: GlobalId,
        class_label: String,
        attributes: BTreeMap<String, AttrValue>,
        relating: Vec<GlobalId>,
        related: Vec<GlobalId>,
    },
    /// A direct attributed edge (hosts, plus the geometry ownership edges).
    Edge {
        kind: EdgeKind,
        from: GlobalId,
        to: GlobalId,
        attributes: BTreeMap<String, AttrValue>,
    },
}

impl RelationshipUpsert {
    pub fn is_reified(&self) -> bool {
        matches!(self, Self::Reified { .. })
    }
}

/// The full commit plan for one ingested document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitPlan {
    pub plan_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub nodes: Vec<NodeUpsert>,
    pub relationships: Vec<RelationshipUpsert>,
    /// Warning-class violations; they never block commit.
    pub warnings: Vec<Violation>,
}

impl CommitPlan {
    pub fn new(
        nodes: Vec<NodeUpsert>,
        relationships: Vec<RelationshipUpsert>,
        warnings: Vec<Violation>,
    ) -> Self {
        Self {
            plan_id: Uuid::new_v4(),
            created_at: Utc::now(),
            nodes,
            relationships,
            warnings,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            node_upserts: self.nodes.len(),
            relationship_upserts: self.relationships.len(),
            reified: self.relationships.iter().filter(|r| r.is_reified()).count(),
            warnings: self.warnings.len(),
        }
    }
}

/// Counts for logging and CLI output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanSummary {
    pub node_upserts: usize,
    pub relationship_upserts: usize,
    pub reified: usize,
    pub warnings: usize,
}
