//! The validation report model: machine-readable violations produced by
//! the invariant validator and surfaced through the ingestion pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::GlobalId;

/// Machine-readable violation tag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    IdentityConflict,
    UnknownKind,
    CardinalityViolation,
    PlacementCycle,
    AttributeRangeViolation,
    OrphanElement,
}

impl ViolationKind {
    /// Orphans are warning-class; everything else blocks commit.
    pub fn severity(&self) -> Severity {
        match self {
            Self::OrphanElement => Severity::Warning,
            _ => Severity::Fatal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IdentityConflict => "identity_conflict",
            Self::UnknownKind => "unknown_kind",
            Self::CardinalityViolation => "cardinality_violation",
            Self::PlacementCycle => "placement_cycle",
            Self::AttributeRangeViolation => "attribute_range_violation",
            Self::OrphanElement => "orphan_element",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Fatal,
    Warning,
}

/// One invariant violation, with the offending node/edge identifiers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub severity: Severity,
    /// The node (or edge source) the violation is reported against.
    pub subject: GlobalId,
    /// The other end of the offending edge, where one exists.
    pub related: Option<GlobalId>,
    pub detail: String,
}

impl Violation {
    pub fn new(kind: ViolationKind, subject: GlobalId, detail: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            subject,
            related: None,
            detail: detail.into(),
        }
    }

    pub fn with_related(mut self, related: GlobalId) -> Self {
        self.related = Some(related);
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}: {}", self.kind.as_str(), self.subject, self.detail)?;
        if let Some(related) = &self.related {
            write!(f, " (related: {related})")?;
        }
        Ok(())
    }
}
