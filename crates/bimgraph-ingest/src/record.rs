//! The typed-record input model produced by the exchange-document parser.
//!
//! A record carries the external identifier, a kind tag (matched against
//! the registry's closed enumeration during ingestion), an attribute map,
//! and reference fields tagged with the relationship role they fill.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use bimgraph_core::{AttrValue, EdgeKind, GlobalId};

/// One parsed exchange record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub global_id: GlobalId,
    /// Kind tag; kept as a string here so unknown tags surface as
    /// `UnknownKind` during ingestion rather than at parse time.
    pub kind: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttrValue>,
    #[serde(default)]
    pub refs: Vec<RecordRef>,
}

impl Record {
    pub fn new(global_id: impl Into<String>, kind: &str) -> Self {
        Self {
            global_id: GlobalId::new(global_id),
            kind: kind.to_string(),
            attributes: BTreeMap::new(),
            refs: Vec::new(),
        }
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn with_ref(mut self, role: RefRole, target: impl Into<String>) -> Self {
        self.refs.push(RecordRef {
            role,
            target: GlobalId::new(target),
        });
        self
    }
}

/// A reference to another record, tagged with its relationship role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordRef {
    pub role: RefRole,
    pub target: GlobalId,
}

/// The role a reference fills on its record.
///
/// `Relating`/`Related` connect entities to relationship records (in
/// either direction, matching the source schema's inverse accessors);
/// the rest are the geometry ownership roles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RefRole {
    Relating,
    Related,
    ObjectPlacement,
    PlacementRelTo,
    RelativePlacement,
    Representation,
    Representations,
    Items,
    SweptArea,
    Position,
    OuterCurve,
}

impl RefRole {
    pub fn edge_kind(&self) -> EdgeKind {
        match self {
            Self::Relating => EdgeKind::Relating,
            Self::Related => EdgeKind::Related,
            Self::ObjectPlacement => EdgeKind::ObjectPlacement,
            Self::PlacementRelTo => EdgeKind::PlacementRelTo,
            Self::RelativePlacement => EdgeKind::RelativePlacement,
            Self::Representation => EdgeKind::Representation,
            Self::Representations => EdgeKind::Representations,
            Self::Items => EdgeKind::Items,
            Self::SweptArea => EdgeKind::SweptArea,
            Self::Position => EdgeKind::Position,
            Self::OuterCurve => EdgeKind::OuterCurve,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relating => "relating",
            Self::Related => "related",
            Self::ObjectPlacement => "object-placement",
            Self::PlacementRelTo => "placement-rel-to",
            Self::RelativePlacement => "relative-placement",
            Self::Representation => "representation",
            Self::Representations => "representations",
            Self::Items => "items",
            Self::SweptArea => "swept-area",
            Self::Position => "position",
            Self::OuterCurve => "outer-curve",
        }
    }
}

impl fmt::Display for RefRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
