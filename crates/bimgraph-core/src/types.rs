//! Core domain types for the bimgraph building graph.
//!
//! These types represent nodes and edges mapped from an IFC-subset exchange
//! document onto a property graph, shared across the ingestion pipeline and
//! the Neo4j adapter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

// ── External identity ─────────────────────────────────────────────

/// The stable external identifier assigned by the exchange document
/// (the IFC GlobalId). Unique across the whole graph, immutable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlobalId(pub String);

impl GlobalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GlobalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ── Node kinds ────────────────────────────────────────────────────

/// Closed enumeration of every node kind in the building graph.
///
/// Covers the spatial hierarchy, structural elements, geometry/bridging
/// entities, and the reified relationship kinds. `hosts` is part of the
/// enumeration but maps to a direct attributed edge, never a node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    // Spatial hierarchy
    Project,
    Site,
    Building,
    Storey,
    Space,
    // Structural elements
    Column,
    Beam,
    Wall,
    Window,
    Door,
    Slab,
    Opening,
    // Geometry / bridging
    Placement,
    AxisPlacement,
    ProfileDefinition,
    ExtrudedSolid,
    ShapeRepresentation,
    ProductDefinitionShape,
    Polyline,
    // Relationships
    Aggregates,
    ConnectsElements,
    ContainedInSpatialStructure,
    VoidsElement,
    FillsElement,
    Hosts,
}

impl NodeKind {
    /// The kebab-case tag carried by exchange records, e.g. `"axis-placement"`.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Site => "site",
            Self::Building => "building",
            Self::Storey => "storey",
            Self::Space => "space",
            Self::Column => "column",
            Self::Beam => "beam",
            Self::Wall => "wall",
            Self::Window => "window",
            Self::Door => "door",
            Self::Slab => "slab",
            Self::Opening => "opening",
            Self::Placement => "placement",
            Self::AxisPlacement => "axis-placement",
            Self::ProfileDefinition => "profile-definition",
            Self::ExtrudedSolid => "extruded-solid",
            Self::ShapeRepresentation => "shape-representation",
            Self::ProductDefinitionShape => "product-definition-shape",
            Self::Polyline => "polyline",
            Self::Aggregates => "aggregates",
            Self::ConnectsElements => "connects-elements",
            Self::ContainedInSpatialStructure => "contained-in-spatial-structure",
            Self::VoidsElement => "voids-element",
            Self::FillsElement => "fills-element",
            Self::Hosts => "hosts",
        }
    }

    /// Spatial-hierarchy kinds (project through space).
    pub fn is_spatial(&self) -> bool {
        matches!(
            self,
            Self::Project | Self::Site | Self::Building | Self::Storey | Self::Space
        )
    }

    /// Structural-element kinds, opening included.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Column
                | Self::Beam
                | Self::Wall
                | Self::Window
                | Self::Door
                | Self::Slab
                | Self::Opening
        )
    }

    /// Geometry and bridging kinds.
    pub fn is_geometry(&self) -> bool {
        matches!(
            self,
            Self::Placement
                | Self::AxisPlacement
                | Self::ProfileDefinition
                | Self::ExtrudedSolid
                | Self::ShapeRepresentation
                | Self::ProductDefinitionShape
                | Self::Polyline
        )
    }

    /// The relationship kind this node kind maps to, if any.
    pub fn as_rel(&self) -> Option<RelKind> {
        match self {
            Self::Aggregates => Some(RelKind::Aggregates),
            Self::ConnectsElements => Some(RelKind::ConnectsElements),
            Self::ContainedInSpatialStructure => Some(RelKind::ContainedInSpatialStructure),
            Self::VoidsElement => Some(RelKind::VoidsElement),
            Self::FillsElement => Some(RelKind::FillsElement),
            Self::Hosts => Some(RelKind::Hosts),
            _ => None,
        }
    }
}

impl FromStr for NodeKind {
    type Err = SchemaError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "project" => Ok(Self::Project),
            "site" => Ok(Self::Site),
            "building" => Ok(Self::Building),
            "storey" => Ok(Self::Storey),
            "space" => Ok(Self::Space),
            "column" => Ok(Self::Column),
            "beam" => Ok(Self::Beam),
            "wall" => Ok(Self::Wall),
            "window" => Ok(Self::Window),
            "door" => Ok(Self::Door),
            "slab" => Ok(Self::Slab),
            "opening" => Ok(Self::Opening),
            "placement" => Ok(Self::Placement),
            "axis-placement" => Ok(Self::AxisPlacement),
            "profile-definition" => Ok(Self::ProfileDefinition),
            "extruded-solid" => Ok(Self::ExtrudedSolid),
            "shape-representation" => Ok(Self::ShapeRepresentation),
            "product-definition-shape" => Ok(Self::ProductDefinitionShape),
            "polyline" => Ok(Self::Polyline),
            "aggregates" => Ok(Self::Aggregates),
            "connects-elements" => Ok(Self::ConnectsElements),
            "contained-in-spatial-structure" => Ok(Self::ContainedInSpatialStructure),
            "voids-element" => Ok(Self::VoidsElement),
            "fills-element" => Ok(Self::FillsElement),
            "hosts" => Ok(Self::Hosts),
            _ => Err(SchemaError::UnknownKind {
                tag: tag.to_string(),
            }),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ── Relationship kinds ────────────────────────────────────────────

/// The six exchange-schema relationships.
///
/// All are reified as their own nodes except `Hosts`, which is a simple
/// attributed binary edge (wall → window/door, carrying a placement ratio).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RelKind {
    Aggregates,
    ConnectsElements,
    ContainedInSpatialStructure,
    VoidsElement,
    FillsElement,
    Hosts,
}

impl RelKind {
    pub fn node_kind(&self) -> NodeKind {
        match self {
            Self::Aggregates => NodeKind::Aggregates,
            Self::ConnectsElements => NodeKind::ConnectsElements,
            Self::ContainedInSpatialStructure => NodeKind::ContainedInSpatialStructure,
            Self::VoidsElement => NodeKind::VoidsElement,
            Self::FillsElement => NodeKind::FillsElement,
            Self::Hosts => NodeKind::Hosts,
        }
    }
}

impl fmt::Display for RelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.node_kind().tag())
    }
}

// ── Edge kinds ────────────────────────────────────────────────────

/// The typed edges of the staging graph and the commit plan.
///
/// `Relating`/`Related` are the role edges around reified relationship
/// nodes; the ownership kinds carry the IFC attribute names they stand for
/// (ObjectPlacement, PlacementRelTo, SweptArea, ...).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    Relating,
    Related,
    Hosts,
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

// ── Attribute values ──────────────────────────────────────────────

/// A scalar, array, or nested-document attribute value.
///
/// Mirrors the property types of the source schema (Boolean, Integer,
/// Float, String, Array, JSON). Untagged so record attribute maps read as
/// plain JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    FloatArray(Vec<f64>),
    Json(serde_json::Value),
}

impl AttrValue {
    /// Numeric view; integers widen to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Vec<f64>> for AttrValue {
    fn from(v: Vec<f64>) -> Self {
        Self::FloatArray(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tag_roundtrip() {
        for kind in [
            NodeKind::Project,
            NodeKind::Storey,
            NodeKind::AxisPlacement,
            NodeKind::ContainedInSpatialStructure,
            NodeKind::Hosts,
        ] {
            assert_eq!(kind.tag().parse::<NodeKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let err = "roof".parse::<NodeKind>().unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownKind {
                tag: "roof".to_string()
            }
        );
    }

    #[test]
    fn kind_serializes_kebab_case() {
        let json = serde_json::to_string(&NodeKind::ProductDefinitionShape).unwrap();
        assert_eq!(json, "\"product-definition-shape\"");
    }

    #[test]
    fn attr_value_reads_plain_json() {
        let attrs: std::collections::BTreeMap<String, AttrValue> = serde_json::from_str(
            r#"{"name": "W-01", "size_x": 0.3, "index": 12, "existence": true,
                "location_start": [0.0, 1.5, 0.0]}"#,
        )
        .unwrap();

        assert_eq!(attrs["name"].as_str(), Some("W-01"));
        assert_eq!(attrs["size_x"].as_f64(), Some(0.3));
        assert_eq!(attrs["index"].as_f64(), Some(12.0));
        assert_eq!(attrs["existence"].as_bool(), Some(true));
        assert_eq!(
            attrs["location_start"],
            AttrValue::FloatArray(vec![0.0, 1.5, 0.0])
        );
    }

    #[test]
    fn taxonomy_partitions() {
        assert!(NodeKind::Space.is_spatial());
        assert!(NodeKind::Opening.is_structural());
        assert!(NodeKind::Polyline.is_geometry());
        assert_eq!(NodeKind::VoidsElement.as_rel(), Some(RelKind::VoidsElement));
        assert_eq!(NodeKind::Wall.as_rel(), None);
    }
}
