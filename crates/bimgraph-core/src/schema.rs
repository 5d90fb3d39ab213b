//! The schema registry: the single source of truth for node kinds,
//! relationship kinds, attribute shapes, and cardinalities.
//!
//! Both the ingestion pipeline and the invariant validator consult these
//! tables; nothing else in the workspace restates them.

use std::fmt;

use crate::error::SchemaError;
use crate::types::{EdgeKind, NodeKind, RelKind};

/// Every kind in the closed enumeration, for registry walks.
pub const ALL_KINDS: [NodeKind; 25] = [
    NodeKind::Project,
    NodeKind::Site,
    NodeKind::Building,
    NodeKind::Storey,
    NodeKind::Space,
    NodeKind::Column,
    NodeKind::Beam,
    NodeKind::Wall,
    NodeKind::Window,
    NodeKind::Door,
    NodeKind::Slab,
    NodeKind::Opening,
    NodeKind::Placement,
    NodeKind::AxisPlacement,
    NodeKind::ProfileDefinition,
    NodeKind::ExtrudedSolid,
    NodeKind::ShapeRepresentation,
    NodeKind::ProductDefinitionShape,
    NodeKind::Polyline,
    NodeKind::Aggregates,
    NodeKind::ConnectsElements,
    NodeKind::ContainedInSpatialStructure,
    NodeKind::VoidsElement,
    NodeKind::FillsElement,
    NodeKind::Hosts,
];

// ── Cardinality ───────────────────────────────────────────────────

/// An inclusive occurrence bound; `max == None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cardinality {
    pub min: u32,
    pub max: Option<u32>,
}

impl Cardinality {
    pub const EXACTLY_ONE: Self = Self {
        min: 1,
        max: Some(1),
    };
    pub const AT_MOST_ONE: Self = Self {
        min: 0,
        max: Some(1),
    };
    pub const ONE_OR_MORE: Self = Self { min: 1, max: None };
    pub const ANY: Self = Self { min: 0, max: None };

    pub fn contains(&self, n: u32) -> bool {
        n >= self.min && self.max.map_or(true, |m| n <= m)
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (1, Some(1)) => f.write_str("1"),
            (min, Some(max)) => write!(f, "{min}..{max}"),
            (min, None) => write!(f, "{min}..N"),
        }
    }
}

// ── Kind specs ────────────────────────────────────────────────────

/// Declared shape of one node kind.
#[derive(Debug, Clone, Copy)]
pub struct KindSpec {
    pub kind: NodeKind,
    /// Default schema-class label (the IFC entity name); records may
    /// override it via an `ifc_class` attribute.
    pub class_label: &'static str,
    /// Attribute names this kind is expected to carry. Informative for
    /// producers; unknown attributes are stored as-is.
    pub attributes: &'static [&'static str],
}

const COMMON: &[&str] = &["name", "description", "ifc_class"];

macro_rules! kind_specs {
    ($($name:ident => $kind:ident, $label:literal, $attrs:expr;)*) => {
        $(static $name: KindSpec = KindSpec {
            kind: NodeKind::$kind,
            class_label: $label,
            attributes: $attrs,
        };)*
    };
}

kind_specs! {
    PROJECT => Project, "IfcProject",
        &["name", "description", "ifc_class", "object_type", "long_name", "phase"];
    SITE => Site, "IfcSite", COMMON;
    BUILDING => Building, "IfcBuilding", COMMON;
    STOREY => Storey, "IfcBuildingStorey", COMMON;
    SPACE => Space, "IfcSpace",
        &["name", "description", "ifc_class", "space_type"];
    COLUMN => Column, "IfcColumn",
        &["name", "description", "ifc_class", "existence", "location_start",
          "location_end", "size_x", "size_y", "index", "length"];
    BEAM => Beam, "IfcBeam",
        &["name", "description", "ifc_class", "existence", "location_start",
          "location_end", "size_x", "size_y", "index"];
    WALL => Wall, "IfcWall",
        &["name", "description", "ifc_class", "existence", "location_start",
          "location_end", "size_x", "size_y", "index"];
    WINDOW => Window, "IfcWindow",
        &["name", "description", "ifc_class", "existence", "size_x", "size_y",
          "size_z", "index", "hosted_wall_index", "placement_ratio"];
    DOOR => Door, "IfcDoor",
        &["name", "description", "ifc_class", "existence", "size_x", "size_y",
          "index", "hosted_wall_index", "placement_ratio"];
    SLAB => Slab, "IfcSlab",
        &["name", "description", "ifc_class", "existence", "slab_type", "index",
          "location_x", "location_y", "location_z", "size_x"];
    OPENING => Opening, "IfcOpeningElement",
        &["name", "description", "ifc_class", "existence"];
    PLACEMENT => Placement, "IfcLocalPlacement", &["name", "ifc_class"];
    AXIS_PLACEMENT => AxisPlacement, "IfcAxis2Placement3D",
        &["name", "ifc_class", "location", "axis", "ref_direction"];
    PROFILE_DEFINITION => ProfileDefinition, "IfcArbitraryClosedProfileDef",
        &["name", "ifc_class", "profile_type", "profile_name"];
    EXTRUDED_SOLID => ExtrudedSolid, "IfcExtrudedAreaSolid",
        &["name", "ifc_class", "extruded_direction", "depth"];
    SHAPE_REPRESENTATION => ShapeRepresentation, "IfcShapeRepresentation",
        &["name", "ifc_class", "context_of_items", "representation_identifier",
          "representation_type"];
    PRODUCT_DEFINITION_SHAPE => ProductDefinitionShape, "IfcProductDefinitionShape", COMMON;
    POLYLINE => Polyline, "IfcPolyline", &["name", "ifc_class", "points"];
    AGGREGATES => Aggregates, "IfcRelAggregates", COMMON;
    CONNECTS_ELEMENTS => ConnectsElements, "IfcRelConnectsElements", COMMON;
    CONTAINED => ContainedInSpatialStructure, "IfcRelContainedInSpatialStructure", COMMON;
    VOIDS_ELEMENT => VoidsElement, "IfcRelVoidsElement", COMMON;
    FILLS_ELEMENT => FillsElement, "IfcRelFillsElement", COMMON;
    // Custom relationship; no IFC entity of its own.
    HOSTS => Hosts, "RelHosts",
        &["name", "description", "ifc_class", "placement_ratio"];
}

/// Look up the declared shape of a node kind.
pub fn kind_spec(kind: NodeKind) -> &'static KindSpec {
    match kind {
        NodeKind::Project => &PROJECT,
        NodeKind::Site => &SITE,
        NodeKind::Building => &BUILDING,
        NodeKind::Storey => &STOREY,
        NodeKind::Space => &SPACE,
        NodeKind::Column => &COLUMN,
        NodeKind::Beam => &BEAM,
        NodeKind::Wall => &WALL,
        NodeKind::Window => &WINDOW,
        NodeKind::Door => &DOOR,
        NodeKind::Slab => &SLAB,
        NodeKind::Opening => &OPENING,
        NodeKind::Placement => &PLACEMENT,
        NodeKind::AxisPlacement => &AXIS_PLACEMENT,
        NodeKind::ProfileDefinition => &PROFILE_DEFINITION,
        NodeKind::ExtrudedSolid => &EXTRUDED_SOLID,
        NodeKind::ShapeRepresentation => &SHAPE_REPRESENTATION,
        NodeKind::ProductDefinitionShape => &PRODUCT_DEFINITION_SHAPE,
        NodeKind::Polyline => &POLYLINE,
        NodeKind::Aggregates => &AGGREGATES,
        NodeKind::ConnectsElements => &CONNECTS_ELEMENTS,
        NodeKind::ContainedInSpatialStructure => &CONTAINED,
        NodeKind::VoidsElement => &VOIDS_ELEMENT,
        NodeKind::FillsElement => &FILLS_ELEMENT,
        NodeKind::Hosts => &HOSTS,
    }
}

/// Parse a record kind tag against the closed enumeration.
pub fn parse_kind(tag: &str) -> Result<NodeKind, SchemaError> {
    tag.parse()
}

// ── Relationship specs ────────────────────────────────────────────

/// Declared shape of one relationship kind: who may relate whom, how
/// many times, and whether the relationship is reified as its own node.
#[derive(Debug, Clone, Copy)]
pub struct RelSpec {
    pub rel: RelKind,
    pub relating: &'static [NodeKind],
    pub related: &'static [NodeKind],
    pub relating_card: Cardinality,
    pub related_card: Cardinality,
    pub reified: bool,
}

static REL_AGGREGATES: RelSpec = RelSpec {
    rel: RelKind::Aggregates,
    relating: &[
        NodeKind::Project,
        NodeKind::Site,
        NodeKind::Building,
        NodeKind::Storey,
    ],
    related: &[
        NodeKind::Site,
        NodeKind::Building,
        NodeKind::Space,
        NodeKind::Storey,
    ],
    relating_card: Cardinality::EXACTLY_ONE,
    related_card: Cardinality::ONE_OR_MORE,
    reified: true,
};

static REL_CONNECTS_ELEMENTS: RelSpec = RelSpec {
    rel: RelKind::ConnectsElements,
    relating: &[NodeKind::Space],
    related: &[NodeKind::Space],
    relating_card: Cardinality::EXACTLY_ONE,
    related_card: Cardinality::EXACTLY_ONE,
    reified: true,
};

static REL_CONTAINED: RelSpec = RelSpec {
    rel: RelKind::ContainedInSpatialStructure,
    relating: &[NodeKind::Space, NodeKind::Storey],
    related: &[
        NodeKind::Column,
        NodeKind::Beam,
        NodeKind::Wall,
        NodeKind::Window,
        NodeKind::Door,
        NodeKind::Slab,
    ],
    relating_card: Cardinality::EXACTLY_ONE,
    related_card: Cardinality::ONE_OR_MORE,
    reified: true,
};

static REL_VOIDS: RelSpec = RelSpec {
    rel: RelKind::VoidsElement,
    relating: &[NodeKind::Wall],
    related: &[NodeKind::Opening],
    relating_card: Cardinality::EXACTLY_ONE,
    related_card: Cardinality::ONE_OR_MORE,
    reified: true,
};

static REL_FILLS: RelSpec = RelSpec {
    rel: RelKind::FillsElement,
    relating: &[NodeKind::Window, NodeKind::Door],
    related: &[NodeKind::Opening],
    relating_card: Cardinality::EXACTLY_ONE,
    related_card: Cardinality::EXACTLY_ONE,
    reified: true,
};

static REL_HOSTS: RelSpec = RelSpec {
    rel: RelKind::Hosts,
    relating: &[NodeKind::Wall],
    related: &[NodeKind::Window, NodeKind::Door],
    relating_card: Cardinality::EXACTLY_ONE,
    related_card: Cardinality::ANY,
    reified: false,
};

/// Look up the declared shape of a relationship kind.
pub fn rel_spec(rel: RelKind) -> &'static RelSpec {
    match rel {
        RelKind::Aggregates => &REL_AGGREGATES,
        RelKind::ConnectsElements => &REL_CONNECTS_ELEMENTS,
        RelKind::ContainedInSpatialStructure => &REL_CONTAINED,
        RelKind::VoidsElement => &REL_VOIDS,
        RelKind::FillsElement => &REL_FILLS,
        RelKind::Hosts => &REL_HOSTS,
    }
}

// ── Ownership specs ───────────────────────────────────────────────

/// A direct ownership edge between an entity and its geometry/bridging
/// structure, with the occurrence bound counted per owning node.
#[derive(Debug, Clone, Copy)]
pub struct OwnershipSpec {
    pub edge: EdgeKind,
    pub from: &'static [NodeKind],
    pub to: &'static [NodeKind],
    pub card: Cardinality,
}

const PLACED_KINDS: &[NodeKind] = &[
    NodeKind::Site,
    NodeKind::Building,
    NodeKind::Storey,
    NodeKind::Space,
    NodeKind::Column,
    NodeKind::Beam,
    NodeKind::Wall,
    NodeKind::Window,
    NodeKind::Door,
    NodeKind::Slab,
    NodeKind::Opening,
];

const SHAPED_KINDS: &[NodeKind] = &[
    NodeKind::Column,
    NodeKind::Beam,
    NodeKind::Wall,
    NodeKind::Window,
    NodeKind::Door,
    NodeKind::Slab,
    NodeKind::Opening,
];

static OWNERSHIP: [OwnershipSpec; 9] = [
    OwnershipSpec {
        edge: EdgeKind::ObjectPlacement,
        from: PLACED_KINDS,
        to: &[NodeKind::Placement],
        card: Cardinality::AT_MOST_ONE,
    },
    OwnershipSpec {
        edge: EdgeKind::PlacementRelTo,
        from: &[NodeKind::Placement],
        to: &[NodeKind::Placement],
        card: Cardinality::AT_MOST_ONE,
    },
    OwnershipSpec {
        edge: EdgeKind::RelativePlacement,
        from: &[NodeKind::Placement],
        to: &[NodeKind::AxisPlacement],
        card: Cardinality::AT_MOST_ONE,
    },
    OwnershipSpec {
        edge: EdgeKind::Representation,
        from: SHAPED_KINDS,
        to: &[NodeKind::ProductDefinitionShape],
        card: Cardinality::AT_MOST_ONE,
    },
    OwnershipSpec {
        edge: EdgeKind::Representations,
        from: &[NodeKind::ProductDefinitionShape],
        to: &[NodeKind::ShapeRepresentation],
        card: Cardinality::EXACTLY_ONE,
    },
    OwnershipSpec {
        edge: EdgeKind::Items,
        from: &[NodeKind::ShapeRepresentation],
        to: &[NodeKind::ExtrudedSolid, NodeKind::Polyline],
        card: Cardinality::ONE_OR_MORE,
    },
    OwnershipSpec {
        edge: EdgeKind::SweptArea,
        from: &[NodeKind::ExtrudedSolid],
        to: &[NodeKind::ProfileDefinition],
        card: Cardinality::EXACTLY_ONE,
    },
    OwnershipSpec {
        edge: EdgeKind::Position,
        from: &[NodeKind::ExtrudedSolid],
        to: &[NodeKind::AxisPlacement],
        card: Cardinality::EXACTLY_ONE,
    },
    OwnershipSpec {
        edge: EdgeKind::OuterCurve,
        from: &[NodeKind::ProfileDefinition],
        to: &[NodeKind::Polyline],
        card: Cardinality::AT_MOST_ONE,
    },
];

/// All ownership rules, in validation order.
pub fn ownership_specs() -> &'static [OwnershipSpec] {
    &OWNERSHIP
}

/// The ownership rule for a given edge kind, if it is an ownership edge.
pub fn ownership_spec(edge: EdgeKind) -> Option<&'static OwnershipSpec> {
    OWNERSHIP.iter().find(|s| s.edge == edge)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_spec() {
        for kind in ALL_KINDS {
            let spec = kind_spec(kind);
            assert_eq!(spec.kind, kind);
            assert!(!spec.class_label.is_empty());
            assert!(!spec.attributes.is_empty());
        }
    }

    #[test]
    fn hosts_is_the_only_direct_relationship() {
        for rel in [
            RelKind::Aggregates,
            RelKind::ConnectsElements,
            RelKind::ContainedInSpatialStructure,
            RelKind::VoidsElement,
            RelKind::FillsElement,
        ] {
            assert!(rel_spec(rel).reified, "{rel} should be reified");
        }
        assert!(!rel_spec(RelKind::Hosts).reified);
    }

    #[test]
    fn fills_element_related_is_exactly_one() {
        let spec = rel_spec(RelKind::FillsElement);
        assert_eq!(spec.related_card, Cardinality::EXACTLY_ONE);
        assert_eq!(spec.related, &[NodeKind::Opening]);
    }

    #[test]
    fn contained_related_set_is_closed() {
        let spec = rel_spec(RelKind::ContainedInSpatialStructure);
        assert!(spec.related.contains(&NodeKind::Wall));
        assert!(!spec.related.contains(&NodeKind::Opening));
        assert!(!spec.related.contains(&NodeKind::Space));
    }

    #[test]
    fn cardinality_bounds() {
        assert!(Cardinality::EXACTLY_ONE.contains(1));
        assert!(!Cardinality::EXACTLY_ONE.contains(0));
        assert!(!Cardinality::EXACTLY_ONE.contains(2));
        assert!(Cardinality::ONE_OR_MORE.contains(40));
        assert!(!Cardinality::ONE_OR_MORE.contains(0));
        assert!(Cardinality::ANY.contains(0));
        assert_eq!(Cardinality::AT_MOST_ONE.to_string(), "0..1");
    }

    #[test]
    fn unknown_kind_lookup_fails() {
        assert!(parse_kind("pipe-segment").is_err());
        assert_eq!(parse_kind("voids-element").unwrap(), NodeKind::VoidsElement);
    }

    #[test]
    fn ownership_rules_cover_the_geometry_chain() {
        let reps = ownership_spec(EdgeKind::Representations).unwrap();
        assert_eq!(reps.card, Cardinality::EXACTLY_ONE);
        let items = ownership_spec(EdgeKind::Items).unwrap();
        assert_eq!(items.card, Cardinality::ONE_OR_MORE);
        assert!(ownership_spec(EdgeKind::Relating).is_none());
    }
}
