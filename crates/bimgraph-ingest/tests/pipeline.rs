//! End-to-end ingestion tests: records in, validated commit plan out.
//!
//! These run entirely against the in-memory staging store; no Neo4j
//! required.

use bimgraph_core::{RelationshipUpsert, ViolationKind};
use bimgraph_ingest::{IngestConfig, IngestError, Ingestor, Record, RefRole};

/// A minimal but complete document: spatial spine, one wall with an
/// opening, a window filling the opening and hosted by the wall.
fn sample_document() -> Vec<Record> {
    vec![
        Record::new("proj-1", "project").with_attr("name", "Demo house"),
        Record::new("bldg-1", "building").with_attr("name", "Main building"),
        Record::new("storey-1", "storey").with_attr("name", "Ground floor"),
        Record::new("wall-1", "wall")
            .with_attr("name", "W-01")
            .with_attr("size_x", 0.24),
        Record::new("open-1", "opening"),
        Record::new("win-1", "window").with_attr("name", "WIN-01"),
        Record::new("agg-1", "aggregates")
            .with_ref(RefRole::Relating, "proj-1")
            .with_ref(RefRole::Related, "bldg-1"),
        Record::new("agg-2", "aggregates")
            .with_ref(RefRole::Relating, "bldg-1")
            .with_ref(RefRole::Related, "storey-1"),
        Record::new("cont-1", "contained-in-spatial-structure")
            .with_ref(RefRole::Relating, "storey-1")
            .with_ref(RefRole::Related, "wall-1"),
        Record::new("void-1", "voids-element")
            .with_ref(RefRole::Relating, "wall-1")
            .with_ref(RefRole::Related, "open-1"),
        Record::new("fill-1", "fills-element")
            .with_ref(RefRole::Relating, "win-1")
            .with_ref(RefRole::Related, "open-1"),
        Record::new("host-1", "hosts")
            .with_attr("placement_ratio", 0.5)
            .with_ref(RefRole::Relating, "wall-1")
            .with_ref(RefRole::Related, "win-1"),
    ]
}

#[test]
fn full_document_produces_replayable_plan() {
    let mut ingestor = Ingestor::default();
    let plan = ingestor.ingest(&sample_document()).unwrap();

    // Six entity nodes; the hosts record maps to an edge, not a node.
    assert_eq!(plan.nodes.len(), 6);
    // Five reified relationships; the hosts edge rides in the same list.
    let summary = plan.summary();
    assert_eq!(summary.reified, 5);
    assert_eq!(summary.relationship_upserts, 6);

    // The hosts edge carries the ratio and the record's identifier.
    let hosts: Vec<_> = plan
        .relationships
        .iter()
        .filter_map(|r| match r {
            RelationshipUpsert::Edge {
                from,
                to,
                attributes,
                ..
            } => Some((from, to, attributes)),
            _ => None,
        })
        .collect();
    assert_eq!(hosts.len(), 1);
    let (from, to, attributes) = &hosts[0];
    assert_eq!(from.as_str(), "wall-1");
    assert_eq!(to.as_str(), "win-1");
    assert_eq!(attributes["placement_ratio"].as_f64(), Some(0.5));
    assert_eq!(attributes["global_id"].as_str(), Some("host-1"));

    // The containment relationship keeps both role sides.
    let contained = plan
        .relationships
        .iter()
        .find_map(|r| match r {
            RelationshipUpsert::Reified {
                global_id,
                relating,
                related,
                ..
            } if global_id.as_str() == "cont-1" => Some((relating, related)),
            _ => None,
        })
        .unwrap();
    assert_eq!(contained.0[0].as_str(), "storey-1");
    assert_eq!(contained.1[0].as_str(), "wall-1");

    // The window sits in a wall but in no spatial container: a warning,
    // never a rejection.
    assert_eq!(plan.warnings.len(), 1);
    assert_eq!(plan.warnings[0].kind, ViolationKind::OrphanElement);
    assert_eq!(plan.warnings[0].subject.as_str(), "win-1");
}

#[test]
fn reingest_is_idempotent() {
    let mut ingestor = Ingestor::default();
    let document = sample_document();

    let first = ingestor.ingest(&document).unwrap();
    let nodes_before = ingestor.store().node_count();
    let edges_before = ingestor.store().edge_count();

    let second = ingestor.ingest(&document).unwrap();
    assert_eq!(ingestor.store().node_count(), nodes_before);
    assert_eq!(ingestor.store().edge_count(), edges_before);
    assert_eq!(second.nodes, first.nodes);
    assert_eq!(second.relationships, first.relationships);
}

#[test]
fn cross_document_identity_conflict() {
    let mut ingestor = Ingestor::default();
    ingestor.ingest(&sample_document()).unwrap();

    // A later document reuses wall-1 for a different kind.
    let err = ingestor
        .ingest(&[Record::new("wall-1", "slab")])
        .unwrap_err();
    match err {
        IngestError::IdentityConflict { global_id, .. } => {
            assert_eq!(global_id.as_str(), "wall-1");
        }
        other => panic!("expected identity conflict, got {other}"),
    }
}

#[test]
fn rejected_document_leaves_no_partial_state() {
    let mut ingestor = Ingestor::default();

    // The document dies on an unresolvable reference after its nodes
    // were already staged.
    let err = ingestor
        .ingest(&[
            Record::new("wall-A", "wall"),
            Record::new("void-A", "voids-element")
                .with_ref(RefRole::Relating, "wall-A")
                .with_ref(RefRole::Related, "open-missing"),
        ])
        .unwrap_err();
    assert!(matches!(err, IngestError::UnresolvedReference { .. }));
    assert_eq!(ingestor.store().node_count(), 0);
    assert_eq!(ingestor.store().edge_count(), 0);

    // A later, fully valid document sees none of the rejected state.
    let plan = ingestor.ingest(&sample_document()).unwrap();
    assert_eq!(plan.nodes.len(), 6);
    assert!(plan
        .nodes
        .iter()
        .all(|n| n.global_id.as_str() != "wall-A"));
}

#[test]
fn validation_failure_rolls_back_the_store() {
    let mut ingestor = Ingestor::default();
    ingestor.ingest(&sample_document()).unwrap();
    let nodes_before = ingestor.store().node_count();
    let edges_before = ingestor.store().edge_count();

    let err = ingestor
        .ingest(&[
            Record::new("win-9", "window"),
            Record::new("open-8", "opening"),
            Record::new("open-9", "opening"),
            Record::new("fill-9", "fills-element")
                .with_ref(RefRole::Relating, "win-9")
                .with_ref(RefRole::Related, "open-8")
                .with_ref(RefRole::Related, "open-9"),
        ])
        .unwrap_err();
    assert!(matches!(err, IngestError::Validation { .. }));

    assert_eq!(ingestor.store().node_count(), nodes_before);
    assert_eq!(ingestor.store().edge_count(), edges_before);

    // The surviving graph still ingests cleanly.
    let plan = ingestor.ingest(&sample_document()).unwrap();
    assert_eq!(plan.nodes.len(), 6);
}

#[test]
fn hosts_record_id_is_unique_across_kinds() {
    let mut ingestor = Ingestor::default();
    ingestor.ingest(&sample_document()).unwrap();

    // host-1 names the hosts edge record; no node may take it over.
    let err = ingestor
        .ingest(&[Record::new("host-1", "slab")])
        .unwrap_err();
    match err {
        IngestError::IdentityConflict { global_id, .. } => {
            assert_eq!(global_id.as_str(), "host-1");
        }
        other => panic!("expected identity conflict, got {other}"),
    }
}

#[test]
fn unknown_kind_aborts_by_default() {
    let mut ingestor = Ingestor::default();
    let err = ingestor
        .ingest(&[Record::new("roof-1", "roof")])
        .unwrap_err();
    match err {
        IngestError::UnknownKind { kind, .. } => assert_eq!(kind, "roof"),
        other => panic!("expected unknown kind, got {other}"),
    }
}

#[test]
fn unknown_kind_skipped_when_configured() {
    let mut ingestor = Ingestor::new(IngestConfig {
        skip_unknown_kinds: true,
        ..Default::default()
    });

    let mut document = sample_document();
    document.push(Record::new("roof-1", "roof"));

    let plan = ingestor.ingest(&document).unwrap();
    assert_eq!(plan.nodes.len(), 6);
    assert!(ingestor.store().identity().resolve(&"roof-1".into()).is_none());
}

#[test]
fn unresolved_reference_is_an_error() {
    let mut ingestor = Ingestor::default();
    let err = ingestor
        .ingest(&[
            Record::new("wall-1", "wall"),
            Record::new("void-1", "voids-element")
                .with_ref(RefRole::Relating, "wall-1")
                .with_ref(RefRole::Related, "open-missing"),
        ])
        .unwrap_err();
    match err {
        IngestError::UnresolvedReference { target, .. } => {
            assert_eq!(target.as_str(), "open-missing");
        }
        other => panic!("expected unresolved reference, got {other}"),
    }
}

#[test]
fn fatal_violation_rejects_whole_document() {
    // A fills relationship with two related openings breaks its
    // exactly-one cardinality.
    let mut ingestor = Ingestor::default();
    let err = ingestor
        .ingest(&[
            Record::new("win-1", "window"),
            Record::new("open-1", "opening"),
            Record::new("open-2", "opening"),
            Record::new("fill-1", "fills-element")
                .with_ref(RefRole::Relating, "win-1")
                .with_ref(RefRole::Related, "open-1")
                .with_ref(RefRole::Related, "open-2"),
        ])
        .unwrap_err();
    match err {
        IngestError::Validation { violations } => {
            assert!(violations
                .iter()
                .any(|v| v.kind == ViolationKind::CardinalityViolation));
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn placement_cycle_rejects_document() {
    let mut ingestor = Ingestor::default();
    let err = ingestor
        .ingest(&[
            Record::new("pl-a", "placement").with_ref(RefRole::PlacementRelTo, "pl-b"),
            Record::new("pl-b", "placement").with_ref(RefRole::PlacementRelTo, "pl-a"),
        ])
        .unwrap_err();
    match err {
        IngestError::Validation { violations } => {
            assert!(violations
                .iter()
                .all(|v| v.kind == ViolationKind::PlacementCycle));
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn geometry_chain_maps_to_ownership_edges() {
    let mut ingestor = Ingestor::new(IngestConfig {
        report_orphans: false,
        ..Default::default()
    });

    let plan = ingestor
        .ingest(&[
            Record::new("wall-1", "wall")
                .with_ref(RefRole::ObjectPlacement, "pl-1")
                .with_ref(RefRole::Representation, "pds-1"),
            Record::new("pl-1", "placement")
                .with_ref(RefRole::PlacementRelTo, "pl-0")
                .with_ref(RefRole::RelativePlacement, "ax-1"),
            Record::new("pl-0", "placement"),
            Record::new("ax-1", "axis-placement").with_attr("location", vec![0.0, 0.0, 3.0]),
            Record::new("pds-1", "product-definition-shape")
                .with_ref(RefRole::Representations, "sr-1"),
            Record::new("sr-1", "shape-representation").with_ref(RefRole::Items, "solid-1"),
            Record::new("solid-1", "extruded-solid")
                .with_attr("depth", 3.0)
                .with_ref(RefRole::SweptArea, "prof-1")
                .with_ref(RefRole::Position, "ax-1"),
            Record::new("prof-1", "profile-definition").with_ref(RefRole::OuterCurve, "poly-1"),
            Record::new("poly-1", "polyline"),
        ])
        .unwrap();

    assert_eq!(plan.nodes.len(), 9);
    let summary = plan.summary();
    assert_eq!(summary.relationship_upserts, 9);
    assert_eq!(summary.reified, 0);
    // Orphan reporting disabled: the uncontained wall raises nothing.
    assert!(plan.warnings.is_empty());
}
