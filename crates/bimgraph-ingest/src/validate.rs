//! The invariant validator: structural rules checked against an immutable
//! snapshot of the staging graph.
//!
//! Checks run cheapest-first and never short-circuit — a caller sees every
//! problem in one pass. Only the orphan check is warning-class.

use std::collections::HashMap;

use bimgraph_core::schema::{self, Cardinality};
use bimgraph_core::{EdgeKind, NodeKind, RelKind, Violation, ViolationKind};

use crate::store::{NodeData, Snapshot};

const NON_NEGATIVE_ATTRS: &[&str] = &["size_x", "size_y", "size_z", "length", "depth"];

/// Structural kinds expected to sit inside exactly one spatial container.
const CONTAINABLE: &[NodeKind] = &[
    NodeKind::Column,
    NodeKind::Beam,
    NodeKind::Wall,
    NodeKind::Window,
    NodeKind::Door,
    NodeKind::Slab,
];

/// Validate the whole snapshot, returning every violation found.
pub fn validate(snap: &Snapshot<'_>) -> Vec<Violation> {
    let mut out = Vec::new();
    check_identity_uniqueness(snap, &mut out);
    check_relationship_cardinality(snap, &mut out);
    check_ownership_edges(snap, &mut out);
    check_placement_cycles(snap, &mut out);
    check_attribute_ranges(snap, &mut out);
    check_orphans(snap, &mut out);
    out
}

/// Defensive re-check of what the identity index already guarantees.
fn check_identity_uniqueness(snap: &Snapshot<'_>, out: &mut Vec<Violation>) {
    let mut seen: HashMap<&str, &NodeData> = HashMap::new();
    for node in snap.nodes() {
        if let Some(first) = seen.insert(node.global_id.as_str(), node) {
            out.push(
                Violation::new(
                    ViolationKind::IdentityConflict,
                    node.global_id.clone(),
                    format!(
                        "external identifier claimed by both {} and {}",
                        first.kind, node.kind
                    ),
                )
                .with_related(first.global_id.clone()),
            );
        }
    }
}

fn check_relationship_cardinality(snap: &Snapshot<'_>, out: &mut Vec<Violation>) {
    // Role edges must touch a reified relationship node on the right end.
    for edge in snap.edges() {
        match edge.kind {
            EdgeKind::Relating if !is_reified(snap.node(edge.to).kind) => {
                out.push(
                    Violation::new(
                        ViolationKind::CardinalityViolation,
                        snap.node(edge.from).global_id.clone(),
                        format!(
                            "relating edge targets {} node, not a relationship",
                            snap.node(edge.to).kind
                        ),
                    )
                    .with_related(snap.node(edge.to).global_id.clone()),
                );
            }
            EdgeKind::Related if !is_reified(snap.node(edge.from).kind) => {
                out.push(
                    Violation::new(
                        ViolationKind::CardinalityViolation,
                        snap.node(edge.from).global_id.clone(),
                        format!(
                            "related edge leaves {} node, not a relationship",
                            snap.node(edge.from).kind
                        ),
                    )
                    .with_related(snap.node(edge.to).global_id.clone()),
                );
            }
            _ => {}
        }
    }

    // Reified relationship nodes: role counts and closed kind sets.
    for node in snap.nodes() {
        let Some(rel) = node.kind.as_rel() else {
            continue;
        };
        let spec = schema::rel_spec(rel);

        let mut relating_count = 0u32;
        for edge in snap.incoming(node.handle, EdgeKind::Relating) {
            relating_count += 1;
            let source = snap.node(edge.from);
            if !spec.relating.contains(&source.kind) {
                out.push(
                    Violation::new(
                        ViolationKind::CardinalityViolation,
                        node.global_id.clone(),
                        format!("relating kind {} not allowed for {}", source.kind, rel),
                    )
                    .with_related(source.global_id.clone()),
                );
            }
        }
        if !spec.relating_card.contains(relating_count) {
            out.push(Violation::new(
                ViolationKind::CardinalityViolation,
                node.global_id.clone(),
                format!(
                    "{} has {} relating node(s), expected {}",
                    rel, relating_count, spec.relating_card
                ),
            ));
        }

        let mut related_count = 0u32;
        for edge in snap.outgoing(node.handle, EdgeKind::Related) {
            related_count += 1;
            let target = snap.node(edge.to);
            if !spec.related.contains(&target.kind) {
                out.push(
                    Violation::new(
                        ViolationKind::CardinalityViolation,
                        node.global_id.clone(),
                        format!("related kind {} not allowed for {}", target.kind, rel),
                    )
                    .with_related(target.global_id.clone()),
                );
            }
        }
        if !spec.related_card.contains(related_count) {
            out.push(Violation::new(
                ViolationKind::CardinalityViolation,
                node.global_id.clone(),
                format!(
                    "{} has {} related node(s), expected {}",
                    rel, related_count, spec.related_card
                ),
            ));
        }
    }

    // Hosts direct edges: endpoint kinds against the closed sets.
    let hosts = schema::rel_spec(RelKind::Hosts);
    for edge in snap.edges().filter(|e| e.kind == EdgeKind::Hosts) {
        let from = snap.node(edge.from);
        let to = snap.node(edge.to);
        if !hosts.relating.contains(&from.kind) {
            out.push(
                Violation::new(
                    ViolationKind::CardinalityViolation,
                    from.global_id.clone(),
                    format!("hosts edge may not leave a {} node", from.kind),
                )
                .with_related(to.global_id.clone()),
            );
        }
        if !hosts.related.contains(&to.kind) {
            out.push(
                Violation::new(
                    ViolationKind::CardinalityViolation,
                    from.global_id.clone(),
                    format!("hosts edge may not target a {} node", to.kind),
                )
                .with_related(to.global_id.clone()),
            );
        }
    }
}

fn check_ownership_edges(snap: &Snapshot<'_>, out: &mut Vec<Violation>) {
    for edge in snap.edges() {
        let Some(spec) = schema::ownership_spec(edge.kind) else {
            continue;
        };
        let from = snap.node(edge.from);
        let to = snap.node(edge.to);
        if !spec.from.contains(&from.kind) {
            out.push(
                Violation::new(
                    ViolationKind::CardinalityViolation,
                    from.global_id.clone(),
                    format!("{:?} edge may not leave a {} node", edge.kind, from.kind),
                )
                .with_related(to.global_id.clone()),
            );
        }
        if !spec.to.contains(&to.kind) {
            out.push(
                Violation::new(
                    ViolationKind::CardinalityViolation,
                    from.global_id.clone(),
                    format!("{:?} edge may not target a {} node", edge.kind, to.kind),
                )
                .with_related(to.global_id.clone()),
            );
        }
    }

    // Occurrence bounds counted per owning node.
    for spec in schema::ownership_specs() {
        if spec.card == Cardinality::ANY {
            continue;
        }
        for node in snap.nodes().filter(|n| spec.from.contains(&n.kind)) {
            let count = snap.outgoing(node.handle, spec.edge).count() as u32;
            if !spec.card.contains(count) {
                out.push(Violation::new(
                    ViolationKind::CardinalityViolation,
                    node.global_id.clone(),
                    format!(
                        "{} owns {} {:?} edge(s), expected {}",
                        node.kind, count, spec.edge, spec.card
                    ),
                ));
            }
        }
    }
}

/// Placement chains must terminate; the hop bound is the node count, so
/// any revisit shows up as an overrun.
fn check_placement_cycles(snap: &Snapshot<'_>, out: &mut Vec<Violation>) {
    let bound = snap.node_count();
    for node in snap.nodes().filter(|n| n.kind == NodeKind::Placement) {
        let mut current = node.handle;
        let mut hops = 0usize;
        loop {
            let Some(edge) = snap.outgoing(current, EdgeKind::PlacementRelTo).next() else {
                break;
            };
            current = edge.to;
            hops += 1;
            if hops > bound {
                out.push(
                    Violation::new(
                        ViolationKind::PlacementCycle,
                        node.global_id.clone(),
                        "placement chain does not terminate",
                    )
                    .with_related(snap.node(current).global_id.clone()),
                );
                break;
            }
        }
    }
}

fn check_attribute_ranges(snap: &Snapshot<'_>, out: &mut Vec<Violation>) {
    for node in snap.nodes() {
        for (key, value) in &node.attributes {
            let Some(v) = value.as_f64() else { continue };
            if NON_NEGATIVE_ATTRS.contains(&key.as_str()) && v < 0.0 {
                out.push(Violation::new(
                    ViolationKind::AttributeRangeViolation,
                    node.global_id.clone(),
                    format!("{key} = {v} must be non-negative"),
                ));
            }
            if key == "placement_ratio" && !(0.0..=1.0).contains(&v) {
                out.push(Violation::new(
                    ViolationKind::AttributeRangeViolation,
                    node.global_id.clone(),
                    format!("placement_ratio = {v} outside [0, 1]"),
                ));
            }
        }
    }

    for edge in snap.edges().filter(|e| e.kind == EdgeKind::Hosts) {
        if let Some(v) = edge
            .attributes
            .get("placement_ratio")
            .and_then(|a| a.as_f64())
        {
            if !(0.0..=1.0).contains(&v) {
                out.push(
                    Violation::new(
                        ViolationKind::AttributeRangeViolation,
                        snap.node(edge.from).global_id.clone(),
                        format!("hosts placement_ratio = {v} outside [0, 1]"),
                    )
                    .with_related(snap.node(edge.to).global_id.clone()),
                );
            }
        }
    }
}

/// Partial documents are legal intermediate states, so containment gaps
/// are warnings rather than commit blockers.
fn check_orphans(snap: &Snapshot<'_>, out: &mut Vec<Violation>) {
    for node in snap.nodes().filter(|n| CONTAINABLE.contains(&n.kind)) {
        let containers = snap
            .incoming(node.handle, EdgeKind::Related)
            .filter(|e| snap.node(e.from).kind == NodeKind::ContainedInSpatialStructure)
            .count();
        if containers != 1 {
            out.push(Violation::new(
                ViolationKind::OrphanElement,
                node.global_id.clone(),
                format!(
                    "{} sits in {} spatial container(s), expected exactly 1",
                    node.kind, containers
                ),
            ));
        }
    }
}

fn is_reified(kind: NodeKind) -> bool {
    kind.as_rel()
        .map(|rel| schema::rel_spec(rel).reified)
        .unwrap_or(false)
}
