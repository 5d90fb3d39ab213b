//! The staging graph: a mutable node/edge arena built during ingestion,
//! prior to commit.
//!
//! The store stays permissive while a document is being consumed — records
//! arrive in arbitrary order, so transient partial state is legal. Hard
//! cardinality checks are deferred to the validator, which runs over an
//! immutable snapshot once the document is fully loaded.

use std::collections::{BTreeMap, HashMap};

use bimgraph_core::{schema, AttrValue, EdgeKind, GlobalId, NodeKind};

use crate::error::Result;
use crate::identity::{IdentityIndex, NodeHandle};

/// One staged node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    pub handle: NodeHandle,
    pub global_id: GlobalId,
    pub kind: NodeKind,
    pub class_label: String,
    pub attributes: BTreeMap<String, AttrValue>,
}

/// One staged edge. Identity is (kind, from, to); the store never holds
/// parallel duplicates of the same typed edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeData {
    pub kind: EdgeKind,
    pub from: NodeHandle,
    pub to: NodeHandle,
    pub attributes: BTreeMap<String, AttrValue>,
}

#[derive(Debug, Default, Clone)]
pub struct GraphStore {
    nodes: Vec<NodeData>,
    edges: Vec<EdgeData>,
    edge_index: HashMap<(EdgeKind, NodeHandle, NodeHandle), usize>,
    identity: IdentityIndex,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert a node. An existing node of the same kind has its attributes
    /// merged key-by-key; a kind change is an identity conflict.
    pub fn create_or_update_node(
        &mut self,
        kind: NodeKind,
        global_id: &GlobalId,
        attributes: BTreeMap<String, AttrValue>,
    ) -> Result<NodeHandle> {
        let candidate = NodeHandle(self.nodes.len() as u32);
        let handle = self.identity.register(global_id, kind, candidate)?;

        if handle == candidate {
            let class_label = class_label_for(kind, &attributes);
            self.nodes.push(NodeData {
                handle,
                global_id: global_id.clone(),
                kind,
                class_label,
                attributes,
            });
        } else {
            let node = &mut self.nodes[handle.0 as usize];
            for (key, value) in attributes {
                if key == "ifc_class" {
                    if let Some(label) = value.as_str() {
                        node.class_label = label.to_string();
                    }
                }
                node.attributes.insert(key, value);
            }
        }
        Ok(handle)
    }

    /// Claim an external identifier for a record that maps to a direct
    /// edge rather than a node (hosts). Enforces graph-wide identifier
    /// uniqueness without adding to the arena.
    pub fn register_edge_record(&mut self, global_id: &GlobalId, kind: NodeKind) -> Result<()> {
        self.identity.register_edge_record(global_id, kind)
    }

    /// Upsert a direct edge. An existing (kind, from, to) edge has its
    /// attributes merged; cardinality is not checked here.
    pub fn link(
        &mut self,
        kind: EdgeKind,
        from: NodeHandle,
        to: NodeHandle,
        attributes: BTreeMap<String, AttrValue>,
    ) {
        match self.edge_index.get(&(kind, from, to)) {
            Some(&idx) => {
                let edge = &mut self.edges[idx];
                for (key, value) in attributes {
                    edge.attributes.insert(key, value);
                }
            }
            None => {
                self.edge_index.insert((kind, from, to), self.edges.len());
                self.edges.push(EdgeData {
                    kind,
                    from,
                    to,
                    attributes,
                });
            }
        }
    }

    pub fn identity(&self) -> &IdentityIndex {
        &self.identity
    }

    pub fn node(&self, handle: NodeHandle) -> &NodeData {
        &self.nodes[handle.0 as usize]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Immutable view for the validator and the plan builder.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            nodes: &self.nodes,
            edges: &self.edges,
        }
    }
}

fn class_label_for(kind: NodeKind, attributes: &BTreeMap<String, AttrValue>) -> String {
    attributes
        .get("ifc_class")
        .and_then(AttrValue::as_str)
        .unwrap_or(schema::kind_spec(kind).class_label)
        .to_string()
}

/// An immutable view of the staging graph.
///
/// Inverse navigation is a derived query over the edge set (`incoming`),
/// not a stored back-pointer.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    nodes: &'a [NodeData],
    edges: &'a [EdgeData],
}

impl<'a> Snapshot<'a> {
    pub fn node(&self, handle: NodeHandle) -> &'a NodeData {
        &self.nodes[handle.0 as usize]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &'a NodeData> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &'a EdgeData> {
        self.edges.iter()
    }

    pub fn outgoing(
        &self,
        from: NodeHandle,
        kind: EdgeKind,
    ) -> impl Iterator<Item = &'a EdgeData> {
        self.edges
            .iter()
            .filter(move |e| e.from == from && e.kind == kind)
    }

    pub fn incoming(&self, to: NodeHandle, kind: EdgeKind) -> impl Iterator<Item = &'a EdgeData> {
        self.edges
            .iter()
            .filter(move |e| e.to == to && e.kind == kind)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
