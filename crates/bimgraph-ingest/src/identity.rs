//! The identity index: maps stable external identifiers to graph handles.
//!
//! Backs idempotent upsert across ingestion runs. Same-kind
//! re-registration is a legal upsert; a cross-kind identifier collision is
//! always an error. Records that map to edges rather than nodes (hosts)
//! claim their identifier here too, without a handle.

use std::collections::HashMap;

use bimgraph_core::{GlobalId, NodeKind};

use crate::error::{IngestError, Result};

/// Opaque handle into the staging graph's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(pub u32);

#[derive(Debug, Clone, Copy)]
struct Entry {
    /// `None` for identifiers claimed by edge-mapped records.
    handle: Option<NodeHandle>,
    kind: NodeKind,
}

/// O(1) external-identifier lookup, keyed on the identifier string.
#[derive(Debug, Default, Clone)]
pub struct IdentityIndex {
    map: HashMap<String, Entry>,
}

impl IdentityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// The node handle registered for an identifier, if any. Identifiers
    /// claimed by edge-mapped records resolve to nothing.
    pub fn resolve(&self, id: &GlobalId) -> Option<NodeHandle> {
        self.map.get(id.as_str()).and_then(|e| e.handle)
    }

    /// Handle and kind registered for an identifier.
    pub fn lookup(&self, id: &GlobalId) -> Option<(NodeHandle, NodeKind)> {
        self.map
            .get(id.as_str())
            .and_then(|e| e.handle.map(|h| (h, e.kind)))
    }

    /// Register an identifier for a kind. Re-registering under the same
    /// kind returns the existing handle; a different kind is an
    /// `IdentityConflict`.
    pub fn register(&mut self, id: &GlobalId, kind: NodeKind, handle: NodeHandle) -> Result<NodeHandle> {
        match self.map.get_mut(id.as_str()) {
            Some(entry) if entry.kind == kind => Ok(*entry.handle.get_or_insert(handle)),
            Some(entry) => Err(IngestError::IdentityConflict {
                global_id: id.clone(),
                existing: entry.kind,
                incoming: kind,
            }),
            None => {
                self.map.insert(
                    id.as_str().to_string(),
                    Entry {
                        handle: Some(handle),
                        kind,
                    },
                );
                Ok(handle)
            }
        }
    }

    /// Claim an identifier for a record that maps to an edge rather than
    /// a node. The identifier stays unique across the whole graph but
    /// never resolves as a reference target.
    pub fn register_edge_record(&mut self, id: &GlobalId, kind: NodeKind) -> Result<()> {
        match self.map.get(id.as_str()) {
            Some(entry) if entry.kind == kind => Ok(()),
            Some(entry) => Err(IngestError::IdentityConflict {
                global_id: id.clone(),
                existing: entry.kind,
                incoming: kind,
            }),
            None => {
                self.map
                    .insert(id.as_str().to_string(), Entry { handle: None, kind });
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_resolve() {
        let mut index = IdentityIndex::new();
        let id = GlobalId::from("wall-1");

        assert!(index.resolve(&id).is_none());
        let h = index.register(&id, NodeKind::Wall, NodeHandle(0)).unwrap();
        assert_eq!(h, NodeHandle(0));
        assert_eq!(index.resolve(&id), Some(NodeHandle(0)));
        assert_eq!(index.lookup(&id), Some((NodeHandle(0), NodeKind::Wall)));
    }

    #[test]
    fn same_kind_reregistration_is_an_upsert() {
        let mut index = IdentityIndex::new();
        let id = GlobalId::from("wall-1");

        index.register(&id, NodeKind::Wall, NodeHandle(0)).unwrap();
        // The caller's candidate handle is ignored; the original wins.
        let h = index.register(&id, NodeKind::Wall, NodeHandle(9)).unwrap();
        assert_eq!(h, NodeHandle(0));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn edge_record_reserves_the_identifier() {
        let mut index = IdentityIndex::new();
        let id = GlobalId::from("host-1");

        index.register_edge_record(&id, NodeKind::Hosts).unwrap();
        // Claimed but not a node: references to it never resolve.
        assert!(index.resolve(&id).is_none());
        assert!(index.lookup(&id).is_none());

        // Re-claiming under the same kind is a legal upsert.
        index.register_edge_record(&id, NodeKind::Hosts).unwrap();

        // A node of another kind may not take the identifier over.
        let err = index
            .register(&id, NodeKind::Slab, NodeHandle(0))
            .unwrap_err();
        match err {
            IngestError::IdentityConflict {
                existing, incoming, ..
            } => {
                assert_eq!(existing, NodeKind::Hosts);
                assert_eq!(incoming, NodeKind::Slab);
            }
            other => panic!("expected identity conflict, got {other}"),
        }
    }

    #[test]
    fn cross_kind_collision_is_a_conflict() {
        let mut index = IdentityIndex::new();
        let id = GlobalId::from("elem-1");

        index.register(&id, NodeKind::Wall, NodeHandle(0)).unwrap();
        let err = index
            .register(&id, NodeKind::Door, NodeHandle(1))
            .unwrap_err();
        match err {
            IngestError::IdentityConflict {
                existing, incoming, ..
            } => {
                assert_eq!(existing, NodeKind::Wall);
                assert_eq!(incoming, NodeKind::Door);
            }
            other => panic!("expected identity conflict, got {other}"),
        }
    }
}
