//! Global DOF numbering
//!
//! Nodes are ordered by ascending id. A node at position `p` in that order owns the
//! global DOFs `6p .. 6p + 6`, in the order ux, uy, uz, rx, ry, rz. Displacement and
//! reaction vectors are only meaningful relative to this map.

use std::collections::BTreeMap;

use crate::elements::Dof;

/// Number of DOFs carried by each node
pub const DOFS_PER_NODE: usize = 6;

/// Deterministic map from node ids to global DOF indices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DofNumbering {
    positions: BTreeMap<usize, usize>,
    node_ids: Vec<usize>,
}

impl DofNumbering {
    /// Build the numbering from any collection of node ids
    ///
    /// Duplicates are ignored and the input order does not matter.
    pub fn new(ids: impl IntoIterator<Item = usize>) -> Self {
        let mut node_ids: Vec<usize> = ids.into_iter().collect();
        node_ids.sort_unstable();
        node_ids.dedup();

        let positions = node_ids
            .iter()
            .enumerate()
            .map(|(position, &id)| (id, position))
            .collect();

        Self {
            positions,
            node_ids,
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    /// Total number of global DOFs
    pub fn dof_count(&self) -> usize {
        self.node_ids.len() * DOFS_PER_NODE
    }

    /// Node ids in numbering order
    pub fn node_ids(&self) -> &[usize] {
        &self.node_ids
    }

    /// First global DOF index of a node
    pub fn base(&self, node_id: usize) -> Option<usize> {
        self.positions.get(&node_id).map(|p| p * DOFS_PER_NODE)
    }

    /// Global index of one DOF of a node
    pub fn index(&self, node_id: usize, dof: Dof) -> Option<usize> {
        self.base(node_id).map(|base| base + dof.offset())
    }

    /// Node id and DOF owning a global index
    pub fn locate(&self, index: usize) -> Option<(usize, Dof)> {
        let id = *self.node_ids.get(index / DOFS_PER_NODE)?;
        Some((id, Dof::from_offset(index % DOFS_PER_NODE)?))
    }
}
