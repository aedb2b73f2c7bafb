//! Result types for frame analysis

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FrameError, FrameResult};
use crate::math::{Vec as FEVec, Vec12};
use crate::numbering::{DofNumbering, DOFS_PER_NODE};

/// Displacement results at a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeDisplacement {
    /// Displacement in X direction
    pub dx: f64,
    /// Displacement in Y direction
    pub dy: f64,
    /// Displacement in Z direction
    pub dz: f64,
    /// Rotation about X axis
    pub rx: f64,
    /// Rotation about Y axis
    pub ry: f64,
    /// Rotation about Z axis
    pub rz: f64,
}

impl NodeDisplacement {
    /// Create from array [DX, DY, DZ, RX, RY, RZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        Self {
            dx: arr[0],
            dy: arr[1],
            dz: arr[2],
            rx: arr[3],
            ry: arr[4],
            rz: arr[5],
        }
    }

    /// Get translation magnitude
    pub fn translation_magnitude(&self) -> f64 {
        (self.dx.powi(2) + self.dy.powi(2) + self.dz.powi(2)).sqrt()
    }

    /// Get rotation magnitude
    pub fn rotation_magnitude(&self) -> f64 {
        (self.rx.powi(2) + self.ry.powi(2) + self.rz.powi(2)).sqrt()
    }
}

/// Reaction forces at a node
///
/// Components for free DOFs are zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reactions {
    /// Reaction force in X direction
    pub fx: f64,
    /// Reaction force in Y direction
    pub fy: f64,
    /// Reaction force in Z direction
    pub fz: f64,
    /// Reaction moment about X axis
    pub mx: f64,
    /// Reaction moment about Y axis
    pub my: f64,
    /// Reaction moment about Z axis
    pub mz: f64,
}

impl Reactions {
    /// Create from array [FX, FY, FZ, MX, MY, MZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        Self {
            fx: arr[0],
            fy: arr[1],
            fz: arr[2],
            mx: arr[3],
            my: arr[4],
            mz: arr[5],
        }
    }

    /// Get total force magnitude
    pub fn force_magnitude(&self) -> f64 {
        (self.fx.powi(2) + self.fy.powi(2) + self.fz.powi(2)).sqrt()
    }

    /// Get total moment magnitude
    pub fn moment_magnitude(&self) -> f64 {
        (self.mx.powi(2) + self.my.powi(2) + self.mz.powi(2)).sqrt()
    }
}

/// Internal forces at one end of an element, in local axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemberForces {
    /// Axial force (positive = tension)
    pub axial: f64,
    /// Shear force in local y direction
    pub shear_y: f64,
    /// Shear force in local z direction
    pub shear_z: f64,
    /// Torsion
    pub torsion: f64,
    /// Bending moment about local y axis
    pub moment_y: f64,
    /// Bending moment about local z axis
    pub moment_z: f64,
}

impl MemberForces {
    /// Create from local end forces at the i-node
    pub fn from_i_node_forces(forces: &Vec12) -> Self {
        Self {
            axial: -forces[0],
            shear_y: forces[1],
            shear_z: forces[2],
            torsion: -forces[3],
            moment_y: forces[4],
            moment_z: forces[5],
        }
    }

    /// Create from local end forces at the j-node
    pub fn from_j_node_forces(forces: &Vec12) -> Self {
        Self {
            axial: forces[6],
            shear_y: -forces[7],
            shear_z: -forces[8],
            torsion: forces[9],
            moment_y: forces[10],
            moment_z: forces[11],
        }
    }
}

/// A single DOF value tagged with its node and component name
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DofValue {
    /// Node id as given in the model, not the node's position in DOF order
    pub node: usize,
    /// Component name, e.g. `u_x` or `M_z`
    pub dof: &'static str,
    pub value: f64,
}

/// Non-fatal numerical diagnostics attached to a solution
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NumericalWarning {
    /// Solvable, but the free-DOF stiffness matrix is poorly conditioned
    IllConditioned {
        pivot_ratio: f64,
        node: usize,
        dof: &'static str,
    },
    /// Applied loads and reactions do not balance
    Equilibrium { imbalance: f64, tolerance: f64 },
}

impl fmt::Display for NumericalWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericalWarning::IllConditioned { pivot_ratio, node, dof } => write!(
                f,
                "ill-conditioned stiffness matrix (pivot ratio {pivot_ratio:.3e}) near node {node} ({dof})"
            ),
            NumericalWarning::Equilibrium { imbalance, tolerance } => write!(
                f,
                "static equilibrium imbalance {imbalance:.3e} exceeds tolerance {tolerance:.1e}"
            ),
        }
    }
}

/// Solved state of a frame for its single load case
///
/// Both vectors follow the global numbering of [`DofNumbering`]. The reaction vector
/// holds the support reaction at restrained DOFs and the applied load at free DOFs.
#[derive(Debug, Clone)]
pub struct Solution {
    numbering: DofNumbering,
    displacements: FEVec,
    reactions: FEVec,
    restrained: Vec<bool>,
    warnings: Vec<NumericalWarning>,
}

impl Solution {
    pub(crate) fn new(
        numbering: DofNumbering,
        displacements: FEVec,
        reactions: FEVec,
        restrained: Vec<bool>,
        warnings: Vec<NumericalWarning>,
    ) -> Self {
        Self {
            numbering,
            displacements,
            reactions,
            restrained,
            warnings,
        }
    }

    pub fn numbering(&self) -> &DofNumbering {
        &self.numbering
    }

    /// Full displacement vector (length 6 x node count)
    pub fn displacements(&self) -> &FEVec {
        &self.displacements
    }

    /// Full reaction vector (length 6 x node count)
    pub fn reactions(&self) -> &FEVec {
        &self.reactions
    }

    pub fn warnings(&self) -> &[NumericalWarning] {
        &self.warnings
    }

    pub(crate) fn push_warning(&mut self, warning: NumericalWarning) {
        self.warnings.push(warning);
    }

    /// Whether a global DOF is restrained
    pub fn is_restrained(&self, index: usize) -> bool {
        self.restrained.get(index).copied().unwrap_or(false)
    }

    fn node_block(&self, node_id: usize, vector: &FEVec) -> FrameResult<[f64; 6]> {
        let base = self
            .numbering
            .base(node_id)
            .ok_or_else(|| FrameError::NodeNotFound(node_id.to_string()))?;
        let mut block = [0.0; 6];
        block.copy_from_slice(&vector.as_slice()[base..base + DOFS_PER_NODE]);
        Ok(block)
    }

    /// Get node displacement
    pub fn node_displacement(&self, node_id: usize) -> FrameResult<NodeDisplacement> {
        Ok(NodeDisplacement::from_array(
            self.node_block(node_id, &self.displacements)?,
        ))
    }

    /// Get node reactions (zero on free DOFs)
    pub fn node_reactions(&self, node_id: usize) -> FrameResult<Reactions> {
        let base = self
            .numbering
            .base(node_id)
            .ok_or_else(|| FrameError::NodeNotFound(node_id.to_string()))?;
        let mut block = self.node_block(node_id, &self.reactions)?;
        for (k, value) in block.iter_mut().enumerate() {
            if !self.is_restrained(base + k) {
                *value = 0.0;
            }
        }
        Ok(Reactions::from_array(block))
    }

    /// Every displacement/rotation, tagged with node id and DOF name
    pub fn displacement_records(&self) -> Vec<DofValue> {
        (0..self.displacements.len())
            .filter_map(|index| {
                let (node, dof) = self.numbering.locate(index)?;
                Some(DofValue {
                    node,
                    dof: dof.displacement_name(),
                    value: self.displacements[index],
                })
            })
            .collect()
    }

    /// Reactions at restrained DOFs only, tagged with node id and force name
    pub fn reaction_records(&self) -> Vec<DofValue> {
        (0..self.reactions.len())
            .filter(|&index| self.is_restrained(index))
            .filter_map(|index| {
                let (node, dof) = self.numbering.locate(index)?;
                Some(DofValue {
                    node,
                    dof: dof.force_name(),
                    value: self.reactions[index],
                })
            })
            .collect()
    }

    /// Summary of extreme values
    pub fn summary(&self) -> AnalysisSummary {
        let mut summary = AnalysisSummary {
            num_nodes: self.numbering.node_count(),
            total_dofs: self.numbering.dof_count(),
            free_dofs: self.restrained.iter().filter(|r| !**r).count(),
            ..Default::default()
        };

        for &id in self.numbering.node_ids() {
            if let Ok(disp) = self.node_displacement(id) {
                let mag = disp.translation_magnitude();
                if mag > summary.max_displacement {
                    summary.max_displacement = mag;
                    summary.max_disp_node = Some(id);
                }
            }
            if let Ok(rxn) = self.node_reactions(id) {
                let mag = rxn.force_magnitude();
                if mag > summary.max_reaction {
                    summary.max_reaction = mag;
                    summary.max_reaction_node = Some(id);
                }
            }
        }

        summary
    }
}

/// Summary of analysis results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Maximum translation magnitude
    pub max_displacement: f64,
    /// Node with maximum translation
    pub max_disp_node: Option<usize>,
    /// Maximum reaction force magnitude
    pub max_reaction: f64,
    /// Node with maximum reaction
    pub max_reaction_node: Option<usize>,
    /// Total number of nodes
    pub num_nodes: usize,
    /// Total DOFs
    pub total_dofs: usize,
    /// Free DOFs (unknown displacements)
    pub free_dofs: usize,
}
