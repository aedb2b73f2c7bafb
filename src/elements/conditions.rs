//! Per-DOF boundary conditions: applied loads and prescribed displacements

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six degrees of freedom carried by every node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dof {
    /// Translation along global X
    Ux,
    /// Translation along global Y
    Uy,
    /// Translation along global Z
    Uz,
    /// Rotation about global X
    Rx,
    /// Rotation about global Y
    Ry,
    /// Rotation about global Z
    Rz,
}

impl Dof {
    /// All DOFs in global numbering order
    pub const ALL: [Dof; 6] = [Dof::Ux, Dof::Uy, Dof::Uz, Dof::Rx, Dof::Ry, Dof::Rz];

    /// Offset of this DOF within a node's block of six
    pub fn offset(self) -> usize {
        self as usize
    }

    pub fn from_offset(offset: usize) -> Option<Dof> {
        Self::ALL.get(offset).copied()
    }

    /// Name of the displacement/rotation component (`u_x` .. `theta_z`)
    pub fn displacement_name(self) -> &'static str {
        match self {
            Dof::Ux => "u_x",
            Dof::Uy => "u_y",
            Dof::Uz => "u_z",
            Dof::Rx => "theta_x",
            Dof::Ry => "theta_y",
            Dof::Rz => "theta_z",
        }
    }

    /// Name of the conjugate force/moment component (`F_x` .. `M_z`)
    pub fn force_name(self) -> &'static str {
        match self {
            Dof::Ux => "F_x",
            Dof::Uy => "F_y",
            Dof::Uz => "F_z",
            Dof::Rx => "M_x",
            Dof::Ry => "M_y",
            Dof::Rz => "M_z",
        }
    }
}

impl fmt::Display for Dof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.displacement_name())
    }
}

/// Condition applied to a single DOF
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DofCondition {
    /// Load known, displacement unknown
    Free { load: f64 },
    /// Displacement known, reaction unknown
    Restrained { displacement: f64 },
}

impl DofCondition {
    pub fn is_restrained(&self) -> bool {
        matches!(self, DofCondition::Restrained { .. })
    }

    /// Applied load (zero for restrained DOFs)
    pub fn load(&self) -> f64 {
        match *self {
            DofCondition::Free { load } => load,
            DofCondition::Restrained { .. } => 0.0,
        }
    }

    /// Prescribed displacement (zero for free DOFs)
    pub fn displacement(&self) -> f64 {
        match *self {
            DofCondition::Free { .. } => 0.0,
            DofCondition::Restrained { displacement } => displacement,
        }
    }
}

impl Default for DofCondition {
    fn default() -> Self {
        DofCondition::Free { load: 0.0 }
    }
}

/// Boundary conditions at a node, one [`DofCondition`] per DOF
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    dofs: [DofCondition; 6],
}

impl Conditions {
    /// Create conditions with every DOF free and unloaded
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fully fixed support (all DOFs restrained at zero)
    pub fn fixed() -> Self {
        Self::with_restraints(true, true, true, true, true, true)
    }

    /// Create a pinned support (translations restrained, rotations free)
    pub fn pinned() -> Self {
        Self::with_restraints(true, true, true, false, false, false)
    }

    /// Create conditions with specific zero-displacement restraints
    pub fn with_restraints(dx: bool, dy: bool, dz: bool, rx: bool, ry: bool, rz: bool) -> Self {
        let mut conditions = Self::new();
        for (dof, restrained) in Dof::ALL.into_iter().zip([dx, dy, dz, rx, ry, rz]) {
            if restrained {
                conditions.dofs[dof.offset()] = DofCondition::Restrained { displacement: 0.0 };
            }
        }
        conditions
    }

    /// Apply a load on a DOF, freeing it if it was restrained
    pub fn with_load(mut self, dof: Dof, load: f64) -> Self {
        self.dofs[dof.offset()] = DofCondition::Free { load };
        self
    }

    /// Prescribe a displacement on a DOF
    pub fn with_displacement(mut self, dof: Dof, displacement: f64) -> Self {
        self.dofs[dof.offset()] = DofCondition::Restrained { displacement };
        self
    }

    /// Set a force-only load [FX, FY, FZ] on the translational DOFs
    pub fn with_force(self, fx: f64, fy: f64, fz: f64) -> Self {
        self.with_load(Dof::Ux, fx)
            .with_load(Dof::Uy, fy)
            .with_load(Dof::Uz, fz)
    }

    /// Build conditions from optional loads and displacements per DOF
    ///
    /// A prescribed displacement makes the DOF restrained. A DOF carrying both a
    /// displacement and a nonzero load is rejected; the offending DOF is returned.
    pub fn from_parts(
        loads: [Option<f64>; 6],
        displacements: [Option<f64>; 6],
    ) -> Result<Self, Dof> {
        let mut conditions = Self::new();
        for dof in Dof::ALL {
            let i = dof.offset();
            conditions.dofs[i] = match (loads[i], displacements[i]) {
                (Some(load), Some(_)) if load != 0.0 => return Err(dof),
                (_, Some(displacement)) => DofCondition::Restrained { displacement },
                (Some(load), None) => DofCondition::Free { load },
                (None, None) => DofCondition::default(),
            };
        }
        Ok(conditions)
    }

    pub fn get(&self, dof: Dof) -> DofCondition {
        self.dofs[dof.offset()]
    }

    /// Conditions in DOF order
    pub fn as_array(&self) -> [DofCondition; 6] {
        self.dofs
    }

    /// Applied loads [FX, FY, FZ, MX, MY, MZ]
    pub fn loads(&self) -> [f64; 6] {
        self.dofs.map(|c| c.load())
    }

    /// Get list of restrained DOFs
    pub fn restrained_dofs(&self) -> Vec<Dof> {
        Dof::ALL
            .into_iter()
            .filter(|d| self.get(*d).is_restrained())
            .collect()
    }

    /// Check if any DOF is restrained
    pub fn is_supported(&self) -> bool {
        self.dofs.iter().any(DofCondition::is_restrained)
    }

    /// Count number of restrained DOFs
    pub fn num_restrained(&self) -> usize {
        self.dofs.iter().filter(|c| c.is_restrained()).count()
    }

    pub(crate) fn all_finite(&self) -> bool {
        self.dofs
            .iter()
            .all(|c| c.load().is_finite() && c.displacement().is_finite())
    }
}
