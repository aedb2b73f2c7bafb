//! Element - two-node 3D frame element (beam/column)

use std::sync::Arc;

use super::{Material, Node, Section};
use crate::error::{FrameError, FrameResult};
use crate::math::{self, Mat12, Mat3, Vec, Vec12, Vec3};
use crate::numbering::{DofNumbering, DOFS_PER_NODE};

/// Elements shorter than this are treated as zero-length
const MIN_LENGTH: f64 = 1e-10;

/// A straight 3D frame element between two nodes
///
/// The i-node to j-node direction defines the local x-axis. Geometry is validated and
/// the direction cosines are computed once, at construction.
#[derive(Debug, Clone)]
pub struct Element {
    id: usize,
    i_node: Arc<Node>,
    j_node: Arc<Node>,
    material: Material,
    section: Section,
    local_z: Option<Vec3>,
    length: f64,
    rotation: Mat3,
}

impl Element {
    /// Create a new element using the default local axis orientation
    pub fn new(
        id: usize,
        i_node: impl Into<Arc<Node>>,
        j_node: impl Into<Arc<Node>>,
        material: Material,
        section: Section,
    ) -> FrameResult<Self> {
        let i_node = i_node.into();
        let j_node = j_node.into();

        if let Some((property, value)) = material
            .invalid_property()
            .or_else(|| section.invalid_property())
        {
            return Err(FrameError::InvalidProperty {
                element: id,
                property,
                value,
            });
        }

        if let Some(node) = [&i_node, &j_node]
            .into_iter()
            .find(|n| !n.coords().iter().all(|c| c.is_finite()))
        {
            return Err(FrameError::InvalidInput(format!(
                "node {} has non-finite coordinates",
                node.id
            )));
        }

        let length = i_node.distance_to(&j_node);
        if !length.is_finite() || length < MIN_LENGTH {
            return Err(FrameError::ZeroLength {
                element: id,
                i_node: i_node.id,
                j_node: j_node.id,
            });
        }

        let axis = (j_node.position() - i_node.position()) / length;
        let reference = math::default_reference(&axis);
        let rotation = math::direction_cosines(&axis, &reference).ok_or(
            FrameError::DegenerateLocalAxis {
                element: id,
                reference: reference.into(),
            },
        )?;

        Ok(Self {
            id,
            i_node,
            j_node,
            material,
            section,
            local_z: None,
            length,
            rotation,
        })
    }

    /// Orient the local z-axis towards a reference vector
    ///
    /// Fails when the vector is zero or parallel to the element axis.
    pub fn with_local_z(mut self, local_z: [f64; 3]) -> FrameResult<Self> {
        let reference = Vec3::from(local_z);
        let axis = self.axis();
        self.rotation = math::direction_cosines(&axis, &reference).ok_or(
            FrameError::DegenerateLocalAxis {
                element: self.id,
                reference: local_z,
            },
        )?;
        self.local_z = Some(reference.normalize());
        Ok(self)
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Start node (local x origin)
    pub fn i_node(&self) -> &Arc<Node> {
        &self.i_node
    }

    /// End node
    pub fn j_node(&self) -> &Arc<Node> {
        &self.j_node
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn section(&self) -> &Section {
        &self.section
    }

    /// Normalized local z reference, if one was given
    pub fn local_z(&self) -> Option<Vec3> {
        self.local_z
    }

    /// Get the element length
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Unit vector along the local x-axis
    pub fn axis(&self) -> Vec3 {
        (self.j_node.position() - self.i_node.position()) / self.length
    }

    /// 3x3 direction cosine matrix (rows are the local axes)
    pub fn rotation(&self) -> &Mat3 {
        &self.rotation
    }

    /// 12x12 local stiffness matrix
    pub fn local_stiffness(&self) -> Mat12 {
        math::member_local_stiffness(
            self.material.e,
            self.material.shear_modulus(),
            self.section.a,
            self.section.iy,
            self.section.iz,
            self.section.j,
            self.length,
        )
    }

    /// 12x12 transformation matrix Gamma from global to local coordinates
    pub fn gamma(&self) -> Mat12 {
        math::member_transformation_matrix(&self.rotation)
    }

    /// Stiffness in global coordinates: Gamma^T * k_local * Gamma
    pub fn global_stiffness(&self) -> Mat12 {
        let t = self.gamma();
        t.transpose() * self.local_stiffness() * t
    }

    /// Global DOF indices of this element: six for the i-node, then six for the j-node
    pub fn dof_list(&self, numbering: &DofNumbering) -> FrameResult<[usize; 12]> {
        let i_base = numbering
            .base(self.i_node.id)
            .ok_or_else(|| FrameError::NodeNotFound(self.i_node.id.to_string()))?;
        let j_base = numbering
            .base(self.j_node.id)
            .ok_or_else(|| FrameError::NodeNotFound(self.j_node.id.to_string()))?;

        let mut dofs = [0; 12];
        for k in 0..DOFS_PER_NODE {
            dofs[k] = i_base + k;
            dofs[k + DOFS_PER_NODE] = j_base + k;
        }
        Ok(dofs)
    }

    /// Slice this element's 12 values out of a global DOF vector
    pub fn gather(&self, numbering: &DofNumbering, global: &Vec) -> FrameResult<Vec12> {
        let dofs = self.dof_list(numbering)?;
        if let Some(&max) = dofs.iter().max() {
            if max >= global.len() {
                return Err(FrameError::InvalidInput(format!(
                    "global vector of length {} does not cover element {}",
                    global.len(),
                    self.id
                )));
            }
        }
        Ok(Vec12::from_fn(|k, _| global[dofs[k]]))
    }

    /// Local end forces [Fx_i, Fy_i, Fz_i, Mx_i, My_i, Mz_i, Fx_j, ..., Mz_j]
    /// from the element's global end displacements
    pub fn local_end_forces(&self, global_displacements: &Vec12) -> Vec12 {
        self.local_stiffness() * (self.gamma() * global_displacements)
    }

    /// Global end forces acting on the element from its global end displacements
    pub fn global_end_forces(&self, global_displacements: &Vec12) -> Vec12 {
        self.global_stiffness() * global_displacements
    }
}
