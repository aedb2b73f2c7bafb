//! Frame - assembly and solution of a 3D frame for a single load case

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::analysis::{AnalysisOptions, Interpolation};
use crate::elements::{DofCondition, Element, Node};
use crate::error::{FrameError, FrameResult};
use crate::math::{self, Mat, Vec as FEVec, Vec12, Vec3};
use crate::numbering::{DofNumbering, DOFS_PER_NODE};
use crate::results::{MemberForces, NumericalWarning, Solution};
use crate::shape_functions::{
    DeformedShape, HermiteShapeFunctions, LinearShapeFunctions, ShapeFunctions,
};

/// Stiffness below this fraction of the largest diagonal counts as none
const ZERO_STIFFNESS: f64 = 1e-12;

/// Loads below this fraction of the largest free-DOF load are treated as zero
/// when they act along a direction with no stiffness
const NEGLIGIBLE_LOAD: f64 = 1e-9;

/// One unknown of the reduced free-DOF system: a unit combination of global DOFs
#[derive(Debug, Clone)]
struct Coordinate {
    terms: Vec<(usize, f64)>,
}

impl Coordinate {
    fn single(index: usize) -> Self {
        Self {
            terms: vec![(index, 1.0)],
        }
    }

    fn along(dofs: &[usize], direction: impl Iterator<Item = f64>) -> Self {
        Self {
            terms: dofs.iter().copied().zip(direction).collect(),
        }
    }

    /// Global DOF with the largest coefficient
    fn dominant(&self) -> usize {
        self.terms
            .iter()
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
            .map(|&(i, _)| i)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
struct Assembly {
    numbering: DofNumbering,
    k: Mat,
    f: FEVec,
}

/// A 3D frame: elements, the nodes they connect, and their solved state
///
/// A frame serves exactly one load case. It is populated with elements, assembled,
/// then solved once; build a new frame for another load case.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    elements: Vec<Element>,
    nodes: BTreeMap<usize, Arc<Node>>,
    assembly: Option<Assembly>,
    solution: Option<Solution>,
}

impl Frame {
    /// Create a new empty frame
    pub fn new() -> Self {
        Self::default()
    }

    // ========================
    // Model Building Methods
    // ========================

    /// Add an element (and its nodes) to the frame
    pub fn add_element(&mut self, element: Element) -> FrameResult<()> {
        if self.solution.is_some() {
            return Err(FrameError::AlreadySolved);
        }
        if self.assembly.is_some() {
            return Err(FrameError::AlreadyAssembled);
        }
        if self.elements.iter().any(|e| e.id() == element.id()) {
            return Err(FrameError::InvalidInput(format!(
                "element id {} is used twice",
                element.id()
            )));
        }

        for node in [element.i_node(), element.j_node()] {
            if let Some(existing) = self.nodes.get(&node.id) {
                if !Arc::ptr_eq(existing, node) && **existing != **node {
                    return Err(FrameError::DuplicateNode { node: node.id });
                }
            }
        }
        for node in [element.i_node(), element.j_node()] {
            self.nodes.entry(node.id).or_insert_with(|| Arc::clone(node));
        }

        self.elements.push(element);
        Ok(())
    }

    /// Add several elements, stopping at the first failure
    pub fn add_elements(&mut self, elements: impl IntoIterator<Item = Element>) -> FrameResult<()> {
        for element in elements {
            self.add_element(element)?;
        }
        Ok(())
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Get an element by id
    pub fn element(&self, id: usize) -> FrameResult<&Element> {
        self.elements
            .iter()
            .find(|e| e.id() == id)
            .ok_or(FrameError::ElementNotFound(id))
    }

    /// Distinct nodes in ascending id order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().map(|n| n.as_ref())
    }

    /// Get a node by id
    pub fn node(&self, id: usize) -> FrameResult<&Node> {
        self.nodes
            .get(&id)
            .map(|n| n.as_ref())
            .ok_or_else(|| FrameError::NodeNotFound(id.to_string()))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn dof_count(&self) -> usize {
        self.nodes.len() * DOFS_PER_NODE
    }

    /// DOF numbering of the current node set
    pub fn numbering(&self) -> DofNumbering {
        DofNumbering::new(self.nodes.keys().copied())
    }

    pub fn is_assembled(&self) -> bool {
        self.assembly.is_some()
    }

    pub fn is_solved(&self) -> bool {
        self.solution.is_some()
    }

    // ========================
    // Assembly
    // ========================

    /// Build the global stiffness matrix and load vector
    pub fn assemble(&mut self) -> FrameResult<()> {
        if self.solution.is_some() {
            return Err(FrameError::AlreadySolved);
        }
        if self.elements.is_empty() {
            return Err(FrameError::InvalidInput("frame has no elements".to_string()));
        }
        if let Some(node) = self.nodes.values().find(|n| !n.conditions.all_finite()) {
            return Err(FrameError::InvalidInput(format!(
                "node {} has a non-finite load or displacement",
                node.id
            )));
        }

        let numbering = self.numbering();
        let n_dofs = numbering.dof_count();
        let mut k = Mat::zeros(n_dofs, n_dofs);

        for element in &self.elements {
            let dofs = element.dof_list(&numbering)?;
            let k_element = element.global_stiffness();
            for (a, &row) in dofs.iter().enumerate() {
                for (b, &col) in dofs.iter().enumerate() {
                    k[(row, col)] += k_element[(a, b)];
                }
            }
        }

        let mut f = FEVec::zeros(n_dofs);
        for node in self.nodes.values() {
            if let Some(base) = numbering.base(node.id) {
                for (offset, load) in node.conditions.loads().into_iter().enumerate() {
                    f[base + offset] = load;
                }
            }
        }

        debug!(
            "Assembled {} elements, {} nodes, {} DOFs",
            self.elements.len(),
            numbering.node_count(),
            n_dofs
        );

        self.assembly = Some(Assembly { numbering, k, f });
        Ok(())
    }

    fn assembly(&self) -> FrameResult<&Assembly> {
        self.assembly.as_ref().ok_or(FrameError::NotAssembled)
    }

    /// Assembled global stiffness matrix
    pub fn stiffness_matrix(&self) -> FrameResult<&Mat> {
        Ok(&self.assembly()?.k)
    }

    /// Assembled global load vector (zero at restrained DOFs)
    pub fn load_vector(&self) -> FrameResult<&FEVec> {
        Ok(&self.assembly()?.f)
    }

    // ========================
    // Solution
    // ========================

    /// Solve with default options
    pub fn solve(&mut self) -> FrameResult<&Solution> {
        self.solve_with(&AnalysisOptions::default())
    }

    /// Partition the system into free and restrained DOFs and solve
    ///
    /// Free directions that no element stiffens (a single DOF, or an inclined
    /// combination of a node's translations or rotations) are left at zero
    /// displacement; a load along such a direction makes the structure a mechanism.
    pub fn solve_with(&mut self, options: &AnalysisOptions) -> FrameResult<&Solution> {
        if self.solution.is_some() {
            return Err(FrameError::AlreadySolved);
        }
        let Assembly { numbering, k, f } = self.assembly()?;
        let n_dofs = numbering.dof_count();

        let mut delta = FEVec::zeros(n_dofs);
        let mut restrained = vec![false; n_dofs];
        for node in self.nodes.values() {
            let base = numbering
                .base(node.id)
                .ok_or_else(|| FrameError::NodeNotFound(node.id.to_string()))?;
            for (offset, condition) in node.conditions.as_array().into_iter().enumerate() {
                match condition {
                    DofCondition::Restrained { displacement } => {
                        restrained[base + offset] = true;
                        delta[base + offset] = displacement;
                    }
                    DofCondition::Free { .. } => {}
                }
            }
        }

        let free_count = restrained.iter().filter(|&&r| !r).count();

        // f_F - K_FS * d_S at every free DOF
        let coupled = k * &delta;
        let rhs_full = FEVec::from_fn(n_dofs, |i, _| {
            if restrained[i] {
                0.0
            } else {
                f[i] - coupled[i]
            }
        });

        let coordinates = self.free_coordinates(numbering, k, &rhs_full, &restrained)?;

        let n_active = coordinates.len();
        let k_ff = Mat::from_fn(n_active, n_active, |r, c| {
            let mut sum = 0.0;
            for &(i, a) in &coordinates[r].terms {
                for &(j, b) in &coordinates[c].terms {
                    sum += a * b * k[(i, j)];
                }
            }
            sum
        });
        let rhs = FEVec::from_fn(n_active, |r, _| {
            coordinates[r]
                .terms
                .iter()
                .map(|&(i, a)| a * rhs_full[i])
                .sum::<f64>()
        });

        let spd = math::solve_cholesky(k_ff, &rhs).map_err(|row| {
            let (node, dof) = locate(numbering, coordinates[row].dominant());
            FrameError::SingularMatrix { node, dof }
        })?;
        for (coordinate, y) in coordinates.iter().zip(spd.x.iter()) {
            for &(i, a) in &coordinate.terms {
                delta[i] += a * y;
            }
        }

        let mut warnings = Vec::new();
        if spd.pivot_ratio > options.ill_conditioning {
            let (node, dof) = locate(numbering, coordinates[spd.weakest].dominant());
            warnings.push(NumericalWarning::IllConditioned {
                pivot_ratio: spd.pivot_ratio,
                node,
                dof,
            });
        }

        // Restrained DOFs: K_SF * d_F + K_SS * d_S; free DOFs keep their applied load
        let nodal_forces = k * &delta;
        let reactions = FEVec::from_fn(n_dofs, |i, _| {
            if restrained[i] {
                nodal_forces[i]
            } else {
                f[i]
            }
        });

        info!(
            "Solved {} DOFs: {} free ({} active), {} restrained",
            n_dofs,
            free_count,
            n_active,
            n_dofs - free_count
        );

        let mut solution = Solution::new(numbering.clone(), delta, reactions, restrained, warnings);

        if options.check_statics {
            let imbalance = self.equilibrium_imbalance(&solution);
            if imbalance > options.statics_tolerance {
                solution.push_warning(NumericalWarning::Equilibrium {
                    imbalance,
                    tolerance: options.statics_tolerance,
                });
            }
        }

        for warning in solution.warnings() {
            warn!("{warning}");
        }

        Ok(&*self.solution.insert(solution))
    }

    /// Unknowns of the free-DOF system
    ///
    /// Each node's free translations and free rotations are checked as 3x3 blocks. A
    /// zero-stiffness direction of a block is decoupled from every other DOF since K is
    /// positive semi-definite, so it is dropped; if it carries load the frame is a
    /// mechanism. Blocks with full stiffness keep their DOFs as they are.
    fn free_coordinates(
        &self,
        numbering: &DofNumbering,
        k: &Mat,
        rhs: &FEVec,
        restrained: &[bool],
    ) -> FrameResult<Vec<Coordinate>> {
        let zero = ZERO_STIFFNESS * k.diagonal().amax();
        let max_load = (0..rhs.len())
            .filter(|&i| !restrained[i])
            .fold(0.0_f64, |acc, i| acc.max(rhs[i].abs()));
        let negligible = NEGLIGIBLE_LOAD * max_load;

        let mechanism = |index: usize| {
            let (node, dof) = locate(numbering, index);
            FrameError::Mechanism { node, dof }
        };

        let mut coordinates = Vec::new();
        for &id in numbering.node_ids() {
            let Some(base) = numbering.base(id) else {
                continue;
            };
            for half in [0, 3] {
                let block: Vec<usize> = (base + half..base + half + 3)
                    .filter(|&i| !restrained[i])
                    .collect();

                // DOFs with no stiffness at all
                let mut stiff = Vec::with_capacity(block.len());
                for i in block {
                    if k[(i, i)] > zero {
                        stiff.push(i);
                    } else if rhs[i].abs() > negligible {
                        return Err(mechanism(i));
                    }
                }
                if stiff.is_empty() {
                    continue;
                }

                let sub = Mat::from_fn(stiff.len(), stiff.len(), |a, b| k[(stiff[a], stiff[b])]);
                let (kept, null) = math::split_null_space(sub, zero);
                if null.ncols() == 0 {
                    coordinates.extend(stiff.iter().map(|&i| Coordinate::single(i)));
                    continue;
                }

                for direction in null.column_iter() {
                    let coordinate = Coordinate::along(&stiff, direction.iter().copied());
                    let load: f64 = coordinate.terms.iter().map(|&(i, a)| a * rhs[i]).sum();
                    if load.abs() > negligible {
                        return Err(mechanism(coordinate.dominant()));
                    }
                }
                coordinates.extend(
                    kept.column_iter()
                        .map(|direction| Coordinate::along(&stiff, direction.iter().copied())),
                );
            }
        }

        Ok(coordinates)
    }

    /// Get the solution
    pub fn solution(&self) -> FrameResult<&Solution> {
        self.solution.as_ref().ok_or(FrameError::NotSolved)
    }

    /// Resultant [FX, FY, FZ, MX, MY, MZ] of applied loads plus reactions, with moments
    /// about the global origin. Zero for a structure in equilibrium.
    pub fn resultant(&self) -> FrameResult<[f64; 6]> {
        let solution = self.solution()?;
        Ok(self.resultant_of(solution))
    }

    fn resultant_of(&self, solution: &Solution) -> [f64; 6] {
        let numbering = solution.numbering();
        let forces = solution.reactions();
        let mut total_force = Vec3::zeros();
        let mut total_moment = Vec3::zeros();

        for node in self.nodes.values() {
            let Some(base) = numbering.base(node.id) else {
                continue;
            };
            let force = Vec3::new(forces[base], forces[base + 1], forces[base + 2]);
            let moment = Vec3::new(forces[base + 3], forces[base + 4], forces[base + 5]);
            total_force += force;
            total_moment += moment + node.position().cross(&force);
        }

        [
            total_force.x,
            total_force.y,
            total_force.z,
            total_moment.x,
            total_moment.y,
            total_moment.z,
        ]
    }

    /// Largest resultant component relative to the size of the loads
    fn equilibrium_imbalance(&self, solution: &Solution) -> f64 {
        let forces = solution.reactions();
        let mut max_force = 0.0_f64;
        let mut max_moment = 0.0_f64;
        for (i, value) in forces.iter().enumerate() {
            if i % DOFS_PER_NODE < 3 {
                max_force = max_force.max(value.abs());
            } else {
                max_moment = max_moment.max(value.abs());
            }
        }
        let max_coord = self
            .nodes
            .values()
            .flat_map(|n| n.coords())
            .fold(0.0_f64, |acc, c| acc.max(c.abs()));

        let scale = max_force * (1.0 + max_coord) + max_moment;
        if scale == 0.0 {
            return 0.0;
        }
        let resultant = self.resultant_of(solution);
        resultant.iter().fold(0.0_f64, |acc, r| acc.max(r.abs())) / scale
    }

    // ========================
    // Post-processing
    // ========================

    /// Global end displacements of an element
    pub fn element_displacements(&self, element: &Element) -> FrameResult<Vec12> {
        let solution = self.solution()?;
        element.gather(solution.numbering(), solution.displacements())
    }

    /// Local end forces of an element
    /// [Fx_i, Fy_i, Fz_i, Mx_i, My_i, Mz_i, Fx_j, Fy_j, Fz_j, Mx_j, My_j, Mz_j]
    pub fn local_end_forces(&self, element_id: usize) -> FrameResult<Vec12> {
        let element = self.element(element_id)?;
        let d = self.element_displacements(element)?;
        Ok(element.local_end_forces(&d))
    }

    /// Internal forces at the i-node and j-node of an element
    pub fn member_forces(&self, element_id: usize) -> FrameResult<(MemberForces, MemberForces)> {
        let forces = self.local_end_forces(element_id)?;
        Ok((
            MemberForces::from_i_node_forces(&forces),
            MemberForces::from_j_node_forces(&forces),
        ))
    }

    /// Deformed shape of every element, displacements multiplied by the deformation scale
    pub fn deformed_shapes(&self, options: &AnalysisOptions) -> FrameResult<Vec<DeformedShape>> {
        options.validate()?;
        let shape_functions: &dyn ShapeFunctions = match options.interpolation {
            Interpolation::Linear => &LinearShapeFunctions,
            Interpolation::Hermite => &HermiteShapeFunctions,
        };

        self.elements
            .iter()
            .map(|element| {
                let d = self.element_displacements(element)? * options.deformation_scale;
                shape_functions.apply(element, &d, options.samples)
            })
            .collect()
    }
}

fn locate(numbering: &DofNumbering, index: usize) -> (usize, &'static str) {
    numbering
        .locate(index)
        .map(|(node, dof)| (node, dof.displacement_name()))
        .unwrap_or((index / DOFS_PER_NODE, "unknown"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Conditions, Dof, Material, Section};
    use approx::assert_relative_eq;

    fn cantilever(tip: Conditions) -> Frame {
        let base = Node::new(0, 0.0, 0.0, 0.0).with_conditions(Conditions::fixed());
        let end = Node::new(1, 10.0, 0.0, 0.0).with_conditions(tip);
        let element = Element::new(
            0,
            base,
            end,
            Material::steel(),
            Section::rectangular(0.3, 0.5),
        )
        .unwrap();

        let mut frame = Frame::new();
        frame.add_element(element).unwrap();
        frame
    }

    #[test]
    fn test_simple_cantilever() {
        let mut frame = cantilever(Conditions::new().with_load(Dof::Uy, -10000.0));
        frame.assemble().unwrap();
        let solution = frame.solve().unwrap();

        let disp = solution.node_displacement(1).unwrap();
        assert!(disp.dy < 0.0, "Expected negative Y displacement");

        let rxn = solution.node_reactions(0).unwrap();
        assert_relative_eq!(rxn.fy, 10000.0, epsilon = 1e-6);
        assert_relative_eq!(rxn.mz, 100000.0, epsilon = 1e-4);
        assert!(solution.warnings().is_empty());
    }

    #[test]
    fn test_assembled_matrix_is_symmetric() {
        let mut frame = cantilever(Conditions::new());
        frame.assemble().unwrap();
        let k = frame.stiffness_matrix().unwrap();
        assert_eq!(k.nrows(), 12);
        assert_relative_eq!(k, &k.transpose(), epsilon = 1e-6);
    }

    #[test]
    fn test_lifecycle() {
        let mut frame = cantilever(Conditions::new());
        assert!(matches!(frame.solve(), Err(FrameError::NotAssembled)));
        assert!(matches!(frame.solution(), Err(FrameError::NotSolved)));

        frame.assemble().unwrap();
        let extra = Element::new(
            1,
            Node::new(1, 10.0, 0.0, 0.0),
            Node::new(2, 10.0, 5.0, 0.0),
            Material::steel(),
            Section::rectangular(0.3, 0.5),
        )
        .unwrap();
        assert!(matches!(frame.add_element(extra), Err(FrameError::AlreadyAssembled)));

        frame.solve().unwrap();
        assert!(matches!(frame.solve(), Err(FrameError::AlreadySolved)));
        assert!(matches!(frame.assemble(), Err(FrameError::AlreadySolved)));
    }

    #[test]
    fn test_empty_frame_rejected() {
        let mut frame = Frame::new();
        assert!(matches!(frame.assemble(), Err(FrameError::InvalidInput(_))));
    }

    #[test]
    fn test_conflicting_node_definitions() {
        let a = Node::new(0, 0.0, 0.0, 0.0);
        let b = Node::new(1, 1.0, 0.0, 0.0);
        let b_moved = Node::new(1, 2.0, 0.0, 0.0);
        let c = Node::new(2, 0.0, 1.0, 0.0);

        let mut frame = Frame::new();
        frame
            .add_element(Element::new(0, a, b, Material::default(), Section::default()).unwrap())
            .unwrap();
        let err = frame
            .add_element(
                Element::new(1, b_moved, c, Material::default(), Section::default()).unwrap(),
            )
            .unwrap_err();
        assert!(matches!(err, FrameError::DuplicateNode { node: 1 }));
    }

    #[test]
    fn test_load_vector_placement() {
        let mut frame = cantilever(Conditions::new().with_load(Dof::Rx, 3.0));
        frame.assemble().unwrap();
        let f = frame.load_vector().unwrap();
        assert_eq!(f[9], 3.0);
        assert_eq!(f.iter().filter(|v| **v != 0.0).count(), 1);
    }

    #[test]
    fn test_unsupported_frame_is_singular() {
        let mut frame = Frame::new();
        let element = Element::new(
            0,
            Node::new(0, 0.0, 0.0, 0.0),
            Node::new(1, 0.0, 0.0, 3.0).with_conditions(Conditions::new().with_force(1.0, 0.0, 0.0)),
            Material::default(),
            Section::default(),
        )
        .unwrap();
        frame.add_element(element).unwrap();
        frame.assemble().unwrap();
        let err = frame.solve().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::SingularSystem);
        assert!(!frame.is_solved());
    }
}
