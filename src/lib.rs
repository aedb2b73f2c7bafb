//! Frame Solver - linear static analysis of 3D frames
//!
//! This library analyses structures made of straight two-node beam/column elements
//! with the direct stiffness method:
//! - Euler-Bernoulli frame elements (axial, torsion, biaxial bending)
//! - Prescribed loads and prescribed displacements at every nodal DOF
//! - Partitioned solve for displacements and support reactions
//! - Deformed-shape sampling with linear or cubic Hermite shape functions
//! - A JSON request layer and an optional HTTP server (`server` feature)
//!
//! ## Example
//! ```rust
//! use frame_solver::prelude::*;
//!
//! let base = Node::new(0, 0.0, 0.0, 0.0).with_conditions(Conditions::fixed());
//! let tip = Node::new(1, 10.0, 0.0, 0.0)
//!     .with_conditions(Conditions::new().with_load(Dof::Uy, -10000.0));
//!
//! let column = Element::new(0, base, tip, Material::steel(), Section::rectangular(0.3, 0.5))
//!     .unwrap();
//!
//! let mut frame = Frame::new();
//! frame.add_element(column).unwrap();
//! frame.assemble().unwrap();
//!
//! let solution = frame.solve().unwrap();
//! let displacement = solution.node_displacement(1).unwrap();
//! assert!(displacement.dy < 0.0);
//! ```

pub mod analysis;
pub mod elements;
pub mod error;
pub mod frame;
pub mod input;
pub mod math;
pub mod numbering;
pub mod results;
pub mod shape_functions;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{AnalysisOptions, Interpolation};
    pub use crate::elements::{Conditions, Dof, DofCondition, Element, Material, Node, Section};
    pub use crate::error::{ErrorKind, FrameError, FrameResult};
    pub use crate::frame::Frame;
    pub use crate::input::{parse_request, respond, run_analysis, AnalysisRequest, AnalysisResponse};
    pub use crate::numbering::DofNumbering;
    pub use crate::results::{
        AnalysisSummary, MemberForces, NodeDisplacement, NumericalWarning, Reactions, Solution,
    };
    pub use crate::shape_functions::{
        DeformedShape, HermiteShapeFunctions, LinearShapeFunctions, ShapeFunctions,
    };
}
