//! Error types for the frame solver

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for frame analysis
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Node '{0}' not found")]
    NodeNotFound(String),

    #[error("Element {0} not found")]
    ElementNotFound(usize),

    #[error("Element '{element}' must reference exactly 2 nodes, found {found}")]
    WrongNodeCount { element: String, found: usize },

    #[error("Node {node} is defined twice with different coordinates or conditions")]
    DuplicateNode { node: usize },

    #[error("Node {node}: {dof} has both a prescribed displacement and a nonzero load")]
    ConflictingCondition { node: usize, dof: &'static str },

    #[error("Element {element}: invalid property {property} = {value}")]
    InvalidProperty {
        element: usize,
        property: &'static str,
        value: f64,
    },

    #[error("Element {element} has zero length (nodes {i_node} and {j_node} coincide)")]
    ZeroLength {
        element: usize,
        i_node: usize,
        j_node: usize,
    },

    #[error("Element {element}: local_z reference {reference:?} is zero or parallel to the element axis")]
    DegenerateLocalAxis { element: usize, reference: [f64; 3] },

    #[error("Singular stiffness matrix - insufficient restraint at node {node} ({dof})")]
    SingularMatrix { node: usize, dof: &'static str },

    #[error("Structure is a mechanism: load on node {node} ({dof}) has no stiffness to resist it")]
    Mechanism { node: usize, dof: &'static str },

    #[error("Frame already assembled - elements can no longer be added")]
    AlreadyAssembled,

    #[error("Frame already solved - build a new frame for another load case")]
    AlreadySolved,

    #[error("Frame not assembled - run assemble() first")]
    NotAssembled,

    #[error("Frame not solved - run solve() first")]
    NotSolved,

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Coarse classification of a [`FrameError`], reported to callers of the request layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or inconsistent node/element records
    InputValidation,
    /// Zero-length element or degenerate local axis
    Geometry,
    /// Restraints do not remove all rigid-body motion
    SingularSystem,
    /// Frame lifecycle misuse
    State,
}

impl FrameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FrameError::InvalidInput(_)
            | FrameError::NodeNotFound(_)
            | FrameError::ElementNotFound(_)
            | FrameError::WrongNodeCount { .. }
            | FrameError::DuplicateNode { .. }
            | FrameError::ConflictingCondition { .. }
            | FrameError::InvalidProperty { .. }
            | FrameError::SerializationError(_) => ErrorKind::InputValidation,
            FrameError::ZeroLength { .. } | FrameError::DegenerateLocalAxis { .. } => {
                ErrorKind::Geometry
            }
            FrameError::SingularMatrix { .. } | FrameError::Mechanism { .. } => {
                ErrorKind::SingularSystem
            }
            FrameError::AlreadyAssembled
            | FrameError::AlreadySolved
            | FrameError::NotAssembled
            | FrameError::NotSolved => ErrorKind::State,
        }
    }
}

/// Result type for frame operations
pub type FrameResult<T> = Result<T, FrameError>;
