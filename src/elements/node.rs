//! Node element - represents a point in 3D space

use serde::{Deserialize, Serialize};

use super::conditions::Conditions;
use crate::math::Vec3;

/// A 3D node carrying six DOFs and their boundary conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identity, unique within a frame
    pub id: usize,
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
    /// Applied loads and prescribed displacements
    pub conditions: Conditions,
}

impl Node {
    /// Create a new free, unloaded node at the given coordinates
    pub fn new(id: usize, x: f64, y: f64, z: f64) -> Self {
        Self {
            id,
            x,
            y,
            z,
            conditions: Conditions::new(),
        }
    }

    /// Set the boundary conditions of this node
    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = conditions;
        self
    }

    /// Get the coordinates as an array
    pub fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Calculate distance to another node
    pub fn distance_to(&self, other: &Node) -> f64 {
        (other.position() - self.position()).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Dof;

    #[test]
    fn test_node_creation() {
        let node = Node::new(3, 1.0, 2.0, 3.0);
        assert_eq!(node.id, 3);
        assert_eq!(node.coords(), [1.0, 2.0, 3.0]);
        assert!(!node.conditions.is_supported());
    }

    #[test]
    fn test_node_distance() {
        let n1 = Node::new(0, 0.0, 0.0, 0.0);
        let n2 = Node::new(1, 3.0, 4.0, 0.0);
        assert!((n1.distance_to(&n2) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_node_with_conditions() {
        let node = Node::new(0, 0.0, 0.0, 0.0)
            .with_conditions(Conditions::new().with_load(Dof::Uz, -4.0));
        assert_eq!(node.conditions.loads()[2], -4.0);
    }
}
