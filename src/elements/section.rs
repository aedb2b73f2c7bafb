//! Section properties for frame elements

use serde::{Deserialize, Serialize};

/// Cross-section properties for frame elements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Cross-sectional area
    pub a: f64,
    /// Moment of inertia about local y-axis
    pub iy: f64,
    /// Moment of inertia about local z-axis
    pub iz: f64,
    /// Torsional constant
    pub j: f64,
}

impl Section {
    /// Create a new section with basic properties
    pub fn new(a: f64, iy: f64, iz: f64, j: f64) -> Self {
        Self { a, iy, iz, j }
    }

    /// Axial-only section: no bending or torsional stiffness
    pub fn truss(a: f64) -> Self {
        Self::new(a, 0.0, 0.0, 0.0)
    }

    /// Create a rectangular section
    ///
    /// `width` runs along local y, `depth` along local z.
    pub fn rectangular(width: f64, depth: f64) -> Self {
        let a = width * depth;
        let iy = width * depth.powi(3) / 12.0;
        let iz = depth * width.powi(3) / 12.0;

        // Torsional constant for rectangle (approximate)
        let (long, short) = if width > depth { (width, depth) } else { (depth, width) };
        let j = long * short.powi(3) / 3.0 * (1.0 - 0.63 * short / long);

        Self { a, iy, iz, j }
    }

    /// Create a circular section
    pub fn circular(diameter: f64) -> Self {
        let r = diameter / 2.0;
        let a = std::f64::consts::PI * r.powi(2);
        let i = std::f64::consts::PI * r.powi(4) / 4.0;
        let j = std::f64::consts::PI * r.powi(4) / 2.0;

        Self { a, iy: i, iz: i, j }
    }

    /// First property violating A > 0 or Iy, Iz, J >= 0
    pub(crate) fn invalid_property(&self) -> Option<(&'static str, f64)> {
        if !(self.a.is_finite() && self.a > 0.0) {
            return Some(("A", self.a));
        }
        [("Iy", self.iy), ("Iz", self.iz), ("J", self.j)]
            .into_iter()
            .find(|(_, v)| !(v.is_finite() && *v >= 0.0))
    }
}

/// Placeholder section used when a record omits properties: a 1 x 0.5 rectangle
/// (A = 0.5, Iy = 1*0.5^3/12, Iz = 0.5*1^3/12, J = 0.02861). Not a real profile.
impl Default for Section {
    fn default() -> Self {
        Self {
            a: 0.5,
            iy: 1.0 * 0.5_f64.powi(3) / 12.0,
            iz: 0.5 * 1.0_f64.powi(3) / 12.0,
            j: 0.02861,
        }
    }
}
