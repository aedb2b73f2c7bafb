//! Material properties

use serde::{Deserialize, Serialize};

/// Isotropic linear-elastic material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Modulus of elasticity (Young's modulus)
    pub e: f64,
    /// Poisson's ratio
    pub nu: f64,
}

impl Material {
    /// Create a new material from E and nu
    pub fn new(e: f64, nu: f64) -> Self {
        Self { e, nu }
    }

    /// Shear modulus G = E / (2 * (1 + nu))
    pub fn shear_modulus(&self) -> f64 {
        self.e / (2.0 * (1.0 + self.nu))
    }

    /// Create a standard structural steel material in Pa
    pub fn steel() -> Self {
        Self::new(200e9, 0.3)
    }

    /// Create an aluminum material (6061-T6) in Pa
    pub fn aluminum() -> Self {
        Self::new(68.9e9, 0.33)
    }

    /// First property violating E > 0 or -1 < nu <= 0.5
    pub(crate) fn invalid_property(&self) -> Option<(&'static str, f64)> {
        if !(self.e.is_finite() && self.e > 0.0) {
            return Some(("E", self.e));
        }
        if !(self.nu.is_finite() && self.nu > -1.0 && self.nu <= 0.5) {
            return Some(("nu", self.nu));
        }
        None
    }
}

/// Placeholder values (E = 1000, nu = 0.3) used when a record omits them.
/// They are not a physical material.
impl Default for Material {
    fn default() -> Self {
        Self::new(1000.0, 0.3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shear_modulus() {
        let mat = Material::new(200e9, 0.3);
        let expected_g = 200e9 / (2.0 * 1.3);
        assert!((mat.shear_modulus() - expected_g).abs() < 1.0);
    }

    #[test]
    fn test_validation() {
        assert!(Material::steel().invalid_property().is_none());
        assert_eq!(Material::new(0.0, 0.3).invalid_property(), Some(("E", 0.0)));
        assert_eq!(Material::new(1.0, -1.0).invalid_property(), Some(("nu", -1.0)));
    }
}
