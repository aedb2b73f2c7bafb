//! Analysis options

use serde::{Deserialize, Serialize};

use crate::error::{FrameError, FrameResult};

/// Largest number of deformed-shape samples allowed per element
pub const MAX_SAMPLES: usize = 10_000;

/// Interpolation used to draw the deformed shape between nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Straight lines between the displaced nodes
    Linear,
    /// Cubic Hermite curves honoring the end rotations
    #[default]
    Hermite,
}

/// Options for a static analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Exaggeration applied to displacements when building deformed shapes.
    /// Has no effect on the solved displacements or reactions.
    pub deformation_scale: f64,
    /// Number of points sampled along each element's deformed shape
    pub samples: usize,
    /// Shape functions used for the deformed shape
    pub interpolation: Interpolation,
    /// Check static equilibrium after the solve
    pub check_statics: bool,
    /// Allowed equilibrium imbalance, relative to the largest applied load or reaction
    pub statics_tolerance: f64,
    /// Cholesky pivot ratio above which the system is reported as ill-conditioned
    pub ill_conditioning: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            deformation_scale: 10.0,
            samples: 21,
            interpolation: Interpolation::Hermite,
            check_statics: true,
            statics_tolerance: 1e-6,
            ill_conditioning: 1e8,
        }
    }
}

impl AnalysisOptions {
    /// Set the deformation scale
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.deformation_scale = scale;
        self
    }

    /// Set the number of samples per element
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Set the interpolation
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Skip the equilibrium check
    pub fn without_statics_check(mut self) -> Self {
        self.check_statics = false;
        self
    }

    /// Set the ill-conditioning warning threshold
    pub fn with_ill_conditioning(mut self, ratio: f64) -> Self {
        self.ill_conditioning = ratio;
        self
    }

    /// Set the allowed equilibrium imbalance
    pub fn with_statics_tolerance(mut self, tolerance: f64) -> Self {
        self.statics_tolerance = tolerance;
        self
    }

    /// Reject options no analysis can honor
    pub fn validate(&self) -> FrameResult<()> {
        if !(2..=MAX_SAMPLES).contains(&self.samples) {
            return Err(FrameError::InvalidInput(format!(
                "samples must be between 2 and {MAX_SAMPLES}, got {}",
                self.samples
            )));
        }
        if !self.deformation_scale.is_finite() {
            return Err(FrameError::InvalidInput(format!(
                "deformation scale must be finite, got {}",
                self.deformation_scale
            )));
        }
        Ok(())
    }
}
