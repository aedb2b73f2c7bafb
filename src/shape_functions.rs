//! Shape functions used to draw the deformed centerline of an element
//!
//! Displacements are interpolated in local axes and mapped back to global axes, then
//! offset by the undeformed position along the element.

use serde::Serialize;

use crate::elements::Element;
use crate::error::{FrameError, FrameResult};
use crate::math::{Vec12, Vec3};

/// Local displacement of a point on the element centerline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalDeflection {
    /// Axial displacement (local x)
    pub u: f64,
    /// Transverse displacement along local y
    pub v: f64,
    /// Transverse displacement along local z
    pub w: f64,
    /// Twist about the local x-axis
    pub twist: f64,
}

/// Sampled deformed shape of one element
#[derive(Debug, Clone, Serialize)]
pub struct DeformedShape {
    /// Element id
    pub element: usize,
    /// Global coordinates of the deformed centerline, i-node first
    pub points: Vec<[f64; 3]>,
    /// Twist about the element axis at each sample
    pub twist: Vec<f64>,
    /// Deformed i-node position
    pub start: [f64; 3],
    /// Deformed j-node position
    pub end: [f64; 3],
}

/// Interpolation of an element's 12 local DOF values along its length
pub trait ShapeFunctions {
    /// Deflection at normalized position `t` in [0, 1]
    ///
    /// `local` holds [u, v, w, θx, θy, θz] at the i-node followed by the j-node.
    fn evaluate(&self, length: f64, local: &Vec12, t: f64) -> LocalDeflection;

    /// Sample the deformed shape of `element`
    ///
    /// `global_dofs` are the element's global DOF values, already multiplied by any
    /// visualization scale.
    fn apply(
        &self,
        element: &Element,
        global_dofs: &Vec12,
        samples: usize,
    ) -> FrameResult<DeformedShape> {
        if samples < 2 {
            return Err(FrameError::InvalidInput(format!(
                "deformed shape needs at least 2 samples, got {samples}"
            )));
        }

        let local = element.gamma() * global_dofs;
        let r_t = element.rotation().transpose();
        let origin = element.i_node().position();
        let span = element.j_node().position() - origin;
        let length = element.length();

        let start = origin + global_dofs.fixed_rows::<3>(0);
        let end = origin + span + global_dofs.fixed_rows::<3>(6);

        let mut points: Vec<[f64; 3]> = Vec::with_capacity(samples);
        let mut twist = Vec::with_capacity(samples);
        for k in 0..samples {
            let t = k as f64 / (samples - 1) as f64;
            let d = self.evaluate(length, &local, t);
            let offset = r_t * Vec3::new(d.u, d.v, d.w);
            points.push((origin + span * t + offset).into());
            twist.push(d.twist);
        }

        // End samples coincide with the deformed nodes
        points[0] = start.into();
        points[samples - 1] = end.into();

        Ok(DeformedShape {
            element: element.id(),
            points,
            twist,
            start: start.into(),
            end: end.into(),
        })
    }
}

/// Linear basis [1 - t, t]
pub fn linear_basis(t: f64) -> [f64; 2] {
    [1.0 - t, t]
}

/// Cubic Hermite basis for an element of length `l`
///
/// Order: end-1 value, end-1 slope, end-2 value, end-2 slope.
pub fn hermite_basis(t: f64, l: f64) -> [f64; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        1.0 - 3.0 * t2 + 2.0 * t3,
        l * (t - 2.0 * t2 + t3),
        3.0 * t2 - 2.0 * t3,
        l * (t3 - t2),
    ]
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let [n1, n2] = linear_basis(t);
    n1 * a + n2 * b
}

/// All components interpolated linearly between the element ends
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearShapeFunctions;

impl ShapeFunctions for LinearShapeFunctions {
    fn evaluate(&self, _length: f64, local: &Vec12, t: f64) -> LocalDeflection {
        LocalDeflection {
            u: lerp(local[0], local[6], t),
            v: lerp(local[1], local[7], t),
            w: lerp(local[2], local[8], t),
            twist: lerp(local[3], local[9], t),
        }
    }
}

/// Axial and twist linear, bending in each plane as a cubic Hermite curve
///
/// Slopes follow the right-hand rule: dv/dx = θz and dw/dx = -θy.
#[derive(Debug, Clone, Copy, Default)]
pub struct HermiteShapeFunctions;

impl ShapeFunctions for HermiteShapeFunctions {
    fn evaluate(&self, length: f64, local: &Vec12, t: f64) -> LocalDeflection {
        let [n1, n2, n3, n4] = hermite_basis(t, length);
        LocalDeflection {
            u: lerp(local[0], local[6], t),
            v: n1 * local[1] + n2 * local[5] + n3 * local[7] + n4 * local[11],
            w: n1 * local[2] - n2 * local[4] + n3 * local[8] - n4 * local[10],
            twist: lerp(local[3], local[9], t),
        }
    }
}
