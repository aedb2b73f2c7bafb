//! Mathematical utilities for frame calculations

use nalgebra::{DMatrix, DVector, Matrix3, SMatrix, SVector, Vector3};

pub type Mat = DMatrix<f64>;
pub type Vec = DVector<f64>;
pub type Mat3 = Matrix3<f64>;
pub type Vec3 = Vector3<f64>;

/// 12x12 matrix for element stiffness and transformation
pub type Mat12 = SMatrix<f64, 12, 12>;
/// 12-element vector for element end forces/displacements
pub type Vec12 = SVector<f64, 12>;

/// Cross products shorter than this are treated as parallel vectors
const PARALLEL_TOLERANCE: f64 = 1e-9;

/// Relative Cholesky pivots below `1 / SINGULAR_PIVOT_RATIO` mean a rigid-body mode survived
pub const SINGULAR_PIVOT_RATIO: f64 = 1e12;

/// Reference direction for the local z-axis when the element carries none.
///
/// Global Z is used unless the element runs along Z, in which case global Y is used.
pub fn default_reference(axis: &Vec3) -> Vec3 {
    let global_z = Vec3::z();
    if axis.cross(&global_z).norm() < 1e-6 {
        Vec3::y()
    } else {
        global_z
    }
}

/// Build the 3x3 direction cosine matrix of an element
///
/// # Arguments
/// * `axis` - Unit vector from the i-node to the j-node (local x)
/// * `reference` - Vector the local z-axis should lean towards
///
/// # Returns
/// Matrix whose rows are the local x, y and z axes in global components, or `None`
/// when the reference is zero or parallel to the axis.
pub fn direction_cosines(axis: &Vec3, reference: &Vec3) -> Option<Mat3> {
    let ref_norm = reference.norm();
    if !ref_norm.is_finite() || ref_norm < PARALLEL_TOLERANCE {
        return None;
    }
    let reference = reference / ref_norm;

    // y = ref x x, z = x x y keeps the basis right-handed with z on the reference side
    let y_unnorm = reference.cross(axis);
    let y_len = y_unnorm.norm();
    if y_len < PARALLEL_TOLERANCE {
        return None;
    }
    let y = y_unnorm / y_len;
    let z = axis.cross(&y);

    #[rustfmt::skip]
    let r = Mat3::new(
        axis[0], axis[1], axis[2],
        y[0],    y[1],    y[2],
        z[0],    z[1],    z[2],
    );
    Some(r)
}

/// Expand a direction cosine matrix into the 12x12 element transformation matrix
///
/// The same rotation applies to translations and rotations at both ends.
pub fn member_transformation_matrix(r: &Mat3) -> Mat12 {
    let mut t = Mat12::zeros();
    for block in 0..4 {
        t.fixed_view_mut::<3, 3>(block * 3, block * 3).copy_from(r);
    }
    t
}

/// Compute the local stiffness matrix for a 3D frame element
///
/// # Arguments
/// * `e` - Modulus of elasticity
/// * `g` - Shear modulus
/// * `a` - Cross-sectional area
/// * `iy` - Moment of inertia about local y-axis
/// * `iz` - Moment of inertia about local z-axis
/// * `j` - Torsional constant
/// * `length` - Element length
///
/// # Returns
/// 12x12 local stiffness matrix, DOFs ordered
/// [u, v, w, θx, θy, θz] at the i-node followed by the j-node
pub fn member_local_stiffness(
    e: f64,
    g: f64,
    a: f64,
    iy: f64,
    iz: f64,
    j: f64,
    length: f64,
) -> Mat12 {
    let l = length;
    let l2 = l * l;
    let l3 = l2 * l;

    let ea_l = e * a / l;
    let gj_l = g * j / l;

    let eiy_l3 = e * iy / l3;
    let eiy_l2 = e * iy / l2;
    let eiy_l = e * iy / l;

    let eiz_l3 = e * iz / l3;
    let eiz_l2 = e * iz / l2;
    let eiz_l = e * iz / l;

    #[rustfmt::skip]
    let data = [
        // Row 0: axial at i
        ea_l,      0.0,          0.0,           0.0,    0.0,           0.0,          -ea_l,     0.0,          0.0,           0.0,    0.0,           0.0,
        // Row 1: shear Fy at i
        0.0,       12.0*eiz_l3,  0.0,           0.0,    0.0,           6.0*eiz_l2,   0.0,       -12.0*eiz_l3, 0.0,           0.0,    0.0,           6.0*eiz_l2,
        // Row 2: shear Fz at i
        0.0,       0.0,          12.0*eiy_l3,   0.0,    -6.0*eiy_l2,   0.0,          0.0,       0.0,          -12.0*eiy_l3,  0.0,    -6.0*eiy_l2,   0.0,
        // Row 3: torsion at i
        0.0,       0.0,          0.0,           gj_l,   0.0,           0.0,          0.0,       0.0,          0.0,           -gj_l,  0.0,           0.0,
        // Row 4: moment My at i
        0.0,       0.0,          -6.0*eiy_l2,   0.0,    4.0*eiy_l,     0.0,          0.0,       0.0,          6.0*eiy_l2,    0.0,    2.0*eiy_l,     0.0,
        // Row 5: moment Mz at i
        0.0,       6.0*eiz_l2,   0.0,           0.0,    0.0,           4.0*eiz_l,    0.0,       -6.0*eiz_l2,  0.0,           0.0,    0.0,           2.0*eiz_l,
        // Row 6: axial at j
        -ea_l,     0.0,          0.0,           0.0,    0.0,           0.0,          ea_l,      0.0,          0.0,           0.0,    0.0,           0.0,
        // Row 7: shear Fy at j
        0.0,       -12.0*eiz_l3, 0.0,           0.0,    0.0,           -6.0*eiz_l2,  0.0,       12.0*eiz_l3,  0.0,           0.0,    0.0,           -6.0*eiz_l2,
        // Row 8: shear Fz at j
        0.0,       0.0,          -12.0*eiy_l3,  0.0,    6.0*eiy_l2,    0.0,          0.0,       0.0,          12.0*eiy_l3,   0.0,    6.0*eiy_l2,    0.0,
        // Row 9: torsion at j
        0.0,       0.0,          0.0,           -gj_l,  0.0,           0.0,          0.0,       0.0,          0.0,           gj_l,   0.0,           0.0,
        // Row 10: moment My at j
        0.0,       0.0,          -6.0*eiy_l2,   0.0,    2.0*eiy_l,     0.0,          0.0,       0.0,          6.0*eiy_l2,    0.0,    4.0*eiy_l,     0.0,
        // Row 11: moment Mz at j
        0.0,       -6.0*eiz_l2,  0.0,           0.0,    0.0,           2.0*eiz_l,    0.0,       6.0*eiz_l2,   0.0,           0.0,    0.0,           4.0*eiz_l,
    ];

    Mat12::from_row_slice(&data)
}

/// Outcome of a symmetric positive-definite solve
#[derive(Debug, Clone)]
pub struct SpdSolution {
    /// Solution vector
    pub x: Vec,
    /// Largest ratio of an original diagonal entry to its Cholesky pivot
    pub pivot_ratio: f64,
    /// Row with the largest pivot ratio
    pub weakest: usize,
}

/// Solve a symmetric positive-definite system using Cholesky decomposition
///
/// Returns `Err(row)` with the most suspicious row when the matrix is not
/// numerically positive definite.
pub fn solve_cholesky(a: Mat, b: &Vec) -> Result<SpdSolution, usize> {
    let n = a.nrows();
    if n == 0 {
        return Ok(SpdSolution {
            x: Vec::zeros(0),
            pivot_ratio: 1.0,
            weakest: 0,
        });
    }

    let diagonal = a.diagonal();
    let chol = match a.cholesky() {
        Some(chol) => chol,
        None => return Err(smallest_entry(&diagonal)),
    };

    let l = chol.l_dirty();
    let mut pivot_ratio = 1.0_f64;
    let mut weakest = 0;
    for i in 0..n {
        let pivot = l[(i, i)] * l[(i, i)];
        let ratio = if pivot > 0.0 { diagonal[i] / pivot } else { f64::INFINITY };
        if ratio > pivot_ratio {
            pivot_ratio = ratio;
            weakest = i;
        }
    }

    if !(pivot_ratio < SINGULAR_PIVOT_RATIO) {
        return Err(weakest);
    }

    let x = chol.solve(b);
    if x.iter().any(|v| !v.is_finite()) {
        return Err(weakest);
    }

    Ok(SpdSolution {
        x,
        pivot_ratio,
        weakest,
    })
}

/// Split a small symmetric positive semi-definite block into stiff and zero-stiffness
/// directions
///
/// Returns `(stiff, null)` with unit directions as columns. A direction is null when its
/// eigenvalue is at most `tolerance`.
pub fn split_null_space(block: Mat, tolerance: f64) -> (Mat, Mat) {
    let eigen = block.symmetric_eigen();
    let (null, stiff): (std::vec::Vec<usize>, std::vec::Vec<usize>) =
        (0..eigen.eigenvalues.len()).partition(|&i| eigen.eigenvalues[i] <= tolerance);
    (
        eigen.eigenvectors.select_columns(&stiff),
        eigen.eigenvectors.select_columns(&null),
    )
}

fn smallest_entry(values: &Vec) -> usize {
    values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_direction_cosines_along_x() {
        let r = direction_cosines(&Vec3::x(), &default_reference(&Vec3::x())).unwrap();
        assert_relative_eq!(r, Mat3::identity(), epsilon = 1e-12);
    }

    #[test]
    fn test_direction_cosines_vertical_falls_back_to_y() {
        let axis = Vec3::z();
        let reference = default_reference(&axis);
        assert_eq!(reference, Vec3::y());

        let r = direction_cosines(&axis, &reference).unwrap();
        // local y = Y x Z = X, local z = Z x X = Y
        assert_relative_eq!(r.row(1).transpose(), Vec3::x(), epsilon = 1e-12);
        assert_relative_eq!(r.row(2).transpose(), Vec3::y(), epsilon = 1e-12);
    }

    #[test]
    fn test_direction_cosines_is_rotation() {
        let axis = Vec3::new(1.0, 2.0, -0.5).normalize();
        let r = direction_cosines(&axis, &Vec3::new(0.3, -1.0, 2.0)).unwrap();
        assert_relative_eq!(r * r.transpose(), Mat3::identity(), epsilon = 1e-12);
        assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_direction_cosines_rejects_parallel_reference() {
        let axis = Vec3::new(0.0, 1.0, 0.0);
        assert!(direction_cosines(&axis, &Vec3::new(0.0, -3.0, 0.0)).is_none());
        assert!(direction_cosines(&axis, &Vec3::zeros()).is_none());
    }

    #[test]
    fn test_transformation_is_block_diagonal() {
        let axis = Vec3::new(3.0, 4.0, 0.0).normalize();
        let r = direction_cosines(&axis, &Vec3::z()).unwrap();
        let t = member_transformation_matrix(&r);
        for block in 0..4 {
            let view = t.fixed_view::<3, 3>(block * 3, block * 3);
            assert_relative_eq!(view.into_owned(), r, epsilon = 1e-15);
        }
        assert_eq!(t[(0, 3)], 0.0);
        assert_relative_eq!(t * t.transpose(), Mat12::identity(), epsilon = 1e-12);
    }

    #[test]
    fn test_local_stiffness_symmetry() {
        let k = member_local_stiffness(200e9, 77e9, 0.01, 1e-4, 2e-4, 1e-5, 10.0);

        for i in 0..12 {
            for j in 0..12 {
                assert_relative_eq!(k[(i, j)], k[(j, i)], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_solve_cholesky() {
        let a = Mat::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
        let b = Vec::from_vec(vec![1.0, 2.0]);
        let sol = solve_cholesky(a, &b).unwrap();
        assert_relative_eq!(sol.x[0], 1.0 / 11.0, epsilon = 1e-12);
        assert_relative_eq!(sol.x[1], 7.0 / 11.0, epsilon = 1e-12);
        assert!(sol.pivot_ratio < 2.0);
    }

    #[test]
    fn test_solve_cholesky_rejects_singular() {
        let a = Mat::from_row_slice(2, 2, &[1.0, -1.0, -1.0, 1.0]);
        let b = Vec::from_vec(vec![1.0, 0.0]);
        assert!(solve_cholesky(a, &b).is_err());
    }

    #[test]
    fn test_split_null_space_finds_inclined_direction() {
        // Axial stiffness of two bars spanning a plane whose normal mixes all three axes
        let normal = Vec3::new(1.0, 2.0, 2.0) / 3.0;
        let a = Vec3::new(2.0, -2.0, 1.0) / 3.0;
        let b = normal.cross(&a);
        let block = a * a.transpose() * 40.0 + b * b.transpose() * 25.0 + a * b.transpose() * 5.0
            + b * a.transpose() * 5.0;
        let block = Mat::from_fn(3, 3, |r, c| block[(r, c)]);

        let (stiff, null) = split_null_space(block, 1e-9);
        assert_eq!(stiff.ncols(), 2);
        assert_eq!(null.ncols(), 1);
        let v = Vec3::new(null[(0, 0)], null[(1, 0)], null[(2, 0)]);
        assert_relative_eq!(v.dot(&normal).abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_split_null_space_full_rank() {
        let block = Mat::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
        let (stiff, null) = split_null_space(block, 1e-9);
        assert_eq!(stiff.ncols(), 2);
        assert_eq!(null.ncols(), 0);
    }
}
