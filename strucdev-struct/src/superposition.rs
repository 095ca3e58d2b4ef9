//! Structural superposition via the Kabsch algorithm.
//!
//! Finds the optimal rigid-body rotation (and translation) that minimizes RMSD
//! between two sets of corresponding points.

use strucdev_core::{Result, StrucdevError};

use crate::geometry::{center_of_mass_points, rmsd_points};
use crate::linalg::{svd_3x3, Matrix3x3};
use crate::types::{Point3D, PointSet};

use alloc::format;
use alloc::vec::Vec;

/// Ratio between the second and first singular value of the covariance
/// matrix below which the rotation is considered undefined.
const RANK_TOLERANCE: f64 = 1e-6;

/// Result of a Kabsch superposition.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SuperpositionResult {
    /// RMSD after optimal superposition.
    pub rmsd: f64,
    /// 3x3 proper rotation matrix (row-major), applied as `R * p`.
    pub rotation: [[f64; 3]; 3],
    /// Translation vector applied after rotation.
    pub translation: Point3D,
    /// Coordinates of the mobile set after superposition onto the target.
    pub transformed_coords: Vec<Point3D>,
}

/// Kabsch superposition of `mobile` onto `target`.
///
/// Both sets are centered on their own centroids, `H = Pᵗ·Q` is decomposed as
/// `U·S·Vᵗ`, and `R = U·Vᵗ` is corrected to a proper rotation when its
/// determinant is negative.
///
/// # Errors
///
/// - [`StrucdevError::ShapeMismatch`] if the sets differ in length.
/// - [`StrucdevError::Degenerate`] for fewer than 3 points, or when either
///   set is collinear or collapsed to a point.
pub fn kabsch_points(mobile: &[Point3D], target: &[Point3D]) -> Result<SuperpositionResult> {
    if mobile.len() != target.len() {
        return Err(StrucdevError::ShapeMismatch {
            left: mobile.len(),
            right: target.len(),
        });
    }
    if mobile.len() < 3 {
        return Err(StrucdevError::Degenerate(format!(
            "need at least 3 points for Kabsch superposition, got {}",
            mobile.len()
        )));
    }

    // Step 1: center both sets
    let com_p = center_of_mass_points(mobile);
    let com_q = center_of_mass_points(target);

    let centered_p: Vec<Point3D> = mobile.iter().map(|p| p.sub(&com_p)).collect();
    let centered_q: Vec<Point3D> = target.iter().map(|q| q.sub(&com_q)).collect();

    // Step 2: cross-covariance H = P^T * Q
    let h = Matrix3x3::outer_sum(&centered_p, &centered_q);

    // Step 3: SVD of H
    let svd = svd_3x3(&h);
    if svd.s[0] <= f64::EPSILON || svd.s[1] <= RANK_TOLERANCE * svd.s[0] {
        return Err(StrucdevError::Degenerate(format!(
            "covariance matrix has rank < 2 (singular values {:.3e}, {:.3e}, {:.3e}); \
             points are coincident or collinear",
            svd.s[0], svd.s[1], svd.s[2]
        )));
    }

    let u = svd.u;

    // Step 4: R = U * Vt
    let mut vt = svd.vt;
    let mut r = u.multiply(&vt);

    // Step 5: reflection fix, negate the last row of Vt
    if r.determinant() < 0.0 {
        for col in 0..3 {
            vt.data[2][col] = -vt.data[2][col];
        }
        r = u.multiply(&vt);
    }

    // Row vectors rotate as p * R, i.e. column vectors as R^T * p.
    let rotation = r.transpose();

    // Step 6: apply rotation, compute RMSD on centered coordinates
    let rotated: Vec<Point3D> = centered_p.iter().map(|p| rotation.apply(p)).collect();
    let rmsd = rmsd_points(&rotated, &centered_q)?;

    let transformed_coords: Vec<Point3D> = rotated.iter().map(|p| p.add(&com_q)).collect();

    Ok(SuperpositionResult {
        rmsd,
        rotation: rotation.data,
        translation: com_q.sub(&rotation.apply(&com_p)),
        transformed_coords,
    })
}

/// Kabsch RMSD between two labelled point sets.
pub fn superposed_rmsd(mobile: &PointSet, target: &PointSet) -> Result<f64> {
    kabsch_points(&mobile.points, &target.points).map(|r| r.rmsd)
}

/// RMSD between two point sets already sharing a frame (no fitting).
pub fn in_place_rmsd(mobile: &PointSet, target: &PointSet) -> Result<f64> {
    rmsd_points(&mobile.points, &target.points)
}
