//! Coordinate geometry: centroids, in-place RMSD, plane fitting.

use strucdev_core::{Result, StrucdevError};

use crate::linalg::{smallest_eigenvector, Matrix3x3};
use crate::types::Point3D;

use alloc::{format, vec::Vec};

/// Geometric center of mass (unweighted) of a slice of points.
pub fn center_of_mass_points(points: &[Point3D]) -> Point3D {
    if points.is_empty() {
        return Point3D::zero();
    }
    let mut sum = Point3D::zero();
    for p in points {
        sum = sum.add(p);
    }
    sum.scale(1.0 / points.len() as f64)
}

/// RMSD between two equal-length slices of points (no alignment, direct comparison).
pub fn rmsd_points(points1: &[Point3D], points2: &[Point3D]) -> Result<f64> {
    if points1.len() != points2.len() {
        return Err(StrucdevError::ShapeMismatch {
            left: points1.len(),
            right: points2.len(),
        });
    }
    if points1.is_empty() {
        return Err(StrucdevError::InvalidInput(
            "cannot compute RMSD of empty point sets".into(),
        ));
    }
    let sum: f64 = points1
        .iter()
        .zip(points2.iter())
        .map(|(a, b)| {
            let d = a.sub(b);
            d.dot(&d)
        })
        .sum();
    Ok((sum / points1.len() as f64).sqrt())
}

/// Least-squares plane through a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Plane {
    pub centroid: Point3D,
    /// Unit normal; its sign is arbitrary.
    pub normal: Point3D,
}

/// Fit a plane through `points`.
///
/// The normal is the eigenvector of the smallest eigenvalue of the scatter
/// matrix of the centered coordinates.
///
/// # Errors
///
/// Returns [`StrucdevError::Degenerate`] for fewer than 3 points or when the
/// points are collinear, since the plane is then undefined.
pub fn fit_plane(points: &[Point3D]) -> Result<Plane> {
    if points.len() < 3 {
        return Err(StrucdevError::Degenerate(format!(
            "need at least 3 points to fit a plane, got {}",
            points.len()
        )));
    }
    let centroid = center_of_mass_points(points);
    let centered: Vec<Point3D> = points.iter().map(|p| p.sub(&centroid)).collect();
    let scatter = Matrix3x3::outer_sum(&centered, &centered);

    // Rank <= 1 (coincident or collinear points) zeroes every principal
    // 2x2 minor, i.e. the sum of pairwise eigenvalue products.
    let trace = scatter.trace();
    let minors = scatter.principal_minor_sum();
    if trace <= f64::EPSILON || minors <= 1e-10 * trace * trace {
        return Err(StrucdevError::Degenerate(
            "points are coincident or collinear; plane is undefined".into(),
        ));
    }
    let (normal, _) = smallest_eigenvector(&scatter);
    Ok(Plane { centroid, normal })
}

/// Angle between two planes in degrees, folded into `[0, 90]`.
pub fn interplanar_angle(a: &Plane, b: &Plane) -> f64 {
    let cos = a.normal.dot(&b.normal).abs();
    cos.clamp(0.0, 1.0).acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    fn hexagon(center: Point3D, radius: f64) -> Vec<Point3D> {
        (0..6)
            .map(|k| {
                let a = k as f64 * core::f64::consts::PI / 3.0;
                center.add(&Point3D::new(radius * a.cos(), radius * a.sin(), 0.0))
            })
            .collect()
    }

    #[test]
    fn test_center_of_mass() {
        let points = vec![
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(2.0, 0.0, 0.0),
            Point3D::new(0.0, 2.0, 0.0),
        ];
        let com = center_of_mass_points(&points);
        assert!((com.x - 2.0 / 3.0).abs() < 1e-10);
        assert!((com.y - 2.0 / 3.0).abs() < 1e-10);
        assert!((com.z).abs() < 1e-10);
    }

    #[test]
    fn test_rmsd_identical() {
        let points = vec![
            Point3D::new(1.0, 0.0, 0.0),
            Point3D::new(0.0, 1.0, 0.0),
            Point3D::new(0.0, 0.0, 1.0),
        ];
        assert!((rmsd_points(&points, &points).unwrap()).abs() < 1e-10);
    }

    #[test]
    fn test_rmsd_mismatch_error() {
        let p1 = vec![Point3D::new(0.0, 0.0, 0.0)];
        let p2 = vec![Point3D::new(0.0, 0.0, 0.0), Point3D::new(1.0, 0.0, 0.0)];
        assert!(matches!(
            rmsd_points(&p1, &p2),
            Err(StrucdevError::ShapeMismatch { left: 1, right: 2 })
        ));
    }

    #[test]
    fn test_fit_plane_of_ring() {
        let plane = fit_plane(&hexagon(Point3D::new(1.0, 2.0, 3.0), 1.4)).unwrap();
        assert!(plane.centroid.distance_to(&Point3D::new(1.0, 2.0, 3.0)) < 1e-10);
        assert!((plane.normal.z.abs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_interplanar_angles() {
        let flat = fit_plane(&hexagon(Point3D::zero(), 1.4)).unwrap();
        let stacked = fit_plane(&hexagon(Point3D::new(0.0, 0.0, 3.5), 1.4)).unwrap();
        assert!(interplanar_angle(&flat, &stacked) < 1e-6);

        let upright: Vec<Point3D> = hexagon(Point3D::zero(), 1.4)
            .iter()
            .map(|p| Point3D::new(p.x, 0.0, p.y))
            .collect();
        let upright = fit_plane(&upright).unwrap();
        assert!((interplanar_angle(&flat, &upright) - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_fit_plane_rejects_collinear() {
        let line: Vec<Point3D> = (0..4).map(|i| Point3D::new(i as f64, i as f64, 0.0)).collect();
        assert!(matches!(fit_plane(&line), Err(StrucdevError::Degenerate(_))));
        assert!(fit_plane(&line[..2]).is_err());
    }
}
