//! Private 3x3 linear algebra for superposition and ring-plane fitting.
//!
//! Cyclic Jacobi diagonalisation of symmetric matrices, and an SVD built on
//! top of it. Small enough that pulling in a linear algebra crate is not
//! worth it.

use crate::types::Point3D;

/// A 3x3 matrix stored in row-major order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Matrix3x3 {
    pub data: [[f64; 3]; 3],
}

impl Matrix3x3 {
    pub fn zeros() -> Self {
        Self {
            data: [[0.0; 3]; 3],
        }
    }

    pub fn identity() -> Self {
        let mut m = Self::zeros();
        for i in 0..3 {
            m.data[i][i] = 1.0;
        }
        m
    }

    /// Sum of outer products `a_k * b_k^T` over paired points.
    ///
    /// With centered inputs this is the cross-covariance `A^T B` used by
    /// Kabsch, and with `a == b` the scatter matrix of a point cloud.
    pub fn outer_sum(a: &[Point3D], b: &[Point3D]) -> Self {
        let mut m = Self::zeros();
        for (p, q) in a.iter().zip(b) {
            let pv = [p.x, p.y, p.z];
            let qv = [q.x, q.y, q.z];
            for (row, pi) in m.data.iter_mut().zip(pv) {
                for (cell, qj) in row.iter_mut().zip(qv) {
                    *cell += pi * qj;
                }
            }
        }
        m
    }

    pub fn multiply(&self, other: &Matrix3x3) -> Matrix3x3 {
        let mut out = Matrix3x3::zeros();
        for i in 0..3 {
            for j in 0..3 {
                out.data[i][j] = (0..3).map(|k| self.data[i][k] * other.data[k][j]).sum();
            }
        }
        out
    }

    pub fn transpose(&self) -> Matrix3x3 {
        let mut out = Matrix3x3::zeros();
        for i in 0..3 {
            for j in 0..3 {
                out.data[i][j] = self.data[j][i];
            }
        }
        out
    }

    pub fn determinant(&self) -> f64 {
        self.column(0).dot(&self.column(1).cross(&self.column(2)))
    }

    pub fn trace(&self) -> f64 {
        self.data[0][0] + self.data[1][1] + self.data[2][2]
    }

    /// Sum of the principal 2x2 minors, i.e. of pairwise eigenvalue products.
    pub fn principal_minor_sum(&self) -> f64 {
        let d = &self.data;
        (d[0][0] * d[1][1] - d[0][1] * d[1][0])
            + (d[0][0] * d[2][2] - d[0][2] * d[2][0])
            + (d[1][1] * d[2][2] - d[1][2] * d[2][1])
    }

    pub fn column(&self, j: usize) -> Point3D {
        Point3D::new(self.data[0][j], self.data[1][j], self.data[2][j])
    }

    pub fn set_column(&mut self, j: usize, p: &Point3D) {
        self.data[0][j] = p.x;
        self.data[1][j] = p.y;
        self.data[2][j] = p.z;
    }

    /// `M * p` for a column vector `p`.
    pub fn apply(&self, p: &Point3D) -> Point3D {
        let row = |r: &[f64; 3]| r[0] * p.x + r[1] * p.y + r[2] * p.z;
        Point3D::new(row(&self.data[0]), row(&self.data[1]), row(&self.data[2]))
    }
}

/// Eigen-decomposition of a symmetric matrix, sorted by descending value.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SymmetricEigen {
    /// Unit eigenvectors as columns, in the order of `values`.
    pub vectors: Matrix3x3,
    pub values: [f64; 3],
}

/// `A = U * diag(s) * Vt`, singular values descending.
///
/// The third column of `U` is built as `±(u0 x u1)` rather than `A v2 / s2`,
/// so `U` stays orthonormal when the smallest singular value is (numerically)
/// zero, as for planar point sets.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SVD3x3 {
    pub u: Matrix3x3,
    pub s: [f64; 3],
    pub vt: Matrix3x3,
}

const MAX_SWEEPS: usize = 50;

/// Diagonalise a symmetric matrix with cyclic Jacobi rotations.
pub(crate) fn symmetric_eigen(matrix: &Matrix3x3) -> SymmetricEigen {
    let mut a = *matrix;
    let mut v = Matrix3x3::identity();
    let scale: f64 = a.data.iter().flatten().map(|x| x * x).sum::<f64>().sqrt();

    for _ in 0..MAX_SWEEPS {
        let off = (a.data[0][1].powi(2) + a.data[0][2].powi(2) + a.data[1][2].powi(2)).sqrt();
        if off <= f64::EPSILON * scale {
            break;
        }
        for (p, q) in [(0, 1), (0, 2), (1, 2)] {
            if a.data[p][q] != 0.0 {
                jacobi_rotate(&mut a, &mut v, p, q);
            }
        }
    }

    let mut order = [0usize, 1, 2];
    order.sort_by(|&i, &j| a.data[j][j].total_cmp(&a.data[i][i]));
    let mut vectors = Matrix3x3::zeros();
    let mut values = [0.0; 3];
    for (dst, &src) in order.iter().enumerate() {
        values[dst] = a.data[src][src];
        vectors.set_column(dst, &v.column(src));
    }
    SymmetricEigen { vectors, values }
}

/// Zero `a[p][q]` by rotating rows/columns `p` and `q`; accumulate into `v`.
fn jacobi_rotate(a: &mut Matrix3x3, v: &mut Matrix3x3, p: usize, q: usize) {
    let (app, aqq, apq) = (a.data[p][p], a.data[q][q], a.data[p][q]);
    let theta = 0.5 * (2.0 * apq).atan2(app - aqq);
    let (s, c) = theta.sin_cos();

    let r = 3 - p - q;
    let (arp, arq) = (a.data[r][p], a.data[r][q]);
    a.data[r][p] = c * arp + s * arq;
    a.data[p][r] = a.data[r][p];
    a.data[r][q] = c * arq - s * arp;
    a.data[q][r] = a.data[r][q];

    a.data[p][p] = c * c * app + 2.0 * c * s * apq + s * s * aqq;
    a.data[q][q] = s * s * app - 2.0 * c * s * apq + c * c * aqq;
    a.data[p][q] = 0.0;
    a.data[q][p] = 0.0;

    for row in v.data.iter_mut() {
        let (vp, vq) = (row[p], row[q]);
        row[p] = c * vp + s * vq;
        row[q] = c * vq - s * vp;
    }
}

/// Unit eigenvector of the smallest eigenvalue of a symmetric matrix.
pub(crate) fn smallest_eigenvector(matrix: &Matrix3x3) -> (Point3D, f64) {
    let eig = symmetric_eigen(matrix);
    (eig.vectors.column(2).normalize(), eig.values[2])
}

/// SVD via the eigen-decomposition of `A^T A`; `U = A V S^-1`.
pub(crate) fn svd_3x3(matrix: &Matrix3x3) -> SVD3x3 {
    let eig = symmetric_eigen(&matrix.transpose().multiply(matrix));
    let v = eig.vectors;
    let s = eig.values.map(|x| x.max(0.0).sqrt());

    let u0 = if s[0] > 0.0 {
        matrix.apply(&v.column(0)).scale(1.0 / s[0])
    } else {
        Point3D::new(1.0, 0.0, 0.0)
    };
    let u1 = if s[1] > f64::EPSILON * s[0] {
        let raw = matrix.apply(&v.column(1)).scale(1.0 / s[1]);
        raw.sub(&u0.scale(raw.dot(&u0))).normalize()
    } else {
        any_orthogonal(&u0)
    };
    let mut u2 = u0.cross(&u1).normalize();
    if matrix.apply(&v.column(2)).dot(&u2) < 0.0 {
        u2 = u2.scale(-1.0);
    }

    let mut u = Matrix3x3::zeros();
    u.set_column(0, &u0);
    u.set_column(1, &u1);
    u.set_column(2, &u2);
    SVD3x3 {
        u,
        s,
        vt: v.transpose(),
    }
}

/// Some unit vector orthogonal to `n`.
fn any_orthogonal(n: &Point3D) -> Point3D {
    let axis = if n.x.abs() < 0.9 {
        Point3D::new(1.0, 0.0, 0.0)
    } else {
        Point3D::new(0.0, 1.0, 0.0)
    };
    n.cross(&axis).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(svd: &SVD3x3) -> Matrix3x3 {
        let mut m = Matrix3x3::zeros();
        for i in 0..3 {
            for j in 0..3 {
                m.data[i][j] = (0..3)
                    .map(|k| svd.u.data[i][k] * svd.s[k] * svd.vt.data[k][j])
                    .sum();
            }
        }
        m
    }

    fn assert_close(a: &Matrix3x3, b: &Matrix3x3, tol: f64) {
        for i in 0..3 {
            for j in 0..3 {
                assert!(
                    (a.data[i][j] - b.data[i][j]).abs() < tol,
                    "mismatch at [{i}][{j}]: {} vs {}",
                    a.data[i][j],
                    b.data[i][j]
                );
            }
        }
    }

    #[test]
    fn multiply_by_identity() {
        let a = Matrix3x3 {
            data: [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]],
        };
        assert_close(&a.multiply(&Matrix3x3::identity()), &a, 1e-12);
        assert!((a.transpose().data[0][1] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn determinant_and_minors() {
        let a = Matrix3x3 {
            data: [[1.0, 2.0, 3.0], [0.0, 1.0, 4.0], [5.0, 6.0, 0.0]],
        };
        assert!((a.determinant() - 1.0).abs() < 1e-10);
        let d = Matrix3x3 {
            data: [[2.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 5.0]],
        };
        assert!((d.trace() - 10.0).abs() < 1e-12);
        assert!((d.principal_minor_sum() - 31.0).abs() < 1e-12);
    }

    #[test]
    fn outer_sum_is_scatter_matrix() {
        let pts = [Point3D::new(1.0, 0.0, 0.0), Point3D::new(-1.0, 2.0, 0.0)];
        let m = Matrix3x3::outer_sum(&pts, &pts);
        assert!((m.data[0][0] - 2.0).abs() < 1e-12);
        assert!((m.data[0][1] + 2.0).abs() < 1e-12);
        assert!((m.data[1][1] - 4.0).abs() < 1e-12);
        assert!(m.data[2][2].abs() < 1e-12);
    }

    #[test]
    fn eigen_of_symmetric_matrix() {
        let m = Matrix3x3 {
            data: [[2.0, 1.0, 0.0], [1.0, 2.0, 0.0], [0.0, 0.0, 5.0]],
        };
        let eig = symmetric_eigen(&m);
        assert!((eig.values[0] - 5.0).abs() < 1e-10);
        assert!((eig.values[1] - 3.0).abs() < 1e-10);
        assert!((eig.values[2] - 1.0).abs() < 1e-10);
        for k in 0..3 {
            let v = eig.vectors.column(k);
            let mv = m.apply(&v);
            assert!(mv.sub(&v.scale(eig.values[k])).norm() < 1e-9);
        }
    }

    #[test]
    fn smallest_eigenvector_of_diagonal() {
        let m = Matrix3x3 {
            data: [[4.0, 0.0, 0.0], [0.0, 0.5, 0.0], [0.0, 0.0, 2.0]],
        };
        let (v, value) = smallest_eigenvector(&m);
        assert!((value - 0.5).abs() < 1e-12);
        assert!((v.y.abs() - 1.0).abs() < 1e-12);
        assert!(v.x.abs() < 1e-12 && v.z.abs() < 1e-12);
    }

    #[test]
    fn svd_of_rotation() {
        let (s, c) = 0.5f64.sin_cos();
        let rot = Matrix3x3 {
            data: [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]],
        };
        let svd = svd_3x3(&rot);
        for sv in svd.s {
            assert!((sv - 1.0).abs() < 1e-9, "singular value {} should be ~1", sv);
        }
        assert_close(&reconstruct(&svd), &rot, 1e-9);
    }

    #[test]
    fn svd_sorted_and_reconstructs_general_matrix() {
        let a = Matrix3x3 {
            data: [[3.0, 1.0, -2.0], [0.5, 4.0, 1.0], [-1.0, 2.0, 2.5]],
        };
        let svd = svd_3x3(&a);
        assert!(svd.s[0] >= svd.s[1] && svd.s[1] >= svd.s[2]);
        assert_close(&reconstruct(&svd), &a, 1e-9);
        let utu = svd.u.transpose().multiply(&svd.u);
        assert_close(&utu, &Matrix3x3::identity(), 1e-9);
    }

    #[test]
    fn svd_of_rank_two_matrix_keeps_u_orthonormal() {
        // Planar cross-covariance: third singular value is zero.
        let a = Matrix3x3 {
            data: [[2.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]],
        };
        let svd = svd_3x3(&a);
        assert!(svd.s[2].abs() < 1e-12);
        let utu = svd.u.transpose().multiply(&svd.u);
        assert_close(&utu, &Matrix3x3::identity(), 1e-12);
        assert_close(&reconstruct(&svd), &a, 1e-9);
    }
}
