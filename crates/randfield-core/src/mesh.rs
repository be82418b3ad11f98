//! Coordinate sets and regular-grid mesh construction.
//! All coordinates are in metres, stored row-major as f64.

use nalgebra::DMatrix;

use crate::error::{FieldError, Result};

/// An ordered set of N points of equal dimension (2 or 3).
/// Samples produced downstream are indexed positionally against this order.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinates {
    /// Row-major point components, `len() * dim` values.
    data: Vec<f64>,
    dim: usize,
}

impl Coordinates {
    /// Wrap a flat row-major buffer of `dim`-dimensional points.
    pub fn new(dim: usize, data: Vec<f64>) -> Result<Self> {
        if !(2..=3).contains(&dim) {
            return Err(FieldError::invalid("dim", dim as f64, "points must be 2D or 3D"));
        }
        if data.len() % dim != 0 {
            return Err(FieldError::ShapeMismatch {
                expected: format!("a multiple of {dim} components"),
                got: format!("{} components", data.len()),
            });
        }
        Ok(Self { data, dim })
    }

    /// Build from nested rows, rejecting ragged input.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let dim = rows.first().map_or(2, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * dim);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != dim {
                return Err(FieldError::ShapeMismatch {
                    expected: format!("{dim} components per point"),
                    got: format!("{} components in row {i}", row.len()),
                });
            }
            data.extend_from_slice(row);
        }
        Self::new(dim, data)
    }

    pub fn from_points<const D: usize>(points: &[[f64; D]]) -> Result<Self> {
        Self::new(D, points.iter().flatten().copied().collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() / self.dim
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn point(&self, i: usize) -> &[f64] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.data.chunks_exact(self.dim)
    }

    /// Euclidean distance between points `i` and `j`.
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.point(i)
            .iter()
            .zip(self.point(j))
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    /// Dense N×N pairwise distance matrix (symmetric, zero diagonal).
    pub fn distance_matrix(&self) -> DMatrix<f64> {
        let n = self.len();
        let mut d = DMatrix::zeros(n, n);
        for i in 0..n {
            for j in 0..i {
                let v = self.distance(i, j);
                d[(i, j)] = v;
                d[(j, i)] = v;
            }
        }
        d
    }
}

/// Regular 2D grid of `n_x * n_y` points with uniform `spacing`.
///
/// Ordering is y-major: the outer loop runs over rows (depth), the inner loop
/// over columns (length), so point `k` sits at `(spacing * (k % n_x), spacing * (k / n_x))`.
pub fn build_mesh(spacing: f64, n_x: usize, n_y: usize) -> Coordinates {
    let mut data = Vec::with_capacity(n_x * n_y * 2);
    for i_y in 0..n_y {
        for i_x in 0..n_x {
            data.push(spacing * i_x as f64);
            data.push(spacing * i_y as f64);
        }
    }
    log::debug!("built {n_x}x{n_y} mesh: {} nodes", n_x * n_y);
    Coordinates { data, dim: 2 }
}

/// Regular 3D grid; z outermost, then y, then x.
pub fn build_mesh_3d(spacing: f64, n_x: usize, n_y: usize, n_z: usize) -> Coordinates {
    let mut data = Vec::with_capacity(n_x * n_y * n_z * 3);
    for i_z in 0..n_z {
        for i_y in 0..n_y {
            for i_x in 0..n_x {
                data.push(spacing * i_x as f64);
                data.push(spacing * i_y as f64);
                data.push(spacing * i_z as f64);
            }
        }
    }
    log::debug!("built {n_x}x{n_y}x{n_z} mesh: {} nodes", n_x * n_y * n_z);
    Coordinates { data, dim: 3 }
}
