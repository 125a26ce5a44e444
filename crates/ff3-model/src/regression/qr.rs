//! Householder QR decomposition for small least squares problems.
//!
//! The design matrix is reduced column by column with Householder reflections,
//! applied in a fixed order to both the matrix and the target, so repeated fits
//! of the same data on the same platform are bit-for-bit identical. No column
//! pivoting is performed: the regressor order is part of the model.

use ndarray::{Array1, Array2, s};

/// A column is rank deficient when `|R_jj|` is at or below this fraction of
/// the largest `|R_jj|`.
pub(crate) const RANK_TOLERANCE: f64 = 1e-10;

/// Result of reducing `[X | y]` to `[R | Q^T y]`.
#[derive(Debug, Clone)]
pub(crate) struct QrDecomposition {
    /// Upper triangular factor, `p x p`
    r: Array2<f64>,
    /// First `p` entries of `Q^T y`
    qty: Array1<f64>,
    /// Rank threshold on `|R_jj|`
    tolerance: f64,
}

impl QrDecomposition {
    /// Factor the `n x p` matrix `x` and apply the same reflections to `y`.
    pub(crate) fn new(x: &Array2<f64>, y: &Array1<f64>) -> Self {
        let (n, p) = x.dim();
        let mut a = x.clone();
        let mut b = y.clone();

        for k in 0..p.min(n) {
            let norm = a.slice(s![k.., k]).iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm == 0.0 {
                continue;
            }

            let alpha = if a[[k, k]] > 0.0 { -norm } else { norm };
            let mut v = a.slice(s![k.., k]).to_owned();
            v[0] -= alpha;
            let v_norm_sq = v.dot(&v);
            if v_norm_sq == 0.0 {
                continue;
            }

            for j in k..p {
                let scale = 2.0 * v.dot(&a.slice(s![k.., j])) / v_norm_sq;
                a.slice_mut(s![k.., j]).scaled_add(-scale, &v);
            }
            let scale = 2.0 * v.dot(&b.slice(s![k..])) / v_norm_sq;
            b.slice_mut(s![k..]).scaled_add(-scale, &v);
        }

        let r = a.slice(s![..p, ..p]).to_owned();
        let max_diag = (0..p).map(|j| r[[j, j]].abs()).fold(0.0, f64::max);
        let tolerance = RANK_TOLERANCE * max_diag;

        Self {
            r,
            qty: b.slice(s![..p]).to_owned(),
            tolerance,
        }
    }

    /// Columns whose diagonal entry of `R` falls at or below the rank threshold.
    pub(crate) fn deficient_columns(&self) -> Vec<usize> {
        (0..self.r.nrows())
            .filter(|&j| {
                let d = self.r[[j, j]].abs();
                d == 0.0 || d <= self.tolerance
            })
            .collect()
    }

    /// Numerical rank of the factored matrix.
    pub(crate) fn rank(&self) -> usize {
        self.r.nrows() - self.deficient_columns().len()
    }

    /// Least squares coefficients from `R beta = Q^T y`.
    pub(crate) fn solve(&self) -> Array1<f64> {
        let p = self.r.nrows();
        let mut beta = Array1::<f64>::zeros(p);
        for i in (0..p).rev() {
            let tail: f64 = ((i + 1)..p).map(|j| self.r[[i, j]] * beta[j]).sum();
            beta[i] = (self.qty[i] - tail) / self.r[[i, i]];
        }
        beta
    }

    /// `(X^T X)^-1 = R^-1 R^-T`.
    pub(crate) fn unscaled_covariance(&self) -> Array2<f64> {
        let r_inv = upper_triangular_inverse(&self.r);
        r_inv.dot(&r_inv.t())
    }
}

fn upper_triangular_inverse(r: &Array2<f64>) -> Array2<f64> {
    let p = r.nrows();
    let mut inv = Array2::<f64>::zeros((p, p));
    for col in 0..p {
        for i in (0..=col).rev() {
            let identity = if i == col { 1.0 } else { 0.0 };
            let tail: f64 = ((i + 1)..=col).map(|j| r[[i, j]] * inv[[j, col]]).sum();
            inv[[i, col]] = (identity - tail) / r[[i, i]];
        }
    }
    inv
}
