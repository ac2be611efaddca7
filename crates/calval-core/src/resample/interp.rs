//! Interpolants over the nodes of a [`CorrectionGrid`].
//!
//! The nodes are treated as scattered points: `Linear` and `Cubic` are only
//! defined inside their convex hull (the grid's bounding box) and return NaN
//! outside it; `Nearest` is defined everywhere.

use ndarray::Array2;

use crate::config::InterpolationMethod;
use crate::error::{CalvalError, Result};

use super::grid::CorrectionGrid;

/// Point-wise interpolator built once per grid and method.
#[derive(Clone, Debug)]
pub struct GridInterpolator {
    method: InterpolationMethod,
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Node values, rows follow `ys`, columns follow `xs`
    values: Array2<f64>,
    slopes: Option<HermiteSlopes>,
}

/// Node derivatives for the piecewise-cubic Hermite surface.
#[derive(Clone, Debug)]
struct HermiteSlopes {
    fx: Array2<f64>,
    fy: Array2<f64>,
    fxy: Array2<f64>,
}

impl GridInterpolator {
    pub fn new(grid: &CorrectionGrid, method: InterpolationMethod) -> Result<Self> {
        let (xs, ys, values) = grid.ascending();

        // A mesh with a single row or column is collinear and cannot be
        // triangulated.
        if method != InterpolationMethod::Nearest && (xs.len() < 2 || ys.len() < 2) {
            return Err(CalvalError::InsufficientData {
                method: method.name().to_string(),
                required: 3,
                available: (xs.len() * ys.len()).min(2),
            });
        }

        let slopes = (method == InterpolationMethod::Cubic)
            .then(|| HermiteSlopes::estimate(&xs, &ys, &values));

        Ok(Self {
            method,
            xs,
            ys,
            values,
            slopes,
        })
    }

    pub fn method(&self) -> InterpolationMethod {
        self.method
    }

    /// Interpolated value at `(x, y)`.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        match self.method {
            InterpolationMethod::Nearest => self.nearest(x, y),
            InterpolationMethod::Linear => self.linear(x, y),
            InterpolationMethod::Cubic => self.cubic(x, y),
        }
    }

    fn nearest(&self, x: f64, y: f64) -> f64 {
        // On a rectilinear mesh the squared distance separates by axis, so
        // the per-axis nearest nodes give the Euclidean nearest node.
        let i = nearest_index(&self.xs, x);
        let j = nearest_index(&self.ys, y);
        self.values[[j, i]]
    }

    fn linear(&self, x: f64, y: f64) -> f64 {
        let (Some((i, tx)), Some((j, ty))) = (locate_cell(&self.xs, x), locate_cell(&self.ys, y))
        else {
            return f64::NAN;
        };

        let v00 = self.values[[j, i]];
        let v10 = self.values[[j, i + 1]];
        let v01 = self.values[[j + 1, i]];
        let v11 = self.values[[j + 1, i + 1]];

        // Cells are split along the (x_i, y_j)-(x_i+1, y_j+1) diagonal.
        if tx >= ty {
            v00 + tx * (v10 - v00) + ty * (v11 - v10)
        } else {
            v00 + ty * (v01 - v00) + tx * (v11 - v01)
        }
    }

    fn cubic(&self, x: f64, y: f64) -> f64 {
        let Some(slopes) = &self.slopes else {
            return f64::NAN;
        };
        let (Some((i, tx)), Some((j, ty))) = (locate_cell(&self.xs, x), locate_cell(&self.ys, y))
        else {
            return f64::NAN;
        };

        let hx = self.xs[i + 1] - self.xs[i];
        let hy = self.ys[j + 1] - self.ys[j];
        let bx = hermite_basis(tx);
        let by = hermite_basis(ty);
        let wx = [bx[0], bx[1]];
        let wy = [by[0], by[1]];
        let dx = [bx[2] * hx, bx[3] * hx];
        let dy = [by[2] * hy, by[3] * hy];

        let mut sum = 0.0;
        for b in 0..2 {
            for a in 0..2 {
                let idx = [j + b, i + a];
                sum += self.values[idx] * wx[a] * wy[b]
                    + slopes.fx[idx] * dx[a] * wy[b]
                    + slopes.fy[idx] * wx[a] * dy[b]
                    + slopes.fxy[idx] * dx[a] * dy[b];
            }
        }
        sum
    }
}

impl HermiteSlopes {
    fn estimate(xs: &[f64], ys: &[f64], values: &Array2<f64>) -> Self {
        let (h, w) = values.dim();
        let mut fx = Array2::<f64>::zeros((h, w));
        let mut fy = Array2::<f64>::zeros((h, w));
        let mut fxy = Array2::<f64>::zeros((h, w));

        for r in 0..h {
            let row: Vec<f64> = (0..w).map(|c| values[[r, c]]).collect();
            for (c, d) in node_slopes(xs, &row).into_iter().enumerate() {
                fx[[r, c]] = d;
            }
        }
        for c in 0..w {
            let col: Vec<f64> = (0..h).map(|r| values[[r, c]]).collect();
            for (r, d) in node_slopes(ys, &col).into_iter().enumerate() {
                fy[[r, c]] = d;
            }
            let col_fx: Vec<f64> = (0..h).map(|r| fx[[r, c]]).collect();
            for (r, d) in node_slopes(ys, &col_fx).into_iter().enumerate() {
                fxy[[r, c]] = d;
            }
        }

        Self { fx, fy, fxy }
    }
}

/// Derivative estimates at each node of a 1D profile: one-sided at the ends,
/// the slope of the interpolating parabola through three nodes inside.
fn node_slopes(t: &[f64], f: &[f64]) -> Vec<f64> {
    let n = t.len();
    if n < 2 {
        return vec![0.0; n];
    }
    (0..n)
        .map(|k| {
            if k == 0 {
                (f[1] - f[0]) / (t[1] - t[0])
            } else if k == n - 1 {
                (f[k] - f[k - 1]) / (t[k] - t[k - 1])
            } else {
                let h0 = t[k] - t[k - 1];
                let h1 = t[k + 1] - t[k];
                let s0 = (f[k] - f[k - 1]) / h0;
                let s1 = (f[k + 1] - f[k]) / h1;
                (h1 * s0 + h0 * s1) / (h0 + h1)
            }
        })
        .collect()
}

/// Cubic Hermite basis `[h00, h01, h10, h11]` at `t` in `[0, 1]`.
fn hermite_basis(t: f64) -> [f64; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        2.0 * t3 - 3.0 * t2 + 1.0,
        -2.0 * t3 + 3.0 * t2,
        t3 - 2.0 * t2 + t,
        t3 - t2,
    ]
}

/// Cell index and fractional position of `v` on an increasing axis, or
/// `None` outside `[axis[0], axis[n-1]]`.
fn locate_cell(axis: &[f64], v: f64) -> Option<(usize, f64)> {
    let n = axis.len();
    if n < 2 || v.is_nan() || v < axis[0] || v > axis[n - 1] {
        return None;
    }
    let i = axis.partition_point(|&a| a <= v).saturating_sub(1).min(n - 2);
    let t = (v - axis[i]) / (axis[i + 1] - axis[i]);
    Some((i, t))
}

fn nearest_index(axis: &[f64], v: f64) -> usize {
    let i = axis.partition_point(|&a| a < v);
    if i == 0 {
        0
    } else if i == axis.len() {
        axis.len() - 1
    } else if v - axis[i - 1] <= axis[i] - v {
        i - 1
    } else {
        i
    }
}
