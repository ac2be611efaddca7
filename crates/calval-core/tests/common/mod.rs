#![allow(dead_code)]

use ndarray::Array2;
use num_complex::Complex64;

use calval_core::fit::sinc;

/// `amp * sinc(a(x - x0)) * sinc(b(y - y0))` evaluated at pixel `(row, col)`.
pub fn sinc_response(amp: f64, x0: f64, y0: f64, a: f64, b: f64, row: f64, col: f64) -> f64 {
    amp * sinc(a * (col - x0)) * sinc(b * (row - y0))
}

/// Real point-target chip: a separable sinc centered at `(row0, col0)`.
pub fn sinc_chip(h: usize, w: usize, row0: f64, col0: f64, shape: f64, amp: f64) -> Array2<f64> {
    Array2::from_shape_fn((h, w), |(r, c)| {
        sinc_response(amp, col0, row0, shape, shape, r as f64, c as f64)
    })
}

/// Deterministic complex patch with no special structure.
pub fn textured_complex(h: usize, w: usize) -> Array2<Complex64> {
    Array2::from_shape_fn((h, w), |(r, c)| {
        let (r, c) = (r as f64, c as f64);
        Complex64::new(
            (0.7 * r + 0.3 * c).sin() + 0.1 * r,
            (0.2 * r * c).cos() - 0.05 * c,
        )
    })
}

/// Sampling grid `start, start + step, ...` with `n` points.
pub fn axis(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|k| start + k as f64 * step).collect()
}

pub fn energy(data: &Array2<Complex64>) -> f64 {
    data.iter().map(|v| v.norm_sqr()).sum()
}

/// Values `f(x[c], y[r])` on the mesh.
pub fn field_on_mesh(x: &[f64], y: &[f64], f: impl Fn(f64, f64) -> f64) -> Array2<f64> {
    Array2::from_shape_fn((y.len(), x.len()), |(r, c)| f(x[c], y[r]))
}
