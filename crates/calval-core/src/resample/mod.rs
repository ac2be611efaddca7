//! Correction-layer resampling.
//!
//! A correction layer known on a (coarse) mesh is interpolated onto an evenly
//! spaced grid spanning the same extent, then flipped vertically so that row
//! 0 holds the maximum y, as in a north-up raster. The flip is unconditional;
//! south-up rasters must flip the result back.

pub mod grid;
pub mod interp;

use ndarray::{Array1, Array2, ArrayView2};
use rayon::prelude::*;
use tracing::debug;

use crate::config::InterpolationMethod;
use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{CalvalError, Result};

pub use grid::CorrectionGrid;
pub use interp::GridInterpolator;

/// Resample `grid` onto a `(rows, cols)` grid covering the same extent.
pub fn resample_to_shape(
    grid: &CorrectionGrid,
    shape: (usize, usize),
    method: InterpolationMethod,
) -> Result<Array2<f64>> {
    let (rows, cols) = shape;
    if rows == 0 || cols == 0 {
        return Err(CalvalError::InvalidShape(format!(
            "empty {rows}x{cols} target grid"
        )));
    }

    let interpolator = GridInterpolator::new(grid, method)?;
    let (x_min, x_max, y_min, y_max) = grid.extent();
    let xx = linspace(x_min, x_max, cols);
    let yy = linspace(y_min, y_max, rows);

    // Output row r holds yy[rows - 1 - r].
    let fill_row = |r: usize| -> Vec<f64> {
        let y = yy[rows - 1 - r];
        xx.iter().map(|&x| interpolator.sample(x, y)).collect()
    };

    let row_values: Vec<Vec<f64>> = if rows * cols >= PARALLEL_PIXEL_THRESHOLD {
        (0..rows).into_par_iter().map(fill_row).collect()
    } else {
        (0..rows).map(fill_row).collect()
    };

    let mut result = Array2::<f64>::zeros((rows, cols));
    for (r, row) in row_values.into_iter().enumerate() {
        for (c, v) in row.into_iter().enumerate() {
            result[[r, c]] = v;
        }
    }

    debug!(
        method = %method,
        from = ?grid.dim(),
        to = ?shape,
        "Correction layer resampled"
    );
    Ok(result)
}

/// Resample a correction layer given as coordinate arrays plus values,
/// keeping the layer's own shape. `data[[r, c]]` is the value at
/// `(xcoor[c], ycoor[r])`.
pub fn resample_correction_layer(
    xcoor: &[f64],
    ycoor: &[f64],
    data: ArrayView2<'_, f64>,
    method: InterpolationMethod,
) -> Result<Array2<f64>> {
    let grid = CorrectionGrid::new(
        Array1::from(xcoor.to_vec()),
        Array1::from(ycoor.to_vec()),
        data.to_owned(),
    )?;
    resample_to_shape(&grid, data.dim(), method)
}

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n).map(|k| start + k as f64 * step).collect();
            values[n - 1] = end;
            values
        }
    }
}
