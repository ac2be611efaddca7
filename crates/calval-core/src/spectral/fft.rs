use std::sync::Arc;

use ndarray::parallel::prelude::*;
use ndarray::{Array2, ArrayViewMut1, Axis};
use num_complex::Complex64;
use rustfft::{Fft, FftDirection, FftPlanner};

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// In-place 2D forward FFT: row-wise FFT, then column-wise FFT.
pub fn fft2d(data: &mut Array2<Complex64>) {
    transform(data, FftDirection::Forward);
}

/// In-place 2D inverse FFT. Unnormalized: the caller applies `1/(h*w)` or
/// whatever scaling it needs.
pub fn ifft2d(data: &mut Array2<Complex64>) {
    transform(data, FftDirection::Inverse);
}

/// Move the zero-frequency bin from index 0 to index `n/2` on both axes.
pub fn fftshift(data: &Array2<Complex64>) -> Array2<Complex64> {
    let (h, w) = data.dim();
    roll(data, h / 2, w / 2)
}

/// Inverse of [`fftshift`]; differs from it only for odd axis lengths.
pub fn ifftshift(data: &Array2<Complex64>) -> Array2<Complex64> {
    let (h, w) = data.dim();
    roll(data, h - h / 2, w - w / 2)
}

/// Circular shift: `out[(i + dr) % h, (j + dc) % w] = data[i, j]`.
fn roll(data: &Array2<Complex64>, dr: usize, dc: usize) -> Array2<Complex64> {
    let (h, w) = data.dim();
    Array2::from_shape_fn((h, w), |(r, c)| data[[(r + h - dr) % h, (c + w - dc) % w]])
}

fn transform(data: &mut Array2<Complex64>, direction: FftDirection) {
    let (h, w) = data.dim();
    if h == 0 || w == 0 {
        return;
    }

    let mut planner = FftPlanner::new();
    let fft_row = planner.plan_fft(w, direction);
    let fft_col = planner.plan_fft(h, direction);
    let parallel = h * w >= PARALLEL_PIXEL_THRESHOLD;

    // Each outer index along Axis(0) is one row, along Axis(1) one column.
    process_lanes(data, Axis(0), &fft_row, parallel);
    process_lanes(data, Axis(1), &fft_col, parallel);
}

fn process_lanes(
    data: &mut Array2<Complex64>,
    axis: Axis,
    fft: &Arc<dyn Fft<f64>>,
    parallel: bool,
) {
    if parallel {
        data.axis_iter_mut(axis)
            .into_par_iter()
            .for_each(|lane| process_lane(lane, fft));
    } else {
        for lane in data.axis_iter_mut(axis) {
            process_lane(lane, fft);
        }
    }
}

fn process_lane(mut lane: ArrayViewMut1<'_, Complex64>, fft: &Arc<dyn Fft<f64>>) {
    let mut buffer = lane.to_vec();
    fft.process(&mut buffer);
    for (dst, src) in lane.iter_mut().zip(buffer) {
        *dst = src;
    }
}
