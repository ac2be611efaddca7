//! Frequency-domain oversampling.
//!
//! The chip spectrum is centered, embedded in a larger zero array, and
//! inverse-transformed, which is band-limited (periodic sinc) interpolation
//! of the original samples onto a finer grid.

use ndarray::{s, Array1, Array2, ArrayView2};
use num_complex::Complex64;
use tracing::debug;

use crate::config::{Normalization, OversampleConfig};
use crate::error::{CalvalError, Result};
use crate::patch::{ImagePatch, Sample};

use super::fft::{fft2d, fftshift, ifft2d, ifftshift};

/// Oversample a patch and its axes by `config.factor`.
///
/// Output shape is `(round(h*s), round(w*s))`. Axes keep their first
/// coordinate and are refined to `step * n / round(n*s)`, which is
/// `step / s` for integer factors.
pub fn oversample(patch: &ImagePatch, config: &OversampleConfig) -> Result<ImagePatch> {
    let factor = config.factor;
    if !factor.is_finite() || factor < 1.0 {
        return Err(CalvalError::InvalidFactor(factor));
    }

    let (h, w) = patch.dim();
    let (nh, nw) = (scaled_len(h, factor), scaled_len(w, factor));

    let mut spectrum = patch.data.clone();
    fft2d(&mut spectrum);
    let centered = fftshift(&spectrum);

    let r0 = insert_offset(h, nh);
    let c0 = insert_offset(w, nw);
    let mut padded = Array2::<Complex64>::zeros((nh, nw));
    padded
        .slice_mut(s![r0..r0 + h, c0..c0 + w])
        .assign(&centered);

    let mut samples = ifftshift(&padded);
    ifft2d(&mut samples);

    let scale = match config.normalization {
        Normalization::Amplitude => 1.0 / (h * w) as f64,
        Normalization::Unscaled => 1.0 / (nh * nw) as f64,
    };
    samples.mapv_inplace(|v| v * scale);

    debug!(
        from = ?(h, w),
        to = ?(nh, nw),
        factor,
        normalization = %config.normalization,
        "Patch oversampled"
    );

    ImagePatch::new(
        samples,
        refine_axis(&patch.rows, nh),
        refine_axis(&patch.cols, nw),
    )
}

/// Oversample a raw real or complex array. Missing axes default to pixel
/// indices. Uses amplitude-preserving normalization.
pub fn oversample_array<T: Sample>(
    data: ArrayView2<'_, T>,
    factor: f64,
    rows: Option<&[f64]>,
    cols: Option<&[f64]>,
) -> Result<ImagePatch> {
    let patch = ImagePatch::from_samples(data, rows, cols)?;
    oversample(
        &patch,
        &OversampleConfig {
            factor,
            normalization: Normalization::Amplitude,
        },
    )
}

fn scaled_len(n: usize, factor: f64) -> usize {
    ((n as f64 * factor).round() as usize).max(n)
}

/// Row/column where the centered `n`-bin spectrum starts inside the
/// `scaled`-bin one, so that its zero-frequency bin (`n/2`) lands on
/// `scaled/2`, the bin `ifftshift` moves back to index 0.
pub(crate) fn insert_offset(n: usize, scaled: usize) -> usize {
    scaled / 2 - n / 2
}

fn refine_axis(axis: &Array1<f64>, scaled: usize) -> Array1<f64> {
    let n = axis.len();
    let step = if n >= 2 { axis[1] - axis[0] } else { 1.0 };
    let fine_step = step * n as f64 / scaled as f64;
    Array1::from_iter((0..scaled).map(|k| axis[0] + k as f64 * fine_step))
}
