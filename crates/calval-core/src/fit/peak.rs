use ndarray::ArrayView2;
use tracing::debug;

use crate::config::SolverConfig;
use crate::error::{CalvalError, Result};

use super::model::FitModel;
use super::solver::solve_bounded;

/// Allowed range of the fitted peak position, in axis units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchWindow {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl Default for SearchWindow {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl SearchWindow {
    pub fn unbounded() -> Self {
        Self {
            x: (f64::NEG_INFINITY, f64::INFINITY),
            y: (f64::NEG_INFINITY, f64::INFINITY),
        }
    }

    pub fn new(x: (f64, f64), y: (f64, f64)) -> Self {
        Self { x, y }
    }

    /// Square window of half-width `half` centered on `(x, y)`.
    pub fn around(x: f64, y: f64, half: f64) -> Self {
        Self {
            x: (x - half, x + half),
            y: (y - half, y + half),
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x.0 && x <= self.x.1 && y >= self.y.0 && y <= self.y.1
    }
}

/// Fractional peak position: `row` is the y coordinate, `col` the x coordinate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeakLocation {
    pub row: f64,
    pub col: f64,
}

/// Flattened `(x, y) -> z` samples fed to the fitter.
#[derive(Clone, Debug, Default)]
pub struct PeakSamples {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
}

impl PeakSamples {
    /// Samples given as three parallel arrays.
    pub fn from_flat(x: &[f64], y: &[f64], z: &[f64]) -> Result<Self> {
        if x.len() != z.len() {
            return Err(CalvalError::AxisLengthMismatch {
                axis: "x",
                expected: z.len(),
                actual: x.len(),
            });
        }
        if y.len() != z.len() {
            return Err(CalvalError::AxisLengthMismatch {
                axis: "y",
                expected: z.len(),
                actual: y.len(),
            });
        }
        if x.iter().chain(y).chain(z).any(|v| !v.is_finite()) {
            return Err(CalvalError::NonFiniteSample);
        }

        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            z: z.to_vec(),
        })
    }

    /// Samples on a grid: `values[[r, c]]` sits at `(cols[c], rows[r])`.
    pub fn from_grid(values: ArrayView2<'_, f64>, rows: &[f64], cols: &[f64]) -> Result<Self> {
        let (h, w) = values.dim();
        if rows.len() != h {
            return Err(CalvalError::AxisLengthMismatch {
                axis: "row",
                expected: h,
                actual: rows.len(),
            });
        }
        if cols.len() != w {
            return Err(CalvalError::AxisLengthMismatch {
                axis: "column",
                expected: w,
                actual: cols.len(),
            });
        }

        let mut samples = Self {
            x: Vec::with_capacity(h * w),
            y: Vec::with_capacity(h * w),
            z: Vec::with_capacity(h * w),
        };
        for ((r, c), &v) in values.indexed_iter() {
            samples.x.push(cols[c]);
            samples.y.push(rows[r]);
            samples.z.push(v);
        }
        if samples.z.iter().chain(rows).chain(cols).any(|v| !v.is_finite()) {
            return Err(CalvalError::NonFiniteSample);
        }
        Ok(samples)
    }

    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn z(&self) -> &[f64] {
        &self.z
    }

    /// Index of the largest value; the first one wins on ties.
    pub fn argmax(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, &v) in self.z.iter().enumerate() {
            if best.map_or(true, |b| v > self.z[b]) {
                best = Some(i);
            }
        }
        best
    }

    /// Keep only samples within `radius` of `(cx, cy)`.
    pub fn within_radius(&self, cx: f64, cy: f64, radius: f64) -> Self {
        let r2 = radius * radius;
        let mut kept = Self::default();
        for i in 0..self.len() {
            let (dx, dy) = (self.x[i] - cx, self.y[i] - cy);
            if dx * dx + dy * dy <= r2 {
                kept.x.push(self.x[i]);
                kept.y.push(self.y[i]);
                kept.z.push(self.z[i]);
            }
        }
        kept
    }
}

/// Fitted peak with the full parameter vector of its model.
#[derive(Clone, Debug)]
pub struct PeakFit {
    pub location: PeakLocation,
    pub model: FitModel,
    pub params: Vec<f64>,
    pub cost: f64,
    pub iterations: usize,
}

/// Fit `model` to the samples and return the sub-pixel peak position.
///
/// The raw maximum seeds the fit; its position is clipped into `window`
/// so a raw peak outside the window still yields the window-constrained
/// optimum. Fails if there are fewer samples than model parameters, the
/// window is empty, or the solver does not converge.
pub fn locate_peak(
    samples: &PeakSamples,
    window: &SearchWindow,
    model: FitModel,
    solver: &SolverConfig,
) -> Result<PeakFit> {
    let required = model.n_params();
    let peak_index = match samples.argmax() {
        Some(i) if samples.len() >= required => i,
        _ => {
            return Err(CalvalError::InsufficientSamples {
                required,
                available: samples.len(),
            })
        }
    };

    let (x_peak, y_peak) = (samples.x[peak_index], samples.y[peak_index]);
    let peak_value = samples.z[peak_index];
    let initial = model.initial_guess(x_peak, y_peak, peak_value);
    let bounds = model.bounds(window);

    let report = solve_bounded(model, samples, &initial, &bounds, solver)?;

    let location = PeakLocation {
        row: report.params[1],
        col: report.params[0],
    };
    debug!(
        model = %model,
        raw = ?(y_peak, x_peak),
        fitted = ?(location.row, location.col),
        iterations = report.iterations,
        "Peak located"
    );

    Ok(PeakFit {
        location,
        model,
        params: report.params,
        cost: report.cost,
        iterations: report.iterations,
    })
}
