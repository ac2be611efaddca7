use ndarray::{Array1, Array2, Axis};

use crate::error::{CalvalError, Result};

/// Correction values sampled on a rectilinear mesh.
///
/// `values[[r, c]]` is the correction at `(x[c], y[r])`. Each axis must be
/// strictly increasing or strictly decreasing; raster y axes usually
/// decrease.
#[derive(Clone, Debug)]
pub struct CorrectionGrid {
    pub x: Array1<f64>,
    pub y: Array1<f64>,
    pub values: Array2<f64>,
}

impl CorrectionGrid {
    pub fn new(x: Array1<f64>, y: Array1<f64>, values: Array2<f64>) -> Result<Self> {
        let (h, w) = values.dim();
        if h == 0 || w == 0 {
            return Err(CalvalError::InvalidShape(format!(
                "empty {h}x{w} correction grid"
            )));
        }
        if x.len() != w {
            return Err(CalvalError::AxisLengthMismatch {
                axis: "x",
                expected: w,
                actual: x.len(),
            });
        }
        if y.len() != h {
            return Err(CalvalError::AxisLengthMismatch {
                axis: "y",
                expected: h,
                actual: y.len(),
            });
        }
        check_monotonic(&x, "x")?;
        check_monotonic(&y, "y")?;

        Ok(Self { x, y, values })
    }

    pub fn dim(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// `(x_min, x_max, y_min, y_max)`.
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        let (x0, x1) = (self.x[0], self.x[self.x.len() - 1]);
        let (y0, y1) = (self.y[0], self.y[self.y.len() - 1]);
        (x0.min(x1), x0.max(x1), y0.min(y1), y0.max(y1))
    }

    /// Axes in increasing order with the values reordered to match.
    pub(crate) fn ascending(&self) -> (Vec<f64>, Vec<f64>, Array2<f64>) {
        let mut xs = self.x.to_vec();
        let mut ys = self.y.to_vec();
        let mut values = self.values.clone();
        if is_decreasing(&xs) {
            xs.reverse();
            values.invert_axis(Axis(1));
        }
        if is_decreasing(&ys) {
            ys.reverse();
            values.invert_axis(Axis(0));
        }
        (xs, ys, values)
    }
}

fn is_decreasing(axis: &[f64]) -> bool {
    axis.len() >= 2 && axis[1] < axis[0]
}

fn check_monotonic(axis: &Array1<f64>, name: &'static str) -> Result<()> {
    if axis.iter().any(|v| !v.is_finite()) {
        return Err(CalvalError::NonFiniteSample);
    }
    let coords = axis.to_vec();
    let increasing = coords.windows(2).all(|w| w[1] > w[0]);
    let decreasing = coords.windows(2).all(|w| w[1] < w[0]);
    if increasing || decreasing {
        Ok(())
    } else {
        Err(CalvalError::NonMonotonicAxis(name))
    }
}
