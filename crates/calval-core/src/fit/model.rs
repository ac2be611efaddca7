use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{PARABOLOID_COEFF_GUESS, SINC_SHAPE_GUESS, SINC_TAYLOR_THRESHOLD};
use crate::error::CalvalError;

use super::peak::SearchWindow;

/// Functional form fitted to a point-target response.
///
/// Parameters always start with the peak position `(x0, y0)`:
/// - `Sinc`: `c * sinc(a(x - x0)) * sinc(b(y - y0))`, params `(x0, y0, a, b, c)`
/// - `Paraboloid`: `a(x - x0)^2 + b(y - y0)^2 + c(x - x0)(y - y0) + d`,
///   params `(x0, y0, a, b, c, d)`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitModel {
    #[default]
    Sinc,
    Paraboloid,
}

/// Per-parameter box constraints, same order as the model parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamBounds {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl ParamBounds {
    /// Clamp each parameter into its interval.
    pub fn project(&self, params: &mut [f64]) {
        for ((p, &lo), &hi) in params.iter_mut().zip(&self.lower).zip(&self.upper) {
            *p = p.clamp(lo, hi);
        }
    }
}

impl FitModel {
    pub fn n_params(&self) -> usize {
        self.param_names().len()
    }

    pub fn param_names(&self) -> &'static [&'static str] {
        match self {
            Self::Sinc => &["x0", "y0", "a", "b", "c"],
            Self::Paraboloid => &["x0", "y0", "a", "b", "c", "d"],
        }
    }

    /// Starting point derived from the raw (grid) peak.
    pub fn initial_guess(&self, x_peak: f64, y_peak: f64, peak_value: f64) -> Vec<f64> {
        match self {
            Self::Sinc => vec![x_peak, y_peak, SINC_SHAPE_GUESS, SINC_SHAPE_GUESS, peak_value],
            Self::Paraboloid => {
                let [a, b, c, d] = PARABOLOID_COEFF_GUESS;
                vec![x_peak, y_peak, a, b, c, d]
            }
        }
    }

    /// The peak position is confined to `window`; shape parameters are kept
    /// physically plausible (sinc shape factors in `[0, 1]`, non-negative
    /// amplitude; downward-opening paraboloid with non-negative apex).
    pub fn bounds(&self, window: &SearchWindow) -> ParamBounds {
        let (x_lo, x_hi) = window.x;
        let (y_lo, y_hi) = window.y;
        let inf = f64::INFINITY;
        match self {
            Self::Sinc => ParamBounds {
                lower: vec![x_lo, y_lo, 0.0, 0.0, 0.0],
                upper: vec![x_hi, y_hi, 1.0, 1.0, inf],
            },
            Self::Paraboloid => ParamBounds {
                lower: vec![x_lo, y_lo, -inf, -inf, -inf, 0.0],
                upper: vec![x_hi, y_hi, 0.0, 0.0, inf, inf],
            },
        }
    }

    pub fn evaluate(&self, params: &[f64], x: f64, y: f64) -> f64 {
        let dx = x - params[0];
        let dy = y - params[1];
        match self {
            Self::Sinc => {
                let (a, b, c) = (params[2], params[3], params[4]);
                c * sinc(a * dx) * sinc(b * dy)
            }
            Self::Paraboloid => {
                let (a, b, c, d) = (params[2], params[3], params[4], params[5]);
                a * dx * dx + b * dy * dy + c * dx * dy + d
            }
        }
    }

    /// Partial derivatives of [`evaluate`](Self::evaluate) with respect to
    /// each parameter, written into `out`.
    pub fn gradient(&self, params: &[f64], x: f64, y: f64, out: &mut [f64]) {
        let dx = x - params[0];
        let dy = y - params[1];
        match self {
            Self::Sinc => {
                let (a, b, c) = (params[2], params[3], params[4]);
                let (sx, sy) = (sinc(a * dx), sinc(b * dy));
                let (dsx, dsy) = (sinc_derivative(a * dx), sinc_derivative(b * dy));
                out[0] = -c * a * dsx * sy;
                out[1] = -c * b * sx * dsy;
                out[2] = c * dx * dsx * sy;
                out[3] = c * dy * sx * dsy;
                out[4] = sx * sy;
            }
            Self::Paraboloid => {
                let (a, b, c) = (params[2], params[3], params[4]);
                out[0] = -2.0 * a * dx - c * dy;
                out[1] = -2.0 * b * dy - c * dx;
                out[2] = dx * dx;
                out[3] = dy * dy;
                out[4] = dx * dy;
                out[5] = 1.0;
            }
        }
    }
}

impl fmt::Display for FitModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sinc => write!(f, "Sinc"),
            Self::Paraboloid => write!(f, "Paraboloid"),
        }
    }
}

impl FromStr for FitModel {
    type Err = CalvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sinc" => Ok(Self::Sinc),
            "para" | "paraboloid" => Ok(Self::Paraboloid),
            _ => Err(CalvalError::UnknownMethod(s.to_string())),
        }
    }
}

/// Normalized sinc: `sin(pi u) / (pi u)`, 1 at the origin.
pub fn sinc(u: f64) -> f64 {
    if u == 0.0 {
        1.0
    } else {
        let pu = PI * u;
        pu.sin() / pu
    }
}

fn sinc_derivative(u: f64) -> f64 {
    if u.abs() < SINC_TAYLOR_THRESHOLD {
        -PI * PI * u / 3.0
    } else {
        ((PI * u).cos() - sinc(u)) / u
    }
}
