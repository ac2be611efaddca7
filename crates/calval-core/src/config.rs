use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_FIT_TOLERANCE, DEFAULT_INITIAL_LAMBDA, DEFAULT_MAX_ITERATIONS,
    DEFAULT_OVERSAMPLE_FACTOR,
};
use crate::error::{CalvalError, Result};
use crate::fit::FitModel;

/// Top-level configuration for locating point targets and resampling
/// correction layers.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CalvalConfig {
    #[serde(default)]
    pub locator: LocatorConfig,
    #[serde(default)]
    pub resample: ResampleConfig,
}

impl CalvalConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LocatorConfig {
    #[serde(default)]
    pub detection: Detection,
    #[serde(default)]
    pub oversample: OversampleConfig,
    #[serde(default)]
    pub fit: FitConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OversampleConfig {
    /// Oversampling factor (>= 1). Non-integer factors are allowed; output
    /// axis lengths are rounded.
    pub factor: f64,
    #[serde(default)]
    pub normalization: Normalization,
}

impl Default for OversampleConfig {
    fn default() -> Self {
        Self {
            factor: DEFAULT_OVERSAMPLE_FACTOR,
            normalization: Normalization::default(),
        }
    }
}

/// Scaling applied after the inverse FFT of the zero-padded spectrum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Normalization {
    /// Keep sample amplitudes: scale by `1/(h*w)` of the input patch.
    #[default]
    Amplitude,
    /// Plain inverse-DFT normalization `1/(H*W)` of the padded patch.
    Unscaled,
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amplitude => write!(f, "Amplitude"),
            Self::Unscaled => write!(f, "Unscaled"),
        }
    }
}

/// Real quantity derived from complex samples before fitting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Detection {
    #[default]
    Amplitude,
    Intensity,
    Real,
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amplitude => write!(f, "Amplitude"),
            Self::Intensity => write!(f, "Intensity"),
            Self::Real => write!(f, "Real part"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FitConfig {
    #[serde(default)]
    pub model: FitModel,
    /// Only fit samples within this distance (axis units) of the raw peak.
    pub fit_radius: Option<f64>,
    #[serde(default)]
    pub solver: SolverConfig,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            model: FitModel::default(),
            fit_radius: None,
            solver: SolverConfig::default(),
        }
    }
}

/// Levenberg-Marquardt settings. Every tolerance is explicit so results do
/// not depend on library defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SolverConfig {
    pub max_iterations: usize,
    /// Relative cost reduction below which an accepted step ends the fit.
    pub ftol: f64,
    /// Relative parameter step below which the fit ends.
    pub xtol: f64,
    /// Projected-gradient infinity norm below which the fit ends.
    pub gtol: f64,
    pub initial_lambda: f64,
    pub lambda_up: f64,
    pub lambda_down: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            ftol: DEFAULT_FIT_TOLERANCE,
            xtol: DEFAULT_FIT_TOLERANCE,
            gtol: DEFAULT_FIT_TOLERANCE,
            initial_lambda: DEFAULT_INITIAL_LAMBDA,
            lambda_up: 10.0,
            lambda_down: 0.1,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResampleConfig {
    #[serde(default)]
    pub method: InterpolationMethod,
}

/// Scattered-data interpolation scheme used by the correction-layer resampler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterpolationMethod {
    Nearest,
    #[default]
    Linear,
    Cubic,
}

impl InterpolationMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Linear => "linear",
            Self::Cubic => "cubic",
        }
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nearest => write!(f, "Nearest"),
            Self::Linear => write!(f, "Linear"),
            Self::Cubic => write!(f, "Cubic"),
        }
    }
}

impl FromStr for InterpolationMethod {
    type Err = CalvalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "linear" => Ok(Self::Linear),
            "cubic" => Ok(Self::Cubic),
            _ => Err(CalvalError::UnknownMethod(s.to_string())),
        }
    }
}
