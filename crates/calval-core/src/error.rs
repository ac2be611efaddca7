use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalvalError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("{axis} axis has {actual} coordinates but data has {expected} samples along it")]
    AxisLengthMismatch {
        axis: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{0} coordinates are not strictly monotonic")]
    NonMonotonicAxis(&'static str),

    #[error("Invalid oversampling factor: {0} (must be finite and >= 1)")]
    InvalidFactor(f64),

    #[error("Input contains non-finite samples")]
    NonFiniteSample,

    #[error("Fit needs at least {required} samples, got {available}")]
    InsufficientSamples { required: usize, available: usize },

    #[error("Empty bounds for {param}: lower {lower} > upper {upper}")]
    InfeasibleBounds {
        param: &'static str,
        lower: f64,
        upper: f64,
    },

    #[error("Fit did not converge after {iterations} iterations (cost {cost:e})")]
    FitNotConverged { iterations: usize, cost: f64 },

    #[error("{method} interpolation needs at least {required} non-collinear source points, got {available}")]
    InsufficientData {
        method: String,
        required: usize,
        available: usize,
    },

    #[error("Unknown method name: {0}")]
    UnknownMethod(String),

    #[error("Pixel ({row}, {col}) lies outside the {rows}x{cols} raster")]
    OutOfRaster {
        row: f64,
        col: f64,
        rows: usize,
        cols: usize,
    },

    #[error("No usable entries")]
    EmptyInput,

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, CalvalError>;
