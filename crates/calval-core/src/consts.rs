/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Default spectral oversampling factor for corner-reflector chips.
pub const DEFAULT_OVERSAMPLE_FACTOR: f64 = 32.0;

/// Initial guess for both sinc shape factors.
pub const SINC_SHAPE_GUESS: f64 = 0.7;

/// Initial guess for the paraboloid `(a, b, c, d)` coefficients.
pub const PARABOLOID_COEFF_GUESS: [f64; 4] = [-1.0, -1.0, 1.0, 1.0];

/// Default Levenberg-Marquardt iteration cap.
pub const DEFAULT_MAX_ITERATIONS: usize = 200;

/// Default relative cost, step and gradient tolerances for the fitter.
pub const DEFAULT_FIT_TOLERANCE: f64 = 1e-8;

/// Initial Levenberg-Marquardt damping.
pub const DEFAULT_INITIAL_LAMBDA: f64 = 1e-3;

/// Damping above which the fitter stops trying to shrink the step.
pub const MAX_LAMBDA: f64 = 1e16;

/// Damping floor so a long run of accepted steps cannot underflow lambda.
pub const MIN_LAMBDA: f64 = 1e-15;

/// Floor applied to diagonal entries of J^T J before Marquardt scaling.
pub const JTJ_DIAGONAL_FLOOR: f64 = 1e-12;

/// Below this argument magnitude `sinc'` uses its Taylor expansion.
pub const SINC_TAYLOR_THRESHOLD: f64 = 1e-6;
