pub mod model;
pub mod peak;
pub mod solver;

pub use model::{sinc, FitModel, ParamBounds};
pub use peak::{locate_peak, PeakFit, PeakLocation, PeakSamples, SearchWindow};
pub use solver::{solve_bounded, FitReport};
