//! Sub-pixel point-target localization and correction-layer resampling for
//! geolocation CalVal of radar imagery.
//!
//! - [`spectral`]: FFT zero-padding oversampling of image chips
//! - [`fit`]: bounded least-squares peak fitting (sinc product or paraboloid)
//! - [`resample`]: correction layers interpolated onto a raster grid
//! - [`locate`]: oversample + fit composed over one chip
//! - [`geolocation`]: absolute location error against surveyed positions

pub mod config;
pub mod consts;
pub mod error;
pub mod fit;
pub mod geolocation;
pub mod locate;
pub mod patch;
pub mod resample;
pub mod spectral;

pub use config::{CalvalConfig, Detection, InterpolationMethod, Normalization};
pub use error::{CalvalError, Result};
pub use fit::{locate_peak, FitModel, PeakLocation, PeakSamples, SearchWindow};
pub use locate::{TargetFix, TargetLocator};
pub use patch::ImagePatch;
pub use resample::{resample_correction_layer, resample_to_shape, CorrectionGrid};
pub use spectral::{oversample, oversample_array};
