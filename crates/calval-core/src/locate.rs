//! Point-target localization on an image chip: oversample, detect, fit.
//!
//! The chip is expected to be cropped around the approximate target
//! position already.

use tracing::{debug, info};

use crate::config::LocatorConfig;
use crate::error::{CalvalError, Result};
use crate::fit::{locate_peak, FitReport, PeakLocation, PeakSamples, SearchWindow};
use crate::patch::ImagePatch;
use crate::spectral::oversample;

/// Result of locating one target.
#[derive(Clone, Debug)]
pub struct TargetFix {
    /// Fitted sub-pixel position, in the chip's axis units
    pub location: PeakLocation,
    /// Position of the largest oversampled sample
    pub raw_peak: PeakLocation,
    pub peak_value: f64,
    pub report: FitReport,
}

#[derive(Clone, Debug, Default)]
pub struct TargetLocator {
    config: LocatorConfig,
}

impl TargetLocator {
    pub fn new(config: LocatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Oversample `chip`, convert it to the configured detection, and fit
    /// the configured model around the brightest sample.
    pub fn locate(&self, chip: &ImagePatch, window: &SearchWindow) -> Result<TargetFix> {
        let fine = oversample(chip, &self.config.oversample)?;
        let detected = fine.detect(self.config.detection);

        let rows = fine.rows.to_vec();
        let cols = fine.cols.to_vec();
        let mut samples = PeakSamples::from_grid(detected.view(), &rows, &cols)?;

        let model = self.config.fit.model;
        let peak_index = samples.argmax().ok_or(CalvalError::InsufficientSamples {
            required: model.n_params(),
            available: 0,
        })?;
        let raw_peak = PeakLocation {
            row: samples.y()[peak_index],
            col: samples.x()[peak_index],
        };
        let peak_value = samples.z()[peak_index];

        if let Some(radius) = self.config.fit.fit_radius {
            samples = samples.within_radius(raw_peak.col, raw_peak.row, radius);
            debug!(radius, kept = samples.len(), "Fit samples restricted around raw peak");
        }

        let fit = locate_peak(&samples, window, model, &self.config.fit.solver)?;

        info!(
            model = %model,
            factor = self.config.oversample.factor,
            row = fit.location.row,
            col = fit.location.col,
            "Target located"
        );

        Ok(TargetFix {
            location: fit.location,
            raw_peak,
            peak_value,
            report: FitReport {
                params: fit.params,
                cost: fit.cost,
                iterations: fit.iterations,
            },
        })
    }
}
