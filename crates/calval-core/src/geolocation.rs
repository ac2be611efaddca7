//! Absolute location error (ALE) of located point targets against their
//! surveyed map positions.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CalvalError, Result};
use crate::fit::PeakLocation;

/// North-up affine mapping between pixel indices and map coordinates.
///
/// `origin_*` is the outer corner of pixel (0, 0). `pixel_height` is negative
/// for north-up rasters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// From a GDAL-ordered geotransform
    /// `[origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height]`.
    pub fn from_gdal(gt: [f64; 6]) -> Result<Self> {
        if gt[2] != 0.0 || gt[4] != 0.0 {
            return Err(CalvalError::InvalidShape(format!(
                "rotated geotransform ({}, {}) is not supported",
                gt[2], gt[4]
            )));
        }
        if gt[1] == 0.0 || gt[5] == 0.0 {
            return Err(CalvalError::InvalidShape(
                "geotransform has a zero pixel size".to_string(),
            ));
        }
        Ok(Self {
            origin_x: gt[0],
            origin_y: gt[3],
            pixel_width: gt[1],
            pixel_height: gt[5],
        })
    }

    /// Map coordinates of a fractional pixel position; integer indices are
    /// pixel centres.
    pub fn pixel_to_map(&self, row: f64, col: f64) -> MapPoint {
        MapPoint {
            x: self.origin_x + (col + 0.5) * self.pixel_width,
            y: self.origin_y + (row + 0.5) * self.pixel_height,
        }
    }

    /// Inverse of [`pixel_to_map`](Self::pixel_to_map).
    pub fn map_to_pixel(&self, point: MapPoint) -> PeakLocation {
        PeakLocation {
            row: (point.y - self.origin_y) / self.pixel_height - 0.5,
            col: (point.x - self.origin_x) / self.pixel_width - 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
}

/// One reflector: where it was surveyed and where it was found in the image.
#[derive(Clone, Debug)]
pub struct ReflectorFix {
    pub id: String,
    pub surveyed: MapPoint,
    pub located: PeakLocation,
}

/// Geolocation corrections aligned with the raster grid, in map units.
/// A missing layer means no correction along that axis.
#[derive(Clone, Debug, Default)]
pub struct CorrectionLayers {
    pub easting: Option<Array2<f64>>,
    pub northing: Option<Array2<f64>>,
}

impl CorrectionLayers {
    fn lookup(layer: Option<&Array2<f64>>, at: PeakLocation) -> Result<f64> {
        let Some(layer) = layer else {
            return Ok(0.0);
        };
        let (rows, cols) = layer.dim();
        let (r, c) = (at.row.round(), at.col.round());
        if r < 0.0 || c < 0.0 || r >= rows as f64 || c >= cols as f64 || r.is_nan() || c.is_nan() {
            return Err(CalvalError::OutOfRaster {
                row: at.row,
                col: at.col,
                rows,
                cols,
            });
        }
        Ok(layer[[r as usize, c as usize]])
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LocationError {
    pub id: String,
    /// Corrected located minus surveyed easting
    pub easting: f64,
    /// Corrected located minus surveyed northing
    pub northing: f64,
}

/// Absolute location error of one reflector. Corrections are taken at the
/// pixel nearest to the located position and subtracted from it.
pub fn location_error(
    fix: &ReflectorFix,
    transform: &GeoTransform,
    corrections: &CorrectionLayers,
) -> Result<LocationError> {
    let located = transform.pixel_to_map(fix.located.row, fix.located.col);
    let de = CorrectionLayers::lookup(corrections.easting.as_ref(), fix.located)?;
    let dn = CorrectionLayers::lookup(corrections.northing.as_ref(), fix.located)?;

    Ok(LocationError {
        id: fix.id.clone(),
        easting: (located.x - de) - fix.surveyed.x,
        northing: (located.y - dn) - fix.surveyed.y,
    })
}

/// Aggregate ALE statistics over a set of reflectors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub count: usize,
    pub mean_easting: f64,
    pub mean_northing: f64,
    /// Sample standard deviation (zero for a single reflector)
    pub std_easting: f64,
    pub std_northing: f64,
    /// Root mean square of the 2D error magnitude
    pub rmse: f64,
}

impl ErrorSummary {
    /// Summarize finite errors; non-finite ones (e.g. from NaN corrections)
    /// are skipped with a warning.
    pub fn from_errors(errors: &[LocationError]) -> Result<Self> {
        let usable: Vec<&LocationError> = errors
            .iter()
            .filter(|e| {
                let ok = e.easting.is_finite() && e.northing.is_finite();
                if !ok {
                    warn!(id = %e.id, "Skipping reflector with non-finite location error");
                }
                ok
            })
            .collect();
        if usable.is_empty() {
            return Err(CalvalError::EmptyInput);
        }

        let eastings: Vec<f64> = usable.iter().map(|e| e.easting).collect();
        let northings: Vec<f64> = usable.iter().map(|e| e.northing).collect();
        let mean_easting = mean(&eastings);
        let mean_northing = mean(&northings);
        let mean_square = eastings
            .iter()
            .zip(&northings)
            .map(|(e, n)| e * e + n * n)
            .sum::<f64>()
            / eastings.len() as f64;

        Ok(Self {
            count: usable.len(),
            mean_easting,
            mean_northing,
            std_easting: sample_std(&eastings, mean_easting),
            std_northing: sample_std(&northings, mean_northing),
            rmse: mean_square.sqrt(),
        })
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}
