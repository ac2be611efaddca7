use ndarray::{Array1, Array2, ArrayD, ArrayView2, Ix2};
use num_complex::{Complex, Complex64};
use num_traits::ToPrimitive;

use crate::config::Detection;
use crate::error::{CalvalError, Result};

/// Element types accepted as image samples. Real samples are promoted to
/// complex with a zero imaginary part.
pub trait Sample: Copy {
    fn to_complex(self) -> Complex64;
}

macro_rules! impl_real_sample {
    ($($t:ty),*) => {
        $(
            impl Sample for $t {
                fn to_complex(self) -> Complex64 {
                    Complex64::new(self.to_f64().unwrap_or(f64::NAN), 0.0)
                }
            }
        )*
    };
}

impl_real_sample!(f32, f64, u8, u16, i16, i32);

impl Sample for Complex<f32> {
    fn to_complex(self) -> Complex64 {
        Complex64::new(self.re as f64, self.im as f64)
    }
}

impl Sample for Complex<f64> {
    fn to_complex(self) -> Complex64 {
        self
    }
}

/// A 2D chip of (possibly complex) samples with a coordinate for every row
/// and column.
#[derive(Clone, Debug)]
pub struct ImagePatch {
    /// Samples, shape = (rows, cols)
    pub data: Array2<Complex64>,
    /// Row (y) coordinate of each sample row
    pub rows: Array1<f64>,
    /// Column (x) coordinate of each sample column
    pub cols: Array1<f64>,
}

impl ImagePatch {
    /// Build a patch, checking that it is non-empty, finite, and that the
    /// axes match the data shape.
    pub fn new(data: Array2<Complex64>, rows: Array1<f64>, cols: Array1<f64>) -> Result<Self> {
        let (h, w) = data.dim();
        if h == 0 || w == 0 {
            return Err(CalvalError::InvalidShape(format!("empty {h}x{w} patch")));
        }
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
        if data.iter().any(|v| !v.re.is_finite() || !v.im.is_finite())
            || rows.iter().chain(cols.iter()).any(|c| !c.is_finite())
        {
            return Err(CalvalError::NonFiniteSample);
        }

        Ok(Self { data, rows, cols })
    }

    /// Patch whose axes are the integer pixel indices.
    pub fn from_pixels(data: Array2<Complex64>) -> Result<Self> {
        let (h, w) = data.dim();
        Self::new(data, pixel_axis(h), pixel_axis(w))
    }

    /// Promote any real or complex array, with optional explicit axes.
    pub fn from_samples<T: Sample>(
        data: ArrayView2<'_, T>,
        rows: Option<&[f64]>,
        cols: Option<&[f64]>,
    ) -> Result<Self> {
        let (h, w) = data.dim();
        let rows = rows.map_or_else(|| pixel_axis(h), |r| Array1::from(r.to_vec()));
        let cols = cols.map_or_else(|| pixel_axis(w), |c| Array1::from(c.to_vec()));
        Self::new(data.mapv(|v| v.to_complex()), rows, cols)
    }

    /// Accept an array of unknown dimensionality; anything but 2D is rejected.
    pub fn from_dyn<T: Sample>(data: ArrayD<T>) -> Result<Self> {
        let ndim = data.ndim();
        let data = data
            .into_dimensionality::<Ix2>()
            .map_err(|_| CalvalError::InvalidShape(format!("expected 2D samples, got {ndim}D")))?;
        Self::from_samples(data.view(), None, None)
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Convert the complex samples into the real quantity used for peak fitting.
    pub fn detect(&self, detection: Detection) -> Array2<f64> {
        match detection {
            Detection::Amplitude => self.data.mapv(|v| v.norm()),
            Detection::Intensity => self.data.mapv(|v| v.norm_sqr()),
            Detection::Real => self.data.mapv(|v| v.re),
        }
    }
}

/// `[0, 1, ..., n-1]` as coordinates.
pub fn pixel_axis(n: usize) -> Array1<f64> {
    Array1::from_iter((0..n).map(|i| i as f64))
}
