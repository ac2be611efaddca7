pub mod fft;
pub mod oversample;

pub use oversample::{oversample, oversample_array};
