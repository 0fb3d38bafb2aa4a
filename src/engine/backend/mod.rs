//! Compute backend abstraction layer
//!
//! This module provides an abstraction over the FFT and element-wise kernels
//! used by the spectral operators, so an accelerated backend can be dropped in
//! without touching the domain code.

use ndarray::Array2;
use num_complex::Complex;

mod rustfft;

pub use self::rustfft::RustFFTBackend;

/// Trait defining the compute backend interface
pub trait ComputeBackend: Send + Sync {
    /// Perform an in-place 1D forward FFT
    fn fft(&self, data: &mut [Complex<f64>]);

    /// Perform an in-place 1D inverse FFT, normalized by `1 / len`
    fn ifft(&self, data: &mut [Complex<f64>]);

    /// Axpy-style update: `output = a + alpha * b`
    ///
    /// # Arguments
    /// * `a` - Base array
    /// * `alpha` - Scaling factor for `b`
    /// * `b` - Increment array
    /// * `output` - Output array (modified in place)
    fn mix(&self, a: &Array2<f64>, alpha: f64, b: &Array2<f64>, output: &mut Array2<f64>);

    /// Return the name of the backend for debugging/logging
    fn name(&self) -> &'static str;
}

/// Get the default compute backend
pub fn default_backend() -> Box<dyn ComputeBackend> {
    Box::new(RustFFTBackend::new())
}

/// Create a specific backend by name (useful for testing and benchmarking)
pub fn create_backend(name: &str) -> Option<Box<dyn ComputeBackend>> {
    match name {
        "rustfft" => Some(Box::new(RustFFTBackend::new())),
        _ => None,
    }
}
