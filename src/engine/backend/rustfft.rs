//! RustFFT backend implementation
//!
//! Pure Rust implementation using the rustfft library.
//! This backend is available on all platforms.

use super::ComputeBackend;
use ndarray::{Array2, Zip};
use num_complex::Complex;
use parking_lot::Mutex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// RustFFT-based compute backend
///
/// One planner is shared by all threads; it caches plans per length, so the
/// lock is only held while a plan is looked up.
pub struct RustFFTBackend {
    planner: Mutex<FftPlanner<f64>>,
}

impl RustFFTBackend {
    /// Create a new RustFFT backend
    pub fn new() -> Self {
        Self {
            planner: Mutex::new(FftPlanner::new()),
        }
    }

    fn forward(&self, len: usize) -> Arc<dyn Fft<f64>> {
        self.planner.lock().plan_fft_forward(len)
    }

    fn inverse(&self, len: usize) -> Arc<dyn Fft<f64>> {
        self.planner.lock().plan_fft_inverse(len)
    }
}

impl Default for RustFFTBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeBackend for RustFFTBackend {
    fn fft(&self, data: &mut [Complex<f64>]) {
        if data.is_empty() {
            return;
        }
        self.forward(data.len()).process(data);
    }

    fn ifft(&self, data: &mut [Complex<f64>]) {
        if data.is_empty() {
            return;
        }
        self.inverse(data.len()).process(data);

        let normalization = 1.0 / data.len() as f64;
        for val in data.iter_mut() {
            *val *= normalization;
        }
    }

    fn mix(&self, a: &Array2<f64>, alpha: f64, b: &Array2<f64>, output: &mut Array2<f64>) {
        Zip::from(output)
            .and(a)
            .and(b)
            .for_each(|o, &a_val, &b_val| *o = a_val + alpha * b_val);
    }

    fn name(&self) -> &'static str {
        "rustfft"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_fft_roundtrip() {
        let backend = RustFFTBackend::new();
        let input: Vec<Complex<f64>> = (0..16)
            .map(|i| Complex::new((i as f64 * 0.3).sin(), 0.0))
            .collect();

        let mut data = input.clone();
        backend.fft(&mut data);
        backend.ifft(&mut data);

        for (a, b) in data.iter().zip(input.iter()) {
            assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-12);
            assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_fft_of_impulse_is_flat() {
        let backend = RustFFTBackend::new();
        let mut data = vec![Complex::new(0.0, 0.0); 8];
        data[0] = Complex::new(1.0, 0.0);
        backend.fft(&mut data);
        for val in &data {
            assert_abs_diff_eq!(val.re, 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(val.im, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_mix_operation() {
        let backend = RustFFTBackend::new();
        let a = Array2::<f64>::from_elem((2, 2), 1.0);
        let b = Array2::<f64>::from_elem((2, 2), 2.0);
        let mut output = Array2::<f64>::zeros((2, 2));

        backend.mix(&a, -0.5, &b, &mut output);

        assert_eq!(output[[0, 0]], 0.0);
        assert_eq!(output[[1, 1]], 0.0);
    }
}
