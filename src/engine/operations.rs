//! Array operations for the spectral kernels
//!
//! This module provides high-level operations that dispatch to the global
//! compute backend.

use crate::engine::array::{Complex64, FieldArray};
use crate::engine::backend::{default_backend, ComputeBackend};
use once_cell::sync::Lazy;
use std::sync::Arc;

// Global backend instance (thread-safe, initialized once)
static BACKEND: Lazy<Arc<Box<dyn ComputeBackend>>> = Lazy::new(|| Arc::new(default_backend()));

/// Name of the active backend
pub fn backend_name() -> &'static str {
    BACKEND.name()
}

/// In-place 1D forward FFT
pub fn fft(data: &mut [Complex64]) {
    BACKEND.fft(data);
}

/// In-place normalized 1D inverse FFT
pub fn ifft(data: &mut [Complex64]) {
    BACKEND.ifft(data);
}

/// `out = a + alpha * b`
pub fn mix(a: &FieldArray, alpha: f64, b: &FieldArray, out: &mut FieldArray) {
    BACKEND.mix(a, alpha, b, out);
}

/// Transform `buffer` to the wavenumber domain, multiply bin `n` by `factors[n]`,
/// and transform back.
///
/// `factors` must have the same length as `buffer`.
pub fn apply_spectral_factors(buffer: &mut [Complex64], factors: &[Complex64]) {
    debug_assert_eq!(buffer.len(), factors.len());
    fft(buffer);
    for (value, factor) in buffer.iter_mut().zip(factors) {
        *value *= factor;
    }
    ifft(buffer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_unit_factors_are_identity() {
        let original: Vec<Complex64> = (0..8).map(|i| Complex64::new(i as f64, 0.0)).collect();
        let mut buffer = original.clone();
        let factors = vec![Complex64::new(1.0, 0.0); 8];

        apply_spectral_factors(&mut buffer, &factors);

        for (a, b) in buffer.iter().zip(original.iter()) {
            assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-12);
            assert_abs_diff_eq!(a.im, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_mix_operation() {
        let a = FieldArray::from_elem((2, 2), 1.0);
        let b = FieldArray::from_elem((2, 2), 2.0);
        let mut out = FieldArray::zeros((2, 2));

        mix(&a, 3.0, &b, &mut out);

        assert_eq!(out[[0, 0]], 7.0);
        assert_eq!(backend_name(), "rustfft");
    }
}
