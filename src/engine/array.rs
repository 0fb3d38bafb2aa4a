//! Core array types for field storage
//!
//! Fields are real 2D arrays shaped `(width, height)` and indexed `[x, y]`.

use ndarray::{Array2, ArrayView1, Axis};
use num_complex::Complex;
use num_traits::Zero;

/// Type alias for Complex64
pub type Complex64 = Complex<f64>;

/// A real 2D field indexed `[x, y]`
pub type FieldArray = Array2<f64>;

/// Helpers used on field arrays throughout the kernels
pub trait FieldArrayExt {
    /// `(width, height)`
    fn extent(&self) -> (usize, usize);

    /// True when no element is NaN or infinite
    fn all_finite(&self) -> bool;

    /// Flatten in x-major order, as streamed in frame payloads
    fn to_frame(&self) -> Vec<f64>;

    /// One line of the field along `axis` at position `index` of the other axis
    fn line(&self, axis: usize, index: usize) -> ArrayView1<'_, f64>;
}

impl FieldArrayExt for FieldArray {
    fn extent(&self) -> (usize, usize) {
        self.dim()
    }

    fn all_finite(&self) -> bool {
        self.iter().all(|v| v.is_finite())
    }

    fn to_frame(&self) -> Vec<f64> {
        let (width, height) = self.dim();
        let mut frame = Vec::with_capacity(width * height);
        for x in 0..width {
            for y in 0..height {
                frame.push(self[[x, y]]);
            }
        }
        frame
    }

    fn line(&self, axis: usize, index: usize) -> ArrayView1<'_, f64> {
        // a line along x is a fixed y, i.e. a lane of axis 0
        match axis {
            0 => self.index_axis(Axis(1), index),
            _ => self.index_axis(Axis(0), index),
        }
    }
}

/// Lift a real line into a complex buffer of `len` samples, zero-padded
pub fn to_complex_padded(values: &[f64], len: usize) -> Vec<Complex64> {
    let mut buffer = vec![Complex64::zero(); len];
    for (slot, &v) in buffer.iter_mut().zip(values) {
        *slot = Complex64::new(v, 0.0);
    }
    buffer
}
