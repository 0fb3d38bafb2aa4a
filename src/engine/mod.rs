//! Engine module containing array helpers and FFT-backed operations

pub mod array;
pub mod backend;
pub mod operations;

pub use array::{Complex64, FieldArray, FieldArrayExt};
pub use operations::*;
