//! Utility functions for grid and FFT sizing

pub mod domain_sizing;

pub use domain_sizing::{cell_span, fft_length, grid_cells, next_power_of_2};
