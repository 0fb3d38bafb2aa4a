//! Spectral discretization and the neighbour-coupled line operator

pub mod interpolation;
pub mod wavenumber;

pub use interpolation::{spatderp3, Coupling, Window};
pub use wavenumber::{Discretization, WaveNumberDiscretizer};
