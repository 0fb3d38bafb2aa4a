//! Wavenumber discretization
//!
//! Builds the discrete wavenumber ladder for a given grid spacing and FFT length,
//! together with the complex factors that turn it into derivative or shift
//! operators. Results are memoized per `(dx, N)`.

use crate::engine::array::Complex64;
use num_traits::Zero;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Wavenumbers and companion factors for one `(dx, N)` key
///
/// Both sequences are in FFT bin order: bin `b` holds `n = b` for `b < N/2`
/// and `n = b - N` otherwise, so together they cover `n ∈ [-N/2, N/2)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Discretization {
    pub dx: f64,
    /// `k_n = 2πn / (N dx)`
    pub wave_numbers: Vec<Complex64>,
    /// `i` for every bin except Nyquist, which is `0`
    pub complex_factors: Vec<Complex64>,
}

impl Discretization {
    /// Compute the discretization from scratch
    pub fn compute(dx: f64, n: usize) -> Self {
        let dk = 2.0 * PI / (n as f64 * dx);
        let half = n / 2;
        let i = Complex64::new(0.0, 1.0);

        let mut wave_numbers = Vec::with_capacity(n);
        let mut complex_factors = Vec::with_capacity(n);
        for bin in 0..n {
            let index = if bin < half {
                bin as f64
            } else {
                bin as f64 - n as f64
            };
            wave_numbers.push(Complex64::new(index * dk, 0.0));
            complex_factors.push(if n > 1 && bin == half {
                Complex64::zero()
            } else {
                i
            });
        }

        Self {
            dx,
            wave_numbers,
            complex_factors,
        }
    }

    /// FFT length
    pub fn len(&self) -> usize {
        self.wave_numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wave_numbers.is_empty()
    }

    /// Per-bin `exp(offset · dx · k · factor)`; `offset` is in cells
    pub fn shift_factors(&self, offset: f64) -> Vec<Complex64> {
        self.wave_numbers
            .iter()
            .zip(&self.complex_factors)
            .map(|(&k, &factor)| (offset * self.dx * k * factor).exp())
            .collect()
    }

    /// Per-bin `k · factor`, the first-derivative operator
    pub fn derivative_factors(&self) -> Vec<Complex64> {
        self.wave_numbers
            .iter()
            .zip(&self.complex_factors)
            .map(|(&k, &factor)| k * factor)
            .collect()
    }
}

/// Memoizing source of [`Discretization`]s
///
/// Reads share a lock; a missing key is computed under the write lock, so two
/// threads racing on the same key publish a single value.
#[derive(Debug, Default)]
pub struct WaveNumberDiscretizer {
    cache: RwLock<HashMap<(u64, usize), Arc<Discretization>>>,
    computations: AtomicUsize,
}

impl WaveNumberDiscretizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discretization for grid spacing `dx` and FFT length `n`
    pub fn get_discretization(&self, dx: f64, n: usize) -> Arc<Discretization> {
        let key = (dx.to_bits(), n);
        if let Some(found) = self.cache.read().get(&key) {
            return Arc::clone(found);
        }

        let mut cache = self.cache.write();
        let entry = cache.entry(key).or_insert_with(|| {
            self.computations.fetch_add(1, Ordering::Relaxed);
            trace!(dx, n, "computing wavenumber discretization");
            Arc::new(Discretization::compute(dx, n))
        });
        Arc::clone(entry)
    }

    /// How many discretizations have actually been computed
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::Relaxed)
    }

    /// Number of cached keys
    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }
}
