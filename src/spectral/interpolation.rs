//! Windowed three-segment spectral operator
//!
//! A line of field values is extended on both sides with a window-tapered mix of
//! the neighbouring line (transmitted part) and the mirrored own line (reflected
//! part), zero-padded to the FFT length, multiplied per wavenumber bin by a set of
//! factors, and transformed back. With shift factors this reconstructs the field
//! at a sub-cell offset; with derivative factors it yields the spatial derivative.

use crate::engine::array::{to_complex_padded, Complex64};
use crate::engine::operations::apply_spectral_factors;
use crate::geometry::CalculationType;
use ndarray::{Array1, ArrayView1};
use std::f64::consts::LN_10;

/// Reflection and transmission weights for one side of a line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coupling {
    /// Weight of the mirrored own values
    pub reflection: f64,
    /// Weight of the neighbour values
    pub transmission: f64,
}

impl Coupling {
    /// Interface between media of density `own_density` and `neighbour_density`
    pub fn interface(quantity: CalculationType, own_density: f64, neighbour_density: f64) -> Self {
        let zn = neighbour_density / own_density;
        let r = (zn - 1.0) / (zn + 1.0);
        match quantity {
            CalculationType::Pressure => Self {
                reflection: r,
                transmission: 1.0 - r,
            },
            CalculationType::Velocity => Self {
                reflection: -r,
                transmission: 1.0 + r,
            },
        }
    }

    /// Simulation edge with absorption coefficient `absorption`
    pub fn edge(quantity: CalculationType, absorption: f64) -> Self {
        let r = (1.0 - absorption).max(0.0).sqrt();
        let reflection = match quantity {
            CalculationType::Pressure => r,
            CalculationType::Velocity => -r,
        };
        Self {
            reflection,
            transmission: 0.0,
        }
    }
}

/// Gaussian taper applied across the padding cells
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    /// `weights[d - 1]` is the weight at distance `d` cells from the line end
    weights: Vec<f64>,
}

impl Window {
    /// `w(d) = exp(-α (d/W)²)` with `α` chosen so `w(W)` is `patch_error` dB down
    pub fn gaussian(size: usize, patch_error: f64) -> Self {
        let alpha = LN_10 * patch_error / 20.0;
        let weights = (1..=size)
            .map(|d| {
                let t = d as f64 / size as f64;
                (-alpha * t * t).exp()
            })
            .collect();
        Self { weights }
    }

    pub fn size(&self) -> usize {
        self.weights.len()
    }

    pub fn weight(&self, distance: usize) -> f64 {
        self.weights[distance - 1]
    }
}

/// Apply `factors` to `own`, extended with its neighbours across both ends
///
/// `before` borders the lowest index of `own`, `after` the highest. A missing
/// neighbour contributes nothing; its side's `Coupling` should be an edge.
/// Returns a line the length of `own`.
pub fn spatderp3(
    before: Option<ArrayView1<'_, f64>>,
    own: ArrayView1<'_, f64>,
    after: Option<ArrayView1<'_, f64>>,
    couplings: [Coupling; 2],
    factors: &[Complex64],
    window: &Window,
) -> Array1<f64> {
    let len = own.len();
    let n = factors.len();
    debug_assert!(n >= len, "FFT length {n} shorter than line {len}");
    let pad = window.size().min(n.saturating_sub(len) / 2);

    let mut line = vec![0.0; len + 2 * pad];
    for d in 1..=pad {
        let w = window.weight(d);

        let neighbour = before
            .as_ref()
            .and_then(|b| b.len().checked_sub(d).map(|i| b[i]))
            .unwrap_or(0.0);
        let mirror = if d <= len { own[d - 1] } else { 0.0 };
        line[pad - d] =
            w * (couplings[0].transmission * neighbour + couplings[0].reflection * mirror);

        let neighbour = after
            .as_ref()
            .and_then(|a| a.get(d - 1).copied())
            .unwrap_or(0.0);
        let mirror = if d <= len { own[len - d] } else { 0.0 };
        line[pad + len + d - 1] =
            w * (couplings[1].transmission * neighbour + couplings[1].reflection * mirror);
    }
    for (slot, &v) in line[pad..pad + len].iter_mut().zip(own.iter()) {
        *slot = v;
    }

    let mut buffer = to_complex_padded(&line, n);
    apply_spectral_factors(&mut buffer, factors);

    buffer[pad..pad + len].iter().map(|c| c.re).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectral::wavenumber::Discretization;
    use approx::assert_abs_diff_eq;
    use ndarray::Array1;
    use std::f64::consts::PI;

    fn edges() -> [Coupling; 2] {
        [
            Coupling::edge(CalculationType::Pressure, 0.0),
            Coupling::edge(CalculationType::Pressure, 0.0),
        ]
    }

    #[test]
    fn test_coupling_equal_density_is_transparent() {
        let c = Coupling::interface(CalculationType::Pressure, 1.2, 1.2);
        assert_abs_diff_eq!(c.reflection, 0.0);
        assert_abs_diff_eq!(c.transmission, 1.0);
        let c = Coupling::interface(CalculationType::Velocity, 1.2, 1.2);
        assert_abs_diff_eq!(c.reflection, 0.0);
        assert_abs_diff_eq!(c.transmission, 1.0);
    }

    #[test]
    fn test_rigid_edge_mirrors() {
        let p = Coupling::edge(CalculationType::Pressure, 0.0);
        let v = Coupling::edge(CalculationType::Velocity, 0.0);
        assert_eq!(p.reflection, 1.0);
        assert_eq!(v.reflection, -1.0);
        assert_eq!(p.transmission, 0.0);
        let absorbing = Coupling::edge(CalculationType::Pressure, 1.0);
        assert_eq!(absorbing.reflection, 0.0);
    }

    #[test]
    fn test_window_tapers_to_patch_error() {
        let w = Window::gaussian(20, 60.0);
        assert_eq!(w.size(), 20);
        assert_abs_diff_eq!(w.weight(20), 1e-3, epsilon = 1e-12);
        assert!(w.weight(1) > w.weight(2));
    }

    #[test]
    fn test_zero_shift_returns_line() {
        let own = Array1::from_iter((0..10).map(|i| (i as f64 * 0.4).cos()));
        let d = Discretization::compute(0.1, 64);
        let out = spatderp3(
            None,
            own.view(),
            None,
            edges(),
            &d.shift_factors(0.0),
            &Window::gaussian(16, 70.0),
        );
        for (a, b) in out.iter().zip(own.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_derivative_of_smooth_line_across_neighbours() {
        // sin(k x) split into three segments; the middle one is differentiated
        let dx = 0.05;
        let k = 2.0 * PI / 1.6;
        let sample = |i: i64| (k * i as f64 * dx).sin();
        let before = Array1::from_iter((-32..0).map(sample));
        let own = Array1::from_iter((0..32).map(sample));
        let after = Array1::from_iter((32..64).map(sample));

        let transparent = Coupling::interface(CalculationType::Pressure, 1.0, 1.0);
        let n = crate::utilities::fft_length(32, own.len());
        let d = Discretization::compute(dx, n);
        let out = spatderp3(
            Some(before.view()),
            own.view(),
            Some(after.view()),
            [transparent, transparent],
            &d.derivative_factors(),
            &Window::gaussian(32, 70.0),
        );

        for (i, value) in out.iter().enumerate().skip(4).take(24) {
            let exact = k * (k * i as f64 * dx).cos();
            assert_abs_diff_eq!(*value, exact, epsilon = 0.05 * k);
        }
    }

    #[test]
    fn test_half_cell_shift_interpolates() {
        let dx = 0.05;
        let k = 2.0 * PI / 2.0;
        let sample = |x: f64| (k * x).cos();
        let before = Array1::from_iter((-32..0).map(|i| sample(i as f64 * dx)));
        let own = Array1::from_iter((0..32).map(|i| sample(i as f64 * dx)));
        let after = Array1::from_iter((32..64).map(|i| sample(i as f64 * dx)));

        let transparent = Coupling::interface(CalculationType::Pressure, 1.0, 1.0);
        let d = Discretization::compute(dx, crate::utilities::fft_length(32, 32));
        let out = spatderp3(
            Some(before.view()),
            own.view(),
            Some(after.view()),
            [transparent, transparent],
            &d.shift_factors(0.5),
            &Window::gaussian(32, 70.0),
        );

        for (i, value) in out.iter().enumerate().skip(4).take(24) {
            assert_abs_diff_eq!(*value, sample((i as f64 + 0.5) * dx), epsilon = 1e-2);
        }
    }
}
