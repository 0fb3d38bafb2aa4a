//! Domain sizing utilities
//!
//! Converts world extents to cell counts and picks FFT lengths with enough
//! margin for the coupling window on both sides of a line.

/// Round up to the nearest power of 2
pub fn next_power_of_2(n: usize) -> usize {
    if n == 0 {
        return 1;
    }
    if n.is_power_of_two() {
        return n;
    }
    1 << (usize::BITS - (n - 1).leading_zeros())
}

/// FFT length for a line of `primary_dimension` cells
///
/// The pressure grid is staggered, hence the `+ 1`.
///
/// # Example
/// ```
/// use pstd::utilities::domain_sizing::fft_length;
///
/// // 2 * 32 + 10 + 1 = 75 -> 128
/// assert_eq!(fft_length(32, 10), 128);
/// ```
pub fn fft_length(wave_length: usize, primary_dimension: usize) -> usize {
    next_power_of_2(2 * wave_length + primary_dimension + 1)
}

/// Number of whole cells spanned by a world distance
pub fn grid_cells(world: f64, dx: f64) -> i64 {
    (world / dx).round() as i64
}

/// First cell and cell count of the world interval `[start, start + length)`
///
/// Both ends are snapped to the grid, so intervals that meet in world space
/// meet on the grid too.
pub fn cell_span(start: f64, length: f64, dx: f64) -> (i64, i64) {
    let first = grid_cells(start, dx);
    let end = grid_cells(start + length, dx);
    (first, end - first)
}
