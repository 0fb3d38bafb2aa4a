//! Grid lattice coordinates and axis/side enums

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Snap tolerance when converting world coordinates to grid coordinates.
const SNAP_EPSILON: f64 = 1e-9;

/// Integer lattice point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl GridPoint {
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// Component along an axis
    pub fn along(&self, axis: CalcDirection) -> i64 {
        match axis {
            CalcDirection::X => self.x,
            CalcDirection::Y => self.y,
        }
    }
}

impl Add for GridPoint {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for GridPoint {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

/// Convert a world coordinate to continuous grid units, snapping values that are
/// within rounding noise of a lattice line.
pub fn world_to_grid(world: f64, dx: f64) -> f64 {
    let g = world / dx;
    let rounded = g.round();
    if (g - rounded).abs() < SNAP_EPSILON {
        rounded
    } else {
        g
    }
}

/// Split a world location into the containing cell and the fractional offset in cells.
pub fn locate_cell(location: [f64; 3], dx: f64) -> (GridPoint, [f64; 3]) {
    let g = location.map(|w| world_to_grid(w, dx));
    let cell = GridPoint::new(g[0].floor() as i64, g[1].floor() as i64, g[2].floor() as i64);
    let offset = [
        g[0] - cell.x as f64,
        g[1] - cell.y as f64,
        g[2] - cell.z as f64,
    ];
    (cell, offset)
}

/// Side of a domain. `y` grows downward, so `Top` is the smaller-`y` side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Top,
    Bottom,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Bottom,
        Direction::Left,
        Direction::Right,
    ];

    /// Axis the side is normal to
    pub fn axis(self) -> CalcDirection {
        match self {
            Direction::Left | Direction::Right => CalcDirection::X,
            Direction::Top | Direction::Bottom => CalcDirection::Y,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Axis of a spectral operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalcDirection {
    X,
    Y,
}

impl CalcDirection {
    /// The perpendicular axis
    pub fn other(self) -> Self {
        match self {
            CalcDirection::X => CalcDirection::Y,
            CalcDirection::Y => CalcDirection::X,
        }
    }

    /// The (lower-index, higher-index) sides along this axis
    pub fn sides(self) -> (Direction, Direction) {
        match self {
            CalcDirection::X => (Direction::Left, Direction::Right),
            CalcDirection::Y => (Direction::Top, Direction::Bottom),
        }
    }

    /// ndarray axis index for `[x, y]` storage
    pub fn index(self) -> usize {
        match self {
            CalcDirection::X => 0,
            CalcDirection::Y => 1,
        }
    }
}

/// Physical quantity being transformed; sets the reflection sign at interfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalculationType {
    Pressure,
    Velocity,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_point_arithmetic() {
        let a = GridPoint::new(3, -2, 1);
        let b = GridPoint::new(1, 4, 0);
        assert_eq!(a + b, GridPoint::new(4, 2, 1));
        assert_eq!(a - b, GridPoint::new(2, -6, 1));
        assert_eq!(a + b, b + a);
    }

    #[test]
    fn test_locate_cell_snaps_exact_decimals() {
        let (cell, offset) = locate_cell([0.5, 0.5, 0.0], 0.1);
        assert_eq!(cell, GridPoint::new(5, 5, 0));
        assert_eq!(offset, [0.0, 0.0, 0.0]);

        let (cell, offset) = locate_cell([0.25, 0.71, 0.0], 0.1);
        assert_eq!(cell, GridPoint::new(2, 7, 0));
        assert!((offset[0] - 0.5).abs() < 1e-12);
        assert!((offset[1] - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_direction_axes() {
        assert_eq!(Direction::Top.axis(), CalcDirection::Y);
        assert_eq!(Direction::Right.opposite(), Direction::Left);
        assert_eq!(CalcDirection::X.sides(), (Direction::Left, Direction::Right));
        assert_eq!(CalcDirection::Y.other(), CalcDirection::X);
    }

    proptest! {
        #[test]
        fn add_then_sub_is_identity(
            ax in -1_000_000i64..1_000_000, ay in -1_000_000i64..1_000_000, az in -1000i64..1000,
            bx in -1_000_000i64..1_000_000, by in -1_000_000i64..1_000_000, bz in -1000i64..1000,
        ) {
            let a = GridPoint::new(ax, ay, az);
            let b = GridPoint::new(bx, by, bz);
            prop_assert_eq!((a + b) - b, a);
            prop_assert_eq!(a + b, b + a);
        }
    }
}
