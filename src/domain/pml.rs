//! Absorbing layers along open domain edges
//!
//! An edge that absorbs but is not locally reacting is backed by a perfectly
//! matched layer: a band of cells inside the domain where the field components
//! travelling towards the edge are damped once per frame. The split-field form
//! damps `px0`/`vx0` near left and right edges and `py0`/`vy0` near top and
//! bottom edges.

use crate::domain::field::FieldValues;
use crate::engine::array::FieldArray;
use crate::geometry::{CalcDirection, Direction};
use ndarray::Axis;

/// Per-frame damping factors by depth, outermost cell first
///
/// The damping rate grows with the fourth power of the depth into the layer and
/// reaches `absorption * attenuation` at the edge itself.
pub fn damping_profile(absorption: f64, attenuation: f64, cells: usize, dt: f64) -> Vec<f64> {
    (0..cells)
        .map(|t| {
            let depth = (cells - t) as f64 / cells as f64;
            let sigma = absorption * attenuation * depth.powi(4);
            (-sigma * dt).exp()
        })
        .collect()
}

/// The layer along one edge of a domain
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeDamping {
    pub direction: Direction,
    /// Factors by depth, outermost cell first
    pub profile: Vec<f64>,
    /// Per line along the edge: true where no neighbour continues the field
    pub open: Vec<bool>,
}

impl EdgeDamping {
    /// Damp the components travelling normal to this edge
    pub fn apply(&self, values: &mut FieldValues) {
        let (pressure, velocity) = match self.direction.axis() {
            CalcDirection::X => (&mut values.px0, &mut values.vx0),
            CalcDirection::Y => (&mut values.py0, &mut values.vy0),
        };
        self.damp(pressure);
        self.damp(velocity);
    }

    fn damp(&self, field: &mut FieldArray) {
        let normal = self.direction.axis();
        let length = field.len_of(Axis(normal.index()));
        let far_side = matches!(self.direction, Direction::Right | Direction::Bottom);

        for (t, &factor) in self.profile.iter().enumerate().take(length) {
            let index = if far_side { length - 1 - t } else { t };
            let mut slice = field.index_axis_mut(Axis(normal.index()), index);
            for (value, &open) in slice.iter_mut().zip(&self.open) {
                if open {
                    *value *= factor;
                }
            }
        }
    }
}
