//! Per-domain field storage

use crate::engine::array::FieldArray;
use crate::geometry::{CalcDirection, CalculationType};

/// Pressure and velocity arrays of one domain, all shaped `(width, height)`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValues {
    /// Total pressure, `px0 + py0`
    pub p0: FieldArray,
    /// Pressure component driven by the x-velocity divergence
    pub px0: FieldArray,
    /// Pressure component driven by the y-velocity divergence
    pub py0: FieldArray,
    /// Particle velocity along x
    pub vx0: FieldArray,
    /// Particle velocity along y
    pub vy0: FieldArray,
}

impl FieldValues {
    pub fn zeros(extent: (usize, usize)) -> Self {
        Self {
            p0: FieldArray::zeros(extent),
            px0: FieldArray::zeros(extent),
            py0: FieldArray::zeros(extent),
            vx0: FieldArray::zeros(extent),
            vy0: FieldArray::zeros(extent),
        }
    }

    pub fn extent(&self) -> (usize, usize) {
        self.p0.dim()
    }

    /// The array a spectral operation along `axis` reads for `quantity`
    pub fn get(&self, quantity: CalculationType, axis: CalcDirection) -> &FieldArray {
        match (quantity, axis) {
            (CalculationType::Pressure, _) => &self.p0,
            (CalculationType::Velocity, CalcDirection::X) => &self.vx0,
            (CalculationType::Velocity, CalcDirection::Y) => &self.vy0,
        }
    }

    /// Recompute `p0` from its components
    pub fn sum_pressure(&mut self) {
        self.p0 = &self.px0 + &self.py0;
    }

    /// Every array has the given extent
    pub fn has_extent(&self, extent: (usize, usize)) -> bool {
        [&self.p0, &self.px0, &self.py0, &self.vx0, &self.vy0]
            .iter()
            .all(|a| a.dim() == extent)
    }
}
