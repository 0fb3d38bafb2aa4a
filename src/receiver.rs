//! Point receivers
//!
//! A receiver samples the pressure at a fixed world location once per call and
//! keeps the history of what it sampled.

use crate::config::{MissingNeighbourPolicy, ReceiverConfig, Settings};
use crate::domain::Domain;
use crate::domain_decomposition::{DomainId, Scene};
use crate::error::{PstdError, Result};
use crate::geometry::{locate_cell, CalcDirection, CalculationType, Direction, GridPoint};
use crate::spectral::spatderp3;
use ndarray::{Array1, Axis};
use std::sync::Arc;
use tracing::debug;

/// How a receiver turns the grid field into a value at its location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationType {
    NearestNeighbour,
    SpectralInterpolation,
}

#[derive(Debug, Clone)]
pub struct Receiver {
    pub id: String,
    /// World location
    pub location: [f64; 3],
    /// Cell containing the location
    pub grid_location: GridPoint,
    /// Fractional position inside the cell, in cells
    pub grid_offset: [f64; 3],
    pub container: DomainId,
    received_values: Vec<f64>,
    settings: Arc<Settings>,
}

impl Receiver {
    /// Place a receiver; fails when its location is outside every domain
    pub fn new(config: &ReceiverConfig, scene: &Scene, settings: Arc<Settings>) -> Result<Self> {
        let (grid_location, grid_offset) = locate_cell(config.location, settings.grid_spacing);
        let container = scene
            .locate(grid_location)
            .ok_or_else(|| PstdError::OutOfBounds {
                kind: "receiver",
                id: config.id.clone(),
                location: config.location,
            })?;

        debug!(receiver = %config.id, ?grid_location, domain = %scene.domain(container).id, "receiver placed");

        Ok(Self {
            id: config.id.clone(),
            location: config.location,
            grid_location,
            grid_offset,
            container,
            received_values: Vec::new(),
            settings,
        })
    }

    pub fn interpolation(&self) -> InterpolationType {
        if self.settings.spectral_interpolation {
            InterpolationType::SpectralInterpolation
        } else {
            InterpolationType::NearestNeighbour
        }
    }

    /// Samples taken so far, oldest first
    pub fn received_values(&self) -> &[f64] {
        &self.received_values
    }

    /// Sample the pressure, append it to the history and return it
    pub fn compute_local_pressure(&mut self, scene: &Scene) -> Result<f64> {
        let pressure = self.sample(scene)?;
        self.record(pressure);
        Ok(pressure)
    }

    /// Pressure at the receiver without touching the history
    pub fn sample(&self, scene: &Scene) -> Result<f64> {
        match self.interpolation() {
            InterpolationType::NearestNeighbour => self.compute_with_nn(scene),
            InterpolationType::SpectralInterpolation => self.compute_with_si(scene),
        }
    }

    /// Append a sample to the history
    pub fn record(&mut self, pressure: f64) {
        self.received_values.push(pressure);
    }

    /// Stored value of the containing cell
    pub fn compute_with_nn(&self, scene: &Scene) -> Result<f64> {
        let domain = scene.domain(self.container);
        let local = self.grid_location - domain.top_left;
        domain
            .pressure_at(local)
            .ok_or_else(|| PstdError::OutOfBounds {
                kind: "receiver",
                id: self.id.clone(),
                location: self.location,
            })
    }

    /// Spectrally interpolated value at the exact location
    ///
    /// Each of the container and its top and bottom neighbours is shifted by the
    /// x-offset along its rows; the columns through the receiver are then joined
    /// and shifted by the y-offset.
    pub fn compute_with_si(&self, scene: &Scene) -> Result<f64> {
        let domain = scene.domain(self.container);

        let mut sides = [None, None];
        for (slot, direction) in sides.iter_mut().zip([Direction::Top, Direction::Bottom]) {
            match domain.neighbour_at(direction, self.location) {
                Some(id) => *slot = Some(scene.domain(id)),
                None => match self.settings.missing_neighbour {
                    MissingNeighbourPolicy::Fail => {
                        return Err(PstdError::MissingNeighbour {
                            receiver: self.id.clone(),
                            direction,
                        })
                    }
                    MissingNeighbourPolicy::NearestNeighbour => {
                        debug!(receiver = %self.id, ?direction, "no neighbour, sampling nearest cell");
                        return self.compute_with_nn(scene);
                    }
                    MissingNeighbourPolicy::Reflect => {}
                },
            }
        }
        let [top, bottom] = sides;

        let own_column = self.shifted_column(scene, domain);
        let top_column = top.map(|d| self.shifted_column(scene, d));
        let bottom_column = bottom.map(|d| self.shifted_column(scene, d));

        let factors = domain
            .discretization(CalcDirection::Y)
            .shift_factors(self.grid_offset[1]);
        let couplings = [
            domain.coupling(Direction::Top, CalculationType::Pressure, top),
            domain.coupling(Direction::Bottom, CalculationType::Pressure, bottom),
        ];

        let shifted = spatderp3(
            top_column.as_ref().map(|c| c.view()),
            own_column.view(),
            bottom_column.as_ref().map(|c| c.view()),
            couplings,
            &factors,
            domain.window(),
        );

        let rel_y = (self.grid_location.y - domain.top_left.y) as usize;
        Ok(shifted[rel_y])
    }

    /// Column of `domain` through the receiver's x, shifted by the x-offset
    fn shifted_column(&self, scene: &Scene, domain: &Domain) -> Array1<f64> {
        let factors = domain
            .discretization(CalcDirection::X)
            .shift_factors(self.grid_offset[0]);
        let field = domain.compute_field(scene, CalcDirection::X, CalculationType::Pressure, &factors);
        let rel_x = (self.grid_location.x - domain.top_left.x) as usize;
        field.index_axis(Axis(0), rel_x).to_owned()
    }
}
