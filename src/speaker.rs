//! Point sources
//!
//! A speaker adds a Gaussian pressure pulse centred on its location to a domain's
//! field. The pulse is also split into the directional pressure components; how
//! that split is made is a [`DirectionalSplit`] policy.

use crate::config::{Settings, SpeakerConfig};
use crate::domain::Domain;
use crate::domain_decomposition::{DomainId, Scene};
use crate::error::{PstdError, Result};
use crate::geometry::{locate_cell, GridPoint};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

/// Divides an injected pressure value between `px0` and `py0`
///
/// `dx` and `dy` are the world offsets of the cell from the speaker. The two
/// returned parts must add up to `pressure`.
pub trait DirectionalSplit: Send + Sync + Debug {
    fn split(&self, pressure: f64, dx: f64, dy: f64) -> (f64, f64);
}

/// Everything goes into the horizontal component
#[derive(Debug, Clone, Copy, Default)]
pub struct HorizontalOnly;

impl DirectionalSplit for HorizontalOnly {
    fn split(&self, pressure: f64, _dx: f64, _dy: f64) -> (f64, f64) {
        (pressure, 0.0)
    }
}

/// `cos²θ` horizontal and `sin²θ` vertical, with `θ` the angle from the speaker
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredAngle;

impl DirectionalSplit for SquaredAngle {
    fn split(&self, pressure: f64, dx: f64, dy: f64) -> (f64, f64) {
        let angle = dy.atan2(dx);
        let horizontal = pressure * angle.cos().powi(2);
        (horizontal, pressure - horizontal)
    }
}

#[derive(Debug, Clone)]
pub struct Speaker {
    /// World location
    pub location: [f64; 3],
    pub grid_location: GridPoint,
    /// Domain the speaker stands in
    pub container: DomainId,
    split: Arc<dyn DirectionalSplit>,
    settings: Arc<Settings>,
}

impl Speaker {
    /// Place a speaker with the default [`HorizontalOnly`] split
    pub fn new(config: &SpeakerConfig, scene: &Scene, settings: Arc<Settings>) -> Result<Self> {
        Self::with_split(config, scene, settings, Arc::new(HorizontalOnly))
    }

    pub fn with_split(
        config: &SpeakerConfig,
        scene: &Scene,
        settings: Arc<Settings>,
        split: Arc<dyn DirectionalSplit>,
    ) -> Result<Self> {
        let (grid_location, _) = locate_cell(config.location, settings.grid_spacing);
        let container = scene
            .locate(grid_location)
            .ok_or_else(|| PstdError::OutOfBounds {
                kind: "speaker",
                id: format!("{:?}", config.location),
                location: config.location,
            })?;

        debug!(?grid_location, domain = %scene.domain(container).id, ?split, "speaker placed");

        Ok(Self {
            location: config.location,
            grid_location,
            container,
            split,
            settings,
        })
    }

    /// Pulse value at world distance `distance`: `exp(-band_width · distance²)`
    pub fn contribution(&self, distance: f64) -> f64 {
        (-self.settings.band_width * distance * distance).exp()
    }

    /// Add the pulse to every cell of `domain`
    ///
    /// Cells sit at `cell · dx` in world units. Calling this twice adds the pulse
    /// twice.
    pub fn inject_into(&self, domain: &mut Domain) {
        let dx = self.settings.grid_spacing;
        let [sx, sy, _] = self.location;
        domain.inject(|cell| {
            let offset_x = cell.x as f64 * dx - sx;
            let offset_y = cell.y as f64 * dx - sy;
            let pressure = self.contribution(offset_x.hypot(offset_y));
            let (horizontal, vertical) = self.split.split(pressure, offset_x, offset_y);
            (pressure, horizontal, vertical)
        });
    }
}
