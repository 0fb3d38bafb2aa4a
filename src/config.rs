//! Scene configuration: domains, settings, receivers and speakers
//!
//! A [`Configuration`] is what a driver hands to a kernel. It is plain data that
//! can be loaded from JSON and is validated before any run starts.

use crate::error::{PstdError, Result};
use crate::geometry::Direction;
use crate::utilities::cell_span;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// What to do when spectral interpolation needs a neighbour that is not there
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingNeighbourPolicy {
    /// Raise `PstdError::MissingNeighbour`
    #[default]
    Fail,
    /// Use the nearest-neighbour sample for that call
    NearestNeighbour,
    /// Treat the missing side as a simulation edge
    Reflect,
}

/// What to do when a frame produces non-finite field values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstabilityPolicy {
    /// Stop the run and report `PstdError::NumericInstability`
    #[default]
    Abort,
    /// Log a warning and keep going
    Warn,
}

/// Global simulation settings, immutable for the duration of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// World units per grid cell
    pub grid_spacing: f64,
    /// Seconds per frame
    pub time_step: f64,
    /// Total simulated time in seconds
    pub render_time: f64,
    /// Sample receivers with spectral interpolation instead of nearest neighbour
    #[serde(default)]
    pub spectral_interpolation: bool,
    /// Margin in cells used to size FFTs
    #[serde(default = "default_wave_length")]
    pub wave_length: usize,
    /// Cells of neighbour data taken across an interface
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Attenuation in dB at the far end of the coupling window
    #[serde(default = "default_patch_error")]
    pub patch_error: f64,
    /// Sharpness of the speaker Gaussian
    pub band_width: f64,
    #[serde(default = "default_sound_speed")]
    pub sound_speed: f64,
    /// Density of air
    #[serde(default = "default_density")]
    pub density: f64,
    /// Stream field snapshots every n-th frame
    #[serde(default = "default_save_nth_frame")]
    pub save_nth_frame: usize,
    #[serde(default)]
    pub missing_neighbour: MissingNeighbourPolicy,
    #[serde(default)]
    pub instability: InstabilityPolicy,
    /// Seed for the reference kernel's synthetic frames
    #[serde(default)]
    pub seed: u64,
    /// Depth in cells of the absorbing layer behind non-locally-reacting edges
    #[serde(default = "default_pml_cells")]
    pub pml_cells: usize,
    /// Peak damping rate of that layer, in 1/s, for a fully absorbing edge
    #[serde(default = "default_pml_attenuation")]
    pub pml_attenuation: f64,
}

fn default_wave_length() -> usize {
    32
}

fn default_window_size() -> usize {
    32
}

fn default_patch_error() -> f64 {
    70.0
}

fn default_sound_speed() -> f64 {
    340.0
}

fn default_density() -> f64 {
    1.2
}

fn default_save_nth_frame() -> usize {
    1
}

fn default_pml_cells() -> usize {
    10
}

fn default_pml_attenuation() -> f64 {
    20000.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_spacing: 0.2,
            time_step: 0.2 * 0.5 / 340.0,
            render_time: 0.05,
            spectral_interpolation: false,
            wave_length: default_wave_length(),
            window_size: default_window_size(),
            patch_error: default_patch_error(),
            band_width: 5.0,
            sound_speed: default_sound_speed(),
            density: default_density(),
            save_nth_frame: default_save_nth_frame(),
            missing_neighbour: MissingNeighbourPolicy::default(),
            instability: InstabilityPolicy::default(),
            seed: 0,
            pml_cells: default_pml_cells(),
            pml_attenuation: default_pml_attenuation(),
        }
    }
}

impl Settings {
    /// Number of frames: `floor(render_time / time_step)`
    pub fn frame_count(&self) -> usize {
        // the epsilon keeps 0.01 / 0.001 at 10 rather than 9
        (self.render_time / self.time_step + 1e-9).floor() as usize
    }

    /// Whether frame `frame` streams snapshots
    pub fn should_write(&self, frame: usize) -> bool {
        frame % self.save_nth_frame == 0
    }
}

/// Absorption and reaction of one domain edge
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EdgeConfig {
    /// Absorption coefficient in `[0, 1]`
    #[serde(default)]
    pub absorption: f64,
    /// Reflect with `sqrt(1 - absorption)` at the edge itself; otherwise the
    /// edge is rigid and absorption happens in a damping layer behind it
    #[serde(default)]
    pub locally_reacting: bool,
}

impl EdgeConfig {
    /// Whether this edge is backed by a damping layer
    pub fn has_pml(&self) -> bool {
        !self.locally_reacting && self.absorption > 0.0
    }
}

/// Per-side edge parameters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EdgesConfig {
    #[serde(default)]
    pub top: EdgeConfig,
    #[serde(default)]
    pub bottom: EdgeConfig,
    #[serde(default)]
    pub left: EdgeConfig,
    #[serde(default)]
    pub right: EdgeConfig,
}

impl EdgesConfig {
    pub fn side(&self, direction: Direction) -> EdgeConfig {
        match direction {
            Direction::Top => self.top,
            Direction::Bottom => self.bottom,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }
}

/// One rectangular domain in world units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainConfig {
    pub id: String,
    /// Top-left corner `[x, y]`
    pub top_left: [f64; 2],
    /// `[width, height]`
    pub size: [f64; 2],
    #[serde(default)]
    pub edges: EdgesConfig,
    /// Overrides `Settings::density` for this domain
    #[serde(default)]
    pub density: Option<f64>,
}

impl DomainConfig {
    /// Top-left cell and `[width, height]` in cells, at least one per axis
    pub fn grid_extent(&self, dx: f64) -> ([i64; 2], [i64; 2]) {
        let (x0, width) = cell_span(self.top_left[0], self.size[0], dx);
        let (y0, height) = cell_span(self.top_left[1], self.size[1], dx);
        ([x0, y0], [width.max(1), height.max(1)])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiverConfig {
    pub id: String,
    pub location: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerConfig {
    pub location: [f64; 3],
}

/// Everything a kernel needs to run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub settings: Settings,
    pub domains: Vec<DomainConfig>,
    #[serde(default)]
    pub receivers: Vec<ReceiverConfig>,
    #[serde(default)]
    pub speakers: Vec<SpeakerConfig>,
}

impl Configuration {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check everything that can be checked without building domains
    pub fn validate(&self) -> Result<()> {
        let s = &self.settings;
        require(s.grid_spacing > 0.0, "grid_spacing must be positive")?;
        require(s.time_step > 0.0, "time_step must be positive")?;
        require(s.render_time >= 0.0, "render_time must not be negative")?;
        require(s.band_width > 0.0, "band_width must be positive")?;
        require(s.sound_speed > 0.0, "sound_speed must be positive")?;
        require(s.density > 0.0, "density must be positive")?;
        require(s.patch_error > 0.0, "patch_error must be positive")?;
        require(s.save_nth_frame > 0, "save_nth_frame must be at least 1")?;
        require(
            s.pml_attenuation >= 0.0,
            "pml_attenuation must not be negative",
        )?;
        require(
            s.window_size <= s.wave_length,
            "window_size must not exceed wave_length",
        )?;
        require(!self.domains.is_empty(), "at least one domain is required")?;

        let mut ids = HashSet::new();
        for domain in &self.domains {
            require(
                ids.insert(domain.id.as_str()),
                &format!("duplicate domain id '{}'", domain.id),
            )?;
            require(
                domain.size[0] > 0.0 && domain.size[1] > 0.0,
                &format!("domain '{}' must have a positive size", domain.id),
            )?;
            let cells = [
                cell_span(domain.top_left[0], domain.size[0], s.grid_spacing).1,
                cell_span(domain.top_left[1], domain.size[1], s.grid_spacing).1,
            ];
            require(
                cells[0] >= 1 && cells[1] >= 1,
                &format!("domain '{}' is smaller than one grid cell", domain.id),
            )?;
            if let Some(rho) = domain.density {
                require(
                    rho > 0.0,
                    &format!("domain '{}' density must be positive", domain.id),
                )?;
            }
            for edge in [
                domain.edges.top,
                domain.edges.bottom,
                domain.edges.left,
                domain.edges.right,
            ] {
                require(
                    (0.0..=1.0).contains(&edge.absorption),
                    &format!("domain '{}' absorption must be within [0, 1]", domain.id),
                )?;
            }
        }

        let mut receiver_ids = HashSet::new();
        for receiver in &self.receivers {
            require(
                receiver_ids.insert(receiver.id.as_str()),
                &format!("duplicate receiver id '{}'", receiver.id),
            )?;
        }

        Ok(())
    }
}

fn require(condition: bool, message: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(PstdError::InvalidConfiguration(message.to_string()))
    }
}
