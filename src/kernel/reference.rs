//! Reference kernel
//!
//! Runs the full event protocol without any physics. Each frame every domain is
//! filled with values drawn from a generator seeded with `Settings::seed`, so two
//! runs of the same configuration stream identical payloads.

use super::{
    run_protocol, FrameSource, KernelCallback, KernelState, PstdKernel, RunOutcome,
    SimulationMetadata,
};
use crate::config::Configuration;
use crate::error::{PstdError, Result};
use rand::prelude::*;
use tracing::debug;

#[derive(Debug, Default)]
pub struct ReferenceKernel {
    config: Option<Configuration>,
    state: KernelState,
}

impl ReferenceKernel {
    pub fn new() -> Self {
        Self::default()
    }
}

struct SyntheticFrames {
    ids: Vec<String>,
    cells: Vec<usize>,
    rng: StdRng,
    current: Vec<Vec<f64>>,
}

impl SyntheticFrames {
    fn new(config: &Configuration) -> Self {
        let metadata = SimulationMetadata::derive(config);
        let cells: Vec<usize> = metadata
            .domain_extents
            .iter()
            .map(|[w, h, _]| w * h)
            .collect();
        Self {
            ids: config.domains.iter().map(|d| d.id.clone()).collect(),
            current: cells.iter().map(|&n| vec![0.0; n]).collect(),
            cells,
            rng: StdRng::seed_from_u64(config.settings.seed),
        }
    }
}

impl FrameSource for SyntheticFrames {
    fn domain_ids(&self) -> Vec<String> {
        self.ids.clone()
    }

    fn advance(&mut self, _frame: usize) -> Result<()> {
        for (values, &n) in self.current.iter_mut().zip(&self.cells) {
            values.clear();
            values.extend((0..n).map(|_| self.rng.gen::<f64>()));
        }
        Ok(())
    }

    fn snapshot(&self, index: usize) -> Vec<f64> {
        self.current[index].clone()
    }
}

impl PstdKernel for ReferenceKernel {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn state(&self) -> KernelState {
        self.state
    }

    fn start_kernel(&mut self, config: Configuration) -> Result<()> {
        *self = Self::default();
        config.validate()?;
        debug!(domains = config.domains.len(), "reference kernel configured");
        self.config = Some(config);
        self.state = KernelState::Configured;
        Ok(())
    }

    fn get_metadata(&self) -> Result<SimulationMetadata> {
        self.config
            .as_ref()
            .map(SimulationMetadata::derive)
            .ok_or(PstdError::NotConfigured)
    }

    fn run(&mut self, callback: &mut dyn KernelCallback) -> Result<RunOutcome> {
        let config = self.config.as_ref().ok_or(PstdError::NotConfigured)?;
        let mut frames = SyntheticFrames::new(config);

        self.state = KernelState::Running;
        let outcome = run_protocol(&mut frames, &config.settings, callback);
        self.state = KernelState::Finished;
        outcome
    }
}
