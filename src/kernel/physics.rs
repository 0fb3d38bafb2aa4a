//! Physics kernel
//!
//! Linear acoustics on a collocated grid, integrated with a six-stage
//! low-storage Runge-Kutta scheme. Spatial derivatives are taken spectrally per
//! line, coupled across domain interfaces by the windowed operator. Each stage
//! first computes every domain's derivatives from settled state and only then
//! updates the domains, so no domain reads a half-updated neighbour.

use super::{
    run_protocol, FrameSource, KernelCallback, KernelState, PstdKernel, RunOutcome,
    SimulationMetadata,
};
use crate::config::{Configuration, InstabilityPolicy, Settings};
use crate::domain_decomposition::Scene;
use crate::engine::array::FieldArrayExt;
use crate::error::{PstdError, Result};
use crate::receiver::Receiver;
use crate::speaker::Speaker;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, warn};

/// Stage coefficients of the low-storage Runge-Kutta scheme
pub const RK_COEFFICIENTS: [f64; 6] = [1.0 / 6.0, 1.0 / 5.0, 1.0 / 4.0, 1.0 / 3.0, 1.0 / 2.0, 1.0];

/// A bound scene with its receivers and speakers, ready to step
#[derive(Debug)]
pub struct Simulation {
    scene: Scene,
    receivers: Vec<Receiver>,
    speakers: Vec<Speaker>,
    settings: Arc<Settings>,
}

impl Simulation {
    /// Build the scene, place receivers and speakers, and inject the initial pulse
    pub fn build(config: &Configuration) -> Result<Self> {
        config.validate()?;
        let settings = Arc::new(config.settings.clone());
        let mut scene = Scene::new(&config.domains, Arc::clone(&settings))?;

        let receivers = config
            .receivers
            .iter()
            .map(|r| Receiver::new(r, &scene, Arc::clone(&settings)))
            .collect::<Result<Vec<_>>>()?;
        let speakers = config
            .speakers
            .iter()
            .map(|s| Speaker::new(s, &scene, Arc::clone(&settings)))
            .collect::<Result<Vec<_>>>()?;

        for speaker in &speakers {
            scene
                .domains_mut()
                .par_iter_mut()
                .for_each(|domain| speaker.inject_into(domain));
        }

        debug!(
            domains = scene.len(),
            receivers = receivers.len(),
            speakers = speakers.len(),
            "simulation built"
        );

        Ok(Self {
            scene,
            receivers,
            speakers,
            settings,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn receivers(&self) -> &[Receiver] {
        &self.receivers
    }

    pub fn speakers(&self) -> &[Speaker] {
        &self.speakers
    }

    /// Advance one time step, damp absorbing layers, sample receivers and
    /// check the field
    ///
    /// Receivers record frame `frame` only when every one of them sampled it.
    pub fn step(&mut self, frame: usize) -> Result<()> {
        let dt = self.settings.time_step;

        self.scene
            .domains_mut()
            .par_iter_mut()
            .for_each(|domain| domain.push_values());

        for alpha in RK_COEFFICIENTS {
            let scene = &self.scene;
            let derivatives = scene.par_map(|domain| domain.spatial_derivatives(scene));
            self.scene.par_update(&derivatives, |domain, d| {
                domain.apply_stage(d, dt * alpha)
            });
        }

        self.scene.apply_damping();

        let scene = &self.scene;
        let samples = self
            .receivers
            .par_iter()
            .map(|receiver| receiver.sample(scene))
            .collect::<Result<Vec<f64>>>()?;
        for (receiver, pressure) in self.receivers.iter_mut().zip(samples) {
            receiver.record(pressure);
        }

        self.check_stability(frame)
    }

    fn check_stability(&self, frame: usize) -> Result<()> {
        for domain in self.scene.domains() {
            if domain.is_finite() {
                continue;
            }
            match self.settings.instability {
                InstabilityPolicy::Abort => {
                    return Err(PstdError::NumericInstability {
                        frame,
                        domain: domain.id.clone(),
                    })
                }
                InstabilityPolicy::Warn => {
                    warn!(frame, domain = %domain.id, "non-finite field values");
                }
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }
}

impl FrameSource for Simulation {
    fn domain_ids(&self) -> Vec<String> {
        self.scene.domains().iter().map(|d| d.id.clone()).collect()
    }

    fn advance(&mut self, frame: usize) -> Result<()> {
        self.step(frame)
    }

    fn snapshot(&self, index: usize) -> Vec<f64> {
        self.scene.domains()[index].values().p0.to_frame()
    }
}

#[derive(Debug, Default)]
pub struct PhysicsKernel {
    config: Option<Configuration>,
    simulation: Option<Simulation>,
    state: KernelState,
}

impl PhysicsKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receivers of the last bound or run simulation, with their histories
    pub fn receivers(&self) -> &[Receiver] {
        self.simulation
            .as_ref()
            .map(Simulation::receivers)
            .unwrap_or(&[])
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.simulation.as_ref()
    }
}

impl PstdKernel for PhysicsKernel {
    fn name(&self) -> &'static str {
        "physics"
    }

    fn state(&self) -> KernelState {
        self.state
    }

    fn start_kernel(&mut self, config: Configuration) -> Result<()> {
        // a rejected configuration must not leave the previous one bound
        *self = Self::default();
        // building surfaces overlap and placement errors before any run
        let simulation = Simulation::build(&config)?;
        self.simulation = Some(simulation);
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
        if self.state == KernelState::Finished {
            self.simulation = Some(Simulation::build(config)?);
        }
        let simulation = match self.simulation.as_mut() {
            Some(simulation) => simulation,
            None => return Err(PstdError::NotConfigured),
        };

        self.state = KernelState::Running;
        let outcome = run_protocol(simulation, &config.settings, callback);
        self.state = KernelState::Finished;
        outcome
    }
}
