//! Kernel execution protocol
//!
//! Every kernel binds a [`Configuration`] with `start_kernel`, reports
//! [`SimulationMetadata`] without running, and streams a run through a
//! [`KernelCallback`]. The event sequence is the same for every kernel:
//!
//! ```text
//! STARTING, then per frame f: RUNNING(f), payloads for f ..., then FINISHED
//! ```
//!
//! The callback can stop a run from any STARTING or RUNNING event. FINISHED is
//! always the last event, also when a run fails.

pub mod physics;
pub mod reference;

pub use physics::{PhysicsKernel, Simulation};
pub use reference::ReferenceKernel;

use crate::config::{Configuration, Settings};
use crate::error::{PstdError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Frame index carried by STARTING and FINISHED events
pub const NO_FRAME: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackStatus {
    Starting,
    Running,
    Finished,
}

/// Returned by [`KernelCallback::on_status`] to continue or stop a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallbackAction {
    #[default]
    Continue,
    Stop,
}

/// Receiver of a kernel's event stream
pub trait KernelCallback {
    /// Status change; `frame` is [`NO_FRAME`] for STARTING and FINISHED
    fn on_status(&mut self, status: CallbackStatus, message: &str, frame: i64) -> CallbackAction;

    /// Field snapshot of one domain, `width * height` values in x-major order
    fn on_frame(&mut self, frame: usize, domain: &str, data: &[f64]);
}

/// What a configuration will produce, derived without running anything
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationMetadata {
    pub frame_count: usize,
    /// `[width, height, 1]` in cells, per domain in configuration order
    pub domain_extents: Vec<[usize; 3]>,
}

impl SimulationMetadata {
    pub fn derive(config: &Configuration) -> Self {
        let dx = config.settings.grid_spacing;
        let domain_extents = config
            .domains
            .iter()
            .map(|d| {
                let (_, [width, height]) = d.grid_extent(dx);
                [width as usize, height as usize, 1]
            })
            .collect();

        Self {
            frame_count: config.settings.frame_count(),
            domain_extents,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KernelState {
    #[default]
    Unconfigured,
    Configured,
    Running,
    Finished,
}

/// How a run ended when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// All frames were computed
    Completed { frames: usize },
    /// The callback asked to stop; `frame` is the RUNNING event that did so,
    /// `None` when the run stopped at STARTING
    Cancelled { frame: Option<usize> },
}

/// Common contract of all kernels
pub trait PstdKernel: Send {
    fn name(&self) -> &'static str;

    fn state(&self) -> KernelState;

    /// Validate and bind a configuration; allowed in any state except running
    fn start_kernel(&mut self, config: Configuration) -> Result<()>;

    /// Metadata of the bound configuration
    fn get_metadata(&self) -> Result<SimulationMetadata>;

    /// Run every frame of the bound configuration, blocking until FINISHED
    fn run(&mut self, callback: &mut dyn KernelCallback) -> Result<RunOutcome>;
}

/// Create a kernel by name: `"physics"` or `"reference"`
pub fn create_kernel(name: &str) -> Result<Box<dyn PstdKernel>> {
    match name {
        "physics" => Ok(Box::new(PhysicsKernel::new())),
        "reference" => Ok(Box::new(ReferenceKernel::new())),
        other => Err(PstdError::InvalidConfiguration(format!(
            "unknown kernel '{other}'"
        ))),
    }
}

/// Per-frame state of a kernel, driven by [`run_protocol`]
pub(crate) trait FrameSource {
    /// Domain ids in configuration order
    fn domain_ids(&self) -> Vec<String>;

    /// Compute frame `frame`; all domains are settled when this returns
    fn advance(&mut self, frame: usize) -> Result<()>;

    /// Current snapshot of the domain at `index`
    fn snapshot(&self, index: usize) -> Vec<f64>;
}

/// Drive `source` through the event sequence shared by all kernels
pub(crate) fn run_protocol(
    source: &mut dyn FrameSource,
    settings: &Settings,
    callback: &mut dyn KernelCallback,
) -> Result<RunOutcome> {
    let frame_count = settings.frame_count();
    let ids = source.domain_ids();
    info!(frames = frame_count, domains = ids.len(), "run starting");

    if callback.on_status(CallbackStatus::Starting, "starting", NO_FRAME) == CallbackAction::Stop {
        warn!("run cancelled before the first frame");
        callback.on_status(CallbackStatus::Finished, "cancelled", NO_FRAME);
        return Ok(RunOutcome::Cancelled { frame: None });
    }

    for frame in 0..frame_count {
        let message = format!("frame {frame}");
        if callback.on_status(CallbackStatus::Running, &message, frame as i64) == CallbackAction::Stop
        {
            warn!(frame, "run cancelled");
            callback.on_status(CallbackStatus::Finished, "cancelled", NO_FRAME);
            return Ok(RunOutcome::Cancelled { frame: Some(frame) });
        }

        if let Err(error) = source.advance(frame) {
            warn!(frame, %error, "run failed");
            callback.on_status(CallbackStatus::Finished, &error.to_string(), NO_FRAME);
            return Err(error);
        }

        if settings.should_write(frame) {
            for (index, id) in ids.iter().enumerate() {
                callback.on_frame(frame, id, &source.snapshot(index));
            }
        }
        debug!(frame, "frame done");
    }

    info!(frames = frame_count, "run finished");
    callback.on_status(CallbackStatus::Finished, "finished", NO_FRAME);
    Ok(RunOutcome::Completed {
        frames: frame_count,
    })
}
