//! Test utilities for PSTD tests
//!
//! Scene builders and a callback that records the event stream.

#![allow(dead_code)]

use pstd::prelude::*;

/// Settings for the standard 1 m room: dx 0.1, 10 frames of 1 ms
pub fn example_settings() -> Settings {
    Settings {
        grid_spacing: 0.1,
        time_step: 0.001,
        render_time: 0.01,
        wave_length: 16,
        window_size: 16,
        band_width: 20.0,
        ..Settings::default()
    }
}

/// Settings with a stable time step for the physics kernel
pub fn stable_settings(frames: usize) -> Settings {
    let dx = 0.1;
    let dt = 0.5 * dx / 340.0;
    Settings {
        grid_spacing: dx,
        time_step: dt,
        render_time: frames as f64 * dt,
        wave_length: 16,
        window_size: 16,
        band_width: 20.0,
        ..Settings::default()
    }
}

pub fn domain(id: &str, top_left: [f64; 2], size: [f64; 2]) -> DomainConfig {
    DomainConfig {
        id: id.into(),
        top_left,
        size,
        edges: EdgesConfig::default(),
        density: None,
    }
}

pub fn receiver(id: &str, x: f64, y: f64) -> ReceiverConfig {
    ReceiverConfig {
        id: id.into(),
        location: [x, y, 0.0],
    }
}

pub fn speaker(x: f64, y: f64) -> SpeakerConfig {
    SpeakerConfig {
        location: [x, y, 0.0],
    }
}

/// One 1 m × 1 m domain with a receiver in its centre
pub fn example_config() -> Configuration {
    Configuration {
        settings: example_settings(),
        domains: vec![domain("room", [0.0, 0.0], [1.0, 1.0])],
        receivers: vec![receiver("centre", 0.5, 0.5)],
        speakers: vec![],
    }
}

/// Three 1 m domains stacked top to bottom
pub fn vertical_stack() -> Vec<DomainConfig> {
    vec![
        domain("top", [0.0, 0.0], [1.0, 1.0]),
        domain("middle", [0.0, 1.0], [1.0, 1.0]),
        domain("bottom", [0.0, 2.0], [1.0, 1.0]),
    ]
}

/// Two side-by-side rooms with a speaker and a receiver in each, stable for the
/// physics kernel
pub fn two_room_config(frames: usize) -> Configuration {
    Configuration {
        settings: stable_settings(frames),
        domains: vec![
            domain("left", [0.0, 0.0], [1.0, 1.0]),
            domain("right", [1.0, 0.0], [0.5, 1.0]),
        ],
        receivers: vec![receiver("a", 0.3, 0.5), receiver("b", 1.2, 0.5)],
        speakers: vec![speaker(0.5, 0.5)],
    }
}

pub fn gaussian(x: f64, y: f64, centre: [f64; 2], band_width: f64) -> f64 {
    let dx = x - centre[0];
    let dy = y - centre[1];
    (-band_width * (dx * dx + dy * dy)).exp()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Status(CallbackStatus, String, i64),
    Frame(usize, String, usize),
}

/// Records every event; can stop the run at a given status event
#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<Event>,
    pub payloads: Vec<(usize, String, Vec<f64>)>,
    /// Stop when RUNNING for this frame arrives
    pub stop_at: Option<usize>,
    pub stop_on_start: bool,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stopping_at(frame: usize) -> Self {
        Self {
            stop_at: Some(frame),
            ..Self::default()
        }
    }

    pub fn statuses(&self) -> Vec<(CallbackStatus, i64)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Status(status, _, frame) => Some((*status, *frame)),
                Event::Frame(..) => None,
            })
            .collect()
    }

    pub fn running_frames(&self) -> Vec<i64> {
        self.statuses()
            .into_iter()
            .filter(|(s, _)| *s == CallbackStatus::Running)
            .map(|(_, f)| f)
            .collect()
    }

    /// Status and frame events without messages or payload values
    pub fn shape(&self) -> Vec<Event> {
        self.events
            .iter()
            .map(|e| match e {
                Event::Status(status, _, frame) => Event::Status(*status, String::new(), *frame),
                other => other.clone(),
            })
            .collect()
    }

    pub fn last_message(&self) -> Option<&str> {
        self.events.iter().rev().find_map(|e| match e {
            Event::Status(_, message, _) => Some(message.as_str()),
            Event::Frame(..) => None,
        })
    }
}

impl KernelCallback for Recorder {
    fn on_status(&mut self, status: CallbackStatus, message: &str, frame: i64) -> CallbackAction {
        self.events
            .push(Event::Status(status, message.to_string(), frame));
        let stop = match status {
            CallbackStatus::Starting => self.stop_on_start,
            CallbackStatus::Running => self.stop_at.map_or(false, |f| f as i64 == frame),
            CallbackStatus::Finished => false,
        };
        if stop {
            CallbackAction::Stop
        } else {
            CallbackAction::Continue
        }
    }

    fn on_frame(&mut self, frame: usize, domain: &str, data: &[f64]) {
        self.events
            .push(Event::Frame(frame, domain.to_string(), data.len()));
        self.payloads
            .push((frame, domain.to_string(), data.to_vec()));
    }
}

/// Both kernels, boxed behind the common trait
pub fn kernels() -> Vec<Box<dyn PstdKernel>> {
    vec![
        Box::new(PhysicsKernel::new()),
        Box::new(ReferenceKernel::new()),
    ]
}
