//! PSTD Run - runs a scene through a kernel
//!
//! Loads a JSON scene, prints its metadata, runs it while logging the event
//! stream, and optionally writes the receiver histories to a JSON file.

use clap::{Parser, ValueEnum};
use pstd::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KernelKind {
    Physics,
    Reference,
}

#[derive(Parser, Debug)]
#[command(name = "pstd-run")]
#[command(about = "Run a PSTD acoustic scene", long_about = None)]
struct Cli {
    /// Scene configuration in JSON
    #[arg(long)]
    scene: PathBuf,

    /// Kernel used to run the scene
    #[arg(long, value_enum, default_value_t = KernelKind::Physics)]
    kernel: KernelKind,

    /// Write receiver histories to this JSON file (physics kernel only)
    #[arg(long)]
    receivers_out: Option<PathBuf>,

    /// Stop the run after this frame
    #[arg(long)]
    stop_after: Option<usize>,
}

/// Logs the event stream and counts payloads
#[derive(Debug, Default)]
struct Progress {
    stop_after: Option<usize>,
    payloads: usize,
}

impl KernelCallback for Progress {
    fn on_status(&mut self, status: CallbackStatus, message: &str, frame: i64) -> CallbackAction {
        match status {
            CallbackStatus::Running => debug!(frame, "{message}"),
            _ => info!(?status, "{message}"),
        }
        match self.stop_after {
            Some(last) if frame > last as i64 => CallbackAction::Stop,
            _ => CallbackAction::Continue,
        }
    }

    fn on_frame(&mut self, frame: usize, domain: &str, data: &[f64]) {
        let peak = data.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        debug!(frame, domain, cells = data.len(), peak, "frame payload");
        self.payloads += 1;
    }
}

#[derive(Serialize)]
struct ReceiverHistory<'a> {
    location: [f64; 3],
    values: &'a [f64],
}

fn write_receivers(path: &Path, receivers: &[Receiver]) -> Result<()> {
    let histories: BTreeMap<&str, ReceiverHistory> = receivers
        .iter()
        .map(|r| {
            (
                r.id.as_str(),
                ReceiverHistory {
                    location: r.location,
                    values: r.received_values(),
                },
            )
        })
        .collect();
    std::fs::write(path, serde_json::to_string_pretty(&histories)?)?;
    info!(path = %path.display(), receivers = receivers.len(), "receiver histories written");
    Ok(())
}

fn drive(kernel: &mut dyn PstdKernel, config: Configuration, progress: &mut Progress) -> Result<()> {
    kernel.start_kernel(config)?;

    let metadata = kernel.get_metadata()?;
    println!("kernel:  {}", kernel.name());
    println!("frames:  {}", metadata.frame_count);
    for extent in &metadata.domain_extents {
        println!("domain:  {} x {} cells", extent[0], extent[1]);
    }

    match kernel.run(progress)? {
        RunOutcome::Completed { frames } => info!(frames, payloads = progress.payloads, "done"),
        RunOutcome::Cancelled { frame } => info!(?frame, payloads = progress.payloads, "stopped"),
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = Configuration::from_path(&cli.scene)?;
    let mut progress = Progress {
        stop_after: cli.stop_after,
        ..Progress::default()
    };

    match cli.kernel {
        KernelKind::Physics => {
            let mut kernel = PhysicsKernel::new();
            drive(&mut kernel, config, &mut progress)?;
            if let Some(path) = &cli.receivers_out {
                write_receivers(path, kernel.receivers())?;
            }
        }
        KernelKind::Reference => {
            let mut kernel = ReferenceKernel::new();
            drive(&mut kernel, config, &mut progress)?;
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pstd=info,pstd_run=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(scene = %cli.scene.display(), kernel = ?cli.kernel, "loading scene");

    if let Err(e) = run(cli) {
        error!("run failed: {e}");
        std::process::exit(1);
    }
}
