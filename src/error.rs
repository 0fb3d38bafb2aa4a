//! Error type shared by the whole crate

use crate::geometry::Direction;
use thiserror::Error;

/// Errors raised while configuring or running a kernel
#[derive(Debug, Error)]
pub enum PstdError {
    /// `run` or `get_metadata` was called before `start_kernel`.
    #[error("kernel has not been configured; call start_kernel first")]
    NotConfigured,

    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A receiver or speaker lies outside every domain.
    #[error("{kind} '{id}' at {location:?} is outside all domains")]
    OutOfBounds {
        kind: &'static str,
        id: String,
        location: [f64; 3],
    },

    /// Spectral interpolation needed a neighbour that does not exist.
    #[error("receiver '{receiver}' has no {direction:?} neighbour for spectral interpolation")]
    MissingNeighbour {
        receiver: String,
        direction: Direction,
    },

    /// A field became NaN or infinite.
    #[error("non-finite field values in domain '{domain}' at frame {frame}")]
    NumericInstability { frame: usize, domain: String },

    /// A domain id did not resolve in the arena.
    #[error("unknown domain '{0}'")]
    UnknownDomain(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, PstdError>;
