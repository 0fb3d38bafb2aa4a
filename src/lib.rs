//! PSTD - a pseudo-spectral time domain acoustics kernel
//!
//! This library simulates 2D sound propagation over a scene decomposed into
//! rectangular domains. Spatial derivatives are spectral, domains are coupled
//! across their interfaces by a windowed spectral operator, and results are
//! streamed frame by frame to a caller through a callback protocol shared by a
//! physics kernel and a synthetic reference kernel.

pub mod config;
pub mod domain;
pub mod domain_decomposition;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod kernel;
pub mod receiver;
pub mod speaker;
pub mod spectral;
pub mod utilities;

// Re-export commonly used types
pub use config::{Configuration, Settings};
pub use engine::array::{Complex64, FieldArray};
pub use error::{PstdError, Result};
pub use kernel::{
    create_kernel, CallbackAction, CallbackStatus, KernelCallback, PhysicsKernel, PstdKernel,
    ReferenceKernel, RunOutcome, SimulationMetadata,
};

pub mod prelude {
    //! Common imports for driving a kernel
    pub use crate::config::{
        Configuration, DomainConfig, EdgeConfig, EdgesConfig, InstabilityPolicy,
        MissingNeighbourPolicy, ReceiverConfig, Settings, SpeakerConfig,
    };
    pub use crate::domain_decomposition::{DomainId, Scene};
    pub use crate::error::{PstdError, Result};
    pub use crate::geometry::{Direction, GridPoint};
    pub use crate::kernel::{
        create_kernel, CallbackAction, CallbackStatus, KernelCallback, KernelState,
        PhysicsKernel, PstdKernel, ReferenceKernel, RunOutcome, SimulationMetadata, NO_FRAME,
    };
    pub use crate::receiver::Receiver;
    pub use crate::speaker::{DirectionalSplit, HorizontalOnly, Speaker, SquaredAngle};
}
