//! Domain module: rectangular sub-regions and their field storage

pub mod field;
pub mod pml;
pub mod subdomain;

pub use field::FieldValues;
pub use pml::EdgeDamping;
pub use subdomain::{Derivatives, Domain, NeighbourLink, Neighbours};
