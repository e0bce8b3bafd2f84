//! Top-level module for mesh topology abstractions.
//!
//! This module provides the core types for representing planar mesh
//! connectivity as padded tables:
//! - Element ids of either width and the collection kinds they index
//! - The fixed-width [`Table`] used for incidence, orientation and endpoint data
//! - The [`ElementRegistry`] that owns one topology snapshot
//! - Validation of the incidence contract the hot paths rely on

pub mod element;
pub mod registry;
pub mod table;
pub mod validation;

pub use element::{CompactId, ElementId, ElementKind, IdWidth, Orientation, Relation, WideId};
pub use registry::{ElementRegistry, RegistryConfig};
pub use table::{IncidenceTable, OrientationTable, Table};
