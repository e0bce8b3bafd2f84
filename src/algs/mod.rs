//! Re-export public algorithms.

pub mod angle;
pub mod angular_sort;
pub mod compaction;
pub mod divergence;
pub mod incidence;
pub mod neighbors;

pub use angular_sort::{SortOptions, sort_by_angle};
pub use compaction::compact_row;
pub use neighbors::{ResolveOptions, neighbors_via_connector, neighbors_via_connector_into};
