#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-adjacency
//!
//! mesh-adjacency is the indexing layer beneath grid operations on planar mesh
//! graphs. It takes the raw, padded adjacency tables produced by a mesh
//! builder and
//! - orders every node's incident links counterclockwise by the angle toward
//!   the link's far node, carrying per-slot orientation flags along, and
//! - resolves element-to-element adjacency (node-node, patch-patch,
//!   cell-cell) through any connector/element relation.
//!
//! ## Features
//! - One generic implementation over the compact (`i32`) and wide (`i64`) id widths
//! - Row-parallel normalization and resolution on rayon (`rayon` feature, on by default)
//! - Invariant checks in debug builds or with `strict-invariants` / `check-invariants`
//!
//! ## Determinism
//!
//! Sorting is stable: links at equal angles keep their input order, so
//! re-normalizing a canonical table is a no-op and results do not depend on
//! the thread count.
//!
//! ## Usage
//!
//! ```rust
//! use mesh_adjacency::prelude::*;
//!
//! // 3 - 2
//! // |   |
//! // 0 - 1
//! let coords = Coordinates::from_points(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
//! let nodes_at_link = Table::from_rows(&[[0i32, 1], [1, 2], [3, 2], [0, 3]]);
//! let mut grid =
//!     ElementRegistry::from_nodes_at_link(coords, nodes_at_link, RegistryConfig::default())?;
//! grid.normalize_links_at_node(&SortOptions::default())?;
//! let neighbors =
//!     grid.map_neighbors(ElementKind::Node, ElementKind::Link, None, &ResolveOptions::default())?;
//! assert_eq!(neighbors.row(0), &[1, 3]);
//! # Ok::<(), MeshAdjacencyError>(())
//! ```

pub mod algs;
pub mod data;
pub mod debug_invariants;
pub mod mesh_error;
pub mod topology;

pub use debug_invariants::DebugInvariants;
pub use mesh_error::MeshAdjacencyError;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::angular_sort::{SortOptions, sort_by_angle};
    pub use crate::algs::compaction::{compact_row, compact_rows};
    pub use crate::algs::neighbors::{
        ResolveOptions, neighbors_via_connector, neighbors_via_connector_into,
    };
    pub use crate::data::coordinates::Coordinates;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::mesh_error::MeshAdjacencyError;
    pub use crate::topology::element::{
        CompactId, ElementId, ElementKind, INWARD, OUTWARD, Orientation, Relation, WideId,
    };
    pub use crate::topology::registry::{ElementRegistry, RegistryConfig};
    pub use crate::topology::table::{IncidenceTable, OrientationTable, Table};
}
