//! MeshAdjacencyError: Unified error type for mesh-adjacency public APIs
//!
//! Every fallible operation in the crate returns this type. Failures abort the
//! enclosing call; the transforms are pure, so retrying cannot change the
//! outcome.

use thiserror::Error;

use crate::topology::element::{ElementKind, Relation};

/// Unified error type for mesh-adjacency operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshAdjacencyError {
    /// Scratch or output buffer acquisition failed. Tables passed by mutable
    /// reference are left in an undefined (but memory-safe) state.
    #[error("allocation of {requested} elements failed")]
    AllocationFailure { requested: usize },
    /// Two tables that must agree in shape do not.
    #[error("shape mismatch for {what}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },
    /// A connector-endpoint table must have exactly two columns.
    #[error("connector endpoint table must have width 2, found {found}")]
    InvalidEndpointWidth { found: usize },
    /// A row references a connector id outside the endpoint table.
    #[error("element {element} slot {slot} references connector {connector}, but only {n_connectors} connectors exist")]
    ConnectorOutOfRange {
        element: usize,
        slot: usize,
        connector: i64,
        n_connectors: usize,
    },
    /// An element id is negative (other than as padding) or past the end of its collection.
    #[error("element id {element} out of range for collection of {n_elements}")]
    ElementOutOfRange { element: i64, n_elements: usize },
    /// A row index cannot be represented in the selected id width.
    #[error("index {index} does not fit in the selected id width")]
    IdOverflow { index: usize },
    /// A connector referenced by an element does not list that element as an endpoint.
    #[error("connector {connector} is referenced by element {element} but does not list it as an endpoint")]
    InconsistentTopology { element: usize, connector: i64 },
    /// A connector is referenced by more than two elements.
    #[error("connector {connector} is referenced {count} times (at most 2 allowed)")]
    ConnectorOverused { connector: usize, count: usize },
    /// An element has more incident connectors than the configured maximum valence.
    #[error("element {element} has valence {valence}, exceeding the maximum of {max}")]
    ValenceExceeded {
        element: usize,
        valence: usize,
        max: usize,
    },
    /// An element and the far endpoint of one of its connectors coincide.
    #[error("node {node} coincides with the far endpoint of connector {connector}")]
    DegenerateGeometry { node: usize, connector: i64 },
    /// The x and y coordinate arrays differ in length.
    #[error("coordinate arrays differ in length: x has {x}, y has {y}")]
    CoordinateLengthMismatch { x: usize, y: usize },
    /// No element count has been registered for this collection.
    #[error("no element count registered for {0:?}")]
    UnknownElementCount(ElementKind),
    /// A relation required by the operation has not been registered.
    #[error("missing relation {0}")]
    MissingRelation(Relation),
    /// Node coordinates are required but have not been registered.
    #[error("node coordinates have not been registered")]
    MissingCoordinates,
    /// The requested element/connector combination cannot be mapped.
    #[error("unsupported mapping: {0}")]
    UnsupportedMapping(String),
}
