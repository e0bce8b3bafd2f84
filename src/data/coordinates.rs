//! Planar node coordinates.
//!
//! One `(x, y)` pair per node, stored as two parallel arrays. Coordinates are
//! immutable for the life of a topology snapshot; replacing them requires
//! re-normalizing every table that was ordered against them.

use serde::{Deserialize, Serialize};

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshAdjacencyError;

/// Per-node planar coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Coordinates {
    /// Construct from parallel `x` and `y` arrays of equal length.
    pub fn try_new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, MeshAdjacencyError> {
        if x.len() != y.len() {
            return Err(MeshAdjacencyError::CoordinateLengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        Ok(Self { x, y })
    }

    /// Construct from `(x, y)` pairs.
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        let (x, y) = points.iter().copied().unzip();
        Self { x, y }
    }

    /// Number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    #[inline]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    #[inline]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// `(x, y)` of `node`, or `None` if out of range.
    #[inline]
    pub fn xy(&self, node: usize) -> Option<(f64, f64)> {
        Some((*self.x.get(node)?, *self.y.get(node)?))
    }
}

impl DebugInvariants for Coordinates {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Coordinates");
    }

    fn validate_invariants(&self) -> Result<(), MeshAdjacencyError> {
        if self.x.len() != self.y.len() {
            return Err(MeshAdjacencyError::CoordinateLengthMismatch {
                x: self.x.len(),
                y: self.y.len(),
            });
        }
        Ok(())
    }
}
