//! Fixed-width, padded, row-major adjacency tables.
//!
//! A [`Table`] stores `n_rows × width` entries contiguously; row `i` occupies
//! `data[i * width .. (i + 1) * width]`. Incidence tables pad with
//! [`ElementId::ABSENT`], orientation tables with `0`.

use serde::{Deserialize, Serialize};

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshAdjacencyError;
use crate::topology::element::{ElementId, Orientation};

/// Row-major table with a fixed number of slots per row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTable<T>")]
pub struct Table<T> {
    data: Vec<T>,
    n_rows: usize,
    width: usize,
}

/// Serialized form, checked for shape before it becomes a [`Table`].
#[derive(Deserialize)]
struct RawTable<T> {
    data: Vec<T>,
    n_rows: usize,
    width: usize,
}

impl<T> TryFrom<RawTable<T>> for Table<T> {
    type Error = MeshAdjacencyError;

    fn try_from(raw: RawTable<T>) -> Result<Self, Self::Error> {
        let expected = raw.n_rows.checked_mul(raw.width);
        if expected != Some(raw.data.len()) {
            return Err(MeshAdjacencyError::ShapeMismatch {
                what: "table storage",
                expected: (raw.n_rows, raw.width),
                found: (raw.data.len(), 1),
            });
        }
        Ok(Self {
            data: raw.data,
            n_rows: raw.n_rows,
            width: raw.width,
        })
    }
}

/// Per-element connector ids, `-1` padded.
pub type IncidenceTable<I> = Table<I>;
/// Per-element orientation flags, permuted in lockstep with an [`IncidenceTable`].
pub type OrientationTable = Table<Orientation>;

impl<T: Copy> Table<T> {
    /// A table with every slot set to `value`.
    pub fn filled(n_rows: usize, width: usize, value: T) -> Self {
        Self {
            data: vec![value; n_rows * width],
            n_rows,
            width,
        }
    }

    /// Like [`filled`](Self::filled), but reports allocation failure instead of aborting.
    pub fn try_filled(n_rows: usize, width: usize, value: T) -> Result<Self, MeshAdjacencyError> {
        let len = n_rows
            .checked_mul(width)
            .ok_or(MeshAdjacencyError::AllocationFailure { requested: usize::MAX })?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| MeshAdjacencyError::AllocationFailure { requested: len })?;
        data.resize(len, value);
        Ok(Self {
            data,
            n_rows,
            width,
        })
    }

    /// Wrap row-major `data` of the given `width`.
    pub fn from_vec(data: Vec<T>, width: usize) -> Result<Self, MeshAdjacencyError> {
        let n_rows = if width == 0 { 0 } else { data.len() / width };
        if (width == 0 && !data.is_empty()) || (width != 0 && data.len() % width != 0) {
            return Err(MeshAdjacencyError::ShapeMismatch {
                what: "table data",
                expected: (n_rows, width),
                found: (data.len(), 1),
            });
        }
        Ok(Self {
            data,
            n_rows,
            width,
        })
    }

    /// Build from fixed-size rows.
    pub fn from_rows<const W: usize>(rows: &[[T; W]]) -> Self {
        Self {
            data: rows.iter().flat_map(|r| r.iter().copied()).collect(),
            n_rows: rows.len(),
            width: W,
        }
    }

    /// Entry at (`row`, `slot`), if in bounds.
    #[inline]
    pub fn get(&self, row: usize, slot: usize) -> Option<T> {
        if row < self.n_rows && slot < self.width {
            Some(self.data[row * self.width + slot])
        } else {
            None
        }
    }

    /// Owned copy of every row, mostly for assertions.
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.rows().map(<[T]>::to_vec).collect()
    }
}

impl<T> Table<T> {
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.width)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Slots of row `i`.
    ///
    /// # Panics
    /// Panics if `i >= n_rows`.
    #[inline]
    pub fn row(&self, i: usize) -> &[T] {
        assert!(i < self.n_rows, "row {i} out of range ({} rows)", self.n_rows);
        &self.data[i * self.width..(i + 1) * self.width]
    }

    /// Mutable slots of row `i`.
    ///
    /// # Panics
    /// Panics if `i >= n_rows`.
    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [T] {
        assert!(i < self.n_rows, "row {i} out of range ({} rows)", self.n_rows);
        &mut self.data[i * self.width..(i + 1) * self.width]
    }

    /// Iterator over rows in order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[T]> + '_ {
        let width = self.width;
        (0..self.n_rows).map(move |i| &self.data[i * width..(i + 1) * width])
    }

    /// Mutable iterator over rows. Yields nothing for zero-width tables.
    pub fn rows_mut(&mut self) -> std::slice::ChunksExactMut<'_, T> {
        self.data.chunks_exact_mut(self.width.max(1))
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub(crate) fn expect_shape(
        &self,
        what: &'static str,
        expected: (usize, usize),
    ) -> Result<(), MeshAdjacencyError> {
        if self.shape() != expected {
            return Err(MeshAdjacencyError::ShapeMismatch {
                what,
                expected,
                found: self.shape(),
            });
        }
        Ok(())
    }
}

impl<I: ElementId> Table<I> {
    /// Number of valid (non-padding) slots in row `i`.
    pub fn valence(&self, i: usize) -> usize {
        self.row(i).iter().filter(|c| !c.is_absent()).count()
    }

    /// Largest valence over all rows.
    pub fn max_valence(&self) -> usize {
        self.rows()
            .map(|r| r.iter().filter(|c| !c.is_absent()).count())
            .max()
            .unwrap_or(0)
    }
}

impl<T: Copy> DebugInvariants for Table<T> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Table");
    }

    fn validate_invariants(&self) -> Result<(), MeshAdjacencyError> {
        if self.data.len() != self.n_rows * self.width {
            return Err(MeshAdjacencyError::ShapeMismatch {
                what: "table storage",
                expected: (self.n_rows, self.width),
                found: (self.data.len(), 1),
            });
        }
        Ok(())
    }
}
