//! Left-packing of padded rows.
//!
//! Valid `(connector, orientation)` pairs are moved to the front of the row in
//! their original relative order and the tail is refilled with
//! `(ABSENT, 0)`. The two rows always move together.

use crate::mesh_error::MeshAdjacencyError;
use crate::topology::element::{ElementId, Orientation};
use crate::topology::table::Table;

/// Compact one row pair in place and return the number of valid slots.
///
/// # Panics
/// Panics if `ids` and `dirs` differ in length.
pub fn compact_row<I: ElementId>(ids: &mut [I], dirs: &mut [Orientation]) -> usize {
    assert_eq!(ids.len(), dirs.len(), "incidence and orientation rows differ in width");
    let mut n_valid = 0;
    for slot in 0..ids.len() {
        if !ids[slot].is_absent() {
            if slot != n_valid {
                ids[n_valid] = ids[slot];
                dirs[n_valid] = dirs[slot];
            }
            n_valid += 1;
        }
    }
    ids[n_valid..].fill(I::ABSENT);
    dirs[n_valid..].fill(0);
    n_valid
}

/// Compact every row of an incidence/orientation table pair.
pub fn compact_rows<I: ElementId>(
    ids: &mut Table<I>,
    dirs: &mut Table<Orientation>,
) -> Result<(), MeshAdjacencyError> {
    dirs.expect_shape("orientation table", ids.shape())?;
    for (id_row, dir_row) in ids.rows_mut().zip(dirs.rows_mut()) {
        compact_row(id_row, dir_row);
    }
    Ok(())
}
