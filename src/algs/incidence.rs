//! Conversions between connector-endpoint tables and per-element incidence
//! tables.
//!
//! These produce *raw* tables: rows list connectors in ascending connector id
//! order. Run [`sort_by_angle`](crate::algs::angular_sort::sort_by_angle) to
//! put node rows into canonical counterclockwise order.

use crate::mesh_error::MeshAdjacencyError;
use crate::topology::element::{ElementId, INWARD, OUTWARD, Orientation};
use crate::topology::table::Table;

/// Build `connectors_at_element` and its orientation table from
/// `elements_at_connector` (rows are `[tail, head]`, `-1` for a missing end).
///
/// The element is the tail of an outward (`-1`) connector and the head of an
/// inward (`+1`) one. The table width is the largest valence found, which
/// may not exceed `max_valence`.
pub fn incidence_from_endpoints<I: ElementId>(
    elements_at_connector: &Table<I>,
    n_elements: usize,
    max_valence: usize,
) -> Result<(Table<I>, Table<Orientation>), MeshAdjacencyError> {
    if elements_at_connector.width() != 2 {
        return Err(MeshAdjacencyError::InvalidEndpointWidth {
            found: elements_at_connector.width(),
        });
    }

    let mut valence = vec![0usize; n_elements];
    for pair in elements_at_connector.rows() {
        for &end in pair {
            if end.is_absent() {
                continue;
            }
            let e = element_index(end, n_elements)?;
            valence[e] += 1;
        }
    }

    let width = valence.iter().copied().max().unwrap_or(0);
    if width > max_valence {
        let element = valence.iter().position(|&v| v == width).unwrap_or(0);
        return Err(MeshAdjacencyError::ValenceExceeded {
            element,
            valence: width,
            max: max_valence,
        });
    }

    let mut ids = Table::try_filled(n_elements, width, I::ABSENT)?;
    let mut dirs = Table::try_filled(n_elements, width, 0 as Orientation)?;
    let mut fill = vec![0usize; n_elements];
    for (c, pair) in elements_at_connector.rows().enumerate() {
        let connector = I::from_index(c).ok_or(MeshAdjacencyError::IdOverflow { index: c })?;
        for (&end, dir) in pair.iter().zip([OUTWARD, INWARD]) {
            if end.is_absent() {
                continue;
            }
            let e = element_index(end, n_elements)?;
            let slot = fill[e];
            ids.row_mut(e)[slot] = connector;
            dirs.row_mut(e)[slot] = dir;
            fill[e] += 1;
        }
    }
    Ok((ids, dirs))
}

/// Invert `connectors_at_element` into a width-2 `elements_at_connector`
/// table. Elements are listed in the order they are encountered; a connector
/// seen only once keeps `-1` in its second slot.
pub fn endpoints_from_incidence<I: ElementId>(
    connectors_at_element: &Table<I>,
    n_connectors: usize,
) -> Result<Table<I>, MeshAdjacencyError> {
    let mut endpoints = Table::try_filled(n_connectors, 2, I::ABSENT)?;
    let mut seen = vec![0usize; n_connectors];
    for (e, row) in connectors_at_element.rows().enumerate() {
        let element = I::from_index(e).ok_or(MeshAdjacencyError::IdOverflow { index: e })?;
        for (slot, &connector) in row.iter().enumerate() {
            if connector.is_absent() {
                continue;
            }
            let c = connector
                .index()
                .filter(|&c| c < n_connectors)
                .ok_or(MeshAdjacencyError::ConnectorOutOfRange {
                    element: e,
                    slot,
                    connector: connector.as_i64(),
                    n_connectors,
                })?;
            if seen[c] == 2 {
                let count = connectors_at_element
                    .as_slice()
                    .iter()
                    .filter(|&&x| x == connector)
                    .count();
                return Err(MeshAdjacencyError::ConnectorOverused {
                    connector: c,
                    count,
                });
            }
            endpoints.row_mut(c)[seen[c]] = element;
            seen[c] += 1;
        }
    }
    Ok(endpoints)
}

#[inline]
fn element_index<I: ElementId>(end: I, n_elements: usize) -> Result<usize, MeshAdjacencyError> {
    end.index()
        .filter(|&e| e < n_elements)
        .ok_or(MeshAdjacencyError::ElementOutOfRange {
            element: end.as_i64(),
            n_elements,
        })
}
