//! Neighbor resolution through shared connectors.
//!
//! Given `connectors_at_element` (for instance `links_at_node` or
//! `links_at_patch`) and `elements_at_connector` (`nodes_at_link`,
//! `patches_at_link`), the neighbor of element `x` across slot `k` is the
//! endpoint of connector `connectors_at_element[x, k]` that is not `x`, or
//! `-1` when the slot is padding. The same routine therefore yields
//! node-to-node, patch-to-patch or cell-to-cell adjacency.
//!
//! # Preconditions
//! Every connector in row `x` must list `x` among its two endpoints. This is
//! checked with `debug_assert!` only; use
//! [`validate_incidence`](crate::topology::validation::validate_incidence)
//! to check it up front.

use crate::mesh_error::MeshAdjacencyError;
use crate::topology::element::ElementId;
use crate::topology::table::Table;

/// Knobs for neighbor resolution.
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// Resolve rows on the rayon pool. Ignored without the `rayon` feature.
    pub parallel: bool,
    /// Minimum number of rows handed to one rayon task.
    pub min_rows_per_task: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            parallel: cfg!(feature = "rayon"),
            min_rows_per_task: 256,
        }
    }
}

/// Neighbors of the `subset` elements (all rows when `None`), one output row
/// per requested element, in request order.
///
/// Inputs are never mutated; the result is freshly allocated.
pub fn neighbors_via_connector<I: ElementId>(
    connectors_at_element: &Table<I>,
    elements_at_connector: &Table<I>,
    subset: Option<&[I]>,
    opts: &ResolveOptions,
) -> Result<Table<I>, MeshAdjacencyError> {
    if elements_at_connector.width() != 2 {
        return Err(MeshAdjacencyError::InvalidEndpointWidth {
            found: elements_at_connector.width(),
        });
    }
    let rows = requested_rows(connectors_at_element.n_rows(), subset)?;
    let width = connectors_at_element.width();
    log::debug!(
        "resolving neighbors for {} of {} elements (width {width})",
        rows.len(),
        connectors_at_element.n_rows()
    );

    let mut out = Table::try_filled(rows.len(), width, I::ABSENT)?;
    if width == 0 || rows.is_empty() {
        return Ok(out);
    }
    resolve_rows(
        connectors_at_element,
        elements_at_connector,
        &rows,
        out.as_mut_slice(),
        opts,
    )?;
    Ok(out)
}

/// Write neighbors of the `subset` elements into the matching rows of `out`,
/// which must have the shape of `connectors_at_element`. Rows outside the
/// subset are left untouched.
pub fn neighbors_via_connector_into<I: ElementId>(
    connectors_at_element: &Table<I>,
    elements_at_connector: &Table<I>,
    subset: Option<&[I]>,
    out: &mut Table<I>,
    opts: &ResolveOptions,
) -> Result<(), MeshAdjacencyError> {
    if elements_at_connector.width() != 2 {
        return Err(MeshAdjacencyError::InvalidEndpointWidth {
            found: elements_at_connector.width(),
        });
    }
    out.expect_shape("neighbor output", connectors_at_element.shape())?;
    let rows = requested_rows(connectors_at_element.n_rows(), subset)?;
    log::debug!(
        "resolving neighbors into {} of {} rows",
        rows.len(),
        connectors_at_element.n_rows()
    );
    if out.width() == 0 || rows.is_empty() {
        return Ok(());
    }
    if subset.is_none() {
        return resolve_rows(
            connectors_at_element,
            elements_at_connector,
            &rows,
            out.as_mut_slice(),
            opts,
        );
    }
    // a subset may repeat rows, so these writes stay serial
    for element in rows {
        let out_row = out.row_mut(element);
        resolve_row(connectors_at_element, elements_at_connector, element, out_row)?;
    }
    Ok(())
}

/// Resolve `rows` into consecutive chunks of `out`, one chunk per row.
fn resolve_rows<I: ElementId>(
    connectors_at_element: &Table<I>,
    elements_at_connector: &Table<I>,
    rows: &[usize],
    out: &mut [I],
    opts: &ResolveOptions,
) -> Result<(), MeshAdjacencyError> {
    let width = connectors_at_element.width();

    #[cfg(feature = "rayon")]
    if opts.parallel {
        use rayon::prelude::*;
        // Each output row is written by exactly one task; inputs are shared read-only.
        return out
            .par_chunks_mut(width)
            .zip(rows.par_iter())
            .with_min_len(opts.min_rows_per_task.max(1))
            .try_for_each(|(out_row, &element)| {
                resolve_row(connectors_at_element, elements_at_connector, element, out_row)
            });
    }
    #[cfg(not(feature = "rayon"))]
    let _ = opts;

    for (out_row, &element) in out.chunks_exact_mut(width).zip(rows) {
        resolve_row(connectors_at_element, elements_at_connector, element, out_row)?;
    }
    Ok(())
}

/// The endpoint of `connector` that is not `element`.
#[inline]
pub fn other_endpoint<I: ElementId>(
    elements_at_connector: &Table<I>,
    connector: usize,
    element: I,
) -> I {
    let pair = elements_at_connector.row(connector);
    debug_assert!(
        pair[0] == element || pair[1] == element,
        "connector {connector} does not touch element {element}: {pair:?}"
    );
    if pair[0] == element { pair[1] } else { pair[0] }
}

fn requested_rows<I: ElementId>(
    n_rows: usize,
    subset: Option<&[I]>,
) -> Result<Vec<usize>, MeshAdjacencyError> {
    let Some(subset) = subset else {
        return Ok((0..n_rows).collect());
    };
    let mut rows = Vec::new();
    rows.try_reserve_exact(subset.len())
        .map_err(|_| MeshAdjacencyError::AllocationFailure {
            requested: subset.len(),
        })?;
    for &id in subset {
        match id.index() {
            Some(i) if i < n_rows => rows.push(i),
            _ => {
                return Err(MeshAdjacencyError::ElementOutOfRange {
                    element: id.as_i64(),
                    n_elements: n_rows,
                });
            }
        }
    }
    Ok(rows)
}

#[inline]
fn resolve_row<I: ElementId>(
    connectors_at_element: &Table<I>,
    elements_at_connector: &Table<I>,
    element: usize,
    out: &mut [I],
) -> Result<(), MeshAdjacencyError> {
    let x = I::from_index(element).ok_or(MeshAdjacencyError::IdOverflow { index: element })?;
    let n_connectors = elements_at_connector.n_rows();
    for (slot, (&connector, neighbor)) in connectors_at_element
        .row(element)
        .iter()
        .zip(out.iter_mut())
        .enumerate()
    {
        if connector.is_absent() {
            *neighbor = I::ABSENT;
            continue;
        }
        let c = connector
            .index()
            .filter(|&c| c < n_connectors)
            .ok_or(MeshAdjacencyError::ConnectorOutOfRange {
                element,
                slot,
                connector: connector.as_i64(),
                n_connectors,
            })?;
        *neighbor = other_endpoint(elements_at_connector, c, x);
    }
    Ok(())
}
