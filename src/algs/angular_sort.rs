//! Counterclockwise ordering of the connectors incident to each node.
//!
//! For every row of an incidence table the engine
//! 1. left-packs the valid `(connector, orientation)` pairs,
//! 2. computes the polar angle from the row's node toward each connector's
//!    far endpoint, shifted into `[0, 2π)`, and
//! 3. stable-sorts the row by that angle, carrying the orientation along.
//!
//! Ties keep their pre-sort relative order, which makes the transform
//! idempotent. Coincident node/far-endpoint coordinates produce angle `0`
//! unless [`SortOptions::check_geometry`] is set.
//!
//! Rows are independent, so with the `rayon` feature they are processed in
//! parallel over disjoint row chunks. The tables are borrowed mutably for the
//! whole call; nothing else can observe them mid-normalization.

use crate::algs::angle::angle_between;
use crate::algs::compaction::compact_row;
use crate::data::coordinates::Coordinates;
use crate::mesh_error::MeshAdjacencyError;
use crate::topology::element::{ElementId, Orientation};
use crate::topology::table::Table;

/// Rows up to this valence use insertion sort; longer rows fall back to the
/// standard library's stable merge sort.
const INSERTION_SORT_MAX: usize = 16;

/// `(angle, connector, orientation)` for one valid slot.
type Spoke<I> = (f64, I, Orientation);

/// Knobs for [`sort_by_angle`].
#[derive(Debug, Clone, Copy)]
pub struct SortOptions {
    /// Process rows on the rayon pool. Ignored without the `rayon` feature.
    pub parallel: bool,
    /// Minimum number of rows handed to one rayon task.
    pub min_rows_per_task: usize,
    /// Return [`MeshAdjacencyError::DegenerateGeometry`] when a node coincides
    /// with the far endpoint of one of its connectors.
    pub check_geometry: bool,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            parallel: cfg!(feature = "rayon"),
            min_rows_per_task: 64,
            check_geometry: false,
        }
    }
}

impl SortOptions {
    /// Single-threaded, otherwise default.
    pub fn serial() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }
}

/// Shared read-only inputs for every row.
struct RowContext<'a, I> {
    coords: &'a Coordinates,
    nodes_at_link: &'a Table<I>,
    check_geometry: bool,
}

/// Reorder `links_at_node` (and `link_dirs_at_node` in lockstep) so that each
/// node's valid connectors ascend by angle toward their far endpoint.
///
/// `nodes_at_link` must have width 2 and one coordinate pair must exist per
/// row of `links_at_node`.
///
/// On error the tables are left partially normalized and should be rebuilt.
pub fn sort_by_angle<I: ElementId>(
    coords: &Coordinates,
    nodes_at_link: &Table<I>,
    links_at_node: &mut Table<I>,
    link_dirs_at_node: &mut Table<Orientation>,
    opts: &SortOptions,
) -> Result<(), MeshAdjacencyError> {
    check_inputs(coords, nodes_at_link, links_at_node)?;
    link_dirs_at_node.expect_shape("orientation table", links_at_node.shape())?;

    let (n_rows, width) = links_at_node.shape();
    log::debug!(
        "sorting {n_rows} rows of width {width} by angle ({:?} ids, parallel={})",
        I::WIDTH,
        opts.parallel
    );
    if width == 0 || n_rows == 0 {
        return Ok(());
    }

    let ctx = RowContext {
        coords,
        nodes_at_link,
        check_geometry: opts.check_geometry,
    };

    #[cfg(feature = "rayon")]
    if opts.parallel {
        use rayon::prelude::*;
        // Each task owns a disjoint row pair and only reads `ctx`, so no
        // synchronization is needed between rows.
        return links_at_node
            .as_mut_slice()
            .par_chunks_mut(width)
            .zip(link_dirs_at_node.as_mut_slice().par_chunks_mut(width))
            .enumerate()
            .with_min_len(opts.min_rows_per_task.max(1))
            .try_for_each_init(Vec::new, |scratch, (node, (ids, dirs))| {
                normalize_row(&ctx, node, ids, dirs, scratch)
            });
    }

    let mut scratch = Vec::new();
    for (node, (ids, dirs)) in links_at_node
        .rows_mut()
        .zip(link_dirs_at_node.rows_mut())
        .enumerate()
    {
        normalize_row(&ctx, node, ids, dirs, &mut scratch)?;
    }
    Ok(())
}

/// Normalize a single node's row pair in place.
pub fn sort_row_by_angle<I: ElementId>(
    coords: &Coordinates,
    nodes_at_link: &Table<I>,
    node: usize,
    ids: &mut [I],
    dirs: &mut [Orientation],
    check_geometry: bool,
) -> Result<(), MeshAdjacencyError> {
    if nodes_at_link.width() != 2 {
        return Err(MeshAdjacencyError::InvalidEndpointWidth {
            found: nodes_at_link.width(),
        });
    }
    if ids.len() != dirs.len() {
        return Err(MeshAdjacencyError::ShapeMismatch {
            what: "orientation row",
            expected: (1, ids.len()),
            found: (1, dirs.len()),
        });
    }
    let ctx = RowContext {
        coords,
        nodes_at_link,
        check_geometry,
    };
    normalize_row(&ctx, node, ids, dirs, &mut Vec::new())
}

/// Angles of the valid slots of `node`'s row, in slot order.
pub fn angles_at_row<I: ElementId>(
    coords: &Coordinates,
    nodes_at_link: &Table<I>,
    node: usize,
    ids: &[I],
) -> Result<Vec<f64>, MeshAdjacencyError> {
    let here = node_xy(coords, node)?;
    let node_id = I::from_index(node).ok_or(MeshAdjacencyError::IdOverflow { index: node })?;
    ids.iter()
        .enumerate()
        .filter(|(_, link)| !link.is_absent())
        .map(|(slot, &link)| {
            let far = far_endpoint(nodes_at_link, node, node_id, slot, link)?;
            Ok::<f64, MeshAdjacencyError>(angle_between(here, far_xy(coords, far)?))
        })
        .collect()
}

/// `true` if every row is left-compacted and its valid angles are non-decreasing.
pub fn is_normalized<I: ElementId>(
    coords: &Coordinates,
    nodes_at_link: &Table<I>,
    links_at_node: &Table<I>,
) -> Result<bool, MeshAdjacencyError> {
    check_inputs(coords, nodes_at_link, links_at_node)?;
    for (node, row) in links_at_node.rows().enumerate() {
        let n_valid = row.iter().take_while(|c| !c.is_absent()).count();
        if row[n_valid..].iter().any(|c| !c.is_absent()) {
            return Ok(false);
        }
        let angles = angles_at_row(coords, nodes_at_link, node, row)?;
        if angles.windows(2).any(|w| w[0] > w[1]) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn check_inputs<I: ElementId>(
    coords: &Coordinates,
    nodes_at_link: &Table<I>,
    links_at_node: &Table<I>,
) -> Result<(), MeshAdjacencyError> {
    if nodes_at_link.width() != 2 {
        return Err(MeshAdjacencyError::InvalidEndpointWidth {
            found: nodes_at_link.width(),
        });
    }
    if coords.len() != links_at_node.n_rows() {
        return Err(MeshAdjacencyError::ShapeMismatch {
            what: "node coordinates",
            expected: (links_at_node.n_rows(), 2),
            found: (coords.len(), 2),
        });
    }
    let last = links_at_node.n_rows().saturating_sub(1);
    I::from_index(last).ok_or(MeshAdjacencyError::IdOverflow { index: last })?;
    Ok(())
}

fn normalize_row<I: ElementId>(
    ctx: &RowContext<'_, I>,
    node: usize,
    ids: &mut [I],
    dirs: &mut [Orientation],
    scratch: &mut Vec<Spoke<I>>,
) -> Result<(), MeshAdjacencyError> {
    let n_valid = compact_row(ids, dirs);
    if n_valid == 0 {
        return Ok(());
    }

    let here = node_xy(ctx.coords, node)?;
    let node_id = I::from_index(node).ok_or(MeshAdjacencyError::IdOverflow { index: node })?;

    scratch.clear();
    scratch
        .try_reserve(n_valid)
        .map_err(|_| MeshAdjacencyError::AllocationFailure { requested: n_valid })?;
    for slot in 0..n_valid {
        let link = ids[slot];
        let far = far_endpoint(ctx.nodes_at_link, node, node_id, slot, link)?;
        let there = far_xy(ctx.coords, far)?;
        if ctx.check_geometry && there == here {
            return Err(MeshAdjacencyError::DegenerateGeometry {
                node,
                connector: link.as_i64(),
            });
        }
        scratch.push((angle_between(here, there), link, dirs[slot]));
    }

    stable_sort_by_angle(scratch);

    for (slot, &(_, link, dir)) in scratch.iter().enumerate() {
        ids[slot] = link;
        dirs[slot] = dir;
    }
    Ok(())
}

/// Stable ascending sort on the angle component.
fn stable_sort_by_angle<I: Copy>(spokes: &mut [Spoke<I>]) {
    if spokes.len() > INSERTION_SORT_MAX {
        spokes.sort_by(|a, b| a.0.total_cmp(&b.0));
        return;
    }
    for i in 1..spokes.len() {
        let spoke = spokes[i];
        let mut j = i;
        // strict comparison keeps equal angles in input order
        while j > 0 && spokes[j - 1].0.total_cmp(&spoke.0).is_gt() {
            spokes[j] = spokes[j - 1];
            j -= 1;
        }
        spokes[j] = spoke;
    }
}

/// The endpoint of `link` that is not `node`.
#[inline]
fn far_endpoint<I: ElementId>(
    nodes_at_link: &Table<I>,
    node: usize,
    node_id: I,
    slot: usize,
    link: I,
) -> Result<I, MeshAdjacencyError> {
    let n_links = nodes_at_link.n_rows();
    let pair = link
        .index()
        .filter(|&l| l < n_links)
        .map(|l| nodes_at_link.row(l))
        .ok_or(MeshAdjacencyError::ConnectorOutOfRange {
            element: node,
            slot,
            connector: link.as_i64(),
            n_connectors: n_links,
        })?;
    debug_assert!(
        pair[0] == node_id || pair[1] == node_id,
        "link {link} at node {node} has endpoints {pair:?}"
    );
    Ok(if pair[0] == node_id { pair[1] } else { pair[0] })
}

#[inline]
fn node_xy(coords: &Coordinates, node: usize) -> Result<(f64, f64), MeshAdjacencyError> {
    coords.xy(node).ok_or(MeshAdjacencyError::ElementOutOfRange {
        element: node as i64,
        n_elements: coords.len(),
    })
}

#[inline]
fn far_xy<I: ElementId>(coords: &Coordinates, far: I) -> Result<(f64, f64), MeshAdjacencyError> {
    far.index()
        .and_then(|f| coords.xy(f))
        .ok_or(MeshAdjacencyError::ElementOutOfRange {
            element: far.as_i64(),
            n_elements: coords.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Node 0 at the origin with spokes to the four compass points.
    fn compass() -> (Coordinates, Table<i32>) {
        let coords = Coordinates::from_points(&[
            (0.0, 0.0),
            (0.0, 1.0),
            (1.0, 0.0),
            (0.0, -1.0),
            (-1.0, 0.0),
        ]);
        let nodes_at_link = Table::from_rows(&[[0, 1], [0, 2], [3, 0], [4, 0]]);
        (coords, nodes_at_link)
    }

    #[test]
    fn compass_spokes_sort_counterclockwise_from_east() {
        let (coords, nodes_at_link) = compass();
        let mut ids = [0i32, 1, 2, 3];
        let mut dirs = [-1i8, -1, 1, 1];
        sort_row_by_angle(&coords, &nodes_at_link, 0, &mut ids, &mut dirs, false).unwrap();
        assert_eq!(ids, [1, 0, 3, 2]);
        assert_eq!(dirs, [-1, -1, 1, 1]);
    }

    #[test]
    fn equal_angles_keep_input_order() {
        let mut spokes = vec![(1.0, 7i32, 1i8), (0.5, 3, -1), (1.0, 2, -1), (0.5, 9, 1)];
        stable_sort_by_angle(&mut spokes);
        let order: Vec<i32> = spokes.iter().map(|s| s.1).collect();
        assert_eq!(order, vec![3, 9, 7, 2]);
    }

    #[test]
    fn long_rows_use_the_same_ordering() {
        let mut short: Vec<Spoke<i64>> = (0..INSERTION_SORT_MAX as i64)
            .map(|i| (((i * 7) % 5) as f64, i, 0))
            .collect();
        let mut long = short.clone();
        long.extend((100..110).map(|i| (((i * 7) % 5) as f64, i, 0)));
        stable_sort_by_angle(&mut short);
        stable_sort_by_angle(&mut long);
        let long_prefix: Vec<i64> = long.iter().map(|s| s.1).filter(|&i| i < 100).collect();
        let short_ids: Vec<i64> = short.iter().map(|s| s.1).collect();
        assert_eq!(long_prefix, short_ids);
    }

    #[test]
    fn degenerate_geometry_is_opt_in() {
        let coords = Coordinates::from_points(&[(0.0, 0.0), (0.0, 0.0)]);
        let nodes_at_link = Table::from_rows(&[[0i32, 1]]);
        let mut ids = [0i32];
        let mut dirs = [-1i8];
        sort_row_by_angle(&coords, &nodes_at_link, 0, &mut ids, &mut dirs, false).unwrap();
        let err =
            sort_row_by_angle(&coords, &nodes_at_link, 0, &mut ids, &mut dirs, true).unwrap_err();
        assert_eq!(
            err,
            MeshAdjacencyError::DegenerateGeometry {
                node: 0,
                connector: 0
            }
        );
    }

    #[test]
    fn out_of_range_connector_is_an_error() {
        let (coords, nodes_at_link) = compass();
        let mut ids = [9i32, -1];
        let mut dirs = [1i8, 0];
        let err =
            sort_row_by_angle(&coords, &nodes_at_link, 0, &mut ids, &mut dirs, false).unwrap_err();
        assert!(matches!(
            err,
            MeshAdjacencyError::ConnectorOutOfRange { connector: 9, .. }
        ));
    }
}
