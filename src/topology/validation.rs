//! Topology validation helpers.
//!
//! The hot paths (angular sort, neighbor resolution) trust their caller that
//! every connector listed at an element names that element as an endpoint.
//! These checks verify that contract, and the geometric one, ahead of time.

use itertools::Itertools;

use crate::data::coordinates::Coordinates;
use crate::mesh_error::MeshAdjacencyError;
use crate::topology::element::{ElementId, INWARD, OUTWARD, Orientation};
use crate::topology::table::Table;

/// Optional validation toggles for incidence checks.
#[derive(Debug, Clone, Copy)]
pub struct ValidationOptions {
    /// Ensure each referenced connector lists the referencing element as an endpoint.
    pub check_endpoints: bool,
    /// Ensure orientation flags agree with the endpoint order (`-1` tail, `+1` head).
    pub check_orientation: bool,
    /// How to handle connectors referenced by a single element.
    pub single_reference: SingleReferenceHandling,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            check_endpoints: true,
            check_orientation: true,
            single_reference: SingleReferenceHandling::Ignore,
        }
    }
}

/// Behavior for connectors that appear in only one row. Boundary links are
/// normally referenced by both of their nodes, but truncated boundary
/// connectors (for instance faces at the grid edge) are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleReferenceHandling {
    /// Accept silently.
    Ignore,
    /// Log a warning per connector.
    Warn,
}

/// Validate `connectors_at_element` against `elements_at_connector` and,
/// when given, its orientation table.
pub fn validate_incidence<I: ElementId>(
    connectors_at_element: &Table<I>,
    elements_at_connector: &Table<I>,
    orientation: Option<&Table<Orientation>>,
    options: ValidationOptions,
) -> Result<(), MeshAdjacencyError> {
    if elements_at_connector.width() != 2 {
        return Err(MeshAdjacencyError::InvalidEndpointWidth {
            found: elements_at_connector.width(),
        });
    }
    if let Some(dirs) = orientation {
        dirs.expect_shape("orientation table", connectors_at_element.shape())?;
    }
    let n_connectors = elements_at_connector.n_rows();

    for (element, row) in connectors_at_element.rows().enumerate() {
        let x = I::from_index(element).ok_or(MeshAdjacencyError::IdOverflow { index: element })?;
        for (slot, &connector) in row.iter().enumerate() {
            if connector.is_absent() {
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
            let pair = elements_at_connector.row(c);
            let inconsistent = MeshAdjacencyError::InconsistentTopology {
                element,
                connector: connector.as_i64(),
            };
            if options.check_endpoints && pair[0] != x && pair[1] != x {
                return Err(inconsistent);
            }
            if let (true, Some(dirs)) = (options.check_orientation, orientation) {
                let dir = dirs.row(element)[slot];
                let ok = (pair[0] == x && dir == OUTWARD) || (pair[1] == x && dir == INWARD);
                if !ok {
                    return Err(inconsistent);
                }
            }
        }
    }

    let counts = connectors_at_element
        .as_slice()
        .iter()
        .filter(|c| !c.is_absent())
        .counts();
    for (connector, count) in counts.into_iter().sorted() {
        let c = connector.index().unwrap_or(usize::MAX);
        if count > 2 {
            return Err(MeshAdjacencyError::ConnectorOverused {
                connector: c,
                count,
            });
        }
        if count == 1 && options.single_reference == SingleReferenceHandling::Warn {
            log::warn!("connector {connector} is referenced by a single element");
        }
    }
    Ok(())
}

/// Reject connectors whose two endpoints share coordinates; the angle from
/// one to the other is undefined.
pub fn validate_geometry<I: ElementId>(
    coords: &Coordinates,
    nodes_at_link: &Table<I>,
) -> Result<(), MeshAdjacencyError> {
    if nodes_at_link.width() != 2 {
        return Err(MeshAdjacencyError::InvalidEndpointWidth {
            found: nodes_at_link.width(),
        });
    }
    for (link, pair) in nodes_at_link.rows().enumerate() {
        let (Some(tail), Some(head)) = (pair[0].index(), pair[1].index()) else {
            continue;
        };
        let out_of_range = |node: usize| MeshAdjacencyError::ElementOutOfRange {
            element: node as i64,
            n_elements: coords.len(),
        };
        let a = coords.xy(tail).ok_or_else(|| out_of_range(tail))?;
        let b = coords.xy(head).ok_or_else(|| out_of_range(head))?;
        if a == b {
            return Err(MeshAdjacencyError::DegenerateGeometry {
                node: tail,
                connector: link as i64,
            });
        }
    }
    Ok(())
}
