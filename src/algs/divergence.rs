//! Net flux and flux divergence at cells from oriented face tables.
//!
//! Fluxes are signed along each face's own direction. A face oriented `+1`
//! at a cell points into it, so a positive flux on that face is inflow; `-1`
//! points out of the cell. The net *outflux* of cell `c` is therefore
//! `-Σ_k width[f] · flux[f] · dir[c, k]` over the valid faces `f` of `c`.
//!
//! The `*_at_nodes` forms take fluxes along links instead, read them through
//! `link_at_face`, and scatter the cell results onto `node_at_cell`. Nodes
//! without a cell (the perimeter) get zero.

use crate::mesh_error::MeshAdjacencyError;
use crate::topology::element::{ElementId, Orientation};
use crate::topology::table::Table;

/// Net outflux (negative for net influx) at every cell, in flux × length units.
pub fn net_face_flux_at_cells<I: ElementId>(
    faces_at_cell: &Table<I>,
    face_dirs_at_cell: &Table<Orientation>,
    face_width: &[f64],
    unit_flux_at_faces: &[f64],
) -> Result<Vec<f64>, MeshAdjacencyError> {
    face_dirs_at_cell.expect_shape("face orientation table", faces_at_cell.shape())?;
    if face_width.len() != unit_flux_at_faces.len() {
        return Err(MeshAdjacencyError::ShapeMismatch {
            what: "face widths",
            expected: (unit_flux_at_faces.len(), 1),
            found: (face_width.len(), 1),
        });
    }
    let n_faces = face_width.len();

    faces_at_cell
        .rows()
        .zip(face_dirs_at_cell.rows())
        .enumerate()
        .map(|(cell, (faces, dirs))| {
            let mut net = 0.0;
            for (slot, (&face, &dir)) in faces.iter().zip(dirs).enumerate() {
                if face.is_absent() {
                    continue;
                }
                let f = face.index().filter(|&f| f < n_faces).ok_or(
                    MeshAdjacencyError::ConnectorOutOfRange {
                        element: cell,
                        slot,
                        connector: face.as_i64(),
                        n_connectors: n_faces,
                    },
                )?;
                net -= face_width[f] * unit_flux_at_faces[f] * f64::from(dir);
            }
            Ok::<f64, MeshAdjacencyError>(net)
        })
        .collect()
}

/// Net outflux per unit cell area.
pub fn face_flux_divergence_at_cells<I: ElementId>(
    faces_at_cell: &Table<I>,
    face_dirs_at_cell: &Table<Orientation>,
    face_width: &[f64],
    unit_flux_at_faces: &[f64],
    cell_area: &[f64],
) -> Result<Vec<f64>, MeshAdjacencyError> {
    if cell_area.len() != faces_at_cell.n_rows() {
        return Err(MeshAdjacencyError::ShapeMismatch {
            what: "cell areas",
            expected: (faces_at_cell.n_rows(), 1),
            found: (cell_area.len(), 1),
        });
    }
    let mut net =
        net_face_flux_at_cells(faces_at_cell, face_dirs_at_cell, face_width, unit_flux_at_faces)?;
    for (value, &area) in net.iter_mut().zip(cell_area) {
        *value /= area;
    }
    Ok(net)
}

/// Net outflux at every node from fluxes along links, zero at nodes without
/// a cell.
pub fn net_link_flux_at_nodes<I: ElementId>(
    faces_at_cell: &Table<I>,
    face_dirs_at_cell: &Table<Orientation>,
    face_width: &[f64],
    link_at_face: &[I],
    node_at_cell: &[I],
    n_nodes: usize,
    unit_flux_at_links: &[f64],
) -> Result<Vec<f64>, MeshAdjacencyError> {
    let flux_at_faces = flux_at_faces(link_at_face, face_width.len(), unit_flux_at_links)?;
    let net =
        net_face_flux_at_cells(faces_at_cell, face_dirs_at_cell, face_width, &flux_at_faces)?;
    scatter_to_nodes(&net, node_at_cell, n_nodes)
}

/// Net outflux per unit cell area at every node, zero at nodes without a cell.
#[allow(clippy::too_many_arguments)]
pub fn link_flux_divergence_at_nodes<I: ElementId>(
    faces_at_cell: &Table<I>,
    face_dirs_at_cell: &Table<Orientation>,
    face_width: &[f64],
    link_at_face: &[I],
    node_at_cell: &[I],
    n_nodes: usize,
    unit_flux_at_links: &[f64],
    cell_area: &[f64],
) -> Result<Vec<f64>, MeshAdjacencyError> {
    let flux_at_faces = flux_at_faces(link_at_face, face_width.len(), unit_flux_at_links)?;
    let div = face_flux_divergence_at_cells(
        faces_at_cell,
        face_dirs_at_cell,
        face_width,
        &flux_at_faces,
        cell_area,
    )?;
    scatter_to_nodes(&div, node_at_cell, n_nodes)
}

fn flux_at_faces<I: ElementId>(
    link_at_face: &[I],
    n_faces: usize,
    unit_flux_at_links: &[f64],
) -> Result<Vec<f64>, MeshAdjacencyError> {
    if link_at_face.len() != n_faces {
        return Err(MeshAdjacencyError::ShapeMismatch {
            what: "link at face",
            expected: (n_faces, 1),
            found: (link_at_face.len(), 1),
        });
    }
    link_at_face
        .iter()
        .map(|&link| {
            link.index()
                .and_then(|l| unit_flux_at_links.get(l).copied())
                .ok_or(MeshAdjacencyError::ElementOutOfRange {
                    element: link.as_i64(),
                    n_elements: unit_flux_at_links.len(),
                })
        })
        .collect()
}

fn scatter_to_nodes<I: ElementId>(
    at_cells: &[f64],
    node_at_cell: &[I],
    n_nodes: usize,
) -> Result<Vec<f64>, MeshAdjacencyError> {
    if node_at_cell.len() != at_cells.len() {
        return Err(MeshAdjacencyError::ShapeMismatch {
            what: "node at cell",
            expected: (at_cells.len(), 1),
            found: (node_at_cell.len(), 1),
        });
    }
    let mut out = vec![0.0; n_nodes];
    for (&node, &value) in node_at_cell.iter().zip(at_cells) {
        let slot = node
            .index()
            .and_then(|n| out.get_mut(n))
            .ok_or(MeshAdjacencyError::ElementOutOfRange {
                element: node.as_i64(),
                n_elements: n_nodes,
            })?;
        *slot = value;
    }
    Ok(out)
}
