mod util;

use std::f64::consts::{FRAC_PI_2, PI};

use mesh_adjacency::algs::angular_sort::{SortOptions, angles_at_row, is_normalized, sort_by_angle};
use mesh_adjacency::algs::compaction::{compact_row, compact_rows};
use mesh_adjacency::data::coordinates::Coordinates;
use mesh_adjacency::mesh_error::MeshAdjacencyError;
use mesh_adjacency::topology::element::{ElementId, ElementKind, Relation};
use mesh_adjacency::topology::registry::ElementRegistry;
use mesh_adjacency::topology::table::Table;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use util::*;

/// Hub node 0 at the origin; links 0..4 point at 90°, 0°, 270°, 180°.
fn compass<I: ElementId>() -> (Coordinates, Table<I>, Table<I>, Table<i8>) {
    let coords = Coordinates::from_points(&[
        (0.0, 0.0),
        (0.0, 2.0),
        (3.0, 0.0),
        (0.0, -1.0),
        (-5.0, 0.0),
    ]);
    let id = |i: usize| I::from_index(i).unwrap();
    let a = I::ABSENT;
    let nodes_at_link = Table::from_rows(&[
        [id(0), id(1)],
        [id(0), id(2)],
        [id(0), id(3)],
        [id(0), id(4)],
    ]);
    let links_at_node = Table::from_rows(&[
        [id(0), id(1), id(2), id(3)],
        [id(0), a, a, a],
        [id(1), a, a, a],
        [id(2), a, a, a],
        [id(3), a, a, a],
    ]);
    let dirs = Table::from_rows(&[
        [-1i8, -1, -1, -1],
        [1, 0, 0, 0],
        [1, 0, 0, 0],
        [1, 0, 0, 0],
        [1, 0, 0, 0],
    ]);
    (coords, nodes_at_link, links_at_node, dirs)
}

fn compass_permutation<I: ElementId>(opts: SortOptions) {
    let (coords, nodes_at_link, mut links, mut dirs) = compass::<I>();
    sort_by_angle(&coords, &nodes_at_link, &mut links, &mut dirs, &opts).unwrap();
    let id = |i: usize| I::from_index(i).unwrap();
    assert_eq!(links.row(0), &[id(1), id(0), id(3), id(2)]);
    let angles = angles_at_row(&coords, &nodes_at_link, 0, links.row(0)).unwrap();
    assert_eq!(angles, vec![0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2]);
}

#[test]
fn compass_links_sort_to_east_north_west_south() {
    compass_permutation::<i32>(SortOptions::serial());
    compass_permutation::<i64>(SortOptions::serial());
    compass_permutation::<i32>(SortOptions::default());
    compass_permutation::<i64>(SortOptions::default());
}

#[test]
fn compaction_happens_before_sorting() {
    let mut ids = [-1i32, 5, -1, 2];
    let mut dirs = [0i8, 1, 0, -1];
    assert_eq!(compact_row(&mut ids, &mut dirs), 2);
    assert_eq!(ids, [5, 2, -1, -1]);
    assert_eq!(dirs, [1, -1, 0, 0]);
}

#[test]
fn padded_rows_are_compacted_and_sorted() {
    let (coords, nodes_at_link, _, _) = compass::<i32>();
    let mut links = Table::from_rows(&[
        [-1, 0, -1, 1, -1, 2, 3, -1],
        [-1, -1, -1, -1, -1, -1, -1, 0],
        [1, -1, -1, -1, -1, -1, -1, -1],
        [-1, -1, -1, 2, -1, -1, -1, -1],
        [-1; 8],
    ]);
    let mut dirs = Table::from_rows(&[
        [0i8, -1, 0, -1, 0, -1, -1, 0],
        [0, 0, 0, 0, 0, 0, 0, 1],
        [1, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 1, 0, 0, 0, 0],
        [0; 8],
    ]);
    sort_by_angle(&coords, &nodes_at_link, &mut links, &mut dirs, &SortOptions::serial()).unwrap();
    assert_eq!(links.row(0), &[1, 0, 3, 2, -1, -1, -1, -1]);
    assert_eq!(links.row(1), &[0, -1, -1, -1, -1, -1, -1, -1]);
    assert_eq!(dirs.row(1), &[1, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(links.row(3), &[2, -1, -1, -1, -1, -1, -1, -1]);
    // all-absent row untouched
    assert_eq!(links.row(4), &[-1; 8]);
    assert!(is_normalized(&coords, &nodes_at_link, &links).unwrap());
}

#[test]
fn equal_angles_preserve_input_order() {
    // Node 0 at the origin. Link 0 runs 0 -> 1 and link 1 runs 2 -> 0, with
    // nodes 1 and 2 both due east, so both links sit at angle 0. Link 2
    // points north and is already last.
    let coords = Coordinates::from_points(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 1.0)]);
    let nodes_at_link = Table::from_rows(&[[0i32, 1], [2, 0], [0, 3]]);

    for order in [[1, 0, 2], [0, 1, 2]] {
        let mut links = Table::from_rows(&[order, [0, -1, -1], [1, -1, -1], [2, -1, -1]]);
        let first_dirs = if order[0] == 1 { [1i8, -1, -1] } else { [-1i8, 1, -1] };
        let mut dirs = Table::from_rows(&[first_dirs, [1, 0, 0], [-1, 0, 0], [1, 0, 0]]);
        sort_by_angle(&coords, &nodes_at_link, &mut links, &mut dirs, &SortOptions::serial())
            .unwrap();
        assert_eq!(links.row(0), &order);
        assert_eq!(dirs.row(0), &first_dirs);
    }
}

#[test]
fn raster_interior_node_is_east_north_west_south() {
    let grid = raster(3, 4, 1.0);
    let (mut links, mut dirs) = raster_incidence::<i32>(&grid);
    let nodes_at_link = narrow::<i32>(&grid.nodes_at_link);
    sort_by_angle(&grid.coords, &nodes_at_link, &mut links, &mut dirs, &SortOptions::default())
        .unwrap();
    assert_eq!(links.row(5), &[8, 11, 7, 4]);
    assert_eq!(dirs.row(5), &[-1, -1, 1, 1]);
    // lower-left corner: east then north
    assert_eq!(links.row(0), &[0, 3, -1, -1]);
    // upper-right corner: west then south
    assert_eq!(links.row(11), &[16, 13, -1, -1]);
}

#[test]
fn normalizing_twice_changes_nothing() {
    let grid = raster(5, 6, 2.5);
    let nodes_at_link = narrow::<i64>(&grid.nodes_at_link);
    let (mut links, mut dirs) = raster_incidence::<i64>(&grid);
    sort_by_angle(&grid.coords, &nodes_at_link, &mut links, &mut dirs, &SortOptions::default())
        .unwrap();
    let (once_links, once_dirs) = (links.clone(), dirs.clone());
    sort_by_angle(&grid.coords, &nodes_at_link, &mut links, &mut dirs, &SortOptions::default())
        .unwrap();
    assert_eq!(links, once_links);
    assert_eq!(dirs, once_dirs);
}

#[test]
fn parallel_and_serial_agree_on_shuffled_rows() {
    let grid = raster(40, 30, 1.0);
    let nodes_at_link = narrow::<i32>(&grid.nodes_at_link);
    let (mut links, mut dirs) = raster_incidence::<i32>(&grid);

    let mut rng = SmallRng::seed_from_u64(7);
    for (ids, flags) in links.rows_mut().zip(dirs.rows_mut()) {
        let mut pairs: Vec<(i32, i8)> = ids.iter().copied().zip(flags.iter().copied()).collect();
        pairs.shuffle(&mut rng);
        for (slot, (id, flag)) in pairs.into_iter().enumerate() {
            ids[slot] = id;
            flags[slot] = flag;
        }
    }

    let (mut serial_links, mut serial_dirs) = (links.clone(), dirs.clone());
    sort_by_angle(
        &grid.coords,
        &nodes_at_link,
        &mut serial_links,
        &mut serial_dirs,
        &SortOptions::serial(),
    )
    .unwrap();
    let parallel = SortOptions {
        parallel: true,
        min_rows_per_task: 1,
        ..SortOptions::default()
    };
    sort_by_angle(&grid.coords, &nodes_at_link, &mut links, &mut dirs, &parallel).unwrap();
    assert_eq!(links, serial_links);
    assert_eq!(dirs, serial_dirs);
    assert!(is_normalized(&grid.coords, &nodes_at_link, &links).unwrap());
}

#[test]
fn mismatched_orientation_shape_is_rejected() {
    let (coords, nodes_at_link, mut links, _) = compass::<i32>();
    let mut dirs = Table::filled(5, 3, 0i8);
    let err = sort_by_angle(&coords, &nodes_at_link, &mut links, &mut dirs, &SortOptions::serial())
        .unwrap_err();
    assert!(matches!(err, MeshAdjacencyError::ShapeMismatch { .. }));
}

#[test]
fn coordinates_must_cover_every_row() {
    let (_, nodes_at_link, mut links, mut dirs) = compass::<i64>();
    let coords = Coordinates::from_points(&[(0.0, 0.0)]);
    let err = sort_by_angle(&coords, &nodes_at_link, &mut links, &mut dirs, &SortOptions::serial())
        .unwrap_err();
    assert!(matches!(err, MeshAdjacencyError::ShapeMismatch { what: "node coordinates", .. }));
}

#[test]
fn whole_table_compaction_keeps_pairs_together() {
    let mut links = Table::from_rows(&[[-1i32, 4, 2], [3, -1, -1]]);
    let mut dirs = Table::from_rows(&[[0i8, 1, -1], [-1, 0, 0]]);
    compact_rows(&mut links, &mut dirs).unwrap();
    assert_eq!(links.to_rows(), vec![vec![4, 2, -1], vec![3, -1, -1]]);
    assert_eq!(dirs.to_rows(), vec![vec![1, -1, 0], vec![-1, 0, 0]]);
}

#[test]
fn registry_needs_coordinates_to_normalize() {
    let mut registry = ElementRegistry::<i32>::default();
    registry.set_count(ElementKind::Node, 2);
    registry.set_count(ElementKind::Link, 1);
    registry
        .insert_relation(Relation::NODES_AT_LINK, Table::from_rows(&[[0, 1]]))
        .unwrap();
    registry
        .insert_relation(Relation::LINKS_AT_NODE, Table::from_rows(&[[0], [0]]))
        .unwrap();
    registry
        .insert_orientation(Relation::LINKS_AT_NODE, Table::from_rows(&[[-1i8], [1]]))
        .unwrap();
    let err = registry
        .normalize_links_at_node(&SortOptions::serial())
        .unwrap_err();
    assert_eq!(err, MeshAdjacencyError::MissingCoordinates);
    // the tables are still in place after the failed call
    assert!(registry.relation(Relation::LINKS_AT_NODE).is_some());
    assert!(registry.orientation(Relation::LINKS_AT_NODE).is_some());
}
