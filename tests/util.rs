#![allow(dead_code)]
use mesh_adjacency::{
    algs::incidence::{endpoints_from_incidence, incidence_from_endpoints},
    data::coordinates::Coordinates,
    topology::element::{ElementId, ElementKind, Orientation, Relation},
    topology::registry::{ElementRegistry, RegistryConfig},
    topology::table::Table,
};

/// A structured rectangular grid with raster link and patch numbering.
///
/// Nodes are numbered row by row from the lower left. Each row contributes
/// its horizontal links, then the vertical links up to the next row. Patch
/// links are listed right, top, left, bottom.
pub struct Raster {
    pub shape: (usize, usize),
    pub coords: Coordinates,
    pub nodes_at_link: Table<i64>,
    pub links_at_patch: Table<i64>,
}

impl Raster {
    pub fn n_nodes(&self) -> usize {
        self.shape.0 * self.shape.1
    }

    pub fn n_links(&self) -> usize {
        self.nodes_at_link.n_rows()
    }

    pub fn n_patches(&self) -> usize {
        self.links_at_patch.n_rows()
    }
}

pub fn raster(n_rows: usize, n_cols: usize, spacing: f64) -> Raster {
    let node = |r: usize, c: usize| (r * n_cols + c) as i64;
    let per_row = 2 * n_cols - 1;
    let horizontal = |r: usize, c: usize| (r * per_row + c) as i64;
    let vertical = |r: usize, c: usize| (r * per_row + n_cols - 1 + c) as i64;

    let mut points = Vec::with_capacity(n_rows * n_cols);
    for r in 0..n_rows {
        for c in 0..n_cols {
            points.push((c as f64 * spacing, r as f64 * spacing));
        }
    }

    let mut nodes_at_link = Vec::new();
    for r in 0..n_rows {
        for c in 0..n_cols - 1 {
            nodes_at_link.extend([node(r, c), node(r, c + 1)]);
        }
        if r + 1 < n_rows {
            for c in 0..n_cols {
                nodes_at_link.extend([node(r, c), node(r + 1, c)]);
            }
        }
    }

    let mut links_at_patch = Vec::new();
    for r in 0..n_rows - 1 {
        for c in 0..n_cols - 1 {
            links_at_patch.extend([
                vertical(r, c + 1),
                horizontal(r + 1, c),
                vertical(r, c),
                horizontal(r, c),
            ]);
        }
    }

    Raster {
        shape: (n_rows, n_cols),
        coords: Coordinates::from_points(&points),
        nodes_at_link: Table::from_vec(nodes_at_link, 2).unwrap(),
        links_at_patch: Table::from_vec(links_at_patch, 4).unwrap(),
    }
}

/// Registry holding nodes, links and patches of a raster, with node rows
/// still raw.
pub fn raster_registry<I: ElementId>(grid: &Raster) -> ElementRegistry<I> {
    let nodes_at_link = narrow::<I>(&grid.nodes_at_link);
    let links_at_patch = narrow::<I>(&grid.links_at_patch);
    let patches_at_link = endpoints_from_incidence(&links_at_patch, grid.n_links()).unwrap();

    let mut registry = ElementRegistry::from_nodes_at_link(
        grid.coords.clone(),
        nodes_at_link,
        RegistryConfig::default(),
    )
    .unwrap();
    registry.set_count(ElementKind::Patch, grid.n_patches());
    registry
        .insert_relation(Relation::new(ElementKind::Link, ElementKind::Patch), links_at_patch)
        .unwrap();
    registry
        .insert_relation(Relation::new(ElementKind::Patch, ElementKind::Link), patches_at_link)
        .unwrap();
    registry
}

/// Raw incidence and orientation tables for a raster.
pub fn raster_incidence<I: ElementId>(grid: &Raster) -> (Table<I>, Table<Orientation>) {
    incidence_from_endpoints(&narrow::<I>(&grid.nodes_at_link), grid.n_nodes(), 8).unwrap()
}

/// Convert a table to another id width.
pub fn narrow<I: ElementId>(table: &Table<i64>) -> Table<I> {
    let data = table
        .as_slice()
        .iter()
        .map(|&v| {
            if v < 0 {
                I::ABSENT
            } else {
                I::from_index(v as usize).expect("id fits")
            }
        })
        .collect();
    Table::from_vec(data, table.width()).unwrap()
}

/// Assert vec is a permutation of another vec (order-agnostic).
pub fn assert_permutation<T: Ord + Copy + std::fmt::Debug>(got: &[T], want: &[T]) {
    let mut a = got.to_vec();
    a.sort_unstable();
    let mut b = want.to_vec();
    b.sort_unstable();
    assert_eq!(a, b, "not a permutation\n got={:?}\nwant={:?}", got, want);
}
