//! Element registry: per-collection counts, node coordinates and the padded
//! relation tables between collections.
//!
//! The registry is the owner of a topology snapshot. Tables arrive raw from
//! the mesh builder, [`ElementRegistry::normalize_links_at_node`] puts them
//! into canonical counterclockwise order, and afterwards they are read-only
//! until the next edit. Normalization takes `&mut self`, so no reader can
//! observe a table mid-sort.

use std::collections::BTreeMap;

use crate::algs::angular_sort::{SortOptions, is_normalized, sort_by_angle};
use crate::algs::incidence::incidence_from_endpoints;
use crate::algs::neighbors::{ResolveOptions, neighbors_via_connector, neighbors_via_connector_into};
use crate::data::coordinates::Coordinates;
use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshAdjacencyError;
use crate::topology::element::{ElementId, ElementKind, Orientation, Relation};
use crate::topology::table::Table;
use crate::topology::validation::{ValidationOptions, validate_incidence};

/// Construction-time configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Largest number of valid slots allowed in any incidence row.
    pub max_valence: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { max_valence: 8 }
    }
}

/// Counts, coordinates and relation tables for one mesh.
#[derive(Clone, Debug)]
pub struct ElementRegistry<I> {
    config: RegistryConfig,
    counts: BTreeMap<ElementKind, usize>,
    coordinates: Option<Coordinates>,
    relations: BTreeMap<Relation, Table<I>>,
    orientations: BTreeMap<Relation, Table<Orientation>>,
}

impl<I: ElementId> Default for ElementRegistry<I> {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl<I: ElementId> ElementRegistry<I> {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            counts: BTreeMap::new(),
            coordinates: None,
            relations: BTreeMap::new(),
            orientations: BTreeMap::new(),
        }
    }

    /// Build a node/link registry from node coordinates and `nodes_at_link`.
    /// `links_at_node` and `link_dirs_at_node` are derived and left raw.
    pub fn from_nodes_at_link(
        coordinates: Coordinates,
        nodes_at_link: Table<I>,
        config: RegistryConfig,
    ) -> Result<Self, MeshAdjacencyError> {
        let mut registry = Self::new(config);
        let n_nodes = coordinates.len();
        let (links_at_node, link_dirs_at_node) =
            incidence_from_endpoints(&nodes_at_link, n_nodes, config.max_valence)?;
        registry.set_count(ElementKind::Link, nodes_at_link.n_rows());
        registry.set_coordinates(coordinates)?;
        registry.insert_relation(Relation::NODES_AT_LINK, nodes_at_link)?;
        registry.insert_relation(Relation::LINKS_AT_NODE, links_at_node)?;
        registry.insert_orientation(Relation::LINKS_AT_NODE, link_dirs_at_node)?;
        Ok(registry)
    }

    #[inline]
    pub fn config(&self) -> RegistryConfig {
        self.config
    }

    /// Register the number of elements in a collection.
    pub fn set_count(&mut self, kind: ElementKind, n: usize) {
        if let Some(old) = self.counts.insert(kind, n) {
            if old != n {
                log::trace!("{kind} count changed from {old} to {n}");
            }
        }
    }

    /// Number of elements in `kind`.
    pub fn count(&self, kind: ElementKind) -> Result<usize, MeshAdjacencyError> {
        self.counts
            .get(&kind)
            .copied()
            .ok_or(MeshAdjacencyError::UnknownElementCount(kind))
    }

    /// Attach node coordinates. Registers the node count if none is set,
    /// otherwise the lengths must agree.
    pub fn set_coordinates(&mut self, coordinates: Coordinates) -> Result<(), MeshAdjacencyError> {
        match self.counts.get(&ElementKind::Node) {
            Some(&n) if n != coordinates.len() => {
                return Err(MeshAdjacencyError::ShapeMismatch {
                    what: "node coordinates",
                    expected: (n, 2),
                    found: (coordinates.len(), 2),
                });
            }
            Some(_) => {}
            None => {
                self.counts.insert(ElementKind::Node, coordinates.len());
            }
        }
        if self.coordinates.replace(coordinates).is_some() {
            log::trace!("node coordinates replaced; node rows need re-normalization");
        }
        Ok(())
    }

    #[inline]
    pub fn coordinates(&self) -> Option<&Coordinates> {
        self.coordinates.as_ref()
    }

    /// Store a relation table, returning any table it replaces.
    ///
    /// Replacing a table also drops its orientation table, which must then be
    /// re-inserted with [`insert_orientation`](Self::insert_orientation).
    ///
    /// Rows must match the registered count of `relation.at`. Endpoint
    /// relations (`nodes_at_link`, `cells_at_face`, ...) must have width 2;
    /// incidence relations may not exceed the configured maximum valence.
    pub fn insert_relation(
        &mut self,
        relation: Relation,
        table: Table<I>,
    ) -> Result<Option<Table<I>>, MeshAdjacencyError> {
        let n_rows = self.count(relation.at)?;
        if table.n_rows() != n_rows {
            return Err(MeshAdjacencyError::ShapeMismatch {
                what: "relation rows",
                expected: (n_rows, table.width()),
                found: table.shape(),
            });
        }
        if relation.is_endpoint_relation() {
            if table.width() != 2 {
                return Err(MeshAdjacencyError::InvalidEndpointWidth {
                    found: table.width(),
                });
            }
        } else if let Some((element, valence)) = (0..table.n_rows())
            .map(|row| (row, table.valence(row)))
            .find(|&(_, v)| v > self.config.max_valence)
        {
            return Err(MeshAdjacencyError::ValenceExceeded {
                element,
                valence,
                max: self.config.max_valence,
            });
        }
        let previous = self.relations.insert(relation, table);
        if previous.is_some() {
            log::trace!("replaced {relation}");
            // flags belong to the old rows; a new table must be inserted alongside
            if self.orientations.remove(&relation).is_some() {
                log::trace!("dropped orientation of {relation}");
            }
        }
        Ok(previous)
    }

    /// Store the orientation table paired with an existing incidence relation.
    pub fn insert_orientation(
        &mut self,
        relation: Relation,
        table: Table<Orientation>,
    ) -> Result<Option<Table<Orientation>>, MeshAdjacencyError> {
        let incidence = self
            .relations
            .get(&relation)
            .ok_or(MeshAdjacencyError::MissingRelation(relation))?;
        table.expect_shape("orientation table", incidence.shape())?;
        Ok(self.orientations.insert(relation, table))
    }

    #[inline]
    pub fn relation(&self, relation: Relation) -> Option<&Table<I>> {
        self.relations.get(&relation)
    }

    #[inline]
    pub fn orientation(&self, relation: Relation) -> Option<&Table<Orientation>> {
        self.orientations.get(&relation)
    }

    /// Relations currently stored, in a stable order.
    pub fn relations(&self) -> impl Iterator<Item = Relation> + '_ {
        self.relations.keys().copied()
    }

    /// Sort `links_at_node` (with `link_dirs_at_node`) counterclockwise by
    /// the angle toward each link's far node.
    ///
    /// If this fails the two tables are left in an unspecified order and
    /// should be rebuilt.
    pub fn normalize_links_at_node(
        &mut self,
        opts: &SortOptions,
    ) -> Result<(), MeshAdjacencyError> {
        let key = Relation::LINKS_AT_NODE;
        let mut links = self
            .relations
            .remove(&key)
            .ok_or(MeshAdjacencyError::MissingRelation(key))?;
        let Some(mut dirs) = self.orientations.remove(&key) else {
            self.relations.insert(key, links);
            return Err(MeshAdjacencyError::MissingRelation(key));
        };

        let result = match (
            self.coordinates.as_ref(),
            self.relations.get(&Relation::NODES_AT_LINK),
        ) {
            (None, _) => Err(MeshAdjacencyError::MissingCoordinates),
            (_, None) => Err(MeshAdjacencyError::MissingRelation(Relation::NODES_AT_LINK)),
            (Some(coords), Some(nodes_at_link)) => {
                sort_by_angle(coords, nodes_at_link, &mut links, &mut dirs, opts)
            }
        };
        self.relations.insert(key, links);
        self.orientations.insert(key, dirs);
        result?;

        crate::debug_invariants!(
            self.validate_invariants(),
            "ElementRegistry::normalize_links_at_node"
        );
        Ok(())
    }

    /// `true` if `links_at_node` is in canonical counterclockwise order.
    pub fn links_at_node_normalized(&self) -> Result<bool, MeshAdjacencyError> {
        let coords = self
            .coordinates
            .as_ref()
            .ok_or(MeshAdjacencyError::MissingCoordinates)?;
        is_normalized(
            coords,
            self.required(Relation::NODES_AT_LINK)?,
            self.required(Relation::LINKS_AT_NODE)?,
        )
    }

    /// Neighbors of `at` elements across `via` connectors, e.g. the nodes
    /// adjacent to each node across links or the patches adjacent to each
    /// patch across links. `subset` selects rows (all when `None`); the
    /// result has one row per requested element.
    pub fn map_neighbors(
        &self,
        at: ElementKind,
        via: ElementKind,
        subset: Option<&[I]>,
        opts: &ResolveOptions,
    ) -> Result<Table<I>, MeshAdjacencyError> {
        let (connectors_at_element, elements_at_connector) = self.mapping_tables(at, via)?;
        neighbors_via_connector(connectors_at_element, elements_at_connector, subset, opts)
    }

    /// As [`map_neighbors`](Self::map_neighbors), writing into the subset rows
    /// of `out`, which must have the shape of `<via>s_at_<at>`.
    pub fn map_neighbors_into(
        &self,
        at: ElementKind,
        via: ElementKind,
        subset: Option<&[I]>,
        out: &mut Table<I>,
        opts: &ResolveOptions,
    ) -> Result<(), MeshAdjacencyError> {
        let (connectors_at_element, elements_at_connector) = self.mapping_tables(at, via)?;
        neighbors_via_connector_into(
            connectors_at_element,
            elements_at_connector,
            subset,
            out,
            opts,
        )
    }

    fn mapping_tables(
        &self,
        at: ElementKind,
        via: ElementKind,
    ) -> Result<(&Table<I>, &Table<I>), MeshAdjacencyError> {
        if !via.is_connector() {
            return Err(MeshAdjacencyError::UnsupportedMapping(format!(
                "{via} is not a connector (expected link or face)"
            )));
        }
        let endpoints = Relation::new(at, via);
        let elements_at_connector = self.relations.get(&endpoints).ok_or_else(|| {
            MeshAdjacencyError::UnsupportedMapping(format!("registry is missing {endpoints}"))
        })?;
        if elements_at_connector.width() != 2 {
            return Err(MeshAdjacencyError::UnsupportedMapping(format!(
                "{endpoints} must have two columns, found {}",
                elements_at_connector.width()
            )));
        }
        let incidence = Relation::new(via, at);
        let connectors_at_element = self.relations.get(&incidence).ok_or_else(|| {
            MeshAdjacencyError::UnsupportedMapping(format!("registry is missing {incidence}"))
        })?;
        Ok((connectors_at_element, elements_at_connector))
    }

    fn required(&self, relation: Relation) -> Result<&Table<I>, MeshAdjacencyError> {
        self.relations
            .get(&relation)
            .ok_or(MeshAdjacencyError::MissingRelation(relation))
    }
}

impl<I: ElementId> DebugInvariants for ElementRegistry<I> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "ElementRegistry");
    }

    fn validate_invariants(&self) -> Result<(), MeshAdjacencyError> {
        if let Some(coords) = &self.coordinates {
            coords.validate_invariants()?;
            let n_nodes = self.count(ElementKind::Node)?;
            if coords.len() != n_nodes {
                return Err(MeshAdjacencyError::ShapeMismatch {
                    what: "node coordinates",
                    expected: (n_nodes, 2),
                    found: (coords.len(), 2),
                });
            }
        }
        for (relation, table) in &self.relations {
            table.validate_invariants()?;
            let n_rows = self.count(relation.at)?;
            table.expect_shape("relation rows", (n_rows, table.width()))?;
            if relation.is_endpoint_relation() && table.width() != 2 {
                return Err(MeshAdjacencyError::InvalidEndpointWidth {
                    found: table.width(),
                });
            }
        }
        for (relation, dirs) in &self.orientations {
            let incidence = self.required(*relation)?;
            dirs.expect_shape("orientation table", incidence.shape())?;
        }
        if let (Some(links), Some(nodes)) = (
            self.relations.get(&Relation::LINKS_AT_NODE),
            self.relations.get(&Relation::NODES_AT_LINK),
        ) {
            validate_incidence(
                links,
                nodes,
                self.orientations.get(&Relation::LINKS_AT_NODE),
                ValidationOptions::default(),
            )?;
        }
        Ok(())
    }
}
