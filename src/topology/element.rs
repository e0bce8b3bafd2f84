//! Element identifiers and collection kinds.
//!
//! Every mesh collection (nodes, links, patches, ...) indexes its elements
//! with a signed integer id; `-1` marks an absent slot in a padded table.
//! Two interchangeable widths are supported: the *compact* `i32` and the
//! *wide* `i64`. Algorithms are written once against [`ElementId`] and
//! monomorphized per width, so all tables in one call share one width.

use std::fmt::{self, Debug, Display};
use std::hash::Hash;

use num_traits::{NumCast, PrimInt, Signed, ToPrimitive};
use serde::{Deserialize, Serialize};

/// Which integer width an [`ElementId`] implementation uses.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IdWidth {
    /// 32-bit ids.
    Compact,
    /// 64-bit ids.
    Wide,
}

/// A signed element id usable in incidence and endpoint tables.
pub trait ElementId:
    PrimInt + Signed + Hash + Send + Sync + Debug + Display + Default + 'static
{
    /// Padding value for absent slots.
    const ABSENT: Self;
    /// Width tag for diagnostics.
    const WIDTH: IdWidth;

    /// `true` if this slot holds the padding sentinel.
    #[inline]
    fn is_absent(self) -> bool {
        self == Self::ABSENT
    }

    /// Array index for this id, or `None` when negative.
    #[inline]
    fn index(self) -> Option<usize> {
        if self < Self::zero() {
            None
        } else {
            self.to_usize()
        }
    }

    /// Id for array index `i`, or `None` if it does not fit this width.
    #[inline]
    fn from_index(i: usize) -> Option<Self> {
        <Self as NumCast>::from(i)
    }

    /// Widened value used in error reports.
    #[inline]
    fn as_i64(self) -> i64 {
        self.to_i64().unwrap_or(i64::MAX)
    }
}

impl ElementId for i32 {
    const ABSENT: Self = -1;
    const WIDTH: IdWidth = IdWidth::Compact;
}

impl ElementId for i64 {
    const ABSENT: Self = -1;
    const WIDTH: IdWidth = IdWidth::Wide;
}

/// The compact id width.
pub type CompactId = i32;
/// The wide id width.
pub type WideId = i64;

/// Per-slot direction flag: `-1` the connector points away from the element,
/// `+1` it points toward it, `0` for padding.
pub type Orientation = i8;

/// Connector points away from the element (element is the tail).
pub const OUTWARD: Orientation = -1;
/// Connector points toward the element (element is the head).
pub const INWARD: Orientation = 1;

/// A homogeneous mesh collection. Ids in different collections are
/// independent namespaces.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ElementKind {
    Node,
    Link,
    Patch,
    Corner,
    Face,
    Cell,
}

impl ElementKind {
    /// Singular name, as used in relation names (`links_at_node`).
    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Node => "node",
            ElementKind::Link => "link",
            ElementKind::Patch => "patch",
            ElementKind::Corner => "corner",
            ElementKind::Face => "face",
            ElementKind::Cell => "cell",
        }
    }

    /// Plural name.
    pub fn plural(self) -> &'static str {
        match self {
            ElementKind::Patch => "patches",
            ElementKind::Node => "nodes",
            ElementKind::Link => "links",
            ElementKind::Corner => "corners",
            ElementKind::Face => "faces",
            ElementKind::Cell => "cells",
        }
    }

    /// Links join nodes; faces join cells. Only these act as connectors.
    pub fn is_connector(self) -> bool {
        matches!(self, ElementKind::Link | ElementKind::Face)
    }
}

impl Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Names a table of `of` elements stored per `at` element, e.g.
/// `Relation::new(Link, Node)` is `links_at_node`.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Relation {
    pub of: ElementKind,
    pub at: ElementKind,
}

impl Relation {
    /// Connectors incident to each node.
    pub const LINKS_AT_NODE: Relation = Relation::new(ElementKind::Link, ElementKind::Node);
    /// Tail and head node of each link.
    pub const NODES_AT_LINK: Relation = Relation::new(ElementKind::Node, ElementKind::Link);

    #[inline]
    pub const fn new(of: ElementKind, at: ElementKind) -> Self {
        Self { of, at }
    }

    /// `true` when rows are the two endpoints of a connector (`nodes_at_link`).
    #[inline]
    pub fn is_endpoint_relation(&self) -> bool {
        self.at.is_connector() && !self.of.is_connector()
    }
}

impl Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_at_{}", self.of.plural(), self.at.name())
    }
}
