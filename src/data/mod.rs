//! Data module: node coordinates.

pub mod coordinates;

pub use coordinates::Coordinates;
