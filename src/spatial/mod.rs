//! Spatial data structures
//!
//! This module contains:
//! - Directions and direction sets
//! - Candidates, their adjacency rules and rotated variants
//! - Grid shapes, the neighbour relation and the domain arena
//! - Reading solved grids back out

/// Direction indices and named direction sets
pub mod direction;
/// Solution extraction from a solved grid
pub mod extraction;
/// Domain arena over all cells
pub mod grid;
/// Quarter-turn rotations of cartesian directions
pub mod rotation;
/// Cartesian and graph shapes with their neighbour tables
pub mod shape;
/// Candidates, weights and compatibility tables
pub mod tiles;

pub use grid::Grid;
pub use shape::GridShape;
pub use tiles::{CandidateId, TileSet};
