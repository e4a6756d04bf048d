//! Wave function collapse solver for tile placement under adjacency rules
//!
//! A [`TileSet`] names candidates and the directions in which they may sit
//! next to each other. The solver fills a 2D grid, a 3D grid or an explicit
//! graph of cells so that every pair of neighbours is compatible, choosing
//! the lowest-entropy cell at each step and backtracking on contradictions.

#![forbid(unsafe_code)]

/// Core algorithm: propagation, selection, backtracking and the solve loop
pub mod algorithm;
/// Input/output operations, configuration and error handling
pub mod io;
/// Entropy calculations
pub mod math;
/// Directions, tilesets, grid shapes and domains
pub mod spatial;

pub use algorithm::cancellation::CancellationToken;
pub use algorithm::executor::{
    AttemptSuccess, SolveStats, Solver, SolverConfig, SolverState, solve, solve_attempts,
};
pub use io::error::{AlgorithmError, DefinitionError, Result, SolveFailure};
pub use spatial::direction::{Direction, DirectionSet};
pub use spatial::extraction::Solution;
pub use spatial::shape::{GraphShape, GridShape};
pub use spatial::rotation::Rotation;
pub use spatial::tiles::{CandidateId, CountLimit, TileSet, TileSetBuilder};
