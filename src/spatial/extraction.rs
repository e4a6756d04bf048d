//! Reading the final assignment out of a solved grid

use crate::io::error::InvalidStateError;
use crate::spatial::grid::Grid;
use crate::spatial::shape::GridShape;
use crate::spatial::tiles::{CandidateId, TileSet};
use ndarray::{Array2, Array3};
use serde::Serialize;

/// One concrete candidate per cell
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    shape: GridShape,
    assignment: Vec<CandidateId>,
    names: Vec<String>,
}

impl Solution {
    /// Extract the assignment from a grid in which every cell is resolved
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStateError::Unresolved`] for the first cell whose
    /// domain does not hold exactly one candidate.
    pub fn extract(grid: &Grid, tileset: &TileSet) -> Result<Self, InvalidStateError> {
        let mut assignment = Vec::with_capacity(grid.cell_count());
        for cell in 0..grid.cell_count() {
            let candidate = grid
                .domain(cell)
                .single_candidate()
                .ok_or_else(|| InvalidStateError::Unresolved {
                    cell,
                    domain_size: grid.domain_size(cell),
                })?;
            assignment.push(candidate);
        }

        let names = tileset
            .candidates()
            .iter()
            .map(|candidate| candidate.name.clone())
            .collect();

        Ok(Self {
            shape: grid.shape().clone(),
            assignment,
            names,
        })
    }

    /// Shape of the solved grid
    pub const fn shape(&self) -> &GridShape {
        &self.shape
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.assignment.len()
    }

    /// True for a solution without cells (never produced by a solve)
    pub fn is_empty(&self) -> bool {
        self.assignment.is_empty()
    }

    /// Candidate assigned to a cell
    pub fn get(&self, cell: usize) -> Option<CandidateId> {
        self.assignment.get(cell).copied()
    }

    /// Name of the candidate assigned to a cell
    pub fn name(&self, cell: usize) -> Option<&str> {
        self.get(cell)
            .and_then(|candidate| self.names.get(candidate.index()))
            .map(String::as_str)
    }

    /// Candidate at 2D coordinates
    pub fn at_2d(&self, x: usize, y: usize) -> Option<CandidateId> {
        self.at_3d(x, y, 0)
    }

    /// Candidate at 3D coordinates
    pub fn at_3d(&self, x: usize, y: usize, z: usize) -> Option<CandidateId> {
        self.shape.cell_at([x, y, z]).and_then(|cell| self.get(cell))
    }

    /// Assignment indexed by cell
    pub fn candidates(&self) -> &[CandidateId] {
        &self.assignment
    }

    /// Cells with their coordinates and candidates
    pub fn iter(&self) -> impl Iterator<Item = (usize, [usize; 3], CandidateId)> + '_ {
        self.assignment
            .iter()
            .enumerate()
            .map(|(cell, &candidate)| (cell, self.shape.coordinates(cell), candidate))
    }

    /// Layer `z` as a `[y, x]` array of candidate indices
    pub fn to_array2(&self, z: usize) -> Array2<usize> {
        let [width, height, _] = self.shape.dimensions();
        Array2::from_shape_fn((height, width), |(y, x)| {
            self.at_3d(x, y, z).map_or(usize::MAX, CandidateId::index)
        })
    }

    /// Whole grid as a `[z, y, x]` array of candidate indices
    pub fn to_array3(&self) -> Array3<usize> {
        let [width, height, depth] = self.shape.dimensions();
        Array3::from_shape_fn((depth, height, width), |(z, y, x)| {
            self.at_3d(x, y, z).map_or(usize::MAX, CandidateId::index)
        })
    }

    /// Serializable form with candidate names per cell
    pub fn to_record(&self) -> SolutionRecord {
        let [width, height, depth] = self.shape.dimensions();
        SolutionRecord {
            width,
            height,
            depth,
            cells: (0..self.len())
                .map(|cell| self.name(cell).unwrap_or_default().to_string())
                .collect(),
        }
    }
}

/// Plain data view of a [`Solution`], written as JSON by the command line
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SolutionRecord {
    /// Cells along x (node count for graphs)
    pub width: usize,
    /// Cells along y
    pub height: usize,
    /// Cells along z
    pub depth: usize,
    /// Candidate name per cell, indexed like the grid
    pub cells: Vec<String>,
}
