//! Cell domains stored as one contiguous bitset
//!
//! Every cell owns a fixed-width slice of a single [`BitVec`] (cell-major,
//! one bit per candidate). The neighbour relation is fixed when the grid is
//! built; only domains change afterwards, and only by shrinking, apart from
//! [`Grid::rollback`] and an explicit [`Grid::restore`].
//!
//! Every removal since the last [`Grid::commit`] is kept on a trail of
//! `(cell, candidate)` pairs. A checkpoint is just the trail length, and
//! rolling back re-inserts the removals made after it. Since domains only
//! shrink between rollbacks, the trail never holds more than
//! `cells * candidates` entries however many checkpoints are live.

use crate::algorithm::bitset::Domain;
use crate::io::error::{DefinitionError, InvariantViolation};
use crate::spatial::direction::Direction;
use crate::spatial::shape::{Adjacency, GridShape};
use crate::spatial::tiles::{CandidateId, TileSet};
use bitvec::prelude::*;

/// Exact copy of every domain in a grid
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomainSnapshot {
    cells: BitVec,
}

impl DomainSnapshot {
    /// Number of candidates still possible over the whole grid
    pub fn remaining_candidates(&self) -> usize {
        self.cells.count_ones()
    }
}

/// All cells of a solve with their domains and neighbours
#[derive(Clone, Debug)]
pub struct Grid {
    shape: GridShape,
    adjacency: Adjacency,
    candidate_count: usize,
    cells: BitVec,
    sizes: Vec<usize>,
    trail: Vec<(usize, CandidateId)>,
}

impl Grid {
    /// Create one cell per position with every candidate of the tileset possible
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] if the shape is empty, its neighbour
    /// relation is malformed or asymmetric, or its direction set differs from
    /// the tileset's in kind, names or opposites.
    pub fn initialize(shape: GridShape, tileset: &TileSet) -> Result<Self, DefinitionError> {
        let shape_directions = shape.direction_set();
        if shape_directions != *tileset.directions() {
            return Err(DefinitionError::DirectionMismatch {
                tileset: tileset.directions().to_string(),
                shape: shape_directions.to_string(),
            });
        }
        Self::with_candidates(shape, tileset.len())
    }

    /// Create a grid for `candidate_count` anonymous candidates
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] if there are no candidates, or the shape
    /// is empty or its neighbour relation is malformed.
    pub fn with_candidates(shape: GridShape, candidate_count: usize) -> Result<Self, DefinitionError> {
        if candidate_count == 0 {
            return Err(DefinitionError::EmptyTileSet);
        }
        let adjacency = shape.adjacency()?;
        let cell_count = shape.cell_count();

        Ok(Self {
            shape,
            adjacency,
            candidate_count,
            cells: bitvec![1; cell_count * candidate_count],
            sizes: vec![candidate_count; cell_count],
            trail: Vec::new(),
        })
    }

    /// Shape the grid was built from
    pub const fn shape(&self) -> &GridShape {
        &self.shape
    }

    /// Number of cells
    pub fn cell_count(&self) -> usize {
        self.sizes.len()
    }

    /// Number of candidate slots per cell
    pub const fn candidate_count(&self) -> usize {
        self.candidate_count
    }

    /// Neighbours of a cell with the direction leading to each
    pub fn neighbors(&self, cell: usize) -> &[(usize, Direction)] {
        self.adjacency.neighbors(cell)
    }

    /// Directions in which a cell has no neighbour
    pub fn boundary_directions(&self, cell: usize) -> Vec<Direction> {
        self.adjacency.boundary_directions(cell)
    }

    fn slice(&self, cell: usize) -> &BitSlice {
        let start = cell * self.candidate_count;
        self.cells
            .get(start..start + self.candidate_count)
            .unwrap_or_else(|| BitSlice::empty())
    }

    /// Copy of a cell's domain; out-of-range cells read as empty
    pub fn domain(&self, cell: usize) -> Domain {
        if cell >= self.cell_count() {
            return Domain::empty(self.candidate_count);
        }
        Domain::from_bits(self.slice(cell))
    }

    /// Number of candidates still possible at a cell
    pub fn domain_size(&self, cell: usize) -> usize {
        self.sizes.get(cell).copied().unwrap_or(0)
    }

    /// True if `candidate` is still possible at `cell`
    pub fn contains(&self, cell: usize, candidate: CandidateId) -> bool {
        candidate.index() < self.candidate_count
            && self
                .cells
                .get(cell * self.candidate_count + candidate.index())
                .as_deref()
                == Some(&true)
    }

    /// Replace a cell's domain with a subset of itself
    ///
    /// Returns whether the domain changed.
    ///
    /// # Errors
    ///
    /// Returns an [`InvariantViolation`] if the cell does not exist, the domain
    /// has the wrong capacity, or it would add a candidate.
    pub fn restrict(&mut self, cell: usize, domain: &Domain) -> Result<bool, InvariantViolation> {
        if cell >= self.cell_count() {
            return Err(InvariantViolation {
                operation: "restrict",
                cell,
                reason: format!("grid has {} cells", self.cell_count()),
            });
        }
        if domain.capacity() != self.candidate_count {
            return Err(InvariantViolation {
                operation: "restrict",
                cell,
                reason: format!(
                    "domain sized for {} candidates, grid holds {}",
                    domain.capacity(),
                    self.candidate_count
                ),
            });
        }

        let current = self.domain(cell);
        if !domain.is_subset(&current) {
            return Err(InvariantViolation {
                operation: "restrict",
                cell,
                reason: format!("{domain} is not a subset of {current}"),
            });
        }

        let size = domain.count();
        if size == self.domain_size(cell) {
            return Ok(false);
        }

        self.trail.extend(
            current
                .iter()
                .filter(|&candidate| !domain.contains(candidate))
                .map(|candidate| (cell, candidate)),
        );
        let start = cell * self.candidate_count;
        if let Some(slot) = self.cells.get_mut(start..start + self.candidate_count) {
            slot.copy_from_bitslice(domain.bits());
        }
        if let Some(stored) = self.sizes.get_mut(cell) {
            *stored = size;
        }
        Ok(true)
    }

    /// Remove a single candidate from a cell, returning whether it was present
    ///
    /// # Errors
    ///
    /// Returns an [`InvariantViolation`] if the cell does not exist.
    pub fn remove(&mut self, cell: usize, candidate: CandidateId) -> Result<bool, InvariantViolation> {
        let mut domain = self.domain(cell);
        if !domain.remove(candidate) {
            return Ok(false);
        }
        self.restrict(cell, &domain)
    }

    /// Mark the current state so [`Grid::rollback`] can return to it
    pub fn checkpoint(&self) -> usize {
        self.trail.len()
    }

    /// Removals recorded since the last commit
    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    /// Make every removal so far permanent
    pub fn commit(&mut self) {
        self.trail.clear();
    }

    /// Re-insert every candidate removed after `mark`, newest first
    ///
    /// The only way apart from [`Grid::restore`] to grow a domain.
    ///
    /// # Errors
    ///
    /// Returns an [`InvariantViolation`] if `mark` is ahead of the trail, or
    /// the trail names a slot the grid does not have.
    pub fn rollback(&mut self, mark: usize) -> Result<(), InvariantViolation> {
        if mark > self.trail.len() {
            return Err(InvariantViolation {
                operation: "rollback",
                cell: 0,
                reason: format!("checkpoint {mark} is past the trail of {}", self.trail.len()),
            });
        }
        while self.trail.len() > mark {
            let Some((cell, candidate)) = self.trail.pop() else {
                break;
            };
            let slot = if candidate.index() < self.candidate_count {
                self.cells.get_mut(cell * self.candidate_count + candidate.index())
            } else {
                None
            };
            let (Some(mut bit), Some(size)) = (slot, self.sizes.get_mut(cell)) else {
                return Err(InvariantViolation {
                    operation: "rollback",
                    cell,
                    reason: format!("trail names candidate {candidate} outside the grid"),
                });
            };
            *bit = true;
            *size += 1;
        }
        Ok(())
    }

    /// Copy every domain
    pub fn snapshot(&self) -> DomainSnapshot {
        DomainSnapshot {
            cells: self.cells.clone(),
        }
    }

    /// Put every domain back exactly as captured
    ///
    /// Domains may grow. Outstanding checkpoints no longer apply, so the
    /// trail is cleared.
    ///
    /// # Errors
    ///
    /// Returns an [`InvariantViolation`] if the snapshot was taken from a grid
    /// of a different size.
    pub fn restore(&mut self, snapshot: &DomainSnapshot) -> Result<(), InvariantViolation> {
        if snapshot.cells.len() != self.cells.len() {
            return Err(InvariantViolation {
                operation: "restore",
                cell: 0,
                reason: "snapshot belongs to a grid of a different size".to_string(),
            });
        }
        self.cells.copy_from_bitslice(&snapshot.cells);
        let width = self.candidate_count;
        for (cell, size) in self.sizes.iter_mut().enumerate() {
            *size = self
                .cells
                .get(cell * width..(cell + 1) * width)
                .map_or(0, BitSlice::count_ones);
        }
        self.trail.clear();
        Ok(())
    }

    /// True when the grid's domains equal a snapshot
    pub fn matches(&self, snapshot: &DomainSnapshot) -> bool {
        self.cells == snapshot.cells
    }

    /// True when every cell holds exactly one candidate
    pub fn is_solved(&self) -> bool {
        self.sizes.iter().all(|&size| size == 1)
    }

    /// First cell with an empty domain
    pub fn first_contradiction(&self) -> Option<usize> {
        self.sizes.iter().position(|&size| size == 0)
    }

    /// Sum of all domain sizes
    pub fn remaining_candidates(&self) -> usize {
        self.sizes.iter().sum()
    }

    /// Domain sizes indexed by cell
    pub fn domain_sizes(&self) -> &[usize] {
        &self.sizes
    }
}
