use crate::{
    algorithm::bitset::Domain,
    io::error::InvariantViolation,
    spatial::{grid::Grid, tiles::TileSet},
};
use bitvec::prelude::*;
use std::collections::VecDeque;
use tracing::{debug, trace};

/// How a propagation pass ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropagationOutcome {
    /// Queue drained; the grid is at a locally consistent fixed point
    Stable,
    /// A domain emptied; the rest of the queue was discarded
    Contradiction {
        /// Cell whose domain emptied
        cell: usize,
    },
}

/// Work done by one propagation pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropagationReport {
    /// How the pass ended
    pub outcome: PropagationOutcome,
    /// Cells popped from the queue
    pub visits: usize,
    /// Candidates removed from neighbouring domains
    pub removals: usize,
}

impl PropagationReport {
    /// True if the pass ended in a contradiction
    pub const fn is_contradiction(&self) -> bool {
        matches!(self.outcome, PropagationOutcome::Contradiction { .. })
    }
}

/// FIFO worklist of cells whose neighbours need re-checking
///
/// A membership bitset keeps every cell in the queue at most once.
#[derive(Debug)]
pub struct PropagationQueue {
    queue: VecDeque<usize>,
    queued: BitVec,
}

impl PropagationQueue {
    /// Create an empty queue for a grid of `cell_count` cells
    pub fn new(cell_count: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(cell_count),
            queued: bitvec![0; cell_count],
        }
    }

    /// Enqueue a cell unless it is already waiting or out of range
    pub fn push(&mut self, cell: usize) -> bool {
        match self.queued.get_mut(cell) {
            Some(mut flag) if !*flag => {
                *flag = true;
                drop(flag);
                self.queue.push_back(cell);
                true
            }
            _ => false,
        }
    }

    /// Remove and return the oldest cell
    pub fn pop(&mut self) -> Option<usize> {
        let cell = self.queue.pop_front()?;
        if let Some(mut flag) = self.queued.get_mut(cell) {
            *flag = false;
        }
        Some(cell)
    }

    /// Drop every pending cell
    pub fn clear(&mut self) {
        self.queue.clear();
        self.queued.fill(false);
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Get the number of pending cells
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

/// Arc-consistency engine removing candidates that lost all support
///
/// For each popped cell `C` and neighbour `N` in direction `D`, a candidate
/// of `N` survives only if some candidate of `C` allows it in direction `D`.
/// Every removal strictly shrinks a domain, so a pass performs at most
/// `cells * candidates` removals and always terminates.
#[derive(Debug)]
pub struct Propagator {
    queue: PropagationQueue,
}

impl Propagator {
    /// Create a propagator for a grid of `cell_count` cells
    pub fn new(cell_count: usize) -> Self {
        Self {
            queue: PropagationQueue::new(cell_count),
        }
    }

    /// Propagate the consequences of a change to one cell
    ///
    /// # Errors
    ///
    /// Returns an [`InvariantViolation`] if the grid rejects a restriction.
    pub fn propagate_from(
        &mut self,
        grid: &mut Grid,
        tileset: &TileSet,
        cell: usize,
    ) -> Result<PropagationReport, InvariantViolation> {
        self.propagate(grid, tileset, &[cell])
    }

    /// Bring the whole grid to a fixed point by seeding every cell
    ///
    /// # Errors
    ///
    /// Returns an [`InvariantViolation`] if the grid rejects a restriction.
    pub fn propagate_all(
        &mut self,
        grid: &mut Grid,
        tileset: &TileSet,
    ) -> Result<PropagationReport, InvariantViolation> {
        let seeds: Vec<usize> = (0..grid.cell_count()).collect();
        self.propagate(grid, tileset, &seeds)
    }

    /// Propagate from a set of seed cells
    ///
    /// # Errors
    ///
    /// Returns an [`InvariantViolation`] if the grid rejects a restriction.
    pub fn propagate(
        &mut self,
        grid: &mut Grid,
        tileset: &TileSet,
        seeds: &[usize],
    ) -> Result<PropagationReport, InvariantViolation> {
        self.propagate_with(grid, tileset, seeds, |_, _, _| {})
    }

    /// Propagate, reporting every restriction as `(cell, size before, size after)`
    ///
    /// # Errors
    ///
    /// Returns an [`InvariantViolation`] if the grid rejects a restriction.
    pub fn propagate_with<F>(
        &mut self,
        grid: &mut Grid,
        tileset: &TileSet,
        seeds: &[usize],
        mut on_restrict: F,
    ) -> Result<PropagationReport, InvariantViolation>
    where
        F: FnMut(usize, usize, usize),
    {
        self.queue.clear();
        for &seed in seeds {
            if grid.domain_size(seed) == 0 {
                return Ok(PropagationReport {
                    outcome: PropagationOutcome::Contradiction { cell: seed },
                    visits: 0,
                    removals: 0,
                });
            }
            self.queue.push(seed);
        }

        let mut visits = 0;
        let mut removals = 0;

        while let Some(cell) = self.queue.pop() {
            visits += 1;
            let source = grid.domain(cell);

            for neighbor_index in 0..grid.neighbors(cell).len() {
                let Some(&(neighbor, direction)) = grid.neighbors(cell).get(neighbor_index) else {
                    continue;
                };

                let allowed = tileset.supported(&source, direction);
                let current = grid.domain(neighbor);
                let narrowed = current.intersection(&allowed);
                let before = current.count();
                let after = narrowed.count();
                if after == before {
                    continue;
                }

                grid.restrict(neighbor, &narrowed)?;
                removals += before - after;
                on_restrict(neighbor, before, after);
                trace!(cell = neighbor, before, after, "narrowed domain");

                if after == 0 {
                    // The whole grid state is invalid now, so the remaining queue is moot
                    debug!(cell = neighbor, from = cell, "propagation reached a contradiction");
                    self.queue.clear();
                    return Ok(PropagationReport {
                        outcome: PropagationOutcome::Contradiction { cell: neighbor },
                        visits,
                        removals,
                    });
                }
                self.queue.push(neighbor);
            }
        }

        Ok(PropagationReport {
            outcome: PropagationOutcome::Stable,
            visits,
            removals,
        })
    }
}

/// Remove candidates prohibited next to the grid edge
///
/// Returns the cells that changed, or the first cell left without candidates.
///
/// # Errors
///
/// Returns an [`InvariantViolation`] if the grid rejects a restriction.
pub fn apply_boundary_constraints(
    grid: &mut Grid,
    tileset: &TileSet,
) -> Result<Result<Vec<usize>, usize>, InvariantViolation> {
    let mut changed = Vec::new();
    if !tileset.has_boundary_rules() {
        return Ok(Ok(changed));
    }

    for cell in 0..grid.cell_count() {
        let boundary = grid.boundary_directions(cell);
        if boundary.is_empty() {
            continue;
        }
        let mut allowed = Domain::full(tileset.len());
        for direction in boundary {
            allowed.intersect_with(&tileset.boundary_allowed(direction));
        }
        let narrowed = grid.domain(cell).intersection(&allowed);
        if grid.restrict(cell, &narrowed)? {
            changed.push(cell);
        }
        if narrowed.is_empty() {
            return Ok(Err(cell));
        }
    }
    Ok(Ok(changed))
}

/// First `(cell, neighbour)` pair violating local consistency
///
/// A pair violates it when some candidate of `cell` has no compatible
/// candidate left in the neighbour's domain.
pub fn find_inconsistency(grid: &Grid, tileset: &TileSet) -> Option<(usize, usize)> {
    for cell in 0..grid.cell_count() {
        let domain = grid.domain(cell);
        for &(neighbor, direction) in grid.neighbors(cell) {
            let neighbor_domain = grid.domain(neighbor);
            let unsupported = domain.iter().any(|candidate| {
                tileset
                    .compatible_with(candidate, direction)
                    .intersection(&neighbor_domain)
                    .is_empty()
            });
            if unsupported {
                return Some((cell, neighbor));
            }
        }
    }
    None
}
