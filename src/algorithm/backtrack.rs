//! Decision history for chronological backtracking
//!
//! Each collapse records a checkpoint of the grid's removal trail taken right
//! before the choice. Undoing a decision rolls the grid back to that
//! checkpoint exactly and hands back the rejected candidate so the caller can
//! exclude it.

use crate::{
    io::error::InvariantViolation,
    spatial::{grid::Grid, tiles::CandidateId},
};

/// One collapse together with where the grid stood before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Collapsed cell
    pub cell: usize,
    /// Candidate it was collapsed to
    pub candidate: CandidateId,
    /// Trail length before the collapse
    pub mark: usize,
}

/// Stack of decisions, most recent last
#[derive(Debug, Default, Clone)]
pub struct DecisionStack {
    decisions: Vec<Decision>,
}

impl DecisionStack {
    /// Empty history
    pub const fn new() -> Self {
        Self {
            decisions: Vec::new(),
        }
    }

    /// Checkpoint the grid and push a decision for `cell`
    pub fn record(&mut self, grid: &Grid, cell: usize, candidate: CandidateId) {
        self.decisions.push(Decision {
            cell,
            candidate,
            mark: grid.checkpoint(),
        });
    }

    /// Pop the latest decision and roll the grid back to its checkpoint
    ///
    /// Returns `None` when the history is empty.
    ///
    /// # Errors
    ///
    /// Returns an [`InvariantViolation`] if the checkpoint no longer fits the
    /// grid's trail.
    pub fn rewind(&mut self, grid: &mut Grid) -> Result<Option<(usize, CandidateId)>, InvariantViolation> {
        let Some(decision) = self.decisions.pop() else {
            return Ok(None);
        };
        grid.rollback(decision.mark)?;
        Ok(Some((decision.cell, decision.candidate)))
    }

    /// Most recent decision
    pub fn last(&self) -> Option<&Decision> {
        self.decisions.last()
    }

    /// Number of decisions on the stack
    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    /// True when no decision is recorded
    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// Forget every decision
    pub fn clear(&mut self) {
        self.decisions.clear();
    }
}
