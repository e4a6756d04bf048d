use crate::{
    algorithm::{
        backtrack::DecisionStack,
        bitset::Domain,
        cancellation::CancellationToken,
        constraints::enforce_count_limits,
        propagation::{PropagationOutcome, PropagationReport, Propagator, apply_boundary_constraints},
        selection::{RandomSelector, select_min_entropy},
    },
    io::configuration::{DEFAULT_MAX_BACKTRACKS, DEFAULT_SEED},
    io::error::{DefinitionError, ExhaustionReason, InvariantViolation, SolveFailure},
    spatial::{extraction::Solution, grid::Grid, shape::GridShape, tiles::TileSet},
};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, error, info, info_span, warn};

/// Parameters of a single solve
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Seed of the random generator; equal seeds give equal results
    pub random_seed: u64,
    /// Rewinds allowed before giving up; 0 disables backtracking
    pub max_backtracks: usize,
    /// Per-candidate weight overrides by name
    pub weights: Option<BTreeMap<String, f64>>,
    /// Cells forced to a named candidate before the first decision
    pub fixed: Vec<(usize, String)>,
    /// Token checked before every cell selection
    pub cancellation: Option<CancellationToken>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            random_seed: DEFAULT_SEED,
            max_backtracks: DEFAULT_MAX_BACKTRACKS,
            weights: None,
            fixed: Vec::new(),
            cancellation: None,
        }
    }
}

impl SolverConfig {
    /// Use a different random seed
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Use a different backtrack budget
    #[must_use]
    pub const fn with_max_backtracks(mut self, max_backtracks: usize) -> Self {
        self.max_backtracks = max_backtracks;
        self
    }

    /// Override candidate weights by name
    #[must_use]
    pub fn with_weights(mut self, weights: BTreeMap<String, f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Force `cell` to the candidate called `name`
    #[must_use]
    pub fn with_fixed(mut self, cell: usize, name: impl Into<String>) -> Self {
        self.fixed.push((cell, name.into()));
        self
    }

    /// Observe a cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

/// Where a solver stands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverState {
    /// More decisions are needed
    Running,
    /// Every cell holds exactly one candidate
    Solved,
    /// A domain emptied while backtracking was disabled
    Contradiction {
        /// Cell whose domain emptied
        cell: usize,
    },
    /// Backtracking ran out of alternatives or budget
    Exhausted {
        /// What ran out
        reason: ExhaustionReason,
    },
    /// The cancellation token fired
    Cancelled,
}

impl SolverState {
    /// True for every state except `Running`
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Counters accumulated over a solve
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// Cells collapsed to a single candidate by a decision
    pub collapses: usize,
    /// Decisions undone
    pub backtracks: usize,
    /// Cells popped by the propagator
    pub propagation_steps: usize,
    /// Candidates removed by propagation
    pub removals: usize,
}

impl SolveStats {
    fn absorb(&mut self, report: &PropagationReport) {
        self.propagation_steps += report.visits;
        self.removals += report.removals;
    }
}

/// Entropy-driven collapse loop with chronological backtracking
///
/// Owns its grid, decision history and random generator; the tileset is
/// shared read-only so independent solvers can run side by side.
#[derive(Debug)]
pub struct Solver {
    tileset: Arc<TileSet>,
    grid: Grid,
    propagator: Propagator,
    history: DecisionStack,
    selector: RandomSelector,
    max_backtracks: usize,
    cancellation: Option<CancellationToken>,
    stats: SolveStats,
    state: SolverState,
}

impl Solver {
    /// Build the grid, apply fixed cells and boundary rules, and propagate once over every cell
    ///
    /// A contradiction found here leaves the solver in a terminal state
    /// rather than failing construction. The removals made here are
    /// committed, so no decision can undo them.
    ///
    /// # Errors
    ///
    /// Returns [`SolveFailure::Definition`] if the weights, fixed cells or
    /// shape do not fit the tileset, and [`SolveFailure::InvariantViolation`]
    /// if the grid rejects an initial restriction.
    pub fn new(tileset: Arc<TileSet>, shape: GridShape, config: SolverConfig) -> Result<Self, SolveFailure> {
        let tileset = match &config.weights {
            Some(overrides) => Arc::new(tileset.with_weights(overrides)?),
            None => tileset,
        };
        let grid = Grid::initialize(shape, &tileset)?;
        let propagator = Propagator::new(grid.cell_count());

        let mut solver = Self {
            tileset,
            grid,
            propagator,
            history: DecisionStack::new(),
            selector: RandomSelector::new(config.random_seed),
            max_backtracks: config.max_backtracks,
            cancellation: config.cancellation,
            stats: SolveStats::default(),
            state: SolverState::Running,
        };

        solver.apply_fixed(&config.fixed)?;
        if let Err(cell) = apply_boundary_constraints(&mut solver.grid, &solver.tileset)? {
            solver.fail_initial(cell);
            return Ok(solver);
        }

        let seeds: Vec<usize> = (0..solver.grid.cell_count()).collect();
        if let PropagationOutcome::Contradiction { cell } = solver.settle(seeds)? {
            solver.fail_initial(cell);
        }
        solver.grid.commit();
        Ok(solver)
    }

    /// Propagate from `seeds`, then apply count limits, until neither changes anything
    fn settle(&mut self, mut seeds: Vec<usize>) -> Result<PropagationOutcome, InvariantViolation> {
        loop {
            let report = self
                .propagator
                .propagate(&mut self.grid, &self.tileset, &seeds)?;
            self.stats.absorb(&report);
            if report.is_contradiction() {
                return Ok(report.outcome);
            }
            match enforce_count_limits(&mut self.grid, &self.tileset)? {
                Err(cell) => return Ok(PropagationOutcome::Contradiction { cell }),
                Ok(changed) if changed.is_empty() => return Ok(PropagationOutcome::Stable),
                Ok(changed) => seeds = changed,
            }
        }
    }

    fn apply_fixed(&mut self, fixed: &[(usize, String)]) -> Result<(), SolveFailure> {
        let cell_count = self.grid.cell_count();
        for (cell, name) in fixed {
            let candidate = self
                .tileset
                .find(name)
                .ok_or_else(|| DefinitionError::UndefinedCandidate { name: name.clone() })?;
            if *cell >= cell_count {
                return Err(DefinitionError::CellOutOfBounds {
                    cell: *cell,
                    cell_count,
                }
                .into());
            }
            let forced = self
                .grid
                .domain(*cell)
                .intersection(&Domain::single(self.tileset.len(), candidate));
            self.grid.restrict(*cell, &forced)?;
            debug!(cell, candidate = %self.tileset.describe(candidate), "fixed cell");
        }
        Ok(())
    }

    fn fail_initial(&mut self, cell: usize) {
        self.state = if self.max_backtracks == 0 {
            SolverState::Contradiction { cell }
        } else {
            SolverState::Exhausted {
                reason: ExhaustionReason::SearchSpaceExhausted,
            }
        };
        info!(cell, "initial constraints are unsatisfiable");
    }

    /// Grid in its current state
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Tileset in use, including weight overrides
    pub fn tileset(&self) -> &TileSet {
        &self.tileset
    }

    /// Number of decisions that can still be undone
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Counters so far
    pub const fn stats(&self) -> SolveStats {
        self.stats
    }

    /// Current state
    pub const fn state(&self) -> SolverState {
        self.state
    }

    /// Advance one selection and collapse cycle, including any recovery
    ///
    /// Terminal states are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns an [`InvariantViolation`] if an internal check fails; the
    /// solver must not be used afterwards.
    pub fn step(&mut self) -> Result<SolverState, InvariantViolation> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }
        self.advance().inspect_err(|violation| {
            error!(%violation, "solver invariant violated");
        })
    }

    /// Step until a terminal state
    ///
    /// # Errors
    ///
    /// Returns an [`InvariantViolation`] if an internal check fails.
    pub fn run(&mut self) -> Result<SolverState, InvariantViolation> {
        while !self.state.is_terminal() {
            self.step()?;
        }
        Ok(self.state)
    }

    fn advance(&mut self) -> Result<SolverState, InvariantViolation> {
        if self
            .cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            self.state = SolverState::Cancelled;
            info!(collapses = self.stats.collapses, "solve cancelled");
            return Ok(self.state);
        }

        let Some(cell) = select_min_entropy(&self.grid, &self.tileset) else {
            self.state = match self.grid.first_contradiction() {
                Some(cell) => {
                    return Err(InvariantViolation {
                        operation: "select",
                        cell,
                        reason: "empty domain survived propagation".to_string(),
                    });
                }
                None => SolverState::Solved,
            };
            info!(
                collapses = self.stats.collapses,
                backtracks = self.stats.backtracks,
                "solved"
            );
            return Ok(self.state);
        };

        let domain = self.grid.domain(cell);
        let candidate = self
            .selector
            .choose_candidate(&domain, &self.tileset)
            .ok_or_else(|| InvariantViolation {
                operation: "collapse",
                cell,
                reason: "selected cell has no candidates".to_string(),
            })?;

        self.history.record(&self.grid, cell, candidate);
        self.grid
            .restrict(cell, &Domain::single(self.tileset.len(), candidate))?;
        self.stats.collapses += 1;
        debug!(
            cell,
            candidate = %self.tileset.describe(candidate),
            options = domain.count(),
            "collapsed cell"
        );

        if let PropagationOutcome::Contradiction { cell } = self.settle(vec![cell])? {
            self.recover(cell)?;
        }
        Ok(self.state)
    }

    /// Undo decisions until propagation succeeds or recovery is impossible
    fn recover(&mut self, contradiction: usize) -> Result<(), InvariantViolation> {
        if self.max_backtracks == 0 {
            self.state = SolverState::Contradiction {
                cell: contradiction,
            };
            info!(cell = contradiction, "contradiction with backtracking disabled");
            return Ok(());
        }

        loop {
            if self.stats.backtracks >= self.max_backtracks {
                self.state = SolverState::Exhausted {
                    reason: ExhaustionReason::BacktrackLimit {
                        limit: self.max_backtracks,
                    },
                };
                warn!(
                    limit = self.max_backtracks,
                    collapses = self.stats.collapses,
                    "backtrack budget exhausted"
                );
                return Ok(());
            }

            let Some((cell, rejected)) = self.history.rewind(&mut self.grid)? else {
                self.state = SolverState::Exhausted {
                    reason: ExhaustionReason::SearchSpaceExhausted,
                };
                info!(
                    backtracks = self.stats.backtracks,
                    "search space exhausted"
                );
                return Ok(());
            };
            self.stats.backtracks += 1;
            debug!(
                cell,
                rejected = %self.tileset.describe(rejected),
                depth = self.history.len(),
                "backtracked"
            );

            self.grid.remove(cell, rejected)?;
            if self.grid.domain_size(cell) == 0 {
                continue;
            }

            if self.settle(vec![cell])? == PropagationOutcome::Stable {
                return Ok(());
            }
        }
    }

    /// Run to completion and convert the terminal state into a result
    ///
    /// # Errors
    ///
    /// Returns the [`SolveFailure`] matching the terminal state.
    pub fn into_solution(mut self) -> Result<Solution, SolveFailure> {
        let state = self.run()?;
        let stats = self.stats;
        match state {
            SolverState::Solved => Solution::extract(&self.grid, &self.tileset).map_err(|error| {
                SolveFailure::InvariantViolation(InvariantViolation {
                    operation: "extract",
                    cell: 0,
                    reason: error.to_string(),
                })
            }),
            SolverState::Contradiction { cell } => Err(SolveFailure::Contradiction { cell }),
            SolverState::Exhausted { reason } => Err(SolveFailure::Exhausted {
                reason,
                backtracks: stats.backtracks,
                collapses: stats.collapses,
            }),
            SolverState::Cancelled => Err(SolveFailure::Cancelled {
                collapses: stats.collapses,
            }),
            SolverState::Running => Err(SolveFailure::InvariantViolation(InvariantViolation {
                operation: "run",
                cell: 0,
                reason: "solver stopped while still running".to_string(),
            })),
        }
    }
}

/// Solve a shape with a tileset in one attempt
///
/// # Errors
///
/// Returns a [`SolveFailure`] describing why no assignment was produced.
pub fn solve(tileset: Arc<TileSet>, shape: GridShape, config: &SolverConfig) -> Result<Solution, SolveFailure> {
    let span = info_span!("solve", seed = config.random_seed);
    let _guard = span.enter();
    Solver::new(tileset, shape, config.clone())?.into_solution()
}

/// Successful attempt of a multi-seed run
#[derive(Clone, Debug)]
pub struct AttemptSuccess {
    /// Index of the attempt, 0-based
    pub attempt: usize,
    /// Seed the attempt used
    pub seed: u64,
    /// The assignment
    pub solution: Solution,
    /// Counters of that attempt
    pub stats: SolveStats,
}

type AttemptResult = Result<AttemptSuccess, SolveFailure>;

fn run_attempt(tileset: Arc<TileSet>, shape: GridShape, config: SolverConfig, attempt: usize) -> AttemptResult {
    let seed = config.random_seed;
    let span = info_span!("attempt", attempt, seed);
    let _guard = span.enter();

    let mut solver = Solver::new(tileset, shape, config)?;
    solver.run()?;
    let stats = solver.stats();
    let solution = solver.into_solution()?;
    Ok(AttemptSuccess {
        attempt,
        seed,
        solution,
        stats,
    })
}

/// Run independent attempts with seeds `seed, seed + 1, ...` in parallel
///
/// See [`solve_attempts_with`].
///
/// # Errors
///
/// Returns the failure of the lowest-index attempt when none succeeds.
pub fn solve_attempts(
    tileset: Arc<TileSet>,
    shape: &GridShape,
    config: &SolverConfig,
    attempts: usize,
) -> AttemptResult {
    solve_attempts_with(tileset, shape, config, attempts, |_, _| {})
}

/// Run independent attempts in parallel, reporting each finished one
///
/// The winner is the successful attempt with the lowest index, so the result
/// does not depend on scheduling. Attempts with a higher index than a known
/// success are skipped. When none succeeds the lowest-index failure is
/// returned, or `Cancelled` if the caller's token fired.
///
/// # Errors
///
/// Returns a [`SolveFailure`] when no attempt produced an assignment.
pub fn solve_attempts_with<F>(
    tileset: Arc<TileSet>,
    shape: &GridShape,
    config: &SolverConfig,
    attempts: usize,
    on_finish: F,
) -> AttemptResult
where
    F: Fn(usize, &AttemptResult) + Sync,
{
    let tileset = match &config.weights {
        Some(overrides) => Arc::new(tileset.with_weights(overrides)?),
        None => tileset,
    };
    let base = SolverConfig {
        weights: None,
        ..config.clone()
    };
    let attempts = attempts.max(1);
    let best = AtomicUsize::new(usize::MAX);

    let outcomes: Vec<Option<AttemptResult>> = (0..attempts)
        .into_par_iter()
        .map(|attempt| {
            if attempt > best.load(Ordering::Acquire) {
                return None;
            }
            let seed = base.random_seed.wrapping_add(attempt as u64);
            let result = run_attempt(
                Arc::clone(&tileset),
                shape.clone(),
                base.clone().with_seed(seed),
                attempt,
            );
            if result.is_ok() {
                best.fetch_min(attempt, Ordering::AcqRel);
            }
            on_finish(attempt, &result);
            Some(result)
        })
        .collect();

    let mut first_failure = None;
    for outcome in outcomes.into_iter().flatten() {
        match outcome {
            Ok(success) => {
                info!(attempt = success.attempt, seed = success.seed, "attempt succeeded");
                return Ok(success);
            }
            Err(failure) => {
                first_failure.get_or_insert(failure);
            }
        }
    }

    if base.is_cancelled() {
        let collapses = match first_failure {
            Some(SolveFailure::Cancelled { collapses }) => collapses,
            _ => 0,
        };
        return Err(SolveFailure::Cancelled { collapses });
    }
    Err(first_failure.unwrap_or(SolveFailure::Exhausted {
        reason: ExhaustionReason::SearchSpaceExhausted,
        backtracks: 0,
        collapses: 0,
    }))
}
