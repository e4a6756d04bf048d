//! Command-line interface for solving a grid from a JSON rule file

use crate::algorithm::executor::{AttemptSuccess, SolverConfig, solve_attempts_with};
use crate::io::configuration::{
    DEFAULT_ATTEMPTS, DEFAULT_MAX_BACKTRACKS, DEFAULT_SEED, MAX_ATTEMPTS, MAX_GRID_DIMENSION,
};
use crate::io::error::{Result, WithContext, invalid_parameter};
use crate::io::progress::ProgressManager;
use crate::io::rules;
use crate::spatial::direction::DirectionKind;
use crate::spatial::extraction::{Solution, SolutionRecord};
use crate::spatial::shape::GridShape;
use crate::spatial::tiles::TileSet;
use clap::Parser;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "wavetile")]
#[command(
    author,
    version,
    about = "Fill a grid with tiles that respect adjacency rules"
)]
/// Command-line arguments for the solver
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// JSON rule file with candidates and adjacency rules
    #[arg(value_name = "RULES")]
    pub rules: PathBuf,

    /// Cells along x
    #[arg(short = 'w', long)]
    pub width: usize,

    /// Cells along y (defaults to the width)
    #[arg(short = 'H', long)]
    pub height: Option<usize>,

    /// Cells along z, for 3D rule sets
    #[arg(short = 'd', long)]
    pub depth: Option<usize>,

    /// Connect opposite borders of the grid
    #[arg(long)]
    pub wrap: bool,

    /// Random seed for reproducible generation
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Backtracks allowed per attempt (0 disables backtracking)
    #[arg(short = 'b', long, default_value_t = DEFAULT_MAX_BACKTRACKS)]
    pub max_backtracks: usize,

    /// Independent attempts with consecutive seeds, run in parallel
    #[arg(short, long, default_value_t = DEFAULT_ATTEMPTS)]
    pub attempts: usize,

    /// Force a cell to a candidate: `CELL=NAME` or `X,Y[,Z]=NAME`
    #[arg(short, long, value_name = "CELL=NAME")]
    pub fix: Vec<String>,

    /// Override a candidate weight: `NAME=WEIGHT`
    #[arg(long, value_name = "NAME=WEIGHT")]
    pub weight: Vec<String>,

    /// Print the solution as JSON
    #[arg(short, long)]
    pub json: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Log solver decisions to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet && self.attempts > 1
    }

    /// Grid shape for a tileset's direction set
    ///
    /// # Errors
    ///
    /// Returns an error if a dimension is zero or too large, or the rules use
    /// a custom direction set, which has no grid layout.
    pub fn shape(&self, tileset: &TileSet) -> Result<GridShape> {
        let height = self.height.unwrap_or(self.width);
        check_dimension("width", self.width)?;
        check_dimension("height", height)?;

        let shape = match tileset.directions().kind() {
            DirectionKind::Cartesian2D => {
                if self.depth.is_some_and(|depth| depth > 1) {
                    return Err(invalid_parameter(
                        "depth",
                        &self.depth.unwrap_or_default(),
                        &"the rules describe a 2D tileset",
                    ));
                }
                GridShape::rect(self.width, height)
            }
            DirectionKind::Cartesian3D => {
                let depth = self.depth.unwrap_or(1);
                check_dimension("depth", depth)?;
                GridShape::cuboid(self.width, height, depth)
            }
            DirectionKind::Custom => {
                return Err(invalid_parameter(
                    "rules",
                    &self.rules.display(),
                    &"custom direction sets need an explicit graph, use the library API",
                ));
            }
        };
        Ok(if self.wrap { shape.wrapping() } else { shape })
    }

    /// Solver configuration from the flags
    ///
    /// # Errors
    ///
    /// Returns an error for malformed `--fix` or `--weight` values.
    pub fn solver_config(&self, shape: &GridShape) -> Result<SolverConfig> {
        let mut config = SolverConfig::default()
            .with_seed(self.seed)
            .with_max_backtracks(self.max_backtracks);

        for assignment in &self.fix {
            let (cell, name) = parse_fixed(assignment, shape)?;
            config = config.with_fixed(cell, name);
        }

        if !self.weight.is_empty() {
            let mut weights = BTreeMap::new();
            for entry in &self.weight {
                let (name, weight) = parse_weight(entry)?;
                weights.insert(name, weight);
            }
            config = config.with_weights(weights);
        }
        Ok(config)
    }
}

fn check_dimension(parameter: &'static str, value: usize) -> Result<()> {
    if value == 0 || value > MAX_GRID_DIMENSION {
        return Err(invalid_parameter(
            parameter,
            &value,
            &format!("must be between 1 and {MAX_GRID_DIMENSION}"),
        ));
    }
    Ok(())
}

/// Parse `CELL=NAME` or `X,Y[,Z]=NAME` into a cell index and a candidate name
///
/// # Errors
///
/// Returns an invalid parameter error if the value is malformed or the
/// coordinates lie outside the shape.
pub fn parse_fixed(value: &str, shape: &GridShape) -> Result<(usize, String)> {
    let malformed = |reason: &str| invalid_parameter("fix", &value, &reason);
    let (position, name) = value
        .split_once('=')
        .ok_or_else(|| malformed("expected CELL=NAME"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(malformed("candidate name is empty"));
    }

    let parts = position
        .split(',')
        .map(|part| part.trim().parse::<usize>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|error| invalid_parameter("fix", &value, &format!("bad cell ({error})")))?;

    let cell = match parts.as_slice() {
        [cell] => Some(*cell),
        [x, y] => shape.cell_at([*x, *y, 0]),
        [x, y, z] => shape.cell_at([*x, *y, *z]),
        _ => return Err(malformed("expected one to three coordinates")),
    }
    .ok_or_else(|| malformed("coordinates lie outside the grid"))?;

    Ok((cell, name.to_string()))
}

/// Parse `NAME=WEIGHT`
///
/// # Errors
///
/// Returns an invalid parameter error if the value is malformed.
pub fn parse_weight(value: &str) -> Result<(String, f64)> {
    let (name, weight) = value
        .split_once('=')
        .ok_or_else(|| invalid_parameter("weight", &value, &"expected NAME=WEIGHT"))?;
    let weight = weight
        .trim()
        .parse::<f64>()
        .map_err(|error| invalid_parameter("weight", &value, &error))?;
    Ok((name.trim().to_string(), weight))
}

#[derive(Serialize)]
struct JsonReport {
    seed: u64,
    attempt: usize,
    collapses: usize,
    backtracks: usize,
    #[serde(flatten)]
    solution: SolutionRecord,
}

/// Loads the rules, solves and writes the result
pub struct SolveCommand {
    cli: Cli,
}

impl SolveCommand {
    /// Create a command from parsed arguments
    pub const fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the solve and write the solution to `out`
    ///
    /// # Errors
    ///
    /// Returns an error if the rules cannot be loaded, the arguments are
    /// invalid, no attempt succeeds, or writing fails.
    pub fn execute(&self, out: &mut impl Write) -> Result<()> {
        if self.cli.attempts == 0 || self.cli.attempts > MAX_ATTEMPTS {
            return Err(invalid_parameter(
                "attempts",
                &self.cli.attempts,
                &format!("must be between 1 and {MAX_ATTEMPTS}"),
            ));
        }

        let tileset = rules::load(&self.cli.rules)?;
        let shape = self.cli.shape(&tileset)?;
        let config = self.cli.solver_config(&shape)?;
        info!(
            rules = %self.cli.rules.display(),
            candidates = tileset.len(),
            cells = shape.cell_count(),
            "loaded rules"
        );

        let progress = if self.cli.should_show_progress() {
            ProgressManager::new(self.cli.attempts)
        } else {
            ProgressManager::hidden(self.cli.attempts)
        };
        let outcome = solve_attempts_with(
            Arc::new(tileset),
            &shape,
            &config,
            self.cli.attempts,
            |_, result| progress.complete_attempt(result.is_ok()),
        );
        progress.finish();
        let success = outcome?;

        let stdout = Path::new("<stdout>");
        if self.cli.json {
            self.write_json(out, &success)?;
        } else {
            write_text(out, &success.solution).with_path(stdout, "write solution")?;
        }
        out.flush().with_path(stdout, "flush output")
    }

    fn write_json(&self, out: &mut impl Write, success: &AttemptSuccess) -> Result<()> {
        let report = JsonReport {
            seed: success.seed,
            attempt: success.attempt,
            collapses: success.stats.collapses,
            backtracks: success.stats.backtracks,
            solution: success.solution.to_record(),
        };
        serde_json::to_writer_pretty(&mut *out, &report)
            .map_err(|source| crate::io::error::AlgorithmError::Serialization { source })?;
        writeln!(out).with_path(Path::new("<stdout>"), "write solution")
    }
}

/// Write one row of candidate names per line, layers separated by a blank line
///
/// # Errors
///
/// Propagates write failures.
pub fn write_text(out: &mut impl Write, solution: &Solution) -> std::io::Result<()> {
    let [width, height, depth] = solution.shape().dimensions();
    let column = (0..solution.len())
        .filter_map(|cell| solution.name(cell))
        .map(str::len)
        .max()
        .unwrap_or(0);

    for z in 0..depth {
        if z > 0 {
            writeln!(out)?;
        }
        for y in 0..height {
            let row: Vec<String> = (0..width)
                .map(|x| {
                    let name = solution
                        .shape()
                        .cell_at([x, y, z])
                        .and_then(|cell| solution.name(cell))
                        .unwrap_or("?");
                    format!("{name:<column$}")
                })
                .collect();
            writeln!(out, "{}", row.join(" ").trim_end())?;
        }
    }
    Ok(())
}
