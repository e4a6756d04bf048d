//! Solver constants and runtime configuration defaults

// Default values for configurable parameters
/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;

/// Backtracks allowed before a solve is reported as exhausted
pub const DEFAULT_MAX_BACKTRACKS: usize = 1000;

/// Weight given to candidates that do not specify one
pub const DEFAULT_CANDIDATE_WEIGHT: f64 = 1.0;

/// Independent seeded attempts made by the command line by default
pub const DEFAULT_ATTEMPTS: usize = 1;

// Safety limit to prevent excessive memory allocation
/// Maximum allowed grid dimension along any axis
pub const MAX_GRID_DIMENSION: usize = 10_000;

/// Maximum number of attempts accepted from the command line
pub const MAX_ATTEMPTS: usize = 4096;

// Logging
/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "warn";
/// Filter used by `--verbose` when `RUST_LOG` is unset
pub const VERBOSE_LOG_FILTER: &str = "wavetile=debug";

// Progress bar display settings
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;
