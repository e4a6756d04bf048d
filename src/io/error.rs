//! Error types for tileset definition, solving, extraction and the command line

use std::fmt;
use std::path::{Path, PathBuf};

/// Malformed or inconsistent input, detected before any solve attempt
///
/// Not retryable: the caller has to fix the rules, the shape or the config.
#[derive(Debug, Clone, PartialEq)]
pub enum DefinitionError {
    /// A tileset needs at least one candidate
    EmptyTileSet,

    /// Two candidates share a name
    DuplicateCandidate {
        /// The repeated name
        name: String,
    },

    /// A weight is zero, negative or not finite
    InvalidWeight {
        /// Candidate carrying the weight
        candidate: String,
        /// The rejected weight
        weight: f64,
    },

    /// A rule, override or fixed cell references a candidate that does not exist
    UndefinedCandidate {
        /// Name (or id) as referenced
        name: String,
    },

    /// A rule references a direction the direction set does not define
    UnknownDirection {
        /// Name as referenced
        name: String,
    },

    /// A custom direction set is malformed
    InvalidDirectionSet {
        /// What is wrong with it
        reason: String,
    },

    /// The grid shape and the tileset use different direction sets
    DirectionMismatch {
        /// Direction set of the tileset, as displayed
        tileset: String,
        /// Direction set of the grid shape, as displayed
        shape: String,
    },

    /// The grid shape has no cells
    EmptyGrid,

    /// `neighbor` is reachable from `cell` but not the other way around
    AsymmetricNeighbor {
        /// Cell whose edge has no reverse
        cell: usize,
        /// Neighbour on the other end of that edge
        neighbor: usize,
        /// Direction of the edge from `cell`
        direction: usize,
    },

    /// An edge is duplicated, loops onto its own cell, or leaves the grid
    InvalidNeighbor {
        /// Cell owning the edge
        cell: usize,
        /// What is wrong with it
        reason: String,
    },

    /// A count limit has no candidates or a maximum of zero
    InvalidCountLimit {
        /// What is wrong with it
        reason: String,
    },

    /// Rotated variants need a direction set with a horizontal plane
    RotationUnsupported {
        /// Candidate asking for rotations
        candidate: String,
    },

    /// A fixed cell lies outside the grid
    CellOutOfBounds {
        /// The requested cell
        cell: usize,
        /// Number of cells in the grid
        cell_count: usize,
    },
}

impl fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTileSet => write!(f, "Tileset defines no candidates"),
            Self::DuplicateCandidate { name } => {
                write!(f, "Candidate '{name}' is defined more than once")
            }
            Self::InvalidWeight { candidate, weight } => {
                write!(
                    f,
                    "Candidate '{candidate}' has weight {weight}, weights must be positive and finite"
                )
            }
            Self::UndefinedCandidate { name } => {
                write!(f, "Candidate '{name}' is referenced but never defined")
            }
            Self::UnknownDirection { name } => write!(f, "Unknown direction '{name}'"),
            Self::InvalidDirectionSet { reason } => write!(f, "Invalid direction set: {reason}"),
            Self::DirectionMismatch { tileset, shape } => {
                write!(
                    f,
                    "Tileset directions {tileset} differ from the grid shape's {shape}"
                )
            }
            Self::EmptyGrid => write!(f, "Grid shape has no cells"),
            Self::AsymmetricNeighbor {
                cell,
                neighbor,
                direction,
            } => {
                write!(
                    f,
                    "Cell {neighbor} is a neighbour of cell {cell} in direction {direction}, but not the reverse"
                )
            }
            Self::InvalidNeighbor { cell, reason } => {
                write!(f, "Invalid neighbour of cell {cell}: {reason}")
            }
            Self::InvalidCountLimit { reason } => write!(f, "Invalid count limit: {reason}"),
            Self::RotationUnsupported { candidate } => {
                write!(
                    f,
                    "Candidate '{candidate}' is rotatable but the direction set is not cartesian"
                )
            }
            Self::CellOutOfBounds { cell, cell_count } => {
                write!(f, "Cell {cell} is out of bounds (grid has {cell_count} cells)")
            }
        }
    }
}

impl std::error::Error for DefinitionError {}

/// An internal consistency check failed
///
/// Indicates a bug in the grid or propagator rather than bad input; it is the
/// only failure treated as fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Operation that detected the violation
    pub operation: &'static str,
    /// Cell involved
    pub cell: usize,
    /// Description of the broken invariant
    pub reason: String,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invariant violated during {} at cell {}: {}",
            self.operation, self.cell, self.reason
        )
    }
}

impl std::error::Error for InvariantViolation {}

/// Why a solve gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustionReason {
    /// Every decision was undone and no alternative remains
    SearchSpaceExhausted,
    /// The configured backtrack budget ran out
    BacktrackLimit {
        /// The configured budget
        limit: usize,
    },
}

impl fmt::Display for ExhaustionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SearchSpaceExhausted => write!(f, "no alternatives remain"),
            Self::BacktrackLimit { limit } => write!(f, "backtrack limit of {limit} reached"),
        }
    }
}

/// Typed outcome of a solve that produced no assignment
#[derive(Debug, Clone, PartialEq)]
pub enum SolveFailure {
    /// A domain emptied and backtracking is disabled
    Contradiction {
        /// Cell whose domain emptied
        cell: usize,
    },

    /// Backtracking could not recover
    Exhausted {
        /// What ran out
        reason: ExhaustionReason,
        /// Backtracks performed before giving up
        backtracks: usize,
        /// Collapses performed before giving up
        collapses: usize,
    },

    /// The cancellation token fired
    Cancelled {
        /// Collapses performed before cancellation was observed
        collapses: usize,
    },

    /// Input rejected before solving
    Definition(DefinitionError),

    /// Internal bug, fatal to this operation
    InvariantViolation(InvariantViolation),
}

impl SolveFailure {
    /// True for outcomes a caller can recover from by re-seeding or relaxing constraints
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Contradiction { .. } | Self::Exhausted { .. } | Self::Cancelled { .. }
        )
    }

    /// True only for internal invariant violations
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }
}

impl fmt::Display for SolveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contradiction { cell } => {
                write!(f, "Contradiction at cell {cell} with backtracking disabled")
            }
            Self::Exhausted {
                reason,
                backtracks,
                collapses,
            } => {
                write!(
                    f,
                    "Solve exhausted: {reason} ({collapses} collapses, {backtracks} backtracks)"
                )
            }
            Self::Cancelled { collapses } => {
                write!(f, "Solve cancelled after {collapses} collapses")
            }
            Self::Definition(error) => write!(f, "{error}"),
            Self::InvariantViolation(violation) => write!(f, "{violation}"),
        }
    }
}

impl std::error::Error for SolveFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Definition(error) => Some(error),
            Self::InvariantViolation(violation) => Some(violation),
            _ => None,
        }
    }
}

impl From<DefinitionError> for SolveFailure {
    fn from(error: DefinitionError) -> Self {
        Self::Definition(error)
    }
}

impl From<InvariantViolation> for SolveFailure {
    fn from(violation: InvariantViolation) -> Self {
        Self::InvariantViolation(violation)
    }
}

/// Extraction was attempted on a grid that is not fully resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidStateError {
    /// A cell still holds zero or several candidates
    Unresolved {
        /// First offending cell
        cell: usize,
        /// Its domain size
        domain_size: usize,
    },
}

impl fmt::Display for InvalidStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved { cell, domain_size } => {
                write!(
                    f,
                    "Cell {cell} is unresolved ({domain_size} candidates), grid is not solved"
                )
            }
        }
    }
}

impl std::error::Error for InvalidStateError {}

/// Crate-level error for the rule loader and the command line
#[derive(Debug)]
pub enum AlgorithmError {
    /// Rule file could not be parsed
    RulesLoad {
        /// Path to the rule file
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// Solution could not be serialized
    Serialization {
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Tileset, shape or config rejected
    Definition(DefinitionError),

    /// Solve finished without an assignment
    Solve(SolveFailure),

    /// Extraction from an unsolved grid
    InvalidState(InvalidStateError),
}

impl fmt::Display for AlgorithmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RulesLoad { path, source } => {
                write!(f, "Failed to load rules '{}': {source}", path.display())
            }
            Self::Serialization { source } => write!(f, "Failed to serialize solution: {source}"),
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::Definition(error) => write!(f, "{error}"),
            Self::Solve(failure) => write!(f, "{failure}"),
            Self::InvalidState(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for AlgorithmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RulesLoad { source, .. } | Self::Serialization { source } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            Self::Definition(error) => Some(error),
            Self::Solve(failure) => Some(failure),
            Self::InvalidState(error) => Some(error),
            Self::InvalidParameter { .. } => None,
        }
    }
}

/// Convenience type alias for crate-level results
pub type Result<T> = std::result::Result<T, AlgorithmError>;

/// Attaches the path and operation to I/O failures
pub trait WithContext<T> {
    /// Convert an I/O error into [`AlgorithmError::FileSystem`] for `path`
    ///
    /// # Errors
    ///
    /// Propagates the original error with the path and operation applied
    fn with_path(self, path: &Path, operation: &'static str) -> Result<T>;
}

impl<T> WithContext<T> for std::result::Result<T, std::io::Error> {
    fn with_path(self, path: &Path, operation: &'static str) -> Result<T> {
        self.map_err(|source| AlgorithmError::FileSystem {
            path: path.to_path_buf(),
            operation,
            source,
        })
    }
}

impl From<std::io::Error> for AlgorithmError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

impl From<DefinitionError> for AlgorithmError {
    fn from(error: DefinitionError) -> Self {
        Self::Definition(error)
    }
}

impl From<SolveFailure> for AlgorithmError {
    fn from(failure: SolveFailure) -> Self {
        match failure {
            SolveFailure::Definition(error) => Self::Definition(error),
            other => Self::Solve(other),
        }
    }
}

impl From<InvalidStateError> for AlgorithmError {
    fn from(error: InvalidStateError) -> Self {
        Self::InvalidState(error)
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> AlgorithmError {
    AlgorithmError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
