/// Decision history for chronological backtracking
pub mod backtrack;
/// Fixed-capacity candidate sets
pub mod bitset;
/// Cooperative cancellation of running solves
pub mod cancellation;
/// Global constraints applied between propagation passes
pub mod constraints;
/// Collapse loop, single solves and parallel attempts
pub mod executor;
/// Arc-consistency propagation of domain changes
pub mod propagation;
/// Minimum-entropy cell selection and weighted candidate choice
pub mod selection;
