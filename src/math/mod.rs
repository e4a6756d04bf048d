//! Mathematical utilities for the algorithm

/// Shannon entropy of weighted candidate sets
pub mod entropy;
