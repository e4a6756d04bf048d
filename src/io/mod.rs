/// Command-line arguments and the solve command
pub mod cli;
/// Constants and defaults
pub mod configuration;
/// Error types and the crate result alias
pub mod error;
/// Tracing subscriber setup for the binary
pub mod logging;
/// Progress display for multi-attempt runs
pub mod progress;
/// JSON rule file format
pub mod rules;
