pub mod backtrack;
pub mod cancellation;
