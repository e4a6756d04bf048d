use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag asking running solves to stop
///
/// Clones observe the same flag. A solver checks it before every cell
/// selection and ends with a `Cancelled` outcome once it is set.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// A token that has not fired
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every solve holding a clone of this token
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// True once [`CancellationToken::cancel`] was called on any clone
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
