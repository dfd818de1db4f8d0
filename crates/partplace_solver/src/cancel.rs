//! Cooperative cancellation shared across the search.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable flag polled at the search's yield points.
///
/// Clones share one flag. A [`child`](CancelToken::child) token has its own
/// flag but also observes every ancestor, so cancelling an improvement round
/// does not cancel the whole solve while cancelling the solve stops every
/// round.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    ancestors: Vec<Arc<AtomicBool>>,
}

impl CancelToken {
    /// Creates an untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a token that is cancelled when either it or `self` is.
    pub fn child(&self) -> Self {
        let mut ancestors = self.ancestors.clone();
        ancestors.push(Arc::clone(&self.flag));
        Self {
            flag: Arc::default(),
            ancestors,
        }
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether this token or any ancestor has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        std::iter::once(&self.flag)
            .chain(&self.ancestors)
            .any(|flag| flag.load(Ordering::Acquire))
    }
}
