//! Per-message invocation claim.

use std::sync::atomic::{AtomicBool, Ordering};

/// One-shot commit point for a single message.
///
/// Every lane that finds a matching candidate calls [`try_claim`](Self::try_claim);
/// exactly one call ever returns `true`. A claim lives only as long as the
/// dispatch of the message that created it.
#[derive(Debug, Default)]
pub struct Claim {
    taken: AtomicBool,
}

impl Claim {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt to take the claim. Returns `true` for the single winner.
    #[inline]
    pub fn try_claim(&self) -> bool {
        self.taken
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Whether some lane already holds the claim.
    #[inline]
    pub fn is_claimed(&self) -> bool {
        self.taken.load(Ordering::Acquire)
    }
}
