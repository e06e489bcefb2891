//! Error sink for per-message dispatch failures.

use crate::error::DispatchError;
use crate::event::MessageEvent;

/// Receives every failure that occurs while dispatching a message.
///
/// Called from dispatch lanes; implementations must not block for long.
pub trait ErrorSink: Send + Sync {
    fn report(&self, event: &MessageEvent, error: &DispatchError);
}

impl<F> ErrorSink for F
where
    F: Fn(&MessageEvent, &DispatchError) + Send + Sync,
{
    fn report(&self, event: &MessageEvent, error: &DispatchError) {
        self(event, error)
    }
}
