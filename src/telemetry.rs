//! Telemetry utilities for command timing and dispatch correlation.

use std::time::Instant;

/// Guard for timing handler execution and recording metrics.
///
/// Records command latency when dropped, including when the handler panics.
pub struct CommandTimer {
    command: String,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_command(&self.command, duration);
    }
}

/// Standardized span constructors for dispatch observability.
pub mod spans {
    use crate::event::MessageEvent;
    use tracing::{Span, debug_span, info_span};

    /// Create a span covering the dispatch of one message.
    pub fn dispatch(event: &MessageEvent) -> Span {
        debug_span!(
            "dispatch",
            message = %event.id,
            author = %event.author_id,
            channel = %event.channel_kind,
            guild = event.guild_id.as_deref(),
        )
    }

    /// Create a span for a handler invocation.
    pub fn command(name: &str, executor: &str) -> Span {
        info_span!("command", name = %name, executor = %executor)
    }
}
