//! Command definitions, matching and the command registry.
//!
//! Definitions arrive fully formed from the host (executors, required
//! permission, channel scope, handler); this module validates them once and
//! serves them read-only to every dispatch lane.

mod definition;
mod matcher;
mod registry;

pub use definition::{ChannelScope, CommandDefinition, CommandHandler, FnHandler, handler_fn};
pub use matcher::{is_separator, match_executor};
pub use registry::CommandRegistry;
