//! Invocation context handed to command handlers.

use crate::commands::CommandDefinition;
use crate::event::{ChannelKind, MessageEvent};
use std::sync::Arc;

/// Read-only view of one invocation.
///
/// Created by the winning lane right before the handler runs and owned by
/// that single invocation.
#[derive(Debug, Clone)]
pub struct CommandContext {
    prefix: String,
    arguments: String,
    executor: String,
    event: Arc<MessageEvent>,
    command: Arc<CommandDefinition>,
}

impl CommandContext {
    pub fn new(
        prefix: impl Into<String>,
        arguments: impl Into<String>,
        executor: impl Into<String>,
        event: Arc<MessageEvent>,
        command: Arc<CommandDefinition>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            arguments: arguments.into(),
            executor: executor.into(),
            event,
            command,
        }
    }

    /// The prefix or bot mention that introduced the invocation.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Text after the executor and one separator; empty if none.
    pub fn arguments(&self) -> &str {
        &self.arguments
    }

    /// Arguments split on whitespace.
    pub fn args(&self) -> Vec<&str> {
        self.arguments.split_whitespace().collect()
    }

    /// The executor (name or alias) as registered, that matched.
    pub fn executor(&self) -> &str {
        &self.executor
    }

    pub fn event(&self) -> &MessageEvent {
        &self.event
    }

    pub fn command(&self) -> &CommandDefinition {
        &self.command
    }

    pub fn author_id(&self) -> &str {
        &self.event.author_id
    }

    pub fn channel_kind(&self) -> ChannelKind {
        self.event.channel_kind
    }

    pub fn guild_id(&self) -> Option<&str> {
        self.event.guild_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::handler_fn;
    use crate::event::MemberContext;

    #[test]
    fn test_accessors() {
        let event = Arc::new(MessageEvent::guild(
            "g1",
            "42",
            "!ban  @x spam",
            MemberContext::default(),
        ));
        let command = Arc::new(CommandDefinition::new(
            ["ban", "b"],
            handler_fn(|_ctx| async { Ok(()) }),
        ));
        let ctx = CommandContext::new("!", " @x spam", "ban", event, command);

        assert_eq!(ctx.prefix(), "!");
        assert_eq!(ctx.arguments(), " @x spam");
        assert_eq!(ctx.args(), vec!["@x", "spam"]);
        assert_eq!(ctx.executor(), "ban");
        assert_eq!(ctx.command().name(), "ban");
        assert_eq!(ctx.author_id(), "42");
        assert_eq!(ctx.guild_id(), Some("g1"));
        assert_eq!(ctx.channel_kind(), ChannelKind::Guild);
        assert_eq!(ctx.event().content, "!ban  @x spam");
    }
}
