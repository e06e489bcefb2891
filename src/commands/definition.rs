//! Command definitions and the handler trait.

use super::matcher::{is_separator, match_executor};
use crate::dispatch::CommandContext;
use crate::error::{ConfigurationError, HandlerResult};
use crate::event::ChannelKind;
use crate::permissions::EVERYONE;
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Trait implemented by all command handlers.
///
/// The context is owned by the invocation and dropped when `handle` returns.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Handle one invocation.
    async fn handle(&self, ctx: CommandContext) -> HandlerResult;
}

/// Adapter turning an async closure into a [`CommandHandler`].
pub struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> CommandHandler for FnHandler<F>
where
    F: Fn(CommandContext) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn handle(&self, ctx: CommandContext) -> HandlerResult {
        (self.0)(ctx).await
    }
}

/// Wrap an async closure as a shareable handler.
///
/// ```ignore
/// let ping = handler_fn(|ctx: CommandContext| async move {
///     println!("pong ({})", ctx.author_id());
///     Ok(())
/// });
/// ```
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn CommandHandler>
where
    F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// Channel kinds a command may be invoked from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelScope {
    /// Every channel kind except group conversations.
    #[default]
    Any,
    /// Guild channels only.
    GuildOnly,
    /// Direct messages only.
    DirectOnly,
}

impl ChannelScope {
    /// Whether a message from `kind` may invoke a command with this scope.
    ///
    /// Group conversations match no scope.
    #[inline]
    pub fn allows(&self, kind: ChannelKind) -> bool {
        match (self, kind) {
            (_, ChannelKind::Group) => false,
            (Self::Any, _) => true,
            (Self::GuildOnly, ChannelKind::Guild) => true,
            (Self::DirectOnly, ChannelKind::Direct) => true,
            _ => false,
        }
    }
}

/// A registered command.
///
/// Immutable once handed to the registry.
#[derive(Clone)]
pub struct CommandDefinition {
    executors: Vec<String>,
    required_permission: String,
    channel_scope: ChannelScope,
    description: Option<String>,
    usage: Option<String>,
    handler: Arc<dyn CommandHandler>,
}

impl CommandDefinition {
    /// Create a command. The first executor is the canonical name, the rest
    /// are aliases. Requires [`EVERYONE`] and [`ChannelScope::Any`] unless
    /// changed with [`requires`](Self::requires) and [`scope`](Self::scope).
    pub fn new<I, S>(executors: I, handler: Arc<dyn CommandHandler>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            executors: executors.into_iter().map(Into::into).collect(),
            required_permission: EVERYONE.to_string(),
            channel_scope: ChannelScope::Any,
            description: None,
            usage: None,
            handler,
        }
    }

    pub fn requires(mut self, permission: impl Into<String>) -> Self {
        self.required_permission = permission.into();
        self
    }

    pub fn scope(mut self, scope: ChannelScope) -> Self {
        self.channel_scope = scope;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Usage line shown by help handlers (e.g., "<user> [reason]").
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// Canonical name (first executor).
    pub fn name(&self) -> &str {
        self.executors.first().map(String::as_str).unwrap_or_default()
    }

    pub fn executors(&self) -> &[String] {
        &self.executors
    }

    pub fn aliases(&self) -> &[String] {
        self.executors.get(1..).unwrap_or_default()
    }

    pub fn required_permission(&self) -> &str {
        &self.required_permission
    }

    pub fn channel_scope(&self) -> ChannelScope {
        self.channel_scope
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn usage_text(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    pub fn handler(&self) -> &Arc<dyn CommandHandler> {
        &self.handler
    }

    /// Whether `executor` names this command (ASCII case-insensitive).
    pub fn is_named(&self, executor: &str) -> bool {
        self.executors.iter().any(|e| e.eq_ignore_ascii_case(executor))
    }

    /// Test every executor against the invocation text.
    ///
    /// Returns the matched executor and the argument text.
    pub fn match_invocation<'t>(&self, text: &'t str) -> Option<(&str, &'t str)> {
        self.executors
            .iter()
            .find_map(|e| match_executor(e, text).map(|args| (e.as_str(), args)))
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigurationError> {
        if self.executors.is_empty() {
            return Err(ConfigurationError::EmptyExecutors);
        }
        if let Some(bad) = self
            .executors
            .iter()
            .find(|e| e.is_empty() || e.chars().any(is_separator))
        {
            return Err(ConfigurationError::InvalidExecutor {
                command: self.name().to_string(),
                executor: bad.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("executors", &self.executors)
            .field("required_permission", &self.required_permission)
            .field("channel_scope", &self.channel_scope)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
