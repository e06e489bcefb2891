//! Command dispatch engine.
//!
//! For every inbound message the engine:
//!
//! 1. drops messages from blacklisted authors,
//! 2. canonicalises mentions and strips the resolved prefix (or bot mention),
//! 3. fans the registered commands out across worker lanes, where each lane
//!    tests its candidates for a whole-token executor match, permission and
//!    channel scope,
//! 4. lets the first lane with an eligible match take the message's [`Claim`]
//!    and run that handler; every later match is discarded,
//! 5. joins all lanes and forwards classified failures to the error sink.
//!
//! Nothing escapes `process_incoming_message`: failures are reported, never
//! returned as errors.

use super::claim::Claim;
use super::context::CommandContext;
use super::sink::ErrorSink;
use crate::blacklist::Blacklist;
use crate::commands::{CommandDefinition, CommandRegistry};
use crate::config::{Config, default_lanes};
use crate::error::{ConfigurationError, DispatchError, PermissionError};
use crate::event::{MessageEvent, canonicalize_mentions};
use crate::metrics;
use crate::permissions::PermissionRegistry;
use crate::prefix::{CustomPrefixFn, PrefixResolver};
use crate::telemetry::{CommandTimer, spans};
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};
use tracing::{Instrument, debug, error, info, trace, warn};

/// Why a message was dropped before candidate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The author is on the blacklist.
    Blacklisted,
    /// The message starts with neither the prefix nor an accepted mention.
    NoInvocation,
}

/// Result of dispatching one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Ignored(IgnoreReason),
    /// An invocation was present but no eligible command matched it.
    NoMatch,
    /// A handler ran and returned `Ok`.
    Invoked { command: String },
    /// A handler ran and failed; the failure went to the error sink.
    Failed { command: String },
}

impl DispatchOutcome {
    /// Static label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ignored(IgnoreReason::Blacklisted) => "blacklisted",
            Self::Ignored(IgnoreReason::NoInvocation) => "no_invocation",
            Self::NoMatch => "no_match",
            Self::Invoked { .. } => "invoked",
            Self::Failed { .. } => "failed",
        }
    }

    /// Canonical name of the command whose handler ran, if any.
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::Invoked { command } | Self::Failed { command } => Some(command),
            _ => None,
        }
    }
}

// ============================================================================
// Lanes
// ============================================================================

/// A handler invocation performed by the lane holding the claim.
struct Invocation {
    command: String,
    result: Result<(), DispatchError>,
}

#[derive(Default)]
struct LaneReport {
    errors: Vec<DispatchError>,
    invocation: Option<Invocation>,
}

/// One worker lane: evaluates a slice of the registry against one message.
struct Lane {
    event: Arc<MessageEvent>,
    prefix: Arc<str>,
    invocation: Arc<str>,
    claim: Arc<Claim>,
    permissions: Arc<PermissionRegistry>,
    commands: Arc<CommandRegistry>,
    candidates: Vec<Arc<CommandDefinition>>,
}

impl Lane {
    async fn run(self) -> LaneReport {
        let mut report = LaneReport::default();

        for candidate in &self.candidates {
            if self.claim.is_claimed() {
                break;
            }

            let Some((executor, arguments)) = candidate.match_invocation(&self.invocation) else {
                continue;
            };
            if !self.eligible(candidate, &mut report.errors) {
                continue;
            }
            if !self.claim.try_claim() {
                trace!(command = %candidate.name(), "Match discarded, message already claimed");
                break;
            }

            let ctx = CommandContext::new(
                &*self.prefix,
                arguments,
                executor,
                Arc::clone(&self.event),
                Arc::clone(candidate),
            );
            report.invocation = Some(self.invoke(candidate, ctx).await);
            break;
        }

        report
    }

    /// Permission first, then channel scope.
    ///
    /// An unregistered permission is recorded as a configuration error and the
    /// candidate is treated as not eligible; a plain denial is silent.
    fn eligible(&self, candidate: &CommandDefinition, errors: &mut Vec<DispatchError>) -> bool {
        match self
            .permissions
            .satisfies(self.event.held_permissions(), candidate.required_permission())
        {
            Ok(true) => {}
            Ok(false) => {
                trace!(
                    command = %candidate.name(),
                    required = %candidate.required_permission(),
                    "Permission denied"
                );
                return false;
            }
            Err(PermissionError::NotRegistered(permission)) => {
                errors.push(
                    ConfigurationError::UnknownPermission {
                        command: candidate.name().to_string(),
                        permission,
                    }
                    .into(),
                );
                return false;
            }
        }

        let allowed = candidate.channel_scope().allows(self.event.channel_kind);
        if !allowed {
            trace!(
                command = %candidate.name(),
                scope = ?candidate.channel_scope(),
                "Wrong channel kind"
            );
        }
        allowed
    }

    /// Run the handler on its own task so a panic is caught and attributed.
    async fn invoke(&self, candidate: &CommandDefinition, ctx: CommandContext) -> Invocation {
        let command = candidate.name().to_string();
        let span = spans::command(&command, ctx.executor());
        debug!(command = %command, arguments = %ctx.arguments(), "Invoking command");
        self.commands.record_use(&command);

        let handler = Arc::clone(candidate.handler());
        let timer = CommandTimer::new(command.clone());
        let task = tokio::spawn(
            async move {
                let _timer = timer;
                handler.handle(ctx).await
            }
            .instrument(span),
        );

        let result = match task.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(DispatchError::HandlerFailure {
                command: command.clone(),
                source,
            }),
            Err(join_error) => Err(DispatchError::Binding {
                command: command.clone(),
                reason: describe_join_error(join_error),
            }),
        };
        Invocation { command, result }
    }
}

fn describe_join_error(err: JoinError) -> String {
    match err.try_into_panic() {
        Ok(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            format!("handler panicked: {message}")
        }
        Err(_) => "handler task was cancelled".to_string(),
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Routes inbound messages to registered command handlers.
///
/// Built once through [`DispatchEngineBuilder`] and immutable afterwards;
/// share it behind an `Arc` to process messages from many tasks at once.
pub struct DispatchEngine {
    prefixes: PrefixResolver,
    allow_mention: bool,
    bot_mentions: Vec<String>,
    lanes: usize,
    blacklist: Arc<Blacklist>,
    commands: Arc<CommandRegistry>,
    permissions: Arc<PermissionRegistry>,
    error_sink: Option<Arc<dyn ErrorSink>>,
}

impl DispatchEngine {
    pub fn builder() -> DispatchEngineBuilder {
        DispatchEngineBuilder::default()
    }

    /// Dispatch one inbound message.
    ///
    /// Completes once candidate evaluation and the handler (if any) have
    /// finished. Never fails; see [`DispatchOutcome`] for what happened.
    pub async fn process_incoming_message(
        &self,
        event: impl Into<Arc<MessageEvent>>,
    ) -> DispatchOutcome {
        let event = event.into();
        let span = spans::dispatch(&event);
        let outcome = self.dispatch(event).instrument(span).await;
        metrics::record_dispatch(outcome.label());
        outcome
    }

    async fn dispatch(&self, event: Arc<MessageEvent>) -> DispatchOutcome {
        if self.blacklist.contains(&event.author_id) {
            trace!("Author is blacklisted");
            return DispatchOutcome::Ignored(IgnoreReason::Blacklisted);
        }

        let content = canonicalize_mentions(&event.content);
        let prefix = self.prefixes.resolve(&event);
        let Some((matched, invocation)) = self.strip_invocation(&content, prefix) else {
            return DispatchOutcome::Ignored(IgnoreReason::NoInvocation);
        };
        let prefix: Arc<str> = Arc::from(matched);
        let invocation: Arc<str> = Arc::from(invocation);
        debug!(prefix = %prefix, invocation = %invocation, "Invocation found");

        let claim = Arc::new(Claim::new());
        let mut lanes = JoinSet::new();
        for candidates in self.partition() {
            let lane = Lane {
                event: Arc::clone(&event),
                prefix: Arc::clone(&prefix),
                invocation: Arc::clone(&invocation),
                claim: Arc::clone(&claim),
                permissions: Arc::clone(&self.permissions),
                commands: Arc::clone(&self.commands),
                candidates,
            };
            lanes.spawn(lane.run().in_current_span());
        }

        let mut outcome = DispatchOutcome::NoMatch;
        while let Some(joined) = lanes.join_next().await {
            match joined {
                Ok(report) => {
                    for error in report.errors {
                        self.report(&event, error);
                    }
                    if let Some(Invocation { command, result }) = report.invocation {
                        outcome = match result {
                            Ok(()) => DispatchOutcome::Invoked { command },
                            Err(error) => {
                                self.report(&event, error);
                                DispatchOutcome::Failed { command }
                            }
                        };
                    }
                }
                Err(join_error) => {
                    self.report(
                        &event,
                        DispatchError::Binding {
                            command: "<lane>".to_string(),
                            reason: describe_join_error(join_error),
                        },
                    );
                }
            }
        }

        if outcome == DispatchOutcome::NoMatch {
            debug!("No eligible command matched");
        }
        outcome
    }

    /// Split off the prefix or bot mention.
    ///
    /// Returns the matched prefix and the invocation text. Whitespace after a
    /// mention is skipped; text after a prefix is used as is.
    fn strip_invocation<'c>(&self, content: &'c str, prefix: String) -> Option<(String, &'c str)> {
        if let Some(rest) = content.strip_prefix(prefix.as_str()) {
            return Some((prefix, rest));
        }
        if self.allow_mention {
            for mention in &self.bot_mentions {
                if let Some(rest) = content.strip_prefix(mention.as_str()) {
                    return Some((mention.clone(), rest.trim_start()));
                }
            }
        }
        None
    }

    /// Contiguous slices of the registry, one per lane.
    fn partition(&self) -> Vec<Vec<Arc<CommandDefinition>>> {
        let total = self.commands.len();
        if total == 0 {
            return Vec::new();
        }
        let per_lane = total.div_ceil(self.lanes.clamp(1, total));
        let all: Vec<Arc<CommandDefinition>> = self.commands.all_commands().cloned().collect();
        all.chunks(per_lane).map(<[_]>::to_vec).collect()
    }

    fn report(&self, event: &MessageEvent, error: DispatchError) {
        metrics::record_command_error(error.command().unwrap_or("-"), error.error_code());
        match &self.error_sink {
            Some(sink) => sink.report(event, &error),
            None => match &error {
                DispatchError::Configuration(e) => {
                    error!(error = %e, code = e.error_code(), "Dispatch configuration error");
                }
                other => {
                    warn!(error = %other, code = other.error_code(), "Command failed");
                }
            },
        }
    }

    /// Shared blacklist, for administrative `add`/`remove`.
    pub fn blacklist(&self) -> &Arc<Blacklist> {
        &self.blacklist
    }

    pub fn commands(&self) -> &Arc<CommandRegistry> {
        &self.commands
    }

    pub fn permissions(&self) -> &Arc<PermissionRegistry> {
        &self.permissions
    }

    pub fn prefix_resolver(&self) -> &PrefixResolver {
        &self.prefixes
    }

    pub fn lanes(&self) -> usize {
        self.lanes
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Assembles an immutable [`DispatchEngine`].
#[derive(Default)]
pub struct DispatchEngineBuilder {
    default_prefix: Option<String>,
    custom_prefix: Option<CustomPrefixFn>,
    allow_mention: bool,
    bot_mentions: Vec<String>,
    lanes: Option<usize>,
    commands: Vec<CommandDefinition>,
    permissions: Option<PermissionRegistry>,
    blacklist: Option<Arc<Blacklist>>,
    error_sink: Option<Arc<dyn ErrorSink>>,
}

impl DispatchEngineBuilder {
    /// Seed a builder from a loaded configuration.
    ///
    /// Builds the permission registry from the `[[permission]]` blocks, which
    /// fails on duplicates, cycles and dangling edges.
    pub fn from_config(config: &Config) -> Result<Self, ConfigurationError> {
        let dispatch = &config.dispatch;
        let mut builder = Self::default()
            .default_prefix(dispatch.default_prefix.clone())
            .allow_mention(dispatch.allow_mention)
            .lanes(dispatch.lanes)
            .permissions(PermissionRegistry::from_blocks(&config.permissions)?)
            .blacklist(Arc::new(Blacklist::with_authors(
                config.blacklist.users.iter().cloned(),
            )));
        for mention in &dispatch.bot_mentions {
            builder = builder.bot_mention(mention.clone());
        }
        if !config.prefix.guilds.is_empty() {
            builder.custom_prefix = Some(PrefixResolver::guild_table(
                dispatch.default_prefix.clone(),
                config.prefix.guilds.clone(),
            ));
        }
        Ok(builder)
    }

    /// Prefix for direct messages and guilds without a custom prefix. Required.
    pub fn default_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.default_prefix = Some(prefix.into());
        self
    }

    /// Per-guild prefix lookup, called with the guild id.
    pub fn custom_prefix<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.custom_prefix = Some(Arc::new(f));
        self
    }

    pub fn allow_mention(mut self, allow: bool) -> Self {
        self.allow_mention = allow;
        self
    }

    /// Add a mention string that addresses the bot (e.g., "<@123>").
    pub fn bot_mention(mut self, mention: impl Into<String>) -> Self {
        self.bot_mentions.push(mention.into());
        self
    }

    pub fn lanes(mut self, lanes: usize) -> Self {
        self.lanes = Some(lanes);
        self
    }

    pub fn command(mut self, command: CommandDefinition) -> Self {
        self.commands.push(command);
        self
    }

    pub fn commands(mut self, commands: impl IntoIterator<Item = CommandDefinition>) -> Self {
        self.commands.extend(commands);
        self
    }

    pub fn permissions(mut self, permissions: PermissionRegistry) -> Self {
        self.permissions = Some(permissions);
        self
    }

    /// Share an existing blacklist with the engine.
    pub fn blacklist(mut self, blacklist: Arc<Blacklist>) -> Self {
        self.blacklist = Some(blacklist);
        self
    }

    pub fn error_sink<S: ErrorSink + 'static>(mut self, sink: S) -> Self {
        self.error_sink = Some(Arc::new(sink));
        self
    }

    /// Validate everything and freeze the engine.
    pub fn build(self) -> Result<DispatchEngine, ConfigurationError> {
        let default_prefix = self
            .default_prefix
            .filter(|p| !p.is_empty())
            .ok_or(ConfigurationError::MissingDefaultPrefix)?;

        let permissions = self.permissions.unwrap_or_default();
        permissions.validate()?;

        let commands = CommandRegistry::new(self.commands)?;
        for command in commands.all_commands() {
            if !permissions.contains(command.required_permission()) {
                warn!(
                    command = %command.name(),
                    permission = %command.required_permission(),
                    "Command requires an unregistered permission and cannot be invoked"
                );
            }
        }

        let bot_mentions: Vec<String> = self
            .bot_mentions
            .iter()
            .map(|m| canonicalize_mentions(m).into_owned())
            .filter(|m| !m.is_empty())
            .collect();
        let lanes = self.lanes.unwrap_or_else(default_lanes).max(1);

        info!(
            prefix = %default_prefix,
            custom_prefix = self.custom_prefix.is_some(),
            allow_mention = self.allow_mention,
            commands = commands.len(),
            permissions = permissions.len(),
            lanes,
            "Dispatch engine ready"
        );

        Ok(DispatchEngine {
            prefixes: PrefixResolver::new(default_prefix, self.custom_prefix),
            allow_mention: self.allow_mention,
            bot_mentions,
            lanes,
            blacklist: self.blacklist.unwrap_or_default(),
            commands: Arc::new(commands),
            permissions: Arc::new(permissions),
            error_sink: self.error_sink,
        })
    }
}
