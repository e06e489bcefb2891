//! Command registry.
//!
//! The `CommandRegistry` holds every registered command and provides command
//! usage statistics. It is immutable after construction; usage counters are
//! atomics so lanes can record invocations without locking.

use super::definition::{ChannelScope, CommandDefinition};
use crate::error::ConfigurationError;
use crate::event::MessageEvent;
use crate::permissions::PermissionRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Registry of command definitions.
#[derive(Debug)]
pub struct CommandRegistry {
    commands: Vec<Arc<CommandDefinition>>,
    /// Invocation counters keyed by lowercased canonical name.
    command_counts: HashMap<String, AtomicU64>,
}

impl CommandRegistry {
    /// Validate and register `definitions`, preserving their order.
    pub fn new(definitions: Vec<CommandDefinition>) -> Result<Self, ConfigurationError> {
        let mut commands = Vec::with_capacity(definitions.len());
        let mut command_counts = HashMap::new();
        let mut owners: HashMap<String, String> = HashMap::new();

        for def in definitions {
            def.validate()?;

            for executor in def.executors() {
                let key = executor.to_ascii_lowercase();
                if let Some(owner) = owners.get(&key) {
                    // Both stay registered; whichever lane claims first runs.
                    warn!(
                        executor = %executor,
                        first = %owner,
                        second = %def.name(),
                        "Executor registered by more than one command"
                    );
                } else {
                    owners.insert(key, def.name().to_string());
                }
            }

            command_counts
                .entry(def.name().to_ascii_lowercase())
                .or_insert_with(|| AtomicU64::new(0));
            debug!(command = %def.name(), aliases = ?def.aliases(), "Command registered");
            commands.push(Arc::new(def));
        }

        Ok(Self {
            commands,
            command_counts,
        })
    }

    /// Iterate every registered command in registration order.
    ///
    /// Each call starts a fresh traversal.
    pub fn all_commands(&self) -> impl Iterator<Item = &Arc<CommandDefinition>> + '_ {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Find the first command named by `executor` (name or alias).
    pub fn find(&self, executor: &str) -> Option<&Arc<CommandDefinition>> {
        self.commands.iter().find(|c| c.is_named(executor))
    }

    /// Commands the author of `event` could invoke in its channel.
    ///
    /// Commands whose required permission is unregistered are left out.
    pub fn visible_commands<'a>(
        &'a self,
        event: &MessageEvent,
        permissions: &PermissionRegistry,
    ) -> Vec<&'a Arc<CommandDefinition>> {
        self.commands
            .iter()
            .filter(|c| c.channel_scope().allows(event.channel_kind))
            .filter(|c| {
                permissions
                    .satisfies(event.held_permissions(), c.required_permission())
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Commands registered with `scope`.
    pub fn by_scope(&self, scope: ChannelScope) -> impl Iterator<Item = &Arc<CommandDefinition>> + '_ {
        self.commands.iter().filter(move |c| c.channel_scope() == scope)
    }

    /// Count one invocation of `command`.
    pub fn record_use(&self, command: &str) {
        if let Some(counter) = self.command_counts.get(&command.to_ascii_lowercase()) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get command usage statistics, most used first. Unused commands are omitted.
    pub fn command_stats(&self) -> Vec<(String, u64)> {
        let mut stats: Vec<_> = self
            .command_counts
            .iter()
            .map(|(cmd, count)| (cmd.clone(), count.load(Ordering::Relaxed)))
            .filter(|(_, count)| *count > 0)
            .collect();

        stats.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CommandHandler, handler_fn};
    use crate::event::MemberContext;
    use crate::permissions::PermissionNode;

    fn noop() -> Arc<dyn CommandHandler> {
        handler_fn(|_ctx| async { Ok(()) })
    }

    fn registry() -> CommandRegistry {
        CommandRegistry::new(vec![
            CommandDefinition::new(["ping"], noop()),
            CommandDefinition::new(["ban", "b"], noop())
                .requires("Moderator")
                .scope(ChannelScope::GuildOnly),
            CommandDefinition::new(["settings"], noop()).scope(ChannelScope::DirectOnly),
            CommandDefinition::new(["nuke"], noop()).requires("SuperAdmin"),
        ])
        .unwrap()
    }

    #[test]
    fn test_traversal_is_restartable() {
        let registry = registry();
        let first: Vec<&str> = registry.all_commands().map(|c| c.name()).collect();
        let second: Vec<&str> = registry.all_commands().map(|c| c.name()).collect();
        assert_eq!(first, vec!["ping", "ban", "settings", "nuke"]);
        assert_eq!(first, second);
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_invalid_definition_rejected() {
        let err = CommandRegistry::new(vec![
            CommandDefinition::new(["ok"], noop()),
            CommandDefinition::new(["bad one"], noop()),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidExecutor { .. }));
    }

    #[test]
    fn test_find_by_alias() {
        let registry = registry();
        assert_eq!(registry.find("B").map(|c| c.name()), Some("ban"));
        assert!(registry.find("unknown").is_none());
    }

    #[test]
    fn test_visible_commands() {
        let registry = registry();
        let mut permissions = PermissionRegistry::new();
        permissions.register(PermissionNode::new("Moderator")).unwrap();

        let member = MessageEvent::guild("g", "1", "", MemberContext::with_permissions(["Moderator"]));
        let names: Vec<&str> = registry
            .visible_commands(&member, &permissions)
            .iter()
            .map(|c| c.name())
            .collect();
        assert_eq!(names, vec!["ping", "ban"]);

        let dm = MessageEvent::direct("1", "");
        let names: Vec<&str> = registry
            .visible_commands(&dm, &permissions)
            .iter()
            .map(|c| c.name())
            .collect();
        assert_eq!(names, vec!["ping", "settings"]);
    }

    #[test]
    fn test_command_stats() {
        let registry = registry();
        assert!(registry.command_stats().is_empty());

        registry.record_use("ping");
        registry.record_use("BAN");
        registry.record_use("ban");
        registry.record_use("unknown");

        assert_eq!(
            registry.command_stats(),
            vec![("ban".to_string(), 2), ("ping".to_string(), 1)]
        );
        assert_eq!(registry.by_scope(ChannelScope::GuildOnly).count(), 1);
    }
}
