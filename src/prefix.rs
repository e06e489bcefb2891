//! Invocation prefix resolution.

use crate::event::MessageEvent;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Guild id → prefix lookup supplied by the host (e.g., from its own storage).
pub type CustomPrefixFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Produces the active prefix for a message's origin.
///
/// Guild messages use the custom prefix function when one is configured;
/// direct and group messages always use the default prefix.
#[derive(Clone)]
pub struct PrefixResolver {
    default_prefix: String,
    custom: Option<CustomPrefixFn>,
}

impl PrefixResolver {
    pub fn new(default_prefix: impl Into<String>, custom: Option<CustomPrefixFn>) -> Self {
        Self {
            default_prefix: default_prefix.into(),
            custom,
        }
    }

    /// Build a resolver whose custom function looks guilds up in `guilds`,
    /// falling back to the default prefix for unlisted guilds.
    pub fn from_table(default_prefix: impl Into<String>, guilds: HashMap<String, String>) -> Self {
        let default_prefix = default_prefix.into();
        if guilds.is_empty() {
            return Self::new(default_prefix, None);
        }

        let custom = Self::guild_table(default_prefix.clone(), guilds);
        Self::new(default_prefix, Some(custom))
    }

    /// Custom prefix function backed by a guild → prefix table.
    pub fn guild_table(fallback: String, guilds: HashMap<String, String>) -> CustomPrefixFn {
        Arc::new(move |guild: &str| {
            guilds.get(guild).cloned().unwrap_or_else(|| fallback.clone())
        })
    }

    /// Resolve the prefix for `event`.
    pub fn resolve(&self, event: &MessageEvent) -> String {
        match (&self.custom, event.guild_id.as_deref()) {
            (Some(custom), Some(guild)) if event.is_from_guild() => custom(guild),
            _ => self.default_prefix.clone(),
        }
    }

    pub fn default_prefix(&self) -> &str {
        &self.default_prefix
    }

    pub fn has_custom(&self) -> bool {
        self.custom.is_some()
    }
}

impl fmt::Debug for PrefixResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrefixResolver")
            .field("default_prefix", &self.default_prefix)
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::MemberContext;

    fn guild_msg(guild: &str) -> MessageEvent {
        MessageEvent::guild(guild, "1", "", MemberContext::default())
    }

    #[test]
    fn test_default_only() {
        let resolver = PrefixResolver::new("!", None);
        assert_eq!(resolver.resolve(&guild_msg("g")), "!");
        assert_eq!(resolver.resolve(&MessageEvent::direct("1", "")), "!");
    }

    #[test]
    fn test_custom_applies_to_guilds_only() {
        let custom: CustomPrefixFn = Arc::new(|guild: &str| format!("{guild}>"));
        let resolver = PrefixResolver::new("!", Some(custom));
        assert_eq!(resolver.resolve(&guild_msg("g1")), "g1>");
        assert_eq!(resolver.resolve(&MessageEvent::direct("1", "")), "!");
        assert_eq!(resolver.resolve(&MessageEvent::group("1", "")), "!");
    }

    #[test]
    fn test_from_table() {
        let mut guilds = HashMap::new();
        guilds.insert("g1".to_string(), "?".to_string());
        let resolver = PrefixResolver::from_table("!", guilds);
        assert!(resolver.has_custom());
        assert_eq!(resolver.resolve(&guild_msg("g1")), "?");
        assert_eq!(resolver.resolve(&guild_msg("g2")), "!");

        let resolver = PrefixResolver::from_table("!", HashMap::new());
        assert!(!resolver.has_custom());
    }
}
