//! Inbound message events.
//!
//! The transport owns delivery; it hands each received message to the engine
//! as a [`MessageEvent`]. The engine never mutates an event.

use std::fmt;

/// Kind of channel a message arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// One-to-one conversation with the bot.
    Direct,
    /// A channel belonging to a guild/server.
    Guild,
    /// A multi-user private conversation outside any guild.
    Group,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Guild => "guild",
            Self::Group => "group",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guild membership of the author, present only for guild messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberContext {
    /// Permission node names held by the member.
    pub permissions: Vec<String>,
}

impl MemberContext {
    pub fn with_permissions<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }
}

/// A message received by the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    /// Transport message id (used for log correlation only).
    pub id: String,
    pub author_id: String,
    /// Raw message text as sent.
    pub content: String,
    pub channel_kind: ChannelKind,
    pub guild_id: Option<String>,
    pub member: Option<MemberContext>,
}

impl MessageEvent {
    /// A message posted in a guild channel by a member.
    pub fn guild(
        guild_id: impl Into<String>,
        author_id: impl Into<String>,
        content: impl Into<String>,
        member: MemberContext,
    ) -> Self {
        Self {
            id: String::new(),
            author_id: author_id.into(),
            content: content.into(),
            channel_kind: ChannelKind::Guild,
            guild_id: Some(guild_id.into()),
            member: Some(member),
        }
    }

    /// A direct message to the bot.
    pub fn direct(author_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            author_id: author_id.into(),
            content: content.into(),
            channel_kind: ChannelKind::Direct,
            guild_id: None,
            member: None,
        }
    }

    /// A message in a group conversation.
    pub fn group(author_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            author_id: author_id.into(),
            content: content.into(),
            channel_kind: ChannelKind::Group,
            guild_id: None,
            member: None,
        }
    }

    /// Attach the transport's message id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Whether the message came from a guild channel.
    #[inline]
    pub fn is_from_guild(&self) -> bool {
        self.channel_kind == ChannelKind::Guild
    }

    /// Permission names held by the author; empty without a member context.
    pub fn held_permissions(&self) -> &[String] {
        self.member
            .as_ref()
            .map(|m| m.permissions.as_slice())
            .unwrap_or(&[])
    }
}

/// Rewrite the nickname mention form `<@!id>` to the canonical `<@id>`.
///
/// Clients render a user mention either way; matching is done on the
/// canonical form only.
pub fn canonicalize_mentions(content: &str) -> std::borrow::Cow<'_, str> {
    if content.contains("<@!") {
        std::borrow::Cow::Owned(content.replace("<@!", "<@"))
    } else {
        std::borrow::Cow::Borrowed(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_mentions() {
        assert_eq!(canonicalize_mentions("<@!123> help"), "<@123> help");
        assert_eq!(canonicalize_mentions("<@123> help"), "<@123> help");
        assert!(matches!(
            canonicalize_mentions("!ping"),
            std::borrow::Cow::Borrowed(_)
        ));
    }

    #[test]
    fn test_held_permissions() {
        let dm = MessageEvent::direct("1", "hi");
        assert!(dm.held_permissions().is_empty());
        assert!(!dm.is_from_guild());

        let msg = MessageEvent::guild("g", "1", "hi", MemberContext::with_permissions(["Helper"]))
            .with_id("m-1");
        assert_eq!(msg.held_permissions(), ["Helper".to_string()]);
        assert!(msg.is_from_guild());
        assert_eq!(msg.id, "m-1");
    }
}
