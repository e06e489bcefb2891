//! Integration test common infrastructure.
//!
//! Provides recording handlers, a collecting error sink and engine fixtures
//! for asserting on dispatch behaviour.

pub mod recorder;
pub mod sink;

#[allow(unused_imports)]
pub use recorder::{Invocation, Recorder};
#[allow(unused_imports)]
pub use sink::CollectingSink;

use slcmd::{DispatchEngineBuilder, MemberContext, MessageEvent, PermissionNode, PermissionRegistry};

/// Registry with `SuperAdmin` left out on purpose:
/// `Admin → Moderator → Helper`, plus `Everyone`.
#[allow(dead_code)]
pub fn staff_permissions() -> PermissionRegistry {
    let mut registry = PermissionRegistry::new();
    registry
        .register(PermissionNode::new("Admin").implies("Moderator"))
        .expect("register Admin");
    registry
        .register(PermissionNode::new("Moderator").implies("Helper"))
        .expect("register Moderator");
    registry
        .register(PermissionNode::new("Helper"))
        .expect("register Helper");
    registry
}

/// Builder with prefix `!`, mention `<@123>` and the staff permissions.
#[allow(dead_code)]
pub fn builder(sink: &CollectingSink) -> DispatchEngineBuilder {
    DispatchEngineBuilder::default()
        .default_prefix("!")
        .allow_mention(true)
        .bot_mention("<@123>")
        .permissions(staff_permissions())
        .error_sink(sink.clone())
}

#[allow(dead_code)]
pub fn guild_message(author: &str, content: &str, perms: &[&str]) -> MessageEvent {
    MessageEvent::guild(
        "guild-1",
        author,
        content,
        MemberContext::with_permissions(perms.iter().copied()),
    )
}
