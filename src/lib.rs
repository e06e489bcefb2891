//! # slcmd
//!
//! Straylight Command Dispatch: routes inbound chat messages to registered
//! command handlers.
//!
//! For each message the [`DispatchEngine`] recognises an invocation (prefix or
//! bot mention), finds the command it names, enforces permission hierarchies
//! and channel scopes, and runs exactly one handler while keeping handler
//! failures away from the caller.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use slcmd::{CommandContext, CommandDefinition, DispatchEngine, MemberContext, MessageEvent, handler_fn};
//!
//! # async fn run() -> Result<(), slcmd::ConfigurationError> {
//! let ping = CommandDefinition::new(["ping"], handler_fn(|ctx: CommandContext| async move {
//!     println!("pong for {}", ctx.author_id());
//!     Ok(())
//! }));
//!
//! let engine = DispatchEngine::builder()
//!     .default_prefix("!")
//!     .command(ping)
//!     .build()?;
//!
//! let event = MessageEvent::guild("guild-1", "42", "!ping", MemberContext::default());
//! engine.process_incoming_message(event).await;
//! # Ok(())
//! # }
//! ```

pub mod blacklist;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod metrics;
pub mod permissions;
pub mod prefix;
pub mod telemetry;

pub use blacklist::Blacklist;
pub use commands::{ChannelScope, CommandDefinition, CommandHandler, CommandRegistry, handler_fn};
pub use config::Config;
pub use dispatch::{
    CommandContext, DispatchEngine, DispatchEngineBuilder, DispatchOutcome, ErrorSink,
    IgnoreReason,
};
pub use error::{ConfigurationError, DispatchError, HandlerError, HandlerResult, PermissionError};
pub use event::{ChannelKind, MemberContext, MessageEvent};
pub use permissions::{EVERYONE, PermissionNode, PermissionRegistry};
pub use prefix::PrefixResolver;
