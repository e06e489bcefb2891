//! Dispatch engine infrastructure.
//!
//! This module contains the engine that turns an inbound message into at most
//! one handler invocation, along with the types it hands out:
//!
//! - [`DispatchEngine`] / [`DispatchEngineBuilder`]: immutable orchestrator
//! - [`CommandContext`]: per-invocation view passed to handlers
//! - [`Claim`]: per-message one-shot commit point shared by all lanes
//! - [`ErrorSink`]: receiver for classified per-message failures

mod claim;
mod context;
mod engine;
mod sink;

pub use claim::Claim;
pub use context::CommandContext;
pub use engine::{DispatchEngine, DispatchEngineBuilder, DispatchOutcome, IgnoreReason};
pub use sink::ErrorSink;
