//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, DispatchConfig, PrefixConfig, ...)
//! - [`defaults`]: serde default value functions
//! - [`validation`]: Startup validation collecting every problem at once

mod defaults;
mod types;
pub mod validation;

pub use types::{
    BlacklistConfig, Config, ConfigError, ConsoleConfig, DispatchConfig, LoggingConfig,
    PermissionBlock, PrefixConfig,
};
pub use validation::{ValidationError, validate};

pub(crate) use defaults::default_lanes;
