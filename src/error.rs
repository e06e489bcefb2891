//! Unified error handling for slcmd.
//!
//! This module provides the error hierarchy for the dispatch engine, with
//! static codes for metric labeling. Startup errors escape the builder;
//! per-message errors are wrapped in [`DispatchError`] and handed to the
//! error sink instead of being raised.

use thiserror::Error;

// ============================================================================
// Configuration Errors (startup and per-dispatch)
// ============================================================================

/// Deployment mistakes in the command or permission setup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("a non-empty default prefix is required")]
    MissingDefaultPrefix,

    #[error("permission '{0}' is already registered")]
    DuplicatePermission(String),

    #[error("permission '{node}' implying '{implied}' would create a cycle")]
    CyclicPermission { node: String, implied: String },

    #[error("permission '{node}' implies unregistered permission '{implied}'")]
    UnknownImpliedPermission { node: String, implied: String },

    /// Raised per dispatch: the command is treated as not eligible.
    #[error("command '{command}' requires unregistered permission '{permission}'")]
    UnknownPermission { command: String, permission: String },

    #[error("a command was registered without executors")]
    EmptyExecutors,

    #[error("command '{command}' has invalid executor {executor:?}")]
    InvalidExecutor { command: String, executor: String },
}

impl ConfigurationError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingDefaultPrefix => "missing_default_prefix",
            Self::DuplicatePermission(_) => "duplicate_permission",
            Self::CyclicPermission { .. } => "cyclic_permission",
            Self::UnknownImpliedPermission { .. } => "unknown_implied_permission",
            Self::UnknownPermission { .. } => "unknown_permission",
            Self::EmptyExecutors => "empty_executors",
            Self::InvalidExecutor { .. } => "invalid_executor",
        }
    }
}

// ============================================================================
// Permission Errors
// ============================================================================

/// Errors returned by permission lookups.
///
/// Kept separate from a `false` result so a misspelled node never reads as
/// "access denied".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    #[error("permission '{0}' is not registered")]
    NotRegistered(String),
}

// ============================================================================
// Handler Errors
// ============================================================================

/// Error type returned by command handlers. Handlers define their own causes.
pub type HandlerError = anyhow::Error;

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;

// ============================================================================
// Dispatch Errors (delivered to the error sink)
// ============================================================================

/// A classified failure during dispatch of a single message.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("handler for '{command}' failed: {source:#}")]
    HandlerFailure {
        command: String,
        #[source]
        source: HandlerError,
    },

    /// The handler never returned a result: it panicked or its lane was aborted.
    #[error("invocation of '{command}' did not complete: {reason}")]
    Binding { command: String, reason: String },
}

impl DispatchError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(e) => e.error_code(),
            Self::HandlerFailure { .. } => "handler_failure",
            Self::Binding { .. } => "binding_failure",
        }
    }

    /// Name of the command this error concerns, if any.
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::Configuration(ConfigurationError::UnknownPermission { command, .. })
            | Self::HandlerFailure { command, .. }
            | Self::Binding { command, .. } => Some(command),
            Self::Configuration(_) => None,
        }
    }
}
