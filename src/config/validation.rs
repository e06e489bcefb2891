//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use std::collections::HashSet;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("dispatch.default_prefix is required")]
    MissingDefaultPrefix,
    #[error("dispatch.bot_mentions entries must be non-empty without whitespace, got {0:?}")]
    InvalidMention(String),
    #[error("dispatch.allow_mention is set but dispatch.bot_mentions is empty")]
    MentionWithoutMentions,
    #[error("dispatch.lanes must be at least 1")]
    ZeroLanes,
    #[error("prefix.guilds entry for '{0}' is empty")]
    EmptyGuildPrefix(String),
    #[error("permission name must not be empty")]
    EmptyPermissionName,
    #[error("permission '{0}' is declared more than once")]
    DuplicatePermission(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let dispatch = &config.dispatch;

    if dispatch.default_prefix.is_empty() {
        errors.push(ValidationError::MissingDefaultPrefix);
    }
    for mention in &dispatch.bot_mentions {
        if mention.is_empty() || mention.chars().any(char::is_whitespace) {
            errors.push(ValidationError::InvalidMention(mention.clone()));
        }
    }
    if dispatch.allow_mention && dispatch.bot_mentions.is_empty() {
        errors.push(ValidationError::MentionWithoutMentions);
    }
    if dispatch.lanes == 0 {
        errors.push(ValidationError::ZeroLanes);
    }

    for (guild, prefix) in &config.prefix.guilds {
        if prefix.is_empty() {
            errors.push(ValidationError::EmptyGuildPrefix(guild.clone()));
        }
    }

    let mut seen = HashSet::new();
    for block in &config.permissions {
        if block.name.is_empty() {
            errors.push(ValidationError::EmptyPermissionName);
        } else if !seen.insert(block.name.as_str()) {
            errors.push(ValidationError::DuplicatePermission(block.name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
