//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

/// Number of candidate-evaluation lanes when `dispatch.lanes` is unset.
pub fn default_lanes() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

pub fn default_log_filter() -> String {
    "info".to_string()
}

pub fn default_console_author() -> String {
    "console".to_string()
}

pub fn default_console_guild() -> String {
    "console".to_string()
}
