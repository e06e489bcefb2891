//! Prometheus metrics collection for slcmd.
//!
//! - `slcmd_dispatch_total{outcome}` - Messages processed by dispatch outcome
//! - `slcmd_command_total{command}` - Handler invocations by command
//! - `slcmd_command_duration_seconds{command}` - Handler latency histogram
//! - `slcmd_command_errors_total{command, error}` - Reported errors by kind
//!
//! Recording is a no-op until [`init`] has been called, so library users that
//! do not care about metrics pay nothing.

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

/// Messages processed, labeled by dispatch outcome.
pub static DISPATCH_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Handler invocations by canonical command name.
pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Handler latency by canonical command name.
pub static COMMAND_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Reported dispatch errors by command and error code.
pub static COMMAND_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Safe to call more than once; only the first call registers metrics.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            if $metric.get().is_none() {
                match $init {
                    Ok(m) => {
                        if let Err(e) = r.register(Box::new(m.clone())) {
                            tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                        }
                        let _ = $metric.set(m);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                    }
                }
            }
        };
    }

    register!(DISPATCH_COUNTER, IntCounterVec::new(Opts::new("slcmd_dispatch_total", "Messages processed by dispatch outcome"), &["outcome"]));
    register!(COMMAND_COUNTER, IntCounterVec::new(Opts::new("slcmd_command_total", "Command handler invocations"), &["command"]));
    register!(COMMAND_LATENCY, HistogramVec::new(
        HistogramOpts::new("slcmd_command_duration_seconds", "Command handler latency")
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        &["command"]));
    register!(COMMAND_ERRORS, IntCounterVec::new(Opts::new("slcmd_command_errors_total", "Dispatch errors by command and kind"), &["command", "error"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

/// Record the outcome of one dispatched message.
#[inline]
pub fn record_dispatch(outcome: &str) {
    if let Some(c) = DISPATCH_COUNTER.get() {
        c.with_label_values(&[outcome]).inc();
    }
}

/// Record a handler invocation with latency.
#[inline]
pub fn record_command(command: &str, duration_secs: f64) {
    if let Some(c) = COMMAND_COUNTER.get() {
        c.with_label_values(&[command]).inc();
    }
    if let Some(h) = COMMAND_LATENCY.get() {
        h.with_label_values(&[command]).observe(duration_secs);
    }
}

/// Record a reported dispatch error.
#[inline]
pub fn record_command_error(command: &str, error: &str) {
    if let Some(c) = COMMAND_ERRORS.get() {
        c.with_label_values(&[command, error]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_lifecycle() {
        init();
        init();
        record_command("ping", 0.001);
        record_dispatch("invoked");
        record_command_error("ban", "unknown_permission");

        let output = gather_metrics();
        assert!(output.contains("slcmd_command_total"));
        assert!(output.contains("slcmd_dispatch_total"));
        assert!(output.contains("unknown_permission"));
    }
}
