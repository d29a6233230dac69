//! Logging setup for the Microscopium crates.
//!
//! Structured logging through `tracing`, configured from environment variables.
//!
//! # Environment Variables
//!
//! - `MICROSCOPIUM_DEBUG=true` / `1` / `yes` - Enable debug logging
//! - `MICROSCOPIUM_LOG_LEVEL=debug|info|warn|error|trace` - Set specific log level
//! - `MICROSCOPIUM_LOG_FORMAT=json|pretty|compact` - Set output format (default: json)
//!
//! # Usage
//!
//! ```rust,no_run
//! use microscopium_query::logging;
//!
//! // Initialize logging (call once at startup)
//! logging::init();
//! ```
//!
//! Within the crates, use the standard tracing macros:
//!
//! ```rust,ignore
//! use tracing::{debug, info, error};
//!
//! debug!(collection = %query.collection, filter = %query.filter, "Executing find");
//! info!(status = %status, latency_ms = ms, "Request handled");
//! error!(error = %e, "Query failed");
//! ```

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Targets whose level is governed by `MICROSCOPIUM_LOG_LEVEL`.
const TARGETS: &[&str] = &[
    "microscopium",
    "microscopium_query",
    "microscopium_mongodb",
    "microscopium_axum",
    "microscopium_cli",
];

/// Check if debug logging is enabled via `MICROSCOPIUM_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("MICROSCOPIUM_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Get the configured log level from `MICROSCOPIUM_LOG_LEVEL`.
///
/// Defaults to "debug" if `MICROSCOPIUM_DEBUG` is enabled, otherwise "info".
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "info" };
    match env::var("MICROSCOPIUM_LOG_LEVEL") {
        Ok(level) => match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

/// Get the configured log format from `MICROSCOPIUM_LOG_FORMAT`.
///
/// Defaults to "json".
pub fn get_log_format() -> &'static str {
    env::var("MICROSCOPIUM_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// The `EnvFilter` directive string for `level`.
pub fn filter_directives(level: &str) -> String {
    TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the logging system.
///
/// Subsequent calls are no-ops. Without the `tracing-subscriber` feature
/// nothing is installed and the embedding application is expected to set up
/// its own subscriber.
pub fn init() {
    INIT.call_once(|| {
        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(filter_directives(level))
                .unwrap_or_else(|_| EnvFilter::new("info"));

            match get_log_format() {
                "json" => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().json())
                        .init();
                }
                "compact" => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().compact())
                        .init();
                }
                _ => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().pretty())
                        .init();
                }
            }

            tracing::info!(
                level = level,
                format = get_log_format(),
                "Microscopium logging initialized"
            );
        }
    });
}
