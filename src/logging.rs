//! Logging initialization for the place-picker binary.
//!
//! Configures the `tracing` subscriber with level filtering via the
//! `PLACE_PICKER_LOG` environment variable. When the variable is unset or
//! invalid, the `[logging] level` from the config file applies.
//!
//! # Usage
//!
//! ```bash
//! # Configured level (info by default)
//! place-picker search ramen --places places.toml
//!
//! # Module-specific filtering
//! PLACE_PICKER_LOG=place_picker::session=debug,warn place-picker search ramen --places places.toml
//! ```

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::schema::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "PLACE_PICKER_LOG";

/// Builds the filter: `PLACE_PICKER_LOG` if it parses, else `fallback`.
pub fn filter(fallback: LogLevel) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback.as_directive()))
}

/// Initialize the tracing subscriber, writing to stderr.
///
/// # Panics
///
/// Panics if a global subscriber has already been set (should only be
/// called once, at startup).
pub fn init(fallback: LogLevel) {
    fmt()
        .with_env_filter(filter(fallback))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
