//! TOML configuration schema types for the place picker.
//!
//! All structs derive `Deserialize` and `Serialize` with defaults via
//! `#[serde(default)]`, so a missing or partial file yields a usable config.
//!
//! Duration fields use human-readable strings (e.g. `"350ms"`, `"1s"`) and
//! are parsed by `humantime` in [`Config::picker_settings`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::picker::PickerSettings;
use crate::Coordinates;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration.
///
/// ```toml
/// [picker]
/// [picker.default_location]
/// [logging]
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Session timing and labels.
    pub picker: PickerConfig,
    /// Log verbosity.
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the file values and converts them into [`PickerSettings`].
    pub fn picker_settings(&self) -> Result<PickerSettings, ConfigError> {
        let picker = &self.picker;
        let default_location = Coordinates::new(
            picker.default_location.latitude,
            picker.default_location.longitude,
        )
        .map_err(|source| ConfigError::InvalidCoordinates { source })?;
        Ok(PickerSettings {
            search_debounce: parse_duration("picker.search_debounce", &picker.search_debounce)?,
            interaction_guard: parse_duration(
                "picker.interaction_guard",
                &picker.interaction_guard,
            )?,
            not_selected_label: picker.not_selected_label.clone(),
            default_location,
        })
    }
}

fn parse_duration(field: &'static str, value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value).map_err(|e| ConfigError::InvalidDuration {
        field,
        value: value.to_string(),
        message: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Picker
// ---------------------------------------------------------------------------

/// `[picker]` section.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PickerConfig {
    /// Quiet period after typing before a search is issued.
    pub search_debounce: String,
    /// Map-tap suppression window after touching a suggestion.
    pub interaction_guard: String,
    /// Area label used on confirm when no area was resolved.
    pub not_selected_label: String,
    /// Initial point when the caller provides none.
    pub default_location: LocationConfig,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            search_debounce: "350ms".to_string(),
            interaction_guard: "350ms".to_string(),
            not_selected_label: "Not selected".to_string(),
            default_location: LocationConfig::default(),
        }
    }
}

/// `[picker.default_location]` section. Validated on conversion.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude: Coordinates::DEFAULT_ORIGIN.latitude(),
            longitude: Coordinates::DEFAULT_ORIGIN.longitude(),
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// `[logging]` section.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Used when `PLACE_PICKER_LOG` is not set.
    pub level: LogLevel,
}

/// Log verbosity levels (kebab-case in TOML).
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum LogLevel {
    /// Only errors.
    Error,
    /// Errors and warnings.
    Warn,
    /// Informational messages (default).
    #[default]
    Info,
    /// Debug-level detail.
    Debug,
    /// Full trace output.
    Trace,
}

impl LogLevel {
    /// Directive string understood by `EnvFilter`.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
