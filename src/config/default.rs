//! Default configuration template and file creation utilities.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::error::ConfigError;
use crate::config::xdg;

/// Commented TOML template with all default values.
///
/// Every value here must match `Config::default()` from `schema.rs`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Place Picker Configuration
#
# This file was auto-generated with default values.
# All values shown below are the built-in defaults.
#
# Location: $XDG_CONFIG_HOME/place-picker/config.toml

# ==============================================================================
# Picker
# ==============================================================================

[picker]

# Quiet period after the last keystroke before a place search is sent.
# Rapid typing produces at most one search per pause.
# Examples: "250ms", "350ms", "1s"
search_debounce = "350ms"

# After a suggestion is touched, map taps are ignored for this long so the
# tap that selected the suggestion does not also move the pin.
interaction_guard = "350ms"

# Area shown on confirm when no city area could be resolved.
not_selected_label = "Not selected"

# Starting point when the caller has no stored location.
# Default: Tokyo Station.
[picker.default_location]
latitude = 35.681236
longitude = 139.767125

# ==============================================================================
# Logging
# ==============================================================================

[logging]

# Verbosity when PLACE_PICKER_LOG is not set.
# Options: "error", "warn", "info", "debug", "trace"
level = "info"
"#;

/// Writes the default template to the XDG config path.
///
/// See [`create_default_config_at`].
pub fn create_default_config(force: bool) -> Result<PathBuf, ConfigError> {
    let path = xdg::config_path();
    create_default_config_at(&path, force)?;
    Ok(path)
}

/// Writes the default template to `path`.
///
/// - If the file exists and `force` is `false`, returns `ConfigError::AlreadyExists`.
/// - If the file exists and `force` is `true`, backs it up to `.toml.backup` first.
pub fn create_default_config_at(path: &Path, force: bool) -> Result<(), ConfigError> {
    if path.exists() {
        if !force {
            return Err(ConfigError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }
        let backup_path = path.with_extension("toml.backup");
        fs::rename(path, &backup_path).map_err(|e| ConfigError::WriteError {
            path: backup_path.clone(),
            source: e,
        })?;
        tracing::info!("Backed up existing config to {}", backup_path.display());
    }

    write_default_config(path)?;
    tracing::info!("Wrote default configuration to {}", path.display());
    Ok(())
}

/// Writes the template, creating parent dirs and setting 0600 permissions.
fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let write_error = |source| ConfigError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        xdg::ensure_dir(parent).map_err(write_error)?;
    }
    fs::write(path, DEFAULT_CONFIG_TEMPLATE).map_err(write_error)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(write_error)?;
    }

    Ok(())
}
