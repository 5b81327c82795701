//! Reads the picker configuration file.
//!
//! `--config` names a file that must exist. Without it the XDG path is
//! tried and a missing file means built-in defaults. TOML syntax errors are
//! reported with line and column.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::config::error::ConfigError;
use crate::config::schema::Config;
use crate::config::xdg;

/// Entry points for reading [`Config`].
pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads the `--config` file when given, the XDG file otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        explicit.map_or_else(Self::load_default, Self::load_from_path)
    }

    /// Reads `path`. A missing file is [`ConfigError::NotFound`].
    pub fn load_from_path(path: &Path) -> Result<Config, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse_toml(&content, path),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            }),
            Err(source) => Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Reads `$XDG_CONFIG_HOME/place-picker/config.toml`, or defaults when
    /// the picker has never been configured.
    pub fn load_default() -> Result<Config, ConfigError> {
        let path = xdg::config_path();
        if !path.exists() {
            tracing::debug!("no picker config at {}, using defaults", path.display());
            return Ok(Config::default());
        }
        Self::load_from_path(&path)
    }

    fn parse_toml(content: &str, path: &Path) -> Result<Config, ConfigError> {
        toml::from_str(content).map_err(|e| {
            let (line, column) = e
                .span()
                .map_or((0, 0), |span| line_column(content, span.start));
            ConfigError::ParseError {
                path: path.to_path_buf(),
                line,
                column,
                message: e.message().to_string(),
            }
        })
    }
}

/// One-based line and column of byte `offset` in `content`.
fn line_column(content: &str, offset: usize) -> (usize, usize) {
    let before = &content[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |p| p + 1);
    (line, offset - line_start + 1)
}
