//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rbtrace/rbtrace.toml`
//! 3. Local config: `<dir>/.rbtrace.toml` (working directory or `-C <dir>`)
//! 4. Environment variables: `RBTRACE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::KeyKind;

/// Raw settings for intermediate parsing.
///
/// `None` means "not specified in this layer, inherit from the layer below".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub key_kind: Option<KeyKind>,
    pub validation: Option<bool>,
    pub trace_events: Option<bool>,
}

/// Unified configuration for rbtrace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Key kind of a fresh tree
    pub key_kind: KeyKind,
    /// Validate imported trees before they replace the live tree
    pub validation: bool,
    /// Log every tree event at trace level (target `rbtrace::events`)
    pub trace_events: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            key_kind: KeyKind::Number,
            validation: true,
            trace_events: false,
        }
    }
}

/// Get the XDG config directory for rbtrace.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rbtrace").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rbtrace.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".rbtrace.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            key_kind: overlay.key_kind.unwrap_or(self.key_kind),
            validation: overlay.validation.unwrap_or(self.validation),
            trace_events: overlay.trace_events.unwrap_or(self.trace_events),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.rbtrace.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), local_dir)
    }

    /// Same as [`Settings::load`] with an explicit global config path.
    pub fn load_from(
        global_path: Option<&Path>,
        local_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_path {
            if global_path.exists() {
                debug!("load global config: {}", global_path.display());
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("load local config: {}", local_path.display());
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables
        Self::apply_env_overrides(current)
    }

    /// Apply RBTRACE_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("RBTRACE"))
            .build()
            .map_err(config_err)?;

        let key_kind = match config.get_string("key_kind") {
            Ok(val) => Some(val.parse::<KeyKind>()?),
            Err(ConfigError::NotFound(_)) => None,
            Err(e) => return Err(config_err(e)),
        };
        let raw = RawSettings {
            key_kind,
            validation: optional(config.get_bool("validation"))?,
            trace_events: optional(config.get_bool("trace_events"))?,
        };
        Ok(settings.merge_with(&raw))
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# rbtrace configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/rbtrace/rbtrace.toml
#   Local:  <dir>/.rbtrace.toml
#   Env:    RBTRACE_* environment variables (e.g. RBTRACE_VALIDATION=false)

# Key kind of a fresh tree: "number", "text" or "char"
# key_kind = "number"

# Validate imported trees against the red-black rules before replacing the
# live tree. Trees imported without validation cannot be edited.
# validation = true

# Log every tree event at trace level (use with -ddd)
# trace_events = false
"#
        .to_string()
    }
}

/// A missing key is not an error; a malformed one is.
fn optional<T>(res: Result<T, ConfigError>) -> Result<Option<T>, ApplicationError> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
