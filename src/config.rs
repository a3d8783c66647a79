//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/wordtree/wordtree.toml`
//! 3. Local config: `<dir>/.wordtree.toml` (directory given with `-C`)
//! 4. Environment variables: `WORDTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::DEFAULT_NEST_THRESHOLD;

/// Name of the session file inside the data directory.
pub const SESSION_FILE_NAME: &str = "session.json";

/// Unified configuration for wordtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the session file (default: XDG data dir)
    pub data_dir: PathBuf,
    /// Horizontal drop displacement in pixels that nests a word
    pub nest_threshold: f64,
    /// Indentation of the exported JSON document
    pub export_indent: usize,
    /// File name used by `export` when no output is given
    pub export_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            nest_threshold: DEFAULT_NEST_THRESHOLD,
            export_indent: 4,
            export_file: "data.json".into(),
        }
    }
}

/// Raw settings for intermediate parsing (None = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_dir: Option<PathBuf>,
    pub nest_threshold: Option<f64>,
    pub export_indent: Option<usize>,
    pub export_file: Option<String>,
}

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", "wordtree")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.wordtree"))
}

/// Get the XDG config directory for wordtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "wordtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("wordtree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".wordtree.toml")
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

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
pub fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Path of the session file.
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE_NAME)
    }

    fn expand_paths(&mut self) {
        let expanded = expand_path(self.data_dir.to_string_lossy().as_ref());
        self.data_dir = PathBuf::from(expanded);
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_dir: overlay
                .data_dir
                .clone()
                .unwrap_or_else(|| self.data_dir.clone()),
            nest_threshold: overlay.nest_threshold.unwrap_or(self.nest_threshold),
            export_indent: overlay.export_indent.unwrap_or(self.export_indent),
            export_file: overlay
                .export_file
                .clone()
                .unwrap_or_else(|| self.export_file.clone()),
        }
    }

    /// Reject values the editor cannot work with.
    fn validate(&self) -> Result<(), ApplicationError> {
        if !self.nest_threshold.is_finite() || self.nest_threshold < 0.0 {
            return Err(ApplicationError::Config {
                message: format!(
                    "nest_threshold must be a non-negative number, got {}",
                    self.nest_threshold
                ),
            });
        }
        if self.export_file.trim().is_empty() {
            return Err(ApplicationError::Config {
                message: "export_file must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.wordtree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Apply WORDTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("WORDTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("data_dir") {
            settings.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("nest_threshold") {
            settings.nest_threshold = val.parse().map_err(|_| ApplicationError::Config {
                message: format!("WORDTREE_NEST_THRESHOLD is not a number: {val}"),
            })?;
        }
        if let Ok(val) = config.get_string("export_indent") {
            settings.export_indent = val.parse().map_err(|_| ApplicationError::Config {
                message: format!("WORDTREE_EXPORT_INDENT is not a number: {val}"),
            })?;
        }
        if let Ok(val) = config.get_string("export_file") {
            settings.export_file = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# wordtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/wordtree/wordtree.toml
#   Local:  <dir>/.wordtree.toml          (directory passed with -C)
#   Env:    WORDTREE_* environment variables

# Directory holding session.json (live tree and saved hierarchies)
# data_dir = "~/.local/share/wordtree"

# Horizontal drop distance in pixels that nests a word inside the target.
# Shorter drops reorder the word next to the target instead.
# nest_threshold = 50.0

# Indentation of exported JSON
# export_indent = 4

# Default export file name
# export_file = "data.json"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_settings_when_created_then_uses_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.nest_threshold, 50.0);
        assert_eq!(settings.export_indent, 4);
        assert_eq!(settings.export_file, "data.json");
        assert!(settings.session_path().ends_with(SESSION_FILE_NAME));
    }

    #[test]
    fn given_tilde_in_data_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            data_dir: PathBuf::from("~/.wordtree"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let dir = settings.data_dir.to_string_lossy();
        assert!(dir.starts_with(&home), "data_dir should start with home: {dir}");
        assert!(!dir.contains('~'));
    }

    #[test]
    fn given_partial_overlay_when_merging_then_only_given_values_change() {
        let base = Settings::default();
        let overlay = RawSettings {
            nest_threshold: Some(20.0),
            ..RawSettings::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.nest_threshold, 20.0);
        assert_eq!(merged.export_indent, base.export_indent);
        assert_eq!(merged.data_dir, base.data_dir);
    }

    #[test]
    fn given_negative_threshold_when_validating_then_config_error() {
        let settings = Settings {
            nest_threshold: -1.0,
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ApplicationError::Config { .. })
        ));
    }
}
