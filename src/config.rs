//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/seglist/seglist.toml`
//! 3. Local config: `<dir>/.seglist.toml`
//! 4. Environment variables: `SEGLIST_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Leaf-reference lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LookupConfig {
    /// Shortest query term that is sent to the catalog
    pub min_term_len: usize,
    /// Maximum number of candidates returned
    pub limit: usize,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            min_term_len: 2,
            limit: 10,
        }
    }
}

/// Raw lookup config for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLookupConfig {
    pub min_term_len: Option<usize>,
    pub limit: Option<usize>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub store_dir: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    #[serde(default)]
    pub lookup: RawLookupConfig,
}

/// Unified configuration for seglist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding one JSON document per list (default: ~/.seglist/lists)
    pub store_dir: PathBuf,
    /// Source catalog for lookups (TOML)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
    /// Lookup settings
    pub lookup: LookupConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_dir: dirs_default_base_dir().join("lists"),
            catalog: None,
            lookup: LookupConfig::default(),
        }
    }
}

/// Get the default base directory (~/.seglist).
fn dirs_default_base_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".seglist"))
        .unwrap_or_else(|| PathBuf::from("~/.seglist"))
}

/// Get the XDG config directory for seglist.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "seglist").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("seglist.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".seglist.toml")
}

/// Expand environment variables and `~` in a path string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
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

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl LookupConfig {
    /// Overlay wins where specified.
    pub fn merge(&self, overlay: &RawLookupConfig) -> Self {
        Self {
            min_term_len: overlay.min_term_len.unwrap_or(self.min_term_len),
            limit: overlay.limit.unwrap_or(self.limit),
        }
    }
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.store_dir.to_string_lossy().as_ref());
        self.store_dir = PathBuf::from(expanded);

        if let Some(catalog) = &self.catalog {
            self.catalog = Some(PathBuf::from(expand_env_vars(
                catalog.to_string_lossy().as_ref(),
            )));
        }
    }

    /// Merge overlay config onto self (base): overlay wins if specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            store_dir: overlay
                .store_dir
                .clone()
                .unwrap_or_else(|| self.store_dir.clone()),
            catalog: overlay.catalog.clone().or_else(|| self.catalog.clone()),
            lookup: self.lookup.merge(&overlay.lookup),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.seglist.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|p| p.exists());
        Self::load_layers(global.as_deref(), local_dir)
    }

    /// Load settings from an explicit global file and local directory.
    pub fn load_layers(
        global: Option<&Path>,
        local_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global {
            let raw = load_raw_settings(global_path)?;
            current = current.merge_with(&raw);
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply SEGLIST_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("SEGLIST")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("store_dir") {
            settings.store_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("catalog") {
            settings.catalog = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get::<usize>("lookup.min_term_len") {
            settings.lookup.min_term_len = val;
        }
        if let Ok(val) = config.get::<usize>("lookup.limit") {
            settings.lookup.limit = val;
        }

        Ok(settings)
    }

    /// Render the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_overlay_when_merging_lookup_then_keeps_defaults() {
        let merged = LookupConfig::default().merge(&RawLookupConfig::default());
        assert_eq!(merged, LookupConfig::default());
    }

    #[test]
    fn given_overlay_limit_when_merging_then_overlay_wins() {
        let merged = LookupConfig::default().merge(&RawLookupConfig {
            min_term_len: None,
            limit: Some(3),
        });
        assert_eq!(merged.limit, 3);
        assert_eq!(merged.min_term_len, 2);
    }
}
