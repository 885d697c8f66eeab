//! Configuration file support for dosecal.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/dosecal/config.toml`, or
//! from the path in `DOSECAL_CONFIG` when set. Loading only parses; call
//! [`Config::build_registry`] to validate and obtain the clinic registry.

use crate::clinic::{build_default_registry, ClinicRegistry};
use crate::i18n::Locale;
use crate::{ClinicConfig, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "DOSECAL_CONFIG";

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Replacement for the built-in fallback clinic
    #[serde(default)]
    pub default_clinic: Option<ClinicConfig>,

    /// Clinics added to (or overriding) the built-in registry
    #[serde(default)]
    pub clinics: Vec<ClinicConfig>,
}

/// Scheduling defaults
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ScheduleConfig {
    #[serde(default)]
    pub default_locale: Locale,
}

impl Config {
    /// Load configuration from `DOSECAL_CONFIG` or the standard config path
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Self::load_from(Path::new(&path));
        }

        match Self::default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            path => {
                tracing::info!("No config file found at {:?}, using defaults", path);
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|base| base.join("dosecal").join("config.toml"))
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Merge configured clinics over the built-in ones and validate the result
    ///
    /// Every problem found is reported in one `Error::Config`.
    pub fn build_registry(&self) -> Result<ClinicRegistry> {
        let mut registry = build_default_registry();

        if let Some(fallback) = &self.default_clinic {
            registry = registry.with_fallback(fallback.clone());
        }
        for clinic in &self.clinics {
            registry = registry.with_clinic(clinic.clone());
        }

        let errors = registry.validate();
        if !errors.is_empty() {
            return Err(Error::Config(errors.join("; ")));
        }

        tracing::debug!("Clinic registry ready with {} clinics", registry.len());
        Ok(registry)
    }
}
