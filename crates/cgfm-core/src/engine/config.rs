use crate::core::interactions::kind::InteractionKind;
use crate::core::interactions::settings::ClassSettings;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Unknown interaction class '{key}' in '{path}'")]
    UnknownClass { path: String, key: String },
    #[error("pair-nonbonded-cutoff must be positive (got {0})")]
    NonPositiveCutoff(f64),
}

/// Model-wide settings, read from a TOML file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ModelSettings {
    pub pair_nonbonded_cutoff: f64,
    /// Treat unrecognized type tokens in range and table files as errors.
    #[serde(default)]
    pub strict_type_matching: bool,
    #[serde(default)]
    pub classes: BTreeMap<String, ClassSettings>,
}

impl ModelSettings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let path_str = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        let settings: ModelSettings = toml::from_str(&content).map_err(|e| ConfigError::Toml {
            path: path_str.clone(),
            source: e,
        })?;

        if let Some(key) = settings
            .classes
            .keys()
            .find(|key| key.parse::<InteractionKind>().is_err())
        {
            return Err(ConfigError::UnknownClass {
                path: path_str,
                key: key.clone(),
            });
        }
        if settings.pair_nonbonded_cutoff <= 0.0 {
            return Err(ConfigError::NonPositiveCutoff(settings.pair_nonbonded_cutoff));
        }
        Ok(settings)
    }

    /// Settings of one class; absent classes get all defaults.
    pub fn class_settings(&self, kind: InteractionKind) -> ClassSettings {
        self.classes.get(kind.key()).cloned().unwrap_or_default()
    }
}

/// Input locations of one setup run.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupConfig {
    pub settings_path: PathBuf,
    pub topology_path: PathBuf,
    pub range_dir: PathBuf,
    pub table_path: Option<PathBuf>,
}

#[derive(Default)]
pub struct SetupConfigBuilder {
    settings_path: Option<PathBuf>,
    topology_path: Option<PathBuf>,
    range_dir: Option<PathBuf>,
    table_path: Option<PathBuf>,
}

impl SetupConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings_path(mut self, path: PathBuf) -> Self {
        self.settings_path = Some(path);
        self
    }
    pub fn topology_path(mut self, path: PathBuf) -> Self {
        self.topology_path = Some(path);
        self
    }
    pub fn range_dir(mut self, path: PathBuf) -> Self {
        self.range_dir = Some(path);
        self
    }
    pub fn table_path(mut self, path: Option<PathBuf>) -> Self {
        self.table_path = path;
        self
    }

    pub fn build(self) -> Result<SetupConfig, ConfigError> {
        Ok(SetupConfig {
            settings_path: self
                .settings_path
                .ok_or(ConfigError::MissingParameter("settings_path"))?,
            topology_path: self
                .topology_path
                .ok_or(ConfigError::MissingParameter("topology_path"))?,
            range_dir: self
                .range_dir
                .ok_or(ConfigError::MissingParameter("range_dir"))?,
            table_path: self.table_path,
        })
    }
}
