use thiserror::Error;

use super::config::ConfigError;
use crate::core::basis::BasisError;
use crate::core::interactions::class::InteractionError;
use crate::core::interactions::settings::SettingsError;
use crate::core::io::InputError;
use crate::core::topology::summary::TopologyLoadError;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Invalid class settings: {source}")]
    Settings {
        #[from]
        source: SettingsError,
    },

    #[error("Topology error: {source}")]
    Topology {
        #[from]
        source: TopologyLoadError,
    },

    #[error("Input error: {source}")]
    Input {
        #[from]
        source: InputError,
    },

    #[error("Invalid interaction range: {source}")]
    Interaction {
        #[from]
        source: InteractionError,
    },

    #[error("Basis evaluation failed: {source}")]
    Basis {
        #[from]
        source: BasisError,
    },

    #[error("{interaction} is not {role}")]
    MissingRole {
        interaction: String,
        role: &'static str,
    },

    #[error("Setup step '{step}' must run after '{requires}'")]
    OutOfOrder {
        step: &'static str,
        requires: &'static str,
    },
}
