pub mod setup;
pub mod tables;

use crate::cli::InputArgs;
use crate::error::Result;
use cgfm::engine::config::{SetupConfig, SetupConfigBuilder};
use std::path::PathBuf;

fn build_config(inputs: &InputArgs, table: Option<PathBuf>) -> Result<SetupConfig> {
    Ok(SetupConfigBuilder::new()
        .settings_path(inputs.settings.clone())
        .topology_path(inputs.topology.clone())
        .range_dir(inputs.ranges.clone())
        .table_path(table)
        .build()?)
}
