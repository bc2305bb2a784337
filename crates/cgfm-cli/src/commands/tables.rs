use super::build_config;
use crate::cli::TablesArgs;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use cgfm::engine::grid::EvaluationGrid;
use cgfm::engine::progress::ProgressReporter;
use cgfm::workflows::setup;
use std::fmt::Write;
use tracing::{info, warn};

pub fn run(args: TablesArgs) -> Result<()> {
    let config = build_config(&args.inputs, Some(args.table))?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let model = setup::run(&config, &reporter)?;

    let mut written = 0usize;
    for class in model.classes().filter(|class| class.is_enabled()) {
        for index in class.tabulated_indices() {
            let grid = model.table_grid(class.kind(), index)?;
            let name = class.interaction_name(index, "-");
            print!("{}", render_grid(class.kind().full_name(), &name, &grid));
            written += 1;
        }
    }

    if written == 0 {
        warn!("No tabulated interactions were found.");
        println!("No tabulated interactions.");
    } else {
        info!(count = written, "Printed tabulated interaction grids");
    }
    Ok(())
}

/// A commented header line followed by `axis force potential` rows.
pub fn render_grid(class: &str, name: &str, grid: &EvaluationGrid) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {class} {name} ({} points)", grid.len());
    for ((x, force), potential) in grid.axis.iter().zip(&grid.force).zip(&grid.potential) {
        let _ = writeln!(out, "{x:.6} {force:.6} {potential:.6}");
    }
    out
}
