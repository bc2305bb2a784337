use super::build_config;
use crate::cli::SetupArgs;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use cgfm::engine::progress::ProgressReporter;
use cgfm::workflows::setup::{self, ClassSummary};
use std::fmt::Write;
use tracing::info;

pub fn run(args: SetupArgs) -> Result<()> {
    let config = build_config(&args.inputs, args.table)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the core setup workflow...");
    let model = setup::run(&config, &reporter)?;

    print!("{}", render_summary(&setup::summarize(&model)));
    println!(
        "Total regression columns: {} (pair nonbonded cutoff {})",
        model.total_columns(),
        model.global_cutoff()
    );
    Ok(())
}

/// One row per enabled class.
pub fn render_summary(summary: &[ClassSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<24} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "class", "defined", "matched", "sym", "tab", "tabsym", "columns"
    );
    for row in summary.iter().filter(|row| row.enabled) {
        let _ = writeln!(
            out,
            "{:<24} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
            row.kind.full_name(),
            row.defined,
            row.matched,
            row.symmetric,
            row.tabulated,
            row.tabsym,
            row.columns
        );
    }
    out
}
