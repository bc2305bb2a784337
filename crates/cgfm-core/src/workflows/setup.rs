use crate::core::interactions::kind::InteractionKind;
use crate::core::topology::summary::TopologySummary;
use crate::engine::config::{ModelSettings, SetupConfig};
use crate::engine::error::SetupError;
use crate::engine::model::InteractionModel;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument};

/// Role and column totals of one interaction class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassSummary {
    pub kind: InteractionKind,
    pub enabled: bool,
    pub defined: usize,
    pub matched: usize,
    pub symmetric: usize,
    pub tabulated: usize,
    pub tabsym: usize,
    pub columns: usize,
}

/// Runs the full setup sequence from the files named in `config`.
#[instrument(skip_all, name = "setup_workflow")]
pub fn run(
    config: &SetupConfig,
    reporter: &ProgressReporter,
) -> Result<InteractionModel, SetupError> {
    reporter.report(Progress::PhaseStart {
        name: "Loading settings",
    });
    let settings = ModelSettings::load(&config.settings_path)?;
    let topology = TopologySummary::load(&config.topology_path)?;
    info!(
        cg_types = topology.n_cg_types(),
        cutoff = settings.pair_nonbonded_cutoff,
        "Loaded model settings and topology summary"
    );
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart {
        name: "Reading interaction ranges",
    });
    let mut model = InteractionModel::allocate(&settings, &topology)?;
    model.read_ranges_from_dir(&config.range_dir)?;
    model.finalize()?;
    reporter.report(Progress::PhaseFinish);

    if let Some(table_path) = &config.table_path {
        reporter.report(Progress::PhaseStart {
            name: "Reading tabulated interactions",
        });
        model.read_tables(table_path)?;
        reporter.report(Progress::PhaseFinish);
    }

    let disabled: Vec<&str> = model
        .classes()
        .filter(|class| !class.is_enabled())
        .map(|class| class.kind().full_name())
        .collect();
    if !disabled.is_empty() {
        reporter.report(Progress::Message(format!(
            "Disabled classes: {}",
            disabled.join(", ")
        )));
    }

    for class in model.classes().filter(|class| class.is_enabled()) {
        reporter.report(Progress::ClassReady {
            class: class.kind().full_name(),
            matched: class.counts().n_to_force_match,
            tabulated: class.counts().n_tabulated,
        });
    }
    Ok(model)
}

pub fn summarize(model: &InteractionModel) -> Vec<ClassSummary> {
    model
        .classes()
        .map(|class| {
            let counts = class.counts();
            ClassSummary {
                kind: class.kind(),
                enabled: class.is_enabled(),
                defined: class.n_defined(),
                matched: counts.n_to_force_match,
                symmetric: counts.n_symmetric,
                tabulated: counts.n_tabulated,
                tabsym: counts.n_tabsym,
                columns: class.column_map().total_columns(),
            }
        })
        .collect()
}
