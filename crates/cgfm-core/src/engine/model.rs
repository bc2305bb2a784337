use super::config::ModelSettings;
use super::error::SetupError;
use super::grid::EvaluationGrid;
use crate::core::basis::{Basis, BasisFunctions};
use crate::core::interactions::class::{DefinedInteraction, InteractionClass};
use crate::core::interactions::columns::{build_column_map, build_three_body_column_map};
use crate::core::interactions::groups::{DensityAdjacency, HelicalList};
use crate::core::interactions::hash::{DefinedSet, TupleHasher};
use crate::core::interactions::kind::{InteractionKind, RangeFile};
use crate::core::io::range::read_class_ranges;
use crate::core::io::table::read_class_table;
use crate::core::io::LineReader;
use crate::core::topology::summary::{HelicalInputs, TopologySummary};
use std::collections::{BTreeMap, BTreeSet};
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum SetupStage {
    Allocated,
    RangesRead,
    Finalized,
    TablesRead,
}

impl SetupStage {
    fn name(self) -> &'static str {
        match self {
            SetupStage::Allocated => "allocate",
            SetupStage::RangesRead => "read ranges",
            SetupStage::Finalized => "finalize",
            SetupStage::TablesRead => "read tables",
        }
    }
}

/// Every interaction class of a model, taken through the setup sequence.
///
/// The sequence is strictly ordered: [`InteractionModel::allocate`], then
/// [`InteractionModel::read_ranges_from_dir`], then [`InteractionModel::finalize`]
/// and optionally [`InteractionModel::read_tables`]. Classes occupy the
/// regression matrix in [`InteractionKind::ALL`] order.
#[derive(Debug, Clone)]
pub struct InteractionModel {
    global_cutoff: f64,
    strict: bool,
    classes: BTreeMap<InteractionKind, InteractionClass>,
    n_cg_types: usize,
    density_members: Vec<BTreeSet<usize>>,
    helical_inputs: HelicalInputs,
    density_adjacency: DensityAdjacency,
    helical_list: HelicalList,
    fitting_bases: BTreeMap<InteractionKind, Basis>,
    /// Cutoffs each fitting basis was built on; tables may later replace the class's own.
    fitted_ranges: BTreeMap<InteractionKind, Vec<(f64, f64)>>,
    table_bases: BTreeMap<InteractionKind, Basis>,
    stage: SetupStage,
}

impl InteractionModel {
    /// Validates every class's settings and allocates its defined interactions.
    pub fn allocate(
        settings: &ModelSettings,
        topology: &TopologySummary,
    ) -> Result<Self, SetupError> {
        let global_cutoff = settings.pair_nonbonded_cutoff;
        let mut classes = BTreeMap::new();

        for kind in InteractionKind::ALL {
            let params = settings.class_settings(kind).resolve(kind, global_cutoff)?;
            let enabled = !kind.is_optional() || params.subtype != 0;
            let class = if enabled {
                let names = topology.type_names(kind.type_space());
                let hasher = TupleHasher::new(kind.symmetry(), kind.n_body(), names.len());
                let defined = match topology.bonded_tuples(kind)? {
                    Some(tuples) => DefinedSet::from_tuples(&hasher, &tuples),
                    None => DefinedSet::complete(&hasher),
                };
                let mut class = InteractionClass::new(kind, params, names, defined);
                if kind == InteractionKind::ThreeBodyNonbonded {
                    class.match_all_over_angle_range();
                }
                class
            } else {
                InteractionClass::disabled(kind, params)
            };
            debug!(
                class = kind.full_name(),
                enabled,
                defined = class.n_defined(),
                basis = %params.basis,
                "Allocated interaction class"
            );
            classes.insert(kind, class);
        }

        Ok(Self {
            global_cutoff,
            strict: settings.strict_type_matching,
            classes,
            n_cg_types: topology.n_cg_types(),
            density_members: topology.density_members()?,
            helical_inputs: topology.helical_inputs(),
            density_adjacency: DensityAdjacency::default(),
            helical_list: HelicalList::default(),
            fitting_bases: BTreeMap::new(),
            fitted_ranges: BTreeMap::new(),
            table_bases: BTreeMap::new(),
            stage: SetupStage::Allocated,
        })
    }

    fn require_stage(&self, step: SetupStage, requires: SetupStage) -> Result<(), SetupError> {
        if self.stage != requires {
            return Err(SetupError::OutOfOrder {
                step: step.name(),
                requires: requires.name(),
            });
        }
        Ok(())
    }

    /// Kinds that read `file`, in reading order, skipping classes with nothing to read.
    fn readers_of(&self, file: RangeFile) -> Vec<InteractionKind> {
        InteractionKind::RANGE_ORDER
            .into_iter()
            .filter(|kind| kind.range_file() == Some(file))
            .filter(|kind| {
                let class = &self.classes[kind];
                class.is_enabled() && class.n_defined() > 0
            })
            .collect()
    }

    /// Reads every range file the enabled classes need from `dir`.
    ///
    /// A file is opened only when some class reads from it.
    pub fn read_ranges_from_dir(&mut self, dir: &Path) -> Result<(), SetupError> {
        self.require_stage(SetupStage::RangesRead, SetupStage::Allocated)?;

        let mut files: Vec<RangeFile> = Vec::new();
        for file in InteractionKind::RANGE_ORDER.into_iter().filter_map(InteractionKind::range_file) {
            if !files.contains(&file) {
                files.push(file);
            }
        }

        for file in files {
            let kinds = self.readers_of(file);
            if kinds.is_empty() {
                continue;
            }
            let path = dir.join(file.file_name());
            info!(path = %path.display(), "Reading interaction ranges");
            let mut reader = LineReader::open(&path)?;
            self.read_ranges(&kinds, &mut reader)?;
        }

        self.stage = SetupStage::RangesRead;
        Ok(())
    }

    fn read_ranges<R: BufRead>(
        &mut self,
        kinds: &[InteractionKind],
        reader: &mut LineReader<R>,
    ) -> Result<(), SetupError> {
        for kind in kinds {
            if let Some(class) = self.classes.get_mut(kind) {
                read_class_ranges(class, reader, self.strict)?;
            }
        }
        Ok(())
    }

    /// Runs the cross checks and derives adjacency, helical lists and column maps.
    pub fn finalize(&mut self) -> Result<(), SetupError> {
        self.require_stage(SetupStage::Finalized, SetupStage::RangesRead)?;

        self.classes[&InteractionKind::PairNonbonded].check_nonbonded_cutoffs(self.global_cutoff)?;
        self.classes[&InteractionKind::Angular].check_angular_cutoffs()?;
        if let Some(dihedral) = self.classes.get_mut(&InteractionKind::Dihedral) {
            dihedral.classify_periodicity()?;
        }

        let density = &self.classes[&InteractionKind::Density];
        if density.is_enabled() {
            self.density_adjacency =
                DensityAdjacency::build(density, &self.density_members, self.n_cg_types);
        }
        if self.classes[&InteractionKind::Helical].is_enabled() {
            let inputs = &self.helical_inputs;
            self.helical_list = HelicalList::build(
                &inputs.molecule_sites,
                &inputs.dihedral_partners,
                &inputs.molecule_ids,
            );
        }

        for (kind, class) in self.classes.iter_mut() {
            let columns = if *kind == InteractionKind::ThreeBodyNonbonded {
                build_three_body_column_map(class)
            } else {
                build_column_map(class)
            };
            class.set_column_map(columns);
            self.fitting_bases.insert(*kind, Basis::for_fitting(class));
            self.fitted_ranges.insert(
                *kind,
                class
                    .interactions()
                    .iter()
                    .map(|it| (it.lower_cutoff, it.upper_cutoff))
                    .collect(),
            );
        }

        info!(
            columns = self.total_columns(),
            "Finalized interaction classes"
        );
        self.stage = SetupStage::Finalized;
        Ok(())
    }

    /// Loads the tabulated interactions of every enabled class from a table file.
    pub fn read_tables(&mut self, path: &Path) -> Result<(), SetupError> {
        self.require_stage(SetupStage::TablesRead, SetupStage::Finalized)?;
        info!(path = %path.display(), "Reading tabulated interactions");
        let mut reader = LineReader::open(path)?;
        self.read_tables_from(&mut reader)
    }

    fn read_tables_from<R: BufRead>(&mut self, reader: &mut LineReader<R>) -> Result<(), SetupError> {
        for kind in InteractionKind::RANGE_ORDER {
            let Some(class) = self.classes.get_mut(&kind) else {
                continue;
            };
            if !class.is_enabled() {
                continue;
            }
            read_class_table(class, reader, self.strict)?;
            self.table_bases.insert(kind, Basis::for_tables(class));
        }
        self.stage = SetupStage::TablesRead;
        Ok(())
    }

    pub fn global_cutoff(&self) -> f64 {
        self.global_cutoff
    }

    pub fn class(&self, kind: InteractionKind) -> &InteractionClass {
        &self.classes[&kind]
    }

    pub fn classes(&self) -> impl Iterator<Item = &InteractionClass> {
        self.classes.values()
    }

    pub fn density_adjacency(&self) -> &DensityAdjacency {
        &self.density_adjacency
    }

    pub fn helical_list(&self) -> &HelicalList {
        &self.helical_list
    }

    /// First global column of a class's block.
    pub fn class_column_offset(&self, kind: InteractionKind) -> usize {
        self.classes
            .range(..kind)
            .map(|(_, class)| class.column_map().total_columns())
            .sum()
    }

    pub fn total_columns(&self) -> usize {
        self.classes
            .values()
            .map(|class| class.column_map().total_columns())
            .sum()
    }

    /// Global column of the first coefficient of a matched interaction.
    pub fn interaction_column_offset(
        &self,
        kind: InteractionKind,
        index: usize,
    ) -> Result<usize, SetupError> {
        let class = self.class(kind);
        let interaction = class.interaction(index)?;
        let block = class
            .column_map()
            .block(interaction.matched_index)
            .ok_or_else(|| SetupError::MissingRole {
                interaction: class.interaction_name(index, "-"),
                role: "force matched",
            })?;
        Ok(self.class_column_offset(kind) + block.start)
    }

    fn fitting_basis(&self, kind: InteractionKind) -> Result<&Basis, SetupError> {
        self.fitting_bases.get(&kind).ok_or(SetupError::OutOfOrder {
            step: "evaluate fitted interactions",
            requires: SetupStage::Finalized.name(),
        })
    }

    /// Global regression-matrix entries of one matched interaction at `param`.
    pub fn matrix_entries(
        &self,
        kind: InteractionKind,
        index: usize,
        param: f64,
    ) -> Result<Vec<(usize, f64)>, SetupError> {
        let offset = self.interaction_column_offset(kind, index)?;
        let row = self.fitting_basis(kind)?.basis_values(index, param)?;
        Ok(row
            .columns()
            .map(|(column, value)| (offset + column, value))
            .collect())
    }

    /// A matched interaction with the cutoffs its fitting basis was built on.
    fn fitted_interaction(
        &self,
        kind: InteractionKind,
        index: usize,
    ) -> Result<DefinedInteraction, SetupError> {
        let interaction = self.class(kind).interaction(index)?;
        let (lower_cutoff, upper_cutoff) = self
            .fitted_ranges
            .get(&kind)
            .and_then(|ranges| ranges.get(index).copied())
            .unwrap_or((interaction.lower_cutoff, interaction.upper_cutoff));
        Ok(DefinedInteraction {
            lower_cutoff,
            upper_cutoff,
            ..interaction.clone()
        })
    }

    /// Fitted curve of a matched interaction from the global solution vector.
    ///
    /// The curve spans the range the interaction was fitted over, even when a
    /// table has since replaced its cutoffs.
    pub fn fitted_grid(
        &self,
        kind: InteractionKind,
        index: usize,
        solution: &[f64],
    ) -> Result<EvaluationGrid, SetupError> {
        let offset = self.interaction_column_offset(kind, index)?;
        let basis = self.fitting_basis(kind)?;
        let class = self.class(kind);
        let grid = if kind == InteractionKind::OneBody {
            EvaluationGrid::single_value(basis, index, offset, solution)?
        } else {
            EvaluationGrid::sample(
                basis,
                index,
                offset,
                solution,
                &self.fitted_interaction(kind, index)?,
                class.params().output_binwidth,
            )?
        };
        Ok(standardize_for(kind, grid))
    }

    /// Curve of a tabulated interaction from its loaded table.
    pub fn table_grid(&self, kind: InteractionKind, index: usize) -> Result<EvaluationGrid, SetupError> {
        let class = self.class(kind);
        let interaction = class.interaction(index)?;
        if !interaction.is_tabulated() {
            return Err(SetupError::MissingRole {
                interaction: class.interaction_name(index, "-"),
                role: "tabulated",
            });
        }
        let basis = self.table_bases.get(&kind).ok_or(SetupError::OutOfOrder {
            step: "evaluate tabulated interactions",
            requires: SetupStage::TablesRead.name(),
        })?;
        let grid = EvaluationGrid::sample(
            basis,
            index,
            0,
            &[],
            interaction,
            class.params().output_binwidth,
        )?;
        Ok(standardize_for(kind, grid))
    }
}

/// Nonbonded potentials stay pinned to zero at the cutoff; others start at zero.
fn standardize_for(kind: InteractionKind, grid: EvaluationGrid) -> EvaluationGrid {
    if kind == InteractionKind::PairNonbonded {
        grid
    } else {
        grid.standardized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::interactions::class::{InteractionError, PeriodicClass};
    use crate::core::interactions::settings::{BasisType, ClassSettings};
    use std::fs;
    use tempfile::tempdir;

    fn topology(names: &[&str]) -> TopologySummary {
        TopologySummary {
            cg_types: names.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn settings() -> ModelSettings {
        ModelSettings {
            pair_nonbonded_cutoff: 10.0,
            ..Default::default()
        }
    }

    fn write_ranges(dir: &Path, files: &[(&str, &str)]) {
        for (name, content) in files {
            fs::write(dir.join(name), content).unwrap();
        }
    }

    const BONDED_ONE_TYPE: &str = "A A 1.0 2.0 fm\nA A A 90.0 180.0 fm\nA A A A -180.0 180.0 fm\n";

    #[test]
    fn setup_sequence_assigns_roles_and_columns() {
        let dir = tempdir().unwrap();
        write_ranges(
            dir.path(),
            &[
                ("rmin.in", "1 1 0.0 2.5 fm\n1 2 0.0 3.0 fm+tab\n2 2 0.0 2.0 none\n"),
                (
                    "rmin_b.in",
                    "A A 1.0 2.0 none\nA B 1.0 2.0 none\nA C 1.0 2.0 none\nB B 1.0 2.0 none\nB C 1.0 2.0 none\nC C 1.0 2.0 none\n",
                ),
            ],
        );
        // Angular and dihedral classes read nothing once the topology lists none of their tuples.
        let mut summary = topology(&["A", "B", "C"]);
        summary.bonded.angular = Some(Vec::new());
        summary.bonded.dihedral = Some(Vec::new());
        let mut model = InteractionModel::allocate(&settings(), &summary).unwrap();
        assert_eq!(model.class(InteractionKind::Angular).n_defined(), 0);
        model.read_ranges_from_dir(dir.path()).unwrap();
        model.finalize().unwrap();

        let pair = model.class(InteractionKind::PairNonbonded);
        assert_eq!(pair.counts().n_to_force_match, 2);
        assert_eq!(pair.counts().n_tabulated, 1);
        assert_eq!(pair.column_map().offsets(), &[0, 28, 61]);
        assert_eq!(model.total_columns(), 61);
        assert_eq!(model.class_column_offset(InteractionKind::PairBonded), 61);

        let ab = pair.index_of_tuple(&[1, 2]).unwrap();
        assert_eq!(
            model.interaction_column_offset(InteractionKind::PairNonbonded, ab).unwrap(),
            28
        );
        let bb = pair.index_of_tuple(&[2, 2]).unwrap();
        assert!(matches!(
            model.interaction_column_offset(InteractionKind::PairNonbonded, bb),
            Err(SetupError::MissingRole { .. })
        ));
    }

    #[test]
    fn missing_range_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let mut model = InteractionModel::allocate(&settings(), &topology(&["A"])).unwrap();
        let result = model.read_ranges_from_dir(dir.path());
        assert!(matches!(result, Err(SetupError::Input { .. })));
    }

    #[test]
    fn disabled_classes_open_no_files() {
        let dir = tempdir().unwrap();
        write_ranges(
            dir.path(),
            &[("rmin.in", "A A 0.0 2.0 fm\n"), ("rmin_b.in", BONDED_ONE_TYPE)],
        );
        let mut model = InteractionModel::allocate(&settings(), &topology(&["A"])).unwrap();
        model.read_ranges_from_dir(dir.path()).unwrap();
        model.finalize().unwrap();

        let dihedral = model.class(InteractionKind::Dihedral);
        assert_eq!(dihedral.interactions()[0].periodic_class, PeriodicClass::Full);
        assert!(!model.class(InteractionKind::Density).is_enabled());
        assert_eq!(model.class(InteractionKind::OneBody).n_defined(), 0);
    }

    #[test]
    fn finalize_rejects_nonbonded_range_past_cutoff() {
        let dir = tempdir().unwrap();
        write_ranges(
            dir.path(),
            &[("rmin.in", "A A 0.0 12.0 fm\n"), ("rmin_b.in", BONDED_ONE_TYPE)],
        );
        let mut model = InteractionModel::allocate(&settings(), &topology(&["A"])).unwrap();
        model.read_ranges_from_dir(dir.path()).unwrap();
        assert!(matches!(model.finalize(), Err(SetupError::Interaction { .. })));
    }

    #[test]
    fn steps_must_run_in_order() {
        let mut model = InteractionModel::allocate(&settings(), &topology(&["A"])).unwrap();
        assert!(matches!(
            model.finalize(),
            Err(SetupError::OutOfOrder { step: "finalize", .. })
        ));
        assert!(matches!(
            model.fitted_grid(InteractionKind::PairNonbonded, 0, &[]),
            Err(SetupError::MissingRole { .. })
        ));
    }

    #[test]
    fn tables_feed_tabulated_grids() {
        let dir = tempdir().unwrap();
        write_ranges(
            dir.path(),
            &[
                ("rmin.in", "A A 0.0 2.0 tab\n"),
                ("rmin_b.in", "A A 1.0 2.0 none\nA A A 0.0 180.0 none\nA A A A -180.0 180.0 none\n"),
            ],
        );
        let table = dir.path().join("table.in");
        fs::write(
            &table,
            "nonbonded 1 0.5\nA A\n1.0 2.0\n3.0\n2.0\n1.0\nbond 0 0.0\nangle 0 0.0\ndihedral 0 0.0\n",
        )
        .unwrap();

        let mut model = InteractionModel::allocate(&settings(), &topology(&["A"])).unwrap();
        model.read_ranges_from_dir(dir.path()).unwrap();
        model.finalize().unwrap();
        model.read_tables(&table).unwrap();

        let mut settings = settings();
        settings.classes.insert(
            "pair-nonbonded".to_string(),
            ClassSettings {
                output_binwidth: Some(0.5),
                ..Default::default()
            },
        );
        let mut coarse = InteractionModel::allocate(&settings, &topology(&["A"])).unwrap();
        coarse.read_ranges_from_dir(dir.path()).unwrap();
        coarse.finalize().unwrap();
        coarse.read_tables(&table).unwrap();

        let grid = coarse.table_grid(InteractionKind::PairNonbonded, 0).unwrap();
        assert_eq!(grid.axis, vec![1.0, 1.5, 2.0]);
        assert_eq!(grid.force, vec![3.0, 2.0, 1.0]);
        assert_eq!(grid.potential, vec![2.0, 0.75, 0.0]);
        assert_eq!(model.table_grid(InteractionKind::PairNonbonded, 0).unwrap().len(), 101);
    }

    #[test]
    fn finalize_rejects_angles_past_180() {
        let dir = tempdir().unwrap();
        write_ranges(
            dir.path(),
            &[
                ("rmin.in", "A A 0.0 2.0 none\n"),
                ("rmin_b.in", "A A 1.0 2.0 none\nA A A 90.0 190.0 fm\nA A A A -180.0 180.0 none\n"),
            ],
        );
        let mut model = InteractionModel::allocate(&settings(), &topology(&["A"])).unwrap();
        model.read_ranges_from_dir(dir.path()).unwrap();
        assert!(matches!(
            model.finalize(),
            Err(SetupError::Interaction {
                source: InteractionError::AngleOutOfRange { .. }
            })
        ));
    }

    #[test]
    fn finalize_accepts_angles_ending_at_180() {
        let dir = tempdir().unwrap();
        write_ranges(
            dir.path(),
            &[
                ("rmin.in", "A A 0.0 2.0 none\n"),
                ("rmin_b.in", "A A 1.0 2.0 none\nA A A 90.0 180.0 fm\nA A A A -180.0 180.0 none\n"),
            ],
        );
        let mut model = InteractionModel::allocate(&settings(), &topology(&["A"])).unwrap();
        model.read_ranges_from_dir(dir.path()).unwrap();
        model.finalize().unwrap();
        let angle = &model.class(InteractionKind::Angular).interactions()[0];
        assert_eq!(angle.upper_cutoff, 180.0);
    }

    #[test]
    fn fitted_grid_keeps_fitting_range_after_tables() {
        let dir = tempdir().unwrap();
        write_ranges(
            dir.path(),
            &[
                ("rmin.in", "A A 0.0 2.0 fm+tab\n"),
                ("rmin_b.in", "A A 1.0 2.0 none\nA A A 0.0 180.0 none\nA A A A -180.0 180.0 none\n"),
            ],
        );
        let table = dir.path().join("table.in");
        fs::write(
            &table,
            "nonbonded 1 0.5\nA A\n0.0 3.0\n6\n5\n4\n3\n2\n1\n0\nbond 0 0.0\nangle 0 0.0\ndihedral 0 0.0\n",
        )
        .unwrap();

        let mut settings = settings();
        settings.classes.insert(
            "pair-nonbonded".to_string(),
            ClassSettings {
                output_binwidth: Some(0.5),
                ..Default::default()
            },
        );
        let mut model = InteractionModel::allocate(&settings, &topology(&["A"])).unwrap();
        model.read_ranges_from_dir(dir.path()).unwrap();
        model.finalize().unwrap();
        let solution = vec![0.0; model.total_columns()];
        let before = model
            .fitted_grid(InteractionKind::PairNonbonded, 0, &solution)
            .unwrap();

        model.read_tables(&table).unwrap();
        assert_eq!(
            model.class(InteractionKind::PairNonbonded).interactions()[0].upper_cutoff,
            3.0
        );
        let after = model
            .fitted_grid(InteractionKind::PairNonbonded, 0, &solution)
            .unwrap();
        assert_eq!(after.axis, before.axis);
        assert_eq!(after.axis, vec![0.0, 0.5, 1.0, 1.5, 2.0]);

        let tabulated = model.table_grid(InteractionKind::PairNonbonded, 0).unwrap();
        assert_eq!(tabulated.len(), 7);
        assert_eq!(tabulated.axis.last(), Some(&3.0));
    }

    #[test]
    fn fitted_grid_reads_solution_block() {
        let dir = tempdir().unwrap();
        write_ranges(
            dir.path(),
            &[("rmin.in", "A A 0.0 2.0 none\n"), ("rmin_b.in", BONDED_ONE_TYPE)],
        );
        let mut settings = settings();
        settings.classes.insert(
            "pair-bonded".to_string(),
            ClassSettings {
                basis: Some(BasisType::Delta),
                output_binwidth: Some(0.5),
                ..Default::default()
            },
        );
        let mut model = InteractionModel::allocate(&settings, &topology(&["A"])).unwrap();
        model.read_ranges_from_dir(dir.path()).unwrap();
        model.finalize().unwrap();

        let offset = model
            .interaction_column_offset(InteractionKind::PairBonded, 0)
            .unwrap();
        assert_eq!(offset, 0);
        let mut solution = vec![0.0; model.total_columns()];
        solution[offset] = -2.0;

        let entries = model
            .matrix_entries(InteractionKind::PairBonded, 0, 1.5)
            .unwrap();
        assert_eq!(entries, vec![(0, 1.0)]);

        let grid = model
            .fitted_grid(InteractionKind::PairBonded, 0, &solution)
            .unwrap();
        assert_eq!(grid.axis, vec![1.0, 1.5, 2.0]);
        assert_eq!(grid.force, vec![-2.0, -2.0, -2.0]);
        assert_eq!(grid.potential, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn density_and_helical_structures_are_built_when_enabled() {
        let dir = tempdir().unwrap();
        write_ranges(
            dir.path(),
            &[
                ("rmin.in", "A A 0.0 2.0 none\n"),
                ("rmin_b.in", BONDED_ONE_TYPE),
                ("rmin_den.in", "G1 G1 0.0 5.0 fm 0.5\n"),
                ("rmin_hel.in", "M 0.0 5.0 fm 1.0 0.2\n"),
            ],
        );
        let mut settings = settings();
        for key in ["density", "helical"] {
            settings.classes.insert(
                key.to_string(),
                ClassSettings {
                    subtype: Some(1),
                    basis: Some(BasisType::Delta),
                    ..Default::default()
                },
            );
        }
        let summary: TopologySummary = toml::from_str(
            r#"
            cg-types = ["A"]
            [[density-groups]]
            name = "G1"
            members = ["A"]
            [[molecule-groups]]
            name = "M"
            molecules = [0]
            [[molecules]]
            sites = [0, 1, 2, 3]
            dihedrals = [[0, 1, 2, 3]]
            "#,
        )
        .unwrap();

        let mut model = InteractionModel::allocate(&settings, &summary).unwrap();
        model.read_ranges_from_dir(dir.path()).unwrap();
        model.finalize().unwrap();

        assert!(model.density_adjacency().interacts(0, 0));
        assert_eq!(model.helical_list().pairs(0), &[(3, 0)]);
        assert_eq!(
            model.class(InteractionKind::Helical).interactions()[0].extra,
            crate::core::interactions::kind::ExtraParams::Helical { r0: 1.0, sigma2: 0.2 }
        );
    }
}
