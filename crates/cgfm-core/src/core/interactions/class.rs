use super::columns::ColumnMap;
use super::hash::{DefinedSet, TupleHasher, TypeIndex};
use super::kind::{ExtraParams, InteractionKind};
use super::mode::ModeRoles;
use super::settings::ClassParameters;
use crate::core::basis::table::ExternalSplineTable;
use crate::core::constants::{FULL_CIRCLE_DEGREES, VERY_SMALL, VERY_SMALL_F};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodicClass {
    #[default]
    None,
    /// The range covers the whole circle, snapped to [-180, 180].
    Full,
    /// The range passes through the +/-180 boundary.
    Wrap,
}

/// Range and role record of one canonical type tuple.
///
/// Role indices are 1-based; zero means the role is not assigned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefinedInteraction {
    pub lower_cutoff: f64,
    pub upper_cutoff: f64,
    pub matched_index: usize,
    pub tabulated_index: usize,
    pub symmetric_index: usize,
    pub symtab_index: usize,
    pub periodic_class: PeriodicClass,
    pub extra: ExtraParams,
}

impl DefinedInteraction {
    pub fn is_matched(&self) -> bool {
        self.matched_index != 0
    }

    pub fn is_tabulated(&self) -> bool {
        self.tabulated_index != 0
    }

    pub fn is_symmetric(&self) -> bool {
        self.symmetric_index != 0
    }

    pub fn is_periodic(&self) -> bool {
        self.periodic_class != PeriodicClass::None
    }

    /// Width of the range; wrapping ranges are measured through the boundary.
    pub fn span(&self) -> f64 {
        let span = self.upper_cutoff - self.lower_cutoff;
        if self.periodic_class == PeriodicClass::Wrap && span <= 0.0 {
            span + FULL_CIRCLE_DEGREES
        } else {
            span
        }
    }

    /// Maps an angle into this interaction's range for periodic classes.
    pub fn reduce_parameter(&self, param: f64) -> f64 {
        match self.periodic_class {
            PeriodicClass::None => param,
            PeriodicClass::Full | PeriodicClass::Wrap => {
                self.lower_cutoff + (param - self.lower_cutoff).rem_euclid(FULL_CIRCLE_DEGREES)
            }
        }
    }
}

/// Totals of the independent role numbering spaces of a class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleCounts {
    pub n_to_force_match: usize,
    pub n_symmetric: usize,
    pub n_tabulated: usize,
    pub n_tabsym: usize,
}

impl RoleCounts {
    pub fn n_force(&self) -> usize {
        self.n_to_force_match - self.n_symmetric
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum InteractionError {
    #[error(
        "{name} upper cutoff {upper} is larger than the pair nonbonded cutoff {cutoff}; adjust the range file"
    )]
    BeyondNonbondedCutoff { name: String, upper: f64, cutoff: f64 },
    #[error("{name} range ({lower} to {upper}) goes outside the allowed range (0 to 180)")]
    AngleOutOfRange { name: String, lower: f64, upper: f64 },
    #[error("{name} has an invalid dihedral range ({lower} to {upper})")]
    InvalidDihedralRange { name: String, lower: f64, upper: f64 },
    #[error("{class} has no defined interaction with index {index}")]
    NoSuchInteraction { class: &'static str, index: usize },
}

/// One interaction class: its settings, its defined interactions and their
/// role, range and column bookkeeping.
#[derive(Debug, Clone)]
pub struct InteractionClass {
    kind: InteractionKind,
    params: ClassParameters,
    type_names: Vec<String>,
    hasher: TupleHasher,
    defined: DefinedSet,
    interactions: Vec<DefinedInteraction>,
    counts: RoleCounts,
    columns: ColumnMap,
    tables: Vec<Option<ExternalSplineTable>>,
    table_binwidth: f64,
}

impl InteractionClass {
    /// Allocates one record per member of `defined`.
    pub fn new(
        kind: InteractionKind,
        params: ClassParameters,
        type_names: Vec<String>,
        defined: DefinedSet,
    ) -> Self {
        let hasher = TupleHasher::new(kind.symmetry(), kind.n_body(), type_names.len());
        let interactions = vec![DefinedInteraction::default(); defined.len()];
        Self {
            kind,
            params,
            type_names,
            hasher,
            defined,
            interactions,
            counts: RoleCounts::default(),
            columns: ColumnMap::empty(),
            tables: Vec::new(),
            table_binwidth: 0.0,
        }
    }

    /// A class that takes no part in the model.
    pub fn disabled(kind: InteractionKind, params: ClassParameters) -> Self {
        Self::new(kind, params, Vec::new(), DefinedSet::empty())
    }

    pub fn kind(&self) -> InteractionKind {
        self.kind
    }

    pub fn params(&self) -> &ClassParameters {
        &self.params
    }

    pub fn hasher(&self) -> &TupleHasher {
        &self.hasher
    }

    pub fn type_names(&self) -> &[String] {
        &self.type_names
    }

    pub fn n_defined(&self) -> usize {
        self.interactions.len()
    }

    pub fn is_enabled(&self) -> bool {
        !self.kind.is_optional() || self.params.subtype != 0
    }

    pub fn counts(&self) -> RoleCounts {
        self.counts
    }

    pub fn interactions(&self) -> &[DefinedInteraction] {
        &self.interactions
    }

    pub fn interaction(&self, index: usize) -> Result<&DefinedInteraction, InteractionError> {
        self.interactions
            .get(index)
            .ok_or(InteractionError::NoSuchInteraction {
                class: self.kind.full_name(),
                index,
            })
    }

    pub fn column_map(&self) -> &ColumnMap {
        &self.columns
    }

    pub(crate) fn set_column_map(&mut self, columns: ColumnMap) {
        self.columns = columns;
    }

    /// Index among defined of a natural-order tuple, if the class defines it.
    pub fn index_of_tuple(&self, natural: &[TypeIndex]) -> Option<usize> {
        self.defined.index_of(self.hasher.encode(natural))
    }

    /// Canonical tuple behind an index among defined.
    pub fn tuple_of(&self, index: usize) -> Option<Vec<TypeIndex>> {
        self.defined.hash_of(index).map(|hash| self.hasher.decode(hash))
    }

    /// Joins the type names of an interaction in natural order.
    pub fn interaction_name(&self, index: usize, delimiter: &str) -> String {
        let Some(canonical) = self.tuple_of(index) else {
            return String::new();
        };
        self.hasher
            .to_natural(&canonical)
            .iter()
            .map(|&t| {
                self.type_names
                    .get((t - 1) as usize)
                    .map(String::as_str)
                    .unwrap_or("?")
            })
            .collect::<Vec<_>>()
            .join(delimiter)
    }

    /// Base name for per-interaction output, e.g. `A_B_C_ang`.
    pub fn basename(&self, index: usize) -> String {
        let name = self.interaction_name(index, "_");
        match self.kind.short_name() {
            "" => name,
            short => format!("{name}_{short}"),
        }
    }

    pub(crate) fn describe(&self, index: usize) -> String {
        format!("{} interaction {}", self.kind, self.interaction_name(index, "-"))
    }

    pub(crate) fn record_range(
        &mut self,
        index: usize,
        lower: f64,
        upper: f64,
        extra: ExtraParams,
    ) {
        let interaction = &mut self.interactions[index];
        interaction.lower_cutoff = lower;
        interaction.upper_cutoff = upper;
        interaction.extra = extra;
    }

    /// Assigns the next index of every role the mode grants.
    ///
    /// Callers must visit interactions in ascending index-among-defined order.
    pub(crate) fn assign_roles(&mut self, index: usize, roles: ModeRoles) {
        if roles.matched {
            self.counts.n_to_force_match += 1;
            self.interactions[index].matched_index = self.counts.n_to_force_match;
            if roles.symmetric {
                self.counts.n_symmetric += 1;
                self.interactions[index].symmetric_index = self.counts.n_symmetric;
            }
            self.adjust_cutoffs_for_basis(index);
        }
        if roles.tabulated {
            self.counts.n_tabulated += 1;
            self.interactions[index].tabulated_index = self.counts.n_tabulated;
            if roles.symtab {
                self.counts.n_tabsym += 1;
                self.interactions[index].symtab_index = self.counts.n_tabsym;
            }
        }
    }

    /// Aligns a matched interaction's range with the fitting and output grids.
    pub fn adjust_cutoffs_for_basis(&mut self, index: usize) {
        if !self.params.basis.is_grid_based() {
            return;
        }
        let ClassParameters {
            cutoff,
            fm_binwidth,
            output_binwidth,
            ..
        } = self.params;
        let kind = self.kind;
        let interaction = &mut self.interactions[index];

        let pinned = kind == InteractionKind::PairNonbonded
            && (interaction.upper_cutoff - cutoff).abs() < VERY_SMALL_F;
        if !pinned {
            interaction.upper_cutoff =
                (interaction.upper_cutoff / output_binwidth + 0.5).floor() * output_binwidth;
        }

        let n_bins = ((interaction.upper_cutoff - interaction.lower_cutoff) / fm_binwidth + 0.5).floor();
        interaction.lower_cutoff = interaction.upper_cutoff - n_bins * fm_binwidth;
        if !kind.allows_negative_lower_cutoff() && interaction.lower_cutoff < 0.0 {
            interaction.lower_cutoff = 0.0;
        }
    }

    /// Three-body interactions are all fitted over the full angular range.
    pub(crate) fn match_all_over_angle_range(&mut self) {
        for (i, interaction) in self.interactions.iter_mut().enumerate() {
            interaction.matched_index = i + 1;
            interaction.lower_cutoff = 0.0;
            interaction.upper_cutoff = 180.0;
        }
        self.counts = RoleCounts {
            n_to_force_match: self.interactions.len(),
            ..RoleCounts::default()
        };
    }

    pub(crate) fn log_role_summary(&self) {
        let counts = self.counts;
        info!(
            class = self.kind.full_name(),
            matched = counts.n_to_force_match,
            tabulated = counts.n_tabulated,
            symmetric = counts.n_symmetric,
            tabsym = counts.n_tabsym,
            "Resolved interaction roles"
        );
    }

    /// Rejects matched pair nonbonded ranges past the global cutoff.
    pub fn check_nonbonded_cutoffs(&self, global_cutoff: f64) -> Result<(), InteractionError> {
        let limit = global_cutoff + self.params.output_binwidth + VERY_SMALL;
        for (i, interaction) in self.interactions.iter().enumerate() {
            if interaction.is_matched() && interaction.upper_cutoff > limit {
                return Err(InteractionError::BeyondNonbondedCutoff {
                    name: self.describe(i),
                    upper: interaction.upper_cutoff,
                    cutoff: global_cutoff,
                });
            }
        }
        Ok(())
    }

    /// Rejects matched angular ranges outside [0, 180] degrees.
    pub fn check_angular_cutoffs(&self) -> Result<(), InteractionError> {
        for (i, interaction) in self.interactions.iter().enumerate() {
            if interaction.is_matched()
                && (interaction.upper_cutoff > 180.0 + VERY_SMALL_F
                    || interaction.lower_cutoff < -VERY_SMALL_F)
            {
                return Err(InteractionError::AngleOutOfRange {
                    name: self.describe(i),
                    lower: interaction.lower_cutoff,
                    upper: interaction.upper_cutoff,
                });
            }
        }
        Ok(())
    }

    /// Classifies matched dihedral ranges as non-periodic, fully periodic or wrapping.
    ///
    /// Distance-based dihedrals (subtype 1) are left alone.
    pub fn classify_periodicity(&mut self) -> Result<(), InteractionError> {
        if self.params.subtype == 1 {
            return Ok(());
        }
        for i in 0..self.interactions.len() {
            if !self.interactions[i].is_matched() {
                continue;
            }
            let name = self.describe(i);
            let interaction = &mut self.interactions[i];

            if interaction.upper_cutoff > 179.0 && interaction.lower_cutoff < -179.0 {
                info!(
                    interaction = %name,
                    lower = interaction.lower_cutoff,
                    upper = interaction.upper_cutoff,
                    "Treating dihedral range as fully periodic (-180 to 180)"
                );
                interaction.periodic_class = PeriodicClass::Full;
                interaction.lower_cutoff = -180.0;
                interaction.upper_cutoff = 180.0;
            } else if interaction.upper_cutoff < interaction.lower_cutoff
                || interaction.upper_cutoff > 180.0 + VERY_SMALL_F
            {
                info!(
                    interaction = %name,
                    lower = interaction.lower_cutoff,
                    upper = interaction.upper_cutoff,
                    "Treating dihedral range as wrapping through the periodic boundary"
                );
                interaction.periodic_class = PeriodicClass::Wrap;
                if interaction.upper_cutoff < -180.0 {
                    interaction.upper_cutoff += FULL_CIRCLE_DEGREES;
                }
            }

            let lower_invalid = interaction.lower_cutoff < -180.0 - VERY_SMALL_F;
            if lower_invalid
                || interaction.lower_cutoff > 540.0
                || interaction.upper_cutoff > 540.0 + VERY_SMALL_F
            {
                if lower_invalid {
                    warn!(interaction = %name, lower = interaction.lower_cutoff, "Adjusting dihedral lower cutoff to -180");
                    interaction.lower_cutoff = -180.0;
                } else if interaction.upper_cutoff > 540.0
                    && interaction.periodic_class == PeriodicClass::Wrap
                {
                    warn!(interaction = %name, upper = interaction.upper_cutoff, "Adjusting unwrapped dihedral upper cutoff to 540");
                    interaction.upper_cutoff = 540.0;
                } else {
                    return Err(InteractionError::InvalidDihedralRange {
                        name,
                        lower: interaction.lower_cutoff,
                        upper: interaction.upper_cutoff,
                    });
                }
            }
        }
        Ok(())
    }

    /// Defined indices of matched interactions in matched-index order.
    pub fn matched_indices(&self) -> Vec<usize> {
        let mut matched: Vec<(usize, usize)> = self
            .interactions
            .iter()
            .enumerate()
            .filter(|(_, it)| it.is_matched())
            .map(|(i, it)| (it.matched_index, i))
            .collect();
        matched.sort_unstable();
        matched.into_iter().map(|(_, i)| i).collect()
    }

    /// Defined indices of tabulated interactions in tabulated-index order.
    pub fn tabulated_indices(&self) -> Vec<usize> {
        let mut tabulated: Vec<(usize, usize)> = self
            .interactions
            .iter()
            .enumerate()
            .filter(|(_, it)| it.is_tabulated())
            .map(|(i, it)| (it.tabulated_index, i))
            .collect();
        tabulated.sort_unstable();
        tabulated.into_iter().map(|(_, i)| i).collect()
    }

    pub fn table_binwidth(&self) -> f64 {
        self.table_binwidth
    }

    pub(crate) fn prepare_tables(&mut self, binwidth: f64) {
        self.table_binwidth = binwidth;
        self.tables = vec![None; self.counts.n_tabulated];
    }

    /// Stores a coefficient table for a tabulated interaction and takes over its cutoffs.
    pub(crate) fn install_table(&mut self, index: usize, table: ExternalSplineTable) {
        let interaction = &mut self.interactions[index];
        interaction.lower_cutoff = table.lower;
        interaction.upper_cutoff = table.upper;
        if let Some(slot) = self.tables.get_mut(interaction.tabulated_index.wrapping_sub(1)) {
            *slot = Some(table);
        }
    }

    /// Table of a tabulated interaction, once loaded.
    pub fn table(&self, index: usize) -> Option<&ExternalSplineTable> {
        let tabulated = self.interactions.get(index)?.tabulated_index;
        self.tables.get(tabulated.checked_sub(1)?)?.as_ref()
    }
}
