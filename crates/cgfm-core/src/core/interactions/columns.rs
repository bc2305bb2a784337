use super::class::{DefinedInteraction, InteractionClass};
use super::settings::{BasisType, ClassParameters};
use crate::core::constants::MAX_COLUMNS_PER_INTERACTION;
use std::ops::Range;
use tracing::warn;

/// Partition of the regression matrix columns among a class's matched interactions.
///
/// The interaction with matched index `m` owns `offsets[m - 1]..offsets[m]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    offsets: Vec<usize>,
}

impl ColumnMap {
    pub fn empty() -> Self {
        Self { offsets: vec![0] }
    }

    /// Prefix sums of the given widths, starting at column 0.
    pub fn from_widths(widths: impl IntoIterator<Item = usize>) -> Self {
        let mut offsets = vec![0];
        let mut total = 0;
        for width in widths {
            total += width;
            offsets.push(total);
        }
        Self { offsets }
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Number of matched interactions covered.
    pub fn len(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Columns of the interaction with 1-based `matched_index`.
    pub fn block(&self, matched_index: usize) -> Option<Range<usize>> {
        if matched_index == 0 || matched_index >= self.offsets.len() {
            return None;
        }
        Some(self.offsets[matched_index - 1]..self.offsets[matched_index])
    }

    pub fn total_columns(&self) -> usize {
        self.offsets.last().copied().unwrap_or(0)
    }
}

/// Fitting grid points over a span: `floor(span / fm_binwidth + 0.5) + 1`.
pub fn grid_points(span: f64, fm_binwidth: f64) -> i64 {
    (span / fm_binwidth + 0.5).floor() as i64 + 1
}

/// Number of regression columns one matched interaction occupies.
pub fn column_width(params: &ClassParameters, interaction: &DefinedInteraction) -> usize {
    let width = match params.basis {
        BasisType::Delta => 1,
        BasisType::None => 0,
        BasisType::Power | BasisType::InversePower => params.bspline_order as i64,
        BasisType::LinearSpline => grid_points(interaction.span(), params.fm_binwidth),
        BasisType::BSpline | BasisType::BSplineAndDeriv => {
            let padding = if interaction.is_periodic() {
                0
            } else {
                params.bspline_order as i64
            };
            grid_points(interaction.span(), params.fm_binwidth) - 2 + padding
        }
    };
    width.max(0) as usize
}

/// Column map of an ordinary class, built in matched-index order.
pub fn build_column_map(class: &InteractionClass) -> ColumnMap {
    let params = class.params();
    let widths: Vec<usize> = class
        .matched_indices()
        .into_iter()
        .map(|index| {
            let width = column_width(params, &class.interactions()[index]);
            if width > MAX_COLUMNS_PER_INTERACTION {
                warn!(
                    interaction = %class.describe(index),
                    columns = width,
                    "An individual interaction has more than {} basis columns; check the angle and dihedral styles",
                    MAX_COLUMNS_PER_INTERACTION
                );
            }
            width
        })
        .collect();
    ColumnMap::from_widths(widths)
}

/// Column map of the three-body class.
///
/// Spline bases give interaction `i` (1-based) `i` times the per-interaction
/// angular width; subtype 3 gives every interaction a single column.
pub fn build_three_body_column_map(class: &InteractionClass) -> ColumnMap {
    let params = class.params();
    let n = class.n_defined();
    if params.subtype == 3 {
        return ColumnMap::from_widths(std::iter::repeat_n(1, n));
    }

    let angular_bins = (180.0 / params.fm_binwidth + 0.5).floor() as usize;
    let per_interaction = match params.basis {
        BasisType::BSpline | BasisType::BSplineAndDeriv => {
            (params.bspline_order + angular_bins).saturating_sub(2)
        }
        BasisType::LinearSpline => angular_bins,
        _ => {
            return ColumnMap::from_widths(
                class
                    .interactions()
                    .iter()
                    .map(|interaction| column_width(params, interaction)),
            );
        }
    };
    ColumnMap::from_widths((1..=n).map(|i| i * per_interaction))
}
