use super::kind::InteractionKind;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;
use tracing::warn;

/// Functional family used to represent an interaction's dependence on its parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum BasisType {
    #[serde(rename = "bspline")]
    BSpline,
    #[serde(rename = "bspline-and-deriv")]
    BSplineAndDeriv,
    #[serde(rename = "linear-spline")]
    LinearSpline,
    #[serde(rename = "delta")]
    Delta,
    #[serde(rename = "power")]
    Power,
    #[serde(rename = "inverse-power")]
    InversePower,
    #[serde(rename = "none")]
    None,
}

impl BasisType {
    pub fn is_bspline_family(self) -> bool {
        matches!(self, BasisType::BSpline | BasisType::BSplineAndDeriv)
    }

    /// Grid-based bases discretize the range into bins and need aligned cutoffs.
    pub fn is_grid_based(self) -> bool {
        self.is_bspline_family() || self == BasisType::LinearSpline
    }

    pub fn supports_derivative(self) -> bool {
        matches!(
            self,
            BasisType::BSplineAndDeriv | BasisType::Power | BasisType::InversePower
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            BasisType::BSpline => "bspline",
            BasisType::BSplineAndDeriv => "bspline-and-deriv",
            BasisType::LinearSpline => "linear-spline",
            BasisType::Delta => "delta",
            BasisType::Power => "power",
            BasisType::InversePower => "inverse-power",
            BasisType::None => "none",
        }
    }
}

impl fmt::Display for BasisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("{class} fm-binwidth {value} must lie in [0, {cutoff}]")]
    FitBinwidthOutOfRange {
        class: &'static str,
        value: f64,
        cutoff: f64,
    },
    #[error("{class} {field} must be positive for the {basis} basis (got {value})")]
    NonPositiveBinwidth {
        class: &'static str,
        field: &'static str,
        basis: BasisType,
        value: f64,
    },
    #[error("{class} bspline-order {order} must be at least 3")]
    BsplineOrderTooSmall { class: &'static str, order: i32 },
}

/// Per-class settings as written in the model settings file.
///
/// Every field is optional; [`ClassSettings::resolve`] fills the gaps with
/// kind-specific defaults and validates the result.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ClassSettings {
    pub subtype: Option<i32>,
    pub basis: Option<BasisType>,
    pub cutoff: Option<f64>,
    pub fm_binwidth: Option<f64>,
    pub output_binwidth: Option<f64>,
    pub bspline_order: Option<i32>,
    pub output_spline_coeffs: Option<i32>,
    pub output_parameter_distribution: Option<i32>,
}

/// Validated, fully defaulted settings of one interaction class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassParameters {
    pub subtype: i32,
    pub basis: BasisType,
    pub cutoff: f64,
    pub fm_binwidth: f64,
    pub output_binwidth: f64,
    pub bspline_order: usize,
    pub output_spline_coeffs: bool,
    pub output_parameter_distribution: u8,
}

fn default_binwidths(kind: InteractionKind) -> (f64, f64) {
    match kind {
        InteractionKind::Angular
        | InteractionKind::Dihedral
        | InteractionKind::ThreeBodyNonbonded => (1.0, 0.1),
        InteractionKind::Density | InteractionKind::Helical => (0.05, 0.01),
        _ => (0.1, 0.01),
    }
}

fn default_basis(kind: InteractionKind) -> BasisType {
    match kind {
        InteractionKind::OneBody => BasisType::Delta,
        _ => BasisType::BSpline,
    }
}

impl ClassSettings {
    pub fn resolve(
        &self,
        kind: InteractionKind,
        global_cutoff: f64,
    ) -> Result<ClassParameters, SettingsError> {
        let class = kind.full_name();
        let (default_fm, default_output) = default_binwidths(kind);

        let mut subtype = self.subtype.unwrap_or(0);
        if !(0..=kind.max_subtype()).contains(&subtype) {
            warn!(
                class,
                subtype,
                "Class subtype is out of range; using subtype 0"
            );
            subtype = 0;
        }

        let cutoff = match self.cutoff {
            Some(c) if c <= 0.0 => {
                warn!(
                    class,
                    cutoff = c,
                    global_cutoff,
                    "Class cutoff is not positive; using the nonbonded cutoff"
                );
                global_cutoff
            }
            Some(c) => c,
            None => global_cutoff,
        };

        let output_spline_coeffs = match self.output_spline_coeffs.unwrap_or(0) {
            0 => false,
            1 => true,
            other => {
                warn!(class, value = other, "output-spline-coeffs must be 0 or 1; using 0");
                false
            }
        };

        let output_parameter_distribution = match self.output_parameter_distribution.unwrap_or(0) {
            v @ 0..=2 => v as u8,
            other => {
                warn!(
                    class,
                    value = other,
                    "output-parameter-distribution must be 0, 1 or 2; using 0"
                );
                0
            }
        };

        let basis = self.basis.unwrap_or_else(|| default_basis(kind));
        let fm_binwidth = self.fm_binwidth.unwrap_or(default_fm);
        let output_binwidth = self.output_binwidth.unwrap_or(default_output);

        let upper_limit_applies = kind != InteractionKind::ThreeBodyNonbonded;
        if fm_binwidth < 0.0 || (upper_limit_applies && fm_binwidth > cutoff) {
            return Err(SettingsError::FitBinwidthOutOfRange {
                class,
                value: fm_binwidth,
                cutoff,
            });
        }
        if basis.is_grid_based() {
            for (field, value) in [
                ("fm-binwidth", fm_binwidth),
                ("output-binwidth", output_binwidth),
            ] {
                if value <= 0.0 {
                    return Err(SettingsError::NonPositiveBinwidth {
                        class,
                        field,
                        basis,
                        value,
                    });
                }
            }
        }

        let order = self.bspline_order.unwrap_or(4);
        if order < 3 {
            return Err(SettingsError::BsplineOrderTooSmall { class, order });
        }

        Ok(ClassParameters {
            subtype,
            basis,
            cutoff,
            fm_binwidth,
            output_binwidth,
            bspline_order: order as usize,
            output_spline_coeffs,
            output_parameter_distribution,
        })
    }
}
