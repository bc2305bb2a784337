//! # Basis Module
//!
//! Evaluation of the basis functions that represent an interaction's
//! dependence on its parameter (distance, angle, density, ...).
//!
//! ## Overview
//!
//! Every implementation answers two questions for one defined interaction at
//! one parameter value: which basis functions are non-zero and with what value
//! ([`BasisFunctions::basis_values`]), and what the curve evaluates to for a
//! given coefficient block ([`BasisFunctions::evaluate`]). Rows are local to
//! the interaction's column block; the owner of the column map places them in
//! the global regression matrix.
//!
//! ## Key Components
//!
//! - [`Basis`] - Closed set of basis families, built per interaction class
//! - [`BasisRow`] - Non-zero basis values of one evaluation
//! - [`bspline`] - Clamped and cyclic B-splines, optionally with derivatives
//! - [`linear`] - Degree-one finite elements on a uniform grid
//! - [`analytic`] - Delta, power and inverse-power forms
//! - [`table`] - Externally tabulated coefficient tables

pub mod analytic;
pub mod bspline;
pub mod linear;
pub mod table;

use crate::core::constants::{FULL_CIRCLE_DEGREES, VERY_SMALL_F};
use crate::core::interactions::class::{DefinedInteraction, InteractionClass, PeriodicClass};
use crate::core::interactions::settings::BasisType;
use analytic::{DeltaBasis, NoneBasis, PowerBasis};
use bspline::BSplineBasis;
use linear::LinearSplineBasis;
use table::TableBasis;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BasisError {
    #[error("Parameter {param} lies outside [{lower}, {upper}] for interaction {index}")]
    OutOfRange {
        index: usize,
        param: f64,
        lower: f64,
        upper: f64,
    },
    #[error("Interaction {index} has no basis functions in this set")]
    NotAvailable { index: usize },
    #[error("Interaction {index} has a range narrower than one fitting bin")]
    DegenerateRange { index: usize },
    #[error("The {basis} basis does not provide derivatives")]
    DerivativeUnsupported { basis: &'static str },
    #[error("Coefficient block too short: need column {needed}, have {available}")]
    CoefficientsTooShort { needed: usize, available: usize },
}

/// Non-zero basis function values of one evaluation.
///
/// `first_column` is local to the interaction's column block. Periodic bases
/// wrap around the end of the block.
#[derive(Debug, Clone, PartialEq)]
pub struct BasisRow {
    pub first_column: usize,
    pub block_width: usize,
    pub values: Vec<f64>,
}

impl BasisRow {
    pub fn new(first_column: usize, block_width: usize, values: Vec<f64>) -> Self {
        Self {
            first_column,
            block_width,
            values,
        }
    }

    pub fn empty() -> Self {
        Self::new(0, 0, Vec::new())
    }

    /// Local columns paired with their basis values.
    pub fn columns(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        let width = self.block_width.max(1);
        self.values
            .iter()
            .enumerate()
            .map(move |(j, &v)| ((self.first_column + j) % width, v))
    }

    /// Contracts the row with an interaction's coefficient block.
    pub fn dot(&self, block: &[f64]) -> Result<f64, BasisError> {
        let mut total = 0.0;
        for (column, value) in self.columns() {
            let coefficient = block.get(column).ok_or(BasisError::CoefficientsTooShort {
                needed: column + 1,
                available: block.len(),
            })?;
            total += coefficient * value;
        }
        Ok(total)
    }
}

/// Where an interaction's parameter lives, measured from its lower cutoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub lower: f64,
    pub span: f64,
    pub periodic: PeriodicClass,
}

impl Domain {
    pub fn of(interaction: &DefinedInteraction) -> Self {
        Self {
            lower: interaction.lower_cutoff,
            span: interaction.span(),
            periodic: interaction.periodic_class,
        }
    }

    pub fn upper(&self) -> f64 {
        self.lower + self.span
    }

    /// Distance of `param` from the lower cutoff, reduced modulo the circle for
    /// periodic ranges and clamped to the range within tolerance.
    pub fn offset(&self, index: usize, param: f64) -> Result<f64, BasisError> {
        let raw = match self.periodic {
            PeriodicClass::None => param - self.lower,
            PeriodicClass::Full | PeriodicClass::Wrap => {
                (param - self.lower).rem_euclid(FULL_CIRCLE_DEGREES)
            }
        };
        if raw < -VERY_SMALL_F || raw > self.span + VERY_SMALL_F {
            return Err(BasisError::OutOfRange {
                index,
                param,
                lower: self.lower,
                upper: self.upper(),
            });
        }
        Ok(raw.clamp(0.0, self.span))
    }
}

/// Capability interface shared by every basis family.
pub trait BasisFunctions {
    fn name(&self) -> &'static str;

    /// Non-zero basis values of interaction `index` at `param`.
    fn basis_values(&self, index: usize, param: f64) -> Result<BasisRow, BasisError>;

    /// Non-zero basis derivative values of interaction `index` at `param`.
    fn derivative_values(&self, index: usize, param: f64) -> Result<BasisRow, BasisError> {
        let _ = (index, param);
        Err(BasisError::DerivativeUnsupported { basis: self.name() })
    }

    /// Curve value at `param` for the coefficients starting at `column_offset`.
    fn evaluate(
        &self,
        index: usize,
        column_offset: usize,
        coefficients: &[f64],
        param: f64,
    ) -> Result<f64, BasisError> {
        let block = coefficients.get(column_offset..).unwrap_or(&[]);
        self.basis_values(index, param)?.dot(block)
    }

    fn evaluate_derivative(
        &self,
        index: usize,
        column_offset: usize,
        coefficients: &[f64],
        param: f64,
    ) -> Result<f64, BasisError> {
        let block = coefficients.get(column_offset..).unwrap_or(&[]);
        self.derivative_values(index, param)?.dot(block)
    }
}

/// Basis functions of one interaction class, dispatched by family.
#[derive(Debug, Clone)]
pub enum Basis {
    BSpline(BSplineBasis),
    LinearSpline(LinearSplineBasis),
    Delta(DeltaBasis),
    Power(PowerBasis),
    Table(TableBasis),
    None(NoneBasis),
}

impl Basis {
    /// The fitting basis of a class, covering its matched interactions.
    pub fn for_fitting(class: &InteractionClass) -> Self {
        let params = class.params();
        let domains: Vec<Option<Domain>> = class
            .interactions()
            .iter()
            .map(|it| it.is_matched().then(|| Domain::of(it)))
            .collect();

        match params.basis {
            BasisType::BSpline | BasisType::BSplineAndDeriv => Basis::BSpline(BSplineBasis::new(
                &domains,
                params.fm_binwidth,
                params.bspline_order,
                params.basis == BasisType::BSplineAndDeriv,
            )),
            BasisType::LinearSpline => {
                Basis::LinearSpline(LinearSplineBasis::new(&domains, params.fm_binwidth))
            }
            BasisType::Delta => Basis::Delta(DeltaBasis::new(domains)),
            BasisType::Power => Basis::Power(PowerBasis::new(domains, params.bspline_order, false)),
            BasisType::InversePower => {
                Basis::Power(PowerBasis::new(domains, params.bspline_order, true))
            }
            BasisType::None => Basis::None(NoneBasis),
        }
    }

    /// The tabulated basis of a class, covering interactions with a loaded table.
    pub fn for_tables(class: &InteractionClass) -> Self {
        let tables = (0..class.n_defined())
            .map(|i| class.table(i).cloned())
            .collect();
        Basis::Table(TableBasis::new(tables))
    }

    fn inner(&self) -> &dyn BasisFunctions {
        match self {
            Basis::BSpline(b) => b,
            Basis::LinearSpline(b) => b,
            Basis::Delta(b) => b,
            Basis::Power(b) => b,
            Basis::Table(b) => b,
            Basis::None(b) => b,
        }
    }
}

impl BasisFunctions for Basis {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn basis_values(&self, index: usize, param: f64) -> Result<BasisRow, BasisError> {
        self.inner().basis_values(index, param)
    }

    fn derivative_values(&self, index: usize, param: f64) -> Result<BasisRow, BasisError> {
        self.inner().derivative_values(index, param)
    }

    fn evaluate(
        &self,
        index: usize,
        column_offset: usize,
        coefficients: &[f64],
        param: f64,
    ) -> Result<f64, BasisError> {
        self.inner()
            .evaluate(index, column_offset, coefficients, param)
    }

    fn evaluate_derivative(
        &self,
        index: usize,
        column_offset: usize,
        coefficients: &[f64],
        param: f64,
    ) -> Result<f64, BasisError> {
        self.inner()
            .evaluate_derivative(index, column_offset, coefficients, param)
    }
}

pub(crate) fn domain_at(domains: &[Option<Domain>], index: usize) -> Result<&Domain, BasisError> {
    domains
        .get(index)
        .and_then(Option::as_ref)
        .ok_or(BasisError::NotAvailable { index })
}
