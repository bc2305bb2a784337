use crate::core::basis::{BasisError, BasisFunctions};
use crate::core::constants::VERY_SMALL_F;
use crate::core::interactions::class::DefinedInteraction;
use tracing::warn;

/// Sampled curve of one interaction on an output grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationGrid {
    pub axis: Vec<f64>,
    pub force: Vec<f64>,
    pub potential: Vec<f64>,
    /// Present only when the basis provides derivatives.
    pub derivative: Option<Vec<f64>>,
}

/// Output axis over an interaction's range.
///
/// The axis ends at the upper cutoff and steps back by whole `binwidth`s, so
/// the first point lies at or just above the lower cutoff. A range too narrow
/// for any point yields its midpoint alone.
pub fn output_axis(interaction: &DefinedInteraction, binwidth: f64) -> Vec<f64> {
    let span = interaction.span();
    let max = interaction.lower_cutoff + span;
    let steps = (span / binwidth).trunc();
    let min = max - steps * binwidth;

    let capacity = if steps.is_finite() && steps >= 0.0 {
        steps as usize + 2
    } else {
        1
    };
    let mut axis = Vec::with_capacity(capacity);
    if binwidth > 0.0 {
        for i in 0..capacity {
            let x = min + i as f64 * binwidth;
            if x > max + VERY_SMALL_F {
                break;
            }
            axis.push(x);
        }
    }

    if axis.is_empty() {
        warn!(
            lower = interaction.lower_cutoff,
            upper = interaction.upper_cutoff,
            binwidth,
            "Range is too small for the output grid; sampling its midpoint only, no curve will be written"
        );
        axis.push(interaction.lower_cutoff + 0.5 * span);
    }
    axis
}

impl EvaluationGrid {
    /// Evaluates a curve, and its derivative when available, along the output axis.
    pub fn sample(
        basis: &dyn BasisFunctions,
        index: usize,
        column_offset: usize,
        coefficients: &[f64],
        interaction: &DefinedInteraction,
        binwidth: f64,
    ) -> Result<Self, BasisError> {
        let axis = output_axis(interaction, binwidth);
        let force = axis
            .iter()
            .map(|&x| basis.evaluate(index, column_offset, coefficients, x))
            .collect::<Result<Vec<_>, _>>()?;

        let derivative = match axis
            .iter()
            .map(|&x| basis.evaluate_derivative(index, column_offset, coefficients, x))
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(values) => Some(values),
            Err(BasisError::DerivativeUnsupported { .. }) => None,
            Err(e) => return Err(e),
        };

        let potential = integrate_force(&axis, &force);
        Ok(Self {
            axis,
            force,
            potential,
            derivative,
        })
    }

    /// A single sample at parameter 0, for interactions with one scalar value.
    pub fn single_value(
        basis: &dyn BasisFunctions,
        index: usize,
        column_offset: usize,
        coefficients: &[f64],
    ) -> Result<Self, BasisError> {
        let value = basis.evaluate(index, column_offset, coefficients, 0.0)?;
        Ok(Self {
            axis: vec![0.0],
            force: vec![value],
            potential: vec![0.0],
            derivative: None,
        })
    }

    /// Shifts the potential so that its minimum is zero.
    pub fn standardized(mut self) -> Self {
        standardize_potential(&mut self.potential);
        self
    }

    pub fn len(&self) -> usize {
        self.axis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axis.is_empty()
    }
}

/// Integrates a force backwards with the trapezoid rule; the last potential is 0.
pub fn integrate_force(axis: &[f64], force: &[f64]) -> Vec<f64> {
    let n = axis.len().min(force.len());
    let mut potential = vec![0.0; n];
    for i in (0..n.saturating_sub(1)).rev() {
        potential[i] =
            potential[i + 1] + 0.5 * (force[i] + force[i + 1]) * (axis[i + 1] - axis[i]);
    }
    potential
}

/// Subtracts the minimum from every value.
pub fn standardize_potential(values: &mut [f64]) {
    // Twice, so the minimum ends at zero despite rounding in the first pass.
    for _ in 0..2 {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        if min.is_finite() {
            values.iter_mut().for_each(|v| *v -= min);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::basis::analytic::{DeltaBasis, PowerBasis};
    use crate::core::basis::Domain;
    use crate::core::interactions::class::PeriodicClass;

    fn interaction(lower: f64, upper: f64) -> DefinedInteraction {
        DefinedInteraction {
            lower_cutoff: lower,
            upper_cutoff: upper,
            matched_index: 1,
            ..Default::default()
        }
    }

    fn close(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn output_axis_is_anchored_at_upper_cutoff() {
        let axis = output_axis(&interaction(0.05, 0.5), 0.1);
        assert!(close(&axis, &[0.1, 0.2, 0.3, 0.4, 0.5]));
    }

    #[test]
    fn output_axis_includes_both_ends_when_aligned() {
        let axis = output_axis(&interaction(1.0, 2.0), 0.25);
        assert!(close(&axis, &[1.0, 1.25, 1.5, 1.75, 2.0]));
    }

    #[test]
    fn output_axis_falls_back_to_midpoint() {
        let axis = output_axis(&interaction(2.0, 1.0), 0.1);
        assert!(close(&axis, &[1.5]));
    }

    #[test]
    fn output_axis_follows_wrapping_dihedrals_past_180() {
        let wrap = DefinedInteraction {
            periodic_class: PeriodicClass::Wrap,
            ..interaction(170.0, -170.0)
        };
        let axis = output_axis(&wrap, 10.0);
        assert!(close(&axis, &[170.0, 180.0, 190.0]));
    }

    #[test]
    fn integrate_force_pins_last_value_to_zero() {
        let potential = integrate_force(&[0.0, 1.0, 2.0], &[2.0, 2.0, 2.0]);
        assert!(close(&potential, &[4.0, 2.0, 0.0]));
        assert!(integrate_force(&[], &[]).is_empty());
    }

    #[test]
    fn standardize_potential_moves_minimum_to_zero() {
        let mut values = vec![3.0, -1.5, 2.0];
        standardize_potential(&mut values);
        assert!(close(&values, &[4.5, 0.0, 3.5]));
    }

    #[test]
    fn sample_evaluates_force_and_potential() {
        let it = interaction(0.0, 1.0);
        let basis = DeltaBasis::new(vec![Some(Domain::of(&it))]);
        let grid = EvaluationGrid::sample(&basis, 0, 2, &[9.0, 9.0, 3.0], &it, 0.5).unwrap();
        assert!(close(&grid.axis, &[0.0, 0.5, 1.0]));
        assert!(close(&grid.force, &[3.0, 3.0, 3.0]));
        assert!(close(&grid.potential, &[3.0, 1.5, 0.0]));
        assert_eq!(grid.derivative, None);
        assert!(close(&grid.standardized().potential, &[3.0, 1.5, 0.0]));
    }

    #[test]
    fn sample_includes_derivative_when_supported() {
        let it = interaction(1.0, 2.0);
        let basis = PowerBasis::new(vec![Some(Domain::of(&it))], 2, false);
        let grid = EvaluationGrid::sample(&basis, 0, 0, &[1.0, 2.0], &it, 1.0).unwrap();
        assert!(close(&grid.force, &[3.0, 5.0]));
        assert!(close(grid.derivative.as_deref().unwrap(), &[2.0, 2.0]));
    }

    #[test]
    fn single_value_samples_parameter_zero() {
        let it = interaction(0.0, 1.0);
        let basis = DeltaBasis::new(vec![Some(Domain::of(&it))]);
        let grid = EvaluationGrid::single_value(&basis, 0, 0, &[-0.7]).unwrap();
        assert_eq!(grid.axis, vec![0.0]);
        assert_eq!(grid.force, vec![-0.7]);
        assert_eq!(grid.potential, vec![0.0]);
    }
}
