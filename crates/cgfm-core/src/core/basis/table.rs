use super::{BasisError, BasisFunctions, BasisRow};
use crate::core::constants::{VERY_SMALL, VERY_SMALL_F};

/// Control points of an externally supplied interaction, on the table's own grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalSplineTable {
    pub lower: f64,
    pub upper: f64,
    pub binwidth: f64,
    pub coefficients: Vec<f64>,
}

impl ExternalSplineTable {
    /// Number of control points a `[lower, upper]` block holds at `binwidth`.
    pub fn expected_points(lower: f64, upper: f64, binwidth: f64) -> usize {
        let points = ((upper - lower) / binwidth + 0.5).floor() + 1.0;
        if points.is_finite() && points > 0.0 {
            points as usize
        } else {
            0
        }
    }

    fn row(&self, index: usize, param: f64) -> Result<BasisRow, BasisError> {
        let n = self.coefficients.len();
        if n == 0 {
            return Err(BasisError::NotAvailable { index });
        }
        if param < self.lower - VERY_SMALL_F || param > self.upper + VERY_SMALL_F {
            return Err(BasisError::OutOfRange {
                index,
                param,
                lower: self.lower,
                upper: self.upper,
            });
        }
        if n == 1 {
            return Ok(BasisRow::new(0, 1, vec![1.0]));
        }

        let u = (param.clamp(self.lower, self.upper) - self.lower) / self.binwidth;
        let node = (u.floor() as usize).min(n - 2);
        let fraction = (u - node as f64).min(1.0);
        let values = if fraction < VERY_SMALL {
            vec![1.0]
        } else {
            vec![1.0 - fraction, fraction]
        };
        Ok(BasisRow::new(node, n, values))
    }
}

/// Evaluates tabulated interactions from their stored control points.
///
/// The coefficient arguments of [`BasisFunctions::evaluate`] are ignored.
#[derive(Debug, Clone)]
pub struct TableBasis {
    tables: Vec<Option<ExternalSplineTable>>,
}

impl TableBasis {
    pub fn new(tables: Vec<Option<ExternalSplineTable>>) -> Self {
        Self { tables }
    }

    fn table(&self, index: usize) -> Result<&ExternalSplineTable, BasisError> {
        self.tables
            .get(index)
            .and_then(Option::as_ref)
            .ok_or(BasisError::NotAvailable { index })
    }
}

impl BasisFunctions for TableBasis {
    fn name(&self) -> &'static str {
        "table"
    }

    fn basis_values(&self, index: usize, param: f64) -> Result<BasisRow, BasisError> {
        self.table(index)?.row(index, param)
    }

    fn evaluate(
        &self,
        index: usize,
        _column_offset: usize,
        _coefficients: &[f64],
        param: f64,
    ) -> Result<f64, BasisError> {
        let table = self.table(index)?;
        table.row(index, param)?.dot(&table.coefficients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ExternalSplineTable {
        ExternalSplineTable {
            lower: 0.0,
            upper: 1.0,
            binwidth: 0.5,
            coefficients: vec![2.0, 1.0, 0.0],
        }
    }

    #[test]
    fn expected_points_rounds_bin_count() {
        assert_eq!(ExternalSplineTable::expected_points(0.0, 1.0, 0.5), 3);
        assert_eq!(ExternalSplineTable::expected_points(0.0, 1.01, 0.1), 11);
        assert_eq!(ExternalSplineTable::expected_points(1.0, 0.0, 0.1), 0);
    }

    #[test]
    fn evaluate_interpolates_stored_coefficients() {
        let basis = TableBasis::new(vec![None, Some(table())]);
        let value = basis.evaluate(1, 0, &[], 0.75).unwrap();
        assert!((value - 0.5).abs() < 1e-12);
        assert!((basis.evaluate(1, 0, &[], 1.0).unwrap()).abs() < 1e-12);
        assert!((basis.evaluate(1, 0, &[], 0.0).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn evaluate_fails_outside_table_or_without_table() {
        let basis = TableBasis::new(vec![None, Some(table())]);
        assert!(matches!(
            basis.evaluate(1, 0, &[], 1.5),
            Err(BasisError::OutOfRange { .. })
        ));
        assert_eq!(
            basis.evaluate(0, 0, &[], 0.5),
            Err(BasisError::NotAvailable { index: 0 })
        );
    }
}
