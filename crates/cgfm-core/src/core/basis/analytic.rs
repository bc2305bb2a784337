use super::{BasisError, BasisFunctions, BasisRow, Domain, domain_at};

/// A single basis function equal to one over the whole range.
#[derive(Debug, Clone)]
pub struct DeltaBasis {
    domains: Vec<Option<Domain>>,
}

impl DeltaBasis {
    pub fn new(domains: Vec<Option<Domain>>) -> Self {
        Self { domains }
    }
}

impl BasisFunctions for DeltaBasis {
    fn name(&self) -> &'static str {
        "delta"
    }

    fn basis_values(&self, index: usize, param: f64) -> Result<BasisRow, BasisError> {
        domain_at(&self.domains, index)?.offset(index, param)?;
        Ok(BasisRow::new(0, 1, vec![1.0]))
    }
}

/// Power-law terms `x^j` (or `x^-j` when inverted) for `j = 0..order`.
#[derive(Debug, Clone)]
pub struct PowerBasis {
    domains: Vec<Option<Domain>>,
    order: usize,
    inverse: bool,
}

impl PowerBasis {
    pub fn new(domains: Vec<Option<Domain>>, order: usize, inverse: bool) -> Self {
        Self {
            domains,
            order,
            inverse,
        }
    }

    fn exponent(&self, j: usize) -> i32 {
        if self.inverse { -(j as i32) } else { j as i32 }
    }
}

impl BasisFunctions for PowerBasis {
    fn name(&self) -> &'static str {
        if self.inverse { "inverse-power" } else { "power" }
    }

    fn basis_values(&self, index: usize, param: f64) -> Result<BasisRow, BasisError> {
        domain_at(&self.domains, index)?.offset(index, param)?;
        let values = (0..self.order)
            .map(|j| param.powi(self.exponent(j)))
            .collect();
        Ok(BasisRow::new(0, self.order, values))
    }

    fn derivative_values(&self, index: usize, param: f64) -> Result<BasisRow, BasisError> {
        domain_at(&self.domains, index)?.offset(index, param)?;
        let values = (0..self.order)
            .map(|j| {
                let n = self.exponent(j);
                if n == 0 {
                    0.0
                } else {
                    n as f64 * param.powi(n - 1)
                }
            })
            .collect();
        Ok(BasisRow::new(0, self.order, values))
    }
}

/// Stand-in for classes excluded from the model; every curve is zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneBasis;

impl BasisFunctions for NoneBasis {
    fn name(&self) -> &'static str {
        "none"
    }

    fn basis_values(&self, _index: usize, _param: f64) -> Result<BasisRow, BasisError> {
        Ok(BasisRow::empty())
    }

    fn evaluate(
        &self,
        _index: usize,
        _column_offset: usize,
        _coefficients: &[f64],
        _param: f64,
    ) -> Result<f64, BasisError> {
        Ok(0.0)
    }
}
