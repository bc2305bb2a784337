use super::{BasisError, BasisFunctions, BasisRow, Domain, domain_at};
use crate::core::constants::VERY_SMALL;

/// Degree-one finite elements ("hat" functions) on a uniform grid.
///
/// An interaction with `n` bins owns `n + 1` columns, one per grid node.
#[derive(Debug, Clone)]
pub struct LinearSplineBasis {
    fm_binwidth: f64,
    domains: Vec<Option<Domain>>,
}

impl LinearSplineBasis {
    pub fn new(domains: &[Option<Domain>], fm_binwidth: f64) -> Self {
        Self {
            fm_binwidth,
            domains: domains.to_vec(),
        }
    }

    fn bins(&self, index: usize, domain: &Domain) -> Result<usize, BasisError> {
        let n_bins = (domain.span / self.fm_binwidth + 0.5).floor() as usize;
        if n_bins == 0 {
            return Err(BasisError::DegenerateRange { index });
        }
        Ok(n_bins)
    }
}

impl BasisFunctions for LinearSplineBasis {
    fn name(&self) -> &'static str {
        "linear-spline"
    }

    fn basis_values(&self, index: usize, param: f64) -> Result<BasisRow, BasisError> {
        let domain = domain_at(&self.domains, index)?;
        let n_bins = self.bins(index, domain)?;
        let offset = domain.offset(index, param)?;

        let u = offset / (domain.span / n_bins as f64);
        let node = (u.floor() as usize).min(n_bins - 1);
        let fraction = u - node as f64;
        let values = if fraction < VERY_SMALL {
            vec![1.0]
        } else {
            vec![1.0 - fraction, fraction]
        };
        Ok(BasisRow::new(node, n_bins + 1, values))
    }
}
