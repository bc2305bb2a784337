use super::{BasisError, BasisFunctions, BasisRow, Domain};
use crate::core::interactions::class::PeriodicClass;

#[derive(Debug, Clone, PartialEq)]
enum Knots {
    /// Clamped knot vector in offset coordinates; `order` repeated knots at both ends.
    Clamped(Vec<f64>),
    /// Uniform cyclic spline with `count` basis functions of spacing `spacing`.
    Cyclic { count: usize, spacing: f64 },
}

#[derive(Debug, Clone, PartialEq)]
struct Spline {
    domain: Domain,
    knots: Knots,
}

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Unused,
    Degenerate,
    Ready(Spline),
}

/// B-splines of a fixed order on each interaction's own fitting grid.
#[derive(Debug, Clone)]
pub struct BSplineBasis {
    order: usize,
    with_derivative: bool,
    splines: Vec<Slot>,
}

impl BSplineBasis {
    pub fn new(
        domains: &[Option<Domain>],
        fm_binwidth: f64,
        order: usize,
        with_derivative: bool,
    ) -> Self {
        let splines = domains
            .iter()
            .map(|domain| match domain {
                None => Slot::Unused,
                Some(domain) => match Spline::build(*domain, fm_binwidth, order) {
                    Some(spline) => Slot::Ready(spline),
                    None => Slot::Degenerate,
                },
            })
            .collect();
        Self {
            order,
            with_derivative,
            splines,
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    fn spline(&self, index: usize) -> Result<&Spline, BasisError> {
        match self.splines.get(index) {
            Some(Slot::Ready(spline)) => Ok(spline),
            Some(Slot::Degenerate) => Err(BasisError::DegenerateRange { index }),
            _ => Err(BasisError::NotAvailable { index }),
        }
    }

    /// Number of basis functions of interaction `index`.
    pub fn n_functions(&self, index: usize) -> Result<usize, BasisError> {
        let spline = self.spline(index)?;
        Ok(match &spline.knots {
            Knots::Clamped(knots) => knots.len() - self.order,
            Knots::Cyclic { count, .. } => *count,
        })
    }

    fn row(&self, index: usize, param: f64, derivative: bool) -> Result<BasisRow, BasisError> {
        let spline = self.spline(index)?;
        let offset = spline.domain.offset(index, param)?;
        let degree = self.order - 1;

        match &spline.knots {
            Knots::Clamped(knots) => {
                let n_functions = knots.len() - self.order;
                let span = find_span(knots, degree, n_functions, offset);
                let values = if derivative {
                    derivative_funs(knots, degree, span, offset)
                } else {
                    basis_funs(knots, degree, span, offset)
                };
                Ok(BasisRow::new(span - degree, n_functions, values))
            }
            Knots::Cyclic { count, spacing } => {
                let u = offset / spacing;
                let cell = (u.floor() as usize).min(count.saturating_sub(1));
                let knots = cyclic_knots(degree);
                let mut values = if derivative {
                    derivative_funs(&knots, degree, degree, u - cell as f64)
                } else {
                    basis_funs(&knots, degree, degree, u - cell as f64)
                };
                if derivative {
                    values.iter_mut().for_each(|v| *v /= spacing);
                }
                // Function `cell + j - degree` is non-zero here; shift into [0, count).
                let first = (cell + count * degree - degree) % count;
                Ok(BasisRow::new(first, *count, values))
            }
        }
    }
}

impl Spline {
    fn build(domain: Domain, fm_binwidth: f64, order: usize) -> Option<Self> {
        let n_bins = (domain.span / fm_binwidth + 0.5).floor() as usize;
        if n_bins == 0 {
            return None;
        }
        let knots = if domain.periodic != PeriodicClass::None {
            let count = n_bins.checked_sub(1).filter(|&c| c > 0)?;
            Knots::Cyclic {
                count,
                spacing: domain.span / count as f64,
            }
        } else {
            let step = domain.span / n_bins as f64;
            let mut knots = vec![0.0; order];
            knots.extend((1..n_bins).map(|i| i as f64 * step));
            knots.extend(std::iter::repeat_n(domain.span, order));
            Knots::Clamped(knots)
        };
        Some(Self { domain, knots })
    }
}

impl BasisFunctions for BSplineBasis {
    fn name(&self) -> &'static str {
        if self.with_derivative {
            "bspline-and-deriv"
        } else {
            "bspline"
        }
    }

    fn basis_values(&self, index: usize, param: f64) -> Result<BasisRow, BasisError> {
        self.row(index, param, false)
    }

    fn derivative_values(&self, index: usize, param: f64) -> Result<BasisRow, BasisError> {
        if !self.with_derivative {
            return Err(BasisError::DerivativeUnsupported { basis: self.name() });
        }
        self.row(index, param, true)
    }
}

/// Knot span `i` with `knots[i] <= x < knots[i + 1]`, restricted to the valid spans.
fn find_span(knots: &[f64], degree: usize, n_functions: usize, x: f64) -> usize {
    if x >= knots[n_functions] {
        return n_functions - 1;
    }
    let span = knots.partition_point(|&t| t <= x).saturating_sub(1);
    span.clamp(degree, n_functions - 1)
}

/// Values of the `degree + 1` basis functions `span - degree ..= span` at `x`.
fn basis_funs(knots: &[f64], degree: usize, span: usize, x: f64) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    n[0] = 1.0;
    for j in 1..=degree {
        left[j] = x - knots[span + 1 - j];
        right[j] = knots[span + j] - x;
        let mut saved = 0.0;
        for r in 0..j {
            let denominator = right[r + 1] + left[j - r];
            let temp = if denominator.abs() > 0.0 {
                n[r] / denominator
            } else {
                0.0
            };
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }
    n
}

/// First derivatives of the basis functions `span - degree ..= span` at `x`.
fn derivative_funs(knots: &[f64], degree: usize, span: usize, x: f64) -> Vec<f64> {
    if degree == 0 {
        return vec![0.0];
    }
    let lower = basis_funs(knots, degree - 1, span, x);
    let p = degree as f64;
    (0..=degree)
        .map(|r| {
            let i = span - degree + r;
            let mut value = 0.0;
            if r >= 1 {
                let width = knots[i + degree] - knots[i];
                if width > 0.0 {
                    value += p * lower[r - 1] / width;
                }
            }
            if r < degree {
                let width = knots[i + degree + 1] - knots[i + 1];
                if width > 0.0 {
                    value -= p * lower[r] / width;
                }
            }
            value
        })
        .collect()
}

/// Uniform integer knots around one cell of a cyclic spline, shifted so the
/// cell is `[knots[degree], knots[degree + 1]] = [0, 1]`.
fn cyclic_knots(degree: usize) -> Vec<f64> {
    (0..2 * degree + 2)
        .map(|i| i as f64 - degree as f64)
        .collect()
}
