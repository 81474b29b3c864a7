//! Quasi-Monte Carlo integrator
use crate::core::estimators::*;
use crate::core::*;
use crate::integrators::Estimate;
use crate::sequences::{fill_unchecked, LowDiscrepancy};

use num_traits::{Float, FromPrimitive};
use serde::{Deserialize, Serialize};
use std::ops::Add;
use tracing::debug;

use crossbeam as cb;

/// Estimators for the quasi-Monte Carlo integrator.
///
/// Next to the sum over the primary point set, the integrand is summed over a companion point set
/// taken from the next block of axes of the same sequence. The difference of both estimates is
/// used as the error, which is a heuristic and not a statistical confidence interval: points of a
/// low-discrepancy sequence are not independent.
///
/// Every point costs two integrand calls, one at the primary and one at the companion coordinates.
/// Both are counted in [`Estimators::calls`], [`Estimators::non_finite_calls`] and
/// [`Estimators::non_zero_calls`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuasiEstimators<T> {
    primary: KahanSum<T>,
    companion: KahanSum<T>,
    points: usize,
    non_finite_calls: usize,
    non_zero_calls: usize,
}

impl<T: Float> Default for QuasiEstimators<T> {
    fn default() -> Self {
        Self {
            primary: KahanSum::new(),
            companion: KahanSum::new(),
            points: 0,
            non_finite_calls: 0,
            non_zero_calls: 0,
        }
    }
}

impl<T: Float> Add for QuasiEstimators<T> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            primary: self.primary + other.primary,
            companion: self.companion + other.companion,
            points: self.points + other.points,
            non_finite_calls: self.non_finite_calls + other.non_finite_calls,
            non_zero_calls: self.non_zero_calls + other.non_zero_calls,
        }
    }
}

impl<T: Float> QuasiEstimators<T> {
    /// Adds the integrand values at the primary and at the companion point.
    pub fn update(&mut self, primary: T, companion: T) {
        self.points += 1;

        for (value, sum) in [(primary, &mut self.primary), (companion, &mut self.companion)] {
            if value != T::zero() {
                self.non_zero_calls += 1;

                if value.is_finite() {
                    sum.push(value);
                } else {
                    self.non_finite_calls += 1;
                }
            }
        }
    }

    /// The number of points, i.e. half the number of calls.
    pub const fn points(&self) -> usize {
        self.points
    }
}

impl<T> BasicEstimators<T> for QuasiEstimators<T>
where
    T: Float + FromPrimitive,
{
    fn mean(&self) -> T {
        self.primary.sum() / from_usize(self.points)
    }

    /// The square of the difference between the primary and the companion estimate.
    fn var(&self) -> T {
        let difference = (self.primary.sum() - self.companion.sum()) / from_usize(self.points);
        difference * difference
    }

    fn std(&self) -> T {
        ((self.primary.sum() - self.companion.sum()) / from_usize(self.points)).abs()
    }
}

impl<T> Estimators<T> for QuasiEstimators<T>
where
    T: Float + FromPrimitive,
{
    fn calls(&self) -> usize {
        2 * self.points
    }

    fn non_finite_calls(&self) -> usize {
        self.non_finite_calls
    }

    fn non_zero_calls(&self) -> usize {
        self.non_zero_calls
    }
}

fn perform_contribution_from_core<T, S, I>(
    integrand: &I,
    domain: &Domain<T>,
    sequence: &S,
    calls: usize,
    core: usize,
    n_cores: usize,
) -> QuasiEstimators<T>
where
    I: Integrand<T>,
    T: Float + FromPrimitive,
    S: LowDiscrepancy,
{
    let dim = domain.dim();
    let volume = domain.volume();
    let first = calls_per_core(n_cores, calls) * core;
    let actual_calls = compute_calls_for_core(core, n_cores, calls);

    let mut x = vec![T::zero(); dim];
    let mut y = vec![T::zero(); dim];

    (first..first + actual_calls).fold(QuasiEstimators::default(), |mut acc, index| {
        let index = index as u64;

        fill_unchecked(sequence, index, 0, &mut x);
        domain.map_from_unit(&mut x);

        fill_unchecked(sequence, index, dim, &mut y);
        domain.map_from_unit(&mut y);

        acc.update(integrand.call(&x) * volume, integrand.call(&y) * volume);
        acc
    })
}

/// Estimate the integral of `integrand` over `domain` with the points `0..calls` of `sequence`,
/// distributing the points over `n_cores` threads.
///
/// Identical arguments give bit-identical results. The error is the difference between the
/// estimate on the axes `0..d` of the sequence and the one on the axes `d..2d`, which is why the
/// sequence must support twice the dimension of the domain. The returned [`Estimate::calls`] is
/// `2 * calls`, since every point is evaluated on both blocks of axes.
pub fn estimate_on_cores<T, S, I>(
    integrand: &I,
    domain: &Domain<T>,
    sequence: &S,
    calls: usize,
    n_cores: usize,
) -> Result<Estimate<T>, Error>
where
    I: Integrand<T>,
    T: Float + FromPrimitive + Send + Sync,
    S: LowDiscrepancy,
{
    domain.check(integrand)?;

    let dim = domain.dim();

    if dim == 0 || 2 * dim > sequence.max_dim() {
        return Err(Error::DimensionUnsupported {
            dim,
            max: sequence.max_dim() / 2,
        });
    }

    if calls == 0 {
        return Err(Error::InvalidSampleCount { calls });
    }

    let n_cores = n_cores.max(1);

    let estimators = cb::thread::scope(|s| {
        let handles = (0..n_cores)
            .map(|core| {
                s.spawn(move |_| {
                    perform_contribution_from_core(integrand, domain, sequence, calls, core, n_cores)
                })
            })
            .collect::<Vec<_>>();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .fold(QuasiEstimators::default(), |acc, e| acc + e)
    })
    .unwrap_or_else(|panic| std::panic::resume_unwind(panic));

    debug!(sequence = sequence.name(), calls, n_cores, "quasi-Monte Carlo estimate finished");

    Ok(Estimate::from_estimators(&estimators))
}

/// Estimate the integral of `integrand` over `domain` with the points `0..calls` of `sequence` on
/// the current thread. See [`estimate_on_cores`].
pub fn estimate<T, S, I>(
    integrand: &I,
    domain: &Domain<T>,
    sequence: &S,
    calls: usize,
) -> Result<Estimate<T>, Error>
where
    I: Integrand<T>,
    T: Float + FromPrimitive + Send + Sync,
    S: LowDiscrepancy,
{
    estimate_on_cores(integrand, domain, sequence, calls, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequences::{Halton, Sobol};

    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_quasi_polynomial() {
        // int_0^1 int_0^1 dx dy (x + y^2) = 1/2 + 1/3
        let integrand = FnIntegrand::new(2, |x: &[f64]| x[0] + x[1] * x[1]);
        let domain = Domain::unit(2);

        for result in &[
            estimate(&integrand, &domain, &Halton, 4096).unwrap(),
            estimate(&integrand, &domain, &Sobol, 4096).unwrap(),
        ] {
            assert_eq!(result.calls, 2 * 4096);
            assert_approx_eq!(result.value, 5.0 / 6.0, 1e-2);
            assert!(result.error < 1e-2);
        }
    }

    #[test]
    fn test_quasi_is_deterministic() {
        let integrand = FnIntegrand::new(1, |x: &[f64]| (-x[0] * x[0]).exp());
        let domain = Domain::unit(1);

        let first = estimate(&integrand, &domain, &Sobol, 1000).unwrap();
        let second = estimate(&integrand, &domain, &Sobol, 1000).unwrap();

        assert_eq!(first.value.to_bits(), second.value.to_bits());
        assert_eq!(first.error.to_bits(), second.error.to_bits());
    }

    #[test]
    fn test_quasi_cores_agree() {
        let integrand = FnIntegrand::new(3, |x: &[f64]| x[0] * x[1] * x[2]);
        let domain = Domain::new(vec![(0.0, 2.0); 3]).unwrap();

        let single = estimate_on_cores(&integrand, &domain, &Halton, 10_001, 1).unwrap();
        let many = estimate_on_cores(&integrand, &domain, &Halton, 10_001, 4).unwrap();

        assert_eq!(single.calls, many.calls);
        assert_approx_eq!(single.value, many.value, 1e-12);
        assert_approx_eq!(single.value, 8.0, 0.05);
    }

    #[test]
    fn test_quasi_counts_both_point_sets() {
        let mut estimators = QuasiEstimators::default();
        estimators.update(1.0_f64, f64::NAN);
        estimators.update(f64::INFINITY, 0.0);
        estimators.update(0.0, 3.0);

        assert_eq!(estimators.points(), 3);
        assert_eq!(estimators.calls(), 6);
        assert_eq!(estimators.non_zero_calls(), 4);
        assert_eq!(estimators.non_finite_calls(), 2);
        assert_approx_eq!(estimators.mean(), 1.0 / 3.0, 1e-15);
        assert_approx_eq!(estimators.std(), 2.0 / 3.0, 1e-15);

        // the first eight Halton points hit (0.86, 0.9) once in base 2 and (0.3, 0.34) once in
        // base 3
        let integrand = FnIntegrand::new(1, |x: &[f64]| {
            if (0.3..0.34).contains(&x[0]) || (0.86..0.9).contains(&x[0]) {
                f64::NAN
            } else {
                1.0
            }
        });
        let result = estimate(&integrand, &Domain::unit(1), &Halton, 8).unwrap();

        assert_eq!(result.calls, 16);
        assert_eq!(result.non_finite_calls, 2);
    }

    #[test]
    fn test_quasi_dimension_limits() {
        let integrand = FnIntegrand::new(9, |_: &[f64]| 1.0);
        let domain = Domain::unit(9);

        assert_eq!(
            estimate(&integrand, &domain, &Sobol, 10),
            Err(Error::DimensionUnsupported { dim: 9, max: 8 })
        );
        assert!(estimate(&integrand, &domain, &Halton, 10).is_ok());
        assert_eq!(
            estimate(&integrand, &domain, &Halton, 0),
            Err(Error::InvalidSampleCount { calls: 0 })
        );
    }
}
