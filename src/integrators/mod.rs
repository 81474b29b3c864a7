//! Integrators: plain and quasi Monte Carlo for hyper-rectangles and adaptive quadrature for
//! one-dimensional intervals.
pub mod adaptive;
pub mod plain;
pub mod quasi;
pub mod rules;

use crate::core::estimators::Estimators;
use crate::core::{Domain, Error, Integrand};
use crate::sequences::LowDiscrepancy;

use num_traits::{Float, FromPrimitive};
use rand::distributions::{Distribution, Standard};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The outcome of a single Monte Carlo estimate.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Estimate<T> {
    /// The estimated integral.
    pub value: T,
    /// The error bound reported by the estimator.
    pub error: T,
    /// The number of integrand calls.
    pub calls: usize,
    /// The number of calls that returned a non-finite value; they contribute zero.
    pub non_finite_calls: usize,
}

impl<T: Float> Estimate<T> {
    /// Summarizes `estimators`.
    pub fn from_estimators<E: Estimators<T>>(estimators: &E) -> Self {
        Self {
            value: estimators.mean(),
            error: estimators.std(),
            calls: estimators.calls(),
            non_finite_calls: estimators.non_finite_calls(),
        }
    }
}

/// Where the sample points of a Monte Carlo estimate come from.
#[derive(Clone, Debug)]
pub enum PointSource<R, S> {
    /// Independent uniform draws from a caller-owned random number generator, which every estimate
    /// advances.
    PseudoRandom(R),
    /// The points `0..N` of a low-discrepancy sequence, starting afresh for every estimate.
    LowDiscrepancy(S),
}

impl<R, S> PointSource<R, S> {
    /// A short label of the kind of source, `"MC"` or `"QMC"`.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::PseudoRandom(_) => "MC",
            Self::LowDiscrepancy(_) => "QMC",
        }
    }
}

impl<R, S> PointSource<R, S>
where
    R: Clone + Rng + Send + Sync,
    S: LowDiscrepancy,
{
    /// Estimates the integral of `integrand` over `domain` with `calls` points from this source.
    ///
    /// See [`plain::estimate`] and [`quasi::estimate`] for the meaning of the reported error.
    pub fn estimate<T, I>(
        &mut self,
        integrand: &I,
        domain: &Domain<T>,
        calls: usize,
    ) -> Result<Estimate<T>, Error>
    where
        I: Integrand<T>,
        T: Float + FromPrimitive + Send + Sync,
        Standard: Distribution<T>,
    {
        match self {
            Self::PseudoRandom(rng) => plain::estimate(integrand, domain, rng, calls),
            Self::LowDiscrepancy(sequence) => quasi::estimate(integrand, domain, sequence, calls),
        }
    }
}
