//! Convergence studies.
//!
//! A [`Sweep`] evaluates one integral for a series of sample counts or tolerances and records how
//! far every estimate is from a known reference value. The records are plain data; plotting them,
//! e.g. on log-log axes, is left to the caller.
use crate::core::{Domain, Error, FnIntegrand, Integrand, Interval};
use crate::integrators::adaptive::{self, AdaptiveConfig};
use crate::integrators::PointSource;
use crate::sequences::LowDiscrepancy;

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use tracing::{info, warn};

/// Whether the estimate of a record met its target.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub enum Outcome {
    /// The estimate is a regular result.
    Converged,
    /// The adaptive integrator gave up; the record holds its best estimate.
    Failed {
        /// By how much the tolerance was missed.
        shortfall: f64,
    },
}

/// A single point of a convergence study.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct EstimateRecord {
    /// The sample count or the requested accuracy.
    pub parameter: f64,
    /// The method that produced the estimate: `"MC"`, `"QMC"` or `"adaptive"`.
    pub label: String,
    /// The estimated integral.
    pub value: f64,
    /// The absolute difference between `value` and the reference value.
    pub error: f64,
    /// The error the method reported for itself.
    pub reported_error: f64,
    /// The number of integrand evaluations.
    pub calls: usize,
    /// Whether the estimate converged.
    pub outcome: Outcome,
}

impl EstimateRecord {
    /// Returns the triple $(\text{parameter}, |\text{value} - \text{reference}|, \text{label})$.
    pub fn triple(&self) -> (f64, f64, &str) {
        (self.parameter, self.error, &self.label)
    }
}

/// The parameters of a convergence study.
#[derive(Clone, Debug)]
pub enum Sweep<R, S> {
    /// Plain Monte Carlo with draws from `rng` and quasi-Monte Carlo with `sequence`, each with
    /// every sample count in turn. The sample counts must be strictly ascending.
    Sampling {
        /// The generator of the plain Monte Carlo estimates. After the sweep it holds the state
        /// following the last draw.
        rng: R,
        /// The low-discrepancy sequence of the quasi-Monte Carlo estimates.
        sequence: S,
        /// The numbers of samples.
        sample_counts: Vec<usize>,
    },
    /// Adaptive quadrature with every tolerance in turn. The tolerances must be strictly
    /// descending.
    Adaptive {
        /// The integrator parameters shared by all tolerances.
        config: AdaptiveConfig,
        /// The requested absolute accuracies.
        tolerances: Vec<f64>,
    },
}

impl<R, S> Sweep<R, S>
where
    R: Clone + Rng + Send + Sync,
    S: Clone + LowDiscrepancy,
{
    /// Runs the study for `integrand` over `domain` and compares every estimate with
    /// `reference`. See [`sweep`].
    pub fn run<I: Integrand<f64>>(
        &mut self,
        integrand: &I,
        domain: &Domain<f64>,
        reference: f64,
    ) -> Result<Vec<EstimateRecord>, Error> {
        match self {
            Self::Sampling {
                rng,
                sequence,
                sample_counts,
            } => {
                if let Some(pair) = sample_counts.windows(2).find(|pair| pair[0] >= pair[1]) {
                    return Err(Error::InvalidSweep {
                        reason: format!(
                            "sample counts must be strictly ascending, but {} is followed by {}",
                            pair[0], pair[1]
                        ),
                    });
                }

                let mut sources = [
                    PointSource::PseudoRandom(rng.clone()),
                    PointSource::LowDiscrepancy(sequence.clone()),
                ];
                let mut records = Vec::with_capacity(2 * sample_counts.len());

                for &calls in sample_counts.iter() {
                    for source in sources.iter_mut() {
                        let estimate = source.estimate(integrand, domain, calls)?;

                        records.push(record(
                            calls as f64,
                            source.label(),
                            estimate.value,
                            estimate.error,
                            estimate.calls,
                            Outcome::Converged,
                            reference,
                        ));
                    }
                }

                if let [PointSource::PseudoRandom(advanced), _] = sources {
                    *rng = advanced;
                }

                Ok(records)
            }
            Self::Adaptive { config, tolerances } => {
                check_descending(tolerances)?;
                domain.check(integrand)?;

                let (a, b) = match domain.bounds() {
                    &[(a, b)] => (a, b),
                    bounds => {
                        return Err(Error::DimensionUnsupported {
                            dim: bounds.len(),
                            max: 1,
                        })
                    }
                };

                adaptive_records(
                    |x: f64| integrand.call(&[x]),
                    &Interval::new(a, b)?,
                    config,
                    tolerances,
                    reference,
                )
            }
        }
    }

    /// Runs the study for the one-dimensional `f` over `interval`, which unlike a [`Domain`] may
    /// have infinite bounds, and compares every estimate with `reference`.
    ///
    /// # Errors
    ///
    /// The same as [`sweep`]. A sampling study additionally fails with
    /// [`Error::InvalidInterval`] if `interval` is not finite.
    pub fn run_on_interval<F>(
        &mut self,
        f: F,
        interval: &Interval<f64>,
        reference: f64,
    ) -> Result<Vec<EstimateRecord>, Error>
    where
        F: Fn(f64) -> f64 + Send + Sync,
    {
        match self {
            Self::Sampling { .. } => {
                let domain = Domain::try_from(*interval)?;
                let integrand = FnIntegrand::new(1, |x: &[f64]| f(x[0]));

                self.run(&integrand, &domain, reference)
            }
            Self::Adaptive { config, tolerances } => {
                check_descending(tolerances)?;
                adaptive_records(f, interval, config, tolerances, reference)
            }
        }
    }
}

fn check_descending(tolerances: &[f64]) -> Result<(), Error> {
    match tolerances.windows(2).find(|pair| !(pair[0] > pair[1])) {
        Some(pair) => Err(Error::InvalidSweep {
            reason: format!(
                "tolerances must be strictly descending, but {} is followed by {}",
                pair[0], pair[1]
            ),
        }),
        None => Ok(()),
    }
}

fn adaptive_records<F>(
    f: F,
    interval: &Interval<f64>,
    config: &AdaptiveConfig,
    tolerances: &[f64],
    reference: f64,
) -> Result<Vec<EstimateRecord>, Error>
where
    F: Fn(f64) -> f64,
{
    tolerances
        .iter()
        .map(|&acc| match adaptive::integrate(&f, interval, acc, config) {
            Ok(result) => Ok(record(
                acc,
                "adaptive",
                result.value,
                result.error,
                result.evaluations,
                Outcome::Converged,
                reference,
            )),
            Err(Error::ConvergenceFailure {
                value,
                error,
                shortfall,
                evaluations,
            }) => {
                warn!(acc, shortfall, evaluations, "adaptive integration failed");

                Ok(record(
                    acc,
                    "adaptive",
                    value,
                    error,
                    evaluations,
                    Outcome::Failed { shortfall },
                    reference,
                ))
            }
            Err(err) => Err(err),
        })
        .collect()
}

fn record(
    parameter: f64,
    label: &str,
    value: f64,
    reported_error: f64,
    calls: usize,
    outcome: Outcome,
    reference: f64,
) -> EstimateRecord {
    let error = (value - reference).abs();

    info!(parameter, label, value, error, reported_error, calls, "sweep point");

    EstimateRecord {
        parameter,
        label: label.to_string(),
        value,
        error,
        reported_error,
        calls,
        outcome,
    }
}

/// Runs the convergence study `method` for `integrand` over `domain` against the exact value
/// `reference`.
///
/// The records are returned in the order of the parameters; a sampling study yields an `"MC"` and
/// a `"QMC"` record per sample count. If the adaptive integrator fails to converge for a
/// tolerance, a record with [`Outcome::Failed`] is emitted and the study continues.
///
/// # Errors
///
/// - [`Error::InvalidSweep`] if the parameters are not ordered,
/// - [`Error::DimensionUnsupported`] for an adaptive study over more than one dimension,
/// - every error of the integrators other than [`Error::ConvergenceFailure`].
pub fn sweep<R, S, I>(
    method: &mut Sweep<R, S>,
    integrand: &I,
    domain: &Domain<f64>,
    reference: f64,
) -> Result<Vec<EstimateRecord>, Error>
where
    R: Clone + Rng + Send + Sync,
    S: Clone + LowDiscrepancy,
    I: Integrand<f64>,
{
    method.run(integrand, domain, reference)
}

/// The series $(\text{parameter}, |\text{value} - \text{reference}|)$ of all records with the
/// given `label`, in their original order.
pub fn curve(records: &[EstimateRecord], label: &str) -> Vec<(f64, f64)> {
    records
        .iter()
        .filter(|record| record.label == label)
        .map(|record| (record.parameter, record.error))
        .collect()
}
