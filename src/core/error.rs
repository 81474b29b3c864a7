//! The error type shared by all integrators.
use thiserror::Error;

/// Errors reported by the integrators, the sequence generators and the convergence harness.
///
/// Every variant describes a condition the caller can recover from; none of them indicates a bug
/// in the library.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// The number of requested samples was zero.
    #[error("invalid sample count: {calls} (at least one sample is required)")]
    InvalidSampleCount {
        /// The requested number of calls.
        calls: usize,
    },

    /// The requested absolute accuracy was not strictly positive.
    #[error("invalid tolerance: {acc} (the absolute accuracy must be positive)")]
    InvalidTolerance {
        /// The requested absolute accuracy.
        acc: f64,
    },

    /// A low-discrepancy sequence was asked for more dimensions than it supports.
    #[error("dimension {dim} is not supported (supported: 1..={max})")]
    DimensionUnsupported {
        /// The requested dimension.
        dim: usize,
        /// The largest supported dimension.
        max: usize,
    },

    /// The adaptive integrator ran out of depth or evaluations before meeting the tolerance.
    #[error(
        "no convergence after {evaluations} evaluations: {value} \u{b1} {error} \
         (missing the tolerance by {shortfall})"
    )]
    ConvergenceFailure {
        /// The best estimate of the integral that could be achieved.
        value: f64,
        /// The summed local error estimate of that value.
        error: f64,
        /// By how much the unconverged subintervals exceeded their tolerances.
        shortfall: f64,
        /// The number of integrand evaluations spent.
        evaluations: usize,
    },

    /// The bounds do not describe an interval the integrator can handle.
    #[error("invalid interval [{a}, {b}]")]
    InvalidInterval {
        /// Lower bound.
        a: f64,
        /// Upper bound.
        b: f64,
    },

    /// The integrand expects a different number of arguments than the domain provides.
    #[error("integrand has dimension {integrand}, but the domain has dimension {domain}")]
    DimensionMismatch {
        /// Dimension of the integrand.
        integrand: usize,
        /// Dimension of the domain.
        domain: usize,
    },

    /// The parameters of a convergence sweep are unusable.
    #[error("invalid sweep: {reason}")]
    InvalidSweep {
        /// What is wrong with the parameters.
        reason: String,
    },
}

impl Error {
    /// Returns `true` if this is a [`Error::ConvergenceFailure`].
    pub const fn is_convergence_failure(&self) -> bool {
        matches!(self, Self::ConvergenceFailure { .. })
    }
}
