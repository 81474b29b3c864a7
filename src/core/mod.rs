//! Core functionality. You don't need to import this modules since all it's public members are
//! part of the crate namespace.
pub mod error;
pub mod estimators;

pub use error::Error;

use num_traits::{Float, FromPrimitive};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// Integrand trait
pub trait Integrand<T>: Send + Sync {
    /// Call the integrand with a point `x` of the integration domain.
    fn call(&self, x: &[T]) -> T;
    /// The dimension of the integrand.
    fn dim(&self) -> usize;
}

/// Adapts a closure taking a slice to the [`Integrand`] trait.
///
/// ```
/// use numintir::FnIntegrand;
///
/// let gauss = FnIntegrand::new(1, |x: &[f64]| (-x[0] * x[0]).exp());
/// # let _ = gauss;
/// ```
#[derive(Clone, Debug)]
pub struct FnIntegrand<F> {
    dim: usize,
    f: F,
}

impl<F> FnIntegrand<F> {
    /// Wrap `f`, which expects points with `dim` coordinates.
    pub const fn new(dim: usize, f: F) -> Self {
        Self { dim, f }
    }
}

impl<T, F> Integrand<T> for FnIntegrand<F>
where
    F: Fn(&[T]) -> T + Send + Sync,
{
    fn call(&self, x: &[T]) -> T {
        (self.f)(x)
    }

    fn dim(&self) -> usize {
        self.dim
    }
}

/// A closed interval $[a, b]$ with $a \le b$. Either bound may be infinite.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Interval<T> {
    a: T,
    b: T,
}

impl<T: Float> Interval<T> {
    /// Creates the interval $[a, b]$.
    ///
    /// Fails with [`Error::InvalidInterval`] if a bound is NaN, if $a > b$, or if both bounds are
    /// the same infinity.
    pub fn new(a: T, b: T) -> Result<Self, Error> {
        if a.is_nan() || b.is_nan() || a > b || (a == b && a.is_infinite()) {
            return Err(Error::InvalidInterval {
                a: to_f64(a),
                b: to_f64(b),
            });
        }

        Ok(Self { a, b })
    }

    /// The lower bound.
    pub fn lower(&self) -> T {
        self.a
    }

    /// The upper bound.
    pub fn upper(&self) -> T {
        self.b
    }

    /// `true` if the interval is a single point.
    pub fn is_degenerate(&self) -> bool {
        self.a == self.b
    }

    /// `true` if both bounds are finite.
    pub fn is_finite(&self) -> bool {
        self.a.is_finite() && self.b.is_finite()
    }

    /// The length $b - a$.
    pub fn width(&self) -> T {
        self.b - self.a
    }

    /// The midpoint $(a + b) / 2$.
    pub fn midpoint(&self) -> T {
        let two = T::one() + T::one();
        self.a + (self.b - self.a) / two
    }
}

/// A finite hyper-rectangle, the integration domain of the Monte Carlo integrators.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Domain<T> {
    bounds: Vec<(T, T)>,
}

impl<T: Float> Domain<T> {
    /// Creates the domain $[a_1, b_1] \times \cdots \times [a_d, b_d]$ from the `bounds`
    /// $(a_i, b_i)$.
    pub fn new(bounds: Vec<(T, T)>) -> Result<Self, Error> {
        if let Some(&(a, b)) = bounds
            .iter()
            .find(|&&(a, b)| !a.is_finite() || !b.is_finite() || a > b)
        {
            return Err(Error::InvalidInterval {
                a: to_f64(a),
                b: to_f64(b),
            });
        }

        Ok(Self { bounds })
    }

    /// The unit hypercube $[0, 1)^d$.
    pub fn unit(dim: usize) -> Self {
        Self {
            bounds: vec![(T::zero(), T::one()); dim],
        }
    }

    /// The number of dimensions.
    pub fn dim(&self) -> usize {
        self.bounds.len()
    }

    /// The bounds $(a_i, b_i)$ of every dimension.
    pub fn bounds(&self) -> &[(T, T)] {
        &self.bounds
    }

    /// The volume $\prod_i (b_i - a_i)$.
    pub fn volume(&self) -> T {
        self.bounds
            .iter()
            .fold(T::one(), |volume, &(a, b)| volume * (b - a))
    }

    /// Maps a point of the unit hypercube in place onto the domain.
    pub fn map_from_unit(&self, x: &mut [T]) {
        debug_assert_eq!(x.len(), self.bounds.len());

        for (xi, &(a, b)) in x.iter_mut().zip(&self.bounds) {
            *xi = a + *xi * (b - a);
        }
    }

    /// Fails with [`Error::DimensionMismatch`] unless `integrand` matches the dimension of this
    /// domain.
    pub fn check<I: Integrand<T>>(&self, integrand: &I) -> Result<(), Error> {
        if integrand.dim() == self.dim() {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                integrand: integrand.dim(),
                domain: self.dim(),
            })
        }
    }
}

impl<T: Float> TryFrom<Interval<T>> for Domain<T> {
    type Error = Error;

    /// Fails with [`Error::InvalidInterval`] if `interval` is not finite.
    fn try_from(interval: Interval<T>) -> Result<Self, Error> {
        Self::new(vec![(interval.lower(), interval.upper())])
    }
}

/// A checkpoint saves the state of the generator after an iteration.
/// Checkpoints can be used to restart or resume iterations.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Checkpoint<R, E> {
    rng_before: R,
    rng_after: R,
    estimators: E,
}

impl<R, E> Checkpoint<R, E> {
    /// Constructor
    pub(crate) const fn new(rng_before: R, rng_after: R, estimators: E) -> Self {
        Self {
            rng_before,
            rng_after,
            estimators,
        }
    }

    /// Returns the random number generator before generation of this checkpoint.
    pub const fn rng_before(&self) -> &R {
        &self.rng_before
    }

    /// Returns the random number generator after generation of this checkpoint
    pub const fn rng_after(&self) -> &R {
        &self.rng_after
    }

    /// Returns the estimators of this checkpoint.
    pub const fn estimators(&self) -> &E {
        &self.estimators
    }

    /// Destructure the checkpoint and return its components.
    pub fn destructure(self) -> (R, R, E) {
        (self.rng_before, self.rng_after, self.estimators)
    }
}

/// Compute the number of calls on a given core, given the total number of cores
/// `n_cores`, the index `core` (zero-based) of the current thread as well as the
/// total number of calls `total_calls` to perform combined on all cores.
pub(crate) fn compute_calls_for_core(core: usize, n_cores: usize, total_calls: usize) -> usize {
    // make sure passed data is valid
    debug_assert!(core < n_cores);

    let calls_per_core = calls_per_core(n_cores, total_calls);

    // the last cores might get fewer calls, or none at all if `total_calls` is small
    total_calls
        .saturating_sub(core * calls_per_core)
        .min(calls_per_core)
}

/// The number of calls every core but the last ones performs.
pub(crate) fn calls_per_core(n_cores: usize, total_calls: usize) -> usize {
    (total_calls + n_cores - 1) / n_cores
}

/// Converts a constant into `T`; types that cannot represent it get NaN.
pub(crate) fn from_f64<T: Float + FromPrimitive>(x: f64) -> T {
    T::from_f64(x).unwrap_or_else(T::nan)
}

/// Converts a count into `T`; types that cannot represent it get NaN.
pub(crate) fn from_usize<T: Float + FromPrimitive>(n: usize) -> T {
    T::from_usize(n).unwrap_or_else(T::nan)
}

pub(crate) fn to_f64<T: Float>(x: T) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}
