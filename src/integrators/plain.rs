//! Plain integrator
use crate::callbacks::Callback;
use crate::core::estimators::*;
use crate::core::*;
use crate::integrators::Estimate;

use num_traits::{Float, FromPrimitive};
use rand::distributions::{Distribution, Standard};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::Add;
use tracing::debug;

use crossbeam as cb;

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Estimators for the plain integrator.
///
/// The accumulated values already include the volume of the integration domain, so that the mean
/// is the estimate of the integral.
pub struct PlainEstimators<T> {
    sum: KahanSum<T>,
    sumsq: KahanSum<T>,
    calls: usize,
    non_finite_calls: usize,
    non_zero_calls: usize,
}

impl<T: Float> Default for PlainEstimators<T> {
    fn default() -> Self {
        Self {
            sum: KahanSum::new(),
            sumsq: KahanSum::new(),
            calls: 0,
            non_finite_calls: 0,
            non_zero_calls: 0,
        }
    }
}

impl<T: Float> Add for PlainEstimators<T> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            sum: self.sum + other.sum,
            sumsq: self.sumsq + other.sumsq,
            calls: self.calls + other.calls,
            non_finite_calls: self.non_finite_calls + other.non_finite_calls,
            non_zero_calls: self.non_zero_calls + other.non_zero_calls,
        }
    }
}

impl<T: Float> PlainEstimators<T> {
    /// Adds the value of a single integrand call.
    pub fn update(&mut self, value: T) {
        self.calls += 1;

        if value != T::zero() {
            self.non_zero_calls += 1;

            if value.is_finite() {
                self.sum.push(value);
                self.sumsq.push(value * value);
            } else {
                self.non_finite_calls += 1;
            }
        }
    }
}

impl<T> BasicEstimators<T> for PlainEstimators<T>
where
    T: Float + FromPrimitive,
{
    fn mean(&self) -> T {
        self.sum.sum() / from_usize(self.calls)
    }

    /// The variance of the mean. A single call carries no information about the spread, in that
    /// case the variance is zero.
    fn var(&self) -> T {
        if self.calls < 2 {
            return T::zero();
        }

        let calls = from_usize::<T>(self.calls);
        let sum = self.sum.sum();
        // rounding can push the difference slightly below zero for constant integrands
        ((self.sumsq.sum() - sum * sum / calls) / calls / (calls - T::one())).max(T::zero())
    }
}

impl<T> Estimators<T> for PlainEstimators<T>
where
    T: Float + FromPrimitive,
{
    fn calls(&self) -> usize {
        self.calls
    }

    fn non_finite_calls(&self) -> usize {
        self.non_finite_calls
    }

    fn non_zero_calls(&self) -> usize {
        self.non_zero_calls
    }
}

/// The checkpoint type of the plain integrator.
pub type PlainCheckpoint<T, R> = Checkpoint<R, PlainEstimators<T>>;

/// Perform part of the integration of a given integration on a specific `core`.
fn perform_iteration_contribution_from_core<T, R, I>(
    integrand: &I,
    domain: &Domain<T>,
    mut rng: R,
    calls: usize,
    core: usize,
    n_cores: usize,
) -> PlainEstimators<T>
where
    I: Integrand<T>,
    T: Float + FromPrimitive,
    R: Rng,
    Standard: Distribution<T>,
{
    // determine how many calls to the random number generator to skip
    let skip = calls_per_core(n_cores, calls) * core * domain.dim();

    // initialize the random number generator on the given core
    for _ in 0..skip {
        let _ = rng.gen::<T>();
    }

    // in the last iteration, not all calls might be needed
    let actual_calls = compute_calls_for_core(core, n_cores, calls);
    let volume = domain.volume();

    // create a buffer for the sampled random variables such that
    // we do not need to allocate vectors in every call
    let mut x = vec![T::zero(); domain.dim()];

    (0..actual_calls).fold(PlainEstimators::<T>::default(), |mut acc, _| {
        // sample a new point
        x.iter_mut().for_each(|v| *v = rng.gen());
        domain.map_from_unit(&mut x);

        acc.update(integrand.call(&x) * volume);
        acc
    })
}

/// Perform a single iteration of integrating the `integrand` on `n_cores` cores using `calls` samples.
fn integrate_iteration<T, R, I>(
    integrand: &I,
    domain: &Domain<T>,
    rng: &R,
    n_cores: usize,
    calls: usize,
) -> PlainCheckpoint<T, R>
where
    I: Integrand<T>,
    T: Float + FromPrimitive + Send + Sync,
    R: Clone + Rng + Send + Sync,
    Standard: Distribution<T>,
{
    let mut rng_global = rng.clone();

    // distribute the workload evenly across the cores
    let collect_results = cb::thread::scope(|s| {
        let mut handles = Vec::with_capacity(n_cores);

        for core in 0..n_cores {
            // Needs to be defined before spawning the thread
            let rng_local = rng_global.clone();

            handles.push(s.spawn(move |_| {
                perform_iteration_contribution_from_core(
                    integrand, domain, rng_local, calls, core, n_cores,
                )
            }));
        }

        // wait for the threads to finish
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect::<Vec<_>>()
    })
    .unwrap_or_else(|panic| std::panic::resume_unwind(panic));

    // accumulate the intermediate results in the order of the cores
    let accumulate = collect_results
        .into_iter()
        .fold(PlainEstimators::<T>::default(), |acc, r| acc + r);

    // return the updated rng
    for _ in 0..calls * domain.dim() {
        let _ = rng_global.gen::<T>();
    }

    Checkpoint::new(rng.clone(), rng_global, accumulate)
}

/// Integrate the `integrand` over `domain` using `n_cores` cores.
///
/// The random number generator in its initial state is provided in `rng`
/// together with a `callback` function that prints estimates after each
/// iteration.
/// The number of calls of the integrand per iteration is stored in the slice
/// `iterations`.
///
/// The results only depend on `rng`, not on `n_cores`: every core skips the
/// random numbers used by the cores before it.
pub fn integrate<T, R, I>(
    integrand: &I,
    domain: &Domain<T>,
    rng: &R,
    callback: &impl Callback<T, R, PlainEstimators<T>>,
    n_cores: usize,
    iterations: &[usize],
) -> Result<Vec<PlainCheckpoint<T, R>>, Error>
where
    I: Integrand<T>,
    T: Float + FromPrimitive + Send + Sync,
    R: Clone + Rng + Send + Sync,
    Standard: Distribution<T>,
{
    domain.check(integrand)?;

    if let Some(&calls) = iterations.iter().find(|&&calls| calls == 0) {
        return Err(Error::InvalidSampleCount { calls });
    }

    let n_cores = n_cores.max(1);

    // storage for the results of each iteration
    let mut checkpoints = Vec::with_capacity(iterations.len());

    let mut rng_global = rng.clone();

    // Integration iterations are treated sequentially
    for &calls in iterations {
        let checkpoint = integrate_iteration(integrand, domain, &rng_global, n_cores, calls);
        // synchronize the random number generation
        rng_global = checkpoint.rng_after().clone();

        debug!(
            iteration = checkpoints.len(),
            calls,
            n_cores,
            "plain iteration finished"
        );

        checkpoints.push(checkpoint);
        callback.print(&checkpoints);
    }

    Ok(checkpoints)
}

/// Continue an integration started with [`integrate`] after `checkpoint`, performing the
/// additional `iterations`.
pub fn resume_from_checkpoint<T, R, I>(
    integrand: &I,
    domain: &Domain<T>,
    checkpoint: &PlainCheckpoint<T, R>,
    callback: &impl Callback<T, R, PlainEstimators<T>>,
    n_cores: usize,
    iterations: &[usize],
) -> Result<Vec<PlainCheckpoint<T, R>>, Error>
where
    I: Integrand<T>,
    T: Float + FromPrimitive + Send + Sync,
    R: Clone + Rng + Send + Sync,
    Standard: Distribution<T>,
{
    integrate(
        integrand,
        domain,
        checkpoint.rng_after(),
        callback,
        n_cores,
        iterations,
    )
}

/// Estimate the integral of `integrand` over `domain` with `calls` uniformly distributed points.
///
/// The reported error is the standard error of the mean,
/// $\sqrt{(\sum f^2 - (\sum f)^2 / N) / (N (N-1))}$, which is zero for a single call. `rng` is
/// advanced past the $N d$ random numbers that were used, so that consecutive calls use
/// independent points.
pub fn estimate<T, R, I>(
    integrand: &I,
    domain: &Domain<T>,
    rng: &mut R,
    calls: usize,
) -> Result<Estimate<T>, Error>
where
    I: Integrand<T>,
    T: Float + FromPrimitive + Send + Sync,
    R: Clone + Rng + Send + Sync,
    Standard: Distribution<T>,
{
    domain.check(integrand)?;

    if calls == 0 {
        return Err(Error::InvalidSampleCount { calls });
    }

    let (_, rng_after, estimators) =
        integrate_iteration(integrand, domain, rng, 1, calls).destructure();
    *rng = rng_after;

    Ok(Estimate::from_estimators(&estimators))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::SinkCallback;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    use assert_approx_eq::assert_approx_eq;

    fn abs_integrand() -> FnIntegrand<impl Fn(&[f64]) -> f64 + Send + Sync> {
        FnIntegrand::new(1, |x: &[f64]| (2.0 * x[0] - 1.0).abs())
    }

    #[test]
    fn test_estimators_update() {
        let mut estimators = PlainEstimators::default();
        estimators.update(1.0);
        estimators.update(0.0);
        estimators.update(f64::INFINITY);
        estimators.update(3.0);

        assert_eq!(estimators.calls(), 4);
        assert_eq!(estimators.non_zero_calls(), 3);
        assert_eq!(estimators.non_finite_calls(), 1);
        assert_eq!(estimators.mean(), 1.0);
    }

    #[test]
    fn test_single_call_has_zero_error() {
        let mut rng = Pcg64::seed_from_u64(7);
        let domain = Domain::unit(1);

        let result = estimate(&abs_integrand(), &domain, &mut rng, 1).unwrap();

        assert!(result.value.is_finite());
        assert_eq!(result.error, 0.0);
        assert_eq!(result.calls, 1);
    }

    #[test]
    fn test_zero_calls() {
        let mut rng = Pcg64::seed_from_u64(7);
        let domain = Domain::unit(1);

        assert_eq!(
            estimate(&abs_integrand(), &domain, &mut rng, 0),
            Err(Error::InvalidSampleCount { calls: 0 })
        );
        assert_eq!(
            integrate(&abs_integrand(), &domain, &rng, &SinkCallback {}, 1, &[10, 0]).err(),
            Some(Error::InvalidSampleCount { calls: 0 })
        );
    }

    #[test]
    fn test_constant_integrand_over_domain() {
        let mut rng = Pcg64::seed_from_u64(1);
        let domain = Domain::new(vec![(-1.0, 1.0), (0.0, 3.0)]).unwrap();
        let integrand = FnIntegrand::new(2, |_: &[f64]| 0.5);

        let result = estimate(&integrand, &domain, &mut rng, 100).unwrap();

        assert_approx_eq!(result.value, 3.0, 1e-14);
        assert_approx_eq!(result.error, 0.0, 1e-14);
    }

    #[test]
    fn test_estimate_advances_rng() {
        let mut rng = Pcg64::seed_from_u64(42);
        let domain = Domain::unit(1);

        let first = estimate(&abs_integrand(), &domain, &mut rng, 1000).unwrap();
        let second = estimate(&abs_integrand(), &domain, &mut rng, 1000).unwrap();

        assert_ne!(first.value, second.value);
        assert_approx_eq!(first.value, 0.5, 5.0 * first.error);
        assert_approx_eq!(second.value, 0.5, 5.0 * second.error);
    }

    #[test]
    fn test_plain_iteration() {
        const TOLERANCE: f64 = 1e-13;

        // define the calls per iteration
        let iterations = vec![1000];

        // create a random number generator
        let rng = Pcg64::new(0xcafef00dd15ea5e5, 0xa02bdbf7bb3c0a7ac28fa16a64abf96);

        let chkpt = integrate(
            &abs_integrand(),
            &Domain::unit(1),
            &rng,
            &SinkCallback {},
            1,
            &iterations,
        )
        .unwrap();

        // we requested 1000 calls
        assert_eq!(chkpt[0].estimators().calls(), 1000);

        // check the mean
        assert_approx_eq!(
            chkpt[0].estimators().mean(),
            4.891001827394124e-1,
            TOLERANCE
        );

        // check the variance
        assert_approx_eq!(chkpt[0].estimators().var(), 8.704232037144878e-5, TOLERANCE);
    }
}
