//! Adaptive quadrature of one-dimensional integrals.
//!
//! The integrator applies a [`Rule`] to the whole interval and to both of its halves. The interval
//! is accepted if the error estimates of the halves and the difference between the whole and the
//! sum of the halves together meet the tolerance. Otherwise the tolerance is split between the two
//! halves, which are then processed the same way. Pending intervals live on an explicit work
//! stack, so arbitrarily deep subdivisions never grow the call stack.
//!
//! The result either meets the requested accuracy or the call fails with
//! [`Error::ConvergenceFailure`], which carries the best estimate that could be achieved.
use crate::core::estimators::KahanSum;
use crate::core::{from_f64, to_f64, Error, Interval};
use crate::integrators::rules::{Panel, Rule};

use num_traits::{Float, FromPrimitive};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How the tolerance of a bisected interval is shared between its two halves.
///
/// Both policies hand out at most the tolerance of the parent, so the tolerances of all pending
/// and accepted intervals never add up to more than the requested accuracy.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SplitPolicy {
    /// Each half gets half of the tolerance.
    Halve,
    /// If the half with the smaller error estimate already meets a quarter of the tolerance, it is
    /// allotted twice its error estimate, but no less than 1/64 of the tolerance, and the rest goes
    /// to its sibling. Otherwise both halves get half of the tolerance. This concentrates the
    /// tolerance where the integrand is hard, e.g. next to an integrable singularity.
    Recycle,
}

impl Default for SplitPolicy {
    fn default() -> Self {
        Self::Halve
    }
}

/// A change of variables applied to finite intervals before integration.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Substitution {
    /// Integrate in the original variable.
    None,
    /// Integrate over $\theta \in [0, \pi]$ with $x = (a + b)/2 + (b - a)/2 \cos \theta$. The
    /// Jacobian vanishes at both ends, which removes integrable end-point singularities like
    /// $1/\sqrt{x}$.
    ClenshawCurtis,
}

impl Default for Substitution {
    fn default() -> Self {
        Self::None
    }
}

/// Parameters of the adaptive integrator.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AdaptiveConfig {
    /// The base rule.
    pub rule: Rule,
    /// The tolerance split between bisected halves.
    pub split: SplitPolicy,
    /// The change of variables for finite intervals.
    pub substitution: Substitution,
    /// No interval is accepted before this many bisections. The integrator uses at least
    /// [`Rule::min_depth`] of the rule.
    pub min_depth: usize,
    /// Intervals at this depth are not bisected any further.
    pub max_depth: usize,
    /// The budget of integrand evaluations.
    pub max_evaluations: usize,
    /// A relative tolerance added to the absolute tolerance of every interval.
    pub rel_tolerance: f64,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            rule: Rule::default(),
            split: SplitPolicy::default(),
            substitution: Substitution::default(),
            min_depth: 0,
            max_depth: 48,
            max_evaluations: 2_000_000,
            rel_tolerance: 0.0,
        }
    }
}

/// A converged result of the adaptive integrator.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct AdaptiveResult<T> {
    /// The estimated integral.
    pub value: T,
    /// The sum of the error estimates of all accepted intervals.
    pub error: T,
    /// The number of integrand evaluations.
    pub evaluations: usize,
    /// The number of accepted intervals.
    pub intervals: usize,
    /// The deepest bisection level that was reached.
    pub depth: usize,
}

/// A pending interval on the work stack.
struct Task<T> {
    a: T,
    b: T,
    tolerance: T,
    depth: usize,
    panel: Panel<T>,
}

/// The variable transformation that maps the integration interval onto a finite one.
#[derive(Clone, Copy)]
enum Mapping<T> {
    Identity { a: T, b: T },
    UpperInfinite { a: T },
    LowerInfinite { b: T },
    BothInfinite,
    Cosine { a: T, b: T },
}

impl<T: Float + FromPrimitive> Mapping<T> {
    fn new(interval: &Interval<T>, substitution: Substitution) -> Result<Self, Error> {
        let (a, b) = (interval.lower(), interval.upper());

        match (a.is_finite(), b.is_finite(), substitution) {
            (true, true, Substitution::None) => Ok(Self::Identity { a, b }),
            (true, true, Substitution::ClenshawCurtis) => Ok(Self::Cosine { a, b }),
            (_, _, Substitution::ClenshawCurtis) => Err(Error::InvalidInterval {
                a: to_f64(a),
                b: to_f64(b),
            }),
            (true, false, _) => Ok(Self::UpperInfinite { a }),
            (false, true, _) => Ok(Self::LowerInfinite { b }),
            (false, false, _) => Ok(Self::BothInfinite),
        }
    }

    /// The finite bounds of the transformed variable.
    fn bounds(&self) -> (T, T) {
        match *self {
            Self::Identity { a, b } => (a, b),
            Self::UpperInfinite { .. } | Self::LowerInfinite { .. } => (T::zero(), T::one()),
            Self::BothInfinite => (-T::one(), T::one()),
            Self::Cosine { .. } => (T::zero(), from_f64(std::f64::consts::PI)),
        }
    }

    /// The transformed integrand, i.e. `f` at the mapped point times the Jacobian.
    fn eval<F: Fn(T) -> T>(&self, f: &F, t: T) -> T {
        match *self {
            Self::Identity { .. } => f(t),
            Self::UpperInfinite { a } => f(a + (T::one() - t) / t) / (t * t),
            Self::LowerInfinite { b } => f(b - (T::one() - t) / t) / (t * t),
            Self::BothInfinite => {
                let s = T::one() - t * t;
                f(t / s) * (T::one() + t * t) / (s * s)
            }
            Self::Cosine { a, b } => {
                let width = b - a;
                let half = t / (T::one() + T::one());
                // measured from the nearer end point, `center + width / 2 * cos(t)` rounds to the
                // end point long before `t` reaches it
                let x = if t > from_f64(std::f64::consts::FRAC_PI_2) {
                    a + width * half.cos().powi(2)
                } else {
                    b - width * half.sin().powi(2)
                };

                f(x) * width * half.sin() * half.cos()
            }
        }
    }
}

/// Splits `tolerance` between a left half with error estimate `left` and a right half with error
/// estimate `right`.
fn split_tolerance<T: Float>(policy: SplitPolicy, tolerance: T, left: T, right: T) -> (T, T) {
    let two = T::one() + T::one();
    let half = tolerance / two;
    let quarter = half / two;
    // the margin over the error estimate leaves room for the difference to the parent rule
    let share = |error: T| (two * error).max(quarter / (two * two * two * two));

    match policy {
        SplitPolicy::Halve => (half, half),
        SplitPolicy::Recycle => {
            if left <= right && left <= quarter {
                let left = share(left);
                (left, tolerance - left)
            } else if right <= quarter {
                let right = share(right);
                (tolerance - right, right)
            } else {
                (half, half)
            }
        }
    }
}

/// Integrate `f` over `interval` to the absolute accuracy `acc`.
///
/// A degenerate interval gives zero without evaluating `f`. Infinite bounds are mapped onto a
/// finite interval; the rules never evaluate the end points, where the mapped integrand is
/// singular.
///
/// # Errors
///
/// - [`Error::InvalidTolerance`] if `acc` is not positive or `config.rel_tolerance` is negative,
/// - [`Error::InvalidInterval`] if the Clenshaw-Curtis substitution is requested for an infinite
///   interval,
/// - [`Error::ConvergenceFailure`] if an interval reaches `config.max_depth` before it is accepted,
///   or if `config.max_evaluations` is exhausted.
///
/// # Examples
///
/// ```
/// use numintir::integrators::adaptive::{integrate, AdaptiveConfig};
/// use numintir::Interval;
///
/// let interval = Interval::new(0.0, 1.0).unwrap();
/// let result = integrate(|x: f64| (-x * x).exp(), &interval, 1e-4, &AdaptiveConfig::default())
///     .unwrap();
///
/// assert!((result.value - 0.746_824_132_812_427).abs() < 1e-4);
/// ```
pub fn integrate<T, F>(
    f: F,
    interval: &Interval<T>,
    acc: T,
    config: &AdaptiveConfig,
) -> Result<AdaptiveResult<T>, Error>
where
    T: Float + FromPrimitive,
    F: Fn(T) -> T,
{
    // also rejects NaN
    if !(acc > T::zero()) {
        return Err(Error::InvalidTolerance { acc: to_f64(acc) });
    }

    if !(config.rel_tolerance >= 0.0) {
        return Err(Error::InvalidTolerance {
            acc: config.rel_tolerance,
        });
    }

    if interval.is_degenerate() {
        return Ok(AdaptiveResult {
            value: T::zero(),
            error: T::zero(),
            evaluations: 0,
            intervals: 0,
            depth: 0,
        });
    }

    let mapping = Mapping::new(interval, config.substitution)?;
    let (a, b) = mapping.bounds();

    drain(&|t: T| mapping.eval(&f, t), a, b, acc, config)
}

fn drain<T, G>(g: &G, a: T, b: T, acc: T, config: &AdaptiveConfig) -> Result<AdaptiveResult<T>, Error>
where
    T: Float + FromPrimitive,
    G: Fn(T) -> T,
{
    let rel = from_f64::<T>(config.rel_tolerance);
    let min_depth = config.min_depth.max(config.rule.min_depth());
    let two = T::one() + T::one();

    let root = config.rule.apply_with(g, a, b, None);
    let mut evaluations = root.evaluations;
    let mut stack = vec![Task {
        a,
        b,
        tolerance: acc,
        depth: 0,
        panel: root,
    }];

    let mut value = KahanSum::new();
    let mut error = KahanSum::new();
    let mut shortfall = KahanSum::new();
    let mut intervals = 0;
    let mut failed = 0;
    let mut depth = 0;

    while let Some(task) = stack.pop() {
        let mid = task.a + (task.b - task.a) / two;

        if task.depth >= config.max_depth
            || evaluations >= config.max_evaluations
            || mid <= task.a
            || mid >= task.b
        {
            // the interval can't be refined or verified any further, keep its contribution
            let allowed = task.tolerance + rel * task.panel.value.abs();

            value.push(task.panel.value);
            error.push(task.panel.error);
            shortfall.push((task.panel.error - allowed).max(T::zero()));
            depth = depth.max(task.depth);
            intervals += 1;
            failed += 1;
            continue;
        }

        let (left_reuse, right_reuse) = task.panel.inherited();
        let left = config.rule.apply_with(g, task.a, mid, left_reuse);
        let right = config.rule.apply_with(g, mid, task.b, right_reuse);
        evaluations += left.evaluations + right.evaluations;

        let refined = left.value + right.value;
        let allowed = task.tolerance + rel * refined.abs();
        let mut estimate = left.error + right.error + (task.panel.value - refined).abs();
        let mut accept = task.depth >= min_depth && estimate <= allowed;

        if accept {
            if let Some((check, cost)) = config.rule.cross_check(g, task.a, task.b) {
                evaluations += cost;
                estimate = estimate + (check - refined).abs();
                accept = estimate <= allowed;
            }
        }

        if accept {
            value.push(refined);
            error.push(estimate);
            depth = depth.max(task.depth + 1);
            intervals += 1;
            continue;
        }

        let (left_tolerance, right_tolerance) =
            split_tolerance(config.split, task.tolerance, left.error, right.error);

        stack.push(Task {
            a: mid,
            b: task.b,
            tolerance: right_tolerance,
            depth: task.depth + 1,
            panel: right,
        });
        stack.push(Task {
            a: task.a,
            b: mid,
            tolerance: left_tolerance,
            depth: task.depth + 1,
            panel: left,
        });
    }

    let value = value.sum();
    let error = error.sum();

    debug!(
        value = to_f64(value),
        error = to_f64(error),
        evaluations,
        intervals,
        depth,
        failed,
        "adaptive integration finished"
    );

    if failed > 0 {
        return Err(Error::ConvergenceFailure {
            value: to_f64(value),
            error: to_f64(error),
            shortfall: to_f64(shortfall.sum()),
            evaluations,
        });
    }

    Ok(AdaptiveResult {
        value,
        error,
        evaluations,
        intervals,
        depth,
    })
}
