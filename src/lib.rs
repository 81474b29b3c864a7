#![warn(clippy::all, clippy::cargo, clippy::nursery, clippy::pedantic)]
#![warn(missing_docs)]

//! The crate `numintir` provides routines to approximate definite [integrals] numerically, and to
//! study how fast the approximations converge:
//!
//! - [adaptive quadrature] of one-dimensional integrals to a requested absolute accuracy, over
//! finite, semi-infinite and infinite intervals,
//! - [Monte Carlo integration] over hyper-rectangles, with independent uniform samples (*plain*
//! Monte Carlo) or with the points of a low-discrepancy sequence (*quasi*-Monte Carlo), and
//! - convergence sweeps, which evaluate one integral for a series of sample counts or tolerances
//! and compare every estimate with a known reference value.
//!
//! # Features
//!
//! - **Generic numeric type**. The numeric type used in this library is not fixed, but instead a
//! generic parameter, so that the integration routines can be used with either `f32`, `f64`, or a
//! custom numeric type that implements the `Float` trait from the `num-traits` crate.
//! - **Generic random number generator**. Every random number generator that implements the `Rng`
//! trait from the `rand` crate can be used with the Monte Carlo integrators. The generator is
//! always passed explicitly and owned by the caller; there is no global random state.
//! - **Reproducibility**. As far as the numeric type allows this, all results produced with
//! `numintir` are completely reproducible, in the sense that the results only depend on the used
//! random number generator and the chosen seed. In particular, the results do not depend on the
//! number of cores the integrator was started with. Low-discrepancy sequences are pure functions of
//! the point index and give bit-identical results on every run.
//! - **Non-finite number filtering**. The Monte Carlo integrators filter out non-finite numbers such
//! as `inf` or `nan`, which integrands sometimes produce in extreme regions of their integration
//! domain due to finite numerical precision. When this happens the result of the corresponding
//! call is set to zero to not destroy the integration and a counter is increased that keeps track
//! of how often this happened.
//! - **Checkpoints**. Plain Monte Carlo integrations can be split into iterations. After each
//! iteration a checkpoint with the state of the random number generator is saved, which allows to
//! resume the integration or to replay it from there, without a difference in the final results.
//! - **No silent failures**. The adaptive integrator either meets the requested accuracy or returns
//! [`Error::ConvergenceFailure`] together with the best estimate it could achieve.
//!
//! # How do I get started?
//!
//! ```
//! use numintir::integrators::adaptive::{integrate, AdaptiveConfig};
//! use numintir::integrators::quasi;
//! use numintir::sequences::Sobol;
//! use numintir::{Domain, FnIntegrand, Interval};
//!
//! // int_0^1 dx exp(-x^2) with adaptive quadrature
//! let result = integrate(
//!     |x: f64| (-x * x).exp(),
//!     &Interval::new(0.0, 1.0).unwrap(),
//!     1e-10,
//!     &AdaptiveConfig::default(),
//! )
//! .unwrap();
//! assert!((result.value - 0.746_824_132_812_427).abs() < 1e-10);
//!
//! // int_0^1 int_0^1 dx dy (x + y) with the first 1024 points of the Sobol' sequence
//! let integrand = FnIntegrand::new(2, |x: &[f64]| x[0] + x[1]);
//! let estimate = quasi::estimate(&integrand, &Domain::unit(2), &Sobol, 1024).unwrap();
//! assert!((estimate.value - 1.0).abs() < 1e-2);
//! ```
//!
//! # What is ...?
//!
//! This section is a dictionary of terms that are used in this documentation. Given
//!
//! $$ I = \prod_{i=1}^d \int_0^1 \mathrm{d} x_i f(x_1, x_2, \ldots, x_d) $$
//!
//! we approximate $I$ using Monte Carlo integration with
//!
//! $$ I \approx \frac{1}{N} \sum_{j=1}^N f \left( x_1^{(j)}, x_2^{(j)}, \ldots, x_d^{(j)} \right)
//! $$
//!
//! where for each $j$ the values of the arguments are either uniformly distributed in $[0,1)$ or
//! the $j$-th point of a low-discrepancy sequence. We use the following terms:
//!
//! - the number of *calls* or the *sample size* is $N$, which is the number of times the integrand
//! is evaluated. We assume that this is the expensive operation;
//! - the *integrand* is the function, $f(x_1, x_2, \ldots, x_d)$, that is being integrated,
//! - the number of *dimensions*, $d$, is number of dimensions of the integration domain,
//! - the *integral* is the (approximated) numeric value of the integral $I$,
//! - the *accuracy* or *tolerance* is the absolute error the adaptive integrator is asked to meet,
//! - a *rule* is a fixed weighted sum of integrand values that approximates the integral over a
//! single interval; the adaptive integrator refines the intervals on which its rule is not yet
//! accurate enough.
//!
//! [adaptive quadrature]: https://en.wikipedia.org/wiki/Adaptive_quadrature
//! [Monte Carlo integration]: https://en.wikipedia.org/wiki/Monte_Carlo_integration
//! [integrals]: https://en.wikipedia.org/wiki/Integral

pub mod callbacks;
pub mod core;
pub mod harness;
pub mod integrators;
pub mod sequences;
pub mod special;

pub use crate::core::*;
