use numintir::callbacks::SimpleCumulativeCallback;
use numintir::core::estimators::BasicEstimators;
use numintir::core::*;
use numintir::integrators::plain::*;

use rand_pcg::Pcg64;
use tracing_subscriber::EnvFilter;

struct MyIntegrand;

/// Integrating the function x^2
/// from x=1 to x=3
/// Which gives the result: 26/3
impl Integrand<f64> for MyIntegrand {
    fn call(&self, x: &[f64]) -> f64 {
        x[0].powi(2)
    }

    /// The dimension of the integrand.
    ///
    /// This method is called by the integrator to decide how many random numbers to generate.
    fn dim(&self) -> usize {
        1
    }
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("NUMINTIR_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Initialize the random number generator.
    let rng = Pcg64::new(0xcafef00dd15ea5e5, 0xa02bdbf7bb3c0a7ac28fa16a64abf96);
    let domain = Domain::new(vec![(1.0, 3.0)])?;

    // log the cumulative result after every iteration
    let callback = SimpleCumulativeCallback {};

    let results_per_iteration = integrate(
        &MyIntegrand,
        &domain,
        &rng,
        &callback,
        4,
        &[100_000, 100_000, 100_000, 100_000],
    )?;

    // resuming from the last checkpoint continues with fresh random numbers
    let more = resume_from_checkpoint(
        &MyIntegrand,
        &domain,
        &results_per_iteration[3],
        &callback,
        4,
        &[100_000],
    )?;

    // combine
    let final_result = results_per_iteration
        .iter()
        .chain(&more)
        .map(|cp| cp.estimators().clone())
        .fold(PlainEstimators::default(), |acc, r| acc + r);

    println!("{} +- {} (exact: {})", final_result.mean(), final_result.std(), 26.0 / 3.0);

    Ok(())
}
