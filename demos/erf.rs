use numintir::integrators::adaptive::{self, AdaptiveConfig, SplitPolicy, Substitution};
use numintir::special::erf;
use numintir::{Error, Interval};

use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("NUMINTIR_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("# z erf(z)");
    for step in -30..=30 {
        let z = f64::from(step) / 10.0;
        println!("{:5.2} {:.15}", z, erf(z, 1e-12)?);
    }

    // end-point singularities with the different strategies of the integrator
    let unit = Interval::new(0.0, 1.0)?;
    let strategies = [
        ("halve", AdaptiveConfig::default()),
        (
            "recycle",
            AdaptiveConfig {
                split: SplitPolicy::Recycle,
                ..AdaptiveConfig::default()
            },
        ),
        (
            "clenshaw-curtis",
            AdaptiveConfig {
                substitution: Substitution::ClenshawCurtis,
                ..AdaptiveConfig::default()
            },
        ),
    ];

    println!();
    println!("# strategy value error evaluations (int_0^1 dx 1/sqrt(x) = 2)");
    for (name, config) in &strategies {
        match adaptive::integrate(|x: f64| 1.0 / x.sqrt(), &unit, 1e-8, config) {
            Ok(result) => println!(
                "{} {} {:e} {}",
                name, result.value, result.error, result.evaluations
            ),
            Err(Error::ConvergenceFailure {
                value,
                error,
                evaluations,
                ..
            }) => println!("{} {} {:e} {} (failed)", name, value, error, evaluations),
            Err(err) => return Err(err),
        }
    }

    Ok(())
}
