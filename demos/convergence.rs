//! Prints `(parameter, absolute error, label)` triples of three convergence studies, ready to be
//! plotted on log-log axes:
//!
//! - the area of the unit circle with plain and quasi Monte Carlo for $N = 10^0, \ldots, 10^6$,
//! - a smooth three-dimensional integral with the same sample counts, and
//! - $\mathrm{erf}(1)$ with adaptive quadrature for tolerances $10^{-1}, \ldots, 10^{-10}$.
use numintir::core::{Domain, Error, FnIntegrand};
use numintir::harness::{sweep, EstimateRecord, Sweep};
use numintir::integrators::adaptive::AdaptiveConfig;
use numintir::sequences::{Halton, Sobol};

use rand_pcg::Pcg64;
use std::f64::consts::PI;
use tracing_subscriber::EnvFilter;

fn print(title: &str, records: &[EstimateRecord]) {
    println!("# {}", title);

    for record in records {
        let (parameter, error, label) = record.triple();
        println!("{:e} {:e} {}", parameter, error, label);
    }

    println!();
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("NUMINTIR_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let sample_counts: Vec<_> = (0..=6).map(|k| 10_usize.pow(k)).collect();

    let circle = FnIntegrand::new(2, |x: &[f64]| {
        if x[0] * x[0] + x[1] * x[1] <= 1.0 {
            1.0
        } else {
            0.0
        }
    });
    let square = Domain::new(vec![(-1.0, 1.0), (-1.0, 1.0)])?;
    let mut method = Sweep::Sampling {
        rng: Pcg64::new(0xcafef00dd15ea5e5, 0xa02bdbf7bb3c0a7ac28fa16a64abf96),
        sequence: Halton,
        sample_counts: sample_counts.clone(),
    };
    print("unit circle", &sweep(&mut method, &circle, &square, PI)?);

    // int_0^pi int_0^pi int_0^pi sin(x) sin(y) sin(z) = 8
    let sines = FnIntegrand::new(3, |x: &[f64]| x.iter().map(|xi| xi.sin()).product::<f64>());
    let cube = Domain::new(vec![(0.0, PI); 3])?;
    let mut method = Sweep::Sampling {
        rng: Pcg64::new(0xcafef00dd15ea5e5, 0xa02bdbf7bb3c0a7ac28fa16a64abf96),
        sequence: Sobol,
        sample_counts,
    };
    print("product of sines", &sweep(&mut method, &sines, &cube, 8.0)?);

    let norm = 2.0 / PI.sqrt();
    let gauss = FnIntegrand::new(1, move |x: &[f64]| norm * (-x[0] * x[0]).exp());
    let mut method = Sweep::<Pcg64, Sobol>::Adaptive {
        config: AdaptiveConfig::default(),
        tolerances: (1..=10).map(|k| 10.0_f64.powi(-k)).collect(),
    };
    print(
        "erf(1)",
        &sweep(&mut method, &gauss, &Domain::unit(1), 0.842_700_792_949_714_9)?,
    );

    Ok(())
}
