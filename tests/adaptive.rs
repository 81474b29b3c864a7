use numintir::integrators::adaptive::{self, AdaptiveConfig, SplitPolicy, Substitution};
use numintir::integrators::rules::Rule;
use numintir::{Error, Interval};

use assert_approx_eq::assert_approx_eq;
use proptest::prelude::*;
use std::f64::consts::PI;

type Case = (&'static str, fn(f64) -> f64, f64, f64, f64);

fn gauss(x: f64) -> f64 {
    (-x * x).exp()
}

fn circle(x: f64) -> f64 {
    (1.0 - x * x).max(0.0).sqrt()
}

fn cosine(x: f64) -> f64 {
    (10.0 * x).cos()
}

fn log1p(x: f64) -> f64 {
    x.ln_1p()
}

const GAUSS: Case = ("gauss", gauss, 0.0, 1.0, 0.746_824_132_812_427_0);
const CIRCLE: Case = ("circle", circle, 0.0, 1.0, PI / 4.0);
const LOG1P: Case = ("log1p", log1p, 0.0, 1.0, 0.386_294_361_119_890_6);

fn cosine_case() -> Case {
    ("cosine", cosine, 0.0, 2.0, 20.0_f64.sin() / 10.0)
}

fn config(rule: Rule, split: SplitPolicy) -> AdaptiveConfig {
    AdaptiveConfig {
        rule,
        split,
        ..AdaptiveConfig::default()
    }
}

#[test]
fn gaussian_to_four_digits() {
    let interval = Interval::new(0.0, 1.0).unwrap();
    let result = adaptive::integrate(gauss, &interval, 1e-4, &AdaptiveConfig::default()).unwrap();

    assert_approx_eq!(result.value, 0.746_824_132_812_427_0, 1e-4);
}

/// Integrates every case to the accuracies `1e-1` down to `1e-<digits>`, where `digits` is given
/// next to the case.
fn check_accuracy_sweep(cases: &[(Case, i32)], config: &AdaptiveConfig) {
    for &((name, f, a, b, exact), digits) in cases {
        let interval = Interval::new(a, b).unwrap();
        let mut previous_error = f64::INFINITY;

        for exponent in 1..=digits {
            let acc = 10.0_f64.powi(-exponent);
            let result = adaptive::integrate(f, &interval, acc, config).unwrap();

            assert!(
                (result.value - exact).abs() <= acc,
                "{} with {:?}: |{} - {}| > {}",
                name,
                config,
                result.value,
                exact,
                acc
            );
            assert!(result.error <= acc);
            assert!(result.error <= previous_error, "{} with {:?}", name, config);

            previous_error = result.error;
        }
    }
}

#[test]
fn gauss_kronrod_meets_every_accuracy() {
    // the square root singularity of the circle's derivative needs the recycled tolerance at 1e-10
    let halve = [(GAUSS, 10), (CIRCLE, 9), (cosine_case(), 10), (LOG1P, 10)];
    let recycle = [(GAUSS, 10), (CIRCLE, 10), (cosine_case(), 10), (LOG1P, 10)];

    check_accuracy_sweep(&halve, &config(Rule::GaussKronrod15, SplitPolicy::Halve));
    check_accuracy_sweep(&recycle, &config(Rule::GaussKronrod15, SplitPolicy::Recycle));
}

#[test]
fn open_four_point_meets_every_accuracy() {
    let halve = [(GAUSS, 10), (CIRCLE, 8), (cosine_case(), 10), (LOG1P, 10)];
    let recycle = [(GAUSS, 10), (CIRCLE, 9), (cosine_case(), 10), (LOG1P, 10)];

    check_accuracy_sweep(&halve, &config(Rule::OpenFourPoint, SplitPolicy::Halve));
    check_accuracy_sweep(&recycle, &config(Rule::OpenFourPoint, SplitPolicy::Recycle));
}

#[test]
fn oscillations_never_pass_for_convergence() {
    let interval = Interval::new(0.0, 1.0).unwrap();

    for &rule in &[Rule::GaussKronrod15, Rule::OpenFourPoint] {
        for &split in &[SplitPolicy::Halve, SplitPolicy::Recycle] {
            let config = AdaptiveConfig {
                max_evaluations: 20_000,
                ..config(rule, split)
            };

            for step in 1..=300 {
                let omega = 0.5 * f64::from(step);
                let f = |x: f64| (omega * x).sin();
                let exact = (1.0 - omega.cos()) / omega;

                for exponent in 1..=10 {
                    let acc = 10.0_f64.powi(-exponent);

                    // running out of evaluations is fine, claiming a wrong result is not
                    match adaptive::integrate(f, &interval, acc, &config) {
                        Ok(result) => {
                            assert!(
                                (result.value - exact).abs() <= acc,
                                "sin({} x) with {:?} to {}: got {}, expected {}",
                                omega,
                                config,
                                acc,
                                result.value,
                                exact
                            );
                            assert!(result.error <= acc);
                        }
                        Err(error) => assert!(error.is_convergence_failure()),
                    }
                }
            }
        }
    }

    // the higher order rule resolves every frequency within the budget
    let config = AdaptiveConfig {
        max_evaluations: 20_000,
        ..AdaptiveConfig::default()
    };
    let result =
        adaptive::integrate(|x: f64| (150.0 * x).sin(), &interval, 1e-10, &config).unwrap();
    assert_approx_eq!(result.value, (1.0 - 150.0_f64.cos()) / 150.0, 1e-10);
}

#[test]
fn higher_order_rule_needs_fewer_evaluations() {
    let interval = Interval::new(0.0, 1.0).unwrap();
    let gk = adaptive::integrate(
        gauss,
        &interval,
        1e-8,
        &config(Rule::GaussKronrod15, SplitPolicy::Halve),
    )
    .unwrap();
    let open = adaptive::integrate(
        gauss,
        &interval,
        1e-8,
        &config(Rule::OpenFourPoint, SplitPolicy::Halve),
    )
    .unwrap();

    assert!(gk.evaluations < open.evaluations);
    assert!(open.intervals > 1);
    assert!(open.depth > 0);
}

#[test]
fn end_point_singularities() {
    let interval = Interval::new(0.0, 1.0).unwrap();
    let inv_sqrt = |x: f64| 1.0 / x.sqrt();
    let log_inv_sqrt = |x: f64| x.ln() / x.sqrt();

    let recycle = config(Rule::GaussKronrod15, SplitPolicy::Recycle);
    let result = adaptive::integrate(inv_sqrt, &interval, 1e-6, &recycle).unwrap();
    assert_approx_eq!(result.value, 2.0, 1e-5);

    let result = adaptive::integrate(log_inv_sqrt, &interval, 1e-5, &recycle).unwrap();
    assert_approx_eq!(result.value, -4.0, 1e-5);

    let clenshaw_curtis = AdaptiveConfig {
        substitution: Substitution::ClenshawCurtis,
        ..recycle
    };
    let result = adaptive::integrate(log_inv_sqrt, &interval, 1e-6, &clenshaw_curtis).unwrap();
    assert_approx_eq!(result.value, -4.0, 1e-5);
}

#[test]
fn failures_carry_the_best_estimate() {
    let interval = Interval::new(0.0, 1.0).unwrap();
    let halve = config(Rule::GaussKronrod15, SplitPolicy::Halve);

    match adaptive::integrate(|x: f64| 1.0 / x.sqrt(), &interval, 1e-6, &halve) {
        Err(Error::ConvergenceFailure {
            value,
            error,
            shortfall,
            evaluations,
        }) => {
            assert_approx_eq!(value, 2.0, 1e-4);
            assert!(error > 0.0);
            assert!(shortfall > 0.0);
            assert!(evaluations > 0);
        }
        other => panic!("expected a convergence failure, got {:?}", other),
    }
}

#[test]
fn infinite_intervals() {
    let config = AdaptiveConfig::default();

    let upper = Interval::new(1.0, f64::INFINITY).unwrap();
    let result = adaptive::integrate(|x: f64| 1.0 / (x * x), &upper, 1e-8, &config).unwrap();
    assert_approx_eq!(result.value, 1.0, 1e-8);

    let line = Interval::new(f64::NEG_INFINITY, f64::INFINITY).unwrap();
    let result = adaptive::integrate(|x: f64| 1.0 / (1.0 + x * x), &line, 1e-8, &config).unwrap();
    assert_approx_eq!(result.value, PI, 1e-8);
}

#[test]
fn config_round_trip() {
    let config = AdaptiveConfig {
        rule: Rule::OpenFourPoint,
        split: SplitPolicy::Recycle,
        substitution: Substitution::ClenshawCurtis,
        min_depth: 3,
        max_depth: 20,
        max_evaluations: 1000,
        rel_tolerance: 1e-6,
    };

    let json = serde_json::to_string(&config).unwrap();

    assert_eq!(serde_json::from_str::<AdaptiveConfig>(&json).unwrap(), config);
}

proptest! {
    #[test]
    fn exponentials_meet_the_accuracy(k in -5.0_f64..5.0, recycle in any::<bool>(), gk in any::<bool>()) {
        let exact = if k == 0.0 { 1.0 } else { k.exp_m1() / k };
        let config = config(
            if gk { Rule::GaussKronrod15 } else { Rule::OpenFourPoint },
            if recycle { SplitPolicy::Recycle } else { SplitPolicy::Halve },
        );
        let interval = Interval::new(0.0, 1.0).unwrap();

        let result = adaptive::integrate(|x: f64| (k * x).exp(), &interval, 1e-9, &config).unwrap();

        prop_assert!((result.value - exact).abs() <= 1e-9);
    }

    #[test]
    fn shifted_intervals_add_up(a in -3.0_f64..3.0, width in 0.0_f64..3.0, split in 0.0_f64..1.0) {
        let c = a + split * width;
        let b = a + width;
        let config = AdaptiveConfig::default();
        let integral = |lo: f64, hi: f64| {
            adaptive::integrate(gauss, &Interval::new(lo, hi).unwrap(), 1e-10, &config)
                .unwrap()
                .value
        };

        prop_assert!((integral(a, c) + integral(c, b) - integral(a, b)).abs() <= 3e-10);
    }
}
