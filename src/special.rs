//! Special functions evaluated with the adaptive integrator.
use crate::core::{Error, Interval};
use crate::integrators::adaptive::{self, AdaptiveConfig};

use std::f64::consts::PI;

/// The error function
///
/// $$ \mathrm{erf}(z) = \frac{2}{\sqrt{\pi}} \int_0^z \mathrm{d}t \, e^{-t^2} $$
///
/// to the absolute accuracy `acc`. For $z > 1$ the complement
/// $1 - \frac{2}{\sqrt{\pi}} \int_z^\infty \mathrm{d}t \, e^{-t^2}$ is integrated instead, negative
/// arguments use $\mathrm{erf}(-z) = -\mathrm{erf}(z)$.
///
/// # Errors
///
/// Fails with [`Error::InvalidTolerance`] if `acc` is not positive and with
/// [`Error::ConvergenceFailure`] if the integrator does not reach `acc`.
///
/// ```
/// let erf = numintir::special::erf(1.0, 1e-10).unwrap();
///
/// assert!((erf - 0.842_700_792_949_714_9).abs() < 1e-10);
/// ```
pub fn erf(z: f64, acc: f64) -> Result<f64, Error> {
    // also rejects NaN
    if !(acc > 0.0) {
        return Err(Error::InvalidTolerance { acc });
    }

    if z < 0.0 {
        return erf(-z, acc).map(|erf| -erf);
    }

    let norm = 2.0 / PI.sqrt();
    let gaussian = |t: f64| (-t * t).exp();
    let config = AdaptiveConfig::default();

    if z.is_nan() {
        Ok(z)
    } else if z <= 1.0 {
        let interval = Interval::new(0.0, z)?;
        let result = adaptive::integrate(gaussian, &interval, acc / norm, &config)?;

        Ok(norm * result.value)
    } else if z.is_finite() {
        let interval = Interval::new(z, f64::INFINITY)?;
        let result = adaptive::integrate(gaussian, &interval, acc / norm, &config)?;

        Ok(1.0 - norm * result.value)
    } else {
        Ok(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_approx_eq::assert_approx_eq;

    const ERF_ONE: f64 = 0.842_700_792_949_714_869_34;

    #[test]
    fn test_erf_accuracy_sweep() {
        for exponent in 1..=8 {
            let acc = 10.0_f64.powi(-exponent);
            let erf = erf(1.0, acc).unwrap();

            assert!((erf - ERF_ONE).abs() <= acc, "acc = {}", acc);
        }
    }

    #[test]
    fn test_erf_values() {
        assert_eq!(erf(0.0, 1e-10).unwrap(), 0.0);
        assert_approx_eq!(erf(0.5, 1e-12).unwrap(), 0.520_499_877_813_046_5, 1e-12);
        assert_approx_eq!(erf(2.0, 1e-12).unwrap(), 0.995_322_265_018_952_7, 1e-12);
        assert_approx_eq!(erf(3.0, 1e-12).unwrap(), 0.999_977_909_503_001_4, 1e-12);
        assert_eq!(erf(f64::INFINITY, 1e-10).unwrap(), 1.0);
        assert_eq!(erf(f64::NEG_INFINITY, 1e-10).unwrap(), -1.0);
        assert!(erf(f64::NAN, 1e-10).unwrap().is_nan());
    }

    #[test]
    fn test_erf_is_odd() {
        for &z in &[0.25, 1.0, 1.5, 4.0] {
            assert_eq!(erf(-z, 1e-10).unwrap(), -erf(z, 1e-10).unwrap());
        }
    }

    #[test]
    fn test_erf_invalid_accuracy() {
        assert_eq!(erf(1.0, 0.0), Err(Error::InvalidTolerance { acc: 0.0 }));
        assert_eq!(erf(-2.0, -1.0), Err(Error::InvalidTolerance { acc: -1.0 }));
        assert_eq!(erf(f64::INFINITY, -1.0), Err(Error::InvalidTolerance { acc: -1.0 }));
    }
}
