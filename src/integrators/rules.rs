//! Base rules of the adaptive integrator.
//!
//! Every rule evaluates two embedded quadratures of different order on an interval. The
//! higher-order result is the estimate, the local error estimate is derived from the difference of
//! both results. Both rules are open, they never evaluate the integrand at the end points of the
//! interval.
//!
//! Two rules that agree can still both be wrong if the integrand oscillates faster than the nodes
//! resolve. The adaptive integrator therefore never accepts a single panel on its own, see
//! [`Rule::min_depth`] and [`Rule::cross_check`].
use crate::core::from_f64;

use num_traits::{Float, FromPrimitive};
use serde::{Deserialize, Serialize};

/// The base rule used by the adaptive integrator.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Rule {
    /// The 7-point Gauss rule embedded in the 15-point Kronrod rule.
    GaussKronrod15,
    /// The nested four-point rule with nodes at $1/6, 2/6, 4/6, 5/6$ of the interval: weights
    /// $(2, 1, 1, 2)/6$ against the plain average. After a bisection the inner two nodes of each
    /// half coincide with nodes of the parent, so every subdivision costs only four new evaluations.
    OpenFourPoint,
}

impl Default for Rule {
    fn default() -> Self {
        Self::GaussKronrod15
    }
}

/// The result of a rule on a single interval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Panel<T> {
    /// The estimate of the integral over the interval.
    pub value: T,
    /// The local error estimate, never negative.
    pub error: T,
    /// The number of new integrand evaluations.
    pub evaluations: usize,
    reuse: Option<[T; 4]>,
}

impl<T: Copy> Panel<T> {
    /// The values the left and right half of this interval can take over after a bisection.
    pub(crate) fn inherited(&self) -> (Option<[T; 2]>, Option<[T; 2]>) {
        match self.reuse {
            Some([f1, f2, f3, f4]) => (Some([f1, f2]), Some([f3, f4])),
            None => (None, None),
        }
    }
}

// Kronrod nodes in decreasing order; the odd ones are the Gauss nodes
const XGK: [f64; 8] = [
    0.991_455_371_120_812_639_206_854_697_526_329,
    0.949_107_912_342_758_524_526_189_684_047_851,
    0.864_864_423_359_769_072_789_712_788_640_926,
    0.741_531_185_599_394_439_863_864_773_280_788,
    0.586_087_235_467_691_130_294_144_838_258_730,
    0.405_845_151_377_397_166_906_606_412_076_961,
    0.207_784_955_007_898_467_600_689_403_773_245,
    0.0,
];

const WGK: [f64; 8] = [
    0.022_935_322_010_529_224_963_732_008_058_970,
    0.063_092_092_629_978_553_290_700_663_189_204,
    0.104_790_010_322_250_183_839_876_322_541_518,
    0.140_653_259_715_525_918_745_189_590_510_238,
    0.169_004_726_639_267_902_826_583_426_598_550,
    0.190_350_578_064_785_409_913_256_402_421_014,
    0.204_432_940_075_298_892_414_161_999_234_649,
    0.209_482_141_084_727_828_012_999_174_891_714,
];

const WG: [f64; 4] = [
    0.129_484_966_168_869_693_270_611_432_679_082,
    0.279_705_391_489_276_667_901_467_771_423_780,
    0.381_830_050_505_118_944_950_369_775_488_975,
    0.417_959_183_673_469_387_755_102_040_816_327,
];

impl Rule {
    /// The number of bisections of the whole interval before the integrator may accept a result.
    ///
    /// The nodes of the four-point rule and of all its subdivisions lie on a grid of sixths, which
    /// aliases with integrands oscillating at a multiple of the grid frequency.
    pub const fn min_depth(self) -> usize {
        match self {
            Self::GaussKronrod15 => 0,
            Self::OpenFourPoint => 2,
        }
    }

    /// An independent estimate of the integral over $[a, b]$ from nodes off the grid of the rule,
    /// together with the number of evaluations it cost. `None` if the rule doesn't need one.
    ///
    /// For the four-point rule this is the two-point Gauss-Legendre rule, which has the same
    /// polynomial degree but irrational nodes.
    pub fn cross_check<T, F>(self, f: &F, a: T, b: T) -> Option<(T, usize)>
    where
        T: Float + FromPrimitive,
        F: Fn(T) -> T + ?Sized,
    {
        match self {
            Self::GaussKronrod15 => None,
            Self::OpenFourPoint => {
                let half_length = (b - a) / (T::one() + T::one());
                let center = a + half_length;
                let dx = half_length / from_f64::<T>(3.0).sqrt();

                Some(((f(center - dx) + f(center + dx)) * half_length, 2))
            }
        }
    }

    /// Applies the rule to `f` on $[a, b]$.
    pub fn apply<T, F>(self, f: &F, a: T, b: T) -> Panel<T>
    where
        T: Float + FromPrimitive,
        F: Fn(T) -> T + ?Sized,
    {
        self.apply_with(f, a, b, None)
    }

    /// Applies the rule, reusing the `inherited` values of a parent interval if the rule can.
    pub(crate) fn apply_with<T, F>(self, f: &F, a: T, b: T, inherited: Option<[T; 2]>) -> Panel<T>
    where
        T: Float + FromPrimitive,
        F: Fn(T) -> T + ?Sized,
    {
        match self {
            Self::GaussKronrod15 => gauss_kronrod_15(f, a, b),
            Self::OpenFourPoint => open_four_point(f, a, b, inherited),
        }
    }
}

/// The 15-point Gauss-Kronrod rule with the error estimate of QUADPACK's `qk15`: the difference
/// to the embedded Gauss rule is scaled by the mean deviation of the integrand, `resasc`, as
/// $\text{resasc} \min(1, (200 |K - G| / \text{resasc})^{3/2})$, and never drops below the
/// rounding error of the sum.
fn gauss_kronrod_15<T, F>(f: &F, a: T, b: T) -> Panel<T>
where
    T: Float + FromPrimitive,
    F: Fn(T) -> T + ?Sized,
{
    let two = T::one() + T::one();
    let center = a + (b - a) / two;
    let half_length = (b - a) / two;

    let fc = f(center);
    let mut kronrod = fc * from_f64(WGK[7]);
    let mut gauss = fc * from_f64(WG[3]);
    let mut resabs = fc.abs() * from_f64(WGK[7]);
    let mut values = [(T::zero(), T::zero()); 7];

    for j in 0..7 {
        let dx = half_length * from_f64(XGK[j]);
        let (lower, upper) = (f(center - dx), f(center + dx));
        let weight = from_f64::<T>(WGK[j]);

        kronrod = kronrod + weight * (lower + upper);
        resabs = resabs + weight * (lower.abs() + upper.abs());
        values[j] = (lower, upper);

        if j % 2 == 1 {
            gauss = gauss + from_f64::<T>(WG[j / 2]) * (lower + upper);
        }
    }

    let mean = kronrod / two;
    let resasc = values
        .iter()
        .zip(&WGK)
        .fold(
            from_f64::<T>(WGK[7]) * (fc - mean).abs(),
            |resasc, (&(lower, upper), &weight)| {
                resasc + from_f64::<T>(weight) * ((lower - mean).abs() + (upper - mean).abs())
            },
        )
        * half_length.abs();
    let resabs = resabs * half_length.abs();

    let mut error = ((kronrod - gauss) * half_length).abs();

    if resasc != T::zero() && error != T::zero() {
        let scaled = from_f64::<T>(200.0) * error / resasc;
        error = resasc * T::one().min(scaled.powf(from_f64(1.5)));
    }

    let rounding = from_f64::<T>(50.0) * T::epsilon();

    if resabs > T::min_positive_value() / rounding {
        error = error.max(rounding * resabs);
    }

    Panel {
        value: kronrod * half_length,
        error,
        evaluations: 15,
        reuse: None,
    }
}

fn open_four_point<T, F>(f: &F, a: T, b: T, inherited: Option<[T; 2]>) -> Panel<T>
where
    T: Float + FromPrimitive,
    F: Fn(T) -> T + ?Sized,
{
    let h = b - a;
    let six = from_f64::<T>(6.0);
    let two = T::one() + T::one();
    let four = two + two;

    let f1 = f(a + h / six);
    let f4 = f(a + from_f64::<T>(5.0) * h / six);
    let (f2, f3, evaluations) = match inherited {
        Some([f2, f3]) => (f2, f3, 2),
        None => (f(a + two * h / six), f(a + four * h / six), 4),
    };

    let higher = (two * f1 + f2 + f3 + two * f4) / six * h;
    let lower = (f1 + f2 + f3 + f4) / four * h;

    Panel {
        value: higher,
        error: (higher - lower).abs(),
        evaluations,
        reuse: Some([f1, f2, f3, f4]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_gauss_kronrod_polynomial() {
        // G7 integrates polynomials up to degree 13 exactly, so only the rounding error remains
        let panel = Rule::GaussKronrod15.apply(&|x: f64| x.powi(13) + 3.0 * x * x, 0.0, 1.0);

        assert_approx_eq!(panel.value, 1.0 / 14.0 + 1.0, 1e-15);
        assert!(panel.error < 1e-13);
        assert_eq!(panel.evaluations, 15);
    }

    #[test]
    fn test_gauss_kronrod_weights_sum() {
        let panel = Rule::GaussKronrod15.apply(&|_: f64| 1.0, -1.0, 1.0);

        assert_approx_eq!(panel.value, 2.0, 1e-15);
        assert!(panel.error < 1e-13);
    }

    #[test]
    fn test_open_four_point_linear() {
        let panel = Rule::OpenFourPoint.apply(&|x: f64| 2.0 * x + 1.0, 0.0, 3.0);

        // both embedded rules are exact for linear functions
        assert_approx_eq!(panel.value, 12.0, 1e-14);
        assert!(panel.error < 1e-14);
        assert_eq!(panel.evaluations, 4);
    }

    #[test]
    fn test_open_four_point_reuse() {
        let f = |x: f64| x.exp();
        let parent = Rule::OpenFourPoint.apply(&f, 0.0, 1.0);
        let (left, right) = parent.inherited();

        let left = Rule::OpenFourPoint.apply_with(&f, 0.0, 0.5, left);
        let right = Rule::OpenFourPoint.apply_with(&f, 0.5, 1.0, right);

        assert_eq!(left.evaluations, 2);
        assert_eq!(right.evaluations, 2);
        assert_approx_eq!(left.value, Rule::OpenFourPoint.apply(&f, 0.0, 0.5).value, 1e-15);
        assert_approx_eq!(right.value, Rule::OpenFourPoint.apply(&f, 0.5, 1.0).value, 1e-15);
        assert_approx_eq!(left.value + right.value, 1.0_f64.exp() - 1.0, 1e-2);
    }

    #[test]
    fn test_gauss_kronrod_error_is_pessimistic() {
        // both embedded rules nearly agree on an unresolved oscillation
        let f = |x: f64| (63.5 * x).sin();
        let panel = Rule::GaussKronrod15.apply(&f, 0.0, 1.0);
        let exact = (1.0 - 63.5_f64.cos()) / 63.5;

        assert!(panel.error >= (panel.value - exact).abs());

        // the estimate is bounded by the mean deviation of the integrand
        let panel = Rule::GaussKronrod15.apply(&|x: f64| (40.0 * x).cos(), 0.0, 1.0);
        assert!(panel.error <= 1.0);
        assert!(panel.error > 0.0);
    }

    #[test]
    fn test_cross_check() {
        let f = |x: f64| x.powi(3) - x;

        assert_eq!(Rule::GaussKronrod15.cross_check(&f, 0.0, 2.0), None);

        let (value, evaluations) = Rule::OpenFourPoint.cross_check(&f, 0.0, 2.0).unwrap();
        assert_approx_eq!(value, 2.0, 1e-14);
        assert_eq!(evaluations, 2);

        assert_eq!(Rule::GaussKronrod15.min_depth(), 0);
        assert_eq!(Rule::OpenFourPoint.min_depth(), 2);
    }

    #[test]
    fn test_rules_are_open() {
        let f = |x: f64| 1.0 / x.sqrt();

        assert!(Rule::GaussKronrod15.apply(&f, 0.0, 1.0).value.is_finite());
        assert!(Rule::OpenFourPoint.apply(&f, 0.0, 1.0).value.is_finite());
    }
}
