//! This module contains everything related to estimators.
use num_traits::Float;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Basic estimators, like the mean, variance, and the standard deviation.
pub trait BasicEstimators<T: Float> {
    /// Returns the mean value.
    fn mean(&self) -> T;

    /// Returns the variance, $V$.
    fn var(&self) -> T;

    /// Returns the standard deviation, $\sigma = \sqrt{V}$.
    fn std(&self) -> T {
        self.var().sqrt()
    }
}

/// More estimators.
pub trait Estimators<T: Float>: BasicEstimators<T> {
    /// Returns the number of times $N$, the integrand has been called.
    fn calls(&self) -> usize;

    /// Returns the number of times, $N_\mathrm{nf}$, the integrand has been called
    /// and its return value was non-finite.
    fn non_finite_calls(&self) -> usize;

    /// Returns the number of times, $N_\mathrm{nz}$, the integrand has been called
    /// and its return value was non-zero.
    fn non_zero_calls(&self) -> usize;
}

/// A running sum with Kahan compensation.
///
/// Sample counts of $10^8$ and more are common in convergence studies; a naive running sum would
/// lose the low-order digits of every addend once the total has grown large.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub struct KahanSum<T> {
    sum: T,
    compensation: T,
}

impl<T: Float> Default for KahanSum<T> {
    fn default() -> Self {
        Self {
            sum: T::zero(),
            compensation: T::zero(),
        }
    }
}

impl<T: Float> KahanSum<T> {
    /// An empty sum.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` to the sum.
    pub fn push(&mut self, value: T) {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }

    /// Returns the compensated total.
    pub fn sum(&self) -> T {
        self.sum - self.compensation
    }
}

impl<T: Float> Add for KahanSum<T> {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self.push(other.sum);
        self.push(-other.compensation);
        self
    }
}

impl<T: Float> AddAssign for KahanSum<T> {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl<T: Float> std::iter::FromIterator<T> for KahanSum<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), |mut acc, value| {
            acc.push(value);
            acc
        })
    }
}
