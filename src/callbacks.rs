//! Implementation of different callback functions.
use crate::core::estimators::Estimators;
use crate::core::Checkpoint;
use num_traits::{Float, FromPrimitive};
use std::fmt::Display;
use std::ops::Add;
use tracing::info;

/// Trait for implementing callbacks for iterative MC algorithms
pub trait Callback<T, R, E> {
    /// This method is called after each successfully finished iteration and may report information
    /// about it.
    fn print(&self, chkpts: &[Checkpoint<R, E>]);
}

/// A callback function that does nothing
pub struct SinkCallback {}

impl<T, R, E> Callback<T, R, E> for SinkCallback {
    fn print(&self, _: &[Checkpoint<R, E>]) {}
}

/// A callback function that logs the result of each individual iteration
pub struct SimpleCallback {}

impl<T, R, E> Callback<T, R, E> for SimpleCallback
where
    T: Display + Float + FromPrimitive,
    E: Estimators<T>,
{
    fn print(&self, chkpts: &[Checkpoint<R, E>]) {
        // Make sure that there is at least one checkpoint
        // otherwise do nothing.
        if let Some(chkpt) = chkpts.last() {
            let estimators = chkpt.estimators();

            info!(
                iteration = chkpts.len() - 1,
                calls = estimators.calls(),
                non_finite_calls = estimators.non_finite_calls(),
                "E={} \u{b1} {}",
                estimators.mean(),
                estimators.std()
            );
        }
    }
}

/// Simple cumulative callback that logs the result of the individual integration
/// together with the cumulative result combining it with the previous iterations.
pub struct SimpleCumulativeCallback {}

impl<T, R, E> Callback<T, R, E> for SimpleCumulativeCallback
where
    T: Display + Float + FromPrimitive,
    E: Clone + Default + Estimators<T> + Add<Output = E>,
{
    fn print(&self, chkpts: &[Checkpoint<R, E>]) {
        let last = match chkpts.last() {
            Some(chkpt) => chkpt.estimators(),
            None => return,
        };

        // Compute the cumulative result.
        let cumulative = chkpts
            .iter()
            .map(Checkpoint::estimators)
            .fold(E::default(), |acc, e| acc + e.clone());

        info!(
            iteration = chkpts.len() - 1,
            "[N={} E={} \u{b1} {}] [Cumulative: N={}, E={} \u{b1} {}]",
            last.calls(),
            last.mean(),
            last.std(),
            cumulative.calls(),
            cumulative.mean(),
            cumulative.std()
        );
    }
}
