//! Update rules for gradient descent
//!
//! This module provides the Optimizer trait and the update rules the trainer
//! can plug in to turn an averaged gradient into new parameter values.
//!
//! # Overview
//!
//! The basic gradient descent update is `theta = theta - learning_rate * gradient`.
//! Momentum-based rules carry a per-parameter velocity between epochs, while
//! adaptive rules (Adagrad, Adam) scale each parameter's step by statistics of
//! its gradient history.
//!
//! # Available Optimizers
//!
//! - StandardGD: Vanilla gradient descent
//! - Momentum: Gradient descent with a velocity term
//! - NesterovMomentum: Look-ahead variant of the momentum rule
//! - Adagrad: Step scaled by the accumulated squared gradient
//! - Adam: Adaptive moment estimation with bias correction
//!
//! # Example
//!
//! ```
//! use rust_gradient_descent::optimizers::{Adam, Optimizer};
//!
//! let mut optimizer = Adam::default();
//! optimizer.reset(2);
//!
//! let theta = optimizer.update_all(0.1, &[1.0, 2.0], &[0.5, -0.5]).unwrap();
//! assert!(theta[0] < 1.0);
//! assert!(theta[1] > 2.0);
//! ```

pub mod adagrad;
pub mod adam;
pub mod momentum;
pub mod sgd;

pub use adagrad::Adagrad;
pub use adam::Adam;
pub use momentum::{Momentum, NesterovMomentum};
pub use sgd::StandardGD;

use std::fmt;

use crate::error::{Error, Result};

/// Core trait for gradient descent update rules.
///
/// All update rules implement this trait so the trainer can swap them without
/// knowing which one is in use.
///
/// # State Management
///
/// Stateful rules (momentum velocity, Adagrad's squared-gradient sum, Adam's
/// moment estimates and step counters) keep one entry per parameter. That
/// state only comes into existence through [`Optimizer::reset`]; calling
/// [`Optimizer::update_one`] on a stateful rule before `reset` is an
/// [`Error::InvalidState`].
pub trait Optimizer: fmt::Display {
    /// Allocate (or re-allocate) zeroed internal state for `parameter_count`
    /// parameters.
    fn reset(&mut self, parameter_count: usize);

    /// Compute the new value of a single parameter.
    ///
    /// # Arguments
    ///
    /// * `index` - Position of the parameter in the parameter vector
    /// * `learning_rate` - Step size for this epoch
    /// * `theta` - Current parameter value
    /// * `gradient` - Gradient of the loss with respect to this parameter
    /// * `commit` - When false the internal state is left untouched, so the
    ///   call can be used to evaluate a candidate step
    fn update_one(
        &mut self,
        index: usize,
        learning_rate: f64,
        theta: f64,
        gradient: f64,
        commit: bool,
    ) -> Result<f64>;

    /// Update every parameter, committing the internal state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if `theta` and `gradients` differ in
    /// length, or whatever [`Optimizer::update_one`] reports.
    fn update_all(
        &mut self,
        learning_rate: f64,
        theta: &[f64],
        gradients: &[f64],
    ) -> Result<Vec<f64>> {
        if theta.len() != gradients.len() {
            return Err(Error::LengthMismatch {
                what: "gradients",
                expected: theta.len(),
                got: gradients.len(),
            });
        }

        theta
            .iter()
            .zip(gradients)
            .enumerate()
            .map(|(i, (&t, &g))| self.update_one(i, learning_rate, t, g, true))
            .collect()
    }
}

/// Look up the per-parameter state slot for `index`.
///
/// `state` is `None` until the owning rule has been reset.
pub(crate) fn state_slot(state: Option<&[f64]>, index: usize, name: &str) -> Result<f64> {
    let state = state.ok_or_else(|| Error::not_reset(name))?;
    state.get(index).copied().ok_or_else(|| Error::InvalidState {
        reason: format!(
            "{name}: parameter index {index} out of range for {} parameters",
            state.len()
        ),
    })
}
