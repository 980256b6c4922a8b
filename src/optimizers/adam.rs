//! Adam (Adaptive Moment Estimation) update rule
//!
//! This module provides the Adam rule, which combines momentum and adaptive
//! per-parameter step sizes with bias correction.

use std::fmt;

use crate::error::{Error, Result};
use crate::optimizers::{state_slot, Optimizer};

/// Adam (Adaptive Moment Estimation).
///
/// Adam keeps two moving averages for each parameter:
///
/// 1. First moment (mean) of gradients (momentum)
/// 2. Second moment (uncentered variance) of gradients (adaptive step size)
///
/// The update rule is:
///
/// ```text
/// m_t = β1 * m_{t-1} + (1 - β1) * gradient
/// v_t = β2 * v_{t-1} + (1 - β2) * gradient²
/// m_hat = m_t / (1 - β1^t)
/// v_hat = v_t / (1 - β2^t)
/// θ = θ - α * m_hat / (√v_hat + ε)
/// ```
///
/// where:
/// - α (alpha) is the learning rate handed in by the trainer
/// - β1 (beta1) is the exponential decay rate for first moment estimates
/// - β2 (beta2) is the exponential decay rate for second moment estimates
/// - ε (epsilon) is a small constant for numerical stability
/// - t is the parameter's own step counter
///
/// Each parameter counts its committed steps separately. A fresh counter is
/// read as 1 for the first update and then moves to 2 once that update is
/// committed.
///
/// # Defaults
///
/// `beta1 = 0.9`, `beta2 = 0.9`, `epsilon = 1e-8`.
///
/// # Reference
///
/// Kingma, D. P., & Ba, J. (2014). Adam: A method for stochastic optimization.
/// arXiv preprint arXiv:1412.6980.
#[derive(Debug, Clone)]
pub struct Adam {
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    /// First moment estimates (momentum)
    m: Option<Vec<f64>>,
    /// Second moment estimates (adaptive step size)
    v: Option<Vec<f64>>,
    /// Per-parameter step counters for bias correction
    t: Vec<u32>,
}

fn validate_beta(arg: &'static str, beta: f64) -> Result<f64> {
    if !(0.0..1.0).contains(&beta) {
        return Err(Error::config(
            arg,
            format!("{arg} ({beta}) must be in [0, 1)"),
        ));
    }
    Ok(beta)
}

impl Adam {
    /// Creates a new Adam rule with the specified hyperparameters.
    ///
    /// # Arguments
    ///
    /// * `beta1` - Exponential decay rate for first moment estimates (0 <= β1 < 1)
    /// * `beta2` - Exponential decay rate for second moment estimates (0 <= β2 < 1)
    /// * `epsilon` - Small constant for numerical stability (must be positive)
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when a value is out of range.
    pub fn new(beta1: f64, beta2: f64, epsilon: f64) -> Result<Self> {
        let mut adam = Self::default();
        adam.set_beta1(beta1)?;
        adam.set_beta2(beta2)?;
        adam.set_epsilon(epsilon)?;
        Ok(adam)
    }

    /// First moment decay rate, in [0, 1).
    pub fn beta1(&self) -> f64 {
        self.beta1
    }

    /// Sets the first moment decay rate. Must be in [0, 1).
    pub fn set_beta1(&mut self, beta1: f64) -> Result<()> {
        self.beta1 = validate_beta("beta1", beta1)?;
        Ok(())
    }

    /// Second moment decay rate, in [0, 1).
    pub fn beta2(&self) -> f64 {
        self.beta2
    }

    /// Sets the second moment decay rate. Must be in [0, 1).
    pub fn set_beta2(&mut self, beta2: f64) -> Result<()> {
        self.beta2 = validate_beta("beta2", beta2)?;
        Ok(())
    }

    /// Denominator constant (> 0).
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Sets the denominator constant. Must be finite and > 0.
    pub fn set_epsilon(&mut self, epsilon: f64) -> Result<()> {
        if epsilon <= 0.0 || !epsilon.is_finite() {
            return Err(Error::config(
                "epsilon",
                format!("epsilon ({epsilon}) must be > 0"),
            ));
        }
        self.epsilon = epsilon;
        Ok(())
    }
}

impl Default for Adam {
    fn default() -> Self {
        Self {
            beta1: 0.9,
            beta2: 0.9,
            epsilon: 1e-8,
            m: None,
            v: None,
            t: Vec::new(),
        }
    }
}

impl fmt::Display for Adam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Adam: beta1 = {}, beta2 = {}, epsilon = {}",
            self.beta1, self.beta2, self.epsilon
        )
    }
}

impl Optimizer for Adam {
    /// Clears all moment estimates and step counters.
    fn reset(&mut self, parameter_count: usize) {
        self.m = Some(vec![0.0; parameter_count]);
        self.v = Some(vec![0.0; parameter_count]);
        self.t = vec![0; parameter_count];
    }

    /// Applies the Adam update with bias correction:
    /// 1. Update biased first moment estimate (momentum)
    /// 2. Update biased second moment estimate
    /// 3. Compute bias-corrected estimates with the parameter's step counter
    /// 4. Step the parameter using the corrected estimates
    fn update_one(
        &mut self,
        index: usize,
        learning_rate: f64,
        theta: f64,
        gradient: f64,
        commit: bool,
    ) -> Result<f64> {
        let m = state_slot(self.m.as_deref(), index, "Adam")?;
        let v = state_slot(self.v.as_deref(), index, "Adam")?;

        let m = self.beta1 * m + (1.0 - self.beta1) * gradient;
        let v = self.beta2 * v + (1.0 - self.beta2) * gradient * gradient;

        let t = self.t[index].max(1);
        let m_hat = m / (1.0 - self.beta1.powi(t as i32));
        let v_hat = v / (1.0 - self.beta2.powi(t as i32));

        let new_theta = theta - learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);

        if commit {
            if let (Some(ms), Some(vs)) = (self.m.as_mut(), self.v.as_mut()) {
                ms[index] = m;
                vs[index] = v;
            }
            self.t[index] = t.saturating_add(1);
        }

        Ok(new_theta)
    }
}
