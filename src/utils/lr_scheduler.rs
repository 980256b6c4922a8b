//! Learning rate decay trait and implementations
//!
//! This module defines the LearningRateDecay trait used by the trainer to pick
//! the learning rate of each epoch. Decay policies can shrink the rate on a
//! fixed schedule (exponential, 1/t, step) or react to stalled loss (jump).

use std::fmt;

use crate::error::{Error, Result};

/// Core trait for learning rate decay policies.
///
/// The trainer asks the policy for a rate at the start of every epoch, handing
/// in the configured initial rate, the rate used in the previous epoch, the
/// zero-based epoch index, and the loss reached by the previous epoch (`None`
/// on the first epoch).
///
/// # Example
///
/// ```
/// use rust_gradient_descent::utils::lr_scheduler::{LearningRateDecay, StepDecay};
///
/// let mut decay = StepDecay::new(0.5, 10.0).unwrap();
/// decay.reset();
///
/// let lr = decay.next_lr(0.1, 0.1, 10, Some(1.0));
/// assert!((lr - 0.05).abs() < 1e-12);
/// ```
pub trait LearningRateDecay: fmt::Display {
    /// Clear any state collected during a previous run.
    ///
    /// Stateless policies implement this as a no-op.
    fn reset(&mut self);

    /// Compute the learning rate for `epoch`.
    fn next_lr(
        &mut self,
        init_lr: f64,
        current_lr: f64,
        epoch: usize,
        previous_loss: Option<f64>,
    ) -> f64;
}

fn validate_positive(arg: &'static str, value: f64) -> Result<f64> {
    if value <= 0.0 || !value.is_finite() {
        return Err(Error::config(arg, format!("{arg} ({value}) must be > 0")));
    }
    Ok(value)
}

fn validate_non_negative(arg: &'static str, value: f64) -> Result<f64> {
    if value < 0.0 || !value.is_finite() {
        return Err(Error::config(arg, format!("{arg} ({value}) must be >= 0")));
    }
    Ok(value)
}

/// Exponential decay.
///
/// Formula: lr = init_lr * alpha * exp(-k * epoch)
///
/// Defaults: `alpha = 0.96`, `k = 0.01`.
#[derive(Debug, Clone)]
pub struct ExponentialDecay {
    alpha: f64,
    k: f64,
}

impl ExponentialDecay {
    /// Creates an exponential decay policy.
    ///
    /// # Arguments
    ///
    /// * `alpha` - Scale applied to the initial rate (must be > 0)
    /// * `k` - Decay speed (must be >= 0)
    pub fn new(alpha: f64, k: f64) -> Result<Self> {
        Ok(Self {
            alpha: validate_positive("alpha", alpha)?,
            k: validate_non_negative("k", k)?,
        })
    }

    /// Scale factor (> 0).
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Sets the scale factor. Must be finite and > 0.
    pub fn set_alpha(&mut self, alpha: f64) -> Result<()> {
        self.alpha = validate_positive("alpha", alpha)?;
        Ok(())
    }

    /// Decay speed (>= 0).
    pub fn k(&self) -> f64 {
        self.k
    }

    /// Sets the decay speed. Must be finite and >= 0.
    pub fn set_k(&mut self, k: f64) -> Result<()> {
        self.k = validate_non_negative("k", k)?;
        Ok(())
    }
}

impl Default for ExponentialDecay {
    fn default() -> Self {
        Self {
            alpha: 0.96,
            k: 0.01,
        }
    }
}

impl fmt::Display for ExponentialDecay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Exponential Decay: alpha = {}, k = {}", self.alpha, self.k)
    }
}

impl LearningRateDecay for ExponentialDecay {
    fn reset(&mut self) {}

    fn next_lr(&mut self, init_lr: f64, _current_lr: f64, epoch: usize, _: Option<f64>) -> f64 {
        init_lr * self.alpha * (-self.k * epoch as f64).exp()
    }
}

/// 1/t decay.
///
/// Formula: lr = init_lr * alpha / (1 + k * epoch)
///
/// Defaults: `alpha = 0.96`, `k = 0.01`.
#[derive(Debug, Clone)]
pub struct OneOverTDecay {
    alpha: f64,
    k: f64,
}

impl OneOverTDecay {
    /// Creates a 1/t decay policy.
    ///
    /// # Arguments
    ///
    /// * `alpha` - Scale applied to the initial rate (must be > 0)
    /// * `k` - Decay speed (must be >= 0)
    pub fn new(alpha: f64, k: f64) -> Result<Self> {
        Ok(Self {
            alpha: validate_positive("alpha", alpha)?,
            k: validate_non_negative("k", k)?,
        })
    }

    /// Scale factor (> 0).
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Sets the scale factor. Must be finite and > 0.
    pub fn set_alpha(&mut self, alpha: f64) -> Result<()> {
        self.alpha = validate_positive("alpha", alpha)?;
        Ok(())
    }

    /// Decay speed (>= 0).
    pub fn k(&self) -> f64 {
        self.k
    }

    /// Sets the decay speed. Must be finite and >= 0.
    pub fn set_k(&mut self, k: f64) -> Result<()> {
        self.k = validate_non_negative("k", k)?;
        Ok(())
    }
}

impl Default for OneOverTDecay {
    fn default() -> Self {
        Self {
            alpha: 0.96,
            k: 0.01,
        }
    }
}

impl fmt::Display for OneOverTDecay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1/t Decay: alpha = {}, k = {}", self.alpha, self.k)
    }
}

impl LearningRateDecay for OneOverTDecay {
    fn reset(&mut self) {}

    fn next_lr(&mut self, init_lr: f64, _current_lr: f64, epoch: usize, _: Option<f64>) -> f64 {
        init_lr * self.alpha / (1.0 + self.k * epoch as f64)
    }
}

/// Step decay learning rate policy.
///
/// Formula: lr = init_lr * decay_rate^(epoch / decay_epochs)
///
/// The exponent uses real division, so the rate shrinks smoothly and reaches
/// `init_lr * decay_rate` exactly at `epoch == decay_epochs`.
///
/// Defaults: `decay_rate = 0.96`, `decay_epochs = 10`.
#[derive(Debug, Clone)]
pub struct StepDecay {
    decay_rate: f64,
    decay_epochs: f64,
}

impl StepDecay {
    /// Creates a step decay policy.
    ///
    /// # Arguments
    ///
    /// * `decay_rate` - Factor applied every `decay_epochs` epochs (must be > 0)
    /// * `decay_epochs` - Number of epochs per decay factor (must be > 0)
    pub fn new(decay_rate: f64, decay_epochs: f64) -> Result<Self> {
        Ok(Self {
            decay_rate: validate_positive("decay_rate", decay_rate)?,
            decay_epochs: validate_positive("decay_epochs", decay_epochs)?,
        })
    }

    /// Multiplicative factor (> 0).
    pub fn decay_rate(&self) -> f64 {
        self.decay_rate
    }

    /// Sets the multiplicative factor. Must be finite and > 0.
    pub fn set_decay_rate(&mut self, decay_rate: f64) -> Result<()> {
        self.decay_rate = validate_positive("decay_rate", decay_rate)?;
        Ok(())
    }

    /// Epochs per full factor (> 0).
    pub fn decay_epochs(&self) -> f64 {
        self.decay_epochs
    }

    /// Sets the epochs per full factor. Must be finite and > 0.
    pub fn set_decay_epochs(&mut self, decay_epochs: f64) -> Result<()> {
        self.decay_epochs = validate_positive("decay_epochs", decay_epochs)?;
        Ok(())
    }
}

impl Default for StepDecay {
    fn default() -> Self {
        Self {
            decay_rate: 0.96,
            decay_epochs: 10.0,
        }
    }
}

impl fmt::Display for StepDecay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Step Decay: decay_rate = {}, decay_epochs = {}",
            self.decay_rate, self.decay_epochs
        )
    }
}

impl LearningRateDecay for StepDecay {
    fn reset(&mut self) {}

    fn next_lr(&mut self, init_lr: f64, _current_lr: f64, epoch: usize, _: Option<f64>) -> f64 {
        init_lr * self.decay_rate.powf(epoch as f64 / self.decay_epochs)
    }
}

/// Jump-on-plateau decay.
///
/// Watches the loss handed in by the trainer. Once more than `decay_step`
/// epochs have passed since the last check, the latest loss is compared
/// with the one recorded before it; if it did not improve, the current rate
/// is multiplied by `decay_rate`. The check epoch is remembered whether or
/// not the rate changed, and every loss is appended to the history.
///
/// Defaults: `decay_rate = 0.7`, `decay_step = 5`.
///
/// # Example
///
/// ```
/// use rust_gradient_descent::utils::lr_scheduler::{JumpDecay, LearningRateDecay};
///
/// let mut decay = JumpDecay::new(0.5, 1).unwrap();
/// decay.reset();
///
/// let mut lr = 0.1;
/// for (epoch, loss) in [None, Some(1.0), Some(2.0)].into_iter().enumerate() {
///     lr = decay.next_lr(0.1, lr, epoch, loss);
/// }
/// assert!((lr - 0.05).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct JumpDecay {
    decay_rate: f64,
    decay_step: usize,
    loss_history: Vec<f64>,
    last_check_epoch: usize,
}

impl JumpDecay {
    /// Creates a jump decay policy.
    ///
    /// # Arguments
    ///
    /// * `decay_rate` - Factor applied when the loss stalls (must be > 0)
    /// * `decay_step` - Epochs to wait between checks
    pub fn new(decay_rate: f64, decay_step: usize) -> Result<Self> {
        Ok(Self {
            decay_rate: validate_positive("decay_rate", decay_rate)?,
            decay_step,
            loss_history: Vec::new(),
            last_check_epoch: 0,
        })
    }

    /// Multiplicative factor (> 0).
    pub fn decay_rate(&self) -> f64 {
        self.decay_rate
    }

    /// Sets the multiplicative factor. Must be finite and > 0.
    pub fn set_decay_rate(&mut self, decay_rate: f64) -> Result<()> {
        self.decay_rate = validate_positive("decay_rate", decay_rate)?;
        Ok(())
    }

    /// Epochs between plateau checks.
    pub fn decay_step(&self) -> usize {
        self.decay_step
    }

    /// Sets the epochs between plateau checks. Any value is accepted; 0 checks every epoch.
    pub fn set_decay_step(&mut self, decay_step: usize) {
        self.decay_step = decay_step;
    }

    /// Losses recorded since the last reset, oldest first.
    pub fn loss_history(&self) -> &[f64] {
        &self.loss_history
    }
}

impl Default for JumpDecay {
    fn default() -> Self {
        Self {
            decay_rate: 0.7,
            decay_step: 5,
            loss_history: Vec::new(),
            last_check_epoch: 0,
        }
    }
}

impl fmt::Display for JumpDecay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Jump Decay: decay_rate = {}, decay_step = {}",
            self.decay_rate, self.decay_step
        )
    }
}

impl LearningRateDecay for JumpDecay {
    fn reset(&mut self) {
        self.loss_history.clear();
        self.last_check_epoch = 0;
    }

    fn next_lr(
        &mut self,
        _init_lr: f64,
        current_lr: f64,
        epoch: usize,
        previous_loss: Option<f64>,
    ) -> f64 {
        let mut lr = current_lr;

        if epoch.saturating_sub(self.last_check_epoch) > self.decay_step {
            if let (Some(loss), Some(&recorded)) = (previous_loss, self.loss_history.last()) {
                if loss >= recorded {
                    lr *= self.decay_rate;
                }
            }
            self.last_check_epoch = epoch;
        }

        if let Some(loss) = previous_loss {
            self.loss_history.push(loss);
        }

        lr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_decay_waits_for_step() {
        let mut decay = JumpDecay::new(0.5, 3).unwrap();

        // Loss keeps getting worse but no check fires before epoch 4
        let mut lr = 0.1;
        for epoch in 0..4 {
            let loss = (epoch > 0).then(|| epoch as f64);
            lr = decay.next_lr(0.1, lr, epoch, loss);
            assert_eq!(lr, 0.1);
        }

        lr = decay.next_lr(0.1, lr, 4, Some(10.0));
        assert!((lr - 0.05).abs() < 1e-12);
        assert_eq!(decay.last_check_epoch, 4);
    }

    #[test]
    fn test_jump_decay_records_check_without_decay() {
        let mut decay = JumpDecay::new(0.5, 0).unwrap();

        assert_eq!(decay.next_lr(0.1, 0.1, 0, None), 0.1);
        assert_eq!(decay.next_lr(0.1, 0.1, 1, Some(2.0)), 0.1);
        assert_eq!(decay.last_check_epoch, 1);

        // Improvement: checked, not decayed
        assert_eq!(decay.next_lr(0.1, 0.1, 2, Some(1.0)), 0.1);
        assert_eq!(decay.last_check_epoch, 2);
        assert_eq!(decay.loss_history(), &[2.0, 1.0]);
    }
}
