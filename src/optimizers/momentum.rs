//! Momentum-based update rules
//!
//! Both rules keep a per-parameter velocity `v` that carries part of the
//! previous step into the next one.

use std::fmt;

use crate::error::{Error, Result};
use crate::optimizers::{state_slot, Optimizer};

const DEFAULT_MOMENTUM: f64 = 0.2;

fn validate_momentum(momentum: f64) -> Result<f64> {
    if !momentum.is_finite() || momentum < 0.0 {
        return Err(Error::config(
            "momentum",
            format!("momentum ({momentum}) must be >= 0"),
        ));
    }
    Ok(momentum)
}

/// Momentum-based gradient descent.
///
/// ```text
/// v' = μ * v - η * gradient
/// θ' = θ + v'
/// ```
///
/// where μ is the momentum coefficient and η the learning rate.
#[derive(Debug, Clone)]
pub struct Momentum {
    momentum: f64,
    velocity: Option<Vec<f64>>,
}

impl Momentum {
    /// Creates a momentum rule with coefficient `momentum` (must be >= 0).
    pub fn new(momentum: f64) -> Result<Self> {
        Ok(Self {
            momentum: validate_momentum(momentum)?,
            velocity: None,
        })
    }

    /// Returns the momentum coefficient.
    pub fn momentum(&self) -> f64 {
        self.momentum
    }

    /// Sets the momentum coefficient (must be >= 0).
    pub fn set_momentum(&mut self, momentum: f64) -> Result<()> {
        self.momentum = validate_momentum(momentum)?;
        Ok(())
    }
}

impl Default for Momentum {
    fn default() -> Self {
        Self {
            momentum: DEFAULT_MOMENTUM,
            velocity: None,
        }
    }
}

impl fmt::Display for Momentum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Momentum Based Gradient Descent: momentum = {}",
            self.momentum
        )
    }
}

impl Optimizer for Momentum {
    fn reset(&mut self, parameter_count: usize) {
        self.velocity = Some(vec![0.0; parameter_count]);
    }

    fn update_one(
        &mut self,
        index: usize,
        learning_rate: f64,
        theta: f64,
        gradient: f64,
        commit: bool,
    ) -> Result<f64> {
        let v = state_slot(self.velocity.as_deref(), index, "Momentum")?;
        let step = self.momentum * v - learning_rate * gradient;

        if commit {
            if let Some(velocity) = self.velocity.as_mut() {
                velocity[index] = step;
            }
        }

        Ok(theta + step)
    }
}

/// Nesterov variant of momentum-based gradient descent.
///
/// ```text
/// c  = μ * v - η * gradient
/// θ' = θ - μ * v + (1 + μ) * c
/// v  = c
/// ```
///
/// This is the reformulated update that works on the stored parameters
/// rather than on the look-ahead point. It differs from the textbook
/// Sutskever form and is kept as-is so results stay reproducible.
#[derive(Debug, Clone)]
pub struct NesterovMomentum {
    momentum: f64,
    velocity: Option<Vec<f64>>,
}

impl NesterovMomentum {
    /// Creates a Nesterov momentum rule with coefficient `momentum` (must be >= 0).
    pub fn new(momentum: f64) -> Result<Self> {
        Ok(Self {
            momentum: validate_momentum(momentum)?,
            velocity: None,
        })
    }

    /// Returns the momentum coefficient.
    pub fn momentum(&self) -> f64 {
        self.momentum
    }

    /// Sets the momentum coefficient (must be >= 0).
    pub fn set_momentum(&mut self, momentum: f64) -> Result<()> {
        self.momentum = validate_momentum(momentum)?;
        Ok(())
    }
}

impl Default for NesterovMomentum {
    fn default() -> Self {
        Self {
            momentum: DEFAULT_MOMENTUM,
            velocity: None,
        }
    }
}

impl fmt::Display for NesterovMomentum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Nesterov Momentum Based Gradient Descent: momentum = {}",
            self.momentum
        )
    }
}

impl Optimizer for NesterovMomentum {
    fn reset(&mut self, parameter_count: usize) {
        self.velocity = Some(vec![0.0; parameter_count]);
    }

    fn update_one(
        &mut self,
        index: usize,
        learning_rate: f64,
        theta: f64,
        gradient: f64,
        commit: bool,
    ) -> Result<f64> {
        let v = state_slot(self.velocity.as_deref(), index, "NesterovMomentum")?;
        let coefficient = self.momentum * v - learning_rate * gradient;
        let new_theta = theta - self.momentum * v + (1.0 + self.momentum) * coefficient;

        if commit {
            if let Some(velocity) = self.velocity.as_mut() {
                velocity[index] = coefficient;
            }
        }

        Ok(new_theta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_momentum_rejects_negative_coefficient() {
        assert!(matches!(
            Momentum::new(-0.1),
            Err(Error::InvalidConfig { arg: "momentum", .. })
        ));
        assert!(NesterovMomentum::new(-1.0).is_err());

        let mut momentum = Momentum::default();
        assert!(momentum.set_momentum(-0.5).is_err());
        assert_eq!(momentum.momentum(), 0.2);
    }

    #[test]
    fn test_momentum_requires_reset() {
        let mut momentum = Momentum::default();
        assert!(matches!(
            momentum.update_one(0, 0.1, 1.0, 1.0, true),
            Err(Error::InvalidState { .. })
        ));
    }

    #[test]
    fn test_momentum_accumulates_velocity() {
        let mut momentum = Momentum::new(0.5).unwrap();
        momentum.reset(1);

        // v = -0.1, theta = 0.9
        let theta = momentum.update_one(0, 0.1, 1.0, 1.0, true).unwrap();
        assert!((theta - 0.9).abs() < 1e-12);

        // v = 0.5 * -0.1 - 0.1 = -0.15, theta = 0.75
        let theta = momentum.update_one(0, 0.1, theta, 1.0, true).unwrap();
        assert!((theta - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_momentum_uncommitted_update_keeps_state() {
        let mut momentum = Momentum::new(0.5).unwrap();
        momentum.reset(1);

        let first = momentum.update_one(0, 0.1, 1.0, 1.0, false).unwrap();
        let second = momentum.update_one(0, 0.1, 1.0, 1.0, false).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_nesterov_update() {
        let mut nesterov = NesterovMomentum::new(0.5).unwrap();
        nesterov.reset(1);

        // c = -0.1, theta = 1 - 0 + 1.5 * -0.1 = 0.85
        let theta = nesterov.update_one(0, 0.1, 1.0, 1.0, true).unwrap();
        assert!((theta - 0.85).abs() < 1e-12);

        // c = 0.5 * -0.1 - 0.1 = -0.15
        // theta = 0.85 + 0.05 + 1.5 * -0.15 = 0.675
        let theta = nesterov.update_one(0, 0.1, theta, 1.0, true).unwrap();
        assert!((theta - 0.675).abs() < 1e-12);
    }

    #[test]
    fn test_zero_momentum_matches_standard_step() {
        let mut momentum = Momentum::new(0.0).unwrap();
        let mut nesterov = NesterovMomentum::new(0.0).unwrap();
        momentum.reset(1);
        nesterov.reset(1);

        for _ in 0..3 {
            let a = momentum.update_one(0, 0.1, 5.0, 2.0, true).unwrap();
            let b = nesterov.update_one(0, 0.1, 5.0, 2.0, true).unwrap();
            assert!((a - 4.8).abs() < 1e-12);
            assert!((b - 4.8).abs() < 1e-12);
        }
    }
}
