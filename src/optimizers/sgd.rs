//! Standard gradient descent update rule
//!
//! This module provides the plain gradient descent step:
//! `theta = theta - learning_rate * gradient`

use std::fmt;

use crate::error::Result;
use crate::optimizers::Optimizer;

/// Standard (vanilla) gradient descent.
///
/// Implements the basic update rule without momentum or adaptive learning
/// rates:
///
/// `θ = θ - η * ∂L/∂θ`
///
/// where θ is the parameter, η (eta) is the learning rate handed in by the
/// trainer for the current epoch, and ∂L/∂θ is the averaged gradient.
///
/// # Example
///
/// ```
/// use rust_gradient_descent::optimizers::{Optimizer, StandardGD};
///
/// let mut optimizer = StandardGD::new();
/// optimizer.reset(1);
///
/// let theta = optimizer.update_one(0, 0.1, 5.0, 2.0, true).unwrap();
/// assert!((theta - 4.8).abs() < 1e-12);
/// ```
///
/// # Limitations
///
/// Vanilla gradient descent can be slow to converge and may oscillate around
/// minima. Momentum or Adam usually converge in fewer epochs.
#[derive(Debug, Clone, Default)]
pub struct StandardGD;

impl StandardGD {
    /// Creates a new standard gradient descent rule.
    pub fn new() -> Self {
        Self
    }
}

impl fmt::Display for StandardGD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Standard Gradient Descent")
    }
}

impl Optimizer for StandardGD {
    /// No-op: vanilla gradient descent keeps no per-parameter state.
    fn reset(&mut self, _parameter_count: usize) {}

    fn update_one(
        &mut self,
        _index: usize,
        learning_rate: f64,
        theta: f64,
        gradient: f64,
        _commit: bool,
    ) -> Result<f64> {
        Ok(theta - learning_rate * gradient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_standard_gd_single_update() {
        let mut optimizer = StandardGD::new();
        optimizer.reset(1);

        let theta = optimizer.update_one(0, 0.1, 5.0, 2.0, true).unwrap();
        assert!((theta - 4.8).abs() < 1e-12);
    }

    #[test]
    fn test_standard_gd_update_all() {
        let mut optimizer = StandardGD::new();
        optimizer.reset(3);

        let theta = optimizer
            .update_all(0.1, &[1.0, 2.0, 3.0], &[0.1, 0.2, 0.3])
            .unwrap();

        assert!((theta[0] - 0.99).abs() < 1e-12);
        assert!((theta[1] - 1.98).abs() < 1e-12);
        assert!((theta[2] - 2.97).abs() < 1e-12);
    }

    #[test]
    fn test_standard_gd_negative_gradients() {
        let mut optimizer = StandardGD::new();
        optimizer.reset(2);

        let theta = optimizer.update_all(0.1, &[1.0, 2.0], &[-0.5, -1.0]).unwrap();

        // Negative gradients should increase parameters
        assert!((theta[0] - 1.05).abs() < 1e-12);
        assert!((theta[1] - 2.1).abs() < 1e-12);
    }

    #[test]
    fn test_standard_gd_mismatched_lengths() {
        let mut optimizer = StandardGD::new();
        optimizer.reset(2);

        let result = optimizer.update_all(0.1, &[1.0, 2.0], &[0.1, 0.2, 0.3]);
        assert!(matches!(
            result,
            Err(Error::LengthMismatch {
                expected: 2,
                got: 3,
                ..
            })
        ));
    }
}
