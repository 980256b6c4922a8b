//! Per-sample loss functions
//!
//! A loss function scores a single prediction `fx` against its target `y`
//! and gives the derivative of that score with respect to one parameter,
//! with the model's own derivative `df/dθ` already multiplied in.

use std::fmt;

/// Scalar loss and its parameter derivative.
pub trait LossFunction: fmt::Display {
    /// Loss of prediction `fx` against target `y`.
    fn loss(&self, y: f64, fx: f64) -> f64;

    /// Derivative of the loss with respect to a parameter θ, given the
    /// model derivative `dfdtheta = ∂f(x)/∂θ` at the same sample.
    fn derivative_loss(&self, y: f64, fx: f64, dfdtheta: f64) -> f64;
}

/// Absolute error: `|y - fx|`.
///
/// The derivative uses the subgradient 0 when `y == fx`.
#[derive(Debug, Clone, Copy, Default)]
pub struct L1Loss;

impl fmt::Display for L1Loss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L1 Loss")
    }
}

impl LossFunction for L1Loss {
    fn loss(&self, y: f64, fx: f64) -> f64 {
        (y - fx).abs()
    }

    fn derivative_loss(&self, y: f64, fx: f64, dfdtheta: f64) -> f64 {
        let residual = y - fx;
        if residual > 0.0 {
            -dfdtheta
        } else if residual < 0.0 {
            dfdtheta
        } else {
            0.0
        }
    }
}

/// Half squared error: `(y - fx)² / 2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct L2Loss;

impl fmt::Display for L2Loss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L2 Loss")
    }
}

impl LossFunction for L2Loss {
    fn loss(&self, y: f64, fx: f64) -> f64 {
        let residual = y - fx;
        residual * residual / 2.0
    }

    fn derivative_loss(&self, y: f64, fx: f64, dfdtheta: f64) -> f64 {
        -(y - fx) * dfdtheta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l2_loss() {
        assert_eq!(L2Loss.loss(3.0, 1.0), 2.0);
        assert_eq!(L2Loss.derivative_loss(3.0, 1.0, 1.0), -2.0);
        assert_eq!(L2Loss.derivative_loss(1.0, 3.0, 0.5), 1.0);
    }

    #[test]
    fn test_l1_loss_subgradient() {
        assert_eq!(L1Loss.loss(3.0, 1.0), 2.0);
        assert_eq!(L1Loss.loss(1.0, 3.0), 2.0);
        assert_eq!(L1Loss.derivative_loss(3.0, 1.0, 4.0), -4.0);
        assert_eq!(L1Loss.derivative_loss(1.0, 3.0, 4.0), 4.0);
        assert_eq!(L1Loss.derivative_loss(2.0, 2.0, 4.0), 0.0);
    }
}
