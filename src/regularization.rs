//! Parameter penalties
//!
//! A regularization adds a penalty on the parameter vector to the training
//! signal. Each parameter can optionally be divided by a normalization value
//! before the penalty is taken, so parameters living on different scales are
//! penalized comparably.
//!
//! Both penalties reduce the parameter vector to a single mean, so
//! [`Regularization::derivative_loss`] returns one scalar that the trainer
//! adds to every parameter's gradient.

use std::fmt;

use crate::error::{Error, Result};
use crate::utils::CumulativeAverage;

const DEFAULT_LAMBDA: f64 = 0.3;

/// Penalty over the whole parameter vector.
pub trait Regularization: fmt::Display {
    /// Penalty value for `theta`.
    fn loss(&self, theta: &[f64]) -> Result<f64>;

    /// Derivative of the penalty, shared by every parameter.
    fn derivative_loss(&self, theta: &[f64]) -> Result<f64>;

    /// Check that this regularization can be applied to `parameter_count`
    /// parameters.
    fn check_parameter_count(&self, parameter_count: usize) -> Result<()>;
}

/// Penalty coefficient and optional per-parameter normalization shared by
/// both penalties.
#[derive(Debug, Clone)]
struct Penalty {
    lambda: f64,
    normalization: Option<Vec<f64>>,
}

impl Penalty {
    fn new(lambda: f64) -> Result<Self> {
        Ok(Self {
            lambda: validate_lambda(lambda)?,
            normalization: None,
        })
    }

    fn set_normalization(&mut self, normalization: Option<Vec<f64>>) -> Result<()> {
        if let Some(values) = &normalization {
            if let Some(bad) = values.iter().find(|v| **v == 0.0 || !v.is_finite()) {
                return Err(Error::config(
                    "normalization",
                    format!("normalization values must be finite and non-zero, got {bad}"),
                ));
            }
        }
        self.normalization = normalization;
        Ok(())
    }

    fn check(&self, parameter_count: usize) -> Result<()> {
        match &self.normalization {
            Some(normalization) if normalization.len() != parameter_count => {
                Err(Error::LengthMismatch {
                    what: "regularization normalization",
                    expected: parameter_count,
                    got: normalization.len(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Mean of `map(θᵢ / normᵢ)` over the parameters.
    fn mean_of(&self, theta: &[f64], map: impl Fn(f64) -> f64) -> Result<f64> {
        self.check(theta.len())?;
        let average: CumulativeAverage = match &self.normalization {
            Some(normalization) => theta
                .iter()
                .zip(normalization)
                .map(|(t, n)| map(t / n))
                .collect(),
            None => theta.iter().map(|&t| map(t)).collect(),
        };
        Ok(average.mean())
    }

    fn describe(&self, f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
        write!(f, "{name} regularization: lambda = {}", self.lambda)?;
        if let Some(normalization) = &self.normalization {
            write!(f, ", normalization = {normalization:?}")?;
        }
        Ok(())
    }
}

fn validate_lambda(lambda: f64) -> Result<f64> {
    if lambda < 0.0 || !lambda.is_finite() {
        return Err(Error::config(
            "lambda",
            format!("lambda ({lambda}) must be >= 0"),
        ));
    }
    Ok(lambda)
}

macro_rules! penalty_accessors {
    ($ty:ident) => {
        impl $ty {
            /// Creates the penalty with coefficient `lambda` (must be >= 0).
            pub fn new(lambda: f64) -> Result<Self> {
                Ok(Self(Penalty::new(lambda)?))
            }

            /// Penalty coefficient (>= 0).
            pub fn lambda(&self) -> f64 {
                self.0.lambda
            }

            /// Sets the penalty coefficient. Must be finite and >= 0.
            pub fn set_lambda(&mut self, lambda: f64) -> Result<()> {
                self.0.lambda = validate_lambda(lambda)?;
                Ok(())
            }

            /// Per-parameter divisors, if any.
            pub fn normalization(&self) -> Option<&[f64]> {
                self.0.normalization.as_deref()
            }

            /// Divide each parameter by the matching entry before penalizing.
            /// Pass `None` to penalize the raw parameters.
            pub fn set_normalization(&mut self, normalization: Option<Vec<f64>>) -> Result<()> {
                self.0.set_normalization(normalization)
            }

            /// Builder form of [`Self::set_normalization`].
            pub fn with_normalization(mut self, normalization: Vec<f64>) -> Result<Self> {
                self.0.set_normalization(Some(normalization))?;
                Ok(self)
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self(Penalty {
                    lambda: DEFAULT_LAMBDA,
                    normalization: None,
                })
            }
        }
    };
}

/// L1 penalty: `λ * mean(|θᵢ / normᵢ|)`.
///
/// The derivative is `+λ`, `-λ` or `0` depending on the sign of
/// `mean(θᵢ / normᵢ)`.
#[derive(Debug, Clone)]
pub struct L1Regularization(Penalty);

penalty_accessors!(L1Regularization);

impl fmt::Display for L1Regularization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.describe(f, "L1")
    }
}

impl Regularization for L1Regularization {
    fn loss(&self, theta: &[f64]) -> Result<f64> {
        Ok(self.0.lambda * self.0.mean_of(theta, f64::abs)?)
    }

    fn derivative_loss(&self, theta: &[f64]) -> Result<f64> {
        let mean = self.0.mean_of(theta, |t| t)?;
        Ok(if mean > 0.0 {
            self.0.lambda
        } else if mean < 0.0 {
            -self.0.lambda
        } else {
            0.0
        })
    }

    fn check_parameter_count(&self, parameter_count: usize) -> Result<()> {
        self.0.check(parameter_count)
    }
}

/// L2 penalty: `λ * mean((θᵢ / normᵢ)²)`.
///
/// The derivative is `2λ * mean(θᵢ / normᵢ)`.
#[derive(Debug, Clone)]
pub struct L2Regularization(Penalty);

penalty_accessors!(L2Regularization);

impl fmt::Display for L2Regularization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.describe(f, "L2")
    }
}

impl Regularization for L2Regularization {
    fn loss(&self, theta: &[f64]) -> Result<f64> {
        Ok(self.0.lambda * self.0.mean_of(theta, |t| t * t)?)
    }

    fn derivative_loss(&self, theta: &[f64]) -> Result<f64> {
        Ok(2.0 * self.0.lambda * self.0.mean_of(theta, |t| t)?)
    }

    fn check_parameter_count(&self, parameter_count: usize) -> Result<()> {
        self.0.check(parameter_count)
    }
}
