//! Adagrad update rule
//!
//! Reference: Duchi, Hazan & Singer (2011), "Adaptive Subgradient Methods for
//! Online Learning and Stochastic Optimization", JMLR 12.

use std::fmt;

use crate::error::{Error, Result};
use crate::optimizers::{state_slot, Optimizer};

/// Adagrad: per-parameter step scaled by the accumulated squared gradient.
///
/// ```text
/// G  = G + gradient²
/// θ' = θ - η * gradient / (√G + ε)
/// ```
///
/// Parameters with a history of large gradients take smaller steps.
#[derive(Debug, Clone)]
pub struct Adagrad {
    epsilon: f64,
    /// Accumulated squared gradient per parameter
    squared_sum: Option<Vec<f64>>,
}

impl Adagrad {
    /// Creates an Adagrad rule with the given `epsilon` (must be > 0).
    pub fn new(epsilon: f64) -> Result<Self> {
        let mut adagrad = Self::default();
        adagrad.set_epsilon(epsilon)?;
        Ok(adagrad)
    }

    /// Returns epsilon.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Sets epsilon (must be > 0).
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

impl Default for Adagrad {
    fn default() -> Self {
        Self {
            epsilon: 1e-8,
            squared_sum: None,
        }
    }
}

impl fmt::Display for Adagrad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Adagrad: epsilon = {}", self.epsilon)
    }
}

impl Optimizer for Adagrad {
    fn reset(&mut self, parameter_count: usize) {
        self.squared_sum = Some(vec![0.0; parameter_count]);
    }

    fn update_one(
        &mut self,
        index: usize,
        learning_rate: f64,
        theta: f64,
        gradient: f64,
        commit: bool,
    ) -> Result<f64> {
        let g = state_slot(self.squared_sum.as_deref(), index, "Adagrad")? + gradient * gradient;
        let new_theta = theta - learning_rate * gradient / (g.sqrt() + self.epsilon);

        if commit {
            if let Some(squared_sum) = self.squared_sum.as_mut() {
                squared_sum[index] = g;
            }
        }

        Ok(new_theta)
    }
}
