//! Configuration structures for training
//!
//! This module parses a training configuration from JSON and applies it to a
//! [`Trainer`], selecting the update rule, learning rate decay, loss function,
//! regularization and stop condition by name.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::loss::{L1Loss, L2Loss};
use crate::objective::ObjectiveFunction;
use crate::optimizers::{Adagrad, Adam, Momentum, NesterovMomentum, StandardGD};
use crate::regularization::{L1Regularization, L2Regularization};
use crate::trainer::{ParameterBound, StopCondition, Trainer};
use crate::utils::lr_scheduler::{ExponentialDecay, JumpDecay, OneOverTDecay, StepDecay};

const OPTIMIZERS: [&str; 5] = ["sgd", "momentum", "nesterov", "adagrad", "adam"];
const DECAY_TYPES: [&str; 4] = ["exponential", "one_over_t", "step", "jump"];
const LOSSES: [&str; 2] = ["l1", "l2"];
const REGULARIZATIONS: [&str; 2] = ["l1", "l2"];
const STOP_TYPES: [&str; 2] = ["absolute", "relative"];

/// Training configuration loaded from JSON.
///
/// Every field is optional; anything left out keeps the trainer's default.
/// Strategy-specific fields only apply to the strategy that uses them:
///
/// - **optimizer** `"momentum"` / `"nesterov"`: `momentum`
/// - **optimizer** `"adagrad"`: `epsilon`
/// - **optimizer** `"adam"`: `beta1`, `beta2`, `epsilon`
/// - **decay_type** `"exponential"` / `"one_over_t"`: `decay_alpha`, `decay_k`
/// - **decay_type** `"step"`: `decay_rate`, `decay_epochs`
/// - **decay_type** `"jump"`: `decay_rate`, `decay_step`
/// - **regularization** `"l1"` / `"l2"`: `lambda`, `normalization`
///
/// # Example
///
/// ```json
/// {
///   "max_epochs": 500,
///   "learning_rate": 0.05,
///   "optimizer": "momentum",
///   "momentum": 0.5,
///   "decay_type": "step",
///   "decay_rate": 0.5,
///   "decay_epochs": 100,
///   "loss": "l2",
///   "stop_type": "relative",
///   "stop_threshold": 1e-9,
///   "parameter_range": [[0.0, 10.0], [null, null]]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainingConfig {
    /// Epoch cap (> 0)
    pub max_epochs: Option<usize>,

    /// Initial learning rate, in (0, 1)
    pub learning_rate: Option<f64>,

    /// Update rule: "sgd", "momentum", "nesterov", "adagrad" or "adam"
    pub optimizer: Option<String>,

    /// Momentum coefficient for "momentum" and "nesterov"
    pub momentum: Option<f64>,

    /// Adam first moment decay rate
    pub beta1: Option<f64>,

    /// Adam second moment decay rate
    pub beta2: Option<f64>,

    /// Numerical stability constant for "adagrad" and "adam"
    pub epsilon: Option<f64>,

    /// Learning rate decay: "exponential", "one_over_t", "step" or "jump"
    pub decay_type: Option<String>,

    /// Scale for "exponential" and "one_over_t"
    pub decay_alpha: Option<f64>,

    /// Decay speed for "exponential" and "one_over_t"
    pub decay_k: Option<f64>,

    /// Multiplicative factor for "step" and "jump"
    pub decay_rate: Option<f64>,

    /// Epochs per factor for "step"
    pub decay_epochs: Option<f64>,

    /// Epochs between plateau checks for "jump"
    pub decay_step: Option<usize>,

    /// Loss function: "l1" or "l2"
    pub loss: Option<String>,

    /// Regularization: "l1" or "l2"
    pub regularization: Option<String>,

    /// Regularization coefficient (>= 0)
    pub lambda: Option<f64>,

    /// Per-parameter divisor applied before the penalty
    pub normalization: Option<Vec<f64>>,

    /// Stop condition: "absolute" or "relative"
    pub stop_type: Option<String>,

    /// Stop threshold (>= 0)
    pub stop_threshold: Option<f64>,

    /// Starting parameters
    pub init_parameters: Option<Vec<f64>>,

    /// `[min, max]` per parameter, `null` for an open side
    pub parameter_range: Option<Vec<[Option<f64>; 2]>>,
}

/// Loads a training configuration from a JSON file.
///
/// Reads the file at `path`, deserializes it into a [`TrainingConfig`] and
/// validates the strategy names and numeric ranges.
///
/// # Examples
///
/// ```no_run
/// use rust_gradient_descent::config::load_config;
///
/// let cfg = load_config("config/line_adam.json").unwrap();
/// assert_eq!(cfg.optimizer.as_deref(), Some("adam"));
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<TrainingConfig> {
    let contents = fs::read_to_string(path)?;
    TrainingConfig::from_json(&contents)
}

impl TrainingConfig {
    /// Parses and validates a configuration from a JSON string.
    pub fn from_json(contents: &str) -> Result<Self> {
        let config: TrainingConfig = serde_json::from_str(contents)?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Configure `trainer` from this configuration.
    ///
    /// Every range and the parameter counts are checked against the trainer's
    /// objective before anything is set, so an error leaves `trainer`
    /// untouched.
    pub fn apply<F: ObjectiveFunction>(&self, trainer: &mut Trainer<F>) -> Result<()> {
        validate_config(self)?;
        self.check_parameter_counts(trainer.objective().parameter_count())?;

        if let Some(max_epochs) = self.max_epochs {
            trainer.set_max_epochs(max_epochs)?;
        }
        if let Some(learning_rate) = self.learning_rate {
            trainer.set_init_learning_rate(learning_rate)?;
        }

        self.apply_optimizer(trainer)?;
        self.apply_decay(trainer)?;

        match self.loss.as_deref() {
            Some("l1") => trainer.set_loss_function(L1Loss),
            Some("l2") => trainer.set_loss_function(L2Loss),
            _ => {}
        }

        self.apply_regularization(trainer)?;

        if let Some(threshold) = self.stop_threshold {
            let condition = match self.stop_type.as_deref() {
                Some("absolute") => StopCondition::Absolute(threshold),
                _ => StopCondition::Relative(threshold),
            };
            trainer.set_stop_condition(condition)?;
        } else if let Some(stop_type) = self.stop_type.as_deref() {
            let threshold = trainer.stop_condition().threshold();
            let condition = match stop_type {
                "absolute" => StopCondition::Absolute(threshold),
                _ => StopCondition::Relative(threshold),
            };
            trainer.set_stop_condition(condition)?;
        }

        if let Some(init) = &self.init_parameters {
            trainer.set_init_parameters(init.clone())?;
        }
        if let Some(range) = &self.parameter_range {
            let bounds = range
                .iter()
                .map(|[min, max]| ParameterBound::new(*min, *max))
                .collect();
            trainer.set_parameter_range(bounds)?;
        }

        Ok(())
    }

    fn check_parameter_counts(&self, expected: usize) -> Result<()> {
        let lengths = [
            ("init parameters", self.init_parameters.as_ref().map(Vec::len)),
            ("parameter range", self.parameter_range.as_ref().map(Vec::len)),
        ];
        for (what, got) in lengths {
            if let Some(got) = got.filter(|&got| got != expected) {
                return Err(Error::LengthMismatch { what, expected, got });
            }
        }
        Ok(())
    }

    fn apply_optimizer<F: ObjectiveFunction>(&self, trainer: &mut Trainer<F>) -> Result<()> {
        match self.optimizer.as_deref() {
            Some("sgd") => trainer.set_optimizer(StandardGD::new()),
            Some("momentum") => {
                let mut optimizer = Momentum::default();
                if let Some(momentum) = self.momentum {
                    optimizer.set_momentum(momentum)?;
                }
                trainer.set_optimizer(optimizer);
            }
            Some("nesterov") => {
                let mut optimizer = NesterovMomentum::default();
                if let Some(momentum) = self.momentum {
                    optimizer.set_momentum(momentum)?;
                }
                trainer.set_optimizer(optimizer);
            }
            Some("adagrad") => {
                let mut optimizer = Adagrad::default();
                if let Some(epsilon) = self.epsilon {
                    optimizer.set_epsilon(epsilon)?;
                }
                trainer.set_optimizer(optimizer);
            }
            Some("adam") => {
                let mut optimizer = Adam::default();
                if let Some(beta1) = self.beta1 {
                    optimizer.set_beta1(beta1)?;
                }
                if let Some(beta2) = self.beta2 {
                    optimizer.set_beta2(beta2)?;
                }
                if let Some(epsilon) = self.epsilon {
                    optimizer.set_epsilon(epsilon)?;
                }
                trainer.set_optimizer(optimizer);
            }
            _ => {}
        }
        Ok(())
    }

    fn apply_decay<F: ObjectiveFunction>(&self, trainer: &mut Trainer<F>) -> Result<()> {
        match self.decay_type.as_deref() {
            Some("exponential") => {
                let mut decay = ExponentialDecay::default();
                if let Some(alpha) = self.decay_alpha {
                    decay.set_alpha(alpha)?;
                }
                if let Some(k) = self.decay_k {
                    decay.set_k(k)?;
                }
                trainer.set_decay(decay);
            }
            Some("one_over_t") => {
                let mut decay = OneOverTDecay::default();
                if let Some(alpha) = self.decay_alpha {
                    decay.set_alpha(alpha)?;
                }
                if let Some(k) = self.decay_k {
                    decay.set_k(k)?;
                }
                trainer.set_decay(decay);
            }
            Some("step") => {
                let mut decay = StepDecay::default();
                if let Some(rate) = self.decay_rate {
                    decay.set_decay_rate(rate)?;
                }
                if let Some(epochs) = self.decay_epochs {
                    decay.set_decay_epochs(epochs)?;
                }
                trainer.set_decay(decay);
            }
            Some("jump") => {
                let mut decay = JumpDecay::default();
                if let Some(rate) = self.decay_rate {
                    decay.set_decay_rate(rate)?;
                }
                if let Some(step) = self.decay_step {
                    decay.set_decay_step(step);
                }
                trainer.set_decay(decay);
            }
            _ => {}
        }
        Ok(())
    }

    fn apply_regularization<F: ObjectiveFunction>(&self, trainer: &mut Trainer<F>) -> Result<()> {
        match self.regularization.as_deref() {
            Some("l1") => {
                let mut regularization = L1Regularization::default();
                if let Some(lambda) = self.lambda {
                    regularization.set_lambda(lambda)?;
                }
                regularization.set_normalization(self.normalization.clone())?;
                trainer.set_regularization(regularization);
            }
            Some("l2") => {
                let mut regularization = L2Regularization::default();
                if let Some(lambda) = self.lambda {
                    regularization.set_lambda(lambda)?;
                }
                regularization.set_normalization(self.normalization.clone())?;
                trainer.set_regularization(regularization);
            }
            _ => {}
        }
        Ok(())
    }
}

fn check_name(arg: &'static str, value: &Option<String>, valid: &[&str]) -> Result<()> {
    if let Some(name) = value {
        if !valid.contains(&name.as_str()) {
            return Err(Error::config(
                arg,
                format!("invalid {arg} '{name}'. Must be one of: {}", valid.join(", ")),
            ));
        }
    }
    Ok(())
}

fn check_range(
    arg: &'static str,
    value: Option<f64>,
    expected: &str,
    valid: impl Fn(f64) -> bool,
) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() || !valid(v) => Err(Error::config(
            arg,
            format!("{arg} ({v}) must be {expected}"),
        )),
        _ => Ok(()),
    }
}

fn validate_config(config: &TrainingConfig) -> Result<()> {
    check_name("optimizer", &config.optimizer, &OPTIMIZERS)?;
    check_name("decay_type", &config.decay_type, &DECAY_TYPES)?;
    check_name("loss", &config.loss, &LOSSES)?;
    check_name("regularization", &config.regularization, &REGULARIZATIONS)?;
    check_name("stop_type", &config.stop_type, &STOP_TYPES)?;

    if config.max_epochs == Some(0) {
        return Err(Error::config("max_epochs", "max_epochs must be > 0"));
    }

    if let Some(learning_rate) = config.learning_rate {
        if !(learning_rate > 0.0 && learning_rate < 1.0) {
            return Err(Error::config(
                "learning_rate",
                format!("learning_rate ({learning_rate}) must be between 0 and 1"),
            ));
        }
    }

    check_range("lambda", config.lambda, ">= 0", |v| v >= 0.0)?;
    check_range("momentum", config.momentum, ">= 0", |v| v >= 0.0)?;
    check_range("beta1", config.beta1, "in [0, 1)", |v| (0.0..1.0).contains(&v))?;
    check_range("beta2", config.beta2, "in [0, 1)", |v| (0.0..1.0).contains(&v))?;
    check_range("epsilon", config.epsilon, "> 0", |v| v > 0.0)?;
    check_range("decay_alpha", config.decay_alpha, "> 0", |v| v > 0.0)?;
    check_range("decay_k", config.decay_k, ">= 0", |v| v >= 0.0)?;
    check_range("decay_rate", config.decay_rate, "> 0", |v| v > 0.0)?;
    check_range("decay_epochs", config.decay_epochs, "> 0", |v| v > 0.0)?;
    check_range("stop_threshold", config.stop_threshold, ">= 0", |v| v >= 0.0)?;

    if let Some(normalization) = &config.normalization {
        if let Some(bad) = normalization.iter().find(|v| **v == 0.0 || !v.is_finite()) {
            return Err(Error::config(
                "normalization",
                format!("normalization values must be finite and non-zero, got {bad}"),
            ));
        }
    }

    if let Some(range) = &config.parameter_range {
        for (i, [min, max]) in range.iter().enumerate() {
            if let (Some(min), Some(max)) = (min, max) {
                if min > max {
                    return Err(Error::config(
                        "parameter_range",
                        format!("parameter {i}: min ({min}) must be <= max ({max})"),
                    ));
                }
            }
        }
    }

    Ok(())
}
