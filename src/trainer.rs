//! Training loop
//!
//! The [`Trainer`] owns an objective function together with the strategies
//! that drive it (update rule, optional learning rate decay, loss function,
//! optional regularization) and runs full-batch gradient descent epochs until
//! the epoch cap or the stop condition is reached.
//!
//! Each epoch:
//!
//! 1. Pick the learning rate (decay policy, or the initial rate)
//! 2. Set θ into the objective, evaluate `f(x)` and `∂f/∂θ`
//! 3. Average the loss derivative over samples for every parameter and add
//!    the regularization derivative
//! 4. Let the update rule produce θ'
//! 5. Clip θ' to the parameter range
//! 6. Evaluate the average loss at θ'
//! 7. Check the stop condition
//! 8. Commit θ'

use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::loss::{L2Loss, LossFunction};
use crate::objective::ObjectiveFunction;
use crate::optimizers::{Adam, Optimizer};
use crate::regularization::Regularization;
use crate::utils::{CumulativeAverage, LearningRateDecay};

/// Optional lower and upper bound for one parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParameterBound {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ParameterBound {
    /// Bound with optional sides; `None` leaves that side open.
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Bound on both sides.
    pub fn between(min: f64, max: f64) -> Self {
        Self::new(Some(min), Some(max))
    }

    /// No clipping on either side.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Clip `value` into the bound. Unset sides are ignored.
    pub fn clamp(&self, value: f64) -> f64 {
        match (self.min, self.max) {
            (Some(min), _) if value < min => min,
            (_, Some(max)) if value > max => max,
            _ => value,
        }
    }
}

/// When to stop before the epoch cap.
///
/// The run stops once the loss improved during an epoch, but by less than
/// the threshold. A loss that stays flat or increases never stops the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopCondition {
    /// Stop when `0 < previous - loss < threshold`.
    Absolute(f64),
    /// Stop when `0 < previous - loss < loss * threshold`.
    Relative(f64),
}

impl StopCondition {
    /// Threshold value, whichever variant this is.
    pub fn threshold(&self) -> f64 {
        match *self {
            StopCondition::Absolute(t) | StopCondition::Relative(t) => t,
        }
    }

    fn is_met(&self, previous_loss: Option<f64>, loss: f64) -> bool {
        let Some(previous_loss) = previous_loss else {
            return false;
        };
        let threshold = match *self {
            StopCondition::Absolute(t) => t,
            StopCondition::Relative(t) => loss * t,
        };
        let improvement = previous_loss - loss;
        improvement > 0.0 && improvement < threshold
    }
}

impl Default for StopCondition {
    fn default() -> Self {
        StopCondition::Relative(1e-9)
    }
}

/// Snapshot handed to the epoch observer after every epoch.
#[derive(Debug, Clone, Copy)]
pub struct EpochReport<'a> {
    /// Zero-based epoch index
    pub epoch: usize,
    pub learning_rate: f64,
    /// Average loss at the updated parameters, over the samples whose loss
    /// is finite
    pub loss: f64,
    /// Samples left out of `loss` because their loss is not finite
    pub skipped_samples: usize,
    /// Parameters before the update
    pub previous_parameters: &'a [f64],
    /// Parameters after the update and clipping
    pub parameters: &'a [f64],
}

/// Outcome of [`Trainer::fit`].
#[derive(Debug, Clone, PartialEq)]
pub struct FitSummary {
    pub parameters: Vec<f64>,
    /// Number of epochs that ran
    pub epochs: usize,
    /// Average loss after the last epoch. `NaN` when that epoch had any
    /// sample with a non-finite loss, since the average then no longer
    /// describes the data.
    pub loss: f64,
    /// Samples with a non-finite loss in the last epoch
    pub skipped_samples: usize,
    /// Whether the stop condition ended the run before the epoch cap
    pub converged: bool,
}

type EpochObserver = Box<dyn FnMut(&EpochReport<'_>)>;

/// Full-batch gradient descent driver.
///
/// # Defaults
///
/// - `max_epochs`: 50
/// - `init_learning_rate`: 0.1
/// - update rule: [`Adam`] with its default hyperparameters
/// - learning rate decay: none
/// - loss: [`L2Loss`]
/// - regularization: none
/// - initial parameters: all ones
/// - parameter range: none
/// - stop condition: [`StopCondition::Relative`] with threshold `1e-9`
///
/// # Example
///
/// ```
/// use rust_gradient_descent::objective::Polynomial;
/// use rust_gradient_descent::trainer::Trainer;
///
/// let x = [0.0, 1.0, 2.0, 3.0, 4.0];
/// let y = [1.0, 3.0, 5.0, 7.0, 9.0];
///
/// let mut trainer = Trainer::new(Polynomial::with_degree(1));
/// trainer.set_max_epochs(2000).unwrap();
///
/// let theta = trainer.solve(&x, &y).unwrap();
/// assert!((theta[0] - 2.0).abs() < 0.05);
/// assert!((theta[1] - 1.0).abs() < 0.05);
/// ```
pub struct Trainer<F: ObjectiveFunction> {
    objective: F,
    init_parameters: Option<Vec<f64>>,
    parameter_range: Option<Vec<ParameterBound>>,
    max_epochs: usize,
    init_learning_rate: f64,
    optimizer: Box<dyn Optimizer>,
    decay: Option<Box<dyn LearningRateDecay>>,
    loss_function: Box<dyn LossFunction>,
    regularization: Option<Box<dyn Regularization>>,
    stop_condition: StopCondition,
    observer: Option<EpochObserver>,
}

impl<F: ObjectiveFunction> Trainer<F> {
    /// Creates a trainer for `objective` with the default configuration.
    pub fn new(objective: F) -> Self {
        Self {
            objective,
            init_parameters: None,
            parameter_range: None,
            max_epochs: 50,
            init_learning_rate: 0.1,
            optimizer: Box::new(Adam::default()),
            decay: None,
            loss_function: Box::new(L2Loss),
            regularization: None,
            stop_condition: StopCondition::default(),
            observer: None,
        }
    }

    /// The objective being optimized.
    pub fn objective(&self) -> &F {
        &self.objective
    }

    /// Mutable access to the objective, e.g. to swap models between runs.
    pub fn objective_mut(&mut self) -> &mut F {
        &mut self.objective
    }

    /// Consumes the trainer and returns the objective with its last parameters.
    pub fn into_objective(self) -> F {
        self.objective
    }

    /// Epoch cap (> 0).
    pub fn max_epochs(&self) -> usize {
        self.max_epochs
    }

    /// Sets the epoch cap (must be > 0).
    pub fn set_max_epochs(&mut self, max_epochs: usize) -> Result<()> {
        if max_epochs == 0 {
            return Err(Error::config("max_epochs", "max_epochs must be > 0"));
        }
        self.max_epochs = max_epochs;
        Ok(())
    }

    /// Learning rate of the first epoch, in (0, 1).
    pub fn init_learning_rate(&self) -> f64 {
        self.init_learning_rate
    }

    /// Sets the starting learning rate (must be in (0, 1)).
    pub fn set_init_learning_rate(&mut self, learning_rate: f64) -> Result<()> {
        if !(learning_rate > 0.0 && learning_rate < 1.0) {
            return Err(Error::config(
                "learning_rate",
                format!("learning_rate ({learning_rate}) must be between 0 and 1"),
            ));
        }
        self.init_learning_rate = learning_rate;
        Ok(())
    }

    /// Current update rule.
    pub fn optimizer(&self) -> &dyn Optimizer {
        self.optimizer.as_ref()
    }

    /// Replaces the update rule. Its state is reset at the start of every run.
    pub fn set_optimizer(&mut self, optimizer: impl Optimizer + 'static) {
        self.optimizer = Box::new(optimizer);
    }

    /// Current decay policy, if any.
    pub fn decay(&self) -> Option<&dyn LearningRateDecay> {
        self.decay.as_deref()
    }

    /// Sets the decay policy. It is reset at the start of every run.
    pub fn set_decay(&mut self, decay: impl LearningRateDecay + 'static) {
        self.decay = Some(Box::new(decay));
    }

    /// Use the initial learning rate for every epoch.
    pub fn clear_decay(&mut self) {
        self.decay = None;
    }

    /// Current per-sample loss.
    pub fn loss_function(&self) -> &dyn LossFunction {
        self.loss_function.as_ref()
    }

    /// Replaces the per-sample loss.
    pub fn set_loss_function(&mut self, loss_function: impl LossFunction + 'static) {
        self.loss_function = Box::new(loss_function);
    }

    /// Current penalty, if any.
    pub fn regularization(&self) -> Option<&dyn Regularization> {
        self.regularization.as_deref()
    }

    /// Adds a penalty. Its normalization length is checked when a run starts.
    pub fn set_regularization(&mut self, regularization: impl Regularization + 'static) {
        self.regularization = Some(Box::new(regularization));
    }

    /// Train without a penalty.
    pub fn clear_regularization(&mut self) {
        self.regularization = None;
    }

    /// Starting parameters, or `None` for all ones.
    pub fn init_parameters(&self) -> Option<&[f64]> {
        self.init_parameters.as_deref()
    }

    /// Sets the starting parameters. The length must match the objective's
    /// parameter count.
    pub fn set_init_parameters(&mut self, parameters: Vec<f64>) -> Result<()> {
        let expected = self.objective.parameter_count();
        if parameters.len() != expected {
            return Err(Error::LengthMismatch {
                what: "init parameters",
                expected,
                got: parameters.len(),
            });
        }
        self.init_parameters = Some(parameters);
        Ok(())
    }

    /// Start from the all-ones vector.
    pub fn clear_init_parameters(&mut self) {
        self.init_parameters = None;
    }

    /// Per-parameter bounds, if any.
    pub fn parameter_range(&self) -> Option<&[ParameterBound]> {
        self.parameter_range.as_deref()
    }

    /// Sets one bound per parameter. The length must match the objective's
    /// parameter count and no bound may have `min > max`.
    pub fn set_parameter_range(&mut self, range: Vec<ParameterBound>) -> Result<()> {
        let expected = self.objective.parameter_count();
        if range.len() != expected {
            return Err(Error::LengthMismatch {
                what: "parameter range",
                expected,
                got: range.len(),
            });
        }
        for (i, bound) in range.iter().enumerate() {
            if let (Some(min), Some(max)) = (bound.min, bound.max) {
                if min > max {
                    return Err(Error::config(
                        "parameter_range",
                        format!("parameter {i}: min ({min}) must be <= max ({max})"),
                    ));
                }
            }
        }
        self.parameter_range = Some(range);
        Ok(())
    }

    /// Leave every parameter unbounded.
    pub fn clear_parameter_range(&mut self) {
        self.parameter_range = None;
    }

    /// Current stop condition.
    pub fn stop_condition(&self) -> StopCondition {
        self.stop_condition
    }

    /// Sets the stop condition. The threshold must be finite and >= 0.
    pub fn set_stop_condition(&mut self, stop_condition: StopCondition) -> Result<()> {
        let threshold = stop_condition.threshold();
        if threshold < 0.0 || !threshold.is_finite() {
            return Err(Error::config(
                "stop_threshold",
                format!("stop threshold ({threshold}) must be >= 0"),
            ));
        }
        self.stop_condition = stop_condition;
        Ok(())
    }

    /// Register a callback invoked after every epoch.
    pub fn set_observer(&mut self, observer: impl FnMut(&EpochReport<'_>) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Remove the epoch callback.
    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    /// Optimize the objective's parameters against the samples `(x, y)` and
    /// return the final parameters.
    ///
    /// The final parameters are also left set in the objective function.
    ///
    /// # Errors
    ///
    /// - [`Error::LengthMismatch`] if `x` and `y` differ in length, if the
    ///   regularization normalization does not match the parameter count, or
    ///   if the objective returns outputs of the wrong shape
    /// - [`Error::InvalidState`] if the update rule reports missing state
    pub fn solve(&mut self, x: &[f64], y: &[f64]) -> Result<Vec<f64>> {
        self.fit(x, y).map(|summary| summary.parameters)
    }

    /// Same as [`Trainer::solve`] but also reports how the run ended.
    pub fn fit(&mut self, x: &[f64], y: &[f64]) -> Result<FitSummary> {
        if x.len() != y.len() {
            return Err(Error::LengthMismatch {
                what: "training samples (x vs y)",
                expected: x.len(),
                got: y.len(),
            });
        }

        let parameter_count = self.objective.parameter_count();
        if let Some(regularization) = &self.regularization {
            regularization.check_parameter_count(parameter_count)?;
        }
        let mut theta = self.starting_parameters(parameter_count)?;

        self.optimizer.reset(parameter_count);
        if let Some(decay) = self.decay.as_mut() {
            decay.reset();
        }

        info!(
            samples = x.len(),
            parameters = parameter_count,
            max_epochs = self.max_epochs,
            learning_rate = self.init_learning_rate,
            optimizer = %self.optimizer,
            loss = %self.loss_function,
            "starting gradient descent"
        );

        let mut learning_rate = self.init_learning_rate;
        let mut previous_loss: Option<f64> = None;
        let mut converged = false;
        let mut skipped_samples = 0;
        let mut epoch = 0;

        while !converged && epoch < self.max_epochs {
            if let Some(decay) = self.decay.as_mut() {
                learning_rate =
                    decay.next_lr(self.init_learning_rate, learning_rate, epoch, previous_loss);
            }

            self.objective.set_parameters(&theta);
            let fx = self.predict(x)?;
            let derivatives = self.parameter_derivatives(x, parameter_count)?;
            let gradients = self.average_gradients(y, &fx, &derivatives, &theta)?;

            let mut next_theta = self.optimizer.update_all(learning_rate, &theta, &gradients)?;
            self.clip(&mut next_theta);

            self.objective.set_parameters(&next_theta);
            let losses = self.average_loss(y, &self.predict(x)?);
            let loss = losses.mean();
            skipped_samples = y.len() - losses.count();
            if skipped_samples > 0 {
                warn!(epoch, skipped_samples, "sample losses are not finite");
            }
            if next_theta.iter().any(|t| !t.is_finite()) {
                warn!(epoch, ?next_theta, "parameters are not finite");
            }

            converged = self.stop_condition.is_met(previous_loss, loss);

            debug!(epoch, learning_rate, loss, "epoch finished");
            trace!(epoch, ?theta, ?next_theta, "parameters updated");
            if let Some(observer) = self.observer.as_mut() {
                observer(&EpochReport {
                    epoch,
                    learning_rate,
                    loss,
                    skipped_samples,
                    previous_parameters: &theta,
                    parameters: &next_theta,
                });
            }

            theta = next_theta;
            previous_loss = Some(loss);
            epoch += 1;
        }

        let loss = match previous_loss {
            Some(loss) if skipped_samples == 0 => loss,
            _ => f64::NAN,
        };
        info!(epochs = epoch, loss, converged, "gradient descent finished");

        Ok(FitSummary {
            parameters: theta,
            epochs: epoch,
            loss,
            skipped_samples,
            converged,
        })
    }

    fn starting_parameters(&self, parameter_count: usize) -> Result<Vec<f64>> {
        if let Some(range) = &self.parameter_range {
            if range.len() != parameter_count {
                return Err(Error::LengthMismatch {
                    what: "parameter range",
                    expected: parameter_count,
                    got: range.len(),
                });
            }
        }

        match &self.init_parameters {
            Some(init) if init.len() != parameter_count => Err(Error::LengthMismatch {
                what: "init parameters",
                expected: parameter_count,
                got: init.len(),
            }),
            Some(init) => Ok(init.clone()),
            None => Ok(vec![1.0; parameter_count]),
        }
    }

    fn predict(&self, x: &[f64]) -> Result<Vec<f64>> {
        let fx = self.objective.function(x);
        if fx.len() != x.len() {
            return Err(Error::LengthMismatch {
                what: "objective function outputs",
                expected: x.len(),
                got: fx.len(),
            });
        }
        Ok(fx)
    }

    fn parameter_derivatives(&self, x: &[f64], parameter_count: usize) -> Result<Vec<Vec<f64>>> {
        let derivatives = self.objective.derivative_parameters(x);
        if derivatives.len() != x.len() {
            return Err(Error::LengthMismatch {
                what: "objective derivative samples",
                expected: x.len(),
                got: derivatives.len(),
            });
        }
        if let Some(row) = derivatives.iter().find(|row| row.len() != parameter_count) {
            return Err(Error::LengthMismatch {
                what: "objective derivative parameters",
                expected: parameter_count,
                got: row.len(),
            });
        }
        Ok(derivatives)
    }

    /// Per-parameter mean of the loss derivative over all samples, plus the
    /// regularization derivative when one is configured.
    fn average_gradients(
        &self,
        y: &[f64],
        fx: &[f64],
        derivatives: &[Vec<f64>],
        theta: &[f64],
    ) -> Result<Vec<f64>> {
        let penalty = match &self.regularization {
            Some(regularization) => regularization.derivative_loss(theta)?,
            None => 0.0,
        };

        Ok((0..theta.len())
            .map(|p| {
                let average: CumulativeAverage = y
                    .iter()
                    .zip(fx)
                    .zip(derivatives)
                    .map(|((&yi, &fxi), row)| self.loss_function.derivative_loss(yi, fxi, row[p]))
                    .collect();
                average.mean() + penalty
            })
            .collect())
    }

    /// Mean sample loss. Non-finite losses are skipped; the returned count
    /// tells how many samples made it into the mean.
    fn average_loss(&self, y: &[f64], fx: &[f64]) -> CumulativeAverage {
        y.iter()
            .zip(fx)
            .map(|(&yi, &fxi)| self.loss_function.loss(yi, fxi))
            .collect()
    }

    fn clip(&self, theta: &mut [f64]) {
        if let Some(range) = &self.parameter_range {
            for (value, bound) in theta.iter_mut().zip(range) {
                *value = bound.clamp(*value);
            }
        }
    }
}
