//! Rust Gradient Descent Library
//!
//! This library fits the parameters of a differentiable model to sample data
//! by first-order gradient descent, with pluggable update rules, learning rate
//! decay, loss functions and parameter regularization.
//!
//! # Modules
//!
//! - `objective`: ObjectiveFunction trait and a polynomial model
//! - `optimizers`: Optimizer trait and implementations (SGD, Momentum, Adam, etc.)
//! - `loss`: Per-sample loss functions (L1, L2)
//! - `regularization`: Parameter penalties (L1, L2)
//! - `trainer`: The training loop, parameter bounds and stop conditions
//! - `utils`: Running averages and learning rate decay policies
//! - `config`: Training configuration loaded from JSON
//! - `error`: Error and Result types
//!
//! # Example
//!
//! ```
//! use rust_gradient_descent::objective::Polynomial;
//! use rust_gradient_descent::Trainer;
//!
//! let x = [0.0, 1.0, 2.0, 3.0, 4.0];
//! let y = [1.0, 3.0, 5.0, 7.0, 9.0];
//!
//! let mut trainer = Trainer::new(Polynomial::with_degree(1));
//! trainer.set_max_epochs(2000).unwrap();
//! let theta = trainer.solve(&x, &y).unwrap();
//!
//! assert!((theta[0] - 2.0).abs() < 0.05);
//! assert!((theta[1] - 1.0).abs() < 0.05);
//! ```

pub mod config;
pub mod error;
pub mod loss;
pub mod objective;
pub mod optimizers;
pub mod regularization;
pub mod trainer;
pub mod utils;

pub use error::{Error, Result};
pub use trainer::{EpochReport, FitSummary, ParameterBound, StopCondition, Trainer};
