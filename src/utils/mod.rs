//! Shared utilities for the trainer
//!
//! This module provides the running-mean accumulator used to average
//! gradients and losses over samples, and the learning rate decay policies.

pub mod accumulator;
pub mod lr_scheduler;

pub use accumulator::CumulativeAverage;
pub use lr_scheduler::{ExponentialDecay, JumpDecay, LearningRateDecay, OneOverTDecay, StepDecay};
