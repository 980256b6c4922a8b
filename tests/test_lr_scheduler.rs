//! Tests for learning rate decay policies
//!
//! This file tests all LearningRateDecay implementations:
//! - ExponentialDecay: init_lr * alpha * exp(-k * epoch)
//! - OneOverTDecay: init_lr * alpha / (1 + k * epoch)
//! - StepDecay: init_lr * decay_rate^(epoch / decay_epochs)
//! - JumpDecay: multiplicative drop when the loss stops improving

use approx::assert_relative_eq;
use rust_gradient_descent::utils::lr_scheduler::{
    ExponentialDecay, JumpDecay, LearningRateDecay, OneOverTDecay, StepDecay,
};
use rust_gradient_descent::Error;

// ============================================================================
// ExponentialDecay Tests
// ============================================================================

#[cfg(test)]
mod exponential_decay_tests {
    use super::*;

    #[test]
    fn test_exponential_defaults() {
        let decay = ExponentialDecay::default();
        assert_eq!(decay.alpha(), 0.96);
        assert_eq!(decay.k(), 0.01);
    }

    #[test]
    fn test_exponential_first_epoch_scales_by_alpha() {
        let mut decay = ExponentialDecay::default();
        assert_relative_eq!(decay.next_lr(0.1, 0.1, 0, None), 0.096, epsilon = 1e-12);
    }

    #[test]
    fn test_exponential_values() {
        let mut decay = ExponentialDecay::new(1.0, 0.1).unwrap();
        for epoch in [0, 1, 5, 20] {
            let expected = 0.1 * (-0.1 * epoch as f64).exp();
            assert_relative_eq!(
                decay.next_lr(0.1, 0.1, epoch, Some(1.0)),
                expected,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_exponential_ignores_current_rate() {
        let mut decay = ExponentialDecay::default();
        let a = decay.next_lr(0.1, 0.1, 7, None);
        let b = decay.next_lr(0.1, 0.0001, 7, Some(3.0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_exponential_rejects_invalid_parameters() {
        assert!(matches!(
            ExponentialDecay::new(0.0, 0.01),
            Err(Error::InvalidConfig { arg: "alpha", .. })
        ));
        assert!(matches!(
            ExponentialDecay::new(0.96, -1.0),
            Err(Error::InvalidConfig { arg: "k", .. })
        ));
    }
}

// ============================================================================
// OneOverTDecay Tests
// ============================================================================

#[cfg(test)]
mod one_over_t_decay_tests {
    use super::*;

    #[test]
    fn test_one_over_t_values() {
        let mut decay = OneOverTDecay::new(1.0, 0.5).unwrap();
        assert_relative_eq!(decay.next_lr(0.1, 0.1, 0, None), 0.1, epsilon = 1e-12);
        assert_relative_eq!(decay.next_lr(0.1, 0.1, 2, None), 0.05, epsilon = 1e-12);
        assert_relative_eq!(decay.next_lr(0.1, 0.1, 8, None), 0.02, epsilon = 1e-12);
    }

    #[test]
    fn test_one_over_t_monotonic() {
        let mut decay = OneOverTDecay::default();
        let mut previous = f64::INFINITY;
        for epoch in 0..100 {
            let lr = decay.next_lr(0.1, 0.1, epoch, None);
            assert!(lr < previous);
            previous = lr;
        }
    }

    #[test]
    fn test_one_over_t_setters() {
        let mut decay = OneOverTDecay::default();
        decay.set_alpha(0.5).unwrap();
        decay.set_k(0.0).unwrap();
        assert!(decay.set_alpha(-1.0).is_err());
        assert_eq!(decay.alpha(), 0.5);
        assert_relative_eq!(decay.next_lr(0.2, 0.2, 50, None), 0.1, epsilon = 1e-12);
    }
}

// ============================================================================
// StepDecay Tests
// ============================================================================

#[cfg(test)]
mod step_decay_tests {
    use super::*;

    #[test]
    fn test_step_defaults() {
        let decay = StepDecay::default();
        assert_eq!(decay.decay_rate(), 0.96);
        assert_eq!(decay.decay_epochs(), 10.0);
    }

    #[test]
    fn test_step_whole_periods() {
        let mut decay = StepDecay::new(0.5, 3.0).unwrap();
        assert_relative_eq!(decay.next_lr(0.1, 0.1, 0, None), 0.1, epsilon = 1e-12);
        assert_relative_eq!(decay.next_lr(0.1, 0.1, 3, None), 0.05, epsilon = 1e-12);
        assert_relative_eq!(decay.next_lr(0.1, 0.1, 6, None), 0.025, epsilon = 1e-12);
    }

    #[test]
    fn test_step_between_periods_is_smooth() {
        let mut decay = StepDecay::new(0.25, 2.0).unwrap();
        // 0.25^(1/2)
        assert_relative_eq!(decay.next_lr(0.1, 0.1, 1, None), 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_step_rejects_zero_epochs() {
        assert!(StepDecay::new(0.5, 0.0).is_err());
        let mut decay = StepDecay::default();
        assert!(decay.set_decay_epochs(-2.0).is_err());
        assert_eq!(decay.decay_epochs(), 10.0);
    }
}

// ============================================================================
// JumpDecay Tests
// ============================================================================

#[cfg(test)]
mod jump_decay_tests {
    use super::*;

    fn run(decay: &mut JumpDecay, losses: &[Option<f64>]) -> Vec<f64> {
        let mut lr = 0.1;
        losses
            .iter()
            .enumerate()
            .map(|(epoch, loss)| {
                lr = decay.next_lr(0.1, lr, epoch, *loss);
                lr
            })
            .collect()
    }

    #[test]
    fn test_jump_defaults() {
        let decay = JumpDecay::default();
        assert_eq!(decay.decay_rate(), 0.7);
        assert_eq!(decay.decay_step(), 5);
    }

    #[test]
    fn test_jump_keeps_rate_while_improving() {
        let mut decay = JumpDecay::new(0.5, 1).unwrap();
        let losses: Vec<Option<f64>> = std::iter::once(None)
            .chain((1..10).map(|i| Some(10.0 - i as f64)))
            .collect();
        for lr in run(&mut decay, &losses) {
            assert_eq!(lr, 0.1);
        }
        assert_eq!(decay.loss_history().len(), 9);
    }

    #[test]
    fn test_jump_drops_on_plateau() {
        let mut decay = JumpDecay::new(0.5, 1).unwrap();
        // Checks fire at epochs 2 and 4
        let rates = run(
            &mut decay,
            &[None, Some(1.0), Some(1.0), Some(1.0), Some(1.0)],
        );
        assert_relative_eq!(rates[1], 0.1, epsilon = 1e-12);
        assert_relative_eq!(rates[2], 0.05, epsilon = 1e-12);
        assert_relative_eq!(rates[3], 0.05, epsilon = 1e-12);
        assert_relative_eq!(rates[4], 0.025, epsilon = 1e-12);
    }

    #[test]
    fn test_jump_compounds_current_rate() {
        let mut decay = JumpDecay::new(0.5, 0).unwrap();
        let lr = decay.next_lr(0.1, 0.02, 1, Some(1.0));
        assert_eq!(lr, 0.02);
        let lr = decay.next_lr(0.1, lr, 2, Some(2.0));
        assert_relative_eq!(lr, 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_jump_reset_clears_history() {
        let mut decay = JumpDecay::default();
        run(&mut decay, &[None, Some(3.0), Some(2.0)]);
        assert_eq!(decay.loss_history(), &[3.0, 2.0]);

        decay.reset();
        assert!(decay.loss_history().is_empty());

        // Check epoch is back at 0, so nothing fires before epoch 6
        let rates = run(
            &mut decay,
            &[None, Some(1.0), Some(1.0), Some(1.0), Some(1.0), Some(1.0)],
        );
        assert!(rates.iter().all(|&lr| lr == 0.1));
    }
}

// ============================================================================
// Trait Object Tests
// ============================================================================

#[cfg(test)]
mod trait_object_tests {
    use super::*;

    #[test]
    fn test_policies_as_trait_objects() {
        let mut policies: Vec<Box<dyn LearningRateDecay>> = vec![
            Box::new(ExponentialDecay::default()),
            Box::new(OneOverTDecay::default()),
            Box::new(StepDecay::default()),
            Box::new(JumpDecay::default()),
        ];

        for policy in policies.iter_mut() {
            policy.reset();
            let lr = policy.next_lr(0.1, 0.1, 0, None);
            assert!(lr > 0.0 && lr <= 0.1, "{policy} gave {lr}");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            StepDecay::new(0.5, 4.0).unwrap().to_string(),
            "Step Decay: decay_rate = 0.5, decay_epochs = 4"
        );
        assert_eq!(
            JumpDecay::default().to_string(),
            "Jump Decay: decay_rate = 0.7, decay_step = 5"
        );
    }
}
