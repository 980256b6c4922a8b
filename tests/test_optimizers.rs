//! Tests for the update rules
//!
//! This file tests all Optimizer implementations through the trait object
//! interface the trainer uses:
//! - StandardGD: plain gradient step
//! - Momentum / NesterovMomentum: velocity carried between updates
//! - Adagrad: step scaled by accumulated squared gradients
//! - Adam: bias-corrected moment estimates with per-parameter counters

use approx::assert_relative_eq;
use rust_gradient_descent::optimizers::{
    Adagrad, Adam, Momentum, NesterovMomentum, Optimizer, StandardGD,
};
use rust_gradient_descent::Error;

fn all_optimizers() -> Vec<Box<dyn Optimizer>> {
    vec![
        Box::new(StandardGD::new()),
        Box::new(Momentum::default()),
        Box::new(NesterovMomentum::default()),
        Box::new(Adagrad::default()),
        Box::new(Adam::default()),
    ]
}

// ============================================================================
// Shared Behavior Tests
// ============================================================================

mod shared_tests {
    use super::*;

    #[test]
    fn test_zero_gradient_keeps_parameters() {
        for mut optimizer in all_optimizers() {
            optimizer.reset(2);
            let theta = optimizer.update_all(0.1, &[1.5, -3.0], &[0.0, 0.0]).unwrap();
            assert_relative_eq!(theta[0], 1.5, epsilon = 1e-12);
            assert_relative_eq!(theta[1], -3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_step_moves_against_gradient() {
        for mut optimizer in all_optimizers() {
            optimizer.reset(2);
            let theta = optimizer.update_all(0.1, &[0.0, 0.0], &[1.0, -1.0]).unwrap();
            assert!(theta[0] < 0.0, "{optimizer} moved along the gradient");
            assert!(theta[1] > 0.0, "{optimizer} moved along the gradient");
        }
    }

    #[test]
    fn test_gradient_length_mismatch() {
        for mut optimizer in all_optimizers() {
            optimizer.reset(2);
            let err = optimizer.update_all(0.1, &[0.0, 0.0], &[1.0]).unwrap_err();
            assert!(matches!(
                err,
                Error::LengthMismatch {
                    expected: 2,
                    got: 1,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_stateful_rules_reject_out_of_range_index() {
        let mut optimizer = Adam::default();
        optimizer.reset(1);
        let err = optimizer.update_one(3, 0.1, 0.0, 1.0, true).unwrap_err();
        assert!(matches!(err, Error::InvalidState { .. }));
    }

    #[test]
    fn test_display_names() {
        let names: Vec<String> = all_optimizers().iter().map(|o| o.to_string()).collect();
        assert_eq!(names[0], "Standard Gradient Descent");
        assert!(names[1].contains("Momentum"));
        assert!(names[2].contains("Nesterov"));
        assert!(names[3].contains("Adagrad"));
        assert!(names[4].contains("Adam"));
    }
}

// ============================================================================
// Reset Tests
// ============================================================================

mod reset_tests {
    use super::*;

    #[test]
    fn test_reset_restarts_momentum() {
        let mut optimizer = Momentum::new(0.5).unwrap();
        optimizer.reset(1);
        optimizer.update_one(0, 0.1, 1.0, 1.0, true).unwrap();

        optimizer.reset(1);
        let theta = optimizer.update_one(0, 0.1, 1.0, 1.0, true).unwrap();
        assert_relative_eq!(theta, 0.9, epsilon = 1e-12);
    }

    #[test]
    fn test_reset_restarts_adagrad() {
        let mut optimizer = Adagrad::default();
        optimizer.reset(1);
        for _ in 0..5 {
            optimizer.update_one(0, 0.1, 1.0, 1.0, true).unwrap();
        }

        optimizer.reset(1);
        let theta = optimizer.update_one(0, 0.1, 1.0, 1.0, true).unwrap();
        assert_relative_eq!(theta, 0.9, epsilon = 1e-6);
    }

    #[test]
    fn test_reset_resizes_state() {
        let mut optimizer = NesterovMomentum::default();
        optimizer.reset(1);
        assert!(optimizer.update_one(2, 0.1, 0.0, 1.0, true).is_err());

        optimizer.reset(3);
        assert!(optimizer.update_one(2, 0.1, 0.0, 1.0, true).is_ok());
    }

    #[test]
    fn test_stateful_rules_require_reset() {
        let mut rules: Vec<Box<dyn Optimizer>> = vec![
            Box::new(Momentum::default()),
            Box::new(NesterovMomentum::default()),
            Box::new(Adagrad::default()),
            Box::new(Adam::default()),
        ];
        for optimizer in rules.iter_mut() {
            let err = optimizer.update_one(0, 0.1, 0.0, 1.0, true).unwrap_err();
            assert!(matches!(err, Error::InvalidState { .. }));
        }
    }
}

// ============================================================================
// Update Rule Value Tests
// ============================================================================

mod value_tests {
    use super::*;

    #[test]
    fn test_standard_step() {
        let mut optimizer = StandardGD::new();
        optimizer.reset(1);
        assert_relative_eq!(
            optimizer.update_one(0, 0.1, 5.0, 2.0, true).unwrap(),
            4.8,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_adagrad_first_step() {
        let mut optimizer = Adagrad::default();
        optimizer.reset(1);
        let theta = optimizer.update_one(0, 0.1, 1.0, 1.0, true).unwrap();
        assert_relative_eq!(theta, 0.9, epsilon = 1e-6);
    }

    #[test]
    fn test_adam_first_step() {
        let mut optimizer = Adam::default();
        optimizer.reset(1);
        let theta = optimizer.update_one(0, 0.1, 0.0, 1.0, true).unwrap();
        assert_relative_eq!(theta, -0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_momentum_and_nesterov_diverge_after_first_step() {
        let mut momentum = Momentum::new(0.5).unwrap();
        let mut nesterov = NesterovMomentum::new(0.5).unwrap();
        momentum.reset(1);
        nesterov.reset(1);

        let m1 = momentum.update_one(0, 0.1, 1.0, 1.0, true).unwrap();
        let n1 = nesterov.update_one(0, 0.1, 1.0, 1.0, true).unwrap();
        assert_relative_eq!(m1, 0.9, epsilon = 1e-12);
        assert_relative_eq!(n1, 0.85, epsilon = 1e-12);

        let m2 = momentum.update_one(0, 0.1, m1, 1.0, true).unwrap();
        let n2 = nesterov.update_one(0, 0.1, n1, 1.0, true).unwrap();
        assert_relative_eq!(m2, 0.75, epsilon = 1e-12);
        assert_relative_eq!(n2, 0.675, epsilon = 1e-12);
    }

    #[test]
    fn test_uncommitted_updates_are_repeatable() {
        for mut optimizer in all_optimizers() {
            optimizer.reset(1);
            let first = optimizer.update_one(0, 0.1, 1.0, 0.5, false).unwrap();
            let second = optimizer.update_one(0, 0.1, 1.0, 0.5, false).unwrap();
            assert_eq!(first, second, "{optimizer} changed state without commit");
        }
    }
}
